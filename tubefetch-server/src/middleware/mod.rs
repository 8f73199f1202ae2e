//! HTTP middleware stack: CORS and per-request trace-ID spans.

pub mod cors;
pub mod trace;
