use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"OK"`.
    pub status: String,
    /// Server time, RFC 3339 in UTC.
    pub timestamp: String,
    pub version: String,
}
