use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use futures::{StreamExt, stream};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

use super::{FormatInfo, MediaSource, MediaStream, VideoInfo};
use crate::error::FetchError;
use crate::media::DownloadPlan;

const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);
const CHUNK_SIZE: usize = 64 * 1024;

/// [`MediaSource`] backed by the `yt-dlp` and `ffmpeg` command-line tools.
///
/// Video downloads are a single `yt-dlp` process writing to stdout. Audio
/// downloads pipe that stdout straight into `ffmpeg`, which encodes mp3 at the
/// requested bitrate. Every child is spawned with `kill_on_drop`, so dropping
/// the stream (for example when the HTTP client goes away) tears the pipeline
/// down.
#[derive(Debug, Clone)]
pub struct YtDlpSource {
    yt_dlp: PathBuf,
    ffmpeg: PathBuf,
    probe_timeout: Duration,
}

impl YtDlpSource {
    pub fn new(yt_dlp: impl Into<PathBuf>, ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            yt_dlp: yt_dlp.into(),
            ffmpeg: ffmpeg.into(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    fn probe_args(url: &str) -> Vec<String> {
        ["-J", "--no-playlist", "--no-warnings", "--", url]
            .map(str::to_owned)
            .to_vec()
    }

    fn download_args(plan: &DownloadPlan) -> Vec<String> {
        vec![
            "--quiet".into(),
            "--no-warnings".into(),
            "--no-playlist".into(),
            "--no-part".into(),
            "-f".into(),
            plan.format_selector(),
            "-o".into(),
            "-".into(),
            "--".into(),
            plan.source_url(),
        ]
    }

    fn transcode_args(bitrate: &str) -> Vec<String> {
        [
            "-hide_banner", "-loglevel", "error", "-i", "pipe:0", "-vn", "-c:a", "libmp3lame",
            "-b:a", bitrate, "-f", "mp3", "pipe:1",
        ]
        .map(str::to_owned)
        .to_vec()
    }

    fn spawn(
        stage: &'static str,
        program: &Path,
        args: &[String],
        stdin: Stdio,
    ) -> Result<Child, FetchError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(stdin)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| FetchError::Spawn {
                program: program.display().to_string(),
                source,
            })?;

        if let Some(stderr) = child.stderr.take() {
            drain_stderr(stage, stderr);
        }
        debug!(stage, program = %program.display(), ?args, "spawned");
        Ok(child)
    }
}

#[async_trait]
impl MediaSource for YtDlpSource {
    async fn probe(&self, url: &str) -> Result<VideoInfo, FetchError> {
        let program = self.yt_dlp.display().to_string();
        debug!(%url, "probing video metadata");

        let child = Command::new(&self.yt_dlp)
            .args(Self::probe_args(url))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| FetchError::Spawn {
                program: program.clone(),
                source,
            })?;

        let output = tokio::time::timeout(self.probe_timeout, child.wait_with_output())
            .await
            .map_err(|_| FetchError::Timeout {
                program: program.clone(),
                seconds: self.probe_timeout.as_secs(),
            })??;

        if !output.status.success() {
            return Err(FetchError::Exit {
                program,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        parse_info(&output.stdout)
    }

    async fn open(&self, plan: &DownloadPlan) -> Result<MediaStream, FetchError> {
        info!(
            video_id = %plan.video_id,
            format = %plan.format,
            quality = %plan.quality,
            "starting media pipeline"
        );

        let mut fetch = Self::spawn(
            "yt-dlp",
            &self.yt_dlp,
            &Self::download_args(plan),
            Stdio::null(),
        )?;
        let fetched = take_stdout(&mut fetch)?;

        let (stdout, stages) = match plan.audio_bitrate() {
            None => (fetched, vec![Stage::new("yt-dlp", fetch)]),
            Some(bitrate) => {
                let piped: Stdio = fetched.try_into()?;
                let mut transcode = Self::spawn(
                    "ffmpeg",
                    &self.ffmpeg,
                    &Self::transcode_args(&bitrate),
                    piped,
                )?;
                let encoded = take_stdout(&mut transcode)?;
                (
                    encoded,
                    vec![Stage::new("yt-dlp", fetch), Stage::new("ffmpeg", transcode)],
                )
            }
        };

        Ok(pipeline_stream(stdout, stages))
    }
}

fn take_stdout(child: &mut Child) -> Result<ChildStdout, FetchError> {
    child
        .stdout
        .take()
        .ok_or_else(|| FetchError::Io(io::Error::other("child stdout was not captured")))
}

fn drain_stderr(stage: &'static str, stderr: ChildStderr) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            warn!(stage, "{line}");
        }
    });
}

struct Stage {
    name: &'static str,
    child: Child,
}

impl Stage {
    fn new(name: &'static str, child: Child) -> Self {
        Self { name, child }
    }
}

struct Pipeline {
    reader: ReaderStream<ChildStdout>,
    stages: Vec<Stage>,
    finished: bool,
}

impl Pipeline {
    /// Reap every stage once the last stdout hits EOF.
    async fn finish(&mut self) -> io::Result<()> {
        for stage in &mut self.stages {
            let status = stage.child.wait().await?;
            if !status.success() {
                return Err(io::Error::other(format!(
                    "{} exited with {status}",
                    stage.name
                )));
            }
        }
        Ok(())
    }
}

fn pipeline_stream(stdout: ChildStdout, stages: Vec<Stage>) -> MediaStream {
    let pipeline = Pipeline {
        reader: ReaderStream::with_capacity(stdout, CHUNK_SIZE),
        stages,
        finished: false,
    };

    stream::unfold(pipeline, |mut pipeline| async move {
        if pipeline.finished {
            return None;
        }
        match pipeline.reader.next().await {
            Some(chunk) => Some((chunk, pipeline)),
            None => {
                pipeline.finished = true;
                match pipeline.finish().await {
                    Ok(()) => {
                        debug!("media pipeline finished");
                        None
                    }
                    Err(e) => {
                        warn!(error = %e, "media pipeline failed");
                        Some((Err(e), pipeline))
                    }
                }
            }
        }
    })
    .boxed()
}

// ── yt-dlp metadata ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawInfo {
    title: Option<String>,
    duration: Option<f64>,
    thumbnail: Option<String>,
    #[serde(default)]
    formats: Vec<RawFormat>,
}

#[derive(Debug, Deserialize)]
struct RawFormat {
    format_id: Option<String>,
    ext: Option<String>,
    resolution: Option<String>,
    fps: Option<f64>,
    vcodec: Option<String>,
    acodec: Option<String>,
    filesize: Option<u64>,
    format_note: Option<String>,
    abr: Option<f64>,
}

fn has_codec(codec: Option<&str>) -> bool {
    codec.is_some_and(|c| c != "none")
}

impl From<RawFormat> for FormatInfo {
    fn from(raw: RawFormat) -> Self {
        let has_video = has_codec(raw.vcodec.as_deref());
        let has_audio = has_codec(raw.acodec.as_deref());
        let quality = raw
            .format_note
            .or_else(|| raw.abr.map(|abr| format!("{abr:.0}kbps")));
        FormatInfo {
            format_id: raw.format_id,
            ext: raw.ext,
            resolution: raw.resolution.unwrap_or_else(|| "N/A".to_owned()),
            fps: raw.fps,
            vcodec: raw.vcodec,
            acodec: raw.acodec,
            filesize: raw.filesize,
            quality,
            has_video,
            has_audio,
        }
    }
}

fn parse_info(json: &[u8]) -> Result<VideoInfo, FetchError> {
    let raw: RawInfo = serde_json::from_slice(json)?;
    Ok(VideoInfo {
        title: raw.title.unwrap_or_else(|| "Unknown".to_owned()),
        duration: raw.duration.map_or(0, |d| d.round() as u64),
        thumbnail: raw.thumbnail.unwrap_or_default(),
        formats: raw
            .formats
            .into_iter()
            .map(FormatInfo::from)
            .filter(|f| f.has_video || f.has_audio)
            .collect(),
    })
}
