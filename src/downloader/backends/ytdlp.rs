use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

use crate::downloader::errors::DownloadError;
use crate::downloader::models::{FetchInvocation, FetchOutput, NetworkConfig, RawProgress};
use crate::downloader::tools::{locate_ytdlp, probe_ytdlp, ToolInfo};
use crate::downloader::traits::{FetchBackend, ProgressEmitter};
use crate::downloader::utils::{get_proxy_args, get_timeout_args};

// Marker prefixes yt-dlp is told to put in front of machine-readable lines
const PROGRESS_TEMPLATE: &str = "download:[progress] %(progress)j";
const REPORTED_TEMPLATE: &str = "before_dl:[reported] %(filename)s";

lazy_static::lazy_static! {
    static ref MARKER_RE: Regex = Regex::new(r"^\[(progress|reported)\]\s(.+)$").unwrap();
}

/// Settings for the yt-dlp subprocess
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct YtDlpConfig {
    /// Explicit binary; discovered when unset
    pub binary: Option<PathBuf>,
    pub network: NetworkConfig,
    /// Directory or binary path handed to `--ffmpeg-location`
    pub ffmpeg_location: Option<PathBuf>,
}

impl YtDlpConfig {
    /// Read `YTDLP_BIN`, `YTDLP_PROXY`, `YTDLP_SOCKET_TIMEOUT` and `FFMPEG_LOCATION`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        config.binary = non_empty("YTDLP_BIN").map(PathBuf::from);
        config.ffmpeg_location = non_empty("FFMPEG_LOCATION").map(PathBuf::from);
        if let Some(proxy) = non_empty("YTDLP_PROXY") {
            config.network.proxy = Some(proxy);
        }
        if let Some(raw) = non_empty("YTDLP_SOCKET_TIMEOUT") {
            match raw.trim().parse::<u32>() {
                Ok(secs) => config.network.timeout = Some(secs),
                Err(_) => tracing::warn!(value = %raw, "Ignoring invalid YTDLP_SOCKET_TIMEOUT"),
            }
        }

        config
    }
}

/// Fetch backend driving the yt-dlp command-line tool
pub struct YtDlpCli {
    ytdlp_bin: PathBuf,
    config: YtDlpConfig,
}

impl YtDlpCli {
    pub fn new(config: YtDlpConfig) -> Self {
        let ytdlp_bin = locate_ytdlp(config.binary.as_deref());
        tracing::debug!(bin = %ytdlp_bin.display(), "Using yt-dlp");
        Self { ytdlp_bin, config }
    }

    pub fn binary(&self) -> &Path {
        &self.ytdlp_bin
    }

    /// Check that the binary runs and report its version
    pub async fn probe(&self) -> ToolInfo {
        probe_ytdlp(&self.ytdlp_bin).await
    }

    fn build_args(&self, invocation: &FetchInvocation) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            invocation.selection.to_string(),
            "-o".to_string(),
            invocation.output_template.to_string_lossy().into_owned(),
        ];

        if invocation.no_playlist {
            args.push("--no-playlist".to_string());
        }
        if invocation.quiet {
            args.push("--quiet".to_string());
            args.push("--no-warnings".to_string());
        }

        args.extend(
            [
                "--newline",
                "--progress",
                "--progress-template",
                PROGRESS_TEMPLATE,
                "--print",
                REPORTED_TEMPLATE,
                "--no-simulate",
            ]
            .map(String::from),
        );

        if let Some(directive) = &invocation.post_process {
            args.extend([
                "-x".to_string(),
                "--audio-format".to_string(),
                directive.target_codec.clone(),
                "--audio-quality".to_string(),
                directive.target_quality.clone(),
            ]);
        }

        if let Some(ffmpeg) = &self.config.ffmpeg_location {
            args.push("--ffmpeg-location".to_string());
            args.push(ffmpeg.to_string_lossy().into_owned());
        }

        args.extend(get_proxy_args(&self.config.network));
        args.extend(get_timeout_args(&self.config.network));

        args.push("--".to_string());
        args.push(invocation.url.clone());
        args
    }
}

#[async_trait]
impl FetchBackend for YtDlpCli {
    fn name(&self) -> &'static str {
        "yt-dlp-cli"
    }

    async fn fetch(
        &self,
        invocation: &FetchInvocation,
        progress: &ProgressEmitter<'_>,
    ) -> Result<FetchOutput, DownloadError> {
        let args = self.build_args(invocation);
        tracing::debug!(bin = %self.binary().display(), ?args, "Spawning yt-dlp");

        let mut child = Command::new(self.binary())
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DownloadError::ToolNotFound(format!("yt-dlp: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DownloadError::Backend("Failed to capture yt-dlp stdout".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| DownloadError::Backend("Failed to capture yt-dlp stderr".to_string()))?;

        // Drain stderr concurrently so a chatty child never blocks on a full pipe
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            buf
        });

        // Titles are not guaranteed to be valid UTF-8; decode each line lossily
        let mut reported = None;
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = reader.read_until(b'\n', &mut buf).await.map_err(|e| {
                DownloadError::Backend(format!("Failed to read yt-dlp output: {}", e))
            })?;
            if read == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            match parse_stdout_line(&line) {
                StdoutLine::Progress(raw) => progress.emit_raw(&raw),
                StdoutLine::Reported(path) => reported = Some(path),
                StdoutLine::Other => tracing::trace!("[yt-dlp] {}", line),
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| DownloadError::Backend(format!("Failed to wait for yt-dlp: {}", e)))?;
        let stderr = stderr_task.await.unwrap_or_default();

        if !status.success() {
            return Err(backend_error(&String::from_utf8_lossy(&stderr), status));
        }

        let reported_path = reported.ok_or_else(|| {
            DownloadError::ParseError("yt-dlp did not report an output filename".to_string())
        })?;
        tracing::debug!(reported = %reported_path.display(), "yt-dlp finished");

        Ok(FetchOutput { reported_path })
    }
}

#[derive(Debug, PartialEq)]
enum StdoutLine {
    Progress(RawProgress),
    Reported(PathBuf),
    Other,
}

fn parse_stdout_line(line: &str) -> StdoutLine {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(caps) = MARKER_RE.captures(line) else {
        return StdoutLine::Other;
    };
    let payload = &caps[2];

    match &caps[1] {
        "progress" => match serde_json::from_str::<RawProgress>(payload) {
            Ok(raw) => StdoutLine::Progress(raw),
            Err(e) => {
                tracing::debug!("Unparseable progress line ({}): {}", e, payload);
                StdoutLine::Other
            }
        },
        _ => StdoutLine::Reported(PathBuf::from(payload)),
    }
}

/// Prefer yt-dlp's own `ERROR:` lines; fall back to raw stderr, then the exit status
fn backend_error(stderr: &str, status: ExitStatus) -> DownloadError {
    let errors: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with("ERROR:"))
        .collect();

    if !errors.is_empty() {
        return DownloadError::from(errors.join("\n"));
    }

    let trimmed = stderr.trim();
    if !trimmed.is_empty() {
        return DownloadError::from(trimmed.to_string());
    }

    DownloadError::Backend(format!("yt-dlp exited with {}", status))
}
