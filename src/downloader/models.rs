// Common data models for the coordinator and its backends

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use super::errors::{DownloadError, ErrorKind};
use super::format_selector::FormatSelector;

/// Default yt-dlp output template (title-based naming)
pub const DEFAULT_OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Output container requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatChoice {
    /// Video with audio (mp4 or whatever the merger produces)
    VideoContainer,
    /// Native m4a audio stream
    AudioContainerM4A,
    /// Audio transcoded to mp3 after download
    AudioContainerMP3,
}

/// Quality tier requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityPreference {
    Best,
    /// Pixel-height ceiling (1080, 720, 480, 360...)
    HeightCapped(NonZeroU32),
    AudioOnly,
}

impl QualityPreference {
    /// Height-capped preference; `None` for a zero height
    pub fn height_capped(height: u32) -> Option<Self> {
        NonZeroU32::new(height).map(Self::HeightCapped)
    }
}

/// Stream-selection expression in yt-dlp's `-f` grammar.
///
/// Only the format selector builds these, so an expression is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SelectionExpression(String);

impl SelectionExpression {
    pub(crate) fn new(expr: impl Into<String>) -> Self {
        Self(expr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SelectionExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Audio conversion applied by the backend after the raw download
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostProcessDirective {
    pub target_codec: String,
    pub target_quality: String,
}

impl PostProcessDirective {
    pub fn mp3() -> Self {
        Self {
            target_codec: "mp3".to_string(),
            target_quality: "192".to_string(),
        }
    }

    /// Extension the converted file ends up with
    pub fn target_extension(&self) -> &str {
        match self.target_codec.as_str() {
            "aac" | "alac" => "m4a",
            "vorbis" => "ogg",
            other => other,
        }
    }
}

/// Output of the format selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFormat {
    pub selection: SelectionExpression,
    pub post_process: Option<PostProcessDirective>,
}

/// One user-initiated download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub source_url: String,
    pub output_directory: PathBuf,
    pub output_name_template: String,
    pub selection: SelectionExpression,
    pub post_process: Option<PostProcessDirective>,
}

impl DownloadRequest {
    /// Build a request with title-based naming
    pub fn new(
        source_url: impl Into<String>,
        output_directory: impl Into<PathBuf>,
        format: FormatChoice,
        quality: QualityPreference,
    ) -> Self {
        let resolved = FormatSelector::resolve(format, quality);
        Self {
            source_url: source_url.into(),
            output_directory: output_directory.into(),
            output_name_template: DEFAULT_OUTPUT_TEMPLATE.to_string(),
            selection: resolved.selection,
            post_process: resolved.post_process,
        }
    }

    /// Replace title-based naming with a fixed stem. Blank overrides are ignored.
    pub fn with_filename_override(mut self, stem: &str) -> Self {
        let stem = stem.trim();
        if !stem.is_empty() {
            self.output_name_template = format!("{}.%(ext)s", stem);
        }
        self
    }

    /// Full output template handed to the backend
    pub fn output_template(&self) -> PathBuf {
        self.output_directory.join(&self.output_name_template)
    }
}

/// Progress signal as reported by the backend's progress hook
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawProgress {
    pub status: String,
    #[serde(default)]
    pub downloaded_bytes: Option<f64>,
    #[serde(default)]
    pub total_bytes: Option<f64>,
    #[serde(default)]
    pub total_bytes_estimate: Option<f64>,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Normalized progress event delivered to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProgressEvent {
    Downloading {
        bytes_done: u64,
        /// Absent for streams of unknown length
        bytes_total: Option<u64>,
        filename: Option<String>,
    },
    Finished,
}

impl ProgressEvent {
    /// Normalize a backend signal; statuses other than downloading/finished yield `None`
    pub fn from_raw(raw: &RawProgress) -> Option<Self> {
        match raw.status.as_str() {
            "downloading" => {
                let bytes_total = raw
                    .total_bytes
                    .or(raw.total_bytes_estimate)
                    .filter(|t| t.is_finite() && *t > 0.0)
                    .map(|t| t as u64);
                Some(Self::Downloading {
                    bytes_done: raw
                        .downloaded_bytes
                        .filter(|b| b.is_finite() && *b > 0.0)
                        .map_or(0, |b| b as u64),
                    bytes_total,
                    filename: raw.filename.clone(),
                })
            }
            "finished" => Some(Self::Finished),
            _ => None,
        }
    }

    /// Completion percentage, only when the total size is known
    pub fn percent(&self) -> Option<f32> {
        match self {
            Self::Downloading {
                bytes_done,
                bytes_total: Some(total),
                ..
            } if *total > 0 => {
                let ratio = *bytes_done as f64 / *total as f64;
                Some((ratio * 100.0).clamp(0.0, 100.0) as f32)
            }
            _ => None,
        }
    }
}

/// Consumer-facing progress representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadProgress {
    pub percent: Option<f32>,
    pub status: String,
}

impl From<&ProgressEvent> for DownloadProgress {
    fn from(event: &ProgressEvent) -> Self {
        let percent = event.percent();
        let status = match event {
            ProgressEvent::Downloading {
                bytes_done,
                filename,
                ..
            } => {
                let name = filename
                    .as_deref()
                    .and_then(|f| Path::new(f).file_name())
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                match percent {
                    Some(p) => format!("Downloading: {} ({:.0}%)", name, p),
                    None => format!("Downloading: {} ({} bytes)...", name, bytes_done),
                }
            }
            ProgressEvent::Finished => "Download finished, processing...".to_string(),
        };
        Self { percent, status }
    }
}

/// Terminal outcome of one coordinator call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DownloadResult {
    Success { final_path: PathBuf },
    Failure { kind: ErrorKind, message: String },
}

impl DownloadResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn into_result(self) -> Result<PathBuf, String> {
        match self {
            Self::Success { final_path } => Ok(final_path),
            Self::Failure { message, .. } => Err(message),
        }
    }
}

impl From<Result<PathBuf, DownloadError>> for DownloadResult {
    fn from(result: Result<PathBuf, DownloadError>) -> Self {
        match result {
            Ok(final_path) => Self::Success { final_path },
            Err(e) => Self::Failure {
                kind: e.kind(),
                message: e.to_string(),
            },
        }
    }
}

/// Everything a backend needs for one fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchInvocation {
    pub url: String,
    pub output_template: PathBuf,
    pub selection: SelectionExpression,
    pub post_process: Option<PostProcessDirective>,
    pub no_playlist: bool,
    pub quiet: bool,
}

impl From<&DownloadRequest> for FetchInvocation {
    fn from(request: &DownloadRequest) -> Self {
        Self {
            url: request.source_url.trim().to_string(),
            output_template: request.output_template(),
            selection: request.selection.clone(),
            post_process: request.post_process.clone(),
            no_playlist: true,
            quiet: true,
        }
    }
}

/// What the backend reports after a successful fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    /// Filename before any post-processing rename
    pub reported_path: PathBuf,
}

/// Network configuration for backends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Proxy URL (e.g., "socks5://127.0.0.1:1080")
    pub proxy: Option<String>,

    /// Socket timeout in seconds
    pub timeout: Option<u32>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout: Some(30),
        }
    }
}
