// Error types for the download coordinator and its backends

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where in the pipeline a failure originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Rejected before the backend was invoked
    Input,
    /// Raised by the fetch backend during extraction, download or conversion
    Backend,
    /// The backend finished but no file exists at the resolved path
    Reconciliation,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DownloadError {
    /// Empty or whitespace-only URL
    #[error("URL required")]
    UrlRequired,

    /// Filename override that would escape the output directory
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    /// Output directory that cannot be made absolute (empty path)
    #[error("Invalid output directory: {0}")]
    InvalidOutputDirectory(String),

    /// Format label that does not name a known container
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Backend rejected the URL (unsupported site, malformed link)
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Network timeout while talking to the media host
    #[error("Network timeout: {0}")]
    NetworkTimeout(String),

    /// Host throttled or blocked the request (429, bot check)
    #[error("Blocked by host: {0}")]
    Blocked(String),

    /// yt-dlp (or ffmpeg) not found in system
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Failed to parse backend output
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Any other fault raised by the backend, message kept verbatim
    #[error("{0}")]
    Backend(String),

    /// Neither the reconciled nor the reported path exists
    #[error("File not found after processing")]
    FileNotFound,
}

impl DownloadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UrlRequired
            | Self::InvalidFilename(_)
            | Self::InvalidOutputDirectory(_)
            | Self::UnsupportedFormat(_) => ErrorKind::Input,
            Self::FileNotFound => ErrorKind::Reconciliation,
            Self::InvalidUrl(_)
            | Self::NetworkTimeout(_)
            | Self::Blocked(_)
            | Self::ToolNotFound(_)
            | Self::ParseError(_)
            | Self::Backend(_) => ErrorKind::Backend,
        }
    }
}

// Classify raw backend stderr into a typed error
impl From<String> for DownloadError {
    fn from(s: String) -> Self {
        let s = s.trim().to_string();
        let lower = s.to_lowercase();

        if lower.contains("timeout") || lower.contains("timed out") {
            return Self::NetworkTimeout(s);
        }

        if lower.contains("http error 429")
            || lower.contains("too many requests")
            || lower.contains("confirm you're not a bot")
        {
            return Self::Blocked(s);
        }

        if lower.contains("unsupported url") || lower.contains("is not a valid url") {
            return Self::InvalidUrl(s);
        }

        if lower.contains("command not found")
            || lower.contains("no such file or directory")
            || lower.contains("ffmpeg not found")
            || lower.contains("ffprobe and ffmpeg not found")
        {
            return Self::ToolNotFound(s);
        }

        Self::Backend(s)
    }
}

impl From<&str> for DownloadError {
    fn from(s: &str) -> Self {
        s.to_string().into()
    }
}
