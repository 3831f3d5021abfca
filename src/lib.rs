//! Format resolution and download orchestration over a media-fetch backend.
//!
//! ```no_run
//! use std::sync::Arc;
//! use media_orchestrator::{
//!     DownloadCoordinator, DownloadProgress, DownloadRequest, FormatChoice, QualityPreference,
//!     YtDlpCli, YtDlpConfig,
//! };
//!
//! # async fn run() {
//! let coordinator = DownloadCoordinator::new(Arc::new(YtDlpCli::new(YtDlpConfig::from_env())));
//! let request = DownloadRequest::new(
//!     "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
//!     "/tmp/downloads",
//!     FormatChoice::AudioContainerMP3,
//!     QualityPreference::Best,
//! );
//! let _result = coordinator
//!     .execute(&request, |event| println!("{}", DownloadProgress::from(&event).status))
//!     .await;
//! # }
//! ```

pub mod downloader;
pub mod logging;

pub use downloader::backends::{YtDlpCli, YtDlpConfig};
pub use downloader::{
    resolve, DownloadCoordinator, DownloadError, DownloadProgress, DownloadRequest, DownloadResult,
    ErrorKind, FetchBackend, FormatChoice, PostProcessDirective, ProgressEmitter, ProgressEvent,
    QualityPreference, ResolvedFormat, SelectionExpression,
};
