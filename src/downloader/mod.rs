// Downloader module - format resolution and download coordination

pub mod backends;
pub mod errors;
pub mod format_selector;
pub mod models;
pub mod orchestrator;
pub mod tools;
pub mod traits;
pub mod utils;

pub use errors::{DownloadError, ErrorKind};
pub use format_selector::{resolve, FormatSelector};
pub use models::{
    DownloadProgress, DownloadRequest, DownloadResult, FetchInvocation, FetchOutput, FormatChoice,
    NetworkConfig, PostProcessDirective, ProgressEvent, QualityPreference, RawProgress,
    ResolvedFormat, SelectionExpression, DEFAULT_OUTPUT_TEMPLATE,
};
pub use orchestrator::{reconcile_path, DownloadCoordinator};
pub use traits::{FetchBackend, ProgressEmitter};
