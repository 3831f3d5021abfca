// Download coordinator: one backend invocation per request, then path reconciliation

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use super::errors::DownloadError;
use super::models::{
    DownloadRequest, DownloadResult, FetchInvocation, PostProcessDirective, ProgressEvent,
};
use super::traits::{FetchBackend, ProgressEmitter};

pub struct DownloadCoordinator {
    backend: Arc<dyn FetchBackend>,
}

impl DownloadCoordinator {
    pub fn new(backend: Arc<dyn FetchBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Run one download. Never fails outward: every error becomes `Failure`.
    pub async fn execute<F>(&self, request: &DownloadRequest, on_progress: F) -> DownloadResult
    where
        F: Fn(ProgressEvent) + Send + Sync,
    {
        let result = self.try_execute(request, on_progress).await;
        match &result {
            Ok(path) => tracing::info!(path = %path.display(), "Download complete"),
            Err(e) => tracing::error!(kind = ?e.kind(), "Download failed: {}", e),
        }
        result.into()
    }

    /// Same as [`execute`](Self::execute) but returns the typed error
    pub async fn try_execute<F>(
        &self,
        request: &DownloadRequest,
        on_progress: F,
    ) -> Result<PathBuf, DownloadError>
    where
        F: Fn(ProgressEvent) + Send + Sync,
    {
        validate(request)?;

        // yt-dlp echoes the template back, so it must not depend on how the
        // directory was spelled
        let output_directory = std::path::absolute(&request.output_directory).map_err(|e| {
            DownloadError::InvalidOutputDirectory(format!(
                "{}: {}",
                request.output_directory.display(),
                e
            ))
        })?;

        let mut invocation = FetchInvocation::from(request);
        invocation.output_template = output_directory.join(&request.output_name_template);
        tracing::info!(
            backend = self.backend_name(),
            url = %invocation.url,
            selection = %invocation.selection,
            "Starting download"
        );

        let emitter = ProgressEmitter::new(&on_progress);
        let output = self.backend.fetch(&invocation, &emitter).await?;

        let reported = resolve_reported(output.reported_path, &output_directory);

        let final_path = reconcile_path(&reported, request.post_process.as_ref()).await;
        if is_file(&final_path).await {
            Ok(final_path)
        } else {
            Err(DownloadError::FileNotFound)
        }
    }
}

fn validate(request: &DownloadRequest) -> Result<(), DownloadError> {
    if request.source_url.trim().is_empty() {
        return Err(DownloadError::UrlRequired);
    }

    let template = request.output_name_template.as_str();
    let escapes = template.contains('/')
        || template.contains('\\')
        || Path::new(template)
            .components()
            .any(|c| matches!(c, Component::ParentDir));
    if escapes {
        return Err(DownloadError::InvalidFilename(template.to_string()));
    }

    Ok(())
}

/// Bare file names live in the output directory; other relative paths are
/// relative to the working directory the backend ran in
fn resolve_reported(reported: PathBuf, output_directory: &Path) -> PathBuf {
    if reported.is_absolute() {
        return reported;
    }

    let bare = reported
        .parent()
        .map_or(true, |parent| parent.as_os_str().is_empty());
    if bare {
        output_directory.join(reported)
    } else {
        std::path::absolute(&reported).unwrap_or(reported)
    }
}

/// Prefer the post-processed sibling (same directory and stem, target extension)
/// when it exists; otherwise keep the reported path.
pub async fn reconcile_path(
    reported: &Path,
    post_process: Option<&PostProcessDirective>,
) -> PathBuf {
    let Some(directive) = post_process else {
        return reported.to_path_buf();
    };

    let candidate = reported.with_extension(directive.target_extension());
    if is_file(&candidate).await {
        tracing::debug!(
            reported = %reported.display(),
            converted = %candidate.display(),
            "Using post-processed output"
        );
        candidate
    } else {
        tracing::warn!(
            candidate = %candidate.display(),
            "Converted file not found, falling back to reported path"
        );
        reported.to_path_buf()
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}
