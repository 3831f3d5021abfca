// Fetch backend trait definition

use async_trait::async_trait;

use super::errors::DownloadError;
use super::models::{FetchInvocation, FetchOutput, ProgressEvent, RawProgress};

/// External capability that extracts, downloads and optionally transcodes media
#[async_trait]
pub trait FetchBackend: Send + Sync {
    /// Name of the backend (for logging)
    fn name(&self) -> &'static str;

    /// Perform one fetch, reporting raw progress through `progress`
    async fn fetch(
        &self,
        invocation: &FetchInvocation,
        progress: &ProgressEmitter<'_>,
    ) -> Result<FetchOutput, DownloadError>;
}

/// Normalizes backend progress signals and forwards them to the caller
pub struct ProgressEmitter<'a> {
    sink: &'a (dyn Fn(ProgressEvent) + Send + Sync),
}

impl<'a> ProgressEmitter<'a> {
    pub fn new(sink: &'a (dyn Fn(ProgressEvent) + Send + Sync)) -> Self {
        Self { sink }
    }

    pub fn emit(&self, event: ProgressEvent) {
        (self.sink)(event);
    }

    pub fn emit_raw(&self, raw: &RawProgress) {
        match ProgressEvent::from_raw(raw) {
            Some(event) => self.emit(event),
            None => tracing::trace!(status = %raw.status, "Ignoring progress status"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_emit_raw_normalizes_and_filters() {
        let seen = Mutex::new(Vec::new());
        let sink = |event: ProgressEvent| seen.lock().unwrap().push(event);
        let emitter = ProgressEmitter::new(&sink);

        emitter.emit_raw(&RawProgress {
            status: "downloading".to_string(),
            downloaded_bytes: Some(1.0),
            ..Default::default()
        });
        emitter.emit_raw(&RawProgress {
            status: "error".to_string(),
            ..Default::default()
        });
        emitter.emit_raw(&RawProgress {
            status: "finished".to_string(),
            ..Default::default()
        });

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], ProgressEvent::Finished);
    }
}
