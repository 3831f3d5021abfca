// Tracing subscriber bootstrap

const DEFAULT_FILTER: &str = "media_orchestrator=info";

/// Install a fmt subscriber filtered by `RUST_LOG` (default `media_orchestrator=info`).
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_FILTER.into());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
