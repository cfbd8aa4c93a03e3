use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "typeboard=warn";

/// Log to stderr, filtered by `RUST_LOG` (default: warnings from this crate).
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    // a second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
