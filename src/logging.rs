use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber. `RUST_LOG` wins over `default_level`.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter_for(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Filter built from a configured level such as `logging.level = "debug"`.
pub fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::new(level)
}
