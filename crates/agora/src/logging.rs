//! Tracing subscriber setup.

use agora_settings::LoggingSettings;
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` when set and valid, else the configured level.
pub fn resolve_filter(rust_log: Option<&str>, level: &str) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(settings: &LoggingSettings) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = resolve_filter(rust_log.as_deref(), &settings.level);
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let _ = if settings.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
