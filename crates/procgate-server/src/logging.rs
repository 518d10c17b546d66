//! Logging and tracing setup
//!
//! Console output is pretty by default or JSON lines when configured. An
//! optional directory adds a daily-rotated JSON file layer. `RUST_LOG`
//! overrides the configured filter.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::LoggingConfig;

/// Install the global subscriber.
///
/// The returned guard flushes the file writer and must be kept alive until
/// shutdown.
pub fn init(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.filter))?;

    let mut layers = Vec::new();

    let console_layer = if config.json {
        fmt::layer()
            .with_target(true)
            .with_ansi(false)
            .json()
            .with_current_span(true)
            .with_filter(env_filter.clone())
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_ansi(true)
            .pretty()
            .with_filter(env_filter.clone())
            .boxed()
    };
    layers.push(console_layer);

    let guard = match &config.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = tracing_appender::rolling::daily(dir, "procgate.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let json_layer = fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false)
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(non_blocking)
                .with_filter(env_filter)
                .boxed();
            layers.push(json_layer);

            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry().with(layers).try_init()?;

    tracing::info!(
        filter = %config.filter,
        json = config.json,
        log_dir = config.directory.as_ref().map(|d| d.display().to_string()),
        "logging initialized"
    );

    Ok(guard)
}
