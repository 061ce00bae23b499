use {
    super::*,
    tracing_appender::{non_blocking, non_blocking::WorkerGuard},
    tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt},
};

const DEFAULT_FILTER: &str = "warn,coinminer=info";

/// Installs the global subscriber, writing to stderr through a background
/// thread. Keep the returned guard alive so buffered lines are flushed on
/// exit.
pub(crate) fn init() -> WorkerGuard {
    let (writer, guard) = non_blocking(io::stderr());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(writer),
        )
        .with(filter)
        .init();

    guard
}
