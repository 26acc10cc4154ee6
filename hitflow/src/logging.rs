use metrics_exporter_statsd::StatsdBuilder;
use shared::metrics_defs::describe_all;
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LoggingConfig, MetricsConfig};
use crate::metrics_defs::ALL_METRICS;

#[derive(Error, Debug)]
pub enum MetricsInitError {
    #[error("could not build statsd exporter: {0}")]
    Exporter(String),
    #[error("a metrics recorder is already installed")]
    AlreadyInstalled,
}

/// Installs the tracing subscriber, plus the sentry layer when a DSN is set.
///
/// The returned guard flushes pending sentry events on drop and must be kept
/// alive for the duration of the process.
pub fn init_logging(config: &LoggingConfig) -> Option<sentry::ClientInitGuard> {
    let guard = config.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(guard.as_ref().map(|_| sentry::integrations::tracing::layer()))
        .init();

    guard
}

/// Installs the statsd exporter as the global metrics recorder
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsInitError> {
    let recorder = StatsdBuilder::from(config.statsd_host.clone(), config.statsd_port)
        .build(Some(&config.prefix))
        .map_err(|e| MetricsInitError::Exporter(e.to_string()))?;

    metrics::set_global_recorder(recorder).map_err(|_| MetricsInitError::AlreadyInstalled)?;
    describe_all(ALL_METRICS);

    tracing::info!(
        host = %config.statsd_host,
        port = config.statsd_port,
        "Sending metrics to statsd"
    );
    Ok(())
}
