//! Subscriber setup.

use super::exporter::{self, SCOPE};
use super::rotation::RotationPolicy;
use crate::infrastructure::paths;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_sdk::resource::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Trace file name inside the data directory.
pub const TRACE_FILE: &str = "pokedex-otlp.json";

/// Installs the global subscriber exporting spans to `<data_dir>/pokedex-otlp.json`.
///
/// The filter comes from `config.trace_level` and defaults to `"info"`.
/// Tracing is best effort: if the data directory cannot be created, or a
/// global subscriber is already installed, this returns without effect.
///
/// ```rust,no_run
/// use pokedex_sync::observability::init_tracing;
/// use pokedex_sync::Config;
///
/// let config = Config {
///     trace_level: Some("debug".to_string()),
///     ..Default::default()
/// };
/// init_tracing(&config);
/// tracing::debug!("tracing is active");
/// ```
pub fn init_tracing(config: &Config) {
    let level = config.trace_level.as_deref().unwrap_or("info");

    let data_dir = paths::data_dir(config);
    if std::fs::create_dir_all(&data_dir).is_err() {
        return;
    }

    let resource = Resource::new(vec![KeyValue::new("service.name", SCOPE)]);
    let policy = RotationPolicy {
        max_bytes: config.trace_max_bytes,
        backups: config.trace_backups,
    };
    let provider = exporter::create_tracer_provider(data_dir.join(TRACE_FILE), policy, resource);

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(OpenTelemetryLayer::new(provider.tracer(SCOPE)));

    let _ = subscriber.try_init();
}
