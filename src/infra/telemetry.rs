use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "folio_cache_hit_total",
            Unit::Count,
            "Reads served from the cache, by key family."
        );
        describe_counter!(
            "folio_cache_miss_total",
            Unit::Count,
            "Reads that fell through to the store, by key family."
        );
        describe_counter!(
            "folio_cache_error_total",
            Unit::Count,
            "Cache backend operations that failed or timed out, by operation."
        );
        describe_counter!(
            "folio_cache_malformed_total",
            Unit::Count,
            "Cached payloads that failed to deserialize."
        );
        describe_counter!(
            "folio_cache_invalidate_total",
            Unit::Count,
            "Cache keys deleted after a committed write."
        );
        describe_histogram!(
            "folio_store_load_ms",
            Unit::Milliseconds,
            "Store query latency on the cache-miss path in milliseconds."
        );
    });
}
