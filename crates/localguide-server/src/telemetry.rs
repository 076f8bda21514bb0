//! Logging setup with optional OTLP trace export.

use anyhow::Result;
use localguide_config::TelemetryConfig;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace as sdktrace, Resource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Flushes pending spans when dropped, if export was enabled.
#[must_use = "dropping the guard shuts down trace export"]
pub struct TelemetryGuard {
    otlp_enabled: bool,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if self.otlp_enabled {
            opentelemetry::global::shutdown_tracer_provider();
        }
    }
}

/// Installs the global subscriber: compact fmt output filtered by `RUST_LOG`
/// (default `info`), plus an OTLP/gRPC exporter when enabled.
pub fn init(config: &TelemetryConfig) -> Result<TelemetryGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let tracer = match config.enabled {
        true => Some(otlp_tracer(config)?),
        false => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .with(tracer.map(|t| tracing_opentelemetry::layer().with_tracer(t)))
        .try_init()?;

    if config.enabled {
        tracing::info!(
            "Exporting traces to {} as '{}'",
            config.otlp_endpoint,
            config.service_name
        );
    }

    Ok(TelemetryGuard { otlp_enabled: config.enabled })
}

fn otlp_tracer(config: &TelemetryConfig) -> Result<sdktrace::Tracer> {
    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(config.otlp_endpoint.clone());

    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![KeyValue::new(
            "service.name",
            config.service_name.clone(),
        )])))
        .install_batch(runtime::Tokio)?;

    Ok(tracer)
}
