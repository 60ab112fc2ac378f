// Tracing initialization with a configurable level and optional OTLP export.
use anyhow::{Context, Result};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{Protocol, SpanExporter, WithExportConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::{Sampler, SdkTracerProvider};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::{LoggingConfig, OtelConfig};

/// Flushes and shuts down the span exporter when dropped.
#[must_use = "dropping the guard shuts down trace export"]
pub struct TracingGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for TracingGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("Warning: failed to shut down trace exporter: {e}");
        }
    }
}

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `logging.level`. Logs go to stderr so that command
/// output on stdout stays machine readable.
pub fn init_tracing(logging: &LoggingConfig, otel: &OtelConfig) -> Result<TracingGuard> {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(&logging.level));

    let provider = if otel.enabled {
        Some(build_tracer_provider(otel)?)
    } else {
        None
    };
    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer("infralink")));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(otel_layer)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();

    if let Some(endpoint) = otel.endpoint.as_deref()
        && otel.enabled
    {
        tracing::debug!(endpoint, sample_ratio = ?otel.sample_ratio, "OTLP trace export enabled");
    }

    Ok(TracingGuard { provider })
}

fn build_tracer_provider(otel: &OtelConfig) -> Result<SdkTracerProvider> {
    let endpoint = otel
        .endpoint
        .as_deref()
        .context("otel.enabled=true requires otel.endpoint")?;

    let exporter = SpanExporter::builder()
        .with_http()
        .with_protocol(Protocol::HttpBinary)
        .with_endpoint(endpoint)
        .build()
        .context("Failed to build OTLP span exporter")?;

    let sampler = match otel.sample_ratio {
        Some(ratio) => Sampler::ParentBased(Box::new(Sampler::TraceIdRatioBased(ratio))),
        None => Sampler::ParentBased(Box::new(Sampler::AlwaysOn)),
    };

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_sampler(sampler)
        .with_resource(
            Resource::builder()
                .with_service_name(otel.service_name.clone())
                .build(),
        )
        .build())
}
