//! Prometheus metrics for animal-health-service.
//!
//! HTTP request metrics come from the `metrics` facade (rendered by the
//! Prometheus recorder); advisory-specific counters live in a dedicated
//! `prometheus` registry. Both are concatenated by [`get_metrics`].

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prometheus::core::Collector;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub static ADVISORY_GENERATIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static GENAI_PROVIDER_LATENCY_SECONDS: OnceLock<HistogramVec> = OnceLock::new();
pub static GENAI_TOKENS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize metrics collection. Calls after the first are no-ops.
pub fn init_metrics() {
    if REGISTRY.get().is_some() {
        return;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = METRICS_HANDLE.set(handle);
        }
        Err(e) => tracing::warn!(error = %e, "Prometheus recorder not installed"),
    }

    let registry = Registry::new();

    let generations = IntCounterVec::new(
        Opts::new(
            "advisory_generations_total",
            "Advisory operations by operation, source and status",
        ),
        &["operation", "source", "status"],
    );
    let provider_latency = HistogramVec::new(
        HistogramOpts::new(
            "genai_provider_latency_seconds",
            "AI provider API latency in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]),
        &["provider"],
    );
    let tokens = IntCounterVec::new(
        Opts::new("genai_tokens_total", "Total tokens processed"),
        &["provider", "type"], // type: input, output
    );

    let (generations, provider_latency, tokens) = match (generations, provider_latency, tokens) {
        (Ok(g), Ok(l), Ok(t)) => (g, l, t),
        _ => {
            tracing::error!("Failed to create advisory metrics");
            return;
        }
    };

    let collectors: Vec<Box<dyn Collector>> = vec![
        Box::new(generations.clone()),
        Box::new(provider_latency.clone()),
        Box::new(tokens.clone()),
    ];
    for collector in collectors {
        if let Err(e) = registry.register(collector) {
            tracing::error!(error = %e, "Failed to register metric");
        }
    }

    let _ = ADVISORY_GENERATIONS_TOTAL.set(generations);
    let _ = GENAI_PROVIDER_LATENCY_SECONDS.set(provider_latency);
    let _ = GENAI_TOKENS_TOTAL.set(tokens);
    let _ = REGISTRY.set(registry);

    tracing::info!("Prometheus metrics initialized");
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string());

    if let Some(registry) = REGISTRY.get() {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        match encoder.encode(&registry.gather(), &mut buffer) {
            Ok(()) => output.push_str(&String::from_utf8_lossy(&buffer)),
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode metrics");
                output.push_str(&format!("# Failed to encode metrics: {}\n", e));
            }
        }
    }

    output
}

/// Record the outcome of one advisory operation.
pub fn record_generation(operation: &str, source: &str, status: &str) {
    if let Some(counter) = ADVISORY_GENERATIONS_TOTAL.get() {
        counter.with_label_values(&[operation, source, status]).inc();
    }
}

/// Record provider latency.
pub fn record_provider_latency(provider: &str, duration_secs: f64) {
    if let Some(histogram) = GENAI_PROVIDER_LATENCY_SECONDS.get() {
        histogram.with_label_values(&[provider]).observe(duration_secs);
    }
}

/// Record token usage reported by the provider.
pub fn record_tokens(provider: &str, input_tokens: i32, output_tokens: i32) {
    if let Some(counter) = GENAI_TOKENS_TOTAL.get() {
        counter
            .with_label_values(&[provider, "input"])
            .inc_by(input_tokens.max(0) as u64);
        counter
            .with_label_values(&[provider, "output"])
            .inc_by(output_tokens.max(0) as u64);
    }
}
