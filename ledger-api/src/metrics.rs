//! Request counters/histograms per RPC method, exposed at `GET /metrics`
//! (spec.md §7 "Telemetry/metrics"). Generalizes the teacher's
//! `aptos-metrics-core` wrapper to a direct `prometheus` registry, since the
//! wrapper crate itself was not part of the retrieved pack.

use once_cell::sync::Lazy;
use prometheus::{Encoder, HistogramVec, IntCounterVec, Registry, TextEncoder};

pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

pub static RPC_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        prometheus::Opts::new("ledger_rpc_requests_total", "Total RPC requests by method and status"),
        &["method", "status"],
    )
    .expect("metric registration is infallible for a static descriptor");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric registration is infallible for a static descriptor");
    counter
});

pub static RPC_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let histogram = HistogramVec::new(
        prometheus::HistogramOpts::new("ledger_rpc_duration_seconds", "RPC handler latency in seconds"),
        &["method"],
    )
    .expect("metric registration is infallible for a static descriptor");
    REGISTRY
        .register(Box::new(histogram.clone()))
        .expect("metric registration is infallible for a static descriptor");
    histogram
});

/// Renders the registry in Prometheus text exposition format.
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&families, &mut buffer)
        .expect("encoding a gathered metric family is infallible");
    String::from_utf8(buffer).expect("prometheus text encoding is always valid utf-8")
}

/// Times and records one RPC call's outcome.
pub async fn observe<T, E>(method: &str, fut: impl std::future::Future<Output = Result<T, E>>) -> Result<T, E> {
    let timer = RPC_DURATION_SECONDS.with_label_values(&[method]).start_timer();
    let result = fut.await;
    timer.observe_duration();

    let status = if result.is_ok() { "ok" } else { "error" };
    RPC_REQUESTS_TOTAL.with_label_values(&[method, status]).inc();

    result
}
