//! Prometheus counters for ticket generation.
//!
//! Registered in the default registry and rendered at `/internal/metrics` next to the
//! axum-prometheus HTTP metrics.

use once_cell::sync::Lazy;
use prometheus::{IntCounterVec, register_int_counter_vec};

/// Outcome of each `/api/generate-tickets` request
static GENERATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "ticketgen_generations_total",
        "Ticket generation requests by outcome",
        &["outcome"]
    )
    .expect("Failed to register ticketgen_generations_total metric")
});

/// Which recovery strategy produced the JSON object, or `failed`
static JSON_RECOVERY: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "ticketgen_json_recovery_total",
        "JSON recovery attempts on model output by winning strategy",
        &["strategy"]
    )
    .expect("Failed to register ticketgen_json_recovery_total metric")
});

pub fn record_generation(outcome: &str) {
    GENERATIONS.with_label_values(&[outcome]).inc();
}

pub fn record_json_recovery(strategy: &str) {
    JSON_RECOVERY.with_label_values(&[strategy]).inc();
}

/// Text exposition of everything in the default registry.
pub fn render() -> String {
    use prometheus::{Encoder, TextEncoder};

    let mut buffer = vec![];
    if let Err(e) = TextEncoder::new().encode(&prometheus::gather(), &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_rendered() {
        record_generation("success");
        record_json_recovery("brace_slicing");

        let rendered = render();

        assert!(rendered.contains("ticketgen_generations_total"));
        assert!(rendered.contains("strategy=\"brace_slicing\""));
    }
}
