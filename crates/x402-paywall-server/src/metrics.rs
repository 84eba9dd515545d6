use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};
use std::sync::LazyLock;

/// Requests to priced routes, labelled by registered path and response status.
pub static REQUESTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "x402_paywall_requests_total",
        "Total requests to payment-gated routes",
        &["endpoint", "status"]
    )
    .unwrap()
});

pub static PAYMENT_ATTEMPTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "x402_paywall_payment_attempts_total",
        "Total payment attempts",
        &["result"]
    )
    .unwrap()
});

pub fn metrics_output() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_show_up_in_output() {
        PAYMENT_ATTEMPTS.with_label_values(&["success"]).inc();
        REQUESTS.with_label_values(&["/metrics-test", "200"]).inc();
        let output = metrics_output();
        assert!(output.contains("x402_paywall_payment_attempts_total"));
        assert!(output.contains("/metrics-test"));
    }
}
