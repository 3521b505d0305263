use lazy_static::lazy_static;
use prometheus::{
    Counter, Encoder, Gauge, Histogram, TextEncoder, register_counter, register_gauge,
    register_histogram,
};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("gateway_requests_total", "Total number of download requests").unwrap();
    pub static ref RATE_LIMITED: Counter =
        register_counter!("gateway_rate_limited_total", "Download requests rejected by the rate limiter").unwrap();
    pub static ref UPSTREAM_ATTEMPTS: Counter =
        register_counter!("gateway_upstream_attempts_total", "Calls made to the conversion api").unwrap();
    pub static ref UPSTREAM_FAILURES: Counter =
        register_counter!("gateway_upstream_failures_total", "Failed calls to the conversion api").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "gateway_download_latency_seconds",
        "Latency of forwarded downloads in seconds"
    )
    .unwrap();
    pub static ref TRACKED_CLIENTS: Gauge =
        register_gauge!("gateway_tracked_clients", "Clients currently held by the rate limiter").unwrap();
}

// Render every registered metric in the prometheus text format
pub fn render() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_gateway_metrics() {
        REQUEST_TOTAL.inc();
        let text = render().unwrap();
        assert!(text.contains("gateway_requests_total"));
    }
}
