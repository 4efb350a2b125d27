use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("caption_card_requests_total", "Total number of generate requests").unwrap();
    pub static ref GLOBAL_LIMITED: Counter =
        register_counter!("caption_card_global_limited_total", "Requests rejected by the global limiter").unwrap();
    pub static ref IP_LIMITED: Counter =
        register_counter!("caption_card_ip_limited_total", "Requests rejected by the per-IP limiter").unwrap();
    pub static ref VALIDATION_FAILURES: Counter =
        register_counter!("caption_card_validation_failures_total", "Requests rejected by payload validation").unwrap();
    pub static ref RENDER_FAILURES: Counter =
        register_counter!("caption_card_render_failures_total", "Fetch or render failures").unwrap();
    pub static ref RENDER_LATENCY: Histogram = register_histogram!(
        "caption_card_render_latency_seconds",
        "Render latency in seconds"
    )
    .unwrap();
    pub static ref RATE_WINDOWS: Gauge =
        register_gauge!("caption_card_rate_windows", "Current number of tracked per-IP windows").unwrap();
}
