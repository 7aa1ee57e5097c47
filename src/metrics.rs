use actix_web::HttpResponse;
use prometheus::{register_counter, register_gauge, register_histogram, Counter, Gauge, Histogram};

// Prometheus metrics for the real-time pipeline
lazy_static::lazy_static! {
    // Viewers currently holding a session
    pub static ref ACTIVE_SESSIONS: Gauge = register_gauge!(
        "etherlens_active_sessions",
        "Number of connected WebSocket viewers"
    ).unwrap();

    pub static ref BLOCKS_ENRICHED: Counter = register_counter!(
        "etherlens_blocks_enriched_total",
        "Block header events turned into full block records"
    ).unwrap();

    pub static ref TXS_ENRICHED: Counter = register_counter!(
        "etherlens_transactions_enriched_total",
        "Pending transaction events turned into transaction records"
    ).unwrap();

    // Events lost to RPC failures, timeouts or a saturated pipeline; never replayed
    pub static ref EVENTS_DROPPED: Counter = register_counter!(
        "etherlens_events_dropped_total",
        "Subscription events dropped without a message"
    ).unwrap();

    // Oldest frames discarded because a viewer fell behind its buffer
    pub static ref FRAMES_DROPPED: Counter = register_counter!(
        "etherlens_frames_dropped_total",
        "Frames discarded for slow viewers"
    ).unwrap();

    pub static ref ENRICH_TIME: Histogram = register_histogram!(
        "etherlens_enrich_seconds",
        "Time spent enriching a single event in seconds"
    ).unwrap();
}

// Handles GET /metrics requests to expose Prometheus metrics
pub async fn metrics() -> HttpResponse {
    let encoder = prometheus::TextEncoder::new();
    let metric_families = prometheus::gather();
    let encoded = encoder.encode_to_string(&metric_families).unwrap_or_default();
    HttpResponse::Ok().content_type("text/plain; version=0.0.4").body(encoded)
}
