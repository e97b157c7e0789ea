//! Process-wide metrics registry exposed at `/metrics` (C7, §5 shared state).

use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;

pub struct Metrics {
    registry: Registry,
    pub connection_errors: Counter,
    pub connections_active: Gauge,
    pub frames_decoded: Counter,
    pub synthesize_requests: Counter,
    pub transcribe_requests: Counter,
    pub listener_up: Gauge,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let connection_errors = Counter::default();
        registry.register(
            "wyoming_connection_errors",
            "Total connection-level protocol, worker, or I/O errors",
            connection_errors.clone(),
        );

        let connections_active = Gauge::default();
        registry.register(
            "wyoming_connections_active",
            "Currently open TCP connections",
            connections_active.clone(),
        );

        let frames_decoded = Counter::default();
        registry.register(
            "wyoming_frames_decoded_total",
            "Total frames successfully decoded off the wire",
            frames_decoded.clone(),
        );

        let synthesize_requests = Counter::default();
        registry.register(
            "wyoming_synthesize_requests_total",
            "Total synthesize/synthesize-start requests handled",
            synthesize_requests.clone(),
        );

        let transcribe_requests = Counter::default();
        registry.register(
            "wyoming_transcribe_requests_total",
            "Total transcribe requests handled",
            transcribe_requests.clone(),
        );

        let listener_up = Gauge::default();
        listener_up.set(1);
        registry.register(
            "wyoming_listener_up",
            "Whether the wyoming TCP listener's most recent accept() succeeded",
            listener_up.clone(),
        );

        Self {
            registry,
            connection_errors,
            connections_active,
            frames_decoded,
            synthesize_requests,
            transcribe_requests,
            listener_up,
        }
    }

    /// Renders the registry in Prometheus exposition text format.
    pub fn render(&self) -> String {
        let mut buf = String::new();
        encode(&mut buf, &self.registry).expect("metrics encoding is infallible");
        buf
    }
}
