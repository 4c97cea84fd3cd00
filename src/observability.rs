use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("juriste.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("juriste.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("juriste.client.request_duration_seconds");

pub(crate) static STREAM_EVENTS: Counter = Counter::new("juriste.stream.events");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("juriste.stream.errors");
pub(crate) static STREAM_BYTES: Counter = Counter::new("juriste.stream.bytes");
pub(crate) static STREAM_TTFB: Moments = Moments::new("juriste.stream.ttfb_seconds");
pub(crate) static STREAM_DURATION: Moments = Moments::new("juriste.stream.duration_seconds");

pub(crate) static TURNS_COMPLETED: Counter = Counter::new("juriste.session.turns_completed");
pub(crate) static TURNS_FAILED: Counter = Counter::new("juriste.session.turns_failed");
pub(crate) static TURN_DURATION: Moments = Moments::new("juriste.session.turn_duration_seconds");
pub(crate) static SOURCES_CONSULTED: Counter = Counter::new("juriste.session.sources_consulted");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&STREAM_EVENTS);
    collector.register_counter(&STREAM_ERRORS);
    collector.register_counter(&STREAM_BYTES);
    collector.register_moments(&STREAM_TTFB);
    collector.register_moments(&STREAM_DURATION);

    collector.register_counter(&TURNS_COMPLETED);
    collector.register_counter(&TURNS_FAILED);
    collector.register_moments(&TURN_DURATION);
    collector.register_counter(&SOURCES_CONSULTED);
}
