use biometrics::{Collector, Counter};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("purrl.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("purrl.client.request_errors");

pub(crate) static STREAM_EVENTS: Counter = Counter::new("purrl.stream.events");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("purrl.stream.errors");

pub(crate) static CHAT_TURNS: Counter = Counter::new("purrl.chat.turns");
pub(crate) static CHAT_COMMANDS: Counter = Counter::new("purrl.chat.commands");
pub(crate) static CHAT_INTERRUPTS: Counter = Counter::new("purrl.chat.interrupts");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);

    collector.register_counter(&STREAM_EVENTS);
    collector.register_counter(&STREAM_ERRORS);

    collector.register_counter(&CHAT_TURNS);
    collector.register_counter(&CHAT_COMMANDS);
    collector.register_counter(&CHAT_INTERRUPTS);
}
