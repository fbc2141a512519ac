//! Checks the events emitted while writing.

use commonware_writer::{BufferWriter, MAX_SIZE};
use std::{
    fmt,
    sync::{Arc, Mutex},
};
use tracing::{field, Event, Level, Subscriber};
use tracing_subscriber::{layer::Context, layer::SubscriberExt, Layer, Registry};

#[derive(Debug, Clone)]
struct RecordedEvent {
    level: Level,
    message: String,
    fields: Vec<(String, String)>,
}

impl RecordedEvent {
    fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
struct Visitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl field::Visit for Visitor {
    fn record_debug(&mut self, field: &field::Field, value: &dyn fmt::Debug) {
        let rendered = format!("{value:?}");
        if field.name() == "message" {
            self.message = rendered;
        } else {
            self.fields.push((field.name().to_string(), rendered));
        }
    }
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<RecordedEvent>>>);

impl<S: Subscriber> Layer<S> for Recorder {
    fn on_event(&self, event: &Event<'_>, _: Context<'_, S>) {
        let mut visitor = Visitor::default();
        event.record(&mut visitor);
        self.0.lock().unwrap().push(RecordedEvent {
            level: *event.metadata().level(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

fn record(f: impl FnOnce()) -> Vec<RecordedEvent> {
    let recorder = Recorder::default();
    let subscriber = Registry::default().with(recorder.clone());
    tracing::subscriber::with_default(subscriber, f);
    let events = recorder.0.lock().unwrap().clone();
    events
}

#[test]
fn test_growth_is_traced() {
    let events = record(|| {
        let mut writer = BufferWriter::new(0);
        writer.write_u32(1).unwrap();
        writer.write_u8(2).unwrap();
        writer.write_u8(3).unwrap(); // fits
    });
    let grows: Vec<_> = events
        .iter()
        .filter(|e| e.message == "grew buffer")
        .collect();
    assert_eq!(grows.len(), 2);
    assert!(grows.iter().all(|e| e.level == Level::TRACE));
    assert_eq!(grows[0].field("old"), Some("0"));
    assert_eq!(grows[0].field("new"), Some("4"));
    assert_eq!(grows[1].field("old"), Some("4"));
    assert_eq!(grows[1].field("new"), Some("8"));
}

#[test]
fn test_shrink_is_logged() {
    let events = record(|| {
        let mut writer = BufferWriter::new(16);
        writer.write_u16(1).unwrap();
        writer.shrink();
        writer.shrink(); // already exact
    });
    let shrinks: Vec<_> = events
        .iter()
        .filter(|e| e.message == "shrunk buffer")
        .collect();
    assert_eq!(shrinks.len(), 1);
    assert_eq!(shrinks[0].level, Level::DEBUG);
    assert_eq!(shrinks[0].field("old"), Some("16"));
    assert_eq!(shrinks[0].field("new"), Some("2"));
}

#[test]
fn test_clamp_is_warned() {
    let events = record(|| {
        let writer = BufferWriter::new(MAX_SIZE + 1);
        assert_eq!(writer.capacity(), MAX_SIZE);
    });
    let event = events
        .iter()
        .find(|e| e.message == "clamping initial capacity")
        .expect("missing clamp warning");
    assert_eq!(event.level, Level::WARN);
    assert_eq!(event.field("requested"), Some((MAX_SIZE + 1).to_string().as_str()));
}

#[test]
fn test_unsupported_type_is_logged() {
    let events = record(|| {
        let mut writer = BufferWriter::default();
        assert!(writer.write_data_type(&0u8).is_err());
    });
    let event = events
        .iter()
        .find(|e| e.message == "no encoder registered")
        .expect("missing event");
    assert_eq!(event.level, Level::DEBUG);
    assert_eq!(event.field("tag"), Some("\"u8\""));
}
