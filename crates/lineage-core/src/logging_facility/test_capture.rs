//! In-memory event capture for logging assertions
//!
//! Captured events are global to the test binary, so assertions filter on a
//! value unique to the test: a tree name or a request id.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use lineage_core_types::schema;
use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// One recorded event and its fields rendered as strings
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn op(&self) -> Option<&str> {
        self.field(schema::FIELD_OP)
    }

    pub fn event(&self) -> Option<&str> {
        self.field(schema::FIELD_EVENT)
    }

    pub fn tree(&self) -> Option<&str> {
        self.field(schema::FIELD_TREE)
    }

    pub fn character(&self) -> Option<&str> {
        self.field(schema::FIELD_CHARACTER)
    }

    pub fn request_id(&self) -> Option<&str> {
        self.field(schema::FIELD_REQUEST_ID)
    }

    /// `applied` or `rejected` on end events
    pub fn outcome(&self) -> Option<&str> {
        self.field(schema::FIELD_OUTCOME)
    }

    /// Rejection code on `rejected` events
    pub fn reason(&self) -> Option<&str> {
        self.field("reason")
    }

    /// Level written by a `cascade_step` event
    pub fn level_value(&self) -> Option<i64> {
        self.field(schema::FIELD_LEVEL)?.parse().ok()
    }

    pub fn is(&self, op: &str, event: &str) -> bool {
        self.op() == Some(op) && self.event() == Some(event)
    }
}

#[derive(Default)]
struct FieldRecorder(BTreeMap<String, String>);

impl FieldRecorder {
    fn put(&mut self, field: &Field, value: String) {
        self.0.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldRecorder {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.put(field, format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.to_string());
    }
}

type EventLog = Arc<Mutex<Vec<CapturedEvent>>>;

/// Layer appending every event to a shared log
pub struct TestCaptureLayer {
    log: EventLog,
}

impl<S> Layer<S> for TestCaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut recorder = FieldRecorder::default();
        event.record(&mut recorder);
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(CapturedEvent {
                level: *event.metadata().level(),
                fields: recorder.0,
            });
    }
}

/// Read handle over the captured events
#[derive(Clone)]
pub struct TestCapture {
    log: EventLog,
}

impl TestCapture {
    /// Fresh layer and the handle reading what it records
    pub fn layer() -> (TestCaptureLayer, TestCapture) {
        let log = EventLog::default();
        (TestCaptureLayer { log: log.clone() }, TestCapture { log })
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Events carrying `key = value`, in emission order
    pub fn events_with(&self, key: &str, value: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.field(key) == Some(value))
            .collect()
    }

    pub fn for_tree(&self, tree: &str) -> Vec<CapturedEvent> {
        self.events_with(schema::FIELD_TREE, tree)
    }

    pub fn for_request(&self, request_id: &str) -> Vec<CapturedEvent> {
        self.events_with(schema::FIELD_REQUEST_ID, request_id)
    }

    /// `cascade_step` events of one tree, in emission order
    pub fn cascade_steps(&self, tree: &str) -> Vec<CapturedEvent> {
        self.for_tree(tree)
            .into_iter()
            .filter(|e| e.event() == Some(schema::EVENT_CASCADE_STEP))
            .collect()
    }

    /// The `rejected` event of the last rejected `op` on `tree`
    ///
    /// Rejection events carry no tree, so the end event is found first and
    /// its request id leads to the rejection.
    ///
    /// # Panics
    ///
    /// Panics when no such rejection was logged or its code differs.
    pub fn assert_rejected(&self, tree: &str, op: &str, code: &str) -> CapturedEvent {
        let end = self
            .for_tree(tree)
            .into_iter()
            .rev()
            .find(|e| e.is(op, schema::EVENT_END) && e.outcome() == Some("rejected"))
            .unwrap_or_else(|| panic!("no rejected end event for {} on {}", op, tree));
        let request_id = end.request_id().unwrap_or_default().to_string();

        let rejection = self
            .for_request(&request_id)
            .into_iter()
            .find(|e| e.event() == Some(schema::EVENT_REJECTED))
            .unwrap_or_else(|| panic!("no rejected event for request {}", request_id));
        assert_eq!(rejection.reason(), Some(code), "{:?}", rejection);
        rejection
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer as the global subscriber, once per binary
///
/// # Example
///
/// ```
/// use lineage_core::logging_facility::test_capture::init_test_capture;
/// use lineage_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("connect_characters", tree = "Doc-Stark");
/// let events = capture.for_tree("Doc-Stark");
/// assert!(events[0].is("connect_characters", "start"));
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let (layer, capture) = TestCapture::layer();
            tracing_subscriber::registry().with(layer).init();
            capture
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(pairs: &[(&str, &str)]) -> CapturedEvent {
        CapturedEvent {
            level: Level::INFO,
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_typed_accessors_read_schema_fields() {
        let step = event(&[
            ("event", "cascade_step"),
            ("tree", "Stark"),
            ("character", "Robb"),
            ("level", "2"),
        ]);
        assert_eq!(step.tree(), Some("Stark"));
        assert_eq!(step.character(), Some("Robb"));
        assert_eq!(step.level_value(), Some(2));
        assert_eq!(step.reason(), None);
    }

    #[test]
    fn test_assert_rejected_follows_request_id() {
        let (_layer, capture) = TestCapture::layer();
        capture.log.lock().unwrap().extend([
            event(&[("event", "rejected"), ("request_id", "r1"), ("reason", "REJ_NO_ANCHOR")]),
            event(&[
                ("op", "connect_characters"),
                ("event", "end"),
                ("outcome", "rejected"),
                ("tree", "Stark"),
                ("request_id", "r1"),
            ]),
        ]);

        let rejection = capture.assert_rejected("Stark", "connect_characters", "REJ_NO_ANCHOR");
        assert_eq!(rejection.request_id(), Some("r1"));
    }
}
