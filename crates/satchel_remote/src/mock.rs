//! A scriptable endpoint client for testing.

use crate::client::EndpointClient;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// One call the mock received, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    /// A read-style call.
    Read {
        /// The requested action name.
        action: String,
    },
    /// A write-style call.
    Write {
        /// The raw JSON body.
        body: String,
    },
}

#[derive(Debug)]
struct MockState {
    reachable: AtomicBool,
    scripted: Mutex<VecDeque<Result<String, String>>>,
    default_response: Mutex<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

/// A scriptable endpoint client.
///
/// Responses can be scripted one call at a time; when the script runs
/// out, the default response (`{"ok":true}` unless changed) is returned.
/// Every call is recorded for inspection. Clones share state, so a test
/// can keep a handle while the adapter owns another.
#[derive(Debug, Clone)]
pub struct MockEndpoint {
    state: Arc<MockState>,
}

impl MockEndpoint {
    /// Creates a reachable mock with the default response.
    pub fn new() -> Self {
        Self {
            state: Arc::new(MockState {
                reachable: AtomicBool::new(true),
                scripted: Mutex::new(VecDeque::new()),
                default_response: Mutex::new(r#"{"ok":true}"#.to_string()),
                calls: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Creates a mock where every call fails at the transport level.
    pub fn unreachable() -> Self {
        let mock = Self::new();
        mock.set_reachable(false);
        mock
    }

    /// Flips transport reachability.
    pub fn set_reachable(&self, reachable: bool) {
        self.state.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Scripts the next response as a JSON payload.
    pub fn enqueue_response(&self, value: &Value) {
        self.state
            .scripted
            .lock()
            .unwrap()
            .push_back(Ok(value.to_string()));
    }

    /// Scripts the next response as a raw body (valid JSON or not).
    pub fn enqueue_raw_response(&self, raw: &str) {
        self.state
            .scripted
            .lock()
            .unwrap()
            .push_back(Ok(raw.to_string()));
    }

    /// Scripts the next call to fail at the transport level.
    pub fn enqueue_failure(&self, message: &str) {
        self.state
            .scripted
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    /// Changes the response used when no script is queued.
    pub fn set_default_response(&self, value: &Value) {
        *self.state.default_response.lock().unwrap() = value.to_string();
    }

    /// Returns every call received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.calls.lock().unwrap().clone()
    }

    /// Returns the bodies of write-style calls received so far, in order.
    pub fn write_bodies(&self) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedCall::Write { body } => serde_json::from_str(&body).ok(),
                RecordedCall::Read { .. } => None,
            })
            .collect()
    }

    /// Returns the number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.state.calls.lock().unwrap().len()
    }

    fn respond(&self, call: RecordedCall) -> Result<String, String> {
        self.state.calls.lock().unwrap().push(call);

        if !self.state.reachable.load(Ordering::SeqCst) {
            return Err("mock endpoint unreachable".to_string());
        }

        if let Some(scripted) = self.state.scripted.lock().unwrap().pop_front() {
            return scripted;
        }

        Ok(self.state.default_response.lock().unwrap().clone())
    }
}

impl Default for MockEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

impl EndpointClient for MockEndpoint {
    fn read(&self, action: &str, _cache_token: &str) -> Result<String, String> {
        self.respond(RecordedCall::Read {
            action: action.to_string(),
        })
    }

    fn write(&self, body: &str) -> Result<String, String> {
        self.respond(RecordedCall::Write {
            body: body.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_response_when_script_empty() {
        let mock = MockEndpoint::new();
        assert_eq!(mock.read("get_bookings", "t1").unwrap(), r#"{"ok":true}"#);
    }

    #[test]
    fn scripted_responses_in_order() {
        let mock = MockEndpoint::new();
        mock.enqueue_response(&json!([{"id": "b1"}]));
        mock.enqueue_failure("connection reset");

        assert_eq!(mock.read("get_bookings", "t1").unwrap(), r#"[{"id":"b1"}]"#);
        assert!(mock.write("{}").is_err());
        // Script exhausted, back to default.
        assert!(mock.write("{}").is_ok());
    }

    #[test]
    fn unreachable_fails_every_call() {
        let mock = MockEndpoint::unreachable();
        assert!(mock.read("get_bookings", "t1").is_err());
        assert!(mock.write("{}").is_err());

        mock.set_reachable(true);
        assert!(mock.read("get_bookings", "t2").is_ok());
    }

    #[test]
    fn records_calls_even_when_unreachable() {
        let mock = MockEndpoint::unreachable();
        let _ = mock.write(r#"{"action":"save_bookings"}"#);

        assert_eq!(mock.call_count(), 1);
        assert_eq!(
            mock.calls(),
            vec![RecordedCall::Write {
                body: r#"{"action":"save_bookings"}"#.to_string()
            }]
        );
    }

    #[test]
    fn clones_share_state() {
        let mock = MockEndpoint::new();
        let handle = mock.clone();

        let _ = mock.read("get_bookings", "t1");
        assert_eq!(handle.call_count(), 1);
    }
}
