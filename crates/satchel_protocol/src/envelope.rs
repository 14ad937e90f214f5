//! Wire envelope of the consumed remote endpoint.
//!
//! The endpoint speaks one HTTP-style protocol: reads are GET-style calls
//! carrying an `action` name and a cache-busting token; writes are
//! POST-style calls carrying a JSON body of `{action, ...payload}`. A
//! response is JSON and may contain the error marker `{"error": ...}`,
//! which is distinct from transport failure.
//!
//! This module is the single place wire action names live; everything
//! above it works with [`PendingOperation`] values.

use crate::error::ProtocolResult;
use crate::operation::{PendingOperation, WriteIntent};
use serde_json::{json, Value};

/// The body of a successfully parsed response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// A normal payload.
    Ok(Value),
    /// The endpoint's application-level error marker.
    ErrorMarker(String),
}

/// Returns the read action name for fetching a whole collection.
pub fn fetch_action(collection: &str) -> String {
    format!("get_{collection}")
}

/// Builds the JSON body for delivering a pending operation.
pub fn write_body(operation: &PendingOperation) -> Value {
    match &operation.intent {
        WriteIntent::Upsert { document } => json!({
            "action": format!("save_{}", operation.collection),
            "record": document,
        }),
        WriteIntent::ReplaceAll { documents } => json!({
            "action": format!("replace_{}", operation.collection),
            "records": documents,
        }),
        WriteIntent::Delete { id } => json!({
            "action": format!("delete_{}", operation.collection),
            "id": id,
        }),
    }
}

/// Parses a raw response body, detecting the error marker.
///
/// # Errors
///
/// Returns an error if the body is not valid JSON. Marker detection is
/// not an error at this layer; callers classify [`ResponseBody::ErrorMarker`]
/// themselves.
pub fn parse_response(raw: &str) -> ProtocolResult<ResponseBody> {
    let value: Value = serde_json::from_str(raw)?;

    if let Some(marker) = value.get("error") {
        let message = marker
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| marker.to_string());
        return Ok(ResponseBody::ErrorMarker(message));
    }

    Ok(ResponseBody::Ok(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn doc(id: &str) -> Document {
        Document::new(json!({"id": id, "name": "A"})).unwrap()
    }

    #[test]
    fn fetch_action_names() {
        assert_eq!(fetch_action("bookings"), "get_bookings");
    }

    #[test]
    fn upsert_body_embeds_action_and_record() {
        let op = PendingOperation::upsert("bookings", doc("b1"));
        let body = write_body(&op);

        assert_eq!(body["action"], "save_bookings");
        assert_eq!(body["record"]["id"], "b1");
    }

    #[test]
    fn replace_all_body_carries_whole_array() {
        let op = PendingOperation::replace_all("bookings", vec![doc("b1"), doc("b2")]);
        let body = write_body(&op);

        assert_eq!(body["action"], "replace_bookings");
        assert_eq!(body["records"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn delete_body_carries_id() {
        let op = PendingOperation::delete("patients", "p9");
        let body = write_body(&op);

        assert_eq!(body["action"], "delete_patients");
        assert_eq!(body["id"], "p9");
    }

    #[test]
    fn parse_normal_response() {
        let body = parse_response(r#"[{"id":"b1"}]"#).unwrap();
        assert!(matches!(body, ResponseBody::Ok(Value::Array(_))));
    }

    #[test]
    fn parse_error_marker() {
        let body = parse_response(r#"{"error":"unknown action"}"#).unwrap();
        assert_eq!(body, ResponseBody::ErrorMarker("unknown action".into()));

        // Non-string markers are stringified rather than dropped.
        let body = parse_response(r#"{"error":{"code":500}}"#).unwrap();
        assert!(matches!(body, ResponseBody::ErrorMarker(m) if m.contains("500")));
    }

    #[test]
    fn parse_rejects_invalid_json() {
        assert!(parse_response("<html>offline portal</html>").is_err());
    }
}
