//! OTLP/JSON encoding of exported span batches.
//!
//! Each batch becomes one `resourceSpans` document, written as a single line:
//!
//! ```json
//! {"resourceSpans":[{"resource":{"attributes":[...]},
//!   "scopeSpans":[{"scope":{"name":"Pokedex"},"spans":[...]}]}]}
//! ```
//!
//! Ids are lowercase hex, timestamps are decimal nanosecond strings, and span
//! kind and status use the numeric OTLP codes.

use opentelemetry::trace::{Event, Link, SpanId, SpanKind, Status};
use opentelemetry::{Array, KeyValue, Value};
use opentelemetry_sdk::export::trace::SpanData;
use opentelemetry_sdk::resource::Resource;
use serde_json::{json, Value as Json};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn encode_batch(resource: &Resource, scope: &str, batch: &[SpanData]) -> Json {
    let resource_attributes: Vec<Json> = resource
        .iter()
        .map(|(key, value)| attribute(key.as_str(), value))
        .collect();

    json!({
        "resourceSpans": [{
            "resource": { "attributes": resource_attributes },
            "scopeSpans": [{
                "scope": { "name": scope },
                "spans": batch.iter().map(encode_span).collect::<Vec<_>>(),
            }],
        }],
    })
}

pub fn encode_span(span: &SpanData) -> Json {
    let parent = if span.parent_span_id == SpanId::INVALID {
        String::new()
    } else {
        format!("{:016x}", span.parent_span_id)
    };

    let (code, message) = match &span.status {
        Status::Unset => (0, String::new()),
        Status::Ok => (1, String::new()),
        Status::Error { description } => (2, description.to_string()),
    };

    json!({
        "traceId": format!("{:032x}", span.span_context.trace_id()),
        "spanId": format!("{:016x}", span.span_context.span_id()),
        "parentSpanId": parent,
        "name": span.name,
        "kind": kind_code(&span.span_kind),
        "startTimeUnixNano": unix_nanos(span.start_time),
        "endTimeUnixNano": unix_nanos(span.end_time),
        "attributes": attributes(&span.attributes),
        "events": span.events.iter().map(encode_event).collect::<Vec<_>>(),
        "links": span.links.iter().map(encode_link).collect::<Vec<_>>(),
        "status": { "code": code, "message": message },
    })
}

fn encode_event(event: &Event) -> Json {
    json!({
        "timeUnixNano": unix_nanos(event.timestamp),
        "name": event.name,
        "attributes": attributes(&event.attributes),
    })
}

fn encode_link(link: &Link) -> Json {
    json!({
        "traceId": format!("{:032x}", link.span_context.trace_id()),
        "spanId": format!("{:016x}", link.span_context.span_id()),
        "attributes": attributes(&link.attributes),
    })
}

fn attributes(pairs: &[KeyValue]) -> Vec<Json> {
    pairs
        .iter()
        .map(|kv| attribute(kv.key.as_str(), &kv.value))
        .collect()
}

fn attribute(key: &str, value: &Value) -> Json {
    json!({ "key": key, "value": encode_value(value) })
}

/// OTLP `AnyValue`. Integers are strings, per the JSON mapping.
pub fn encode_value(value: &Value) -> Json {
    match value {
        Value::Bool(b) => json!({ "boolValue": b }),
        Value::I64(i) => json!({ "intValue": i.to_string() }),
        Value::F64(f) => json!({ "doubleValue": f }),
        Value::String(s) => json!({ "stringValue": s.to_string() }),
        Value::Array(array) => {
            let values: Vec<Json> = match array {
                Array::Bool(items) => items.iter().map(|b| json!({ "boolValue": b })).collect(),
                Array::I64(items) => items
                    .iter()
                    .map(|i| json!({ "intValue": i.to_string() }))
                    .collect(),
                Array::F64(items) => items.iter().map(|f| json!({ "doubleValue": f })).collect(),
                Array::String(items) => items
                    .iter()
                    .map(|s| json!({ "stringValue": s.to_string() }))
                    .collect(),
            };
            json!({ "arrayValue": { "values": values } })
        }
    }
}

const fn kind_code(kind: &SpanKind) -> u8 {
    match kind {
        SpanKind::Internal => 1,
        SpanKind::Server => 2,
        SpanKind::Client => 3,
        SpanKind::Producer => 4,
        SpanKind::Consumer => 5,
    }
}

/// Nanoseconds since the epoch as a decimal string; pre-epoch clamps to 0.
pub fn unix_nanos(time: SystemTime) -> String {
    time.duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn values() {
        assert_eq!(encode_value(&Value::I64(7)), json!({ "intValue": "7" }));
        assert_eq!(encode_value(&Value::from("pikachu")), json!({ "stringValue": "pikachu" }));
        assert_eq!(
            encode_value(&Value::Array(Array::Bool(vec![true, false]))),
            json!({ "arrayValue": { "values": [{ "boolValue": true }, { "boolValue": false }] } })
        );
    }

    #[test]
    fn timestamps() {
        assert_eq!(unix_nanos(UNIX_EPOCH + Duration::from_millis(3)), "3000000");
        assert_eq!(unix_nanos(UNIX_EPOCH - Duration::from_secs(1)), "0");
    }

    #[test]
    fn empty_batch_keeps_resource() {
        let resource = Resource::new(vec![KeyValue::new("service.name", "Pokedex")]);
        let doc = encode_batch(&resource, "Pokedex", &[]);
        let resource_spans = &doc["resourceSpans"][0];

        assert_eq!(resource_spans["scopeSpans"][0]["scope"]["name"], "Pokedex");
        assert_eq!(resource_spans["scopeSpans"][0]["spans"], json!([]));
        let attrs = resource_spans["resource"]["attributes"].as_array().unwrap();
        assert!(attrs
            .iter()
            .any(|a| a["key"] == "service.name" && a["value"]["stringValue"] == "Pokedex"));
    }
}
