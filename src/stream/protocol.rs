//! Wire format of the market-data stream.
//!
//! Every text frame is JSON: a single object or an array of objects.
//! Objects carrying `status` are control messages; objects carrying `ev`
//! and `sym` are aggregates. Anything else is malformed.

use crate::error::StreamError;
use serde::Deserialize;
use serde_json::{json, Value};

/// Status values of control messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlStatus {
    /// Transport-level connection acknowledged.
    Connected,
    /// Token accepted.
    AuthSuccess,
    /// Token rejected.
    AuthFailed,
    /// Subscription change acknowledged.
    Success,
    /// Server-reported error.
    Error,
    /// Anything else the server sends.
    Other(String),
}

impl From<&str> for ControlStatus {
    fn from(status: &str) -> Self {
        match status {
            "connected" => Self::Connected,
            "auth_success" => Self::AuthSuccess,
            "auth_failed" => Self::AuthFailed,
            "success" => Self::Success,
            "error" => Self::Error,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A control message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    /// Kind of acknowledgement.
    pub status: ControlStatus,
    /// Human-readable message.
    pub message: String,
}

/// One aggregate bar for a symbol.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Aggregate {
    /// Event type (`AM` minute, `A` second, ...).
    pub ev: String,
    /// Symbol.
    pub sym: String,
    /// Volume of this bar.
    #[serde(rename = "v", default)]
    pub volume: Option<f64>,
    /// Volume accumulated over the day.
    #[serde(rename = "av", default)]
    pub accumulated_volume: Option<f64>,
    /// Official opening price of the day.
    #[serde(rename = "op", default)]
    pub day_open: Option<f64>,
    /// Volume weighted average price of this bar.
    #[serde(rename = "vw", default)]
    pub vwap: Option<f64>,
    /// Open.
    #[serde(rename = "o", default)]
    pub open: Option<f64>,
    /// Close.
    #[serde(rename = "c", default)]
    pub close: Option<f64>,
    /// High.
    #[serde(rename = "h", default)]
    pub high: Option<f64>,
    /// Low.
    #[serde(rename = "l", default)]
    pub low: Option<f64>,
    /// Day's volume weighted average price.
    #[serde(rename = "a", default)]
    pub day_vwap: Option<f64>,
    /// Bar start, epoch milliseconds.
    #[serde(rename = "s", default)]
    pub start_ms: Option<i64>,
    /// Bar end, epoch milliseconds.
    #[serde(rename = "e", default)]
    pub end_ms: Option<i64>,
}

/// One entry of a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Connection, auth or subscription acknowledgement.
    Control(Control),
    /// Data for a subscribed channel.
    Data(Aggregate),
    /// An entry that could not be understood.
    Malformed(String),
}

/// Parse one complete text frame.
///
/// Fails only when the frame is not JSON at all or is neither an object
/// nor an array; individual bad entries come back as
/// [`Message::Malformed`] so the rest of the frame is still applied.
pub fn parse_frame(text: &str) -> Result<Vec<Message>, StreamError> {
    let root: Value = serde_json::from_str(text)?;
    match root {
        Value::Array(entries) => Ok(entries.into_iter().map(parse_entry).collect()),
        entry @ Value::Object(_) => Ok(vec![parse_entry(entry)]),
        other => Err(StreamError::Protocol(format!("unexpected JSON {}", kind_of(&other)))),
    }
}

fn parse_entry(entry: Value) -> Message {
    let Value::Object(map) = &entry else {
        return Message::Malformed(format!("entry is {}", kind_of(&entry)));
    };
    if let Some(status) = map.get("status").and_then(Value::as_str) {
        let message = map
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Message::Control(Control {
            status: ControlStatus::from(status),
            message,
        });
    }
    if !map.contains_key("ev") || !map.contains_key("sym") {
        return Message::Malformed(String::from("entry has neither status nor ev/sym"));
    }
    match serde_json::from_value::<Aggregate>(entry) {
        Ok(aggregate) => Message::Data(aggregate),
        Err(e) => Message::Malformed(e.to_string()),
    }
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// `{"action":"auth","params":"<token>"}`
pub fn auth_message(token: &str) -> String {
    json!({ "action": "auth", "params": token }).to_string()
}

/// `{"action":"subscribe","params":"AM.X,AM.Y"}`
pub fn subscribe_message(channels: &[String]) -> String {
    json!({ "action": "subscribe", "params": channels.join(",") }).to_string()
}

/// `{"action":"unsubscribe","params":"AM.X"}`
pub fn unsubscribe_message(channels: &[String]) -> String {
    json!({ "action": "unsubscribe", "params": channels.join(",") }).to_string()
}
