//! # Telemetry Frame Decoder
//!
//! Decodes inbound JSON frames pushed by the device.
//!
//! Every field is optional and a frame may carry any subset:
//!
//! ```text
//! { "status": "on", "static_adv": 36, "rpm": 4200, "adv": 27.5 }
//! ```

use serde::Deserialize;

use crate::error::{DashboardError, Result};

/// One decoded inbound message from the device
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TelemetryFrame {
    /// Device LED state tag
    #[serde(default)]
    pub status: Option<String>,

    /// Static advance held by the device, in degrees
    #[serde(default, rename = "static_adv")]
    pub static_advance: Option<i32>,

    /// Engine speed
    #[serde(default)]
    pub rpm: Option<u32>,

    /// Live ignition advance, in degrees
    #[serde(default, rename = "adv")]
    pub advance: Option<f64>,
}

/// Decode a complete telemetry frame
///
/// # Arguments
///
/// * `text` - Raw text payload of one channel message
///
/// # Returns
///
/// * `Result<TelemetryFrame>` - Decoded frame, or error if malformed
///
/// # Errors
///
/// Returns error if:
/// - Payload is not valid JSON
/// - Payload is not a JSON object
/// - A present field has the wrong type (e.g. negative or fractional `rpm`)
///
/// # Examples
///
/// ```
/// use sweep_dash::protocol::decode_frame;
///
/// let frame = decode_frame(r#"{"rpm": 1500, "adv": 25}"#).unwrap();
/// assert_eq!(frame.rpm, Some(1500));
/// assert_eq!(frame.advance, Some(25.0));
/// assert!(frame.status.is_none());
/// ```
pub fn decode_frame(text: &str) -> Result<TelemetryFrame> {
    let value: serde_json::Value = serde_json::from_str(text)?;

    if !value.is_object() {
        return Err(DashboardError::Protocol(format!(
            "Expected JSON object, got: {}",
            json_kind(&value)
        )));
    }

    Ok(serde_json::from_value(value)?)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
