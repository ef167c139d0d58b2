//! # Command Encoder
//!
//! Encodes outbound commands sent to the device.

use serde::Serialize;

use crate::error::Result;

/// Outbound command understood by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    /// Ask the device to report its static advance
    GetStaticAdv,

    /// Set the device static advance, in degrees
    SetStaticAdv { value: i32 },
}

/// Encode a command into its JSON text form
///
/// # Arguments
///
/// * `command` - Command to encode
///
/// # Returns
///
/// * `Result<String>` - JSON text ready to be sent over the channel
///
/// # Examples
///
/// ```
/// use sweep_dash::protocol::{encode_command, Command};
///
/// let text = encode_command(&Command::GetStaticAdv).unwrap();
/// assert_eq!(text, r#"{"action":"get_static_adv"}"#);
/// ```
pub fn encode_command(command: &Command) -> Result<String> {
    Ok(serde_json::to_string(command)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_get_static_adv() {
        let text = encode_command(&Command::GetStaticAdv).unwrap();
        assert_eq!(text, r#"{"action":"get_static_adv"}"#);
    }

    #[test]
    fn test_encode_set_static_adv() {
        let text = encode_command(&Command::SetStaticAdv { value: 32 }).unwrap();
        assert_eq!(text, r#"{"action":"set_static_adv","value":32}"#);
    }

    #[test]
    fn test_encode_negative_value() {
        let text = encode_command(&Command::SetStaticAdv { value: -4 }).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["action"], "set_static_adv");
        assert_eq!(parsed["value"], -4);
    }
}
