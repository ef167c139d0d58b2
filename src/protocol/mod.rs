//! # Device Wire Protocol
//!
//! JSON messages exchanged with the engine-control device.
//!
//! This module handles:
//! - Decoding inbound telemetry frames (`status`, `static_adv`, `rpm`, `adv`)
//! - Encoding outbound commands (`get_static_adv`, `set_static_adv`)

pub mod command;
pub mod frame;

pub use command::{encode_command, Command};
pub use frame::{decode_frame, TelemetryFrame};
