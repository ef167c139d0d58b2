//! # Sweep Dash Library
//!
//! Live ignition-advance sweep dashboard for an engine-control device.
//!
//! This library receives RPM / advance telemetry from the device over a
//! WebSocket, logs one sample per new RPM high-water mark, and renders the
//! resulting advance-over-RPM curve with pointer inspection.

pub mod chart;
pub mod config;
pub mod connection;
pub mod control;
pub mod dashboard;
pub mod error;
pub mod protocol;
pub mod sampler;
