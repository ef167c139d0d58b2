//! # Chart Module
//!
//! Advance-over-RPM line chart with pointer inspection.
//!
//! This module handles:
//! - Axis ranges, grid and the sample → canvas mapping
//! - Full redraws onto a [`surface::Surface`]
//! - Nearest-point hit-testing, crosshair and tooltip
//! - SVG snapshots of the last frame

pub mod engine;
pub mod geometry;
pub mod style;
pub mod surface;
pub mod svg;

pub use engine::{ChartEngine, ChartPoint, Tooltip};
pub use surface::{DisplayList, Surface};
