//! # Chart Geometry
//!
//! Axis ranges, plot area and the sample → canvas mapping.
//!
//! Both axes start at 0. The RPM axis ends at the highest logged RPM rounded
//! up to the next 100; the advance axis ends at the highest logged advance.
//! With nothing to measure the axes fall back to 6000 rpm and 50 degrees.

use crate::sampler::log::Sample;

/// RPM axis end when the log is empty
pub const DEFAULT_MAX_RPM: f64 = 6000.0;

/// Advance axis end when the log is empty
pub const DEFAULT_MAX_ADVANCE: f64 = 50.0;

/// Space reserved around the plot area for labels, in pixels
pub const DEFAULT_MARGIN: f64 = 50.0;

/// A position on the drawing surface, in pixels from the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Upper ends of both axes (lower ends are always 0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRanges {
    pub max_x: f64,
    pub max_y: f64,
}

impl Default for AxisRanges {
    fn default() -> Self {
        Self {
            max_x: DEFAULT_MAX_RPM,
            max_y: DEFAULT_MAX_ADVANCE,
        }
    }
}

impl AxisRanges {
    /// Compute the axis ends for a set of samples
    ///
    /// A zero or non-finite maximum is treated like an empty set. Sentinel
    /// advances count like any other value, so an all-sentinel log has a
    /// negative advance axis end.
    ///
    /// # Examples
    ///
    /// ```
    /// use sweep_dash::chart::geometry::AxisRanges;
    /// use sweep_dash::sampler::log::Sample;
    ///
    /// let ranges = AxisRanges::from_samples(&[Sample::new(4210, 31.0), Sample::new(4390, 28.0)]);
    /// assert_eq!(ranges.max_x, 4400.0);
    /// assert_eq!(ranges.max_y, 31.0);
    ///
    /// assert_eq!(AxisRanges::from_samples(&[]), AxisRanges::default());
    /// ```
    pub fn from_samples(samples: &[Sample]) -> Self {
        let max_rpm = samples.iter().map(|s| s.rpm).max().unwrap_or(0);
        let max_x = (f64::from(max_rpm) / 100.0).ceil() * 100.0;

        let max_y = samples
            .iter()
            .map(|s| s.advance)
            .fold(f64::NEG_INFINITY, f64::max);

        Self {
            max_x: if max_x > 0.0 { max_x } else { DEFAULT_MAX_RPM },
            max_y: if max_y.is_finite() && max_y != 0.0 {
                max_y
            } else {
                DEFAULT_MAX_ADVANCE
            },
        }
    }
}

/// Interior rectangle of the surface the data is drawn in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    /// Plot area left after reserving `margin` on every side
    ///
    /// A surface smaller than twice the margin yields a negative extent; the
    /// mapping still works, it just mirrors.
    pub fn new(surface_width: f64, surface_height: f64, margin: f64) -> Self {
        Self {
            left: margin,
            top: margin,
            width: surface_width - 2.0 * margin,
            height: surface_height - 2.0 * margin,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Map a sample to canvas coordinates
    ///
    /// Sentinel advances are mapped like any other value.
    pub fn map(&self, sample: &Sample, ranges: &AxisRanges) -> Point {
        Point {
            x: self.left + (f64::from(sample.rpm) / ranges.max_x) * self.width,
            y: self.top + self.height - (sample.advance / ranges.max_y) * self.height,
        }
    }
}

/// One grid line and its axis label
#[derive(Debug, Clone, PartialEq)]
pub struct GridLine {
    pub from: Point,
    pub to: Point,
    pub label: String,
    pub label_at: Point,
}

/// Horizontal lines, top to bottom, labelled from `max_y` down to 0
///
/// `count` intervals give `count + 1` lines.
pub fn advance_gridlines(area: &PlotArea, ranges: &AxisRanges, count: u32) -> Vec<GridLine> {
    let n = f64::from(count.max(1));
    (0..=count.max(1))
        .map(|i| {
            let i = f64::from(i);
            let y = area.top + (i * area.height) / n;
            let value = ranges.max_y - (i * ranges.max_y) / n;
            GridLine {
                from: Point::new(area.left, y),
                to: Point::new(area.right(), y),
                label: format_whole(value),
                label_at: Point::new(area.left - 30.0, y + 5.0),
            }
        })
        .collect()
}

/// Vertical lines, left to right, labelled with RPM rounded to the nearest 100
///
/// `count` intervals give `count + 1` lines.
pub fn rpm_gridlines(area: &PlotArea, ranges: &AxisRanges, count: u32) -> Vec<GridLine> {
    let n = f64::from(count.max(1));
    (0..=count.max(1))
        .map(|i| {
            let i = f64::from(i);
            let x = area.left + (i * area.width) / n;
            let value = ((i * ranges.max_x) / n / 100.0).round() * 100.0;
            GridLine {
                from: Point::new(x, area.top),
                to: Point::new(x, area.bottom()),
                label: format_whole(value),
                label_at: Point::new(x - 15.0, area.bottom() + 25.0),
            }
        })
        .collect()
}

/// Position of the advance axis caption
pub fn advance_caption_at(area: &PlotArea) -> Point {
    Point::new(area.left - 40.0, area.top - 10.0)
}

/// Position of the RPM axis caption
pub fn rpm_caption_at(area: &PlotArea) -> Point {
    Point::new(area.right() + 10.0, area.bottom() + 35.0)
}

/// Format with no decimals, rounding halves away from zero
fn format_whole(value: f64) -> String {
    // Adding 0.0 turns -0.0 into 0.0
    format!("{}", value.round() + 0.0)
}
