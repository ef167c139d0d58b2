//! # Chart Engine
//!
//! Renders the sweep curve and answers pointer queries against it.
//!
//! Every render is a full redraw: clear, compute axes, grid, captions, then
//! the data polyline. Canvas coordinates of each point are kept only until
//! the next render and are what hit-testing measures against.
//!
//! Hit-testing is a linear scan over every rendered point on each pointer
//! move. That is fine for sweep-sized logs; a spatial index would be the
//! next step for much larger ones.

use tracing::trace;

use super::geometry::{
    advance_caption_at, advance_gridlines, rpm_caption_at, rpm_gridlines, AxisRanges, PlotArea,
    Point, DEFAULT_MARGIN,
};
use super::style::{ChartStyle, StyleConfig};
use super::surface::Surface;
use crate::error::Result;
use crate::sampler::log::{Sample, SweepLog};

/// Tooltip offset from the selected point, in pixels
const TOOLTIP_OFFSET: Point = Point { x: 15.0, y: -25.0 };

/// A sample plus where the last render put it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPoint {
    pub sample: Sample,
    pub canvas: Point,
}

/// Floating label describing the inspected point
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub text: String,
    pub at: Point,
}

/// Line chart of advance over RPM
#[derive(Debug, Clone)]
pub struct ChartEngine {
    width: f64,
    height: f64,
    margin: f64,
    style: StyleConfig,
    /// Read-only copy of the log, reparsed from its text form at the last update
    snapshot: SweepLog,
    /// Valid until the next render
    rendered: Vec<ChartPoint>,
    ranges: AxisRanges,
    tooltip: Option<Tooltip>,
}

impl ChartEngine {
    /// Create an engine for a surface of the given size
    pub fn new(width: f64, height: f64, margin: f64, style: StyleConfig) -> Self {
        Self {
            width,
            height,
            margin,
            style,
            snapshot: SweepLog::new(),
            rendered: Vec::new(),
            ranges: AxisRanges::default(),
            tooltip: None,
        }
    }

    /// Engine with the default margin and style
    pub fn with_size(width: f64, height: f64) -> Self {
        Self::new(width, height, DEFAULT_MARGIN, StyleConfig::default())
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn plot_area(&self) -> PlotArea {
        PlotArea::new(self.width, self.height, self.margin)
    }

    /// Axis ranges used by the last render
    pub fn axis_ranges(&self) -> AxisRanges {
        self.ranges
    }

    /// Points with the coordinates of the last render
    pub fn rendered_points(&self) -> &[ChartPoint] {
        &self.rendered
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    pub fn set_style(&mut self, style: StyleConfig) {
        self.style = style;
    }

    /// Take a fresh snapshot of the log and redraw
    ///
    /// The snapshot is parsed from the log's CSV form, so the chart plots
    /// exactly what an export would contain.
    ///
    /// # Errors
    ///
    /// Returns error if the log does not survive its own CSV form; the
    /// previous snapshot and drawing are kept
    pub fn update(&mut self, log: &SweepLog, surface: &mut dyn Surface) -> Result<()> {
        self.snapshot = SweepLog::parse_csv(&log.to_csv()?)?;
        self.render(surface);
        Ok(())
    }

    /// Change the surface size and redraw
    pub fn resize(&mut self, width: f64, height: f64, surface: &mut dyn Surface) {
        self.width = width;
        self.height = height;
        self.render(surface);
    }

    /// Full redraw of the current snapshot
    pub fn render(&mut self, surface: &mut dyn Surface) {
        let style = ChartStyle::resolve(&self.style);
        let area = self.plot_area();
        self.ranges = AxisRanges::from_samples(self.snapshot.samples());

        surface.clear();

        let gridlines = advance_gridlines(&area, &self.ranges, style.gridline_count)
            .into_iter()
            .chain(rpm_gridlines(&area, &self.ranges, style.gridline_count));
        for line in gridlines {
            surface.stroke_path(&[line.from, line.to], &style.grid);
            surface.fill_text(&line.label, line.label_at, &style.grid_text);
        }
        surface.fill_text("ADV", advance_caption_at(&area), &style.grid_text);
        surface.fill_text("RPM", rpm_caption_at(&area), &style.grid_text);

        let ranges = self.ranges;
        self.rendered.clear();
        self.rendered.extend(self.snapshot.samples().iter().map(|sample| ChartPoint {
            sample: *sample,
            canvas: area.map(sample, &ranges),
        }));

        if !self.rendered.is_empty() {
            let path: Vec<Point> = self.rendered.iter().map(|p| p.canvas).collect();
            surface.stroke_path(&path, &style.line);
        }

        trace!("Rendered {} points, axes {:?}", self.rendered.len(), self.ranges);
    }

    /// Index of the rendered point closest to `pointer`
    ///
    /// Ties go to the earliest point in log order.
    pub fn nearest_point(&self, pointer: Point) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (index, point) in self.rendered.iter().enumerate() {
            let dist = point.canvas.distance(&pointer);
            if dist.is_nan() {
                continue;
            }
            if best.map_or(true, |(_, best_dist)| dist < best_dist) {
                best = Some((index, dist));
            }
        }
        best.map(|(index, _)| index)
    }

    /// Inspect the point nearest to the pointer
    ///
    /// Redraws the chart, then draws dashed guide lines through the selected
    /// point and shows the tooltip. Does nothing when there are no points.
    ///
    /// # Returns
    ///
    /// * `Option<Sample>` - The inspected sample
    pub fn pointer_move(&mut self, x: f64, y: f64, surface: &mut dyn Surface) -> Option<Sample> {
        if self.rendered.is_empty() {
            return None;
        }

        let selected = self.nearest_point(Point::new(x, y));
        self.render(surface);

        let point = *self.rendered.get(selected?)?;
        self.draw_crosshair(&point, surface);
        Some(point.sample)
    }

    /// Hide the tooltip; what is drawn stays
    pub fn pointer_leave(&mut self) {
        self.tooltip = None;
    }

    fn draw_crosshair(&mut self, point: &ChartPoint, surface: &mut dyn Surface) {
        let style = ChartStyle::resolve(&self.style);
        let area = self.plot_area();
        let at = point.canvas;

        surface.stroke_path(&[Point::new(area.left, at.y), Point::new(area.right(), at.y)], &style.crosshair);
        surface.stroke_path(&[Point::new(at.x, area.top), Point::new(at.x, area.bottom())], &style.crosshair);

        self.tooltip = Some(Tooltip {
            text: format!("RPM: {}, ADV: {}", point.sample.rpm, point.sample.advance),
            at: Point::new(at.x + TOOLTIP_OFFSET.x, at.y + TOOLTIP_OFFSET.y),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::surface::{DisplayList, DrawOp};

    fn log_of(samples: &[(u32, f64)]) -> SweepLog {
        let mut log = SweepLog::new();
        for &(rpm, adv) in samples {
            log.append(Sample::new(rpm, adv));
        }
        log
    }

    fn engine() -> ChartEngine {
        // 700 x 400 plot area
        ChartEngine::with_size(800.0, 500.0)
    }

    #[test]
    fn test_empty_log_defaults() {
        let mut chart = engine();
        let mut surface = DisplayList::new();

        chart.update(&SweepLog::new(), &mut surface).unwrap();

        assert_eq!(chart.axis_ranges().max_x, 6000.0);
        assert_eq!(chart.axis_ranges().max_y, 50.0);
        assert!(chart.rendered_points().is_empty());
        assert_eq!(surface.paths_with_color("white").count(), 0, "No data line for an empty log");
    }

    #[test]
    fn test_empty_log_pointer_is_noop() {
        let mut chart = engine();
        let mut surface = DisplayList::new();
        chart.update(&SweepLog::new(), &mut surface).unwrap();
        let frames = surface.frames();

        assert!(chart.pointer_move(400.0, 250.0, &mut surface).is_none());
        assert!(chart.tooltip().is_none());
        assert_eq!(surface.frames(), frames, "Nothing to select, nothing to redraw");
    }

    #[test]
    fn test_render_draws_grid_captions_and_line() {
        let mut chart = engine();
        let mut surface = DisplayList::new();

        chart.update(&log_of(&[(1000, 20.0), (2000, 40.0)]), &mut surface).unwrap();

        let texts: Vec<&str> = surface.texts().collect();
        assert!(texts.contains(&"ADV"));
        assert!(texts.contains(&"RPM"));
        assert!(texts.contains(&"40"), "Top advance label is the max advance");
        assert!(texts.contains(&"2000"), "Right RPM label is the axis end");

        let grid = surface.paths_with_color("grey").count();
        assert_eq!(grid, 12, "6 horizontal + 6 vertical grid lines");

        let line: Vec<_> = surface.paths_with_color("white").collect();
        assert_eq!(line.len(), 1, "One polyline for the data");
        assert_eq!(line[0], &[Point::new(400.0, 250.0), Point::new(750.0, 50.0)]);
    }

    #[test]
    fn test_data_line_drawn_last() {
        let mut chart = engine();
        let mut surface = DisplayList::new();
        chart.update(&log_of(&[(1000, 20.0)]), &mut surface).unwrap();

        match surface.ops().last() {
            Some(DrawOp::Path { stroke, .. }) => assert_eq!(stroke.color, "white"),
            other => panic!("Expected data line last, got: {:?}", other),
        }
    }

    #[test]
    fn test_sentinel_plotted_below_zero_line() {
        let mut chart = engine();
        let mut surface = DisplayList::new();
        chart.update(&log_of(&[(1000, 20.0), (2000, -1.0)]), &mut surface).unwrap();

        let points = chart.rendered_points();
        assert!(points[1].canvas.y > chart.plot_area().bottom());
    }

    #[test]
    fn test_coordinates_recomputed_on_resize() {
        let mut chart = engine();
        let mut surface = DisplayList::new();
        chart.update(&log_of(&[(1000, 20.0), (2000, 40.0)]), &mut surface).unwrap();
        let before = chart.rendered_points()[1].canvas;

        chart.resize(400.0, 300.0, &mut surface);
        let after = chart.rendered_points()[1].canvas;

        assert_eq!(before, Point::new(750.0, 50.0));
        assert_eq!(after, Point::new(350.0, 50.0));
    }

    #[test]
    fn test_snapshot_is_detached_from_log() {
        let mut chart = engine();
        let mut surface = DisplayList::new();
        let mut log = log_of(&[(1000, 20.0)]);
        chart.update(&log, &mut surface).unwrap();

        log.append(Sample::new(2000, 30.0));
        chart.render(&mut surface);

        assert_eq!(chart.rendered_points().len(), 1, "Only update() takes a new snapshot");
    }

    #[test]
    fn test_update_rejects_unrepresentable_log() {
        let mut chart = engine();
        let mut surface = DisplayList::new();
        chart.update(&log_of(&[(1000, 20.0)]), &mut surface).unwrap();
        let frames = surface.frames();

        // 75 degrees is outside the advance domain and cannot be read back
        let result = chart.update(&log_of(&[(1000, 20.0), (2000, 75.0)]), &mut surface);

        assert!(matches!(result, Err(crate::error::DashboardError::Record(_))));
        assert_eq!(chart.rendered_points().len(), 1, "Previous snapshot is kept");
        assert_eq!(surface.frames(), frames, "Nothing is redrawn");
    }

    #[test]
    fn test_nearest_point() {
        let mut chart = engine();
        let mut surface = DisplayList::new();
        chart.update(&log_of(&[(1000, 20.0), (2000, 40.0)]), &mut surface).unwrap();

        assert_eq!(chart.nearest_point(Point::new(390.0, 260.0)), Some(0));
        assert_eq!(chart.nearest_point(Point::new(740.0, 40.0)), Some(1));
    }

    #[test]
    fn test_nearest_point_tie_goes_to_first() {
        let mut chart = engine();
        let mut surface = DisplayList::new();
        chart.update(&log_of(&[(1000, 20.0), (2000, 20.0)]), &mut surface).unwrap();

        // Points at x=400 and x=750 on the same row; 575 is equidistant
        let mid = Point::new(575.0, 250.0);
        assert_eq!(chart.nearest_point(mid), Some(0));
    }

    #[test]
    fn test_pointer_move_draws_crosshair_and_tooltip() {
        let mut chart = engine();
        let mut surface = DisplayList::new();
        chart.update(&log_of(&[(1000, 20.0), (2000, 40.0)]), &mut surface).unwrap();
        let frames = surface.frames();

        let picked = chart.pointer_move(410.0, 240.0, &mut surface);

        assert_eq!(picked, Some(Sample::new(1000, 20.0)));
        assert_eq!(surface.frames(), frames + 1, "Chart is fully redrawn first");

        let tooltip = chart.tooltip().expect("tooltip should be shown");
        assert_eq!(tooltip.text, "RPM: 1000, ADV: 20");
        assert_eq!(tooltip.at, Point::new(415.0, 225.0));

        let n = surface.ops().len();
        let guides: Vec<_> = surface.ops()[n - 2..].to_vec();
        assert_eq!(
            guides,
            vec![
                DrawOp::Path {
                    points: vec![Point::new(50.0, 250.0), Point::new(750.0, 250.0)],
                    stroke: ChartStyle::default().crosshair,
                },
                DrawOp::Path {
                    points: vec![Point::new(400.0, 50.0), Point::new(400.0, 450.0)],
                    stroke: ChartStyle::default().crosshair,
                },
            ]
        );
    }

    #[test]
    fn test_pointer_leave_hides_tooltip_only() {
        let mut chart = engine();
        let mut surface = DisplayList::new();
        chart.update(&log_of(&[(1000, 20.0)]), &mut surface).unwrap();
        chart.pointer_move(400.0, 250.0, &mut surface);
        let drawn = surface.ops().len();

        chart.pointer_leave();

        assert!(chart.tooltip().is_none());
        assert_eq!(surface.ops().len(), drawn, "Chart content persists");
    }

    #[test]
    fn test_tooltip_shows_sentinel() {
        let mut chart = engine();
        let mut surface = DisplayList::new();
        chart.update(&log_of(&[(1500, -1.0)]), &mut surface).unwrap();

        chart.pointer_move(0.0, 0.0, &mut surface);
        assert_eq!(chart.tooltip().map(|t| t.text.as_str()), Some("RPM: 1500, ADV: -1"));
    }

    #[test]
    fn test_style_applied() {
        let mut chart = ChartEngine::new(
            800.0,
            500.0,
            DEFAULT_MARGIN,
            StyleConfig {
                line_color: Some("orange".to_string()),
                gridline_count: Some(2),
                ..Default::default()
            },
        );
        let mut surface = DisplayList::new();
        chart.update(&log_of(&[(1000, 20.0)]), &mut surface).unwrap();

        assert_eq!(surface.paths_with_color("orange").count(), 1);
        assert_eq!(surface.paths_with_color("grey").count(), 6, "2 intervals give 3 lines per axis");
    }
}
