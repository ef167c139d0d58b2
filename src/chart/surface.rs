//! # Drawing Surface
//!
//! The chart draws through [`Surface`], a minimal 2-D canvas: clear,
//! stroke a polyline, fill text. [`DisplayList`] records the operations of
//! the last frame so they can be inspected or turned into SVG.

use super::geometry::Point;
use super::style::{Stroke, TextStyle};

/// Minimal immediate-mode drawing target
pub trait Surface {
    /// Erase everything drawn so far
    fn clear(&mut self);

    /// Stroke straight segments joining `points` in order
    fn stroke_path(&mut self, points: &[Point], stroke: &Stroke);

    /// Draw `text` with its baseline starting at `at`
    fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle);
}

/// One recorded drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Path { points: Vec<Point>, stroke: Stroke },
    Text { text: String, at: Point, style: TextStyle },
}

/// Surface that records what was drawn since the last clear
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
    ops: Vec<DrawOp>,
    frames: u64,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operations drawn since the last clear, in order
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Number of clears so far, i.e. full redraws started
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Recorded paths drawn with the given color
    pub fn paths_with_color<'a>(&'a self, color: &'a str) -> impl Iterator<Item = &'a [Point]> + 'a {
        self.ops.iter().filter_map(move |op| match op {
            DrawOp::Path { points, stroke } if stroke.color == color => Some(points.as_slice()),
            _ => None,
        })
    }

    /// Recorded text strings, in draw order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Surface for DisplayList {
    fn clear(&mut self) {
        self.ops.clear();
        self.frames += 1;
    }

    fn stroke_path(&mut self, points: &[Point], stroke: &Stroke) {
        self.ops.push(DrawOp::Path {
            points: points.to_vec(),
            stroke: stroke.clone(),
        });
    }

    fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            at,
            style: style.clone(),
        });
    }
}
