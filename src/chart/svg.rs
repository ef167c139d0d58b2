//! # SVG Snapshot
//!
//! Renders a recorded frame as a standalone SVG document.

use super::engine::Tooltip;
use super::geometry::Point;
use super::surface::{DisplayList, DrawOp};

/// Render a display list (and the tooltip, if shown) to SVG text
///
/// # Arguments
///
/// * `list` - Operations of the frame to render
/// * `width`, `height` - Surface size in pixels
/// * `tooltip` - Floating label drawn on top, if any
pub fn render_svg(list: &DisplayList, width: f64, height: f64, tooltip: Option<&Tooltip>) -> String {
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
        w = width,
        h = height
    );

    for op in list.ops() {
        match op {
            DrawOp::Path { points, stroke } => {
                svg.push_str(&format!(
                    "  <polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"",
                    points_attr(points),
                    escape(&stroke.color),
                    stroke.width
                ));
                if !stroke.dash.is_empty() {
                    let dash: Vec<String> = stroke.dash.iter().map(|d| d.to_string()).collect();
                    svg.push_str(&format!(" stroke-dasharray=\"{}\"", dash.join(" ")));
                }
                svg.push_str("/>\n");
            }
            DrawOp::Text { text, at, style } => {
                svg.push_str(&format!(
                    "  <text x=\"{}\" y=\"{}\" fill=\"{}\" style=\"font: {}\">{}</text>\n",
                    at.x,
                    at.y,
                    escape(&style.color),
                    escape(&style.font),
                    escape(text)
                ));
            }
        }
    }

    if let Some(tip) = tooltip {
        svg.push_str(&format!(
            "  <text class=\"tooltip\" x=\"{}\" y=\"{}\">{}</text>\n",
            tip.at.x,
            tip.at.y,
            escape(&tip.text)
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::style::ChartStyle;
    use crate::chart::surface::Surface;

    #[test]
    fn test_empty_document() {
        let svg = render_svg(&DisplayList::new(), 800.0, 480.0, None);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"viewBox="0 0 800 480""#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_polyline_and_dash() {
        let style = ChartStyle::default();
        let mut list = DisplayList::new();
        list.stroke_path(&[Point::new(50.0, 60.5), Point::new(70.0, 80.0)], &style.crosshair);

        let svg = render_svg(&list, 100.0, 100.0, None);
        assert!(svg.contains(r#"points="50,60.5 70,80""#));
        assert!(svg.contains(r#"stroke="grey""#));
        assert!(svg.contains(r#"stroke-dasharray="5 5""#));
    }

    #[test]
    fn test_text_is_escaped() {
        let style = ChartStyle::default();
        let mut list = DisplayList::new();
        list.fill_text("<ADV & RPM>", Point::new(1.0, 2.0), &style.grid_text);

        let svg = render_svg(&list, 10.0, 10.0, None);
        assert!(svg.contains("&lt;ADV &amp; RPM&gt;"));
        assert!(svg.contains("font: 14px Arial"));
    }

    #[test]
    fn test_one_element_per_line() {
        let style = ChartStyle::default();
        let mut list = DisplayList::new();
        list.stroke_path(&[Point::new(0.0, 0.0), Point::new(1.0, 1.0)], &style.line);
        list.fill_text("RPM", Point::new(5.0, 5.0), &style.grid_text);

        let svg = render_svg(&list, 10.0, 10.0, None);
        let lines: Vec<&str> = svg.lines().collect();

        assert_eq!(lines.len(), 4, "Header, polyline, text, footer");
        assert!(lines[1].trim_start().starts_with("<polyline") && lines[1].ends_with("/>"));
        assert!(!lines[1].contains("stroke-dasharray"), "Solid lines carry no dash attribute");
        assert!(lines[2].trim_start().starts_with("<text"));
        assert_eq!(lines[3], "</svg>");
    }

    #[test]
    fn test_tooltip_drawn_last() {
        let tooltip = Tooltip {
            text: "RPM: 1000, ADV: 20".to_string(),
            at: Point::new(415.0, 225.0),
        };
        let svg = render_svg(&DisplayList::new(), 800.0, 480.0, Some(&tooltip));
        assert!(svg.contains(r#"<text class="tooltip" x="415" y="225">RPM: 1000, ADV: 20</text>"#));
    }
}
