use std::f64::consts::TAU;

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Points};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::theme::ColorScheme;
use super::view::SliceStatus;
use crate::model::{EmotionCount, Slice};

pub const TOP_EMOTIONS: usize = 8;
pub const INNER_RADIUS: f64 = 0.35;
/// Outer radius runs from `BASE` (smallest value) to `BASE + SPAN` (largest).
pub const OUTER_BASE: f64 = 0.5;
pub const OUTER_SPAN: f64 = 0.4;
const LABEL_CHARS: usize = 6;

#[derive(Clone, Debug, PartialEq)]
pub struct Wedge {
    pub label: String,
    pub count: u64,
    /// Clockwise from 12 o'clock, radians.
    pub start: f64,
    pub end: f64,
    pub inner: f64,
    pub outer: f64,
}

impl Wedge {
    /// `x`/`y` are chart coordinates with the centre at 0 and radius 1, y up.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let r = x.hypot(y);
        let angle = x.atan2(y).rem_euclid(TAU);
        r >= self.inner && r <= self.outer && angle >= self.start && angle < self.end
    }

    pub fn tooltip(&self) -> String {
        format!("{} \u{2022} {}", self.label, self.count)
    }

    fn mid_angle(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

#[derive(Clone, Debug, Default)]
pub struct EmotionRadial {
    pub cycle: u64,
    pub status: SliceStatus,
    pub wedges: Vec<Wedge>,
}

/// Highest counts first; equal counts keep the backend's order.
pub fn top_emotions(entries: &[EmotionCount]) -> Vec<EmotionCount> {
    let mut ranked = entries.to_vec();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(TOP_EMOTIONS);
    ranked
}

pub fn wedges(entries: &[EmotionCount]) -> Vec<Wedge> {
    let top = top_emotions(entries);
    let n = top.len();
    let total: u64 = top.iter().map(|e| e.count).sum();
    let max = top.iter().map(|e| e.count).max().unwrap_or(0).max(1) as f64;

    let mut start = 0.0;
    top.into_iter()
        .enumerate()
        .map(|(idx, e)| {
            let sweep = if total == 0 {
                TAU / n as f64
            } else {
                TAU * e.count as f64 / total as f64
            };
            // the last wedge closes the circle exactly
            let end = if idx + 1 == n { TAU } else { start + sweep };
            let wedge = Wedge {
                outer: OUTER_BASE + OUTER_SPAN * (e.count as f64 / max),
                inner: INNER_RADIUS,
                label: e.label,
                count: e.count,
                start,
                end,
            };
            start = end;
            wedge
        })
        .collect()
}

impl EmotionRadial {
    pub fn render(&self, cycle: u64, slice: &Slice<Vec<EmotionCount>>) -> EmotionRadial {
        EmotionRadial {
            cycle,
            status: SliceStatus::of(slice),
            wedges: slice.value().map(|entries| wedges(entries)).unwrap_or_default(),
        }
    }

    pub fn wedge_at(&self, x: f64, y: f64) -> Option<&Wedge> {
        self.wedges.iter().find(|w| w.contains(x, y))
    }
}

/// Canvas bounds that keep the chart round. Terminal cells are about twice
/// as tall as they are wide.
pub fn canvas_bounds(area: Rect) -> ([f64; 2], [f64; 2]) {
    let w = area.width.max(1) as f64;
    let h = area.height.max(1) as f64 * 2.0;
    if w >= h {
        let a = w / h;
        ([-a, a], [-1.0, 1.0])
    } else {
        let a = h / w;
        ([-1.0, 1.0], [-a, a])
    }
}

/// Map a terminal cell inside `area` to chart coordinates.
pub fn cell_to_chart(area: Rect, column: u16, row: u16) -> Option<(f64, f64)> {
    if !area.contains((column, row).into()) {
        return None;
    }
    let ([x0, x1], [y0, y1]) = canvas_bounds(area);
    let fx = (column - area.x) as f64 + 0.5;
    let fy = (row - area.y) as f64 + 0.5;
    Some((
        x0 + fx / area.width as f64 * (x1 - x0),
        y1 - fy / area.height as f64 * (y1 - y0),
    ))
}

fn wedge_points(wedge: &Wedge) -> Vec<(f64, f64)> {
    let mut points = Vec::new();
    let mut r = wedge.inner;
    while r <= wedge.outer {
        let step = (0.02 / r).max(0.005);
        let mut angle = wedge.start;
        while angle < wedge.end {
            points.push((r * angle.sin(), r * angle.cos()));
            angle += step;
        }
        r += 0.02;
    }
    points
}

/// Draws the chart and returns the rectangle the canvas occupies, for hit-testing.
pub fn draw(frame: &mut Frame, area: Rect, radial: &EmotionRadial, colors: &ColorScheme) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Emotions{} ", radial.status.title_suffix()))
        .border_style(Style::default().fg(colors.border_focused));
    let inner = block.inner(area);

    if radial.wedges.is_empty() {
        let msg = Paragraph::new(Span::styled(
            radial.status.placeholder(),
            Style::default().fg(colors.text_disabled),
        ))
        .block(block);
        frame.render_widget(msg, area);
        return inner;
    }

    let (x_bounds, y_bounds) = canvas_bounds(inner);
    let palette = colors.palette;
    let label_style = Style::default().fg(colors.text_primary);
    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            for (idx, wedge) in radial.wedges.iter().enumerate() {
                let points = wedge_points(wedge);
                ctx.draw(&Points {
                    coords: &points,
                    color: palette[idx % palette.len()],
                });
            }
            ctx.layer();
            for wedge in &radial.wedges {
                let r = (wedge.inner + wedge.outer) / 2.0;
                let a = wedge.mid_angle();
                let label: String = wedge.label.chars().take(LABEL_CHARS).collect();
                ctx.print(r * a.sin(), r * a.cos(), Line::from(Span::styled(label, label_style)));
            }
        });
    frame.render_widget(canvas, area);
    inner
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emotions(pairs: &[(&str, u64)]) -> Vec<EmotionCount> {
        pairs
            .iter()
            .map(|(label, count)| EmotionCount { label: label.to_string(), count: *count })
            .collect()
    }

    #[test]
    fn only_the_top_eight_are_drawn() {
        let input = emotions(&[
            ("joy", 40),
            ("anger", 5),
            ("sadness", 2),
            ("trust", 9),
            ("fear", 3),
            ("surprise", 7),
            ("disgust", 4),
            ("anticipation", 6),
            ("neutral", 1),
        ]);
        let radial = EmotionRadial::default().render(1, &Slice::Fresh(input));

        assert_eq!(radial.wedges.len(), 8);
        assert!(radial.wedges.iter().all(|w| w.label != "neutral"));
        assert_eq!(radial.wedges[0].label, "joy");
    }

    #[test]
    fn ties_keep_backend_order() {
        let top = top_emotions(&emotions(&[("b", 2), ("a", 5), ("c", 2), ("d", 2)]));
        let labels: Vec<&str> = top.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["a", "b", "c", "d"]);
    }

    #[test]
    fn outer_radius_is_relative_to_the_largest_value() {
        let w = wedges(&emotions(&[("joy", 40), ("anger", 4), ("fear", 0)]));
        assert_eq!(w[0].outer, OUTER_BASE + OUTER_SPAN);
        assert!((w[1].outer - (OUTER_BASE + OUTER_SPAN * 0.1)).abs() < 1e-9);
        // the smallest wedge is still wider than the hole
        assert_eq!(w[2].outer, OUTER_BASE);
        assert!(w[2].outer > w[2].inner);
    }

    #[test]
    fn sweeps_cover_the_circle_and_zero_totals_split_evenly() {
        let w = wedges(&emotions(&[("joy", 3), ("fear", 1)]));
        assert_eq!(w[0].start, 0.0);
        assert!((w[0].end - TAU * 0.75).abs() < 1e-9);
        assert_eq!(w[1].end, TAU);

        let even = wedges(&emotions(&[("a", 0), ("b", 0)]));
        assert!((even[0].end - TAU / 2.0).abs() < 1e-9);
    }

    #[test]
    fn hover_hit_test_finds_the_wedge_and_its_tooltip() {
        let radial = EmotionRadial::default().render(
            1,
            &Slice::Fresh(emotions(&[("joy", 40), ("anger", 40)])),
        );
        // 3 o'clock is inside the first half-turn
        let hit = radial.wedge_at(0.6, 0.0).unwrap();
        assert_eq!(hit.tooltip(), "joy \u{2022} 40");
        assert_eq!(radial.wedge_at(-0.6, 0.0).unwrap().label, "anger");
        assert!(radial.wedge_at(0.1, 0.0).is_none());
        assert!(radial.wedge_at(0.95, 0.0).is_none());
    }

    #[test]
    fn cell_mapping_centres_on_the_area() {
        let area = Rect::new(10, 5, 20, 10);
        let (x, y) = cell_to_chart(area, 20, 10).unwrap();
        assert!(x.abs() < 0.1 && y.abs() < 0.2);
        assert!(cell_to_chart(area, 0, 0).is_none());
    }
}
