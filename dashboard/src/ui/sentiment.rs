use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::theme::ColorScheme;
use super::view::SliceStatus;
use crate::model::{SentimentCounts, Slice};

pub const ANIMATION: Duration = Duration::from_millis(900);
pub const STAGGER: Duration = Duration::from_millis(120);

const LABELS: [&str; 3] = ["Positive", "Neutral", "Negative"];

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SentimentBar {
    pub label: &'static str,
    pub count: u64,
    /// Target height as a fraction of the tallest bar.
    pub ratio: f64,
    /// Height the animation starts from.
    pub from: f64,
}

#[derive(Clone, Debug, Default)]
pub struct SentimentBars {
    pub cycle: u64,
    pub status: SliceStatus,
    pub bars: Vec<SentimentBar>,
    pub started_at: Option<Instant>,
}

/// Heights scale linearly against the largest count, never dividing by zero.
pub fn bar_ratios(counts: &SentimentCounts) -> [f64; 3] {
    let values = [counts.positive, counts.neutral, counts.negative];
    let ceiling = values.iter().copied().max().unwrap_or(0).max(1) as f64;
    values.map(|v| v as f64 / ceiling)
}

impl SentimentBars {
    pub fn render(&self, cycle: u64, slice: &Slice<SentimentCounts>, now: Instant) -> SentimentBars {
        let status = SliceStatus::of(slice);
        let Some(counts) = slice.value() else {
            return SentimentBars { cycle, status, bars: Vec::new(), started_at: None };
        };

        let values = [counts.positive, counts.neutral, counts.negative];
        let ratios = bar_ratios(counts);
        let bars = (0..3)
            .map(|i| SentimentBar {
                label: LABELS[i],
                count: values[i],
                ratio: ratios[i],
                from: self.height_at(i, now),
            })
            .collect();

        SentimentBars { cycle, status, bars, started_at: Some(now) }
    }

    /// Animated height of bar `idx` at `now`, eased from `from` to `ratio`.
    pub fn height_at(&self, idx: usize, now: Instant) -> f64 {
        let Some(bar) = self.bars.get(idx) else {
            return 0.0;
        };
        let Some(started) = self.started_at else {
            return bar.ratio;
        };

        let delay = STAGGER * idx as u32;
        let elapsed = now.saturating_duration_since(started).saturating_sub(delay);
        let t = (elapsed.as_secs_f64() / ANIMATION.as_secs_f64()).min(1.0);
        let eased = 1.0 - (1.0 - t).powi(3);
        bar.from + (bar.ratio - bar.from) * eased
    }

    /// Still animating; the frame loop redraws faster while this holds.
    pub fn animating(&self, now: Instant) -> bool {
        self.started_at.is_some_and(|started| {
            now.saturating_duration_since(started) < ANIMATION + STAGGER * self.bars.len() as u32
        })
    }
}

fn bar_color(idx: usize, colors: &ColorScheme) -> Color {
    match idx {
        0 => colors.positive,
        1 => colors.neutral,
        _ => colors.negative,
    }
}

pub fn draw(frame: &mut Frame, area: Rect, bars: &SentimentBars, now: Instant, colors: &ColorScheme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Sentiment{} ", bars.status.title_suffix()))
        .border_style(Style::default().fg(colors.border_focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if bars.bars.is_empty() {
        let msg = Paragraph::new(Span::styled(
            bars.status.placeholder(),
            Style::default().fg(colors.text_disabled),
        ));
        frame.render_widget(msg, inner);
        return;
    }
    if inner.height < 3 || inner.width < 9 {
        return;
    }

    // one row for the category label, one for the count above the bar
    let plot_rows = inner.height - 2;
    let slot = inner.width / bars.bars.len() as u16;
    let bar_width = (slot * 2 / 3).max(1);
    let buf = frame.buffer_mut();

    for (idx, bar) in bars.bars.iter().enumerate() {
        let x = inner.x + slot * idx as u16 + (slot - bar_width) / 2;
        let rows = (bars.height_at(idx, now) * plot_rows as f64).round() as u16;
        let base = inner.y + 1 + plot_rows;
        let style = Style::default().fg(bar_color(idx, colors));

        for row in 0..rows.min(plot_rows) {
            buf.set_string(x, base - 1 - row, "\u{2588}".repeat(bar_width as usize), style);
        }

        let count = bar.count.to_string();
        let count_x = x + bar_width.saturating_sub(count.len() as u16) / 2;
        buf.set_string(
            count_x,
            base - 1 - rows.min(plot_rows),
            &count,
            Style::default().fg(colors.text_primary).add_modifier(Modifier::BOLD),
        );

        let label_x = inner.x + slot * idx as u16 + slot.saturating_sub(bar.label.len() as u16) / 2;
        buf.set_string(label_x, base, bar.label, Style::default().fg(colors.text_secondary));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn counts(positive: u64, neutral: u64, negative: u64) -> Slice<SentimentCounts> {
        Slice::Fresh(SentimentCounts { positive, neutral, negative })
    }

    #[test]
    fn heights_scale_against_the_largest_count() {
        let now = Instant::now();
        let bars = SentimentBars::default().render(1, &counts(5, 0, 10), now);

        let ratios: Vec<f64> = bars.bars.iter().map(|b| b.ratio).collect();
        assert_eq!(ratios, [0.5, 0.0, 1.0]);
        let labels: Vec<String> = bars.bars.iter().map(|b| b.count.to_string()).collect();
        assert_eq!(labels, ["5", "0", "10"]);
    }

    #[test]
    fn all_zero_counts_do_not_divide_by_zero() {
        assert_eq!(bar_ratios(&SentimentCounts::default()), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn animation_starts_from_the_previous_height_and_settles() {
        let t0 = Instant::now();
        let first = SentimentBars::default().render(1, &counts(10, 10, 10), t0);
        let t1 = t0 + Duration::from_secs(5);
        assert_eq!(first.height_at(0, t1), 1.0);

        let second = first.render(2, &counts(0, 10, 10), t1);
        assert_eq!(second.bars[0].from, 1.0);
        assert_eq!(second.height_at(0, t1), 1.0);
        let mid = second.height_at(0, t1 + Duration::from_millis(300));
        assert!(mid > 0.0 && mid < 1.0);
        assert_eq!(second.height_at(0, t1 + ANIMATION), 0.0);
        // later bars wait for their stagger
        assert!(second.animating(t1 + ANIMATION));
        assert!(!second.animating(t1 + ANIMATION + STAGGER * 3));
    }

    #[test]
    fn draws_counts_and_labels() {
        let now = Instant::now();
        let bars = SentimentBars::default().render(1, &counts(5, 0, 10), now);
        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                draw(frame, area, &bars, now + ANIMATION * 2, &ColorScheme::dark())
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        for needle in ["Positive", "Neutral", "Negative", "10", "5", "0"] {
            assert!(text.contains(needle), "missing {needle}");
        }
    }
}
