use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap};
use ratatui::Frame;

use super::theme::ColorScheme;
use super::view::SliceStatus;
use crate::model::{FeedbackRecord, Slice};

pub const TEXT_LIMIT: usize = 200;
pub const KEYWORD_LIMIT: usize = 3;

/// Display-ready form of one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbackCard {
    pub id: String,
    pub name: String,
    pub rating: u8,
    pub text: String,
    pub sentiment: String,
    pub emotion: String,
    pub keywords: Vec<String>,
    pub timestamp: String,
}

pub fn format_timestamp<Tz>(at: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.with_timezone(tz).format("%Y-%m-%d %H:%M").to_string()
}

pub fn card<Tz>(record: &FeedbackRecord, tz: &Tz) -> FeedbackCard
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    FeedbackCard {
        id: record.id.clone(),
        name: record.name.clone(),
        rating: record.rating,
        text: record.feedback_text.chars().take(TEXT_LIMIT).collect(),
        sentiment: record.sentiment_label.clone(),
        emotion: record.emotion_label.clone(),
        keywords: record.keywords.iter().take(KEYWORD_LIMIT).cloned().collect(),
        timestamp: format_timestamp(&record.created_at, tz),
    }
}

impl FeedbackCard {
    fn meta(&self) -> String {
        format!("{}\u{2605} \u{2022} {}", self.rating, self.sentiment)
    }

    fn footer(&self) -> String {
        let mut footer = self.timestamp.clone();
        if !self.emotion.is_empty() {
            footer.push_str(" \u{2022} ");
            footer.push_str(&self.emotion);
        }
        if !self.keywords.is_empty() {
            footer.push_str(" \u{2022} ");
            footer.push_str(&self.keywords.join(", "));
        }
        footer
    }
}

/// Which list a render is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListTarget {
    /// Dashboard page, at most this many rows.
    Compact(usize),
    /// Feedback page, every record.
    Detail,
}

#[derive(Clone, Debug, Default)]
pub struct FeedbackList {
    pub cycle: u64,
    pub status: SliceStatus,
    pub cards: Vec<FeedbackCard>,
}

impl FeedbackList {
    /// Whole-list replace; the previous cards are discarded, not diffed.
    pub fn render(&self, target: ListTarget, cycle: u64, slice: &Slice<Vec<FeedbackRecord>>) -> FeedbackList {
        let limit = match target {
            ListTarget::Compact(rows) => rows,
            ListTarget::Detail => usize::MAX,
        };
        let cards = slice
            .value()
            .map(|records| records.iter().take(limit).map(|r| card(r, &Local)).collect())
            .unwrap_or_default();

        FeedbackList { cycle, status: SliceStatus::of(slice), cards }
    }
}

fn placeholder(frame: &mut Frame, area: Rect, title: &str, status: SliceStatus, colors: &ColorScheme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .border_style(Style::default().fg(colors.border_normal));
    let msg = Paragraph::new(Text::styled(status.placeholder(), Style::default().fg(colors.text_disabled)))
        .block(block);
    frame.render_widget(msg, area);
}

/// Compact table on the dashboard page.
pub fn draw_compact(frame: &mut Frame, area: Rect, list: &FeedbackList, colors: &ColorScheme) {
    let title = format!(" Recent Feedback{} ", list.status.title_suffix());
    if list.cards.is_empty() {
        placeholder(frame, area, &title, list.status, colors);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Time"),
        Cell::from("Name"),
        Cell::from("Rating"),
        Cell::from("Sentiment"),
        Cell::from("Emotion"),
        Cell::from("Keywords"),
        Cell::from("Feedback"),
    ])
    .style(
        Style::default()
            .fg(colors.table_header)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = list
        .cards
        .iter()
        .map(|c| {
            Row::new(vec![
                Cell::from(c.timestamp.clone()).style(Style::default().fg(colors.text_secondary)),
                Cell::from(c.name.clone()).style(Style::default().fg(colors.accent_id)),
                Cell::from("\u{2605}".repeat(c.rating as usize)).style(Style::default().fg(colors.star_active)),
                Cell::from(c.sentiment.clone()).style(Style::default().fg(colors.sentiment(&c.sentiment))),
                Cell::from(c.emotion.clone()).style(Style::default().fg(colors.text_secondary)),
                Cell::from(c.keywords.join(", ")).style(Style::default().fg(colors.accent)),
                Cell::from(c.text.clone()).style(Style::default().fg(colors.text_primary)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(16),
            Constraint::Length(12),
            Constraint::Length(6),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(24),
            Constraint::Min(20),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(colors.border_focused)),
    );

    frame.render_widget(table, area);
}

/// Full cards on the feedback page.
pub fn draw_detail(frame: &mut Frame, area: Rect, list: &FeedbackList, scroll: u16, colors: &ColorScheme) {
    let title = format!(" All Feedback ({}){} ", list.cards.len(), list.status.title_suffix());
    if list.cards.is_empty() {
        placeholder(frame, area, &title, list.status, colors);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for c in &list.cards {
        lines.push(Line::from(vec![
            Span::styled(
                c.name.clone(),
                Style::default().fg(colors.accent).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(c.meta(), Style::default().fg(colors.sentiment(&c.sentiment))),
        ]));
        lines.push(Line::from(Span::styled(c.text.clone(), Style::default().fg(colors.text_primary))));
        lines.push(Line::from(Span::styled(c.footer(), Style::default().fg(colors.text_secondary))));
        lines.push(Line::from(""));
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(colors.border_focused)),
        );

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn record(text: &str, keywords: &[&str]) -> FeedbackRecord {
        FeedbackRecord {
            id: "r1".into(),
            name: "Ada".into(),
            rating: 5,
            feedback_text: text.into(),
            sentiment_label: "positive".into(),
            emotion_label: "joy".into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn cards_truncate_text_and_keywords() {
        let long = "é".repeat(250);
        let c = card(&record(&long, &["a", "b", "c", "d"]), &Utc);

        assert_eq!(c.text.chars().count(), TEXT_LIMIT);
        assert_eq!(c.keywords, ["a", "b", "c"]);
        assert_eq!(c.timestamp, "2024-05-01 09:30");
        assert_eq!(c.meta(), "5\u{2605} \u{2022} positive");
        assert_eq!(c.footer(), "2024-05-01 09:30 \u{2022} joy \u{2022} a, b, c");
    }

    #[test]
    fn compact_target_keeps_a_prefix_and_detail_keeps_all() {
        let records: Vec<FeedbackRecord> = (0..5).map(|_| record("ok", &[])).collect();
        let slice = Slice::Fresh(records);

        let compact = FeedbackList::default().render(ListTarget::Compact(2), 3, &slice);
        let detail = FeedbackList::default().render(ListTarget::Detail, 3, &slice);

        assert_eq!(compact.cards.len(), 2);
        assert_eq!(detail.cards.len(), 5);
        assert_eq!(compact.cards[..], detail.cards[..2]);
        assert_eq!((compact.cycle, detail.cycle), (3, 3));
    }

    #[test]
    fn refresh_replaces_the_whole_list() {
        let first = FeedbackList::default().render(
            ListTarget::Detail,
            1,
            &Slice::Fresh(vec![record("old", &[]), record("older", &[])]),
        );
        let second = first.render(ListTarget::Detail, 2, &Slice::Fresh(vec![record("new", &[])]));

        assert_eq!(second.cards.len(), 1);
        assert_eq!(second.cards[0].text, "new");
    }

    fn screen(list: &FeedbackList, draw_list: impl FnOnce(&mut Frame, &FeedbackList)) -> String {
        let mut terminal = Terminal::new(TestBackend::new(200, 8)).unwrap();
        terminal.draw(|frame| draw_list(frame, list)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn both_targets_show_the_whole_card() {
        let slice = Slice::Fresh(vec![record("quick delivery", &["kwone", "kwtwo"])]);
        let compact = FeedbackList::default().render(ListTarget::Compact(3), 1, &slice);
        let detail = FeedbackList::default().render(ListTarget::Detail, 1, &slice);
        let colors = ColorScheme::dark();

        let compact_text = screen(&compact, |f, l| {
            let area = f.area();
            draw_compact(f, area, l, &colors)
        });
        let detail_text = screen(&detail, |f, l| {
            let area = f.area();
            draw_detail(f, area, l, 0, &colors)
        });
        for text in [compact_text, detail_text] {
            for needle in ["Ada", "quick delivery", "positive", "joy", "kwone, kwtwo"] {
                assert!(text.contains(needle), "missing {needle}");
            }
        }
    }
}
