use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::Page;
use super::theme::ColorScheme;

pub fn draw(frame: &mut Frame, area: Rect, page: Page, colors: &ColorScheme) {
    let key_style = Style::default()
        .fg(colors.accent)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(colors.text_secondary);
    let sep_style = Style::default().fg(colors.help_separator);

    let keys: &[(&str, &str)] = match page {
        Page::Dashboard => &[
            ("Tab", "Feedback form"),
            ("r", "Refresh"),
            ("mouse", "Hover for details"),
            ("q/Esc", "Quit"),
        ],
        Page::Feedback => &[
            ("Tab", "Dashboard"),
            ("\u{2191}/\u{2193}", "Field"),
            ("1-5 \u{2190}/\u{2192}", "Rating"),
            ("PgUp/PgDn", "Scroll"),
            ("Enter", "Submit"),
            ("Esc", "Quit"),
        ],
    };

    let mut spans = Vec::with_capacity(keys.len() * 3);
    for (idx, (key, desc)) in keys.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled("\u{2502}", sep_style));
        }
        spans.push(Span::styled(format!(" {key}"), key_style));
        spans.push(Span::styled(format!(" {desc} "), desc_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
