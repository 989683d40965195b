use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::model::Snapshot;
use super::theme::ColorScheme;

const SPINNER: [&str; 4] = ["\u{25d0}", "\u{25d3}", "\u{25d1}", "\u{25d2}"];

pub fn draw(
    frame: &mut Frame,
    area: Rect,
    snapshot: &Snapshot,
    backend_url: &str,
    busy: Option<usize>,
    colors: &ColorScheme,
) {
    let connected = snapshot.connected();
    let status_color = if connected {
        colors.status_ok
    } else {
        colors.status_error
    };
    let status_text = if connected {
        "CONNECTED"
    } else {
        "OFFLINE"
    };

    let refreshed = snapshot
        .completed_at
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string());

    let mut spans = vec![
        Span::styled("Backend: ", Style::default().fg(colors.text_primary)),
        Span::styled(backend_url.to_string(), Style::default().fg(colors.accent)),
        Span::raw("  "),
        Span::styled(status_text, Style::default().fg(status_color)),
        Span::raw("  \u{2502}  "),
        Span::styled(
            format!("Cycle: {}", snapshot.cycle),
            Style::default().fg(colors.text_primary),
        ),
    ];

    let degraded = snapshot.degraded_count();
    if degraded > 0 {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("{degraded} degraded"),
            Style::default().fg(colors.status_error),
        ));
    }

    spans.push(Span::raw("  \u{2502}  "));
    spans.push(Span::styled(
        format!("Refreshed: {refreshed}"),
        Style::default().fg(colors.text_secondary),
    ));

    if let Some(tick) = busy {
        spans.push(Span::raw("  \u{2502}  "));
        spans.push(Span::styled(
            format!("{} Saving\u{2026}", SPINNER[tick % SPINNER.len()]),
            Style::default().fg(colors.accent_id),
        ));
    }

    let header = Paragraph::new(Line::from(spans))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Feedback Analytics ")
                .border_style(Style::default().fg(colors.border_focused)),
        );

    frame.render_widget(header, area);
}
