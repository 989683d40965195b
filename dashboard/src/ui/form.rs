use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use super::theme::ColorScheme;
use crate::form::rating::MAX_STARS;
use crate::form::{FeedbackForm, FormField};

const LABEL_WIDTH: usize = 10;
/// Columns taken by one star, glyph plus gap.
const STAR_CELLS: u16 = 2;

fn label<'a>(text: &str, focused: bool, colors: &ColorScheme) -> Span<'a> {
    let marker = if focused { "\u{203a} " } else { "  " };
    let style = if focused {
        Style::default().fg(colors.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors.text_secondary)
    };
    Span::styled(format!("{marker}{text:<LABEL_WIDTH$}"), style)
}

fn text_line<'a>(name: &str, value: &str, placeholder: &str, focused: bool, colors: &ColorScheme) -> Line<'a> {
    let mut spans = vec![label(name, focused, colors)];
    if value.is_empty() && !focused {
        spans.push(Span::styled(placeholder.to_string(), Style::default().fg(colors.text_disabled)));
    } else {
        spans.push(Span::styled(value.to_string(), Style::default().fg(colors.text_primary)));
    }
    if focused {
        spans.push(Span::styled("\u{258f}", Style::default().fg(colors.accent)));
    }
    Line::from(spans)
}

/// Draws the form and returns the cell range of each star for hit-testing.
pub fn draw(
    frame: &mut Frame,
    area: Rect,
    form: &FeedbackForm,
    busy: bool,
    colors: &ColorScheme,
) -> Vec<(u8, Rect)> {
    let title = if busy { " Leave Feedback (Saving\u{2026}) " } else { " Leave Feedback " };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(colors.border_focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // name
            Constraint::Length(1), // email
            Constraint::Min(2),    // feedback text
            Constraint::Length(1), // rating
        ])
        .split(inner);

    let focus = form.focus;
    frame.render_widget(
        Paragraph::new(text_line("Name", &form.name, "Anonymous", focus == FormField::Name, colors)),
        rows[0],
    );
    frame.render_widget(
        Paragraph::new(text_line("Email", &form.email, "optional", focus == FormField::Email, colors)),
        rows[1],
    );
    frame.render_widget(
        Paragraph::new(text_line(
            "Feedback",
            &form.feedback,
            "Tell us what you think",
            focus == FormField::Feedback,
            colors,
        ))
        .wrap(Wrap { trim: false }),
        rows[2],
    );

    let rating_row = rows[3];
    let mut spans = vec![label("Rating", focus == FormField::Rating, colors)];
    for star in 1..=MAX_STARS {
        let style = if form.rating.is_active(star) {
            Style::default().fg(colors.star_active).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.star_idle)
        };
        spans.push(Span::styled("\u{2605} ", style));
    }
    let committed = form.rating.committed();
    if committed > 0 {
        spans.push(Span::styled(
            format!(" {committed}/{MAX_STARS}"),
            Style::default().fg(colors.text_secondary),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), rating_row);

    let first = rating_row.x + (LABEL_WIDTH + 2) as u16;
    (1..=MAX_STARS)
        .map(|star| {
            let x = first + (star as u16 - 1) * STAR_CELLS;
            (star, Rect::new(x, rating_row.y, STAR_CELLS, 1).intersection(rating_row))
        })
        .filter(|(_, rect)| !rect.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::rating::RatingEvent;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn star_hitboxes_line_up_with_the_drawn_stars() {
        let mut form = FeedbackForm::default();
        form.rating.apply(RatingEvent::Select(2));
        let mut terminal = Terminal::new(TestBackend::new(50, 8)).unwrap();

        let mut boxes = Vec::new();
        terminal
            .draw(|frame| {
                let area = frame.area();
                boxes = draw(frame, area, &form, false, &ColorScheme::dark());
            })
            .unwrap();

        assert_eq!(boxes.len(), MAX_STARS as usize);
        let buffer = terminal.backend().buffer();
        for (star, rect) in &boxes {
            assert_eq!(buffer[(rect.x, rect.y)].symbol(), "\u{2605}", "star {star}");
        }
        assert_eq!(buffer[(boxes[0].1.x, boxes[0].1.y)].fg, ColorScheme::dark().star_active);
        assert_eq!(buffer[(boxes[2].1.x, boxes[2].1.y)].fg, ColorScheme::dark().star_idle);
    }

    #[test]
    fn hover_preview_highlights_more_stars_than_committed() {
        let mut form = FeedbackForm::default();
        form.rating.apply(RatingEvent::Select(1));
        form.rating.apply(RatingEvent::Hover(4));
        let mut terminal = Terminal::new(TestBackend::new(50, 8)).unwrap();

        let mut boxes = Vec::new();
        terminal
            .draw(|frame| {
                let area = frame.area();
                boxes = draw(frame, area, &form, true, &ColorScheme::dark());
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let lit = boxes
            .iter()
            .filter(|(_, r)| buffer[(r.x, r.y)].fg == ColorScheme::dark().star_active)
            .count();
        assert_eq!(lit, 4);
    }
}
