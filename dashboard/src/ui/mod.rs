pub mod emotions;
pub mod feedback;
pub mod form;
pub mod header;
pub mod help;
pub mod keywords;
pub mod notify;
pub mod sentiment;
pub mod theme;
pub mod view;

use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::model::{AppState, Page, Snapshot};
use theme::ColorScheme;

pub fn draw(
    frame: &mut Frame,
    snapshot: &Snapshot,
    backend_url: &str,
    busy: bool,
    state: &mut AppState,
    now: Instant,
    colors: &ColorScheme,
) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(10),   // page body
            Constraint::Length(1), // help bar
        ])
        .split(frame.area());

    let spinner = busy.then_some(state.tick);
    header::draw(frame, outer[0], snapshot, backend_url, spinner, colors);

    match state.page {
        Page::Dashboard => draw_dashboard(frame, outer[1], state, now, colors),
        Page::Feedback => draw_feedback(frame, outer[1], state, busy, colors),
    }

    help::draw(frame, outer[2], state.page, colors);
    let area = frame.area();
    notify::draw(frame, area, &state.notifications, now, colors);
}

fn draw_dashboard(frame: &mut Frame, area: Rect, state: &mut AppState, now: Instant, colors: &ColorScheme) {
    let list_rows = state.view.compact.cards.len().max(1) as u16 + 3;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),           // sentiment + emotions
            Constraint::Length(9),         // keyword cloud
            Constraint::Length(list_rows), // recent feedback
        ])
        .split(area);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    sentiment::draw(frame, charts[0], &state.view.sentiment, now, colors);
    state.hitboxes.emotions = emotions::draw(frame, charts[1], &state.view.emotions, colors);
    state.hitboxes.cloud = keywords::draw(frame, rows[1], &state.view.keywords, colors);
    feedback::draw_compact(frame, rows[2], &state.view.compact, colors);

    state.hitboxes.stars.clear();
}

fn draw_feedback(frame: &mut Frame, area: Rect, state: &mut AppState, busy: bool, colors: &ColorScheme) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    state.hitboxes.stars = form::draw(frame, cols[0], &state.form, busy, colors);
    feedback::draw_detail(frame, cols[1], &state.view.detail, state.detail_scroll, colors);

    state.hitboxes.emotions = Rect::default();
    state.hitboxes.cloud = Rect::default();
}
