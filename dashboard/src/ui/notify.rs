//! Transient notifications: one toast slot and one tooltip slot. A new message
//! overwrites whatever is showing in its slot; nothing is queued.

use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::theme::ColorScheme;

pub const TOAST_TTL: Duration = Duration::from_millis(3800);
pub const TOOLTIP_TTL: Duration = Duration::from_millis(1600);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A message sent from background work to the notification layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { message: message.into(), kind: NoticeKind::Success }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { message: message.into(), kind: NoticeKind::Error }
    }
}

#[derive(Clone, Debug)]
struct Shown {
    notice: Notice,
    expires_at: Instant,
}

#[derive(Debug, Default)]
pub struct Notifications {
    toast: Option<Shown>,
    tooltip: Option<Shown>,
}

impl Notifications {
    pub fn notify(&mut self, notice: Notice, now: Instant) {
        self.toast = Some(Shown { notice, expires_at: now + TOAST_TTL });
    }

    /// Hover text; kept apart from toasts so hovering does not hide a result.
    pub fn tooltip(&mut self, text: impl Into<String>, now: Instant) {
        self.tooltip = Some(Shown {
            notice: Notice::success(text),
            expires_at: now + TOOLTIP_TTL,
        });
    }

    pub fn toast(&self, now: Instant) -> Option<&Notice> {
        visible(&self.toast, now)
    }

    pub fn current_tooltip(&self, now: Instant) -> Option<&str> {
        visible(&self.tooltip, now).map(|n| n.message.as_str())
    }

    /// Drop anything that has expired.
    pub fn prune(&mut self, now: Instant) {
        if self.toast.as_ref().is_some_and(|s| s.expires_at <= now) {
            self.toast = None;
        }
        if self.tooltip.as_ref().is_some_and(|s| s.expires_at <= now) {
            self.tooltip = None;
        }
    }
}

fn visible(slot: &Option<Shown>, now: Instant) -> Option<&Notice> {
    slot.as_ref().filter(|s| now < s.expires_at).map(|s| &s.notice)
}

/// Toast in the bottom-right corner, tooltip in the top-right corner.
pub fn draw(frame: &mut Frame, area: Rect, notifications: &Notifications, now: Instant, colors: &ColorScheme) {
    if let Some(notice) = notifications.toast(now) {
        let color = match notice.kind {
            NoticeKind::Success => colors.status_ok,
            NoticeKind::Error => colors.status_error,
        };
        let rect = corner(area, &notice.message, area.bottom().saturating_sub(4));
        let toast = Paragraph::new(Line::from(Span::styled(
            notice.message.as_str(),
            Style::default().fg(colors.text_primary),
        )))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );
        frame.render_widget(Clear, rect);
        frame.render_widget(toast, rect);
    }

    if let Some(text) = notifications.current_tooltip(now) {
        let rect = corner(area, text, area.y + 3);
        let tip = Paragraph::new(Line::from(Span::styled(
            format!(" {text} "),
            Style::default()
                .fg(colors.text_primary)
                .bg(colors.row_selected_bg)
                .add_modifier(Modifier::BOLD),
        )));
        frame.render_widget(Clear, Rect { height: 1, ..rect });
        frame.render_widget(tip, Rect { height: 1, ..rect });
    }
}

fn corner(area: Rect, text: &str, y: u16) -> Rect {
    let width = (Span::raw(text).width() as u16 + 4).min(area.width);
    Rect {
        x: area.right().saturating_sub(width + 2).max(area.x),
        y: y.max(area.y),
        width,
        height: 3.min(area.height),
    }
}
