use std::time::Instant;

use chrono::{DateTime, Local, Utc};
use ratatui::layout::{Position, Rect};
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::form::rating::RatingEvent;
use crate::form::{FeedbackForm, FormField};
use crate::ui::emotions;
use crate::ui::notify::Notifications;
use crate::ui::view::DashboardView;

// --- /get_feedback_counts response ---

#[derive(Deserialize, Serialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct SentimentCounts {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
}

// --- /get_emotion_counts response (object, backend order kept) ---

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmotionCount {
    pub label: String,
    pub count: u64,
}

// --- /get_top_keywords response ---

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: u64,
}

// --- /get_feedback response ---

/// Raw feedback document as the backend dumps it. Most fields are optional;
/// defaults are applied when converting into a [`FeedbackRecord`].
#[derive(Deserialize, Clone, Default, Debug)]
pub struct FeedbackDoc {
    #[serde(default, rename = "_id")]
    pub id: Option<DocumentId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub sentiment_label: Option<String>,
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub created_at: Option<DocumentDate>,
}

/// `_id` is either a plain string or an extended-JSON `{"$oid": ...}`.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum DocumentId {
    Plain(String),
    Oid {
        #[serde(rename = "$oid")]
        oid: String,
    },
}

impl DocumentId {
    pub fn as_str(&self) -> &str {
        match self {
            DocumentId::Plain(s) => s,
            DocumentId::Oid { oid } => oid,
        }
    }
}

/// Timestamps arrive as RFC 3339 text, epoch millis, or extended-JSON wrappers.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum DocumentDate {
    Millis(i64),
    Text(String),
    Wrapped {
        #[serde(rename = "$date")]
        date: Box<DocumentDate>,
    },
    NumberLong {
        #[serde(rename = "$numberLong")]
        value: String,
    },
}

/// A validated feedback entry. Never mutated after it is fetched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbackRecord {
    pub id: String,
    pub name: String,
    /// 1..=5, or 0 when the submitter left the rating unset.
    pub rating: u8,
    pub feedback_text: String,
    pub sentiment_label: String,
    pub emotion_label: String,
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
}

// --- /submit request + response ---

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct SubmitPayload {
    pub name: String,
    pub email: String,
    pub feedback: String,
    pub rating: u8,
}

#[derive(Deserialize, Clone, Default, Debug, PartialEq, Eq)]
pub struct SubmitReceipt {
    #[serde(default)]
    pub sentiment: String,
    #[serde(default)]
    pub emotion: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

// --- Merged view-model ---

/// One piece of the snapshot, as produced by one fetch adapter.
#[derive(Clone, Debug, PartialEq)]
pub enum Slice<T> {
    /// No cycle has completed yet.
    Pending,
    Fresh(T),
    /// This cycle's fetch failed; the value is from an earlier cycle.
    Stale { value: T, error: FetchError },
    /// This cycle's fetch failed and there is nothing to fall back on.
    Unavailable(FetchError),
}

impl<T> Default for Slice<T> {
    fn default() -> Self {
        Slice::Pending
    }
}

impl<T: Clone> Slice<T> {
    /// Fold this cycle's fetch result over the previous slice.
    pub fn advance(&self, result: Result<T, FetchError>) -> Slice<T> {
        match (result, self) {
            (Ok(value), _) => Slice::Fresh(value),
            (Err(error), Slice::Fresh(value) | Slice::Stale { value, .. }) => Slice::Stale {
                value: value.clone(),
                error,
            },
            (Err(error), Slice::Pending | Slice::Unavailable(_)) => Slice::Unavailable(error),
        }
    }
}

impl<T> Slice<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Slice::Fresh(value) | Slice::Stale { value, .. } => Some(value),
            Slice::Pending | Slice::Unavailable(_) => None,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Slice::Fresh(_))
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Slice::Stale { .. } | Slice::Unavailable(_))
    }
}

/// Result of one refresh cycle. Published as an immutable `Arc<Snapshot>`.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Snapshot {
    /// Sequence number of the cycle that produced this snapshot; 0 before the first.
    pub cycle: u64,
    pub completed_at: Option<DateTime<Local>>,
    pub sentiment: Slice<SentimentCounts>,
    pub emotions: Slice<Vec<EmotionCount>>,
    pub keywords: Slice<Vec<KeywordCount>>,
    pub feedback: Slice<Vec<FeedbackRecord>>,
}

impl Snapshot {
    pub fn fresh_count(&self) -> usize {
        [
            self.sentiment.is_fresh(),
            self.emotions.is_fresh(),
            self.keywords.is_fresh(),
            self.feedback.is_fresh(),
        ]
        .into_iter()
        .filter(|fresh| *fresh)
        .count()
    }

    pub fn degraded_count(&self) -> usize {
        [
            self.sentiment.is_degraded(),
            self.emotions.is_degraded(),
            self.keywords.is_degraded(),
            self.feedback.is_degraded(),
        ]
        .into_iter()
        .filter(|degraded| *degraded)
        .count()
    }

    /// The backend answered at least one read in the last cycle.
    pub fn connected(&self) -> bool {
        self.fresh_count() > 0
    }
}

// --- Dashboard UI state ---

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Page {
    #[default]
    Dashboard,
    /// Submission form plus the full feedback list.
    Feedback,
}

impl Page {
    pub fn toggle(self) -> Self {
        match self {
            Page::Dashboard => Page::Feedback,
            Page::Feedback => Page::Dashboard,
        }
    }
}

/// Screen areas recorded by the last draw, for mouse hit-testing.
#[derive(Clone, Debug, Default)]
pub struct Hitboxes {
    /// One cell range per star, in star order.
    pub stars: Vec<(u8, Rect)>,
    pub emotions: Rect,
    pub cloud: Rect,
}

#[derive(Debug)]
pub struct AppState {
    pub page: Page,
    pub form: FeedbackForm,
    pub notifications: Notifications,
    pub view: DashboardView,
    pub hitboxes: Hitboxes,
    pub detail_scroll: u16,
    /// Frame counter, drives the busy spinner.
    pub tick: usize,
}

impl AppState {
    pub fn new(compact_rows: usize) -> Self {
        Self {
            page: Page::default(),
            form: FeedbackForm::default(),
            notifications: Notifications::default(),
            view: DashboardView::new(compact_rows),
            hitboxes: Hitboxes::default(),
            detail_scroll: 0,
            tick: 0,
        }
    }

    fn star_at(&self, column: u16, row: u16) -> Option<u8> {
        self.hitboxes
            .stars
            .iter()
            .find(|(_, rect)| rect.contains(Position::new(column, row)))
            .map(|(star, _)| *star)
    }

    /// Pointer moved: star hover preview on the form page, tooltips for
    /// wedges and cloud words on the dashboard page.
    pub fn on_mouse_move(&mut self, column: u16, row: u16, now: Instant) {
        match self.page {
            Page::Feedback => match self.star_at(column, row) {
                Some(star) => self.form.rating.apply(RatingEvent::Hover(star)),
                None => self.form.rating.apply(RatingEvent::Unhover),
            },
            Page::Dashboard => {
                if let Some(text) = self.tooltip_at(column, row) {
                    self.notifications.tooltip(text, now);
                }
            }
        }
    }

    pub fn on_click(&mut self, column: u16, row: u16) {
        if self.page != Page::Feedback {
            return;
        }
        if let Some(star) = self.star_at(column, row) {
            self.form.focus = FormField::Rating;
            self.form.rating.apply(RatingEvent::Select(star));
        }
    }

    fn tooltip_at(&self, column: u16, row: u16) -> Option<String> {
        if let Some((x, y)) = emotions::cell_to_chart(self.hitboxes.emotions, column, row) {
            return self.view.emotions.wedge_at(x, y).map(|w| w.tooltip());
        }
        let cloud = self.hitboxes.cloud;
        if cloud.contains(Position::new(column, row)) {
            return self
                .view
                .keywords
                .layout(cloud.width, cloud.height)
                .word_at(column - cloud.x, row - cloud.y)
                .map(|w| format!("{} \u{2022} {}", w.keyword, w.count));
        }
        None
    }
}
