//! Render state for every panel, rebuilt from each published snapshot.
//!
//! Each renderer is a pure step `(previous state, slice) -> new state`; the
//! `draw` functions only read that state. No renderer looks at another's.

use std::time::Instant;

use super::emotions::EmotionRadial;
use super::feedback::{FeedbackList, ListTarget};
use super::keywords::KeywordCloud;
use super::sentiment::SentimentBars;
use crate::model::{Slice, Snapshot};

/// How a panel should label the data it is showing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SliceStatus {
    #[default]
    Loading,
    Live,
    Stale,
    Unavailable,
}

impl SliceStatus {
    pub fn of<T>(slice: &Slice<T>) -> Self {
        match slice {
            Slice::Pending => SliceStatus::Loading,
            Slice::Fresh(_) => SliceStatus::Live,
            Slice::Stale { .. } => SliceStatus::Stale,
            Slice::Unavailable(_) => SliceStatus::Unavailable,
        }
    }

    /// Suffix appended to a panel title.
    pub fn title_suffix(self) -> &'static str {
        match self {
            SliceStatus::Loading | SliceStatus::Live => "",
            SliceStatus::Stale => " (stale)",
            SliceStatus::Unavailable => " (unavailable)",
        }
    }

    /// Placeholder text when there is nothing to draw.
    pub fn placeholder(self) -> &'static str {
        match self {
            SliceStatus::Loading => "  Loading\u{2026}",
            SliceStatus::Unavailable => "  Data unavailable",
            SliceStatus::Live | SliceStatus::Stale => "  No data yet",
        }
    }
}

#[derive(Debug)]
pub struct DashboardView {
    pub cycle: u64,
    pub sentiment: SentimentBars,
    pub emotions: EmotionRadial,
    pub keywords: KeywordCloud,
    /// Short list on the dashboard page.
    pub compact: FeedbackList,
    /// Full cards on the feedback page.
    pub detail: FeedbackList,
    compact_rows: usize,
}

impl DashboardView {
    pub fn new(compact_rows: usize) -> Self {
        Self {
            cycle: 0,
            sentiment: SentimentBars::default(),
            emotions: EmotionRadial::default(),
            keywords: KeywordCloud::default(),
            compact: FeedbackList::default(),
            detail: FeedbackList::default(),
            compact_rows,
        }
    }

    /// Redraw every panel from one snapshot.
    pub fn apply(&mut self, snapshot: &Snapshot, now: Instant) {
        let cycle = snapshot.cycle;
        self.sentiment = self.sentiment.render(cycle, &snapshot.sentiment, now);
        self.emotions = self.emotions.render(cycle, &snapshot.emotions);
        self.keywords = self.keywords.render(cycle, &snapshot.keywords);
        self.compact = self
            .compact
            .render(ListTarget::Compact(self.compact_rows), cycle, &snapshot.feedback);
        self.detail = self.detail.render(ListTarget::Detail, cycle, &snapshot.feedback);
        self.cycle = cycle;
    }

    /// Cycle numbers each panel last rendered, in a fixed order.
    pub fn rendered_cycles(&self) -> [u64; 5] {
        [
            self.sentiment.cycle,
            self.emotions.cycle,
            self.keywords.cycle,
            self.compact.cycle,
            self.detail.cycle,
        ]
    }
}
