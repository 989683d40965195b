//! Backend access: the transport seam plus one fetch adapter per read endpoint.

pub mod adapters;
pub mod http;

#[cfg(test)]
pub mod fake;

use std::fmt;
use std::future::Future;

use serde_json::Value;

use crate::error::{FetchError, SubmissionError};
use crate::model::{SubmitPayload, SubmitReceipt};

/// The four read endpoints of the analytics backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    SentimentCounts,
    EmotionCounts,
    TopKeywords,
    FeedbackList,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::SentimentCounts => "/get_feedback_counts",
            Endpoint::EmotionCounts => "/get_emotion_counts",
            Endpoint::TopKeywords => "/get_top_keywords",
            Endpoint::FeedbackList => "/get_feedback",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

pub const SUBMIT_PATH: &str = "/submit";

/// Raw access to the analytics backend. Reads hand back unvalidated JSON;
/// shape checks live in [`adapters`].
pub trait AnalyticsBackend: Send + Sync + 'static {
    fn get(&self, endpoint: Endpoint) -> impl Future<Output = Result<Value, FetchError>> + Send;

    fn submit(
        &self,
        payload: SubmitPayload,
    ) -> impl Future<Output = Result<SubmitReceipt, SubmissionError>> + Send;
}
