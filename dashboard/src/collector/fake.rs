//! In-memory backend for scheduler and submission tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::Semaphore;

use super::{AnalyticsBackend, Endpoint};
use crate::error::{FetchError, SubmissionError};
use crate::model::{SubmitPayload, SubmitReceipt};

/// Every read answers with data derived from how many times that endpoint has
/// been called, so tests can tell which cycle a value came from.
pub struct FakeBackend {
    calls: Mutex<HashMap<Endpoint, usize>>,
    failing: Mutex<HashSet<Endpoint>>,
    crashing: Mutex<HashSet<Endpoint>>,
    latency: Duration,
    writes: AtomicUsize,
    last_payload: Mutex<Option<SubmitPayload>>,
    write_result: Mutex<Result<SubmitReceipt, SubmissionError>>,
    write_gate: Option<Arc<Semaphore>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            crashing: Mutex::new(HashSet::new()),
            latency: Duration::from_millis(100),
            writes: AtomicUsize::new(0),
            last_payload: Mutex::new(None),
            write_result: Mutex::new(Ok(SubmitReceipt {
                sentiment: "positive".into(),
                emotion: "joy".into(),
                keywords: vec!["service".into()],
            })),
            write_gate: None,
        }
    }
}

impl FakeBackend {
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// Writes block until a permit is added to the returned semaphore.
    pub fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let backend = Self {
            write_gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (backend, gate)
    }

    pub fn fail(&self, endpoint: Endpoint) {
        self.failing.lock().unwrap().insert(endpoint);
    }

    pub fn recover(&self, endpoint: Endpoint) {
        self.failing.lock().unwrap().remove(&endpoint);
    }

    /// The next read of `endpoint` panics, taking its whole cycle down.
    pub fn crash_once(&self, endpoint: Endpoint) {
        self.crashing.lock().unwrap().insert(endpoint);
    }

    pub fn set_write_result(&self, result: Result<SubmitReceipt, SubmissionError>) {
        *self.write_result.lock().unwrap() = result;
    }

    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.calls.lock().unwrap().get(&endpoint).copied().unwrap_or(0)
    }

    pub fn total_reads(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn last_payload(&self) -> Option<SubmitPayload> {
        self.last_payload.lock().unwrap().clone()
    }

    fn body(endpoint: Endpoint, n: u64) -> Value {
        match endpoint {
            Endpoint::SentimentCounts => json!({"positive": n, "neutral": n, "negative": n}),
            Endpoint::EmotionCounts => json!({"joy": n, "trust": 1}),
            Endpoint::TopKeywords => json!([{"keyword": format!("cycle{n}"), "count": n}]),
            Endpoint::FeedbackList => json!([{
                "_id": format!("rec{n}"),
                "name": "Ada",
                "feedback": "fine",
                "rating": 4,
                "sentiment_label": "neutral",
                "emotion": "trust",
                "keywords": ["fine"],
                "created_at": "2024-05-01T12:00:00Z"
            }]),
        }
    }
}

impl AnalyticsBackend for FakeBackend {
    async fn get(&self, endpoint: Endpoint) -> Result<Value, FetchError> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            let entry = calls.entry(endpoint).or_insert(0);
            *entry += 1;
            *entry as u64
        };
        let failing = self.failing.lock().unwrap().contains(&endpoint);
        let crashing = self.crashing.lock().unwrap().remove(&endpoint);
        if crashing {
            panic!("{endpoint} handler crashed");
        }

        tokio::time::sleep(self.latency).await;

        if failing {
            Err(FetchError::Network(format!("{endpoint} unreachable")))
        } else {
            Ok(Self::body(endpoint, n))
        }
    }

    async fn submit(&self, payload: SubmitPayload) -> Result<SubmitReceipt, SubmissionError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        *self.last_payload.lock().unwrap() = Some(payload);

        if let Some(gate) = &self.write_gate {
            let _permit = gate
                .acquire()
                .await
                .map_err(|e| SubmissionError::Network(e.to_string()))?;
        }

        self.write_result.lock().unwrap().clone()
    }
}
