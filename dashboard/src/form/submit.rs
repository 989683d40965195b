use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use super::FormInput;
use crate::collector::adapters::ANONYMOUS;
use crate::collector::AnalyticsBackend;
use crate::error::SubmissionError;
use crate::model::SubmitPayload;
use crate::scheduler::SchedulerHandle;
use crate::ui::notify::Notice;

/// What the backend computed for an accepted submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub sentiment: String,
    pub emotion: String,
    pub keywords: Vec<String>,
}

/// Runs the write flow. Clones share one in-flight flag.
pub struct SubmissionController<B> {
    backend: Arc<B>,
    scheduler: SchedulerHandle,
    notices: mpsc::UnboundedSender<Notice>,
    in_flight: Arc<AtomicBool>,
}

impl<B> Clone for SubmissionController<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            scheduler: self.scheduler.clone(),
            notices: self.notices.clone(),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

/// Clears the in-flight flag however the submission ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub fn build_payload(form: &FormInput) -> Result<SubmitPayload, SubmissionError> {
    if form.feedback.trim().is_empty() {
        return Err(SubmissionError::Validation(
            "Please write some feedback before submitting".to_string(),
        ));
    }

    let name = form.name.trim();
    Ok(SubmitPayload {
        name: if name.is_empty() { ANONYMOUS.to_string() } else { name.to_string() },
        email: form.email.trim().to_string(),
        feedback: form.feedback.clone(),
        rating: form.rating,
    })
}

impl<B: AnalyticsBackend> SubmissionController<B> {
    pub fn new(backend: Arc<B>, scheduler: SchedulerHandle, notices: mpsc::UnboundedSender<Notice>) -> Self {
        Self {
            backend,
            scheduler,
            notices,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True while a write is pending; drives the busy indicator.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Submit one feedback entry. Rejected locally (no network call) when the
    /// text is empty or another submission is still pending. On success a
    /// refresh cycle is requested; the caller resets the form.
    pub async fn submit(&self, form: FormInput) -> Result<SubmissionOutcome, SubmissionError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(self.report(SubmissionError::AlreadyInFlight));
        }
        let _in_flight = InFlight(&self.in_flight);

        let payload = build_payload(&form).map_err(|e| self.report(e))?;

        match self.backend.submit(payload).await {
            Ok(receipt) => {
                info!(sentiment = %receipt.sentiment, emotion = %receipt.emotion, "feedback saved");
                self.notify(Notice::success(format!(
                    "Saved • Sentiment: {} • Emotion: {}",
                    receipt.sentiment, receipt.emotion
                )));
                self.scheduler.trigger_now();
                Ok(SubmissionOutcome {
                    sentiment: receipt.sentiment,
                    emotion: receipt.emotion,
                    keywords: receipt.keywords,
                })
            }
            Err(error) => {
                warn!(%error, "feedback submission failed");
                Err(self.report(error))
            }
        }
    }

    fn report(&self, error: SubmissionError) -> SubmissionError {
        self.notify(Notice::error(error.user_message()));
        error
    }

    fn notify(&self, notice: Notice) {
        let _ = self.notices.send(notice);
    }
}
