//! Refresh-cycle coordination.
//!
//! A single task owns the last published [`Snapshot`] and the in-flight flag.
//! Periodic ticks, manual triggers and cycle completions are all serialized
//! through its `select!` loop, so at most one cycle is ever in flight.
//! Triggers that arrive while a cycle runs are folded into that cycle.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::collector::{adapters, AnalyticsBackend, Endpoint};
use crate::error::FetchError;
use crate::model::Snapshot;

const MIN_PERIOD: Duration = Duration::from_millis(10);

#[derive(Debug)]
enum Command {
    Start(Duration),
    Stop,
    Trigger(Option<oneshot::Sender<u64>>),
}

/// Cheap, cloneable control surface for the scheduler task.
#[derive(Clone, Debug)]
pub struct SchedulerHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<Arc<Snapshot>>,
}

impl SchedulerHandle {
    /// Begin periodic refreshes. The first cycle is requested immediately.
    pub fn start(&self, period: Duration) {
        self.send(Command::Start(period));
    }

    /// Cancel the periodic timer. A cycle already in flight still completes.
    pub fn stop(&self) {
        self.send(Command::Stop);
    }

    /// Request an out-of-band cycle without waiting for it.
    pub fn trigger_now(&self) {
        self.send(Command::Trigger(None));
    }

    /// Request a cycle and wait until the cycle serving the request publishes.
    /// Returns that cycle's sequence number, or `None` if the cycle was aborted
    /// or the scheduler is gone.
    #[cfg(test)]
    pub async fn refresh(&self) -> Option<u64> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Trigger(Some(tx)));
        rx.await.ok()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshots.clone()
    }

    pub fn latest(&self) -> Arc<Snapshot> {
        Arc::clone(&*self.snapshots.borrow())
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            debug!("scheduler task has exited; command dropped");
        }
    }

    /// A handle wired to nothing, plus the receiving end of its commands.
    #[cfg(test)]
    pub(crate) fn detached() -> (Self, DetachedCommands) {
        let (commands, rx) = mpsc::unbounded_channel();
        let (_publisher, snapshots) = watch::channel(Arc::new(Snapshot::default()));
        (Self { commands, snapshots }, DetachedCommands(rx))
    }
}

#[cfg(test)]
pub(crate) struct DetachedCommands(mpsc::UnboundedReceiver<Command>);

#[cfg(test)]
impl DetachedCommands {
    /// Number of refresh requests sent so far.
    pub fn triggers(&mut self) -> usize {
        let mut n = 0;
        while let Ok(cmd) = self.0.try_recv() {
            if matches!(cmd, Command::Trigger(_)) {
                n += 1;
            }
        }
        n
    }
}

pub struct SyncScheduler<B> {
    backend: Arc<B>,
    commands: mpsc::UnboundedReceiver<Command>,
    publisher: watch::Sender<Arc<Snapshot>>,
    ticker: Option<Interval>,
    in_flight: Option<(u64, JoinHandle<Snapshot>)>,
    waiters: Vec<oneshot::Sender<u64>>,
    last_cycle: u64,
}

impl<B: AnalyticsBackend> SyncScheduler<B> {
    /// Spawn the scheduler task on the current runtime. The timer is idle
    /// until [`SchedulerHandle::start`] is called.
    pub fn spawn(backend: Arc<B>) -> SchedulerHandle {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (publisher, snapshots) = watch::channel(Arc::new(Snapshot::default()));

        let scheduler = SyncScheduler {
            backend,
            commands,
            publisher,
            ticker: None,
            in_flight: None,
            waiters: Vec::new(),
            last_cycle: 0,
        };
        tokio::spawn(scheduler.run());

        SchedulerHandle {
            commands: commands_tx,
            snapshots,
        }
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.on_command(command),
                    None => break,
                },
                _ = next_tick(&mut self.ticker) => self.begin_cycle("tick"),
                (cycle, joined) = join_in_flight(&mut self.in_flight) => self.finish(cycle, joined),
            }
        }
        debug!("all scheduler handles dropped; scheduler exiting");
    }

    fn on_command(&mut self, command: Command) {
        match command {
            Command::Start(period) => {
                let mut ticker = time::interval(period.max(MIN_PERIOD));
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                self.ticker = Some(ticker);
                info!(period_ms = period.as_millis() as u64, "periodic refresh started");
            }
            Command::Stop => {
                if self.ticker.take().is_some() {
                    info!("periodic refresh stopped");
                }
            }
            Command::Trigger(waiter) => {
                self.waiters.extend(waiter);
                self.begin_cycle("trigger");
            }
        }
    }

    fn begin_cycle(&mut self, reason: &'static str) {
        if let Some((cycle, _)) = &self.in_flight {
            debug!(cycle, reason, "refresh coalesced into in-flight cycle");
            return;
        }

        self.last_cycle += 1;
        let cycle = self.last_cycle;
        debug!(cycle, reason, "refresh cycle started");

        let backend = Arc::clone(&self.backend);
        let previous = Arc::clone(&*self.publisher.borrow());
        let task = tokio::spawn(async move { run_cycle(backend.as_ref(), cycle, &previous).await });
        self.in_flight = Some((cycle, task));
    }

    /// The in-flight slot is released however the cycle task ended. An aborted
    /// cycle publishes nothing and its waiters see `None`.
    fn finish(&mut self, cycle: u64, joined: Result<Snapshot, JoinError>) {
        self.in_flight = None;
        match joined {
            Ok(snapshot) => self.publish(snapshot),
            Err(error) => {
                warn!(cycle, %error, "refresh cycle aborted; previous snapshot kept");
                self.waiters.clear();
            }
        }
    }

    fn publish(&mut self, snapshot: Snapshot) {
        let cycle = snapshot.cycle;
        info!(
            cycle,
            fresh = snapshot.fresh_count(),
            degraded = snapshot.degraded_count(),
            "refresh cycle published"
        );
        self.publisher.send_replace(Arc::new(snapshot));
        for waiter in self.waiters.drain(..) {
            let _ = waiter.send(cycle);
        }
    }
}

async fn join_in_flight(in_flight: &mut Option<(u64, JoinHandle<Snapshot>)>) -> (u64, Result<Snapshot, JoinError>) {
    match in_flight {
        Some((cycle, task)) => (*cycle, task.await),
        None => std::future::pending().await,
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn log_failure<T>(endpoint: Endpoint, cycle: u64, result: &Result<T, FetchError>) {
    if let Err(error) = result {
        warn!(cycle, %endpoint, %error, "fetch failed; slice degraded");
    }
}

/// Fetch all four slices concurrently and fold them over the previous snapshot.
/// A failed adapter only degrades its own slice.
pub async fn run_cycle<B: AnalyticsBackend>(backend: &B, cycle: u64, previous: &Snapshot) -> Snapshot {
    let (sentiment, emotions, keywords, feedback) = tokio::join!(
        adapters::fetch_sentiment(backend),
        adapters::fetch_emotions(backend),
        adapters::fetch_keywords(backend),
        adapters::fetch_feedback(backend),
    );

    log_failure(Endpoint::SentimentCounts, cycle, &sentiment);
    log_failure(Endpoint::EmotionCounts, cycle, &emotions);
    log_failure(Endpoint::TopKeywords, cycle, &keywords);
    log_failure(Endpoint::FeedbackList, cycle, &feedback);

    Snapshot {
        cycle,
        completed_at: Some(Local::now()),
        sentiment: previous.sentiment.advance(sentiment),
        emotions: previous.emotions.advance(emotions),
        keywords: previous.keywords.advance(keywords),
        feedback: previous.feedback.advance(feedback),
    }
}
