//! Progress narration shown while an analysis request is in flight.
//!
//! The stages are cosmetic: they advance on a fixed timer and know nothing about
//! what the analysis service is actually doing. The index only moves forward,
//! holds on the last message, and is discarded when narration stops.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

pub const NARRATION_MESSAGES: &[&str] = &[
    "Extracting text from your resume…",
    "Scanning skills, education, and experience…",
    "Generating AI embedding for similarity search…",
    "Matching your profile across all company roles…",
    "Analyzing strengths, gaps, and ATS patterns…",
    "Preparing your personalized predictions…",
    "Almost done, finalizing your results…",
];

pub const STAGE_INTERVAL: Duration = Duration::from_secs(10);

/// A snapshot of the narration: which line is showing and how full the bar is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NarrationStage {
    pub index: usize,
    messages: &'static [&'static str],
    run: u64,
}

impl NarrationStage {
    pub fn message(&self) -> &'static str {
        self.messages[self.index]
    }

    pub fn total(&self) -> usize {
        self.messages.len()
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.total()
    }

    /// `(index + 1) / total`. Reaches 1.0 only on the final stage.
    pub fn progress(&self) -> f64 {
        (self.index + 1) as f64 / self.total() as f64
    }

    pub fn percent(&self) -> u8 {
        (self.progress() * 100.0).round() as u8
    }

    fn advance(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        true
    }
}

pub struct ProgressNarrator {
    messages: &'static [&'static str],
    interval: Duration,
    stage: Arc<watch::Sender<Option<NarrationStage>>>,
    ticker: Option<JoinHandle<()>>,
    runs: u64,
}

impl ProgressNarrator {
    pub fn new() -> Self {
        Self::with_schedule(NARRATION_MESSAGES, STAGE_INTERVAL)
    }

    /// # Panics
    /// If `messages` is empty or `interval` is zero.
    pub fn with_schedule(messages: &'static [&'static str], interval: Duration) -> Self {
        assert!(!messages.is_empty(), "narration needs at least one message");
        assert!(!interval.is_zero(), "narration interval must be non-zero");
        let (tx, _rx) = watch::channel(None);
        Self {
            messages,
            interval,
            stage: Arc::new(tx),
            ticker: None,
            runs: 0,
        }
    }

    /// Receives every stage change; `None` while narration is stopped.
    pub fn subscribe(&self) -> watch::Receiver<Option<NarrationStage>> {
        self.stage.subscribe()
    }

    pub fn current(&self) -> Option<NarrationStage> {
        *self.stage.borrow()
    }

    pub fn is_active(&self) -> bool {
        self.ticker.is_some()
    }

    /// Shows the first stage immediately and starts the ticker.
    /// Restarting while active begins again from index 0.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self) {
        self.cancel_ticker();
        self.runs += 1;
        let run = self.runs;

        self.stage.send_replace(Some(NarrationStage {
            index: 0,
            messages: self.messages,
            run,
        }));

        let stage = Arc::clone(&self.stage);
        let period = self.interval;
        self.ticker = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let advanced = stage.send_if_modified(|current| match current {
                    Some(s) if s.run == run => s.advance(),
                    _ => false,
                });
                if advanced {
                    if let Some(s) = *stage.borrow() {
                        debug!(stage = s.index, message = s.message(), "Narration advanced");
                    }
                }
            }
        }));
        debug!(run, "Narration started");
    }

    /// Cancels the ticker and discards the stage.
    pub fn stop(&mut self) {
        if self.cancel_ticker() {
            debug!(run = self.runs, "Narration stopped");
        }
        self.stage.send_replace(None);
    }

    fn cancel_ticker(&mut self) -> bool {
        match self.ticker.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}

impl Default for ProgressNarrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProgressNarrator {
    fn drop(&mut self) {
        self.cancel_ticker();
    }
}
