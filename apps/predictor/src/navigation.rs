use tokio::sync::mpsc;
use tracing::debug;

use crate::models::AnalysisResult;

/// Receives the full analysis payload once a submission succeeds and moves the
/// user to the results view. Called exactly once per successful attempt.
pub trait Navigator: Send + Sync {
    fn show_results(&self, result: AnalysisResult);
}

/// Hands each payload to whoever owns the matching receiver, typically the
/// terminal front-end waiting to render the result board.
///
/// Every successful attempt is delivered in order, so a resubmission from the
/// results state is shown too.
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<AnalysisResult>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AnalysisResult>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn show_results(&self, result: AnalysisResult) {
        if self.tx.send(result).is_err() {
            debug!("Results view is gone; dropping payload");
        }
    }
}
