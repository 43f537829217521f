pub mod azure;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::types::{SynthesisOutcome, WordBoundary};

/// Trait for speech synthesis engines
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` with the engine's configured voice
    ///
    /// Word boundaries are pushed into `boundaries` while synthesis runs, possibly
    /// from a task other than the caller's. All of them are pushed before this
    /// returns.
    async fn speak(&self, text: &str, boundaries: Option<BoundarySink>) -> crate::error::Result<SynthesisOutcome>;

    /// Get the engine name
    fn name(&self) -> &str;
}

/// Write side of the word boundary queue
///
/// The queue is bounded; boundaries past its capacity are dropped.
#[derive(Debug)]
pub struct BoundarySink {
    tx: mpsc::Sender<WordBoundary>,
}

impl BoundarySink {
    /// Record one boundary without waiting
    pub fn push(&self, boundary: WordBoundary) {
        if let Err(mpsc::error::TrySendError::Full(dropped)) = self.tx.try_send(boundary) {
            tracing::warn!(word = %dropped.text, "word boundary queue full, dropping boundary");
        }
    }
}

/// Create a bounded boundary queue
pub fn boundary_queue(capacity: usize) -> (BoundarySink, mpsc::Receiver<WordBoundary>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (BoundarySink { tx }, rx)
}
