//! Progress events emitted while a run is in flight.

use crate::models::{RunSummary, UpdateOutcome};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

/// One step of an update run, for whatever presentation layer is listening.
///
/// `index` is the artifact's position in the working set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    Started { total: usize },
    ArtifactStarted { index: usize, name: String },
    ProviderAttempt { index: usize, provider: String },
    Downloading { index: usize, url: String },
    ArtifactFinished { index: usize, outcome: UpdateOutcome },
    Finished { summary: RunSummary },
}

/// Optional sink for progress events.
///
/// Sending never waits: an event that does not fit in the channel, or whose
/// receiver is gone, is dropped so a slow listener cannot stall the run.
#[derive(Debug, Clone, Default)]
pub(crate) struct ProgressSink(Option<mpsc::Sender<ProgressEvent>>);

impl ProgressSink {
    pub(crate) fn new(sender: Option<mpsc::Sender<ProgressEvent>>) -> Self {
        Self(sender)
    }

    pub(crate) fn emit(&self, event: ProgressEvent) {
        let Some(tx) = &self.0 else {
            return;
        };
        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => debug!("Progress channel full, dropped {:?}", event),
            Err(TrySendError::Closed(_)) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_drops_when_full() {
        let (tx, mut rx) = mpsc::channel(1);
        let sink = ProgressSink::new(Some(tx));

        sink.emit(ProgressEvent::Started { total: 1 });
        sink.emit(ProgressEvent::Started { total: 2 });

        assert_eq!(rx.try_recv().unwrap(), ProgressEvent::Started { total: 1 });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_emit_ignores_closed_receiver() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        ProgressSink::new(Some(tx)).emit(ProgressEvent::Started { total: 0 });
        ProgressSink::default().emit(ProgressEvent::Started { total: 0 });
    }
}
