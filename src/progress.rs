use tokio::sync::mpsc;

/// Progress updates emitted during an import run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportProgress {
    Opened {
        title: String,
        total_steps: usize,
        label: String,
    },
    Step {
        step: usize,
        label: String,
    },
    Closed,
}

/// Sink for progress updates pushed by the import engine.
///
/// Implementations must not block: the engine fires these between awaits and
/// never waits for delivery.
pub trait ProgressSink: Send + Sync {
    fn open(&self, title: &str, total_steps: usize, label: &str);
    fn update(&self, step: usize, label: &str);
    fn close(&self);
}

/// Forwards progress events over an unbounded channel to a UI subscriber.
///
/// If the receiver is dropped, events are silently discarded.
#[derive(Clone)]
pub struct ChannelProgress {
    tx: mpsc::UnboundedSender<ImportProgress>,
}

impl ChannelProgress {
    /// Create the sink together with the receiver the UI consumes
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ImportProgress>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelProgress {
    fn open(&self, title: &str, total_steps: usize, label: &str) {
        let _ = self.tx.send(ImportProgress::Opened {
            title: title.to_string(),
            total_steps,
            label: label.to_string(),
        });
    }

    fn update(&self, step: usize, label: &str) {
        let _ = self.tx.send(ImportProgress::Step {
            step,
            label: label.to_string(),
        });
    }

    fn close(&self) {
        let _ = self.tx.send(ImportProgress::Closed);
    }
}

/// Discards every progress event
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn open(&self, _title: &str, _total_steps: usize, _label: &str) {}
    fn update(&self, _step: usize, _label: &str) {}
    fn close(&self) {}
}
