use futures::stream::{FuturesUnordered, StreamExt};
use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};

use crate::import::paths::split_path;
use crate::import::types::{ImportFailure, ImportOutcome};
use crate::progress::ProgressSink;

/// Default number of items persisted concurrently within one batch
pub const BATCH_SIZE: usize = 5;

/// Shared bookkeeping for one import run.
///
/// The orchestrator owns one of these per run and is the sole writer through
/// the scheduler and the encryption callbacks. Counters only ever grow.
#[derive(Debug, Default)]
pub struct RunContext {
    operations_count: AtomicUsize,
    current_operation: AtomicUsize,
    current_item: AtomicUsize,
    batches_run: AtomicUsize,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_operations_count(&self, total: usize) {
        self.operations_count.store(total, Ordering::SeqCst);
    }

    pub fn operations_count(&self) -> usize {
        self.operations_count.load(Ordering::SeqCst)
    }

    /// Advance both counters for one settled item; returns the new step
    pub fn advance(&self) -> usize {
        self.current_item.fetch_add(1, Ordering::SeqCst);
        self.current_operation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current_operation(&self) -> usize {
        self.current_operation.load(Ordering::SeqCst)
    }

    pub fn current_item(&self) -> usize {
        self.current_item.load(Ordering::SeqCst)
    }

    /// Count one executed batch; diagnostics only, never control flow
    pub fn record_batch(&self) -> usize {
        self.batches_run.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn batches_run(&self) -> usize {
        self.batches_run.load(Ordering::SeqCst)
    }
}

/// Split items into batches of at most `batch_size`, preserving order.
pub fn partition<I>(items: Vec<I>, batch_size: usize) -> Vec<Vec<I>> {
    assert!(batch_size > 0, "batch size must be positive");

    let mut batches = Vec::new();
    let mut batch = Vec::with_capacity(batch_size.min(items.len()));
    for item in items {
        batch.push(item);
        if batch.len() == batch_size {
            batches.push(std::mem::replace(&mut batch, Vec::with_capacity(batch_size)));
        }
    }
    if !batch.is_empty() {
        batches.push(batch);
    }
    batches
}

/// Split sorted folder paths into batches of at most `batch_size`, cutting a
/// batch early whenever a path's parent sits in the same batch.
///
/// Items within a batch run concurrently and only read registry entries
/// written by fully-joined earlier batches, so a parent and its child must
/// never share a batch. Paths arrive sorted, which keeps the cut cheap: only
/// the direct parent needs checking.
pub fn partition_folder_paths(paths: Vec<String>, batch_size: usize) -> Vec<Vec<String>> {
    assert!(batch_size > 0, "batch size must be positive");

    let mut batches: Vec<Vec<String>> = Vec::new();
    let mut batch: Vec<String> = Vec::new();
    for path in paths {
        let (parent, _) = split_path(&path);
        let parent_in_batch = !parent.is_empty() && batch.iter().any(|p| p == parent);
        if batch.len() == batch_size || parent_in_batch {
            batches.push(std::mem::take(&mut batch));
        }
        batch.push(path);
    }
    if !batch.is_empty() {
        batches.push(batch);
    }
    batches
}

/// Run batches strictly one after another; items within a batch are launched
/// together and the batch completes only when every item has settled.
///
/// Worker outcomes: `Ok(Some(entity))` lands in `created`, `Err` lands in
/// `errors` with the item payload, `Ok(None)` is a skip recorded in neither
/// list. A failing item never aborts its siblings or later batches. Every
/// settled item advances the run counters and pushes one progress update.
pub async fn run_batches<I, T, E, F, Fut>(
    batches: Vec<Vec<I>>,
    ctx: &RunContext,
    progress: &dyn ProgressSink,
    label: &str,
    worker: F,
) -> ImportOutcome<T, I>
where
    I: Clone,
    E: Display,
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let total: usize = batches.iter().map(|b| b.len()).sum();
    let mut outcome = ImportOutcome::default();
    let mut settled = 0usize;

    for batch in batches {
        let batch_number = ctx.record_batch();
        debug!(batch = batch_number, size = batch.len(), "running batch");

        let mut tasks = FuturesUnordered::new();
        for item in batch {
            let fut = worker(item.clone());
            tasks.push(async move { (item, fut.await) });
        }

        while let Some((item, result)) = tasks.next().await {
            settled += 1;
            let step = ctx.advance();
            progress.update(step, &format!("{} {}/{}", label, settled, total));

            match result {
                Ok(Some(entity)) => outcome.created.push(entity),
                Ok(None) => {}
                Err(error) => {
                    warn!(error = %error, "item failed, continuing with the batch");
                    outcome.errors.push(ImportFailure {
                        error: error.to_string(),
                        item,
                    });
                }
            }
        }
    }

    outcome
}
