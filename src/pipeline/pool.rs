use crate::config::StackConfig;
use crate::data::{CornerFeatures, StackImage};
use crate::pipeline::{AlignOutcome, AlignmentPipeline};
use std::sync::{Arc, Mutex};

/// Shared work queue. Position 0 always holds the immutable reference
/// image and is never removed; workers claim the item at position 1.
pub struct WorkQueue {
    items: Mutex<Vec<Arc<StackImage>>>,
}

impl WorkQueue {
    pub fn new(reference: Arc<StackImage>, candidates: Vec<Arc<StackImage>>) -> Self {
        let mut items = Vec::with_capacity(candidates.len() + 1);
        items.push(reference);
        items.extend(candidates);
        Self {
            items: Mutex::new(items),
        }
    }

    /// Atomically removes and returns the front candidate, or `None` when
    /// only the reference remains. The lock is held only for the removal,
    /// never across alignment work.
    pub fn claim(&self) -> Option<Arc<StackImage>> {
        let mut items = self.items.lock().expect("queue lock poisoned");
        if items.len() > 1 {
            Some(items.remove(1))
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.items.lock().expect("queue lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything a worker needs: the pipeline, the queue it claims from and
/// the collection it appends results to. Shared by reference across the
/// pool; no globally reachable state.
struct BatchContext {
    pipeline: AlignmentPipeline,
    queue: WorkQueue,
    finished: Mutex<Vec<AlignOutcome>>,
}

/// Aligns every candidate against the reference on a pool of
/// `config.workers` threads and returns the finished outcomes, unordered.
///
/// Fails up front with `MissingReferenceFeatures` when the reference's
/// corner points were never detected. Completion is the thread join: on
/// return the queue held exactly the reference and every candidate has
/// exactly one outcome.
pub fn run_batch(
    reference: Arc<StackImage>,
    features: CornerFeatures,
    candidates: Vec<Arc<StackImage>>,
    config: &StackConfig,
) -> crate::Result<Vec<AlignOutcome>> {
    let expected = candidates.len();
    let workers = config.workers.max(1);

    let context = BatchContext {
        pipeline: AlignmentPipeline::new(reference.clone(), features, config.clone())?,
        queue: WorkQueue::new(reference, candidates),
        finished: Mutex::new(Vec::with_capacity(expected)),
    };

    run_workers(&context, workers);

    debug_assert_eq!(context.queue.len(), 1);
    let finished = context
        .finished
        .into_inner()
        .expect("finished lock poisoned");
    debug_assert_eq!(finished.len(), expected);

    let aligned = finished.iter().filter(|o| o.is_aligned()).count();
    log::info!(
        "Batch complete: {} aligned, {} rejected",
        aligned,
        finished.len() - aligned
    );
    Ok(finished)
}

fn run_workers(context: &BatchContext, workers: usize) {
    std::thread::scope(|scope| {
        for id in 0..workers {
            scope.spawn(move || {
                while let Some(candidate) = context.queue.claim() {
                    log::debug!("worker {} claimed {}", id, candidate.filename);
                    let outcome = context.pipeline.align(candidate);
                    context
                        .finished
                        .lock()
                        .expect("finished lock poisoned")
                        .push(outcome);
                }
            });
        }
    });
}
