//! The Executor (§4.7): runs a plan's `Ready` items across a rayon thread
//! pool sized at `available_parallelism() - 2` (floor 1) — the teacher's own
//! worker-pool formula, kept unchanged here — polling the cancellation flag
//! between dispatches and catching panics so one bad file never aborts a run.

use crate::model::{ExecDetail, ExecResult, ExecStatus, ItemStatus, OperationProgressEvent, PlanItem};
use crate::progress::SharedProgressSink;
use crate::state::EngineState;
use rayon::ThreadPoolBuilder;
use std::sync::atomic::Ordering;
use std::sync::Mutex;

fn worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(2)
        .max(1)
}

/// Execute every `Ready` item in `items` by calling `op` for each, recording
/// successes/failures/skips into an `ExecResult` and emitting progress events
/// through `progress`. Already-`Skipped` plan items are recorded as skipped
/// without invoking `op`. Once cancellation is requested, every item not yet
/// started is still recorded — as `skipped`/`"canceled"` — so `details`
/// always carries one row per input.
pub fn execute<Extra, F>(
    operation: &'static str,
    items: Vec<PlanItem<Extra>>,
    state: &EngineState,
    progress: &SharedProgressSink,
    op: F,
) -> ExecResult
where
    Extra: Send + Sync,
    F: Fn(&PlanItem<Extra>) -> Result<(), String> + Send + Sync,
{
    let total = items.len();
    let result = Mutex::new(ExecResult::default());
    let cancel_flag = state.cancel_handle();

    let pool = ThreadPoolBuilder::new()
        .num_threads(worker_count())
        .build()
        .expect("failed to build worker pool");

    pool.install(|| {
        use rayon::prelude::*;
        items.par_iter().for_each(|item| {
            let detail = if cancel_flag.load(Ordering::SeqCst) {
                ExecDetail {
                    source: item.source.clone(),
                    destination: None,
                    status: ExecStatus::Skipped,
                    reason: Some("canceled".to_string()),
                }
            } else {
                build_detail(item, &op)
            };

            let mut guard = result.lock().unwrap();
            guard.record(detail);
            progress.emit(OperationProgressEvent {
                operation,
                processed: guard.processed,
                total,
                succeeded: guard.succeeded,
                failed: guard.failed,
                skipped: guard.skipped,
                current_path: Some(item.source.clone()),
                done: guard.processed == total,
                canceled: false,
            });
        });
    });

    let mut final_result = result.into_inner().unwrap();
    final_result.canceled = cancel_flag.load(Ordering::SeqCst);
    progress.emit(OperationProgressEvent {
        operation,
        processed: final_result.processed,
        total,
        succeeded: final_result.succeeded,
        failed: final_result.failed,
        skipped: final_result.skipped,
        current_path: None,
        done: true,
        canceled: final_result.canceled,
    });
    final_result
}

fn build_detail<Extra, F>(item: &PlanItem<Extra>, op: &F) -> ExecDetail
where
    F: Fn(&PlanItem<Extra>) -> Result<(), String> + Send + Sync,
{
    match item.status {
        ItemStatus::Skipped => ExecDetail {
            source: item.source.clone(),
            destination: None,
            status: ExecStatus::Skipped,
            reason: item.reason.clone(),
        },
        ItemStatus::Ready => {
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| op(item)));
            match outcome {
                Ok(Ok(())) => ExecDetail {
                    source: item.source.clone(),
                    destination: item.destination.clone(),
                    status: ExecStatus::Succeeded,
                    reason: None,
                },
                Ok(Err(reason)) => ExecDetail {
                    source: item.source.clone(),
                    destination: item.destination.clone(),
                    status: ExecStatus::Failed,
                    reason: Some(reason),
                },
                Err(_) => {
                    tracing::error!("worker panicked processing {:?}", item.source);
                    ExecDetail {
                        source: item.source.clone(),
                        destination: item.destination.clone(),
                        status: ExecStatus::Failed,
                        reason: Some("internal panic while processing item".to_string()),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PlanItem;
    use crate::progress::null_sink;
    use std::path::PathBuf;

    #[test]
    fn test_execute_records_success_and_failure() {
        let items = vec![
            PlanItem::ready(PathBuf::from("a"), Some(PathBuf::from("a.out")), ()),
            PlanItem::ready(PathBuf::from("b"), Some(PathBuf::from("b.out")), ()),
        ];
        let state = EngineState::new();
        let sink = null_sink();
        let result = execute("test", items, &state, &sink, |item| {
            if item.source == PathBuf::from("b") {
                Err("boom".to_string())
            } else {
                Ok(())
            }
        });
        assert_eq!(result.succeeded, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.processed, 2);
    }

    #[test]
    fn test_execute_records_already_skipped_items() {
        let items = vec![PlanItem::<()>::skipped(PathBuf::from("a"), "no-op", ())];
        let state = EngineState::new();
        let sink = null_sink();
        let result = execute("test", items, &state, &sink, |_| Ok(()));
        assert_eq!(result.skipped, 1);
        assert_eq!(result.processed, 1);
    }

    #[test]
    fn test_execute_honors_cancellation() {
        let items: Vec<_> = (0..50)
            .map(|i| PlanItem::ready(PathBuf::from(format!("f{i}")), Some(PathBuf::from(format!("f{i}.out"))), ()))
            .collect();
        let state = EngineState::new();
        state.cancel();
        let sink = null_sink();
        let result = execute("test", items, &state, &sink, |_| Ok(()));
        assert!(result.canceled);
        // every item is still recorded, just as a canceled skip, so `details`
        // always carries one row per input even when canceled up front.
        assert_eq!(result.processed, 50);
        assert_eq!(result.skipped, 50);
    }

    #[test]
    fn test_execute_cancellation_records_every_item_as_canceled() {
        let items: Vec<_> = (0..10)
            .map(|i| PlanItem::ready(PathBuf::from(format!("f{i}")), Some(PathBuf::from(format!("f{i}.out"))), ()))
            .collect();
        let state = EngineState::new();
        state.cancel();
        let sink = null_sink();
        let result = execute("test", items, &state, &sink, |_| Ok(()));
        assert_eq!(result.details.len(), 10);
        assert!(result
            .details
            .iter()
            .all(|d| d.status == ExecStatus::Skipped && d.reason.as_deref() == Some("canceled")));
    }
}
