//! Progress Bus (§4.9): a callback sink the executor drives during a run,
//! generalized from the pipeline's Tauri `AppHandle::emit` usage into a plain
//! trait object so the engine has no GUI dependency.

use crate::model::OperationProgressEvent;
use std::sync::Arc;

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: OperationProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(OperationProgressEvent) + Send + Sync,
{
    fn emit(&self, event: OperationProgressEvent) {
        self(event)
    }
}

/// A sink that drops every event; used when a caller previews a plan without
/// wanting progress callbacks.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: OperationProgressEvent) {}
}

pub type SharedProgressSink = Arc<dyn ProgressSink>;

pub fn null_sink() -> SharedProgressSink {
    Arc::new(NullSink)
}
