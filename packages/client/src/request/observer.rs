//! Caller-side observers
//!
//! Observers only ever run inside the handle's own calls
//! (`dispatch_pending`, `wait`, `get`, `cancel`), never on the worker.

use crate::error::Error;

/// Receives the terminal notification of a request.
///
/// Exactly one of the methods is called per execution.
pub trait SoapObserver<T, F>: Send + Sync {
    fn on_completion(&self, result: &T) {
        let _ = result;
    }

    fn on_fault(&self, fault: &F) {
        let _ = fault;
    }

    fn on_error(&self, error: &Error) {
        let _ = error;
    }

    fn on_cancelled(&self) {}
}
