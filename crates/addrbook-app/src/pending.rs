//! Handles for repository calls that have been issued but not awaited.

use std::future::Future;

use addrbook_store::StoreError;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::ControllerError;

/// A repository call running in the background.
///
/// The controller has already moved on by the time this exists. Awaiting
/// [`wait`](Self::wait) surfaces the outcome; dropping the handle lets the call
/// finish unobserved, its result still landing in the cache.
#[must_use = "dropping a Pending discards the call's error"]
pub struct Pending<T> {
    handle: JoinHandle<Result<T, StoreError>>,
}

impl<T: Send + 'static> Pending<T> {
    pub(crate) fn spawn<F>(runtime: &Handle, call: F) -> Self
    where
        F: Future<Output = Result<T, StoreError>> + Send + 'static,
    {
        Self {
            handle: runtime.spawn(call),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn wait(self) -> Result<T, ControllerError> {
        match self.handle.await {
            Ok(result) => Ok(result?),
            Err(e) => Err(ControllerError::TaskFailed(e.to_string())),
        }
    }
}
