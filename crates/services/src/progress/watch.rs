use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;

use super::store::ProgressStore;
use crate::identity::IdentityContext;

/// Keeps a `ProgressStore` following an `IdentityContext`.
///
/// Dropping the handle stops following. A load already in flight may still land,
/// but only if the store has not switched user since.
pub struct IdentityWatch {
    task: JoinHandle<()>,
}

impl IdentityWatch {
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for IdentityWatch {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl ProgressStore {
    /// Reload whenever the signed-in user changes, starting with the current one.
    ///
    /// Each change aborts the previous load and bumps the store generation, so a
    /// slow response for an earlier user can never overwrite the current set.
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn watch_identity(self: &Arc<Self>, identity: &IdentityContext) -> IdentityWatch {
        let store = Arc::clone(self);
        let mut changes = identity.subscribe();
        let task = tokio::spawn(async move {
            let mut in_flight: Option<JoinHandle<()>> = None;
            loop {
                let user = changes.borrow_and_update().clone();
                if let Some(previous) = in_flight.take() {
                    previous.abort();
                }
                debug!(signed_in = user.is_some(), "reloading progress for identity");
                store.switch_user(user);
                let loader = Arc::clone(&store);
                in_flight = Some(tokio::spawn(async move { loader.load().await }));

                if changes.changed().await.is_err() {
                    break;
                }
            }
        });
        IdentityWatch { task }
    }
}
