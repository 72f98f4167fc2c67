use std::sync::Arc;

use learnflow_core::model::UserId;
use tokio::sync::watch;
use tracing::info;

/// Process-wide "current user" signal.
///
/// Holds `None` while signed out. Subscribers are notified only when the value
/// actually changes, so re-announcing the same user is free.
#[derive(Clone)]
pub struct IdentityContext {
    current: Arc<watch::Sender<Option<UserId>>>,
}

impl Default for IdentityContext {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityContext {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            current: Arc::new(tx),
        }
    }

    pub fn sign_in(&self, user: UserId) {
        self.replace(Some(user));
    }

    pub fn sign_out(&self) {
        self.replace(None);
    }

    /// Restore a persisted session at startup, or `None` when there is none.
    pub fn restore(&self, user: Option<UserId>) {
        self.replace(user);
    }

    #[must_use]
    pub fn current(&self) -> Option<UserId> {
        self.current.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<UserId>> {
        self.current.subscribe()
    }

    fn replace(&self, next: Option<UserId>) {
        self.current.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            match &next {
                Some(user) => info!(user = %user, "identity changed"),
                None => info!("signed out"),
            }
            *current = next;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn notifies_only_on_change() {
        let identity = IdentityContext::new();
        let mut rx = identity.subscribe();
        assert!(identity.current().is_none());

        let user = UserId::new("u1").unwrap();
        identity.sign_in(user.clone());
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().clone(), Some(user.clone()));

        identity.sign_in(user);
        assert!(!rx.has_changed().unwrap());

        identity.sign_out();
        assert!(rx.has_changed().unwrap());
        assert!(identity.current().is_none());
    }

    #[test]
    fn restore_sets_value_without_subscribers() {
        let identity = IdentityContext::new();
        identity.restore(Some(UserId::new("u2").unwrap()));
        assert_eq!(identity.current().unwrap().as_str(), "u2");
    }
}
