//! Single shared slot holding the loaded context
//!
//! The background load writes once; every reader sees the latest value at the
//! moment it looks.

use std::sync::Arc;

use tokio::sync::watch;

use super::UserContext;

/// Write side, owned by the background load
#[derive(Debug)]
pub struct ContextSlot {
    tx: watch::Sender<Option<Arc<UserContext>>>,
}

/// Read side, handed to generators
#[derive(Debug, Clone)]
pub struct ContextHandle {
    rx: watch::Receiver<Option<Arc<UserContext>>>,
}

/// Create a connected slot and handle, initially empty
#[must_use]
pub fn context_slot() -> (ContextSlot, ContextHandle) {
    let (tx, rx) = watch::channel(None);
    (ContextSlot { tx }, ContextHandle { rx })
}

impl ContextSlot {
    /// Publish a loaded context, replacing any previous one
    pub fn fill(&self, context: UserContext) {
        self.tx.send_replace(Some(Arc::new(context)));
    }
}

impl ContextHandle {
    /// A handle that never receives a context
    #[must_use]
    pub fn detached() -> Self {
        context_slot().1
    }

    /// A handle already holding `context`
    #[must_use]
    pub fn ready(context: UserContext) -> Self {
        let (slot, handle) = context_slot();
        slot.fill(context);
        handle
    }

    /// The context as of now, if it has been loaded
    #[must_use]
    pub fn latest(&self) -> Option<Arc<UserContext>> {
        self.rx.borrow().clone()
    }

    /// Wait until a context has been loaded
    ///
    /// Returns `None` if the load was abandoned before publishing.
    pub async fn loaded(&self) -> Option<Arc<UserContext>> {
        let mut rx = self.rx.clone();
        rx.wait_for(Option::is_some)
            .await
            .ok()
            .and_then(|value| value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handle_sees_fill() {
        let (slot, handle) = context_slot();
        assert!(handle.latest().is_none());

        slot.fill(UserContext::default());
        assert!(handle.latest().is_some());
        assert!(handle.loaded().await.is_some());
    }

    #[tokio::test]
    async fn test_detached_handle_resolves_to_none() {
        let handle = ContextHandle::detached();
        assert!(handle.latest().is_none());
        assert!(handle.loaded().await.is_none());
    }

    #[test]
    fn test_ready_handle() {
        let handle = ContextHandle::ready(UserContext::default());
        assert!(handle.latest().is_some_and(|c| c.is_empty()));
    }
}
