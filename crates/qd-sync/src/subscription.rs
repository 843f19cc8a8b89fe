//! Disposers for background feeds.

use tokio::task::JoinHandle;
use tracing::debug;

/// Owns a running feed task. Disposing, or dropping, stops the task.
#[derive(Debug)]
pub struct Disposer {
    label: String,
    handle: Option<JoinHandle<()>>,
}

impl Disposer {
    pub(crate) fn new(label: impl Into<String>, handle: JoinHandle<()>) -> Self {
        Self {
            label: label.into(),
            handle: Some(handle),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn dispose(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!(feed = %self.label, "disposed");
        }
    }
}

impl Drop for Disposer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dispose_stops_the_task() {
        let (tx, mut rx) = tokio::sync::mpsc::channel::<()>(1);
        let handle = tokio::spawn(async move {
            let _tx = tx;
            std::future::pending::<()>().await;
        });
        let disposer = Disposer::new("test", handle);
        assert!(disposer.is_active());
        disposer.dispose();
        // The sender is dropped with the aborted task.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn drop_stops_the_task() {
        let (tx, mut rx) = tokio::sync::mpsc::channel::<()>(1);
        let handle = tokio::spawn(async move {
            let _tx = tx;
            std::future::pending::<()>().await;
        });
        drop(Disposer::new("test", handle));
        assert!(rx.recv().await.is_none());
    }
}
