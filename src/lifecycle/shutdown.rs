//! Shutdown coordination.

use std::future::Future;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Fan-out of a single "stop now" event.
///
/// Cloning shares the channel; every receiver from [`Shutdown::subscribe`]
/// wakes once on [`Shutdown::trigger`].
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Wake every subscriber. A no-op when nobody listens.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Trigger in the background once `signal` resolves.
    pub fn trigger_on<F>(&self, signal: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let shutdown = self.clone();
        tokio::spawn(async move {
            signal.await;
            tracing::info!(listeners = shutdown.receiver_count(), "Shutting down");
            shutdown.trigger();
        })
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_wakes_all_subscribers() {
        let shutdown = Shutdown::new();
        let mut first = shutdown.subscribe();
        let mut second = shutdown.clone().subscribe();
        assert_eq!(shutdown.receiver_count(), 2);

        shutdown.trigger();
        assert!(first.recv().await.is_ok());
        assert!(second.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_trigger_on_signal() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        let (fire, fired) = tokio::sync::oneshot::channel::<()>();

        let handle = shutdown.trigger_on(async move {
            let _ = fired.await;
        });
        assert!(rx.try_recv().is_err());

        fire.send(()).unwrap();
        handle.await.unwrap();
        assert!(rx.recv().await.is_ok());
    }

    #[test]
    fn test_trigger_without_subscribers() {
        Shutdown::default().trigger();
    }
}
