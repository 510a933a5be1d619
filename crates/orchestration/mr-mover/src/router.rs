//! Work router for distributing keys to the worker pool.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tokio::sync::{Mutex, mpsc};
use tracing::debug;

/// Hands work items to whichever worker is free, via one bounded queue.
///
/// Every worker pulls from the same [`WorkReceiver`], so a slow item only
/// occupies the worker holding it. A full queue makes
/// [`route`](Self::route) wait, which stalls listing until some worker is
/// free.
pub struct WorkRouter<T> {
    sender: RwLock<Option<mpsc::Sender<T>>>,
    shutdown: AtomicBool,
}

/// Shared receiving end of a [`WorkRouter`]; clone one per worker.
pub struct WorkReceiver<T> {
    rx: Arc<Mutex<mpsc::Receiver<T>>>,
}

impl<T> Clone for WorkReceiver<T> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
        }
    }
}

impl<T> WorkReceiver<T> {
    /// Take the next queued item.
    ///
    /// Returns `None` once the router is shut down and the queue is empty.
    pub async fn recv(&self) -> Option<T> {
        self.rx.lock().await.recv().await
    }
}

impl<T: Send> WorkRouter<T> {
    /// Create a router whose queue holds up to `buffer_size` items.
    pub fn new(buffer_size: usize) -> (Self, WorkReceiver<T>) {
        let (tx, rx) = mpsc::channel(buffer_size.max(1));

        let router = Self {
            sender: RwLock::new(Some(tx)),
            shutdown: AtomicBool::new(false),
        };
        let receiver = WorkReceiver {
            rx: Arc::new(Mutex::new(rx)),
        };

        (router, receiver)
    }

    /// Queue an item for the next free worker.
    ///
    /// Returns the item back if the router is shut down or every receiver
    /// has been dropped.
    pub async fn route(&self, item: T) -> Result<(), T> {
        if self.shutdown.load(Ordering::Relaxed) {
            return Err(item);
        }

        let sender = match self.sender.read().as_ref() {
            Some(sender) => sender.clone(),
            None => return Err(item),
        };

        sender.send(item).await.map_err(|e| e.0)
    }

    /// Stop accepting items and close the queue.
    ///
    /// Workers still receive anything already queued, then see the end.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        self.sender.write().take();
        debug!("Work router shutdown signaled");
    }

    /// Check if the router is shut down.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_router_creation() {
        let (router, _receiver) = WorkRouter::<String>::new(10);
        assert!(!router.is_shutdown());
    }

    #[tokio::test]
    async fn test_items_arrive_in_order() {
        let (router, receiver) = WorkRouter::new(10);

        for i in 0..3 {
            router.route(format!("key-{i}")).await.unwrap();
        }

        assert_eq!(receiver.recv().await, Some("key-0".to_string()));
        assert_eq!(receiver.recv().await, Some("key-1".to_string()));
        assert_eq!(receiver.clone().recv().await, Some("key-2".to_string()));
    }

    #[tokio::test]
    async fn test_busy_worker_does_not_block_others() {
        let (router, receiver) = WorkRouter::new(1);

        // One worker takes an item and never asks for another.
        let busy = receiver.clone();
        assert!(router.route(0u32).await.is_ok());
        assert_eq!(busy.recv().await, Some(0));

        // A second worker keeps draining while the first is occupied.
        let idle = receiver.clone();
        let consumer = tokio::spawn(async move {
            let mut seen = Vec::new();
            while let Some(item) = idle.recv().await {
                seen.push(item);
            }
            seen
        });

        let routed = tokio::time::timeout(Duration::from_secs(5), async {
            for i in 1..=5u32 {
                router.route(i).await.unwrap();
            }
        })
        .await;
        assert!(routed.is_ok(), "routing stalled behind a busy worker");

        router.shutdown();
        assert_eq!(consumer.await.unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_router_shutdown_rejects_and_closes() {
        let (router, receiver) = WorkRouter::new(10);

        router.route("before".to_string()).await.unwrap();
        router.shutdown();

        assert!(router.is_shutdown());
        assert_eq!(
            router.route("after".to_string()).await,
            Err("after".to_string())
        );

        // Queued items drain, then every receiver reports closed.
        assert_eq!(receiver.recv().await, Some("before".to_string()));
        assert_eq!(receiver.recv().await, None);
        assert_eq!(receiver.clone().recv().await, None);
    }

    #[tokio::test]
    async fn test_closed_receiver_returns_item() {
        let (router, receiver) = WorkRouter::new(1);
        drop(receiver);

        assert_eq!(router.route(7u32).await, Err(7));
    }
}
