//! Background task tracking
//!
//! Every accepted rebuild runs as a tracked task. Shutdown waits on
//! [`TaskTracker::wait_for_all`] so no rebuild is cut off halfway. At most
//! `max_concurrent` tracked tasks do work at a time; the rest wait for a permit.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Semaphore, watch};
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Clone)]
pub struct TaskTracker {
    inner: Arc<Inner>,
}

struct Inner {
    in_flight: watch::Sender<usize>,
    permits: Arc<Semaphore>,
}

/// Keeps a task counted as in flight until dropped
pub struct TaskGuard {
    tracker: TaskTracker,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.tracker.untrack();
    }
}

impl TaskTracker {
    /// Creates a tracker allowing `max_concurrent` tasks to run at once
    pub fn new(max_concurrent: usize) -> Self {
        let (in_flight, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                in_flight,
                permits: Arc::new(Semaphore::new(max_concurrent)),
            }),
        }
    }

    /// Counts one more task as in flight
    pub fn track(&self) -> TaskGuard {
        self.inner.in_flight.send_modify(|n| *n += 1);
        TaskGuard {
            tracker: self.clone(),
        }
    }

    fn untrack(&self) {
        self.inner.in_flight.send_modify(|n| *n = n.saturating_sub(1));
    }

    /// Number of tracked tasks that have not finished yet
    pub fn in_flight(&self) -> usize {
        *self.inner.in_flight.borrow()
    }

    /// Resolves once no tracked task is left
    pub async fn wait_for_all(&self) {
        let mut receiver = self.inner.in_flight.subscribe();
        // The sender lives as long as the tracker, so this cannot fail
        let _ = receiver.wait_for(|n| *n == 0).await;
    }

    /// Spawns a tracked task; it starts working once a permit is free
    pub fn spawn<F>(&self, task: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let guard = self.track();
        let permits = Arc::clone(&self.inner.permits);

        tokio::spawn(async move {
            let _guard = guard;
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            task.await;
            // Permit and guard are released when dropped
        })
    }

    /// Logs and waits for every tracked task
    pub async fn drain(&self) {
        let pending = self.in_flight();
        if pending > 0 {
            debug!("Waiting for {} background task(s)", pending);
        }
        self.wait_for_all().await;
    }
}
