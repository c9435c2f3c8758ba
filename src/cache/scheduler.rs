//! Low-priority deferred task scheduling.
//!
//! Background work is pushed behind a short idle delay and a cooperative
//! yield so it never runs ahead of foreground requests already queued on
//! the runtime, while a ceiling keeps it from being starved.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Default delay before a deferred task runs.
pub const DEFAULT_IDLE_DELAY: Duration = Duration::from_millis(100);

/// Default ceiling on how long a deferred task may wait.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(2000);

/// Spawns fire-and-forget tasks at low priority and tracks how many are pending.
#[derive(Clone)]
pub struct IdleScheduler {
  idle_delay: Duration,
  pending: Arc<watch::Sender<usize>>,
}

impl IdleScheduler {
  pub fn new(idle_delay: Duration) -> Self {
    let (pending, _) = watch::channel(0);
    Self {
      idle_delay,
      pending: Arc::new(pending),
    }
  }

  /// Run `task` once the runtime has had a chance to go idle, but no later
  /// than `max_delay`.
  ///
  /// Must be called from within a tokio runtime.
  pub fn schedule<F>(&self, task: F, max_delay: Duration)
  where
    F: Future<Output = ()> + Send + 'static,
  {
    let delay = self.idle_delay.min(max_delay);
    let guard = PendingGuard::new(Arc::clone(&self.pending));

    tokio::spawn(async move {
      let _guard = guard;
      if !delay.is_zero() {
        tokio::time::sleep(delay).await;
      }
      tokio::task::yield_now().await;
      task.await;
    });
  }

  /// Number of scheduled tasks that have not finished yet.
  pub fn pending(&self) -> usize {
    *self.pending.borrow()
  }

  /// Wait until every scheduled task has finished.
  pub async fn settled(&self) {
    let mut rx = self.pending.subscribe();
    // The sender lives as long as self, so this cannot fail
    let _ = rx.wait_for(|pending| *pending == 0).await;
  }
}

impl Default for IdleScheduler {
  fn default() -> Self {
    Self::new(DEFAULT_IDLE_DELAY)
  }
}

/// Counts a task as pending until dropped, including on panic.
struct PendingGuard(Arc<watch::Sender<usize>>);

impl PendingGuard {
  fn new(pending: Arc<watch::Sender<usize>>) -> Self {
    pending.send_modify(|n| *n += 1);
    Self(pending)
  }
}

impl Drop for PendingGuard {
  fn drop(&mut self) {
    self.0.send_modify(|n| *n = n.saturating_sub(1));
  }
}
