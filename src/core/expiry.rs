//! Detached "remove this prompt after N seconds" timers.
//!
//! Timers run on a tokio runtime beside the request path and never touch the
//! ledger. Removal is best effort: a prompt that is already gone is not an
//! error worth surfacing.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::{runtime::Handle, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::storage::Result;

/// Transient prompt a chat boundary can take down again.
pub trait PromptSurface: Send + Sync {
    fn remove_prompt(&self, prompt_id: u64) -> Result<()>;
}

#[derive(Clone)]
pub struct ExpiryScheduler {
    runtime: Handle,
    surface: Arc<dyn PromptSurface>,
}

impl ExpiryScheduler {
    pub fn new(runtime: Handle, surface: Arc<dyn PromptSurface>) -> Self {
        Self { runtime, surface }
    }

    /// Removes `prompt_id` after `delay` unless the returned handle is
    /// cancelled first.
    pub fn schedule(&self, prompt_id: u64, delay: Duration) -> ExpiryHandle {
        let token = CancellationToken::new();
        let fired = Arc::new(AtomicBool::new(false));

        let task = {
            let token = token.clone();
            let fired = Arc::clone(&fired);
            let surface = Arc::clone(&self.surface);
            self.runtime.spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => {
                        debug!(prompt_id, "prompt expiry cancelled");
                        false
                    }
                    _ = tokio::time::sleep(delay) => {
                        fired.store(true, Ordering::SeqCst);
                        if let Err(err) = surface.remove_prompt(prompt_id) {
                            debug!(prompt_id, error = %err, "prompt already gone");
                        }
                        true
                    }
                }
            })
        };

        debug!(prompt_id, delay_secs = delay.as_secs(), "scheduled prompt expiry");
        ExpiryHandle {
            prompt_id,
            token,
            fired,
            task,
        }
    }
}

/// Dropping the handle leaves the timer running.
#[derive(Debug)]
pub struct ExpiryHandle {
    prompt_id: u64,
    token: CancellationToken,
    fired: Arc<AtomicBool>,
    task: JoinHandle<bool>,
}

impl ExpiryHandle {
    pub fn prompt_id(&self) -> u64 {
        self.prompt_id
    }

    /// Stops a pending expiry. Returns `false` when the timer already fired.
    pub fn cancel(&self) -> bool {
        self.token.cancel();
        !self.has_fired()
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Waits for the timer to settle; `true` when it fired.
    pub async fn settled(self) -> bool {
        self.task.await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LedgerError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSurface {
        removed: Mutex<Vec<u64>>,
        fail: bool,
    }

    impl PromptSurface for RecordingSurface {
        fn remove_prompt(&self, prompt_id: u64) -> Result<()> {
            self.removed.lock().unwrap().push(prompt_id);
            if self.fail {
                Err(LedgerError::InvalidSelection("message to delete not found".into()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fires_after_delay() {
        let surface = Arc::new(RecordingSurface::default());
        let scheduler = ExpiryScheduler::new(Handle::current(), surface.clone());
        let handle = scheduler.schedule(7, Duration::from_secs(30));
        assert!(!handle.has_fired());

        assert!(handle.settled().await);
        assert_eq!(*surface.removed.lock().unwrap(), vec![7]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_never_removes() {
        let surface = Arc::new(RecordingSurface::default());
        let scheduler = ExpiryScheduler::new(Handle::current(), surface.clone());
        let handle = scheduler.schedule(3, Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(handle.cancel());
        assert!(!handle.settled().await);
        assert!(surface.removed.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn removal_failures_are_swallowed() {
        let surface = Arc::new(RecordingSurface {
            fail: true,
            ..RecordingSurface::default()
        });
        let scheduler = ExpiryScheduler::new(Handle::current(), surface.clone());
        let handle = scheduler.schedule(1, Duration::from_secs(5));
        assert!(handle.settled().await);
        assert_eq!(surface.removed.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_firing_reports_false() {
        let scheduler = ExpiryScheduler::new(
            Handle::current(),
            Arc::new(RecordingSurface::default()),
        );
        let handle = scheduler.schedule(9, Duration::from_secs(1));
        tokio::time::sleep(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        assert!(handle.has_fired());
        assert!(!handle.cancel());
    }
}
