//! Debounced sealing of the open undo item.
//!
//! Every undo-recording apply rearms the timer. Once it has been quiet for
//! the configured delay the newest undo item is sealed, so a burst of small
//! edits becomes one undo step. Rearming cancels the previous countdown; at
//! most one is live at a time.
//!
//! The countdown task only holds a weak reference to the history, and the
//! timer aborts it when dropped, so a torn-down editor is never touched.

use crate::undo_manager::{lock, UndoManager};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug)]
pub struct SealTimer {
    delay: Duration,
    enabled: bool,
    handle: Option<JoinHandle<()>>,
}

impl SealTimer {
    pub fn new(delay: Duration, enabled: bool) -> Self {
        Self {
            delay,
            enabled,
            handle: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling cancels any pending countdown. The caller decides what to
    /// do with an item that is still open.
    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.cancel();
        }
        self.enabled = enabled;
    }

    /// True while a countdown is pending
    pub fn is_armed(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Restart the countdown for `manager`'s open item.
    ///
    /// Seals right away when the timer is disabled or there is no tokio
    /// runtime to run the countdown on.
    pub fn rearm(&mut self, manager: &Arc<Mutex<UndoManager>>) {
        self.cancel();

        if !self.enabled {
            lock(manager).seal_undo();
            return;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                tracing::warn!("no tokio runtime for the seal timer, sealing immediately");
                lock(manager).seal_undo();
                return;
            }
        };

        let history = Arc::downgrade(manager);
        let delay = self.delay;
        self.handle = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(history) = history.upgrade() {
                lock(&history).seal_undo();
            }
        }));
    }

    /// Stop a pending countdown. A no-op when nothing is armed.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for SealTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
