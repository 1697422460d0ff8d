//! Synchronous fan-out to registered observers.
//!
//! Observers run in registration order on the caller's stack. A slow
//! observer slows down whoever emitted.

use crate::Transaction;

/// Handle returned by [`Broadcaster::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<T> = Box<dyn FnMut(&T) + Send>;

pub struct Broadcaster<T> {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Callback<T>)>,
}

impl<T> Broadcaster<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&T) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns false if `id` was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(subscriber, _)| *subscriber != id);
        self.subscribers.len() != before
    }

    pub fn emit(&mut self, value: &T) {
        for (_, callback) in &mut self.subscribers {
            callback(value);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl<T> Default for Broadcaster<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Broadcaster<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// A transaction as it went out on the transaction stream
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedTransaction {
    pub transaction: Transaction,

    /// Originated from another collaborator rather than this editor
    pub is_remote: bool,
}
