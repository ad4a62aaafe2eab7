//! Typed event fan-out.
//!
//! Each component owns one [`EventPublisher`] over its own closed event
//! enum. Subscribers receive a `crossbeam_channel::Receiver`; a dropped
//! receiver is pruned on the next publish.

use crossbeam_channel::{Receiver, Sender, unbounded};

/// Broadcasts cloned events to every live subscriber.
#[derive(Debug)]
pub struct EventPublisher<T> {
    subscribers: Vec<Sender<T>>,
}

impl<T> Default for EventPublisher<T> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }
}

impl<T: Clone> EventPublisher<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber.
    pub fn subscribe(&mut self) -> Receiver<T> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Deliver `event` to all subscribers, dropping disconnected ones.
    pub fn publish(&mut self, event: T) {
        if self.subscribers.is_empty() {
            return;
        }
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
