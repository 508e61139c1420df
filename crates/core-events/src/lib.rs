//! Core event types and channel helpers for the console loop.

use std::sync::atomic::AtomicU64;
use tokio::sync::mpsc::{self, Receiver, Sender};

// -------------------------------------------------------------------------------------------------
// Channel Policy
// -------------------------------------------------------------------------------------------------
// One producer (the input service) and one consumer (the console loop) share a bounded channel.
// The producer awaits capacity; events are never dropped.
// -------------------------------------------------------------------------------------------------
pub const EVENT_CHANNEL_CAP: usize = 1024;

// Relaxed counters; inspected by tests and logged at shutdown.
pub static CHANNEL_SEND_FAILURES: AtomicU64 = AtomicU64::new(0);
pub static INPUT_CHUNKS: AtomicU64 = AtomicU64::new(0);
pub static PASTE_CHUNKS: AtomicU64 = AtomicU64::new(0);

/// Top-level event consumed by the console loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// One atomic raw input chunk: a keystroke, an escape sequence or pasted text.
    Input(String),
    Shutdown,
}

impl Event {
    pub fn input(chunk: impl Into<String>) -> Self {
        Event::Input(chunk.into())
    }
}

/// Bounded channel sized by [`EVENT_CHANNEL_CAP`].
pub fn event_channel() -> (Sender<Event>, Receiver<Event>) {
    mpsc::channel(EVENT_CHANNEL_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_delivers_in_order() {
        let (tx, mut rx) = event_channel();
        tx.send(Event::input("a")).await.unwrap();
        tx.send(Event::input("\u{1b}[A")).await.unwrap();
        tx.send(Event::Shutdown).await.unwrap();
        drop(tx);
        assert_eq!(rx.recv().await, Some(Event::Input("a".into())));
        assert_eq!(rx.recv().await, Some(Event::Input("\u{1b}[A".into())));
        assert_eq!(rx.recv().await, Some(Event::Shutdown));
        assert_eq!(rx.recv().await, None);
    }
}
