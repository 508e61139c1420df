//! Async input service: raw keystrokes from the terminal as console input chunks.
//!
//! Each crossterm key event is re-encoded to the char sequence a VT terminal
//! sends in raw mode, and each bracketed paste becomes one chunk, so the
//! console sees exactly one `Event::Input` per keystroke or escape sequence.

mod async_service;
mod key_token;
pub use async_service::AsyncInputShutdown;

use async_service::spawn_async_event_task;
use core_events::Event;
use tokio::task::JoinHandle;

#[inline]
pub(crate) fn log_paste_chunk(chunk: &str) {
    tracing::trace!(target: "input.paste", chunk_len = chunk.len(), "paste_chunk");
}

/// Spawn the async input service backed by `crossterm::EventStream`.
///
/// Returns the `JoinHandle` for the background task alongside a shutdown handle
/// that can be used to request immediate termination. Raw mode must already
/// be enabled by the caller.
pub fn spawn_async_input(sender: tokio::sync::mpsc::Sender<Event>) -> (JoinHandle<()>, AsyncInputShutdown) {
    spawn_async_event_task(sender)
}
