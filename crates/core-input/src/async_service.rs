use crate::key_token::encode_key_event;
use crate::log_paste_chunk;
use core_events::{CHANNEL_SEND_FAILURES, Event, INPUT_CHUNKS, PASTE_CHUNKS};
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste, Event as CEvent, EventStream};
use crossterm::execute;
use std::io;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::sync::{Notify, mpsc::Sender};
use tokio::task;
use tokio_stream::StreamExt;
use tracing::{Instrument, debug, info, trace, warn};

#[derive(Clone, Debug)]
pub struct AsyncInputShutdown {
    notify: Arc<Notify>,
}

impl AsyncInputShutdown {
    pub fn signal(&self) {
        self.notify.notify_one();
    }
}

#[derive(Clone, Debug)]
struct ShutdownListener {
    notify: Arc<Notify>,
}

impl ShutdownListener {
    fn new_pair() -> (AsyncInputShutdown, Self) {
        let notify = Arc::new(Notify::new());
        (
            AsyncInputShutdown {
                notify: notify.clone(),
            },
            ShutdownListener { notify },
        )
    }

    async fn wait(&self) {
        self.notify.notified().await;
    }
}

/// Spawn a Tokio task that turns `EventStream` events into raw input chunks.
pub(crate) fn spawn_async_event_task(
    sender: Sender<Event>,
) -> (task::JoinHandle<()>, AsyncInputShutdown) {
    let (shutdown, listener) = ShutdownListener::new_pair();
    let span = tracing::debug_span!(target: "input.thread", "input_async_task");
    let handle = task::spawn(
        async move {
            if let Err(e) = execute!(io::stdout(), EnableBracketedPaste) {
                debug!(target: "input.paste", ?e, "enable_failed");
            }

            let stream = EventStream::new();
            AsyncEventStreamTask::new(sender, stream, listener)
                .run()
                .await;

            if let Err(e) = execute!(io::stdout(), DisableBracketedPaste) {
                debug!(target: "input.paste", ?e, "disable_failed");
            }
        }
        .instrument(span),
    );

    (handle, shutdown)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExitReason {
    ShutdownSignal,
    ChannelClosed,
    StreamEnded,
    StreamError,
}

impl ExitReason {
    fn as_str(&self) -> &'static str {
        match self {
            ExitReason::ShutdownSignal => "shutdown_signal",
            ExitReason::ChannelClosed => "channel_closed",
            ExitReason::StreamEnded => "stream_ended",
            ExitReason::StreamError => "stream_error",
        }
    }
}

pub(crate) struct AsyncEventStreamTask<S>
where
    S: tokio_stream::Stream<Item = io::Result<CEvent>> + Unpin,
{
    sender: Sender<Event>,
    stream: S,
    shutdown: ShutdownListener,
}

impl<S> AsyncEventStreamTask<S>
where
    S: tokio_stream::Stream<Item = io::Result<CEvent>> + Unpin,
{
    fn new(sender: Sender<Event>, stream: S, shutdown: ShutdownListener) -> Self {
        Self {
            sender,
            stream,
            shutdown,
        }
    }

    async fn run(mut self) {
        info!(target: "input.thread", "async_input_task_started");
        let reason = loop {
            let maybe_result = tokio::select! {
                biased;
                _ = self.shutdown.wait() => break ExitReason::ShutdownSignal,
                result = self.stream.next() => result,
            };

            let Some(result) = maybe_result else {
                break ExitReason::StreamEnded;
            };

            let chunk = match result {
                Ok(CEvent::Key(key)) => encode_key_event(&key),
                Ok(CEvent::Paste(data)) => {
                    log_paste_chunk(&data);
                    PASTE_CHUNKS.fetch_add(1, Ordering::Relaxed);
                    Some(data)
                }
                Ok(other) => {
                    trace!(target: "input.event", ?other, "ignored");
                    None
                }
                Err(err) => {
                    warn!(target: "input.thread", error_kind = ?err.kind(), "async_input_task_stream_error");
                    break ExitReason::StreamError;
                }
            };

            if let Some(chunk) = chunk
                && !self.send(chunk).await
            {
                break ExitReason::ChannelClosed;
            }
        };
        info!(target: "input.thread", reason = reason.as_str(), "async_input_task_stopped");
    }

    async fn send(&mut self, chunk: String) -> bool {
        trace!(target: "input.event", len = chunk.len(), "chunk");
        match self.sender.send(Event::Input(chunk)).await {
            Ok(()) => {
                INPUT_CHUNKS.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(_) => {
                CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use tokio::sync::mpsc;

    fn key(code: KeyCode, mods: KeyModifiers) -> io::Result<CEvent> {
        Ok(CEvent::Key(KeyEvent::new(code, mods)))
    }

    async fn drain(events: Vec<io::Result<CEvent>>) -> Vec<Event> {
        let (tx, mut rx) = mpsc::channel(16);
        let (_shutdown, listener) = ShutdownListener::new_pair();
        let stream = tokio_stream::iter(events);
        AsyncEventStreamTask::new(tx, stream, listener).run().await;
        let mut out = Vec::new();
        while let Some(ev) = rx.recv().await {
            out.push(ev);
        }
        out
    }

    #[tokio::test]
    async fn keys_and_pastes_become_chunks() {
        let out = drain(vec![
            key(KeyCode::Char('l'), KeyModifiers::NONE),
            key(KeyCode::Up, KeyModifiers::NONE),
            Ok(CEvent::Paste("src/main.rs".into())),
            Ok(CEvent::Resize(80, 24)),
            key(KeyCode::Enter, KeyModifiers::NONE),
        ])
        .await;
        assert_eq!(
            out,
            vec![
                Event::input("l"),
                Event::input("\u{1b}[A"),
                Event::input("src/main.rs"),
                Event::input("\r"),
            ]
        );
    }

    #[tokio::test]
    async fn stream_error_stops_task() {
        let out = drain(vec![
            key(KeyCode::Char('a'), KeyModifiers::NONE),
            Err(io::Error::other("tty gone")),
            key(KeyCode::Char('b'), KeyModifiers::NONE),
        ])
        .await;
        assert_eq!(out, vec![Event::input("a")]);
    }

    #[tokio::test]
    async fn closed_channel_stops_task() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let (_shutdown, listener) = ShutdownListener::new_pair();
        let stream = tokio_stream::iter(vec![key(KeyCode::Char('a'), KeyModifiers::NONE)]);
        AsyncEventStreamTask::new(tx, stream, listener).run().await;
        assert!(CHANNEL_SEND_FAILURES.load(Ordering::Relaxed) >= 1);
    }
}
