//! The console session: every piece of mutable state the actions touch.

use crate::completion::{DirectoryLister, FsLister};
use crate::{ActionTable, Binding, Builtin, Builtins, CommandRegistry, ConsoleError, default_bindings};
use core_config::{Config, OnError};
use core_events::Event;
use core_keymap::Resolution;
use core_render::Writer;
use core_state::LineBuffer;
use core_terminal::{OutputSink, SystemTerminator, TerminalBackend, TerminalGuard, Terminator};
use tokio::sync::mpsc::Receiver;
use tracing::{debug, info, warn};

pub struct Console {
    config: Config,
    display_name: String,
    buffer: LineBuffer,
    keys: ActionTable,
    builtins: Builtins,
    commands: CommandRegistry,
    out: Box<dyn OutputSink>,
    terminator: Box<dyn Terminator>,
    lister: Option<Box<dyn DirectoryLister>>,
    committed: Option<String>,
    shutdown: bool,
}

impl Console {
    /// Session with the default key table and built-ins, the system
    /// terminator and a lister rooted at the working directory.
    pub fn new(config: Config, sink: impl OutputSink + 'static) -> Self {
        let display_name = config.display_name();
        Self {
            config,
            display_name,
            buffer: LineBuffer::new(),
            keys: default_bindings(),
            builtins: Builtins::new(),
            commands: CommandRegistry::new(),
            out: Box::new(sink),
            terminator: Box::new(SystemTerminator::new()),
            lister: Some(Box::new(FsLister::default())),
            committed: None,
            shutdown: false,
        }
    }

    pub fn with_terminator(mut self, terminator: impl Terminator + 'static) -> Self {
        self.terminator = Box::new(terminator);
        self
    }

    pub fn with_lister(mut self, lister: impl DirectoryLister + 'static) -> Self {
        self.lister = Some(Box::new(lister));
        self
    }

    /// Disable tab completion.
    pub fn without_lister(mut self) -> Self {
        self.lister = None;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// `<name>: pid[<pid>]`, the prefix of every console message.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn keys(&self) -> &ActionTable {
        &self.keys
    }

    pub fn keys_mut(&mut self) -> &mut ActionTable {
        &mut self.keys
    }

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    pub fn builtins_mut(&mut self) -> &mut Builtins {
        &mut self.builtins
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut CommandRegistry {
        &mut self.commands
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut LineBuffer {
        &mut self.buffer
    }

    pub fn out(&mut self) -> &mut dyn OutputSink {
        &mut *self.out
    }

    pub fn terminator(&self) -> &dyn Terminator {
        &*self.terminator
    }

    pub fn lister(&self) -> Option<&dyn DirectoryLister> {
        self.lister.as_deref()
    }

    /// Stop `run` after the chunk currently being handled.
    pub fn request_shutdown(&mut self) {
        self.shutdown = true;
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown
    }

    /// Flush a frame onto the sink.
    pub fn draw(&mut self, frame: Writer) -> Result<(), ConsoleError> {
        frame.flush(&mut *self.out)?;
        Ok(())
    }

    /// Rewrite the prompt row from the buffer and place the cursor.
    pub fn redraw(&mut self) -> Result<(), ConsoleError> {
        let frame = core_render::redraw_line(&self.buffer.text(), self.buffer.cursor());
        self.draw(frame)
    }

    /// Print `info` below the prompt and redraw the buffer after it.
    pub fn show_info(&mut self, info: &str) -> Result<(), ConsoleError> {
        let frame = core_render::info_below(info, &self.buffer.text(), self.buffer.cursor());
        self.draw(frame)
    }

    /// Print `<display name>: <msg>` on its own row.
    pub fn message(&mut self, msg: &str) -> Result<(), ConsoleError> {
        let line = format!("{}: {msg}", self.display_name);
        self.draw(core_render::message(&line))
    }

    pub(crate) fn set_committed(&mut self, line: String) {
        self.committed = Some(line);
    }

    pub(crate) fn take_committed(&mut self) -> Option<String> {
        self.committed.take()
    }

    pub(crate) fn split_for_command(&mut self) -> (&mut dyn OutputSink, &dyn Terminator) {
        (&mut *self.out, &*self.terminator)
    }

    /// Handle one input chunk to completion against the live key table.
    pub fn handle_chunk(&mut self, chunk: &str) -> Result<(), ConsoleError> {
        let binding = match self.keys.resolve(chunk).cloned() {
            Resolution::Matched(binding) => binding,
            Resolution::FallbackLiteral => Binding::Builtin(Builtin::Insert),
            Resolution::Discard => {
                debug!(target: "console.keys", len = chunk.len(), "chunk_dropped");
                return Ok(());
            }
        };
        let action = match binding {
            Binding::Builtin(slot) => self.builtins.get(slot),
            Binding::Custom(action) => action,
        };
        let result = action.invoke(self, chunk);
        self.out.flush()?;
        result
    }

    /// Consume events until the channel closes, `Event::Shutdown` arrives or
    /// an action calls `request_shutdown`. Command failures follow
    /// `[commands] on_error`; any other error ends the loop.
    pub async fn run(&mut self, mut events: Receiver<Event>) -> Result<(), ConsoleError> {
        info!(target: "runtime", "console_loop_started");
        self.shutdown = false;
        while !self.shutdown {
            let Some(event) = events.recv().await else {
                debug!(target: "runtime", "event_channel_closed");
                break;
            };
            match event {
                Event::Input(chunk) => {
                    if let Err(e) = self.handle_chunk(&chunk) {
                        self.apply_error_policy(e)?;
                    }
                }
                Event::Shutdown => break,
            }
        }
        info!(target: "runtime", "console_loop_stopped");
        Ok(())
    }

    fn apply_error_policy(&mut self, err: ConsoleError) -> Result<(), ConsoleError> {
        match (err, self.config.file.commands.on_error) {
            (ConsoleError::Command { name, error }, OnError::Report) => {
                warn!(target: "console.dispatch", command = %name, "command_failed");
                let line = format!("{} ERROR: {error:#}", self.display_name);
                self.draw(core_render::message(&line))?;
                self.out.flush()?;
                Ok(())
            }
            (err, _) => Err(err),
        }
    }

    /// Enter raw mode, greet, run the loop and restore the terminal.
    pub async fn start(
        &mut self,
        backend: &mut dyn TerminalBackend,
        events: Receiver<Event>,
    ) -> Result<(), ConsoleError> {
        let guard = TerminalGuard::enter(backend).map_err(ConsoleError::Terminal)?;
        if self.config.file.console.banner {
            self.message("watching for commands! type help for list of commands!")?;
        }
        if self.commands.is_empty() {
            warn!(target: "console.dispatch", "empty_registry");
            self.message("no commands registered! command lines are ignored until one is added")?;
        }
        self.out.flush()?;
        let result = self.run(events).await;
        let released = guard.release().map_err(ConsoleError::Terminal);
        result?;
        released
    }
}
