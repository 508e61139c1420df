//! Built-in actions and their replaceable slots.
//!
//! Each built-in lives in its own slot. Default key bindings name the slot,
//! not the function, so `Builtins::replace` retargets every key bound to it.
//! A replacement can hold on to the previous slot value (from `get`) and call
//! it before or after its own work.

use crate::completion;
use crate::console::Console;
use crate::dispatcher;
use crate::{Action, ActionRef, ConsoleError};
use core_terminal::Signal;
use std::rc::Rc;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// Terminate the current process with the configured signal.
    Interrupt,
    ClearLine,
    DeleteBackward,
    Complete,
    /// `Commit` followed by `Execute`, both looked up through their slots.
    Submit,
    Commit,
    Execute,
    HistoryUp,
    HistoryDown,
    MoveLeft,
    MoveRight,
    /// Insert the triggering chunk at the cursor. Unbound printable input
    /// lands here.
    Insert,
}

impl Builtin {
    pub const ALL: [Builtin; 12] = [
        Builtin::Interrupt,
        Builtin::ClearLine,
        Builtin::DeleteBackward,
        Builtin::Complete,
        Builtin::Submit,
        Builtin::Commit,
        Builtin::Execute,
        Builtin::HistoryUp,
        Builtin::HistoryDown,
        Builtin::MoveLeft,
        Builtin::MoveRight,
        Builtin::Insert,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Builtin::Interrupt => "interrupt",
            Builtin::ClearLine => "clear_line",
            Builtin::DeleteBackward => "delete_backward",
            Builtin::Complete => "complete",
            Builtin::Submit => "submit",
            Builtin::Commit => "commit",
            Builtin::Execute => "execute",
            Builtin::HistoryUp => "history_up",
            Builtin::HistoryDown => "history_down",
            Builtin::MoveLeft => "move_left",
            Builtin::MoveRight => "move_right",
            Builtin::Insert => "insert",
        }
    }

    fn default_action(self) -> ActionRef {
        match self {
            Builtin::Interrupt => Rc::new(interrupt),
            Builtin::ClearLine => Rc::new(clear_line),
            Builtin::DeleteBackward => Rc::new(delete_backward),
            Builtin::Complete => Rc::new(complete),
            Builtin::Submit => Rc::new(submit),
            Builtin::Commit => Rc::new(commit),
            Builtin::Execute => Rc::new(execute),
            Builtin::HistoryUp => Rc::new(history_up),
            Builtin::HistoryDown => Rc::new(history_down),
            Builtin::MoveLeft => Rc::new(move_left),
            Builtin::MoveRight => Rc::new(move_right),
            Builtin::Insert => Rc::new(insert),
        }
    }
}

/// One slot per [`Builtin`].
#[derive(Clone)]
pub struct Builtins {
    slots: Vec<ActionRef>,
}

impl Default for Builtins {
    fn default() -> Self {
        Self {
            slots: Builtin::ALL.into_iter().map(Builtin::default_action).collect(),
        }
    }
}

impl Builtins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current occupant of `slot`.
    pub fn get(&self, slot: Builtin) -> ActionRef {
        self.slots[slot.index()].clone()
    }

    /// Put `f` in `slot`, returning the previous occupant.
    pub fn replace<F>(&mut self, slot: Builtin, f: F) -> ActionRef
    where
        F: Fn(&mut Console, &str) -> Result<(), ConsoleError> + 'static,
    {
        self.replace_action(slot, Rc::new(f))
    }

    pub fn replace_action(&mut self, slot: Builtin, action: ActionRef) -> ActionRef {
        debug!(target: "console.keys", slot = slot.as_str(), "builtin_replaced");
        std::mem::replace(&mut self.slots[slot.index()], action)
    }

    /// Put the stock implementation back into `slot`.
    pub fn restore(&mut self, slot: Builtin) -> ActionRef {
        self.replace_action(slot, slot.default_action())
    }
}

fn interrupt(console: &mut Console, _key: &str) -> Result<(), ConsoleError> {
    let configured = console.config().file.interrupt.signal.clone();
    let signal = configured.parse::<Signal>().unwrap_or_else(|e| {
        warn!(target: "console.process", error = %e, "interrupt_signal_invalid_using_kill");
        Signal::Kill
    });
    let pid = std::process::id();
    debug!(target: "console.process", pid, %signal, "interrupt");
    console.out().flush()?;
    if let Err(e) = console.terminator().terminate(pid, signal) {
        warn!(target: "console.process", error = %e, "interrupt_failed");
        let msg = format!("{} ERROR: {e}", console.display_name());
        console.draw(core_render::message(&msg))?;
    }
    Ok(())
}

fn clear_line(console: &mut Console, _key: &str) -> Result<(), ConsoleError> {
    console.buffer_mut().clear();
    console.draw(core_render::clear_line())?;
    Ok(())
}

fn delete_backward(console: &mut Console, _key: &str) -> Result<(), ConsoleError> {
    if console.buffer_mut().delete_backward() {
        console.redraw()?;
    }
    Ok(())
}

fn complete(console: &mut Console, _key: &str) -> Result<(), ConsoleError> {
    completion::complete(console)
}

fn submit(console: &mut Console, key: &str) -> Result<(), ConsoleError> {
    let commit = console.builtins().get(Builtin::Commit);
    commit.invoke(console, key)?;
    let execute = console.builtins().get(Builtin::Execute);
    execute.invoke(console, key)
}

fn commit(console: &mut Console, _key: &str) -> Result<(), ConsoleError> {
    let line = console.buffer_mut().commit();
    trace!(
        target: "console.history",
        len = line.len(),
        entries = console.buffer().history().len(),
        "committed"
    );
    console.draw(core_render::line_break())?;
    console.set_committed(line);
    Ok(())
}

fn execute(console: &mut Console, _key: &str) -> Result<(), ConsoleError> {
    let line = console.take_committed().unwrap_or_default();
    dispatcher::execute(console, &line)
}

fn history_up(console: &mut Console, _key: &str) -> Result<(), ConsoleError> {
    if console.buffer_mut().history_up() {
        console.redraw()?;
    } else {
        console.draw(core_render::clear_line())?;
    }
    Ok(())
}

fn history_down(console: &mut Console, _key: &str) -> Result<(), ConsoleError> {
    if console.buffer_mut().history_down() {
        console.redraw()?;
    } else {
        console.draw(core_render::clear_line())?;
    }
    Ok(())
}

fn move_left(console: &mut Console, _key: &str) -> Result<(), ConsoleError> {
    if console.buffer_mut().move_left() {
        let cursor = console.buffer().cursor();
        console.draw(core_render::move_cursor(cursor))?;
    }
    Ok(())
}

fn move_right(console: &mut Console, _key: &str) -> Result<(), ConsoleError> {
    if console.buffer_mut().move_right() {
        let cursor = console.buffer().cursor();
        console.draw(core_render::move_cursor(cursor))?;
    }
    Ok(())
}

fn insert(console: &mut Console, key: &str) -> Result<(), ConsoleError> {
    match console.buffer_mut().insert_str(key) {
        core_state::Insert::Appended => console.draw(core_render::append(key))?,
        core_state::Insert::Spliced => console.redraw()?,
    }
    Ok(())
}
