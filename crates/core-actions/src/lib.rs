//! Key dispatch for the console: actions, built-in slots, the session
//! object, command dispatch and path completion.
//!
//! Resolution order for one input chunk:
//! 1. key table (`Console::keys`) → [`Binding`]
//! 2. a `Binding::Builtin` goes through the live [`Builtins`] slot, so a
//!    replaced slot changes every key bound to it
//! 3. unbound printable chunks go to the `Insert` slot, anything else is dropped
//!
//! Nothing is cached between chunks; actions may rebind keys, replace slots
//! or register commands while the loop is running.

use std::fmt;
use std::rc::Rc;

pub mod builtins;
pub mod completion;
pub mod console;
pub mod dispatcher;
mod error;

pub use builtins::{Builtin, Builtins};
pub use completion::{DirEntry, DirectoryLister, FsLister};
pub use console::Console;
pub use dispatcher::{
    CommandContext, CommandHandler, CommandRegistry, CommandSpec, ParsedCommandLine,
    RegistryError, tokenize,
};
pub use error::ConsoleError;

use core_keymap::{KeyTable, keys};

/// Something a key can be bound to.
///
/// Receives the whole session and the chunk that triggered it.
pub trait Action {
    fn invoke(&self, console: &mut Console, key: &str) -> Result<(), ConsoleError>;
}

impl<F> Action for F
where
    F: Fn(&mut Console, &str) -> Result<(), ConsoleError>,
{
    fn invoke(&self, console: &mut Console, key: &str) -> Result<(), ConsoleError> {
        self(console, key)
    }
}

pub type ActionRef = Rc<dyn Action>;

/// Target of a key table entry.
#[derive(Clone)]
pub enum Binding {
    /// Call whatever currently sits in the built-in slot.
    Builtin(Builtin),
    Custom(ActionRef),
}

impl Binding {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&mut Console, &str) -> Result<(), ConsoleError> + 'static,
    {
        Binding::Custom(Rc::new(f))
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Builtin(b) => f.debug_tuple("Builtin").field(b).finish(),
            Binding::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

pub type ActionTable = KeyTable<Binding>;

/// Key table every new console starts with.
pub fn default_bindings() -> ActionTable {
    let mut table = ActionTable::new();
    table.bind(keys::INTERRUPT, Binding::Builtin(Builtin::Interrupt));
    table.bind(keys::ESCAPE, Binding::Builtin(Builtin::ClearLine));
    table.bind(keys::BACKSPACE, Binding::Builtin(Builtin::DeleteBackward));
    table.bind(keys::CTRL_H, Binding::Builtin(Builtin::DeleteBackward));
    table.bind(keys::TAB, Binding::Builtin(Builtin::Complete));
    table.bind(keys::ENTER, Binding::Builtin(Builtin::Submit));
    table.bind(keys::UP, Binding::Builtin(Builtin::HistoryUp));
    table.bind(keys::DOWN, Binding::Builtin(Builtin::HistoryDown));
    table.bind(keys::LEFT, Binding::Builtin(Builtin::MoveLeft));
    table.bind(keys::RIGHT, Binding::Builtin(Builtin::MoveRight));
    table
}
