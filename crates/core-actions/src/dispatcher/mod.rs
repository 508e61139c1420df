//! Command registry and line dispatch.
//!
//! A committed line is tokenized (`command_parser`), its first token looked
//! up in the [`CommandRegistry`] and the handler called with the remaining
//! tokens. `help` is answered here unless a command of that name was
//! registered; anything else unknown gets a "not recognized" message and the
//! session carries on.

use crate::console::Console;
use crate::error::ConsoleError;
use core_terminal::{OutputSink, Terminator};
use std::fmt;
use std::rc::Rc;
use thiserror::Error;
use tracing::debug;

mod command_parser;
mod help;

pub use command_parser::{ParsedCommandLine, tokenize};

/// What a command handler gets to work with besides its arguments.
pub struct CommandContext<'a> {
    out: &'a mut dyn OutputSink,
    terminator: &'a dyn Terminator,
    display_name: &'a str,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        out: &'a mut dyn OutputSink,
        terminator: &'a dyn Terminator,
        display_name: &'a str,
    ) -> Self {
        Self {
            out,
            terminator,
            display_name,
        }
    }

    pub fn out(&mut self) -> &mut dyn OutputSink {
        &mut *self.out
    }

    pub fn terminator(&self) -> &dyn Terminator {
        self.terminator
    }

    pub fn display_name(&self) -> &str {
        self.display_name
    }

    /// Write `text` as its own row.
    pub fn println(&mut self, text: &str) -> std::io::Result<()> {
        core_render::message(text).flush(&mut *self.out)
    }
}

pub trait CommandHandler {
    fn run(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> anyhow::Result<()>;
}

impl<F> CommandHandler for F
where
    F: Fn(&mut CommandContext<'_>, &[String]) -> anyhow::Result<()>,
{
    fn run(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> anyhow::Result<()> {
        self(ctx, args)
    }
}

/// A registered command: required handler plus optional usage line
/// (`"signature <> description"`).
#[derive(Clone)]
pub struct CommandSpec {
    handler: Rc<dyn CommandHandler>,
    usage: Option<String>,
}

impl CommandSpec {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&mut CommandContext<'_>, &[String]) -> anyhow::Result<()> + 'static,
    {
        Self {
            handler: Rc::new(handler),
            usage: None,
        }
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn usage(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    pub fn handler(&self) -> Rc<dyn CommandHandler> {
        self.handler.clone()
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("usage", &self.usage)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("command name is empty")]
    EmptyName,
    #[error("command name `{0}` contains whitespace")]
    Whitespace(String),
}

/// Insertion-ordered name → command mapping.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    entries: Vec<(String, CommandSpec)>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `spec` under `name`. Re-registering a name replaces the
    /// command in place and returns the previous one.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        spec: CommandSpec,
    ) -> Result<Option<CommandSpec>, RegistryError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if name.chars().any(char::is_whitespace) {
            return Err(RegistryError::Whitespace(name));
        }
        debug!(target: "console.dispatch", command = %name, "command_registered");
        if let Some((_, existing)) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            return Ok(Some(std::mem::replace(existing, spec)));
        }
        self.entries.push((name, spec));
        Ok(None)
    }

    pub fn remove(&mut self, name: &str) -> Option<CommandSpec> {
        let idx = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn get(&self, name: &str) -> Option<&CommandSpec> {
        self.entries
            .iter()
            .find_map(|(n, spec)| (n == name).then_some(spec))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CommandSpec)> {
        self.entries.iter().map(|(n, spec)| (n.as_str(), spec))
    }
}

/// Parse and run one committed line.
pub(crate) fn execute(console: &mut Console, line: &str) -> Result<(), ConsoleError> {
    if console.commands().is_empty() {
        debug!(target: "console.dispatch", "dispatch_skipped_empty_registry");
        return Ok(());
    }
    let Some(parsed) = ParsedCommandLine::parse(line) else {
        return Ok(());
    };
    if parsed.name.is_empty() {
        return Ok(());
    }

    if let Some(handler) = console.commands().get(&parsed.name).map(CommandSpec::handler) {
        debug!(target: "console.dispatch", command = %parsed.name, argc = parsed.args.len(), "dispatch");
        let display_name = console.display_name().to_string();
        let (out, terminator) = console.split_for_command();
        let mut ctx = CommandContext::new(out, terminator, &display_name);
        return handler
            .run(&mut ctx, &parsed.args)
            .map_err(|error| ConsoleError::Command {
                name: parsed.name,
                error,
            });
    }

    if parsed.name == "help" {
        debug!(target: "console.dispatch", "help");
        let help = &console.config().file.help;
        let rows = help::help_lines(console.commands(), &help.separator, help.gutter);
        let mut text = format!("{}: Available commands are: \r\n\r\n", console.display_name());
        for row in rows {
            text.push_str(&row);
            text.push_str("\r\n");
        }
        return console.draw(core_render::message(&text));
    }

    debug!(target: "console.dispatch", len = line.len(), "not_recognized");
    console.message(&format!("Command \"{line}\" not recognized! Use help command!"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> CommandSpec {
        CommandSpec::new(|_, _| Ok(()))
    }

    #[test]
    fn registry_keeps_insertion_order() {
        let mut reg = CommandRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            reg.register(name, noop()).unwrap();
        }
        assert_eq!(reg.names().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn reregistering_replaces_in_place() {
        let mut reg = CommandRegistry::new();
        reg.register("a", noop()).unwrap();
        reg.register("b", noop()).unwrap();
        let prev = reg.register("a", noop().with_usage("a <> again")).unwrap();
        assert!(prev.is_some_and(|p| p.usage().is_none()));
        assert_eq!(reg.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(reg.get("a").and_then(CommandSpec::usage), Some("a <> again"));
    }

    #[test]
    fn invalid_names_are_rejected() {
        let mut reg = CommandRegistry::new();
        assert_eq!(reg.register("", noop()).unwrap_err(), RegistryError::EmptyName);
        assert_eq!(
            reg.register("two words", noop()).unwrap_err(),
            RegistryError::Whitespace("two words".into())
        );
        assert!(reg.is_empty());
    }

    #[test]
    fn remove_drops_entry() {
        let mut reg = CommandRegistry::new();
        reg.register("x", noop()).unwrap();
        assert!(reg.remove("x").is_some());
        assert!(!reg.contains("x"));
        assert!(reg.remove("x").is_none());
    }
}
