//! Built-in `help` listing.

use super::CommandRegistry;

/// One row per registered command, in registration order.
///
/// Usage strings are split at the first `separator` into signature and
/// description; signatures are padded to the longest one plus `gutter`
/// spaces. Commands without usage get a placeholder row.
pub(crate) fn help_lines(registry: &CommandRegistry, separator: &str, gutter: usize) -> Vec<String> {
    let split = |usage: &str| -> (String, String) {
        match usage.split_once(separator) {
            Some((sig, desc)) if !separator.is_empty() => (sig.trim().to_string(), desc.trim().to_string()),
            _ => (usage.trim().to_string(), String::new()),
        }
    };

    let width = registry
        .iter()
        .filter_map(|(_, spec)| spec.usage())
        .map(|usage| split(usage).0.chars().count())
        .max()
        .unwrap_or(0);

    registry
        .iter()
        .map(|(name, spec)| match spec.usage() {
            Some(usage) => {
                let (sig, desc) = split(usage);
                let pad = width - sig.chars().count() + gutter;
                format!(" {sig}{}{desc}", " ".repeat(pad)).trim_end().to_string()
            }
            None => format!(" No usage declared for command \"{name}\"!"),
        })
        .collect()
}
