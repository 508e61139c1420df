//! Tab completion of filesystem paths.
//!
//! Works on the last token of the buffer. Everything up to the last path
//! separator names a directory (relative to the lister root unless
//! absolute); the rest is a case-insensitive name prefix.
//!
//! Outcomes:
//! - token ends in a separator: list the whole directory below the prompt
//! - one match: replace the typed prefix with it (directories get `/`)
//! - several matches: list them below the prompt, buffer unchanged
//! - no match, missing directory, listing error: nothing happens

use crate::console::Console;
use crate::dispatcher::tokenize;
use crate::error::ConsoleError;
use std::io;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

impl DirEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }

    /// Name as offered to the user; directories carry a trailing `/`.
    pub fn display(&self) -> String {
        if self.is_dir {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Capability: list a directory. Missing paths report `NotFound`.
pub trait DirectoryLister {
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntry>>;
}

impl<T: DirectoryLister + ?Sized> DirectoryLister for Box<T> {
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntry>> {
        (**self).list(dir)
    }
}

/// Lists the real filesystem. Relative paths resolve against `root`.
#[derive(Debug, Clone)]
pub struct FsLister {
    root: PathBuf,
}

impl Default for FsLister {
    /// Rooted at the process working directory at the time of each listing.
    fn default() -> Self {
        Self::new(".")
    }
}

impl FsLister {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DirectoryLister for FsLister {
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntry>> {
        let path = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.root.join(dir)
        };
        let mut out = Vec::new();
        for entry in std::fs::read_dir(&path)? {
            let entry = entry?;
            // Follow symlinks so a link to a directory completes like one.
            let is_dir = std::fs::metadata(entry.path()).map(|m| m.is_dir()).unwrap_or(false);
            out.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir,
            });
        }
        Ok(out)
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == MAIN_SEPARATOR
}

/// Split a token into (directory part including its trailing separator, prefix).
fn split_token(token: &str) -> (&str, &str) {
    match token.rfind(is_separator) {
        Some(idx) => {
            let sep_len = token[idx..].chars().next().map_or(1, char::len_utf8);
            token.split_at(idx + sep_len)
        }
        None => ("", token),
    }
}

/// Replace the trailing `prefix` of `text` (compared case-insensitively)
/// with `replacement`. `None` when `text` does not end with the prefix.
fn replace_suffix(text: &str, prefix: &str, replacement: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    let n = prefix.chars().count();
    let start = chars.len().checked_sub(n)?;
    let tail: String = chars[start..].iter().collect();
    if tail.to_lowercase() != prefix.to_lowercase() {
        return None;
    }
    let mut out: String = chars[..start].iter().collect();
    out.push_str(replacement);
    Some(out)
}

pub(crate) fn complete(console: &mut Console) -> Result<(), ConsoleError> {
    let text = console.buffer().text();
    if text.is_empty() || text.ends_with(char::is_whitespace) {
        return Ok(());
    }
    let Some(token) = tokenize(&text).pop() else {
        return Ok(());
    };
    let Some(lister) = console.lister() else {
        debug!(target: "console.complete", "no_lister");
        return Ok(());
    };

    let (dir, prefix) = split_token(&token);
    let mut entries = match lister.list(Path::new(dir)) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(target: "console.complete", error_kind = ?e.kind(), "listing_failed");
            return Ok(());
        }
    };
    entries.sort();

    if prefix.is_empty() {
        let all: Vec<String> = entries.iter().map(|e| e.name.clone()).collect();
        debug!(target: "console.complete", count = all.len(), "list_all");
        let len = console.buffer().len();
        console.buffer_mut().set_cursor(len);
        return console.show_info(&all.join(" "));
    }

    let needle = prefix.to_lowercase();
    let matches: Vec<String> = entries
        .iter()
        .filter(|e| e.name.to_lowercase().starts_with(&needle))
        .map(DirEntry::display)
        .collect();
    debug!(target: "console.complete", count = matches.len(), "matches");

    match matches.as_slice() {
        [] => Ok(()),
        [only] => {
            let Some(completed) = replace_suffix(&text, prefix, only) else {
                debug!(target: "console.complete", "prefix_not_at_end");
                return Ok(());
            };
            console.buffer_mut().set_text(&completed);
            console.redraw()
        }
        many => {
            let info = many.join(" ");
            let len = console.buffer().len();
            console.buffer_mut().set_cursor(len);
            console.show_info(&info)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn split_token_separates_directory_and_prefix() {
        assert_eq!(split_token("src/ma"), ("src/", "ma"));
        assert_eq!(split_token("src/"), ("src/", ""));
        assert_eq!(split_token("Car"), ("", "Car"));
        assert_eq!(split_token("/etc/hos"), ("/etc/", "hos"));
    }

    #[test]
    fn replace_suffix_is_case_insensitive() {
        assert_eq!(replace_suffix("cat READ", "READ", "readme.md").as_deref(), Some("cat readme.md"));
        assert_eq!(replace_suffix("cat rEa", "rea", "README.md").as_deref(), Some("cat README.md"));
        assert_eq!(replace_suffix("cat \"rea\"", "rea", "README.md"), None);
    }

    #[test]
    fn fs_lister_marks_directories() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        std::fs::write(tmp.path().join("file.txt"), "x").unwrap();
        let mut entries = FsLister::new(tmp.path()).list(Path::new("")).unwrap();
        entries.sort();
        assert_eq!(entries, vec![DirEntry::file("file.txt"), DirEntry::dir("sub")]);
    }

    #[test]
    fn fs_lister_reports_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let err = FsLister::new(tmp.path()).list(Path::new("nope/")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
