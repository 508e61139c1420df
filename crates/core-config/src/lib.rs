//! Configuration loading and parsing for `termexec.toml`.
//!
//! The binary may pass an explicit path; otherwise `discover` looks in the
//! working directory and then the platform config dir. A missing file yields
//! defaults. A file that fails to parse also yields defaults, with a warning
//! under the `config` target. Unknown fields are ignored so older binaries
//! tolerate newer files.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const FILE_NAME: &str = "termexec.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ConsoleSection {
    /// Message prefix, rendered as `<name>: pid[<pid>]`.
    #[serde(default = "ConsoleSection::default_name")]
    pub name: String,
    #[serde(default = "ConsoleSection::default_banner")]
    pub banner: bool,
}

impl Default for ConsoleSection {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            banner: Self::default_banner(),
        }
    }
}

impl ConsoleSection {
    fn default_name() -> String {
        "termexec".to_string()
    }
    const fn default_banner() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HelpSection {
    /// Splits a usage string into signature and description.
    #[serde(default = "HelpSection::default_separator")]
    pub separator: String,
    /// Spaces between the longest signature and its description.
    #[serde(default = "HelpSection::default_gutter")]
    pub gutter: usize,
}

impl Default for HelpSection {
    fn default() -> Self {
        Self {
            separator: Self::default_separator(),
            gutter: Self::default_gutter(),
        }
    }
}

impl HelpSection {
    fn default_separator() -> String {
        "<>".to_string()
    }
    const fn default_gutter() -> usize {
        3
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct InterruptSection {
    /// Signal name or number sent to the current process on Ctrl+C.
    #[serde(default = "InterruptSection::default_signal")]
    pub signal: String,
}

impl Default for InterruptSection {
    fn default() -> Self {
        Self {
            signal: Self::default_signal(),
        }
    }
}

impl InterruptSection {
    fn default_signal() -> String {
        "KILL".to_string()
    }
}

/// What the console loop does when a command handler fails.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
    /// Print `<name> ERROR: <error>` and keep reading input.
    #[default]
    Report,
    /// Stop the loop and hand the error to the caller.
    Abort,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct CommandsSection {
    #[serde(default)]
    pub on_error: OnError,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub console: ConsoleSection,
    #[serde(default)]
    pub help: HelpSection,
    #[serde(default)]
    pub interrupt: InterruptSection,
    #[serde(default)]
    pub commands: CommandsSection,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

impl Config {
    /// Prefix for every console message: `<name>: pid[<pid>]`.
    pub fn display_name(&self) -> String {
        format!("{}: pid[{}]", self.file.console.name, std::process::id())
    }
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("termexec").join(FILE_NAME);
    }
    PathBuf::from(FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_missing_using_defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(Config {
                raw: Some(content),
                file,
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), body).unwrap();
        tmp
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert!(cfg.raw.is_none());
        assert_eq!(cfg.file.console.name, "termexec");
        assert!(cfg.file.console.banner);
        assert_eq!(cfg.file.help.separator, "<>");
        assert_eq!(cfg.file.help.gutter, 3);
        assert_eq!(cfg.file.interrupt.signal, "KILL");
        assert_eq!(cfg.file.commands.on_error, OnError::Report);
    }

    #[test]
    fn parses_all_sections() {
        let tmp = write_config(
            "[console]\nname = \"worker\"\nbanner = false\n\
             [help]\nseparator = \"--\"\ngutter = 5\n\
             [interrupt]\nsignal = \"TERM\"\n\
             [commands]\non_error = \"abort\"\n",
        );
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file.console.name, "worker");
        assert!(!cfg.file.console.banner);
        assert_eq!(cfg.file.help.separator, "--");
        assert_eq!(cfg.file.help.gutter, 5);
        assert_eq!(cfg.file.interrupt.signal, "TERM");
        assert_eq!(cfg.file.commands.on_error, OnError::Abort);
        assert!(cfg.raw.is_some());
    }

    #[test]
    fn partial_section_keeps_field_defaults() {
        let tmp = write_config("[help]\ngutter = 1\nunknown_key = 7\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file.help.gutter, 1);
        assert_eq!(cfg.file.help.separator, "<>");
        assert_eq!(cfg.file.console, ConsoleSection::default());
    }

    #[test]
    fn display_name_includes_pid() {
        let cfg = Config::default();
        assert_eq!(
            cfg.display_name(),
            format!("termexec: pid[{}]", std::process::id())
        );
    }

    #[test]
    fn parse_error_falls_back_with_warning() {
        let tmp = write_config("[commands]\non_error = \"explode\"\n");
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();

        let cfg = with_default(subscriber, || load_from(Some(tmp.path().to_path_buf()))).unwrap();

        let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(log_output.contains("WARN config:"));
        assert!(log_output.contains("config_parse_failed_using_defaults"));
        assert_eq!(cfg.file, ConfigFile::default());
    }
}
