//! termexec entrypoint: a demo process hosting the interactive console.
use anyhow::{Context, Result};
use clap::Parser;
use core_actions::{Action, Binding, Builtin, CommandSpec, Console};
use core_config::load_from;
use core_events::event_channel;
use core_keymap::keys;
use core_terminal::{CrosstermBackend, CrosstermSink, OutputSink, Signal};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

const DEMO_INTRO: &str = "
This is a demo!
Available commands:
- help
- k
- exit
- echo

You can use \"tab\" to complete folder and file names, \"backspace\", move the cursor
with the \"left\" and \"right\" arrow keys, browse typed commands with \"up\" and \"down\"
and much more...

Let's go! Type a command!
";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "termexec", version, about = "Interactive command console for a running process")]
struct Args {
    /// Optional configuration file path (overrides discovery of `termexec.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

struct AppStartup {
    backend: CrosstermBackend,
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self {
            backend: CrosstermBackend::new(),
            log_guard: None,
        }
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join("termexec.log");
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, "termexec.log");
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        match tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .try_init()
        {
            Ok(_) => {
                self.log_guard = Some(guard);
            }
            Err(_err) => {
                // Global tracing subscriber already installed; drop guard so writer shuts down.
            }
        }

        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

fn register_demo_commands(console: &mut Console) -> Result<()> {
    let commands = console.commands_mut();
    commands.register(
        "k",
        CommandSpec::new(|ctx, args| {
            let Some(pid) = args.first().filter(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit())) else {
                ctx.println("Wrong argument pid for command k - kill")?;
                return Ok(());
            };
            let pid: u32 = pid.parse().with_context(|| format!("pid {pid} is out of range"))?;
            let signal = match args.get(1) {
                Some(name) => name.parse::<Signal>()?,
                None => Signal::Kill,
            };
            ctx.terminator().terminate(pid, signal)?;
            ctx.println(&format!(
                "Command KILL for process \"{pid}\" executed with signal [{signal}]!"
            ))?;
            Ok(())
        })
        .with_usage("k [PID, [SIGNAL]] <> kill process by its PID"),
    )?;
    commands.register(
        "exit",
        CommandSpec::new(|ctx, _| {
            let pid = std::process::id();
            let signal = Signal::Int;
            ctx.println(&format!(
                "Command EXIT for process \"{pid}\" will be executed with signal [{signal}]!"
            ))?;
            ctx.out().flush()?;
            ctx.terminator().terminate(pid, signal)?;
            Ok(())
        })
        .with_usage("exit <> stop watching for commands and exit script"),
    )?;
    commands.register(
        "echo",
        CommandSpec::new(|ctx, args| {
            ctx.println(&args.join(" "))?;
            Ok(())
        })
        .with_usage("echo [TEXT...] <> print the arguments"),
    )?;
    Ok(())
}

fn bind_demo_keys(console: &mut Console) {
    // Ctrl+Q: a custom key that also registers a command while the loop runs.
    console.keys_mut().bind(
        keys::CTRL_Q,
        Binding::custom(|c, _| {
            if !c.commands().contains("n") {
                let spec = CommandSpec::new(|ctx, _| {
                    ctx.println("I'm a new command added after running script!")?;
                    Ok(())
                })
                .with_usage("n <> just a new added command!");
                if let Err(e) = c.commands_mut().register("n", spec) {
                    warn!(target: "runtime", error = %e, "demo_register_failed");
                }
            }
            c.show_info("This is handler for Ctrl+Q! Command \"n\" is now available.")
        }),
    );

    // `{`: jump two cells left.
    console.keys_mut().bind(
        "{",
        Binding::custom(|c, _| {
            let cursor = c.buffer().cursor();
            if cursor > 1 {
                c.buffer_mut().set_cursor(cursor - 2);
                c.draw(core_render::move_cursor(cursor - 2))?;
            }
            Ok(())
        }),
    );

    // Enter: log, then defer to whatever Submit was before.
    let previous = console.builtins().get(Builtin::Submit);
    console.builtins_mut().replace(Builtin::Submit, move |c, key| {
        info!(target: "runtime", len = c.buffer().len(), "demo_submit");
        previous.invoke(c, key)
    });
}

fn build_console(args: &Args) -> Result<Console> {
    let config = load_from(args.config.clone())?;
    info!(
        target: "runtime.startup",
        config_override = args.config.is_some(),
        config_found = config.raw.is_some(),
        "config_ready"
    );
    let mut console = Console::new(config, CrosstermSink::stdout());
    register_demo_commands(&mut console)?;
    bind_demo_keys(&mut console);
    Ok(console)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut startup = AppStartup::new();
    startup.configure_logging()?;
    AppStartup::install_panic_hook();
    info!(target: "runtime", "startup");

    let mut console = build_console(&args)?;
    println!("{DEMO_INTRO}");

    let (tx, rx) = event_channel();
    let (input_task, input_shutdown) = core_input::spawn_async_input(tx);
    let result = console.start(&mut startup.backend, rx).await;

    input_shutdown.signal();
    if let Err(e) = input_task.await {
        warn!(target: "runtime", error = %e, "input_task_join_failed");
    }
    info!(target: "runtime", ok = result.is_ok(), "shutdown");
    result.context("console loop failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_terminal::{MemorySink, TerminateError, Terminator};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Recorder {
        calls: Rc<RefCell<Vec<(u32, Signal)>>>,
    }

    impl Terminator for Recorder {
        fn terminate(&self, pid: u32, signal: Signal) -> Result<(), TerminateError> {
            self.calls.borrow_mut().push((pid, signal));
            Ok(())
        }
    }

    fn demo_console() -> (Console, MemorySink, Recorder) {
        let screen = MemorySink::new();
        let recorder = Recorder::default();
        let mut console = Console::new(core_config::Config::default(), screen.clone())
            .with_terminator(recorder.clone())
            .without_lister();
        register_demo_commands(&mut console).unwrap();
        bind_demo_keys(&mut console);
        (console, screen, recorder)
    }

    fn submit(console: &mut Console, line: &str) -> Result<(), core_actions::ConsoleError> {
        for ch in line.chars() {
            console.handle_chunk(&ch.to_string())?;
        }
        console.handle_chunk(keys::ENTER)
    }

    #[test]
    fn k_validates_pid() {
        let (mut console, screen, recorder) = demo_console();
        submit(&mut console, "k abc").unwrap();
        assert!(screen.transcript().contains("Wrong argument pid for command k - kill"));
        assert!(recorder.calls.borrow().is_empty());
    }

    #[test]
    fn k_sends_requested_signal() {
        let (mut console, screen, recorder) = demo_console();
        submit(&mut console, "k 4242").unwrap();
        submit(&mut console, "k 4243 TERM").unwrap();
        assert_eq!(
            *recorder.calls.borrow(),
            vec![(4242, Signal::Kill), (4243, Signal::Term)]
        );
        assert!(screen.transcript().contains("executed with signal [SIGTERM]!"));
    }

    #[test]
    fn k_rejects_unknown_signal() {
        let (mut console, _screen, recorder) = demo_console();
        let err = submit(&mut console, "k 4242 NOPE").unwrap_err();
        assert!(err.to_string().contains("unknown signal"));
        assert!(recorder.calls.borrow().is_empty());
    }

    #[test]
    fn exit_interrupts_self() {
        let (mut console, _screen, recorder) = demo_console();
        submit(&mut console, "exit").unwrap();
        assert_eq!(*recorder.calls.borrow(), vec![(std::process::id(), Signal::Int)]);
    }

    #[test]
    fn ctrl_q_adds_command_at_runtime() {
        let (mut console, screen, _recorder) = demo_console();
        assert!(!console.commands().contains("n"));
        console.handle_chunk(keys::CTRL_Q).unwrap();
        assert!(console.commands().contains("n"));
        submit(&mut console, "n").unwrap();
        assert!(screen.transcript().contains("I'm a new command added after running script!"));
    }

    #[test]
    fn brace_moves_two_left_and_enter_still_submits() {
        let (mut console, screen, _recorder) = demo_console();
        for ch in "echo hi".chars() {
            console.handle_chunk(&ch.to_string()).unwrap();
        }
        console.handle_chunk("{").unwrap();
        assert_eq!(console.buffer().cursor(), 5);
        console.handle_chunk(keys::ENTER).unwrap();
        assert_eq!(console.buffer().history().entries(), ["echo hi".to_string()]);
        assert!(screen.transcript().contains("\nhi"));
    }
}
