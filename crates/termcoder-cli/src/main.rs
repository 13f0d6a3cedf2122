//! Termcoder CLI - terminal coding assistant
//!
//! Reads prompts with rustyline, runs each one as a session turn in
//! termcoder-core and renders progress on the terminal.

mod confirm;
mod render;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use console::style;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio_util::sync::CancellationToken;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use termcoder_core::approval::PermissionMode;
use termcoder_core::config::ConfigManager;
use termcoder_core::session::{CommandOutcome, Session, TurnOutcome, UserInput};

use confirm::DialoguerConfirmer;
use render::TerminalSink;

#[derive(Parser)]
#[command(name = "termcoder")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Terminal coding assistant with file, shell and web tools", long_about = None)]
struct Cli {
    /// Model to use (defaults to the config setting)
    #[arg(short, long)]
    model: Option<String>,

    /// Apply file writes and edits without asking
    #[arg(long)]
    accept_edits: bool,

    /// Run every tool without asking (dangerous commands are still blocked)
    #[arg(long)]
    yolo: bool,

    /// Workspace directory
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Config file (defaults to <config dir>/termcoder/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn mode_override(&self) -> Option<PermissionMode> {
        if self.yolo {
            Some(PermissionMode::Yolo)
        } else if self.accept_edits {
            Some(PermissionMode::AcceptEdits)
        } else {
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    // Use dunce::canonicalize to avoid UNC path prefix on Windows (\\?\)
    let workspace = dunce::canonicalize(&cli.workspace).unwrap_or_else(|_| {
        if cli.workspace.is_absolute() {
            cli.workspace.clone()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(&cli.workspace))
                .unwrap_or(cli.workspace.clone())
        }
    });

    let config_manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    }?;
    let mut config = config_manager.into_config();
    if let Some(model) = cli.model.clone() {
        config.model = model;
    }
    if let Some(mode) = cli.mode_override() {
        config.permission_mode = mode;
    }

    let mut session = Session::from_config(&config, &workspace)?;
    print_banner(&session, &workspace);

    run_repl(&mut session, &workspace).await
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    // Warn by default so logs don't interleave with the prompt; RUST_LOG wins
    let default_filter = if verbose { "info,termcoder_core=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

fn print_banner(session: &Session, workspace: &Path) {
    println!(
        "{} {}",
        style("termcoder").bold().cyan(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim()
    );
    println!("  Model:     {}", style(session.model()).green());
    println!("  Workspace: {}", style(abbreviate_home(workspace)).green());
    println!("  Mode:      {} ({})", session.mode(), session.mode().description());
    println!();

    match session.mode() {
        PermissionMode::Yolo => println!(
            "{}",
            style("Warning: yolo mode - all tools run without confirmation.").red().bold()
        ),
        PermissionMode::AcceptEdits => println!(
            "{}",
            style("Warning: accept-edits mode - file changes are applied without confirmation.").yellow()
        ),
        PermissionMode::Default => {}
    }
    println!(
        "{}",
        style("Type /help for commands, /mode to change permissions, /quit to exit.").dim()
    );
    println!();
}

fn abbreviate_home(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(rest) = path.strip_prefix(&home)
    {
        if rest.as_os_str().is_empty() {
            return "~".to_string();
        }
        return format!("~/{}", rest.display());
    }
    path.display().to_string()
}

fn prompt_for(mode: PermissionMode) -> String {
    match mode {
        PermissionMode::Default => "> ".to_string(),
        other => format!("[{}] > ", other),
    }
}

async fn run_repl(session: &mut Session, workspace: &Path) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new().context("Failed to initialise line editor")?;
    let confirmer = DialoguerConfirmer;
    let sink = TerminalSink::new(workspace.to_path_buf());

    loop {
        let line = match editor.readline(&prompt_for(session.mode())) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        match UserInput::parse(&line) {
            UserInput::Empty => continue,
            UserInput::Command(command) => {
                let _ = editor.add_history_entry(line.as_str());
                let outcome = session.handle_command(command);
                if !show_command_outcome(session, outcome) {
                    break;
                }
            }
            UserInput::Message(text) => {
                let _ = editor.add_history_entry(line.as_str());
                run_turn(session, &text, &confirmer, &sink).await;
            }
        }
    }

    println!("{}", style("Goodbye!").dim());
    Ok(())
}

/// Print a command result; returns false when the REPL should exit
fn show_command_outcome(session: &Session, outcome: CommandOutcome) -> bool {
    match outcome {
        CommandOutcome::Help(text) => println!("{}", text),
        CommandOutcome::ModeChanged(mode) => {
            let line = format!("Permission mode: {} ({})", mode, mode.description());
            match mode {
                PermissionMode::Yolo => println!("{}", style(line).red().bold()),
                PermissionMode::AcceptEdits => println!("{}", style(line).yellow()),
                PermissionMode::Default => println!("{}", style(line).green()),
            }
        }
        CommandOutcome::ModelChanged(model) => {
            println!("Switched to model: {}", style(model).green());
        }
        CommandOutcome::CurrentModel(model) => {
            println!("Current model: {}", style(model).green());
            println!("{}", style(format!("Usage: {}", session.usage())).dim());
        }
        CommandOutcome::Cleared => println!("{}", style("Conversation cleared.").dim()),
        CommandOutcome::Tokens(usage) => println!("Token usage: {}", usage),
        CommandOutcome::Unknown(word) => {
            println!(
                "{}",
                style(format!("Unknown command: {}. Type /help for available commands.", word)).yellow()
            );
        }
        CommandOutcome::Quit => return false,
    }
    println!();
    true
}

async fn run_turn(session: &mut Session, text: &str, confirmer: &DialoguerConfirmer, sink: &TerminalSink) {
    println!();

    // Ctrl-C while the turn runs cancels the turn instead of killing the process
    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let result = session.submit(text, confirmer, sink, &cancel).await;
    interrupt.abort();
    sink.stop_spinner();

    match result {
        Ok(TurnOutcome::Answered { .. }) | Ok(TurnOutcome::RoundLimitReached { .. }) => {
            println!("{}", style(session.usage()).dim());
        }
        Ok(TurnOutcome::Cancelled) => {
            println!("{}", style("Interrupted.").yellow());
        }
        Err(e) => {
            println!("{}", style(e).red());
        }
    }
    println!();
}
