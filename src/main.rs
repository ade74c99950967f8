mod cli;
mod headless;

use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use ragchat_client::QueryDispatcher;
use ragchat_config::Config;
use ragchat_core::{RoundOutcome, Session};
use ragchat_tui::{App, AppOptions};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        cli::print_completions(*shell);
        return Ok(());
    }

    // The TUI owns the screen, so its logs go to a file.
    let tui_mode = cli.command.is_none() && !cli.is_headless();
    let sink = if tui_mode {
        LogSink::File(cli.log_file.clone().unwrap_or_else(default_log_path))
    } else {
        LogSink::Stderr
    };
    init_logging(cli.verbose, sink)?;

    let config = load_config(&cli)?;

    match cli.command.take() {
        Some(Commands::ShowConfig) => {
            let text = toml::to_string_pretty(&config).context("serialising configuration")?;
            print!("{text}");
            Ok(())
        }
        Some(Commands::Ask { query }) => run_ask(&config, &query).await,
        Some(Commands::Completions { .. }) => Ok(()),
        None if tui_mode => run_tui(cli, config).await,
        None => run_headless(cli, config).await,
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = ragchat_config::load(cli.config.as_deref())?;
    if let Some(url) = &cli.endpoint {
        config.endpoint.base_url = url.clone();
    }
    tracing::debug!(url = %config.endpoint.query_url(), provider = %config.endpoint.provider, "configuration loaded");
    Ok(config)
}

fn dispatcher_for(config: &Config) -> anyhow::Result<Arc<dyn QueryDispatcher>> {
    let d = ragchat_client::from_config(&config.endpoint).context("creating query dispatcher")?;
    Ok(Arc::from(d))
}

// ── Modes ─────────────────────────────────────────────────────────────────────

async fn run_ask(config: &Config, query: &str) -> anyhow::Result<()> {
    let dispatcher = dispatcher_for(config)?;
    let mut session = Session::new();
    session.on_draft_change(query);
    let outcome = session.ask(dispatcher.as_ref()).await;
    if outcome == RoundOutcome::Rejected {
        anyhow::bail!("nothing to ask: the question is empty");
    }

    let reply = session.log().last().context("no reply recorded")?;
    headless::write_answer(&mut io::stdout().lock(), reply).context("writing answer")?;
    if outcome == RoundOutcome::Failed {
        anyhow::bail!("query to {} failed", dispatcher.target());
    }
    Ok(())
}

async fn run_headless(cli: Cli, config: Config) -> anyhow::Result<()> {
    let prompts = match cli.prompt {
        Some(p) => headless::prompts_from(&p),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            headless::prompts_from(&buf)
        }
    };
    if prompts.is_empty() {
        anyhow::bail!("no input: provide a PROMPT argument or pipe questions via stdin");
    }

    let dispatcher = dispatcher_for(&config)?;
    let mut session = Session::new();
    headless::run(&mut session, dispatcher.as_ref(), &prompts, &mut io::stdout().lock()).await
}

async fn run_tui(cli: Cli, config: Config) -> anyhow::Result<()> {
    use ratatui::crossterm::{
        event::{
            DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
            KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
        },
        execute,
    };

    let dispatcher = dispatcher_for(&config)?;

    let terminal = ratatui::init();
    let _ = execute!(std::io::stdout(), EnableMouseCapture, EnableBracketedPaste);
    // Needed for Shift+Enter to be distinguishable from Enter.
    let _ = execute!(
        std::io::stdout(),
        PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                | KeyboardEnhancementFlags::REPORT_ALTERNATE_KEYS
        )
    );

    let opts = AppOptions { initial_prompt: cli.prompt };
    let app = App::new(config.tui, dispatcher, opts);
    let result = app.run(terminal).await;

    let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
    let _ = execute!(std::io::stdout(), DisableBracketedPaste, DisableMouseCapture);
    ratatui::restore();

    result
}

// ── Logging ───────────────────────────────────────────────────────────────────

enum LogSink {
    Stderr,
    File(PathBuf),
}

fn default_log_path() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join("ragchat")
        .join("ragchat.log")
}

fn init_logging(verbosity: u8, sink: LogSink) -> anyhow::Result<()> {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    match sink {
        LogSink::Stderr => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
        LogSink::File(path) => {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("creating log directory {}", dir.display()))?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .with(filter)
                .init();
        }
    }
    Ok(())
}
