// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};

#[derive(Parser, Debug)]
#[command(
    name = "ragchat",
    about = "Terminal chat client for retrieval-augmented question answering services",
    version,
    long_about = None,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Question to send as soon as the session starts
    #[arg(value_name = "PROMPT")]
    pub prompt: Option<String>,

    /// Run without the TUI: read questions (one per line) from PROMPT or
    /// stdin and print the conversation to stdout
    #[arg(long, short = 'H')]
    pub headless: bool,

    /// Base URL of the answering service, e.g. "http://localhost:5000"
    #[arg(long, short = 'e', env = "RAGCHAT_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Path to config file (overrides auto-discovery)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Where to write logs while the TUI is running
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Print the effective configuration and exit
    ShowConfig,
    /// Ask a single question and print only the answer and its sources
    Ask {
        /// The question
        query: String,
    },
}

impl Cli {
    /// Headless is triggered by --headless or when stdin is not a terminal.
    pub fn is_headless(&self) -> bool {
        self.headless || !std::io::stdin().is_terminal()
    }
}

pub fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "ragchat", &mut std::io::stdout());
}
