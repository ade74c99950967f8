//! Line-oriented driver: same session, plain text in and out.

use std::io::Write;

use anyhow::Context;
use ragchat_client::QueryDispatcher;
use ragchat_core::{Role, Session, Turn};

/// Blank lines are not questions.
pub fn prompts_from(input: &str) -> Vec<String> {
    input
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect()
}

fn heading(role: Role) -> &'static str {
    match role {
        Role::User => "## You",
        Role::Assistant => "## Assistant",
    }
}

/// Write one turn in conversation format.
pub fn write_turn(out: &mut impl Write, turn: &Turn) -> std::io::Result<()> {
    writeln!(out, "{}\n", heading(turn.role()))?;
    writeln!(out, "{}\n", turn.text().trim_end())?;
    write_sources(out, turn)
}

/// Answer text and sources only, for `ask`.
pub fn write_answer(out: &mut impl Write, turn: &Turn) -> std::io::Result<()> {
    writeln!(out, "{}", turn.text().trim_end())?;
    if !turn.sources().is_empty() {
        writeln!(out)?;
    }
    write_sources(out, turn)
}

fn write_sources(out: &mut impl Write, turn: &Turn) -> std::io::Result<()> {
    if turn.sources().is_empty() {
        return Ok(());
    }
    writeln!(out, "Sources:")?;
    for src in turn.sources() {
        writeln!(out, "- {src}")?;
    }
    writeln!(out)
}

/// Run every prompt through `session` in order and print each round as it
/// settles.
pub async fn run(
    session: &mut Session,
    dispatcher: &dyn QueryDispatcher,
    prompts: &[String],
    out: &mut impl Write,
) -> anyhow::Result<()> {
    for prompt in prompts {
        let before = session.log().len();
        session.on_draft_change(prompt.clone());
        if !session.ask(dispatcher).await.settled() {
            continue;
        }
        for turn in session.log().iter().skip(before) {
            write_turn(out, turn).context("writing transcript")?;
        }
        out.flush().context("flushing stdout")?;
    }
    Ok(())
}
