use std::io::{self, BufRead, Write};

use crate::Agent;

pub const PROMPT: &str = "> ";

pub const HINT: &str =
    "Type a question like: 'What's the weather today' or 'What's the weather in New York'";

/// What to do with one line of input
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Skip,
    Quit,
    Ask(&'a str),
}

fn parse_line(line: &str) -> Command<'_> {
    let line = line.trim();
    if line.is_empty() {
        Command::Skip
    } else if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
        Command::Quit
    } else {
        Command::Ask(line)
    }
}

/// Run a single utterance, turning a failed turn into a short user-safe message
pub async fn answer(agent: &dyn Agent, utterance: &str) -> String {
    match agent.execute(utterance).await {
        Ok(answer) => answer,
        Err(e) => {
            tracing::debug!(error = %e, "Turn failed");
            tracing::warn!(category = e.category(), "Turn failed");
            format!("Sorry, something went wrong ({}).", e.category())
        }
    }
}

/// Read questions from `input` until EOF or `quit`/`exit`, answering each one
pub async fn run_repl<R: BufRead, W: Write>(
    agent: &dyn Agent,
    mut input: R,
    output: &mut W,
) -> io::Result<()> {
    writeln!(output, "{}", HINT)?;

    let mut line = String::new();
    loop {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            break;
        }

        match parse_line(&line) {
            Command::Skip => continue,
            Command::Quit => break,
            Command::Ask(utterance) => {
                let reply = answer(agent, utterance).await;
                writeln!(output, "{}", reply)?;
            }
        }
    }

    Ok(())
}
