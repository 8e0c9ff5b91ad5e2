use std::fmt::Write as _;
use std::io::{self, Write};

use clap::{CommandFactory, Parser, Subcommand};
use sitewatch_core::session::Session;
use sitewatch_core::traits::{Fetcher, ListingParser, ListingStore};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::output::write_tsv;

pub const PROMPT: &str = "-> ";

#[derive(Parser, Debug)]
#[command(multicall = true, disable_help_subcommand = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    /// Set the root URL of the listing to watch
    #[command(name = "set-url", visible_alias = "url")]
    SetUrl { url: String },

    /// Set the refresh interval in whole minutes
    #[command(name = "set-interval", visible_alias = "interval")]
    SetInterval {
        #[arg(allow_hyphen_values = true)]
        minutes: String,
    },

    /// Start crawling the configured URL
    Start,

    /// Stop rediscovering pages; queued pages still drain
    Stop,

    /// Show the crawl state
    Status,

    /// Run raw SQL against the listing store
    Query {
        #[arg(
            required = true,
            num_args = 1..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        text: Vec<String>,
    },

    /// List commands
    Help,

    /// Stop everything and leave
    #[command(visible_alias = "quit")]
    Exit,
}

/// One parsed operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetUrl(String),
    SetInterval(String),
    Start,
    Stop,
    Status,
    /// Everything after the command word, untouched.
    Query(String),
    Help,
    Exit,
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>, clap::Error> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(word) = tokens.first() else {
        return Ok(None);
    };

    let command = match ShellLine::try_parse_from(tokens.iter().copied())?.command {
        ShellCommand::SetUrl { url } => Command::SetUrl(url),
        ShellCommand::SetInterval { minutes } => Command::SetInterval(minutes),
        ShellCommand::Start => Command::Start,
        ShellCommand::Stop => Command::Stop,
        ShellCommand::Status => Command::Status,
        ShellCommand::Query { .. } => {
            let rest = line.trim_start()[word.len()..].trim();
            Command::Query(rest.to_string())
        }
        ShellCommand::Help => Command::Help,
        ShellCommand::Exit => Command::Exit,
    };
    Ok(Some(command))
}

fn help_text() -> String {
    let mut text = String::from("Commands:\n");
    for sub in ShellLine::command().get_subcommands() {
        let mut name = sub.get_name().to_string();
        for alias in sub.get_visible_aliases() {
            let _ = write!(name, ", {alias}");
        }
        let about = sub.get_about().map(ToString::to_string).unwrap_or_default();
        let _ = writeln!(text, "  {name:<20}{about}");
    }
    text
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Line-oriented operator shell driving a [`Session`].
pub struct Shell<F, P, S>
where
    F: Fetcher + 'static,
    P: ListingParser + 'static,
    S: ListingStore + 'static,
{
    session: Session<F, P, S>,
}

impl<F, P, S> Shell<F, P, S>
where
    F: Fetcher + 'static,
    P: ListingParser + 'static,
    S: ListingStore + 'static,
{
    pub fn new(session: Session<F, P, S>) -> Self {
        Self { session }
    }

    /// Read commands until `exit`, EOF or Ctrl-C, then shut the session down.
    pub async fn run<R, W>(mut self, input: R, mut out: W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let result = self.repl(input, &mut out).await;
        self.session.shutdown().await;
        result
    }

    async fn repl<R, W>(&mut self, input: R, out: &mut W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();
        loop {
            write!(out, "{PROMPT}")?;
            out.flush()?;

            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = tokio::signal::ctrl_c() => {
                    writeln!(out)?;
                    None
                }
            };
            let Some(line) = line else {
                return Ok(());
            };

            match parse_line(&line) {
                Ok(None) => {}
                Ok(Some(command)) => {
                    if self.execute(command, out).await? == Flow::Exit {
                        return Ok(());
                    }
                }
                Err(e) => write!(out, "{}", e.render())?,
            }
        }
    }

    /// Run one command, writing its outcome to `out`.
    pub async fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<Flow> {
        match command {
            Command::SetUrl(url) => match self.session.set_url(&url) {
                Ok(()) => writeln!(out, "url set to {}", url.trim())?,
                Err(e) => writeln!(out, "error: {e}")?,
            },
            Command::SetInterval(text) => match self.session.set_interval_text(&text) {
                Ok(()) => writeln!(out, "interval set to {} min", text.trim())?,
                Err(e) => writeln!(out, "error: {e}")?,
            },
            Command::Start => match self.session.start() {
                Ok(run_id) => writeln!(out, "started crawl {run_id}")?,
                Err(e) => writeln!(out, "error: {e}")?,
            },
            Command::Stop => match self.session.stop().await {
                Ok(run_id) => writeln!(out, "stopped crawl {run_id}")?,
                Err(e) => writeln!(out, "error: {e}")?,
            },
            Command::Status => {
                let status = self.session.status();
                writeln!(out, "state: {}", status.state)?;
                writeln!(out, "url: {}", status.root_url.as_deref().unwrap_or("-"))?;
                match status.interval {
                    Some(interval) => writeln!(out, "interval: {} min", interval.as_secs() / 60)?,
                    None => writeln!(out, "interval: -")?,
                }
                if let (Some(run_id), Some(started_at)) = (status.run_id, status.started_at) {
                    writeln!(out, "run: {run_id} (started {})", started_at.to_rfc3339())?;
                }
                writeln!(out, "draining pools: {}", status.draining_pools)?;
            }
            Command::Query(text) => match self.session.query(&text).await {
                Ok(result) => write_tsv(&result, &mut *out)?,
                Err(e) => writeln!(out, "error: {e}")?,
            },
            Command::Help => write!(out, "{}", help_text())?,
            Command::Exit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }
}
