use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser, Subcommand};
use taskboard_shared::{TaskId, TaskPriority};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct PreprocessedArgs {
    pub cleaned_args: Vec<OsString>,
    pub rc_overrides: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "taskboard",
    version,
    about = "Taskboard: hosted task table and local book shelf from the terminal"
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append,
        global = true
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "taskboardrc", global = true)]
    pub taskboardrc: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Work with the hosted task table.
    #[command(subcommand)]
    Tasks(TasksCommand),
    /// Work with the built-in book collection.
    #[command(subcommand)]
    Books(BooksCommand),
}

#[derive(Subcommand, Debug, Clone)]
pub enum TasksCommand {
    /// List tasks, newest first.
    List,
    /// Add a task.
    Add {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value_t = TaskPriority::Medium)]
        priority: TaskPriority,
    },
    /// Change the title, description or priority of a task.
    Edit {
        id: TaskId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<TaskPriority>,
    },
    /// Delete a task.
    Delete { id: TaskId },
}

#[derive(Subcommand, Debug, Clone)]
pub enum BooksCommand {
    /// List the book collection.
    List,
    /// Edit one book for this session and print the collection.
    Edit {
        id: u32,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
        /// Read like a number field: leading integer, otherwise empty.
        #[arg(long, allow_hyphen_values = true)]
        year: Option<String>,
    },
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

/// Pulls positional `rc.key=value` / `rc.key:value` overrides out of the
/// argument list before clap sees it.
#[tracing::instrument(skip_all)]
pub fn preprocess_args(raw: &[OsString]) -> anyhow::Result<PreprocessedArgs> {
    let mut cleaned = Vec::with_capacity(raw.len());
    let mut overrides: Vec<(String, String)> = Vec::new();

    let mut iter = raw.iter().cloned();
    if let Some(bin) = iter.next() {
        cleaned.push(bin);
    }

    for arg in iter {
        let s = arg.to_string_lossy();
        if let Some(rest) = s.strip_prefix("rc.") {
            let parsed = if let Some((k, v)) = rest.split_once('=') {
                Some((format!("rc.{k}"), v.to_string()))
            } else if let Some((k, v)) = rest.split_once(':') {
                Some((format!("rc.{k}"), v.to_string()))
            } else {
                None
            };

            if let Some((k, v)) = parsed {
                debug!(key = %k, "captured positional rc override");
                overrides.push((k, v));
                continue;
            }
        }

        cleaned.push(arg);
    }

    Ok(PreprocessedArgs {
        cleaned_args: cleaned,
        rc_overrides: overrides,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<OsString> {
        items.iter().map(OsString::from).collect()
    }

    #[test]
    fn positional_overrides_are_extracted() {
        let pre = preprocess_args(&args(&[
            "taskboard",
            "rc.panel.single_flight=on",
            "tasks",
            "rc.remote.table:chores",
            "list",
        ]))
        .expect("preprocess");

        assert_eq!(pre.cleaned_args, args(&["taskboard", "tasks", "list"]));
        assert_eq!(
            pre.rc_overrides,
            vec![
                ("rc.panel.single_flight".to_string(), "on".to_string()),
                ("rc.remote.table".to_string(), "chores".to_string()),
            ]
        );
    }

    #[test]
    fn parses_task_add_with_priority() {
        let cli = GlobalCli::try_parse_from([
            "taskboard",
            "tasks",
            "add",
            "Call dentist",
            "--priority",
            "high",
        ])
        .expect("parse");

        match cli.command {
            Command::Tasks(TasksCommand::Add {
                title,
                description,
                priority,
            }) => {
                assert_eq!(title, "Call dentist");
                assert_eq!(description, "");
                assert_eq!(priority, TaskPriority::High);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_priority() {
        let parsed = GlobalCli::try_parse_from([
            "taskboard",
            "tasks",
            "add",
            "x",
            "--priority",
            "urgent",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn book_year_keeps_raw_text() {
        let cli = GlobalCli::try_parse_from(["taskboard", "books", "edit", "2", "--year", "abc"])
            .expect("parse");
        match cli.command {
            Command::Books(BooksCommand::Edit { id, year, .. }) => {
                assert_eq!(id, 2);
                assert_eq!(year.as_deref(), Some("abc"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
