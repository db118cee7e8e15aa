//! Command line interface.
//!
//! Operation flags compose in a fixed order regardless of how they are
//! written on the command line: clone, pull, commit, push, status. With
//! no operation flags the help text is printed and the process exits
//! successfully.

use std::path::PathBuf;
use std::process::exit;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use crate::application::{CommitOutcome, RepoSession};
use crate::common::RepomgrResult;
use crate::infrastructure::filesystem::ConfigStore;
use crate::presentation::ui::display;
use crate::presentation::ui::ProgressReporter;

/// repomgr - configuration-driven git repository automation
#[derive(Parser, Debug)]
#[command(name = "repomgr")]
#[command(about = "Automates clone, commit, push, pull, and status for a configured repository")]
#[command(version)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "REPOMGR_CONFIG", default_value = "config.yaml")]
    pub config: PathBuf,

    /// Clone the configured repository (opens it when already present)
    #[arg(long)]
    pub clone: bool,

    /// Remove an existing target directory and clone fresh (implies --clone)
    #[arg(long)]
    pub force_clone: bool,

    /// Pull: fetch the remote and fast-forward the configured branch
    #[arg(long)]
    pub pull: bool,

    /// Stage all changes and commit with the given message
    #[arg(long, value_name = "MESSAGE")]
    pub commit: Option<String>,

    /// Push the configured branch to the remote
    #[arg(long)]
    pub push: bool,

    /// Print the working tree status
    #[arg(long)]
    pub status: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Disable the clone progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl Cli {
    fn has_operation(&self) -> bool {
        self.clone
            || self.force_clone
            || self.pull
            || self.commit.is_some()
            || self.push
            || self.status
    }
}

/// CLI application runner.
pub struct CliApp {
    cli: Cli,
}

impl CliApp {
    /// Parse arguments from the process environment.
    pub fn new() -> Self {
        Self { cli: Cli::parse() }
    }

    /// Execute the requested operations.
    pub fn run(self) -> anyhow::Result<()> {
        init_tracing(self.cli.verbose);

        if self.cli.no_color {
            colored::control::set_override(false);
        }

        if !self.cli.has_operation() {
            Cli::command().print_help()?;
            println!();
            return Ok(());
        }

        match self.execute() {
            Ok(()) => Ok(()),
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
                exit(1);
            }
        }
    }

    fn execute(&self) -> RepomgrResult<()> {
        let config = ConfigStore::load(&self.cli.config)?;
        let mut session = RepoSession::new(config)?;

        if self.cli.clone || self.cli.force_clone {
            if self.cli.no_progress {
                session.clone(self.cli.force_clone, None)?;
            } else {
                let mut reporter = ProgressReporter::stdout();
                let mut sink = |event| reporter.handle(event);
                session.clone(self.cli.force_clone, Some(&mut sink))?;
            }
            println!("{}", "Repository ready".green());
        }

        if self.cli.pull {
            session.pull(None, None)?;
            println!("{}", "Pull complete".green());
        }

        if let Some(message) = &self.cli.commit {
            match session.commit(message, None)? {
                CommitOutcome::Created { id } => {
                    println!("{} {}", "Committed".green(), id);
                }
                CommitOutcome::NoChanges => {
                    println!("Nothing to commit, working tree clean");
                }
            }
        }

        if self.cli.push {
            session.push(None, None)?;
            println!("{}", "Push complete".green());
        }

        if self.cli.status {
            let status = session.status()?;
            print!("{}", display::render_status(&status));
        }

        Ok(())
    }
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
