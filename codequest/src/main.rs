//! codequest: practice Rust challenges from the terminal.
//!
//! Challenges are loaded from the content directory, progress is saved to the
//! data directory, and tests run against the configured execution backend
//! (or a local mock when none is configured).

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::broadcast;
use tracing::info;

use codequest::{logging, ConfigArgs, Session};
use codequest_content::{Catalog, Challenge, TestRunResult};
use codequest_progress::{FileBackend, ProgressEvent, ProgressStore};
use codequest_runner::{CancellationSource, TestRunner};

#[derive(Parser)]
#[command(name = "codequest")]
#[command(about = "Interactive Rust practice challenges")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List challenges with their status
    List,
    /// Show a challenge
    Show {
        id: String,
        /// Print the challenge as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check a step against your code
    Check {
        id: String,
        /// Step index as shown by `show`
        step: usize,
        /// File holding your code
        #[arg(long)]
        code: PathBuf,
        /// Last terminal command you ran
        #[arg(long)]
        command: Option<String>,
    },
    /// Run the challenge tests (Ctrl-C cancels)
    Run {
        id: String,
        /// File holding your code
        #[arg(long)]
        code: PathBuf,
    },
    /// Show saved progress
    Progress,
    /// Forget progress on a challenge
    Reset { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logging::init(cli.log_json);

    let config = cli.config.resolve();
    info!(
        content_dir = %config.content_dir.display(),
        data_dir = %config.data_dir.display(),
        mock = config.runner.is_mock(),
        "Starting codequest"
    );

    let catalog = Catalog::load_dir(&config.content_dir)
        .with_context(|| format!("loading challenges from {}", config.content_dir.display()))?;
    let runner = TestRunner::from_config(&config.runner).context("creating test runner")?;
    let store = ProgressStore::open(Box::new(FileBackend::new(config.data_dir)));
    let mut session = Session::new(catalog, runner, store);
    let mut events = session.subscribe_progress();

    let result = execute(&mut session, cli.command).await;
    report_save_events(&mut events);
    result
}

async fn execute(session: &mut Session, command: Command) -> anyhow::Result<()> {
    match command {
        Command::List => {
            for challenge in session.catalog().challenges() {
                let status = if session.progress().is_completed(&challenge.id) {
                    "done"
                } else if !session.missing_prerequisites(&challenge.id)?.is_empty() {
                    "locked"
                } else {
                    "open"
                };
                let difficulty = format!("{:?}", challenge.difficulty).to_lowercase();
                println!(
                    "{:<24} {:<8} {:<12} {}",
                    challenge.id, status, difficulty, challenge.title
                );
            }
        }
        Command::Show { id, json } => {
            let challenge = find(session, &id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(challenge)?);
            } else {
                print_challenge(challenge);
            }
        }
        Command::Check {
            id,
            step,
            code,
            command,
        } => {
            let code = read_code(&code)?;
            let check = session.check_step(&id, step, &code, command.as_deref())?;
            if check.outcome.satisfied {
                println!("Step {} passed.", step);
                if let Some(message) = &check.outcome.completion_message {
                    println!("{}", message);
                }
                if check.challenge_completed {
                    println!("Challenge {} completed!", id);
                }
            } else {
                println!("Not yet.");
                if let Some(hint) = &check.outcome.hint {
                    println!("Hint: {}", hint);
                }
            }
        }
        Command::Run { id, code } => {
            let code = read_code(&code)?;
            let source = CancellationSource::new();
            let token = source.token();
            let ctrl_c = tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    source.cancel();
                }
            });

            println!("Running tests on {}...", session.runner().backend_id());
            let result = session.run_tests(&id, &code, &token).await;
            ctrl_c.abort();

            let result = result?;
            print_run(find(session, &id)?, &result);
        }
        Command::Progress => {
            let progress = session.progress();
            println!(
                "{} of {} challenges completed",
                progress.completed_count(),
                session.catalog().len()
            );
            for entry in progress.challenges.values() {
                let completed_at = entry
                    .completed_at
                    .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<24} attempts={:<4} time={}s completed={}",
                    entry.challenge_id, entry.attempts, entry.time_spent, completed_at
                );
            }
        }
        Command::Reset { id } => {
            session.reset_challenge(&id)?;
            println!("Progress on {} reset.", id);
        }
    }
    Ok(())
}

fn find<'a>(session: &'a Session, id: &str) -> anyhow::Result<&'a Challenge> {
    session
        .catalog()
        .get(id)
        .with_context(|| format!("unknown challenge: {}", id))
}

fn read_code(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn print_challenge(challenge: &Challenge) {
    println!("{} ({:?})", challenge.title, challenge.difficulty);
    if !challenge.description.is_empty() {
        println!("\n{}", challenge.description);
    }
    for (index, step) in challenge.steps.iter().enumerate() {
        println!("\n[{}] {}", index, step.title);
        if !step.instruction.is_empty() {
            println!("   {}", step.instruction);
        }
    }
    println!("\nTests:");
    for test in challenge.visible_tests() {
        println!("  - {} [{}] {}", test.name, test.test_type, test.description);
    }
    if !challenge.starter_code.is_empty() {
        println!("\nStarter code:\n{}", challenge.starter_code);
    }
}

fn print_run(challenge: &Challenge, result: &TestRunResult) {
    if let Some(error) = &result.execution_error {
        println!("Execution failed: {}", error);
    }
    if let Some(error) = &result.compilation_error {
        println!("Compilation error:\n{}", error);
    }
    for (test, outcome) in challenge.tests.iter().zip(&result.results) {
        let name = if test.hidden { "hidden test" } else { outcome.name.as_str() };
        if outcome.passed {
            println!("  PASS {}", name);
        } else {
            println!("  FAIL {}: {}", name, outcome.error.as_deref().unwrap_or("failed"));
        }
    }
    println!(
        "{}/{} passed{}",
        result.passed_count(),
        result.results.len(),
        if result.success { ", challenge completed!" } else { "" }
    );
}

fn report_save_events(events: &mut broadcast::Receiver<ProgressEvent>) {
    while let Ok(event) = events.try_recv() {
        match event {
            ProgressEvent::SaveFailed { reason } => {
                eprintln!("Warning: progress could not be saved ({}), it is kept for this session only", reason);
            }
            ProgressEvent::SaveRecovered => eprintln!("Progress saving recovered."),
        }
    }
}
