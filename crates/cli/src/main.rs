mod render;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use judge_sync::{FileTokenStore, JudgeSync, PollCallbacks, PollOutcome, SyncConfig};
use sast_oj_api_types::SubmissionSnapshot;
use sast_oj_core::{ContestId, Language, Locale, ProblemId, SelfTestId, SubmissionId};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "sast-oj",
    version,
    about = "Submit solutions to the SAST online judge and follow their results"
)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true, default_value = "judge.toml", env = "SAST_OJ_CONFIG")]
    config: PathBuf,

    /// Language used for status labels.
    #[arg(long, global = true, value_enum, default_value_t = DisplayLocale::Zh)]
    locale: DisplayLocale,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a solution.
    Submit {
        #[arg(long)]
        contest: ContestId,
        #[arg(long)]
        problem: ProblemId,
        #[arg(long)]
        language: Language,
        #[arg(long)]
        file: PathBuf,
        /// Keep polling until the submission is judged.
        #[arg(long)]
        watch: bool,
    },
    /// Run the code against custom input and wait for the output.
    SelfTest {
        #[arg(long)]
        contest: ContestId,
        #[arg(long)]
        problem: ProblemId,
        #[arg(long)]
        language: Language,
        #[arg(long)]
        file: PathBuf,
        /// File fed to stdin; empty input when omitted.
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Follow an existing submission until it is judged.
    Watch {
        #[arg(long)]
        contest: ContestId,
        #[arg(long)]
        submission: SubmissionId,
    },
    /// Manage the stored login token.
    Token {
        #[arg(long, conflicts_with = "clear")]
        set: Option<String>,
        #[arg(long)]
        clear: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DisplayLocale {
    Zh,
    En,
}

impl From<DisplayLocale> for Locale {
    fn from(value: DisplayLocale) -> Self {
        match value {
            DisplayLocale::Zh => Locale::Chinese,
            DisplayLocale::En => Locale::English,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    let locale = Locale::from(cli.locale);

    match cli.command {
        Command::Submit {
            contest,
            problem,
            language,
            file,
            watch,
        } => {
            let sync = connect(&config)?;
            let code = read_source(&file)?;
            let submission_id = sync.submit(contest, problem, language, &code).await?;
            println!("submission: {submission_id}");
            if watch {
                watch_submission(&sync, contest, submission_id, locale).await?;
            }
        }
        Command::SelfTest {
            contest,
            problem,
            language,
            file,
            input,
        } => {
            let sync = connect(&config)?;
            let code = read_source(&file)?;
            let input = match input {
                Some(path) => read_source(&path)?,
                None => String::new(),
            };
            let self_test_id = sync
                .start_self_test(contest, problem, language, &code, &input)
                .await?;
            println!("self-test: {self_test_id}");
            watch_self_test(&sync, contest, self_test_id).await?;
        }
        Command::Watch {
            contest,
            submission,
        } => {
            let sync = connect(&config)?;
            watch_submission(&sync, contest, submission, locale).await?;
        }
        Command::Token { set, clear } => manage_token(&config, set.as_deref(), clear)?,
    }

    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<SyncConfig> {
    let config = if path.exists() {
        info!(path = %path.display(), "loading config");
        SyncConfig::from_file(path)?
    } else {
        warn!(path = %path.display(), "config file not found, using defaults");
        SyncConfig::default()
    };
    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}

fn connect(config: &SyncConfig) -> anyhow::Result<JudgeSync> {
    JudgeSync::new(config.clone()).context("failed to initialize judge client")
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn manage_token(config: &SyncConfig, set: Option<&str>, clear: bool) -> anyhow::Result<()> {
    let path = config
        .token_path()
        .context("no token_file configured and no user config directory available")?;
    let store = FileTokenStore::new(path);

    if let Some(token) = set {
        store.store(token)?;
        println!("token saved to {}", store.path().display());
    } else if clear {
        store.clear()?;
        println!("token removed from {}", store.path().display());
    } else {
        println!("token file: {}", store.path().display());
    }
    Ok(())
}

async fn watch_submission(
    sync: &JudgeSync,
    contest_id: ContestId,
    submission_id: SubmissionId,
    locale: Locale,
) -> anyhow::Result<()> {
    let callbacks = PollCallbacks::new().on_status_change(move |snapshot: &SubmissionSnapshot| {
        println!("status: {}", render::status_label(snapshot, locale));
    });
    let mut poller = sync
        .submission_poller(contest_id, submission_id.clone())
        .with_callbacks(callbacks);
    poller.start_polling();

    let outcome = tokio::select! {
        outcome = poller.join() => Some(outcome),
        _ = tokio::signal::ctrl_c() => None,
    };

    match outcome {
        Some(PollOutcome::Completed(_)) => {
            let submission = sync.submission_detail(contest_id, &submission_id).await?;
            render::print_submission(&submission, locale);
        }
        Some(PollOutcome::GaveUp { attempts }) => {
            println!("still judging after {attempts} checks, try `sast-oj watch` later");
        }
        Some(PollOutcome::Cancelled) => println!("polling cancelled"),
        None => {
            info!("shutdown signal received, stopping polling");
            poller.stop_polling();
        }
    }
    Ok(())
}

async fn watch_self_test(
    sync: &JudgeSync,
    contest_id: ContestId,
    self_test_id: SelfTestId,
) -> anyhow::Result<()> {
    let mut poller = sync.self_test_poller(contest_id, self_test_id);
    poller.start_polling();

    let outcome = tokio::select! {
        outcome = poller.join() => Some(outcome),
        _ = tokio::signal::ctrl_c() => None,
    };

    match outcome {
        Some(PollOutcome::Completed(snapshot)) => render::print_self_test(&snapshot),
        Some(PollOutcome::GaveUp { attempts }) => {
            println!("self-test produced no result after {attempts} checks");
        }
        Some(PollOutcome::Cancelled) => println!("polling cancelled"),
        None => {
            info!("shutdown signal received, stopping polling");
            poller.stop_polling();
        }
    }
    Ok(())
}
