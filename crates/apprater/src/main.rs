//! Inspect and drive the rating-prompt state of an application from the
//! command line.
//!
//! State lives in the same JSON preference file a host application uses, so
//! this tool can seed, inspect, or reset it.
//!
//! # Examples
//!
//! ```sh
//! # Record a launch and report whether the prompt is now due
//! apprater --config notes.json launch
//!
//! # Show tracked values as JSON
//! apprater --json status
//!
//! # Evaluate the predicate with ad-hoc thresholds
//! apprater should-prompt --days 0 --launches 2
//!
//! # Ask the question on the terminal, due or not
//! apprater --app-id com.example.notes prompt --force
//!
//! # Restart the cycle / never ask again / open the store listing
//! apprater remind-later
//! apprater dismiss
//! apprater --app-id com.example.notes rate
//! ```

use std::path::PathBuf;
use std::process;

use apprater::prelude::*;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Inspect and drive the rating-prompt state of an application.
#[derive(Parser)]
#[command(name = "apprater", version)]
struct Cli {
    // ── Storage ────────────────────────────────────────────────
    /// Directory holding preference files (default: $APPRATER_DATA_DIR or
    /// the platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Preference namespace (file name without `.json`)
    #[arg(long, global = true, default_value = DEFAULT_NAMESPACE)]
    namespace: String,

    // ── Configuration ──────────────────────────────────────────
    /// JSON config file with app id, thresholds, and dialog strings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Application id; overrides the config file
    #[arg(long, global = true)]
    app_id: Option<String>,

    // ── Output ─────────────────────────────────────────────────
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record one application launch and report whether the prompt is due
    Launch,
    /// Show the tracked values
    Status,
    /// Evaluate the prompt predicate without changing anything
    ShouldPrompt {
        /// Days threshold (default: from config)
        #[arg(long)]
        days: Option<u32>,
        /// Launches threshold (default: from config)
        #[arg(long)]
        launches: Option<u32>,
    },
    /// Record a launch and ask on the terminal if the prompt is due
    Prompt {
        /// Ask now without recording a launch, whatever the thresholds say
        #[arg(long)]
        force: bool,
    },
    /// Restart the cycle: zero launches, first launch = now
    RemindLater,
    /// Never show the prompt again
    Dismiss,
    /// Dismiss for good and open the store listing
    Rate,
}

// ── Output records ─────────────────────────────────────────────────

#[derive(Serialize)]
struct Status {
    first_launch_date: Option<String>,
    launch_count: u32,
    do_not_show_again: bool,
    prompt_due: bool,
}

#[derive(Serialize)]
struct LaunchReport {
    launch_count: u32,
    prompt_due: bool,
}

/// Where the line dialog is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DialogStream {
    Stdout,
    /// Used with `--json` so stdout carries nothing but the result.
    Stderr,
}

impl DialogStream {
    fn for_output(json: bool) -> Self {
        if json { Self::Stderr } else { Self::Stdout }
    }

    fn surface(self) -> Box<dyn ConfirmationSurface> {
        match self {
            Self::Stdout => Box::new(StdioSurface::stdio()),
            Self::Stderr => Box::new(StdioSurface::stderr()),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "apprater=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(cli: &Cli) -> Result<RaterConfig, String> {
    let mut config = match &cli.config {
        Some(path) => RaterConfig::load(path)?,
        None => RaterConfig::default(),
    };
    if let Some(app_id) = &cli.app_id {
        config.app_id = app_id.clone();
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<(), String> {
    let config = load_config(&cli)?;
    let data_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => default_data_dir()?,
    };
    let store = JsonFileStore::open(&data_dir, &cli.namespace)?;
    let mut tracker = LaunchTracker::new(store);
    let json = cli.json;

    match cli.command {
        Command::Launch => {
            tracker.record_launch()?;
            let report = LaunchReport {
                launch_count: tracker.launch_count()?,
                prompt_due: tracker
                    .should_prompt(config.days_until_prompt, config.launches_until_prompt)?,
            };
            emit(json, &report, || {
                format!(
                    "launch #{} recorded; prompt {}",
                    report.launch_count,
                    if report.prompt_due { "due" } else { "not due" }
                )
            })
        }
        Command::Status => {
            let status = status(&tracker, &config)?;
            emit(json, &status, || {
                format!(
                    "first launch:      {}\nlaunch count:      {}\ndo not show again: {}\nprompt due:        {}",
                    status.first_launch_date.as_deref().unwrap_or("not set"),
                    status.launch_count,
                    status.do_not_show_again,
                    status.prompt_due,
                )
            })
        }
        Command::ShouldPrompt { days, launches } => {
            let days = days.unwrap_or(config.days_until_prompt);
            let launches = launches.unwrap_or(config.launches_until_prompt);
            let due = tracker.should_prompt(days, launches)?;
            emit(json, &due, || due.to_string())
        }
        Command::Prompt { force } => {
            config.validate()?;
            let mut rater = AppRater::new(tracker, config).with_listener(Box::new(LoggingListener));
            let mut dialog = DialogStream::for_output(json).surface();
            let surface = dialog.as_mut();
            if force {
                let resolution = rater.show_prompt(surface)?;
                emit(json, &resolution, || describe_resolution(&resolution))
            } else {
                let outcome = rater.on_application_start(surface)?;
                emit(json, &outcome, || match &outcome {
                    LaunchOutcome::NotDue => "launch recorded; prompt not due".to_string(),
                    LaunchOutcome::AlreadyPrompting => "a prompt is already open".to_string(),
                    LaunchOutcome::Resolved(resolution) => describe_resolution(resolution),
                })
            }
        }
        Command::RemindLater => {
            tracker.reset()?;
            let status = status(&tracker, &config)?;
            emit(json, &status, || "launch tracking reset".to_string())
        }
        Command::Dismiss => {
            tracker.dismiss_permanently()?;
            let status = status(&tracker, &config)?;
            emit(json, &status, || "prompt dismissed permanently".to_string())
        }
        Command::Rate => {
            config.validate()?;
            let mut rater = AppRater::new(tracker, config);
            let outcome = rater.rate_app()?;
            emit(json, &outcome, || describe_navigation(&outcome))
        }
    }
}

fn status<S: PreferenceStore>(
    tracker: &LaunchTracker<S>,
    config: &RaterConfig,
) -> Result<Status, String> {
    let record = tracker.record()?;
    Ok(Status {
        first_launch_date: tracker.first_launch_date()?.map(|d| d.to_rfc3339()),
        launch_count: record.launch_count,
        do_not_show_again: record.do_not_show_again,
        prompt_due: record.is_due(
            tracker.now_millis(),
            config.days_until_prompt,
            config.launches_until_prompt,
        ),
    })
}

fn describe_resolution(resolution: &Resolution) -> String {
    let answer = match resolution.action {
        PromptAction::Accept => "rate now",
        PromptAction::Defer => "remind me later",
        PromptAction::Decline => "no, thanks",
        PromptAction::Cancelled => "cancelled",
    };
    match &resolution.navigation {
        Some(outcome) => format!("answer: {answer}; {}", describe_navigation(outcome)),
        None => format!("answer: {answer}"),
    }
}

fn describe_navigation(outcome: &NavigationOutcome) -> String {
    match outcome {
        NavigationOutcome::StoreApp(url) => format!("opened store app: {url}"),
        NavigationOutcome::Web(url) => format!("opened browser: {url}"),
        NavigationOutcome::Unavailable => "no store or browser available".to_string(),
    }
}

/// Print `value` as JSON, or the human-readable text.
fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<(), String> {
    if json {
        let out = serde_json::to_string_pretty(value)
            .map_err(|e| format!("failed to serialize output: {e}"))?;
        println!("{out}");
    } else {
        println!("{}", text());
    }
    Ok(())
}
