//! Sample host application for `apprater`.
//!
//! Every run counts as one application launch. With the built-in config the
//! rating dialog appears from the second run on, until it is answered with
//! "Rate now" or "No, thanks".
//!
//! # Examples
//!
//! ```sh
//! # Normal start-up: record the launch, ask if due
//! apprater-demo
//!
//! # Ask now, whatever the thresholds say
//! apprater-demo --show
//!
//! # Print the tracked values
//! apprater-demo --status
//! ```

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use apprater::prelude::*;
use apprater_demo::{demo_config, describe_action, long_date, status_report};
use apprater_tui::TuiSurface;
use chrono::Local;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Sample host application for apprater.
#[derive(Parser)]
#[command(name = "apprater-demo")]
struct Cli {
    /// Show the rating dialog now without recording a launch
    #[arg(long, conflicts_with = "status")]
    show: bool,

    /// Print the tracked values and exit
    #[arg(long)]
    status: bool,

    /// JSON config file (default: built-in demo config)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding preference files
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = demo_config(cli.config.as_deref())?;
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    debug!(data_dir = %data_dir.display(), "opening demo preferences");
    let store = JsonFileStore::open(&data_dir, DEFAULT_NAMESPACE)?;
    let tracker = LaunchTracker::new(store);

    if cli.status {
        let report = status_report(&tracker, &config, |date| {
            long_date(&date.with_timezone(&Local))
        })?;
        println!("{report}");
        return Ok(());
    }

    // Notices stand in for a toast: collected during navigation, printed after.
    let notices = NoticeBuffer::new();
    let navigator =
        FallbackNavigator::new(config.store_links.clone()).with_notice_sink(notices.clone());
    let listener = FnListener::new(|action| println!("You chose: {}", describe_action(action)));
    let mut rater = AppRater::new(tracker, config)
        .with_navigator(navigator)
        .with_listener(Box::new(listener));

    let mut surface: Box<dyn ConfirmationSurface> = if std::io::stdout().is_terminal() {
        Box::new(TuiSurface::new())
    } else {
        Box::new(StdioSurface::stdio())
    };

    let resolution = if cli.show {
        Some(rater.show_prompt(surface.as_mut())?)
    } else {
        match rater.on_application_start(surface.as_mut())? {
            LaunchOutcome::Resolved(resolution) => Some(resolution),
            LaunchOutcome::NotDue | LaunchOutcome::AlreadyPrompting => {
                let count = rater.tracker().launch_count()?;
                println!("Launch #{count} recorded. No rating prompt this time.");
                None
            }
        }
    };

    if let Some(Resolution {
        action: PromptAction::Cancelled,
        ..
    }) = resolution
    {
        println!("Dialog closed; you will be asked again on the next launch.");
    }
    for notice in notices.drain() {
        println!("{}: {}", notice.title, notice.body);
    }
    Ok(())
}
