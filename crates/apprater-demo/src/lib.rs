//! Pieces of the sample host that are worth testing without a terminal.

use std::fmt::Display;
use std::path::Path;

use apprater::prelude::*;
use chrono::{DateTime, TimeZone};

/// Application id the demo rates when no config file names one.
pub const DEMO_APP_ID: &str = "com.simplaapliko.apprater.sample";

/// Thresholds low enough to see the prompt on the second run.
pub const DEMO_DAYS_UNTIL_PROMPT: u32 = 0;
pub const DEMO_LAUNCHES_UNTIL_PROMPT: u32 = 2;

/// The config file at `path` if given, otherwise the built-in demo config.
pub fn demo_config(path: Option<&Path>) -> Result<RaterConfig, String> {
    match path {
        Some(path) => RaterConfig::load(path),
        None => Ok(RaterConfig::new(DEMO_APP_ID)
            .with_days_until_prompt(DEMO_DAYS_UNTIL_PROMPT)
            .with_launches_until_prompt(DEMO_LAUNCHES_UNTIL_PROMPT)
            .with_prompt(
                PromptRequest::default()
                    .with_title("Enjoying the demo?")
                    .with_message(
                        "If you enjoy this sample app, please take a moment to rate it. \
                         Thanks for your support!",
                    ),
            )),
    }
}

/// "Tuesday, November 14, 2023"
pub fn long_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    date.format("%A, %B %-d, %Y").to_string()
}

pub fn describe_action(action: PromptAction) -> &'static str {
    match action {
        PromptAction::Accept => "Rate now",
        PromptAction::Defer => "Remind me later",
        PromptAction::Decline => "No, thanks",
        PromptAction::Cancelled => "Dialog closed",
    }
}

/// The tracked values, one per line, the way the sample screen shows them.
pub fn status_report<S: PreferenceStore>(
    tracker: &LaunchTracker<S>,
    config: &RaterConfig,
    format_date: impl Fn(DateTime<chrono::Utc>) -> String,
) -> Result<String, String> {
    let first_launch = match tracker.first_launch_date()? {
        Some(date) => format_date(date),
        None => "not set".to_string(),
    };
    let due = tracker.should_prompt(config.days_until_prompt, config.launches_until_prompt)?;
    Ok(format!(
        "First launch date: {first_launch}\n\
         Launch count: {}\n\
         Do not show again: {}\n\
         Is time to rate: {due}",
        tracker.launch_count()?,
        tracker.is_dismissed_permanently()?,
    ))
}
