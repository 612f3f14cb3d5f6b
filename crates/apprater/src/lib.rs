//! Launch tracking and "rate this app" prompt timing.
//!
//! `apprater` keeps three persisted values per application (first launch
//! date, launch count, and a permanent-dismiss flag) and decides when it is
//! time to ask the user for a store rating. The dialog itself and the
//! hand-off to a store listing are collaborators behind traits, so the same
//! engine drives a terminal dialog, a GUI toolkit's modal, or a host's own
//! custom UI.
//!
//! # Getting started
//!
//! ```no_run
//! use apprater::prelude::*;
//!
//! fn main() -> Result<(), String> {
//!     let config = RaterConfig::new("com.example.notes")
//!         .with_days_until_prompt(3)
//!         .with_launches_until_prompt(7);
//!     let store = JsonFileStore::open(default_data_dir()?, DEFAULT_NAMESPACE)?;
//!
//!     let mut rater = AppRater::new(LaunchTracker::new(store), config)
//!         .with_listener(Box::new(LoggingListener));
//!
//!     // Call once per cold start.
//!     let mut surface = StdioSurface::stdio();
//!     let outcome = rater.on_application_start(&mut surface)?;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```
//!
//! # Where to find things
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`tracker`] | [`LaunchTracker`](tracker::LaunchTracker): launch counting and the prompt predicate |
//! | [`rater`] | [`AppRater`](rater::AppRater): the `Idle`/`Prompting` orchestrator |
//! | [`store`] | [`PreferenceStore`](store::PreferenceStore) trait, in-memory and JSON-file stores |
//! | [`prompt`] | [`PromptRequest`](prompt::PromptRequest), [`PromptAction`](prompt::PromptAction), [`ConfirmationSurface`](prompt::ConfirmationSurface) |
//! | [`navigator`] | store deep link → web URL → notice fallback |
//! | [`notice`] | transient user-visible notices |
//! | [`listener`] | host callbacks fired after each response |
//! | [`config`] | thresholds, app id, dialog strings, store links |
//! | [`clock`] | injectable time source |

pub mod clock;
pub mod config;
pub mod listener;
pub mod navigator;
pub mod notice;
pub mod prelude;
pub mod prompt;
pub mod rater;
pub mod store;
pub mod tracker;

use std::path::PathBuf;

/// Milliseconds in one day, the unit of the `days_until_prompt` gate.
pub const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Store namespace used when the host does not pick its own.
pub const DEFAULT_NAMESPACE: &str = "apprater.preferences";

/// Environment variable overriding [`default_data_dir`].
pub const DATA_DIR_ENV: &str = "APPRATER_DATA_DIR";

const DATA_DIR_NAME: &str = "apprater";

/// Resolve the per-user directory holding preference files.
///
/// Uses `$APPRATER_DATA_DIR` when set and non-empty, otherwise
/// `<platform data dir>/apprater`. The directory is not created here;
/// [`JsonFileStore`](store::JsonFileStore) creates it on first write.
pub fn default_data_dir() -> Result<PathBuf, String> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        let dir = dir.trim();
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    dirs::data_dir()
        .map(|base| base.join(DATA_DIR_NAME))
        .ok_or_else(|| "failed to resolve the user data directory".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_is_86_400_000_ms() {
        assert_eq!(DAY_MILLIS, 86_400_000);
    }

    #[test]
    fn default_namespace_is_stable() {
        // Changing this orphans every existing preference file.
        assert_eq!(DEFAULT_NAMESPACE, "apprater.preferences");
    }
}
