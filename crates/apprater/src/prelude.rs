//! Convenience re-exports for common `apprater` types.
//!
//! ```ignore
//! use apprater::prelude::*;
//! ```
//!
//! Covers what a host needs to wire the prompt into its startup path.
//! Collaborator internals (URL launchers, raw preference keys) stay in their
//! modules.

// ── Engine ──────────────────────────────────────────────────────────
pub use crate::rater::{AppRater, LaunchOutcome, PromptState, Resolution};
pub use crate::tracker::{LaunchRecord, LaunchTracker};

// ── Configuration ───────────────────────────────────────────────────
pub use crate::config::{RaterConfig, StoreLinks};
pub use crate::{DAY_MILLIS, DEFAULT_NAMESPACE, default_data_dir};

// ── Persistence and time ────────────────────────────────────────────
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::store::{JsonFileStore, MemoryStore, PreferenceStore};

// ── Prompt and collaborators ────────────────────────────────────────
pub use crate::listener::{FnListener, LoggingListener, NoopListener, PromptListener};
pub use crate::navigator::{FallbackNavigator, NavigationOutcome, StoreNavigator};
pub use crate::notice::{Notice, NoticeBuffer, NoticeLevel, NoticeSink};
pub use crate::prompt::{ConfirmationSurface, PromptAction, PromptRequest, StdioSurface};
