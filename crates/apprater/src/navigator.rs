//! Hand-off to the store listing after the user accepts the prompt.
//!
//! [`FallbackNavigator`] tries, in order:
//!
//! 1. the store application's deep link (`market://details?id=...`),
//! 2. the listing's web page in a browser,
//! 3. nothing: a short [`Notice`] tells the user no store could be opened.
//!
//! Navigation is one-shot and best-effort. Nothing is retried and nothing is
//! persisted about a failure.

use std::io;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::JoinHandle;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::StoreLinks;
use crate::notice::{LogNoticeSink, Notice, NoticeLevel, NoticeSink};

/// Body of the notice emitted when neither target can be opened.
pub const UNABLE_TO_OPEN_STORE: &str = "Unable to find an app store or browser to open the listing.";

/// Where the user ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "target", content = "url", rename_all = "snake_case")]
pub enum NavigationOutcome {
    /// The store application was opened.
    StoreApp(String),
    /// The web listing was opened in a browser.
    Web(String),
    /// No target could be opened; a notice was emitted.
    Unavailable,
}

impl NavigationOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }
}

/// Opens a store listing for an application id.
pub trait StoreNavigator {
    fn open_listing(&self, app_id: &str) -> NavigationOutcome;
}

/// Platform URL opener.
pub trait UrlLauncher {
    /// Whether some installed handler can open `url`.
    fn can_open(&self, url: &str) -> bool;

    /// Open `url` with its handler.
    fn open(&self, url: &str) -> Result<(), String>;
}

// ── Fallback navigator ────────────────────────────────────────────────

/// Store app → browser → notice.
pub struct FallbackNavigator {
    links: StoreLinks,
    launcher: Box<dyn UrlLauncher>,
    notices: Box<dyn NoticeSink>,
}

impl FallbackNavigator {
    /// Navigator using the platform launcher and logging notices.
    pub fn new(links: StoreLinks) -> Self {
        Self::with_launcher(links, SystemLauncher)
    }

    pub fn with_launcher(links: StoreLinks, launcher: impl UrlLauncher + 'static) -> Self {
        Self {
            links,
            launcher: Box::new(launcher),
            notices: Box::new(LogNoticeSink),
        }
    }

    pub fn with_notice_sink(mut self, sink: impl NoticeSink + 'static) -> Self {
        self.notices = Box::new(sink);
        self
    }

    fn try_open(&self, url: &str) -> bool {
        if !self.launcher.can_open(url) {
            debug!(url, "no handler for url");
            return false;
        }
        match self.launcher.open(url) {
            Ok(()) => true,
            Err(e) => {
                warn!(url, error = %e, "failed to open url");
                false
            }
        }
    }
}

impl StoreNavigator for FallbackNavigator {
    fn open_listing(&self, app_id: &str) -> NavigationOutcome {
        let deep_link = self.links.deep_link(app_id);
        if self.try_open(&deep_link) {
            info!(url = %deep_link, "opened store listing");
            return NavigationOutcome::StoreApp(deep_link);
        }

        let web_url = self.links.web_url(app_id);
        if self.try_open(&web_url) {
            info!(url = %web_url, "opened store listing in browser");
            return NavigationOutcome::Web(web_url);
        }

        warn!(app_id, "no store or browser available for the listing");
        self.notices.notify(&Notice::new(
            NoticeLevel::Warning,
            Some("Store unavailable"),
            UNABLE_TO_OPEN_STORE,
        ));
        NavigationOutcome::Unavailable
    }
}

// ── System launcher ───────────────────────────────────────────────────

/// Opens URLs with the desktop's default handler (`xdg-open`, `open`, or
/// `start`).
///
/// On Linux `can_open` asks `xdg-mime` for a handler of the URL's scheme.
/// Elsewhere only `http`/`https` are assumed openable, since there is no
/// cheap way to probe custom schemes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl UrlLauncher for SystemLauncher {
    fn can_open(&self, url: &str) -> bool {
        let Some(scheme) = url_scheme(url) else {
            return false;
        };
        if cfg!(target_os = "linux") {
            has_xdg_handler(&scheme)
        } else {
            scheme == "http" || scheme == "https"
        }
    }

    fn open(&self, url: &str) -> Result<(), String> {
        spawn_reaped(open_command(url))
            .map(|_| ())
            .map_err(|e| format!("failed to launch opener for {url}: {e}"))
    }
}

/// Spawn `command` detached from our stdio and wait for it on a background
/// thread, so a long-running host never accumulates zombie openers.
fn spawn_reaped(mut command: Command) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    std::thread::Builder::new()
        .name("apprater-opener".into())
        .spawn(move || child.wait())
}

#[cfg(target_os = "macos")]
fn open_command(url: &str) -> Command {
    let mut command = Command::new("open");
    command.arg(url);
    command
}

#[cfg(target_os = "windows")]
fn open_command(url: &str) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", "", url]);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn open_command(url: &str) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(url);
    command
}

fn has_xdg_handler(scheme: &str) -> bool {
    Command::new("xdg-mime")
        .args(["query", "default", &format!("x-scheme-handler/{scheme}")])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map(|out| out.status.success() && !out.stdout.trim_ascii().is_empty())
        .unwrap_or(false)
}

/// Lowercased scheme of `url`, if it has a syntactically valid one.
fn url_scheme(url: &str) -> Option<String> {
    let (scheme, _) = url.split_once(':')?;
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then(|| scheme.to_ascii_lowercase())
}
