//! Prompt configuration: application id, thresholds, dialog strings, and
//! store links.
//!
//! [`RaterConfig`] has working defaults for everything except the app id.
//! Hosts either build it in code with the `with_*` methods or load it from a
//! JSON file where every field is optional:
//!
//! ```json
//! {
//!   "app_id": "com.example.notes",
//!   "days_until_prompt": 5,
//!   "launches_until_prompt": 10,
//!   "prompt": { "title": "Enjoying Notes?" }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::prompt::PromptRequest;

pub const DEFAULT_DAYS_UNTIL_PROMPT: u32 = 3;
pub const DEFAULT_LAUNCHES_UNTIL_PROMPT: u32 = 7;

/// Placeholder replaced by the app id in [`StoreLinks`] templates.
pub const APP_ID_PLACEHOLDER: &str = "{app_id}";

const DEFAULT_DEEP_LINK: &str = "market://details?id={app_id}";
const DEFAULT_WEB_URL: &str = "https://play.google.com/store/apps/details?id={app_id}";

/// URL templates for the store listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreLinks {
    /// Opens the store application directly.
    pub deep_link: String,
    /// Browser fallback for the same listing.
    pub web_url: String,
}

impl Default for StoreLinks {
    fn default() -> Self {
        Self {
            deep_link: DEFAULT_DEEP_LINK.to_string(),
            web_url: DEFAULT_WEB_URL.to_string(),
        }
    }
}

impl StoreLinks {
    pub fn deep_link(&self, app_id: &str) -> String {
        self.deep_link.replace(APP_ID_PLACEHOLDER, app_id)
    }

    pub fn web_url(&self, app_id: &str) -> String {
        self.web_url.replace(APP_ID_PLACEHOLDER, app_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaterConfig {
    /// Store identifier of the host application (package name, bundle id).
    pub app_id: String,
    /// Whole days since the first launch before the prompt is due. `0`
    /// disables the gate.
    pub days_until_prompt: u32,
    /// Launches before the prompt is due. `0` disables the gate.
    pub launches_until_prompt: u32,
    pub prompt: PromptRequest,
    pub store_links: StoreLinks,
}

impl Default for RaterConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            days_until_prompt: DEFAULT_DAYS_UNTIL_PROMPT,
            launches_until_prompt: DEFAULT_LAUNCHES_UNTIL_PROMPT,
            prompt: PromptRequest::default(),
            store_links: StoreLinks::default(),
        }
    }
}

impl RaterConfig {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            ..Default::default()
        }
    }

    pub fn with_days_until_prompt(mut self, days: u32) -> Self {
        self.days_until_prompt = days;
        self
    }

    pub fn with_launches_until_prompt(mut self, launches: u32) -> Self {
        self.launches_until_prompt = launches;
        self
    }

    pub fn with_prompt(mut self, prompt: PromptRequest) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_store_links(mut self, links: StoreLinks) -> Self {
        self.store_links = links;
        self
    }

    /// Load and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {e}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| format!("failed to parse config {}: {e}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.app_id.trim().is_empty() {
            return Err("config: app_id must not be empty".to_string());
        }
        if self.app_id.chars().any(char::is_whitespace) {
            return Err(format!(
                "config: app_id `{}` must not contain whitespace",
                self.app_id
            ));
        }
        for (name, template) in [
            ("store_links.deep_link", &self.store_links.deep_link),
            ("store_links.web_url", &self.store_links.web_url),
        ] {
            if !template.contains(APP_ID_PLACEHOLDER) {
                return Err(format!(
                    "config: {name} must contain the {APP_ID_PLACEHOLDER} placeholder"
                ));
            }
        }
        Ok(())
    }
}
