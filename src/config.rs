//! Page Configuration
//!
//! Values the server hands to the page, read once at start-up from a JSON
//! script element and passed explicitly into each component.

use serde::Deserialize;

use dom_mount::DomMount;

/// Id of the `<script type="application/json">` holding the configuration
pub const CONFIG_ELEMENT_ID: &str = "binify-config";
/// Django's CSRF cookie, used when the config carries no token
pub const CSRF_COOKIE: &str = "csrftoken";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid page configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageConfig {
    /// Hash of the bin shown on this page (absent on list pages)
    #[serde(default)]
    pub bin_id: Option<String>,
    #[serde(default)]
    pub csrf_token: Option<String>,
    #[serde(default = "default_endpoint_base")]
    pub endpoint_base: String,
    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u32,
    #[serde(default)]
    pub list: ListConfig,
    #[serde(default)]
    pub comments: CommentConfig,
    #[serde(default = "default_reaction_status")]
    pub reaction_status_id: String,
    #[serde(default = "default_list_status")]
    pub list_status_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    pub container_id: String,
    pub control_id: String,
    /// Selector of the element the load-more control lives in
    pub control_slot: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CommentConfig {
    pub form_id: String,
    pub list_id: String,
    pub messages_id: String,
}

fn default_endpoint_base() -> String {
    "/bins".to_string()
}

fn default_timeout_ms() -> u32 {
    10_000
}

fn default_reaction_status() -> String {
    "reaction-status".to_string()
}

fn default_list_status() -> String {
    "list-status".to_string()
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            container_id: "bins-list".to_string(),
            control_id: "load-more-btn".to_string(),
            control_slot: ".d-flex.justify-content-center.mt-4".to_string(),
        }
    }
}

impl Default for CommentConfig {
    fn default() -> Self {
        Self {
            form_id: "comment-form".to_string(),
            list_id: "comments-list".to_string(),
            messages_id: "comment-messages".to_string(),
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            bin_id: None,
            csrf_token: None,
            endpoint_base: default_endpoint_base(),
            request_timeout_ms: default_timeout_ms(),
            list: ListConfig::default(),
            comments: CommentConfig::default(),
            reaction_status_id: default_reaction_status(),
            list_status_id: default_list_status(),
        }
    }
}

impl PageConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Read the page configuration, falling back to defaults when the page
    /// has no config element, and to the CSRF cookie when no token is given
    pub fn load(dom: &dyn DomMount) -> Result<Self, ConfigError> {
        let mut config = match dom.text(CONFIG_ELEMENT_ID) {
            Some(raw) if !raw.trim().is_empty() => Self::from_json(&raw)?,
            _ => Self::default(),
        };
        if config.csrf_token.as_deref().map_or(true, str::is_empty) {
            config.csrf_token = dom.cookie(CSRF_COOKIE);
        }
        tracing::debug!(
            bin_id = ?config.bin_id,
            has_csrf = config.csrf_token.is_some(),
            timeout_ms = config.request_timeout_ms,
            "page configuration loaded"
        );
        Ok(config)
    }
}
