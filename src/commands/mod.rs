//! Server Command Wrappers
//!
//! Frontend bindings to the Binify HTTP endpoints, organized by domain.

mod bins;
mod comments;
pub mod http;
mod reactions;

use crate::config::PageConfig;
use http::{encode_segment, HttpRequest};

// Re-export all public items
pub use bins::*;
pub use comments::*;
pub use http::{BrowserFetch, FetchClient, FetchError, HttpResponse};
pub use reactions::*;

/// Endpoint addresses and the CSRF token used for writes
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoints {
    base: String,
    csrf_token: Option<String>,
}

impl Endpoints {
    pub fn new(base: &str, csrf_token: Option<String>) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            csrf_token,
        }
    }

    pub fn from_config(config: &PageConfig) -> Self {
        Self::new(&config.endpoint_base, config.csrf_token.clone())
    }

    pub fn reactions_url(&self, bin_id: &str) -> String {
        format!("{}/bin_likes_dislikes/{}/", self.base, encode_segment(bin_id))
    }

    pub fn comment_url(&self, bin_id: &str) -> String {
        format!("{}/bin_comment/{}/", self.base, encode_segment(bin_id))
    }

    fn with_csrf(&self, request: HttpRequest) -> HttpRequest {
        match &self.csrf_token {
            Some(token) => request.header("X-CSRFToken", token),
            None => {
                tracing::warn!(url = %request.url, "no CSRF token configured for write request");
                request
            }
        }
    }
}
