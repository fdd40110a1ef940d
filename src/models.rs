//! Frontend Models
//!
//! Data structures matching the server's JSON and DOM contracts.

use serde::{Deserialize, Serialize};

/// Like/dislike aggregate as returned by the reactions endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReactionCounts {
    pub likes: u32,
    pub dislikes: u32,
}

/// Last server snapshot for one bin. Never modified locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionState {
    pub item_id: String,
    pub counts: ReactionCounts,
}

impl ReactionState {
    pub fn like_label(&self) -> String {
        format!("👍 {}", self.counts.likes)
    }

    pub fn dislike_label(&self) -> String {
        format!("👎 {}", self.counts.dislikes)
    }
}

/// What the visitor clicked. The server decides how it changes the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionIntent {
    Like,
    Dislike,
}

impl ReactionIntent {
    /// Value of the `is_like` form field
    pub fn is_like(self) -> &'static str {
        match self {
            ReactionIntent::Like => "true",
            ReactionIntent::Dislike => "false",
        }
    }
}

/// Next page to request for a list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListCursor {
    pub next_page: u32,
}

impl ListCursor {
    /// Read a `data-next-page` value; anything but a positive integer is no cursor
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim()
            .parse::<u32>()
            .ok()
            .filter(|page| *page > 0)
            .map(|next_page| ListCursor { next_page })
    }
}

/// Comment endpoint reply
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommentResponse {
    pub success: bool,
    #[serde(default)]
    pub comment_html: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaction_labels() {
        let state = ReactionState {
            item_id: "a1b2".into(),
            counts: ReactionCounts { likes: 4, dislikes: 1 },
        };
        assert_eq!(state.like_label(), "👍 4");
        assert_eq!(state.dislike_label(), "👎 1");
    }

    #[test]
    fn test_cursor_parse() {
        assert_eq!(ListCursor::parse("3"), Some(ListCursor { next_page: 3 }));
        assert_eq!(ListCursor::parse(" 12 "), Some(ListCursor { next_page: 12 }));
        assert_eq!(ListCursor::parse("0"), None);
        assert_eq!(ListCursor::parse("-1"), None);
        assert_eq!(ListCursor::parse("next"), None);
        assert_eq!(ListCursor::parse(""), None);
    }

    #[test]
    fn test_comment_response_optional_fields() {
        let ok: CommentResponse =
            serde_json::from_str(r#"{"success": true, "comment_html": "<li>hi</li>"}"#).unwrap();
        assert!(ok.success);
        assert_eq!(ok.comment_html.as_deref(), Some("<li>hi</li>"));
        assert_eq!(ok.error, None);

        let failed: CommentResponse = serde_json::from_str(r#"{"success": false, "error": "Empty"}"#).unwrap();
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("Empty"));
    }
}
