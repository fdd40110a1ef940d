//! Status Line Component
//!
//! Message region for success/error feedback, mounted into an existing
//! element of the server-rendered page.

use leptos::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

impl NoticeKind {
    pub fn css_class(self) -> &'static str {
        match self {
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: NoticeKind,
    pub text: String,
}

/// Shared, reactive "last message" cell. Cloning shares the same cell.
#[derive(Clone)]
pub struct Notice {
    message: ArcRwSignal<Option<Message>>,
}

impl Default for Notice {
    fn default() -> Self {
        Self { message: ArcRwSignal::new(None) }
    }
}

impl Notice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&self, text: impl Into<String>) {
        self.message.set(Some(Message { kind: NoticeKind::Success, text: text.into() }));
    }

    pub fn error(&self, text: impl Into<String>) {
        self.message.set(Some(Message { kind: NoticeKind::Error, text: text.into() }));
    }

    pub fn clear(&self) {
        self.message.set(None);
    }

    #[cfg(test)]
    pub fn current(&self) -> Option<Message> {
        self.message.get_untracked()
    }
}

/// Renders the notice the way the server templates render flash messages
#[component]
pub fn StatusLine(notice: Notice) -> impl IntoView {
    let message = notice.message.clone();
    move || {
        message.get().map(|msg| {
            view! { <div class=msg.kind.css_class()>{msg.text}</div> }
        })
    }
}
