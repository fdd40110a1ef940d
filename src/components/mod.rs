//! UI Components
//!
//! Leptos components mounted into regions of the server-rendered page.

mod status_line;

pub use status_line::{Notice, NoticeKind, StatusLine};
