//! Comment Composer
//!
//! Submits the comment form without leaving the page and prepends the
//! server-rendered comment to the list.

use std::cell::Cell;
use std::rc::Rc;

use futures::FutureExt;

use dom_mount::{DomMount, MountError};

use crate::commands::{self, Endpoints, FetchClient};
use crate::components::Notice;
use crate::config::CommentConfig;
use crate::task::SharedSpawner;

pub const COMMENT_ADDED: &str = "Коментар додано!";
pub const COMMENT_FAILED: &str = "Сталася помилка. Спробуйте ще раз.";

struct ComposerInner {
    bin_id: String,
    endpoints: Endpoints,
    ids: CommentConfig,
    dom: Rc<dyn DomMount>,
    client: Rc<dyn FetchClient>,
    spawner: SharedSpawner,
    notice: Notice,
    in_flight: Cell<bool>,
}

#[derive(Clone)]
pub struct CommentComposer {
    inner: Rc<ComposerInner>,
}

impl CommentComposer {
    pub fn new(
        bin_id: impl Into<String>,
        endpoints: Endpoints,
        ids: CommentConfig,
        dom: Rc<dyn DomMount>,
        client: Rc<dyn FetchClient>,
        spawner: SharedSpawner,
        notice: Notice,
    ) -> Self {
        Self {
            inner: Rc::new(ComposerInner {
                bin_id: bin_id.into(),
                endpoints,
                ids,
                dom,
                client,
                spawner,
                notice,
                in_flight: Cell::new(false),
            }),
        }
    }

    pub fn mount(&self) -> Result<(), MountError> {
        let composer = self.clone();
        self.inner
            .dom
            .on_submit(&self.inner.ids.form_id, Rc::new(move || composer.submit()))
    }

    fn submit(&self) {
        let inner = &self.inner;
        if inner.in_flight.get() {
            tracing::debug!("comment submit ignored, previous one still pending");
            return;
        }
        let fields = match inner.dom.form_fields(&inner.ids.form_id) {
            Ok(fields) => fields,
            Err(err) => {
                tracing::warn!(%err, "cannot read comment form");
                inner.notice.error(COMMENT_FAILED);
                return;
            }
        };
        inner.in_flight.set(true);

        let composer = self.clone();
        let task = async move {
            let inner = &composer.inner;
            let result = commands::submit_comment(&*inner.client, &inner.endpoints, &inner.bin_id, &fields).await;
            inner.in_flight.set(false);

            match result {
                Ok(reply) if reply.success => {
                    inner.notice.success(COMMENT_ADDED);
                    if let Some(html) = reply.comment_html.filter(|html| !html.is_empty()) {
                        if let Err(err) = inner.dom.prepend_html(&inner.ids.list_id, &html) {
                            tracing::warn!(%err, "cannot insert new comment");
                        }
                    }
                    if let Err(err) = inner.dom.reset_form(&inner.ids.form_id) {
                        tracing::warn!(%err, "cannot reset comment form");
                    }
                }
                Ok(reply) => {
                    tracing::debug!(error = ?reply.error, "comment rejected");
                    inner.notice.error(reply.error.unwrap_or_else(|| COMMENT_FAILED.to_string()));
                }
                Err(err) => {
                    tracing::warn!(%err, "comment submit failed");
                    inner.notice.error(COMMENT_FAILED);
                }
            }
        };
        inner.spawner.spawn(task.boxed_local());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::NoticeKind;
    use crate::testing::{Runtime, ScriptedClient};
    use dom_mount::MemoryDom;

    fn page() -> Rc<MemoryDom> {
        Rc::new(
            MemoryDom::new()
                .with_form("comment-form", &[("text", "great snippet"), ("name", "anon")])
                .with_element("comments-list", &[], ""),
        )
    }

    fn composer(rt: &Runtime, dom: &Rc<MemoryDom>, client: &Rc<ScriptedClient>, notice: &Notice) -> CommentComposer {
        let composer = CommentComposer::new(
            "b1n",
            Endpoints::new("/bins", Some("tok".into())),
            CommentConfig::default(),
            dom.clone(),
            client.clone(),
            rt.spawner(),
            notice.clone(),
        );
        composer.mount().unwrap();
        composer
    }

    #[test]
    fn test_successful_comment() {
        let mut rt = Runtime::new();
        let dom = page();
        let client = ScriptedClient::new();
        let notice = Notice::new();
        composer(&rt, &dom, &client, &notice);

        assert!(dom.submit("comment-form"));
        rt.settle();
        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "/bins/bin_comment/b1n/");
        assert_eq!(requests[0].body.as_deref(), Some("text=great%20snippet&name=anon"));
        assert_eq!(requests[0].header_value("X-CSRFToken"), Some("tok"));

        client.respond_ok(0, r#"{"success": true, "comment_html": "<li>great snippet</li>"}"#);
        rt.settle();
        assert_eq!(dom.contents("comments-list"), vec!["<li>great snippet</li>".to_string()]);
        assert_eq!(dom.reset_count("comment-form"), 1);
        assert_eq!(notice.current().map(|m| (m.kind, m.text)), Some((NoticeKind::Success, COMMENT_ADDED.to_string())));
    }

    #[test]
    fn test_rejected_comment_shows_server_error() {
        let mut rt = Runtime::new();
        let dom = page();
        let client = ScriptedClient::new();
        let notice = Notice::new();
        composer(&rt, &dom, &client, &notice);

        dom.submit("comment-form");
        rt.settle();
        client.respond_status(0, 400, r#"{"success": false, "error": "Коментар порожній"}"#);
        rt.settle();

        assert!(dom.contents("comments-list").is_empty());
        assert_eq!(dom.reset_count("comment-form"), 0);
        assert_eq!(notice.current().map(|m| m.text), Some("Коментар порожній".to_string()));
    }

    #[test]
    fn test_transport_failure_shows_static_message() {
        let mut rt = Runtime::new();
        let dom = page();
        let client = ScriptedClient::new();
        let notice = Notice::new();
        composer(&rt, &dom, &client, &notice);

        dom.submit("comment-form");
        rt.settle();
        client.fail(0);
        rt.settle();
        assert_eq!(notice.current().map(|m| (m.kind, m.text)), Some((NoticeKind::Error, COMMENT_FAILED.to_string())));

        // Server error page instead of JSON
        dom.submit("comment-form");
        rt.settle();
        client.respond_status(1, 500, "<h1>Server Error</h1>");
        rt.settle();
        assert_eq!(notice.current().map(|m| m.text), Some(COMMENT_FAILED.to_string()));
    }

    #[test]
    fn test_submit_ignored_while_pending() {
        let mut rt = Runtime::new();
        let dom = page();
        let client = ScriptedClient::new();
        let notice = Notice::new();
        composer(&rt, &dom, &client, &notice);

        dom.submit("comment-form");
        rt.settle();
        dom.submit("comment-form");
        rt.settle();
        assert_eq!(client.requests().len(), 1);

        client.respond_ok(0, r#"{"success": true, "comment_html": "<li>x</li>"}"#);
        rt.settle();
        dom.submit("comment-form");
        rt.settle();
        assert_eq!(client.requests().len(), 2);
    }
}
