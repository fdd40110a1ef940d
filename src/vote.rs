//! Vote Counter
//!
//! Like/dislike buttons for one bin. Counts are only ever taken from server
//! responses: one read on mount, one write per click, and whichever response
//! resolves last is what the buttons show. Overlapping clicks are not
//! sequenced, so a slow earlier response can overwrite a faster later one.

use std::cell::RefCell;
use std::rc::Rc;

use futures::FutureExt;

use dom_mount::{DomMount, MountError};

use crate::commands::{self, Endpoints, FetchClient, FetchError};
use crate::components::Notice;
use crate::models::{ReactionCounts, ReactionIntent, ReactionState};
use crate::task::SharedSpawner;

pub const LIKE_BUTTON_ID: &str = "like-btn";
pub const DISLIKE_BUTTON_ID: &str = "dislike-btn";

const READ_FAILED: &str = "Не вдалося завантажити реакції.";
const WRITE_FAILED: &str = "Не вдалося зберегти реакцію. Спробуйте ще раз.";

struct VoteInner {
    bin_id: String,
    endpoints: Endpoints,
    dom: Rc<dyn DomMount>,
    client: Rc<dyn FetchClient>,
    spawner: SharedSpawner,
    notice: Option<Notice>,
    /// None until the first successful response
    state: RefCell<Option<ReactionState>>,
}

#[derive(Clone)]
pub struct VoteCounter {
    inner: Rc<VoteInner>,
}

impl VoteCounter {
    pub fn new(
        bin_id: impl Into<String>,
        endpoints: Endpoints,
        dom: Rc<dyn DomMount>,
        client: Rc<dyn FetchClient>,
        spawner: SharedSpawner,
        notice: Option<Notice>,
    ) -> Self {
        Self {
            inner: Rc::new(VoteInner {
                bin_id: bin_id.into(),
                endpoints,
                dom,
                client,
                spawner,
                notice,
                state: RefCell::new(None),
            }),
        }
    }

    /// Arm both buttons and issue the initial read. The handlers keep the
    /// counter alive for the lifetime of the page.
    pub fn mount(&self) -> Result<(), MountError> {
        for (id, intent) in [
            (LIKE_BUTTON_ID, ReactionIntent::Like),
            (DISLIKE_BUTTON_ID, ReactionIntent::Dislike),
        ] {
            let counter = self.clone();
            self.inner.dom.on_click(id, Rc::new(move || counter.cast(intent)))?;
        }
        self.refresh();
        Ok(())
    }

    /// Last rendered snapshot, `None` while counts are unknown
    #[cfg(test)]
    pub fn state(&self) -> Option<ReactionState> {
        self.inner.state.borrow().clone()
    }

    fn refresh(&self) {
        let counter = self.clone();
        let task = async move {
            let inner = &counter.inner;
            match commands::get_reactions(&*inner.client, &inner.endpoints, &inner.bin_id).await {
                Ok(counts) => counter.apply(counts),
                Err(err) => counter.report(&err, READ_FAILED),
            }
        };
        self.inner.spawner.spawn(task.boxed_local());
    }

    fn cast(&self, intent: ReactionIntent) {
        tracing::debug!(bin_id = %self.inner.bin_id, ?intent, "casting reaction");
        let counter = self.clone();
        let task = async move {
            let inner = &counter.inner;
            match commands::cast_reaction(&*inner.client, &inner.endpoints, &inner.bin_id, intent).await {
                Ok(counts) => counter.apply(counts),
                // Nothing was applied optimistically, so there is nothing to roll back
                Err(err) => counter.report(&err, WRITE_FAILED),
            }
        };
        self.inner.spawner.spawn(task.boxed_local());
    }

    fn apply(&self, counts: ReactionCounts) {
        let state = ReactionState { item_id: self.inner.bin_id.clone(), counts };
        for (id, label) in [
            (LIKE_BUTTON_ID, state.like_label()),
            (DISLIKE_BUTTON_ID, state.dislike_label()),
        ] {
            if let Err(err) = self.inner.dom.set_text(id, &label) {
                tracing::warn!(%err, "cannot render reaction count");
            }
        }
        tracing::debug!(bin_id = %state.item_id, likes = counts.likes, dislikes = counts.dislikes, "reaction counts rendered");
        *self.inner.state.borrow_mut() = Some(state);
        if let Some(notice) = &self.inner.notice {
            notice.clear();
        }
    }

    fn report(&self, err: &FetchError, message: &str) {
        tracing::warn!(bin_id = %self.inner.bin_id, %err, "reaction request failed");
        if let Some(notice) = &self.inner.notice {
            notice.error(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::http::Method;
    use crate::components::NoticeKind;
    use crate::testing::{Runtime, ScriptedClient};
    use dom_mount::MemoryDom;

    fn page() -> Rc<MemoryDom> {
        Rc::new(
            MemoryDom::new()
                .with_element(LIKE_BUTTON_ID, &[], "")
                .with_element(DISLIKE_BUTTON_ID, &[], ""),
        )
    }

    fn counter(
        rt: &Runtime,
        dom: &Rc<MemoryDom>,
        client: &Rc<ScriptedClient>,
        notice: Option<Notice>,
    ) -> VoteCounter {
        VoteCounter::new(
            "b1n",
            Endpoints::new("/bins", Some("tok".into())),
            dom.clone(),
            client.clone(),
            rt.spawner(),
            notice,
        )
    }

    fn labels(dom: &MemoryDom) -> (String, String) {
        (dom.text(LIKE_BUTTON_ID).unwrap(), dom.text(DISLIKE_BUTTON_ID).unwrap())
    }

    #[test]
    fn test_mount_issues_exactly_one_read() {
        let mut rt = Runtime::new();
        let dom = page();
        let client = ScriptedClient::new();
        let votes = counter(&rt, &dom, &client, None);

        votes.mount().unwrap();
        rt.settle();

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Get);
        assert_eq!(requests[0].url, "/bins/bin_likes_dislikes/b1n/");

        // Counts stay blank until the read resolves
        assert_eq!(labels(&dom), (String::new(), String::new()));
        assert_eq!(votes.state(), None);

        client.respond_ok(0, r#"{"likes": 7, "dislikes": 2}"#);
        rt.settle();
        assert_eq!(labels(&dom), ("👍 7".to_string(), "👎 2".to_string()));
    }

    #[test]
    fn test_click_renders_response_not_local_arithmetic() {
        let mut rt = Runtime::new();
        let dom = page();
        let client = ScriptedClient::new();
        let votes = counter(&rt, &dom, &client, None);
        votes.mount().unwrap();
        rt.settle();
        client.respond_ok(0, r#"{"likes": 10, "dislikes": 10}"#);
        rt.settle();

        assert!(dom.click(LIKE_BUTTON_ID));
        rt.settle();
        let requests = client.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].method, Method::Post);
        assert_eq!(requests[1].body.as_deref(), Some("is_like=true"));
        assert_eq!(requests[1].header_value("X-CSRFToken"), Some("tok"));

        client.respond_ok(1, r#"{"likes": 4, "dislikes": 1}"#);
        rt.settle();
        assert_eq!(labels(&dom), ("👍 4".to_string(), "👎 1".to_string()));
        assert_eq!(
            votes.state().map(|s| s.counts),
            Some(ReactionCounts { likes: 4, dislikes: 1 })
        );
    }

    #[test]
    fn test_each_click_sends_one_write() {
        let mut rt = Runtime::new();
        let dom = page();
        let client = ScriptedClient::new();
        counter(&rt, &dom, &client, None).mount().unwrap();
        rt.settle();

        for id in [LIKE_BUTTON_ID, DISLIKE_BUTTON_ID, LIKE_BUTTON_ID] {
            assert!(dom.click(id));
            rt.settle();
        }

        let bodies: Vec<_> = client.requests()[1..]
            .iter()
            .map(|r| r.body.clone().unwrap())
            .collect();
        assert_eq!(bodies, vec!["is_like=true", "is_like=false", "is_like=true"]);
        // No debounce: all three are in flight alongside the initial read
        assert_eq!(client.in_flight(), 4);
    }

    #[test]
    fn test_last_resolved_response_wins() {
        let mut rt = Runtime::new();
        let dom = page();
        let client = ScriptedClient::new();
        counter(&rt, &dom, &client, None).mount().unwrap();
        rt.settle();
        client.respond_ok(0, r#"{"likes": 3, "dislikes": 0}"#);

        dom.click(LIKE_BUTTON_ID);
        rt.settle(); // request 1
        dom.click(DISLIKE_BUTTON_ID);
        rt.settle(); // request 2

        // The later click resolves first, the earlier one last
        client.respond_ok(2, r#"{"likes": 3, "dislikes": 1}"#);
        rt.settle();
        assert_eq!(labels(&dom), ("👍 3".to_string(), "👎 1".to_string()));

        client.respond_ok(1, r#"{"likes": 4, "dislikes": 0}"#);
        rt.settle();
        assert_eq!(labels(&dom), ("👍 4".to_string(), "👎 0".to_string()));
    }

    #[test]
    fn test_failed_read_leaves_counts_blank() {
        let mut rt = Runtime::new();
        let dom = page();
        let client = ScriptedClient::new();
        let notice = Notice::new();
        let votes = counter(&rt, &dom, &client, Some(notice.clone()));
        votes.mount().unwrap();
        rt.settle();

        client.fail(0);
        rt.settle();
        assert_eq!(labels(&dom), (String::new(), String::new()));
        assert_eq!(votes.state(), None);
        assert_eq!(notice.current().map(|m| m.kind), Some(NoticeKind::Error));
    }

    #[test]
    fn test_failed_write_keeps_prior_counts() {
        let mut rt = Runtime::new();
        let dom = page();
        let client = ScriptedClient::new();
        let notice = Notice::new();
        counter(&rt, &dom, &client, Some(notice.clone())).mount().unwrap();
        rt.settle();
        client.respond_ok(0, r#"{"likes": 5, "dislikes": 5}"#);
        rt.settle();

        dom.click(LIKE_BUTTON_ID);
        rt.settle();
        client.respond_status(1, 500, "oops");
        rt.settle();
        assert_eq!(labels(&dom), ("👍 5".to_string(), "👎 5".to_string()));
        assert_eq!(notice.current().map(|m| m.text), Some(WRITE_FAILED.to_string()));

        // Clicking again is the retry, with no automatic resend in between
        assert_eq!(client.requests().len(), 2);
        dom.click(LIKE_BUTTON_ID);
        rt.settle();
        client.respond_ok(2, r#"{"likes": 6, "dislikes": 5}"#);
        rt.settle();
        assert_eq!(labels(&dom), ("👍 6".to_string(), "👎 5".to_string()));
        assert_eq!(notice.current(), None);
    }

    #[test]
    fn test_undecodable_body_is_a_failure() {
        let mut rt = Runtime::new();
        let dom = page();
        let client = ScriptedClient::new();
        let votes = counter(&rt, &dom, &client, None);
        votes.mount().unwrap();
        rt.settle();

        client.respond_ok(0, "<html>login required</html>");
        rt.settle();
        assert_eq!(votes.state(), None);
    }

    #[test]
    fn test_mount_requires_buttons() {
        let rt = Runtime::new();
        let dom = Rc::new(MemoryDom::new());
        let client = ScriptedClient::new();
        let err = counter(&rt, &dom, &client, None).mount().unwrap_err();
        assert_eq!(err, MountError::MissingElement(LIKE_BUTTON_ID.to_string()));
        assert!(client.requests().is_empty());
    }
}
