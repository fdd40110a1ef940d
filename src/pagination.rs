//! Incremental List Loader
//!
//! Extends a server-rendered list page by page. Exactly one load-more control
//! exists at a time; it is taken out of the document before its page is
//! requested, so a second click has nothing to land on until the request
//! settles.

use std::cell::RefCell;
use std::rc::Rc;

use futures::FutureExt;

use dom_mount::{DetachedElement, DomMount, MountError};

use crate::commands::{self, FetchClient, FetchError};
use crate::components::Notice;
use crate::config::ListConfig;
use crate::models::ListCursor;
use crate::task::SharedSpawner;

pub const NEXT_PAGE_ATTR: &str = "data-next-page";

const LOAD_FAILED: &str = "Не вдалося завантажити наступну сторінку. Спробуйте ще раз.";

#[derive(Debug, Clone, PartialEq)]
pub enum LoaderState {
    /// Control is in the document and armed
    Idle(ListCursor),
    /// Control has been taken out; kept so it can be restored on failure
    Loading { cursor: ListCursor, control: DetachedElement },
    /// No further pages this session
    Exhausted,
}

/// Outcome of a finished page request
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Advanced(ListCursor),
    Exhausted,
    /// Request failed and the previous control is back in place
    Restored { cursor: ListCursor, error: FetchError },
    /// No control could be put back into the slot; the list is closed
    Broken(MountError),
}

/// Pagination state machine over a [`DomMount`]. Performs the DOM side of
/// every transition; the network side is left to the caller.
pub struct ListLoader {
    state: LoaderState,
    list: ListConfig,
    dom: Rc<dyn DomMount>,
}

impl ListLoader {
    /// Read the initial cursor from the control rendered with the page
    pub fn attach(dom: Rc<dyn DomMount>, list: ListConfig) -> Self {
        let state = match dom.attribute(&list.control_id, NEXT_PAGE_ATTR) {
            Some(raw) => match ListCursor::parse(&raw) {
                Some(cursor) => LoaderState::Idle(cursor),
                None => {
                    tracing::warn!(value = %raw, "load-more control has no usable page number");
                    LoaderState::Exhausted
                }
            },
            None => LoaderState::Exhausted,
        };
        tracing::debug!(?state, "list loader attached");
        Self { state, list, dom }
    }

    pub fn state(&self) -> &LoaderState {
        &self.state
    }

    /// `Idle -> Loading`. Removes the control and returns the page to fetch;
    /// in any other state nothing happens.
    pub fn begin(&mut self) -> Option<ListCursor> {
        let LoaderState::Idle(cursor) = self.state else {
            tracing::debug!(state = ?self.state, "load-more ignored");
            return None;
        };
        match self.dom.take(&self.list.control_id) {
            Some(control) => {
                tracing::debug!(page = cursor.next_page, "loading list page");
                self.state = LoaderState::Loading { cursor, control };
                Some(cursor)
            }
            None => {
                tracing::warn!("load-more control vanished from the document");
                self.state = LoaderState::Exhausted;
                None
            }
        }
    }

    /// `Loading -> Idle | Exhausted`. `None` when no request was outstanding.
    pub fn complete(&mut self, outcome: Result<String, FetchError>) -> Option<Transition> {
        let (cursor, control) = match std::mem::replace(&mut self.state, LoaderState::Exhausted) {
            LoaderState::Loading { cursor, control } => (cursor, control),
            other => {
                self.state = other;
                return None;
            }
        };

        let transition = match outcome {
            Ok(fragment) => self.extend(cursor, &fragment),
            Err(error) => match self.dom.insert(&self.list.control_slot, &control) {
                Ok(()) => {
                    tracing::warn!(page = cursor.next_page, %error, "page request failed, control restored");
                    self.state = LoaderState::Idle(cursor);
                    Transition::Restored { cursor, error }
                }
                Err(err) => {
                    tracing::warn!(%err, %error, "page request failed and control cannot be restored");
                    Transition::Broken(err)
                }
            },
        };
        Some(transition)
    }

    fn extend(&mut self, cursor: ListCursor, fragment: &str) -> Transition {
        let parts = self.dom.split_fragment(fragment, &self.list.control_id);
        if !parts.rows_html.trim().is_empty() {
            if let Err(err) = self.dom.append_html(&self.list.container_id, &parts.rows_html) {
                tracing::warn!(%err, "cannot append list rows");
            }
        }

        let Some(control) = parts.control else {
            tracing::debug!(page = cursor.next_page, "last page reached");
            return Transition::Exhausted;
        };
        let next = control.attribute(NEXT_PAGE_ATTR).and_then(ListCursor::parse);
        let next = match next {
            Some(next) if next.next_page > cursor.next_page => next,
            _ => {
                tracing::warn!(
                    current = cursor.next_page,
                    next = ?control.attribute(NEXT_PAGE_ATTR),
                    "successor control has no valid forward page, list closed"
                );
                return Transition::Exhausted;
            }
        };

        match self.dom.insert(&self.list.control_slot, &control) {
            Ok(()) => {
                self.state = LoaderState::Idle(next);
                Transition::Advanced(next)
            }
            Err(err) => {
                tracing::warn!(%err, "cannot install successor control");
                Transition::Broken(err)
            }
        }
    }
}

/// Path and query of the page the list lives on
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageLocation {
    pub path: String,
    pub query: String,
}

impl PageLocation {
    pub fn current() -> Option<Self> {
        let location = web_sys::window()?.location();
        Some(Self {
            path: location.pathname().ok()?,
            query: location.search().unwrap_or_default(),
        })
    }
}

struct LoaderInner {
    machine: RefCell<ListLoader>,
    control_id: String,
    dom: Rc<dyn DomMount>,
    client: Rc<dyn FetchClient>,
    spawner: SharedSpawner,
    location: PageLocation,
    notice: Option<Notice>,
}

/// Wires a [`ListLoader`] to clicks and page requests
#[derive(Clone)]
pub struct IncrementalListLoader {
    inner: Rc<LoaderInner>,
}

impl IncrementalListLoader {
    pub fn new(
        dom: Rc<dyn DomMount>,
        client: Rc<dyn FetchClient>,
        spawner: SharedSpawner,
        list: ListConfig,
        location: PageLocation,
        notice: Option<Notice>,
    ) -> Self {
        let control_id = list.control_id.clone();
        let machine = ListLoader::attach(dom.clone(), list);
        Self {
            inner: Rc::new(LoaderInner {
                machine: RefCell::new(machine),
                control_id,
                dom,
                client,
                spawner,
                location,
                notice,
            }),
        }
    }

    /// Arm the control rendered with the page, if there is one
    pub fn mount(&self) -> Result<(), MountError> {
        if matches!(self.state(), LoaderState::Idle(_)) {
            self.arm()?;
        }
        Ok(())
    }

    pub fn state(&self) -> LoaderState {
        self.inner.machine.borrow().state().clone()
    }

    fn arm(&self) -> Result<(), MountError> {
        let loader = self.clone();
        self.inner
            .dom
            .on_click(&self.inner.control_id, Rc::new(move || loader.load_more()))
    }

    fn load_more(&self) {
        let Some(cursor) = self.inner.machine.borrow_mut().begin() else {
            return;
        };
        let url = commands::page_url(&self.inner.location.path, &self.inner.location.query, cursor.next_page);

        let loader = self.clone();
        let task = async move {
            let outcome = commands::fetch_list_page(&*loader.inner.client, url).await;
            let transition = loader.inner.machine.borrow_mut().complete(outcome);
            loader.settle(transition);
        };
        self.inner.spawner.spawn(task.boxed_local());
    }

    fn settle(&self, transition: Option<Transition>) {
        match transition {
            Some(Transition::Advanced(_)) => {
                if let Some(notice) = &self.inner.notice {
                    notice.clear();
                }
                self.rearm();
            }
            Some(Transition::Restored { .. }) => {
                if let Some(notice) = &self.inner.notice {
                    notice.error(LOAD_FAILED);
                }
                self.rearm();
            }
            Some(Transition::Broken(_)) => {
                if let Some(notice) = &self.inner.notice {
                    notice.error(LOAD_FAILED);
                }
            }
            Some(Transition::Exhausted) | None => {}
        }
    }

    fn rearm(&self) {
        if let Err(err) = self.arm() {
            tracing::warn!(%err, "cannot arm load-more control");
        }
    }
}
