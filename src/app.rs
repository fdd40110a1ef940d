//! Binify Frontend App
//!
//! Attaches each component to the server-rendered page when its anchors are
//! present. Components never share state; a failure in one leaves the others
//! running.

use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::JsCast;

use dom_mount::{DocumentMount, DomMount};

use crate::commands::{BrowserFetch, Endpoints, FetchClient};
use crate::comments::CommentComposer;
use crate::components::{Notice, StatusLine};
use crate::config::{PageConfig, CSRF_COOKIE};
use crate::pagination::{IncrementalListLoader, PageLocation};
use crate::task::{BrowserSpawner, SharedSpawner};
use crate::vote::{VoteCounter, DISLIKE_BUTTON_ID, LIKE_BUTTON_ID};

/// Everything a component needs from the outside world
struct Services {
    config: PageConfig,
    endpoints: Endpoints,
    document: DocumentMount,
    dom: Rc<dyn DomMount>,
    client: Rc<dyn FetchClient>,
    spawner: SharedSpawner,
}

pub fn run() {
    let document = match DocumentMount::new() {
        Ok(document) => document,
        Err(err) => {
            tracing::error!(%err, "no document, nothing to mount");
            return;
        }
    };
    let config = PageConfig::load(&document).unwrap_or_else(|err| {
        tracing::error!(%err, "using default page configuration");
        PageConfig {
            csrf_token: document.cookie(CSRF_COOKIE),
            ..PageConfig::default()
        }
    });

    let services = Services {
        endpoints: Endpoints::from_config(&config),
        dom: Rc::new(document.clone()),
        client: Rc::new(BrowserFetch::new(config.request_timeout_ms)),
        spawner: Rc::new(BrowserSpawner),
        document,
        config,
    };

    mount_votes(&services);
    mount_comments(&services);
    mount_list(&services);
}

/// Render a [`StatusLine`] into an existing region of the page
fn status_region(document: &DocumentMount, id: &str) -> Option<Notice> {
    let region = document
        .document()
        .get_element_by_id(id)?
        .dyn_into::<web_sys::HtmlElement>()
        .ok()?;
    let notice = Notice::new();
    let shown = notice.clone();
    leptos::mount::mount_to(region, move || view! { <StatusLine notice=shown /> }).forget();
    Some(notice)
}

fn mount_votes(services: &Services) {
    let dom = &services.dom;
    if !dom.exists(LIKE_BUTTON_ID) || !dom.exists(DISLIKE_BUTTON_ID) {
        return;
    }
    let Some(bin_id) = services.config.bin_id.clone() else {
        tracing::warn!("reaction buttons present but no bin id configured");
        return;
    };

    let votes = VoteCounter::new(
        bin_id,
        services.endpoints.clone(),
        dom.clone(),
        services.client.clone(),
        services.spawner.clone(),
        status_region(&services.document, &services.config.reaction_status_id),
    );
    match votes.mount() {
        Ok(()) => tracing::info!("vote counter mounted"),
        Err(err) => tracing::warn!(%err, "vote counter not mounted"),
    }
}

fn mount_comments(services: &Services) {
    let ids = services.config.comments.clone();
    if !services.dom.exists(&ids.form_id) {
        return;
    }
    let Some(bin_id) = services.config.bin_id.clone() else {
        tracing::warn!("comment form present but no bin id configured");
        return;
    };

    let notice = status_region(&services.document, &ids.messages_id).unwrap_or_else(|| {
        tracing::warn!(region = %ids.messages_id, "no comment message region, feedback is log-only");
        Notice::new()
    });
    let composer = CommentComposer::new(
        bin_id,
        services.endpoints.clone(),
        ids,
        services.dom.clone(),
        services.client.clone(),
        services.spawner.clone(),
        notice,
    );
    match composer.mount() {
        Ok(()) => tracing::info!("comment composer mounted"),
        Err(err) => tracing::warn!(%err, "comment composer not mounted"),
    }
}

fn mount_list(services: &Services) {
    let list = services.config.list.clone();
    if !services.dom.exists(&list.container_id) {
        return;
    }
    let location = PageLocation::current().unwrap_or_default();
    let loader = IncrementalListLoader::new(
        services.dom.clone(),
        services.client.clone(),
        services.spawner.clone(),
        list,
        location,
        status_region(&services.document, &services.config.list_status_id),
    );
    match loader.mount() {
        Ok(()) => tracing::info!(state = ?loader.state(), "list loader mounted"),
        Err(err) => tracing::warn!(%err, "list loader not mounted"),
    }
}
