//! In-memory DOM double for native tests.
//!
//! Models only what components observe: elements by id with attributes and
//! text, HTML appended to containers/slots, handlers and forms. Fragment
//! splitting understands a control written as one `<tag id="..">...</tag>`.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::{find_cookie, DetachedElement, DomMount, FragmentParts, Handler, MountError};

#[derive(Default)]
struct Node {
    attributes: Vec<(String, String)>,
    text: String,
    outer_html: String,
}

#[derive(Default)]
struct State {
    elements: HashMap<String, Node>,
    /// container id or slot selector -> inserted html chunks, in order
    contents: HashMap<String, Vec<String>>,
    clicks: HashMap<String, Handler>,
    submits: HashMap<String, Handler>,
    forms: HashMap<String, Vec<(String, String)>>,
    resets: HashMap<String, usize>,
    cookies: String,
}

#[derive(Default)]
pub struct MemoryDom {
    state: RefCell<State>,
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(self, id: &str, attributes: &[(&str, &str)], text: &str) -> Self {
        let mut attrs = vec![("id".to_string(), id.to_string())];
        attrs.extend(attributes.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        let outer_html = format!("<div {}>{}</div>", render_attributes(&attrs), text);
        self.state.borrow_mut().elements.insert(
            id.to_string(),
            Node { attributes: attrs, text: text.to_string(), outer_html },
        );
        self
    }

    /// Register an insertion target addressed by CSS selector
    pub fn with_slot(self, selector: &str) -> Self {
        self.state.borrow_mut().contents.entry(selector.to_string()).or_default();
        self
    }

    /// Put a control element inside a slot, as the server would render it
    pub fn with_control(self, slot: &str, id: &str, attributes: &[(&str, &str)]) -> Self {
        let mut attrs = vec![("id".to_string(), id.to_string())];
        attrs.extend(attributes.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        let element = DetachedElement {
            id: id.to_string(),
            outer_html: format!("<button {}>Load more</button>", render_attributes(&attrs)),
            attributes: attrs,
        };
        let dom = self.with_slot(slot);
        let _ = dom.insert(slot, &element);
        dom
    }

    pub fn with_form(self, id: &str, fields: &[(&str, &str)]) -> Self {
        let dom = self.with_element(id, &[], "");
        dom.state.borrow_mut().forms.insert(
            id.to_string(),
            fields.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        );
        dom
    }

    pub fn with_cookies(self, jar: &str) -> Self {
        self.state.borrow_mut().cookies = jar.to_string();
        self
    }

    /// Fire the click handler; false when the element or handler is absent
    pub fn click(&self, id: &str) -> bool {
        let handler = {
            let state = self.state.borrow();
            if !state.elements.contains_key(id) {
                return false;
            }
            state.clicks.get(id).cloned()
        };
        match handler {
            Some(handler) => {
                handler();
                true
            }
            None => false,
        }
    }

    pub fn submit(&self, form_id: &str) -> bool {
        let handler = self.state.borrow().submits.get(form_id).cloned();
        match handler {
            Some(handler) => {
                handler();
                true
            }
            None => false,
        }
    }

    /// Html chunks inserted into a container id or slot selector
    pub fn contents(&self, target: &str) -> Vec<String> {
        self.state.borrow().contents.get(target).cloned().unwrap_or_default()
    }

    pub fn reset_count(&self, form_id: &str) -> usize {
        self.state.borrow().resets.get(form_id).copied().unwrap_or(0)
    }

    /// Number of elements currently carrying `id`
    pub fn count(&self, id: &str) -> usize {
        let state = self.state.borrow();
        let needle = format!("id=\"{}\"", id);
        state
            .contents
            .values()
            .flatten()
            .filter(|chunk| chunk.contains(&needle))
            .count()
    }
}

fn render_attributes(attrs: &[(String, String)]) -> String {
    attrs
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, v))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse `name="value"` pairs out of a start tag such as `<button a="1" b='2'>`
fn parse_start_tag(tag: &str) -> Vec<(String, String)> {
    let body = tag.trim_start_matches('<').trim_end_matches('>').trim_end_matches('/');
    let mut rest = body.split_once(char::is_whitespace).map(|(_, r)| r).unwrap_or("");
    let mut attrs = Vec::new();

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        let name_end = rest
            .find(|c: char| c == '=' || c.is_whitespace())
            .unwrap_or(rest.len());
        let name = rest[..name_end].to_string();
        rest = &rest[name_end..];

        if let Some(after_eq) = rest.strip_prefix('=') {
            let Some(quote) = after_eq.chars().next() else {
                attrs.push((name, String::new()));
                break;
            };
            if quote == '"' || quote == '\'' {
                let value_src = &after_eq[1..];
                let end = value_src.find(quote).unwrap_or(value_src.len());
                attrs.push((name, value_src[..end].to_string()));
                rest = value_src.get(end + 1..).unwrap_or("");
            } else {
                let end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
                attrs.push((name, after_eq[..end].to_string()));
                rest = &after_eq[end..];
            }
        } else if !name.is_empty() {
            attrs.push((name, String::new()));
        }
    }
    attrs
}

impl DomMount for MemoryDom {
    fn exists(&self, id: &str) -> bool {
        self.state.borrow().elements.contains_key(id)
    }

    fn attribute(&self, id: &str, name: &str) -> Option<String> {
        let state = self.state.borrow();
        let node = state.elements.get(id)?;
        node.attributes.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
    }

    fn text(&self, id: &str) -> Option<String> {
        self.state.borrow().elements.get(id).map(|node| node.text.clone())
    }

    fn set_text(&self, id: &str, text: &str) -> Result<(), MountError> {
        let mut state = self.state.borrow_mut();
        let node = state
            .elements
            .get_mut(id)
            .ok_or_else(|| MountError::MissingElement(id.to_string()))?;
        node.text = text.to_string();
        Ok(())
    }

    fn take(&self, id: &str) -> Option<DetachedElement> {
        let mut state = self.state.borrow_mut();
        let node = state.elements.remove(id)?;
        state.clicks.remove(id);
        for chunks in state.contents.values_mut() {
            chunks.retain(|chunk| chunk != &node.outer_html);
        }
        Some(DetachedElement {
            id: id.to_string(),
            outer_html: node.outer_html,
            attributes: node.attributes,
        })
    }

    fn insert(&self, slot: &str, element: &DetachedElement) -> Result<(), MountError> {
        let mut state = self.state.borrow_mut();
        state
            .contents
            .get_mut(slot)
            .ok_or_else(|| MountError::MissingElement(slot.to_string()))?
            .push(element.outer_html.clone());
        state.elements.insert(
            element.id.clone(),
            Node {
                attributes: element.attributes.clone(),
                text: String::new(),
                outer_html: element.outer_html.clone(),
            },
        );
        Ok(())
    }

    fn append_html(&self, container_id: &str, html: &str) -> Result<(), MountError> {
        let mut state = self.state.borrow_mut();
        if !state.elements.contains_key(container_id) {
            return Err(MountError::MissingElement(container_id.to_string()));
        }
        state.contents.entry(container_id.to_string()).or_default().push(html.to_string());
        Ok(())
    }

    fn prepend_html(&self, container_id: &str, html: &str) -> Result<(), MountError> {
        let mut state = self.state.borrow_mut();
        if !state.elements.contains_key(container_id) {
            return Err(MountError::MissingElement(container_id.to_string()));
        }
        state.contents.entry(container_id.to_string()).or_default().insert(0, html.to_string());
        Ok(())
    }

    fn split_fragment(&self, html: &str, control_id: &str) -> FragmentParts {
        let needle = format!("id=\"{}\"", control_id);
        let unsplit = || FragmentParts { rows_html: html.to_string(), control: None };

        let Some(id_at) = html.find(&needle) else { return unsplit() };
        let Some(start) = html[..id_at].rfind('<') else { return unsplit() };
        let Some(tag_len) = html[start..].find('>') else { return unsplit() };
        let start_tag = &html[start..=start + tag_len];
        let tag_name: String = start_tag[1..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect();
        let closing = format!("</{}>", tag_name);
        let end = match html[start..].find(&closing) {
            Some(offset) => start + offset + closing.len(),
            None => start + tag_len + 1,
        };

        let control = DetachedElement {
            id: control_id.to_string(),
            outer_html: html[start..end].to_string(),
            attributes: parse_start_tag(start_tag),
        };
        FragmentParts {
            rows_html: format!("{}{}", &html[..start], &html[end..]),
            control: Some(control),
        }
    }

    fn form_fields(&self, form_id: &str) -> Result<Vec<(String, String)>, MountError> {
        self.state
            .borrow()
            .forms
            .get(form_id)
            .cloned()
            .ok_or_else(|| MountError::MissingElement(form_id.to_string()))
    }

    fn reset_form(&self, form_id: &str) -> Result<(), MountError> {
        let mut state = self.state.borrow_mut();
        if !state.forms.contains_key(form_id) {
            return Err(MountError::MissingElement(form_id.to_string()));
        }
        *state.resets.entry(form_id.to_string()).or_default() += 1;
        Ok(())
    }

    fn on_click(&self, id: &str, handler: Handler) -> Result<(), MountError> {
        let mut state = self.state.borrow_mut();
        if !state.elements.contains_key(id) {
            return Err(MountError::MissingElement(id.to_string()));
        }
        state.clicks.insert(id.to_string(), handler);
        Ok(())
    }

    fn on_submit(&self, form_id: &str, handler: Handler) -> Result<(), MountError> {
        let mut state = self.state.borrow_mut();
        if !state.elements.contains_key(form_id) {
            return Err(MountError::MissingElement(form_id.to_string()));
        }
        state.submits.insert(form_id.to_string(), handler);
        Ok(())
    }

    fn cookie(&self, name: &str) -> Option<String> {
        find_cookie(&self.state.borrow().cookies, name)
    }
}
