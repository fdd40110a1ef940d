//! Browser implementation backed by `web_sys::Document`.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, DomParser, Element, FormData, HtmlDocument, HtmlElement, HtmlFormElement, SupportedType};

use crate::{find_cookie, DetachedElement, DomMount, FragmentParts, Handler, MountError};

fn js_err(err: JsValue) -> MountError {
    MountError::Js(format!("{:?}", err))
}

fn detach_info(el: &Element) -> DetachedElement {
    let attributes = el
        .get_attribute_names()
        .iter()
        .filter_map(|name| name.as_string())
        .filter_map(|name| el.get_attribute(&name).map(|value| (name, value)))
        .collect();
    DetachedElement {
        id: el.id(),
        outer_html: el.outer_html(),
        attributes,
    }
}

/// The live page document
#[derive(Clone)]
pub struct DocumentMount {
    document: Document,
}

impl DocumentMount {
    pub fn new() -> Result<Self, MountError> {
        let document = web_sys::window()
            .and_then(|win| win.document())
            .ok_or(MountError::NoDocument)?;
        Ok(Self { document })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn element(&self, id: &str) -> Result<Element, MountError> {
        self.document
            .get_element_by_id(id)
            .ok_or_else(|| MountError::MissingElement(id.to_string()))
    }
}

impl DomMount for DocumentMount {
    fn exists(&self, id: &str) -> bool {
        self.document.get_element_by_id(id).is_some()
    }

    fn attribute(&self, id: &str, name: &str) -> Option<String> {
        self.document.get_element_by_id(id)?.get_attribute(name)
    }

    fn text(&self, id: &str) -> Option<String> {
        self.document.get_element_by_id(id)?.text_content()
    }

    fn set_text(&self, id: &str, text: &str) -> Result<(), MountError> {
        self.element(id)?.set_text_content(Some(text));
        Ok(())
    }

    fn take(&self, id: &str) -> Option<DetachedElement> {
        let el = self.document.get_element_by_id(id)?;
        let detached = detach_info(&el);
        el.remove();
        Some(detached)
    }

    fn insert(&self, slot: &str, element: &DetachedElement) -> Result<(), MountError> {
        let target = self
            .document
            .query_selector(slot)
            .map_err(js_err)?
            .ok_or_else(|| MountError::MissingElement(slot.to_string()))?;
        target
            .insert_adjacent_html("beforeend", &element.outer_html)
            .map_err(js_err)
    }

    fn append_html(&self, container_id: &str, html: &str) -> Result<(), MountError> {
        self.element(container_id)?
            .insert_adjacent_html("beforeend", html)
            .map_err(js_err)
    }

    fn prepend_html(&self, container_id: &str, html: &str) -> Result<(), MountError> {
        self.element(container_id)?
            .insert_adjacent_html("afterbegin", html)
            .map_err(js_err)
    }

    fn split_fragment(&self, html: &str, control_id: &str) -> FragmentParts {
        let parsed = DomParser::new().and_then(|parser| parser.parse_from_string(html, SupportedType::TextHtml));
        let doc = match parsed {
            Ok(doc) => doc,
            Err(err) => {
                tracing::warn!(error = ?err, "fragment could not be parsed, appending as-is");
                return FragmentParts { rows_html: html.to_string(), control: None };
            }
        };

        let Some(control_el) = doc.get_element_by_id(control_id) else {
            return FragmentParts { rows_html: html.to_string(), control: None };
        };
        let control = detach_info(&control_el);
        control_el.remove();

        let rows_html = doc.body().map(|body| body.inner_html()).unwrap_or_default();
        FragmentParts { rows_html, control: Some(control) }
    }

    fn form_fields(&self, form_id: &str) -> Result<Vec<(String, String)>, MountError> {
        let form = self
            .element(form_id)?
            .dyn_into::<HtmlFormElement>()
            .map_err(|_| MountError::MissingElement(form_id.to_string()))?;
        let data = FormData::new_with_form(&form).map_err(js_err)?;

        let mut fields = Vec::new();
        if let Some(entries) = js_sys::try_iter(&data).map_err(js_err)? {
            for entry in entries {
                let pair = js_sys::Array::from(&entry.map_err(js_err)?);
                // File inputs yield Blob values; only text fields are sent
                if let (Some(name), Some(value)) = (pair.get(0).as_string(), pair.get(1).as_string()) {
                    fields.push((name, value));
                }
            }
        }
        Ok(fields)
    }

    fn reset_form(&self, form_id: &str) -> Result<(), MountError> {
        let form = self
            .element(form_id)?
            .dyn_into::<HtmlFormElement>()
            .map_err(|_| MountError::MissingElement(form_id.to_string()))?;
        form.reset();
        Ok(())
    }

    fn on_click(&self, id: &str, handler: Handler) -> Result<(), MountError> {
        let el = self
            .element(id)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| MountError::MissingElement(id.to_string()))?;
        let cb = Closure::<dyn FnMut(web_sys::Event)>::new(move |_ev: web_sys::Event| handler());
        el.set_onclick(Some(cb.as_ref().unchecked_ref()));
        cb.forget();
        Ok(())
    }

    fn on_submit(&self, form_id: &str, handler: Handler) -> Result<(), MountError> {
        let form = self.element(form_id)?;
        let cb = Closure::<dyn FnMut(web_sys::Event)>::new(move |ev: web_sys::Event| {
            ev.prevent_default();
            handler();
        });
        form.add_event_listener_with_callback("submit", cb.as_ref().unchecked_ref())
            .map_err(js_err)?;
        cb.forget();
        Ok(())
    }

    fn cookie(&self, name: &str) -> Option<String> {
        let jar = self.document.dyn_ref::<HtmlDocument>()?.cookie().ok()?;
        find_cookie(&jar, name)
    }
}
