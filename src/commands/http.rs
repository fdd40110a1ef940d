//! HTTP Transport
//!
//! Minimal fetch-and-parse client. Every call resolves to an explicit
//! `Result`; no failure is swallowed here.

use futures::future::{select, Either, LocalBoxFuture};
use futures::FutureExt;
use gloo_timers::future::TimeoutFuture;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Headers, Request, RequestInit, Response};

/// Characters left unescaped in `application/x-www-form-urlencoded` values
const FORM_SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'*').remove(b'-').remove(b'.').remove(b'_');

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out after {0} ms")]
    Timeout(u32),
    #[error("server answered {status}")]
    Status { status: u16, body: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self { method: Method::Get, url: url.into(), headers: Vec::new(), body: None }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self { method: Method::Post, url: url.into(), headers: Vec::new(), body: None }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Attach a url-encoded form body
    pub fn form<K: AsRef<str>, V: AsRef<str>>(self, fields: &[(K, V)]) -> Self {
        let mut req = self.header("Content-Type", "application/x-www-form-urlencoded");
        req.body = Some(encode_form(fields));
        req
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

pub fn encode_form<K: AsRef<str>, V: AsRef<str>>(fields: &[(K, V)]) -> String {
    fields
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                utf8_percent_encode(k.as_ref(), FORM_SAFE),
                utf8_percent_encode(v.as_ref(), FORM_SAFE)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Escape one path segment (bin hashes are opaque strings)
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, FORM_SAFE).to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx answer into [`FetchError::Status`]
    pub fn success(self) -> Result<Self, FetchError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(FetchError::Status { status: self.status, body: self.body })
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        serde_json::from_str(&self.body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

/// Anything that can carry an [`HttpRequest`] to the server
pub trait FetchClient {
    fn send(&self, request: HttpRequest) -> LocalBoxFuture<'static, Result<HttpResponse, FetchError>>;
}

/// `window.fetch` with an abort-on-timeout bound
#[derive(Debug, Clone, Copy)]
pub struct BrowserFetch {
    timeout_ms: u32,
}

impl BrowserFetch {
    pub fn new(timeout_ms: u32) -> Self {
        Self { timeout_ms }
    }
}

impl FetchClient for BrowserFetch {
    fn send(&self, request: HttpRequest) -> LocalBoxFuture<'static, Result<HttpResponse, FetchError>> {
        browser_fetch(request, self.timeout_ms).boxed_local()
    }
}

fn js_err(err: JsValue) -> FetchError {
    FetchError::Network(format!("{:?}", err))
}

async fn browser_fetch(request: HttpRequest, timeout_ms: u32) -> Result<HttpResponse, FetchError> {
    let window = web_sys::window().ok_or_else(|| FetchError::Network("no window".to_string()))?;
    let controller = AbortController::new().map_err(js_err)?;

    let headers = Headers::new().map_err(js_err)?;
    for (name, value) in &request.headers {
        headers.set(name, value).map_err(js_err)?;
    }

    let init = RequestInit::new();
    init.set_method(request.method.as_str());
    init.set_headers(&headers);
    init.set_signal(Some(&controller.signal()));
    if let Some(body) = &request.body {
        init.set_body(&JsValue::from_str(body));
    }
    let js_request = Request::new_with_str_and_init(&request.url, &init).map_err(js_err)?;

    let exchange = async {
        let value = JsFuture::from(window.fetch_with_request(&js_request)).await?;
        let response: Response = value.dyn_into()?;
        let status = response.status();
        let text = JsFuture::from(response.text()?).await?;
        Ok::<_, JsValue>(HttpResponse { status, body: text.as_string().unwrap_or_default() })
    };
    let timeout = TimeoutFuture::new(timeout_ms);
    futures::pin_mut!(exchange);
    futures::pin_mut!(timeout);

    match select(exchange, timeout).await {
        Either::Left((result, _)) => {
            let response = result.map_err(js_err)?;
            tracing::debug!(method = request.method.as_str(), url = %request.url, status = response.status, "request finished");
            Ok(response)
        }
        Either::Right(_) => {
            controller.abort();
            tracing::warn!(method = request.method.as_str(), url = %request.url, timeout_ms, "request aborted after timeout");
            Err(FetchError::Timeout(timeout_ms))
        }
    }
}
