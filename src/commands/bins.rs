//! List Page Commands
//!
//! Fragment requests for incremental bin lists.

use super::http::{FetchClient, FetchError, HttpRequest};

/// Current page URL with `page` set to `page`; other query parameters stay
pub fn page_url(path: &str, query: &str, page: u32) -> String {
    let mut params: Vec<&str> = query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| pair.split('=').next() != Some("page"))
        .collect();
    let page_param = format!("page={}", page);
    params.push(&page_param);
    format!("{}?{}", path, params.join("&"))
}

pub fn list_page_request(url: String) -> HttpRequest {
    HttpRequest::get(url).header("X-Requested-With", "XMLHttpRequest")
}

/// Fetch one page of rows as an HTML fragment
pub async fn fetch_list_page(client: &dyn FetchClient, url: String) -> Result<String, FetchError> {
    let response = client.send(list_page_request(url)).await?.success()?;
    Ok(response.body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_url() {
        assert_eq!(page_url("/user_bins/", "", 2), "/user_bins/?page=2");
        assert_eq!(page_url("/", "?page=1", 3), "/?page=3");
        assert_eq!(page_url("/", "?q=rust&page=4&lang=py", 5), "/?q=rust&lang=py&page=5");
        assert_eq!(page_url("/", "?pages=9", 2), "/?pages=9&page=2");
    }

    #[test]
    fn test_fragment_request_header() {
        let req = list_page_request(page_url("/", "", 2));
        assert_eq!(req.header_value("X-Requested-With"), Some("XMLHttpRequest"));
        assert_eq!(req.url, "/?page=2");
    }
}
