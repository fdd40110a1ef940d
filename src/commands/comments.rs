//! Comment Commands

use super::http::{FetchClient, FetchError, HttpRequest};
use super::Endpoints;
use crate::models::CommentResponse;

pub fn submit_comment_request(endpoints: &Endpoints, bin_id: &str, fields: &[(String, String)]) -> HttpRequest {
    endpoints
        .with_csrf(HttpRequest::post(endpoints.comment_url(bin_id)))
        .form(fields)
}

/// Post a comment form. Error statuses that still carry the JSON reply are
/// returned as a reply so the server's message can be shown.
pub async fn submit_comment(
    client: &dyn FetchClient,
    endpoints: &Endpoints,
    bin_id: &str,
    fields: &[(String, String)],
) -> Result<CommentResponse, FetchError> {
    let response = client.send(submit_comment_request(endpoints, bin_id, fields)).await?;
    match response.json::<CommentResponse>() {
        Ok(reply) => Ok(reply),
        Err(_) if !response.is_success() => Err(FetchError::Status {
            status: response.status,
            body: response.body,
        }),
        Err(err) => Err(err),
    }
}
