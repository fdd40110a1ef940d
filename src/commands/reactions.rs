//! Reaction Commands
//!
//! Bindings for the like/dislike endpoint.

use super::http::{FetchClient, FetchError, HttpRequest};
use super::Endpoints;
use crate::models::{ReactionCounts, ReactionIntent};

pub fn get_reactions_request(endpoints: &Endpoints, bin_id: &str) -> HttpRequest {
    HttpRequest::get(endpoints.reactions_url(bin_id))
}

pub fn cast_reaction_request(endpoints: &Endpoints, bin_id: &str, intent: ReactionIntent) -> HttpRequest {
    endpoints
        .with_csrf(HttpRequest::post(endpoints.reactions_url(bin_id)))
        .form(&[("is_like", intent.is_like())])
}

pub async fn get_reactions(
    client: &dyn FetchClient,
    endpoints: &Endpoints,
    bin_id: &str,
) -> Result<ReactionCounts, FetchError> {
    client.send(get_reactions_request(endpoints, bin_id)).await?.success()?.json()
}

pub async fn cast_reaction(
    client: &dyn FetchClient,
    endpoints: &Endpoints,
    bin_id: &str,
    intent: ReactionIntent,
) -> Result<ReactionCounts, FetchError> {
    client.send(cast_reaction_request(endpoints, bin_id, intent)).await?.success()?.json()
}
