use http::{header, HeaderMap, HeaderValue, Method};
use reqwest::{redirect, Client};

pub fn build_client() -> reqwest::Result<Client> {
    // Redirects are followed so the response reflects the final target,
    // not the redirect hop itself
    Client::builder()
        .redirect(redirect::Policy::limited(10))
        .build()
}

/// Issues the single outbound call for an invocation. Only `User-Agent` and
/// `Accept` are sent to the origin; the inbound `User-Agent` is forwarded when
/// present, otherwise the configured fallback takes its place.
pub async fn send(
    client: &Client,
    method: Method,
    url: &str,
    inbound: &HeaderMap,
    fallback_user_agent: &HeaderValue,
) -> reqwest::Result<reqwest::Response> {
    let user_agent = inbound
        .get(header::USER_AGENT)
        .cloned()
        .unwrap_or_else(|| fallback_user_agent.clone());

    client
        .request(method, url)
        .header(header::USER_AGENT, user_agent)
        .header(header::ACCEPT, "*/*")
        .send()
        .await
}
