mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use serde::Serialize;

/// Sends `body` as JSON to `url` and returns the raw response body.
///
/// Non-success statuses become errors carrying the status and the body text.
pub async fn post_json<C: HttpClient, B: Serialize>(
    client: &C,
    url: reqwest::Url,
    body: &B,
) -> Result<Vec<u8>> {
    let mut req = reqwest::Request::new(reqwest::Method::POST, url);
    req.headers_mut().insert(
        reqwest::header::CONTENT_TYPE,
        reqwest::header::HeaderValue::from_static("application/json"),
    );
    *req.body_mut() = Some(serde_json::to_vec(body)?.into());

    let resp = client
        .execute(req)
        .await
        .context("Failed to send request")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(anyhow::anyhow!("API returned status {}: {}", status, body));
    }

    Ok(resp.bytes().await?.to_vec())
}
