//! HTTP retrieval of raw feed bytes.

pub mod auth;
mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use std::time::Duration;

use bytes::Bytes;
use reqwest::Url;
use tracing::debug;

use crate::error::{ConfigError, FeedError};
use crate::parser::FeedKind;
use self::auth::{ApiKey, FeedAuth, UrlParam, append_query_param};

/// Query parameter that defeats intermediate caches.
pub const CACHE_BUST_PARAM: &str = "cacheBust";

/// Issues a single GET and returns the body. Non-2xx statuses are errors.
pub async fn fetch_bytes<C: HttpClient + ?Sized>(client: &C, url: &Url) -> reqwest::Result<Bytes> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.clone());

    let resp = client.execute(req).await?.error_for_status()?;
    resp.bytes().await
}

/// Fetches one feed with `cacheBust=<token>` appended to `endpoint`.
///
/// Exactly one attempt is made; the next poll is the retry.
#[tracing::instrument(skip(client, endpoint), fields(url = %endpoint))]
pub async fn fetch_feed<C: HttpClient + ?Sized>(
    client: &C,
    kind: FeedKind,
    endpoint: &Url,
    cache_bust: &str,
) -> Result<Bytes, FeedError> {
    let url = append_query_param(endpoint, CACHE_BUST_PARAM, cache_bust);

    let bytes = fetch_bytes(client, &url)
        .await
        .map_err(|source| FeedError::Fetch {
            kind,
            url: url.to_string(),
            source,
        })?;

    debug!(bytes = bytes.len(), "Feed bytes received");
    Ok(bytes)
}

/// Builds the client stack for the configured authentication scheme.
pub fn build_client(
    auth: &FeedAuth,
    timeout: Duration,
    connect_timeout: Duration,
) -> Result<Box<dyn HttpClient>, ConfigError> {
    let basic = BasicClient::new(timeout, connect_timeout)?;

    let client: Box<dyn HttpClient> = match auth {
        FeedAuth::None => Box::new(basic),
        FeedAuth::UrlParam { param_name, key } => Box::new(UrlParam {
            inner: basic,
            param_name: param_name.clone(),
            key: key.clone(),
        }),
        FeedAuth::Header { header_name, key } => Box::new(ApiKey::new(basic, header_name, key)?),
    };
    Ok(client)
}
