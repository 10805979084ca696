use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use reqwest::Url;

/// Returns `url` with `name=value` appended to its query string, keeping any
/// parameters already present.
pub fn append_query_param(url: &Url, name: &str, value: &str) -> Url {
    let mut url = url.clone();
    url.query_pairs_mut().append_pair(name, value);
    url
}

/// An [`HttpClient`] wrapper that appends an API key as a URL query parameter.
pub struct UrlParam<C> {
    pub inner: C,
    pub param_name: String,
    pub key: String,
}

#[async_trait]
impl<C: HttpClient> HttpClient for UrlParam<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        *req.url_mut() = append_query_param(req.url(), &self.param_name, &self.key);
        self.inner.execute(req).await
    }
}
