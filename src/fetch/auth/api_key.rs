use crate::error::ConfigError;
use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};

/// An [`HttpClient`] wrapper that sends an API key in a request header.
///
/// The header is validated once in [`ApiKey::new`], so executing a request
/// cannot fail on a malformed name or value.
pub struct ApiKey<C> {
    inner: C,
    header_name: HeaderName,
    value: HeaderValue,
}

impl<C> ApiKey<C> {
    pub fn new(inner: C, header_name: &str, key: &str) -> Result<Self, ConfigError> {
        let header_name = HeaderName::from_bytes(header_name.as_bytes())
            .map_err(|_| ConfigError::InvalidHeader(header_name.to_string()))?;
        let mut value = HeaderValue::from_str(key)
            .map_err(|_| ConfigError::InvalidHeader(header_name.as_str().to_string()))?;
        value.set_sensitive(true);

        Ok(Self {
            inner,
            header_name,
            value,
        })
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut()
            .insert(self.header_name.clone(), self.value.clone());
        self.inner.execute(req).await
    }
}
