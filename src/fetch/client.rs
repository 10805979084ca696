use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes a prepared request. Implemented by the plain client, by the
/// authentication wrappers that decorate it, and by test doubles.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
