use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes a prepared request. Sources go through this seam so tests and
/// wrappers can stand in for the network.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
