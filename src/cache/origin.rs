//! Network origin for bundle assets.
//!
//! `Origin` is the seam between the cache controller and the network: the
//! controller only ever asks an origin for the bytes behind an asset path.
//! `HttpOrigin` is the real implementation over reqwest; `NullOrigin` never
//! reaches the network and backs forced-offline operation.

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use tracing::debug;

use super::FetchError;

/// HTTP request timeout in seconds.
/// 30s tolerates slow origins while still failing over to cache promptly.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// A request for one bundle asset. Paths are relative to the bundle base
/// unless they parse as absolute URLs.
#[derive(Debug, Clone)]
pub struct AssetRequest {
    pub path: String,
    pub method: Method,
}

impl AssetRequest {
    /// A read-only request, the only kind eligible for cache writes.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: Method::GET,
        }
    }

    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }
}

/// Bytes fetched from an origin, with the content type the origin reported.
#[derive(Debug, Clone)]
pub struct FetchedAsset {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

#[async_trait]
pub trait Origin: Send + Sync {
    /// Fetch the asset behind the request from the network, using the
    /// request's method.
    async fn fetch(&self, request: &AssetRequest) -> Result<FetchedAsset, FetchError>;

    /// Whether `path` resolves inside this origin. Relative paths always do;
    /// absolute URLs are compared against the bundle base.
    fn is_same_origin(&self, path: &str) -> bool;
}

/// Real origin over HTTP.
/// Clone is cheap - reqwest::Client shares its connection pool internally.
#[derive(Clone)]
pub struct HttpOrigin {
    client: Client,
    base: Url,
}

impl HttpOrigin {
    pub fn new(base: Url) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, base })
    }

    fn resolve(&self, path: &str) -> Result<Url, FetchError> {
        if let Ok(absolute) = Url::parse(path) {
            return Ok(absolute);
        }
        self.base
            .join(path)
            .map_err(|_| FetchError::InvalidPath(path.to_string()))
    }
}

#[async_trait]
impl Origin for HttpOrigin {
    async fn fetch(&self, request: &AssetRequest) -> Result<FetchedAsset, FetchError> {
        let url = self.resolve(&request.path)?;
        debug!(%url, method = %request.method, "Fetching asset from origin");

        let response = self
            .client
            .request(request.method.clone(), url)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                path: request.path.clone(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let body = response.bytes().await?.to_vec();

        Ok(FetchedAsset { body, content_type })
    }

    fn is_same_origin(&self, path: &str) -> bool {
        match Url::parse(path) {
            Ok(absolute) => absolute.origin() == self.base.origin(),
            // Relative paths resolve against the bundle base
            Err(_) => true,
        }
    }
}

/// Origin that never reaches the network. Every fetch falls through to the
/// cache, so a missing entry surfaces as the offline error.
pub struct NullOrigin;

#[async_trait]
impl Origin for NullOrigin {
    async fn fetch(&self, request: &AssetRequest) -> Result<FetchedAsset, FetchError> {
        Err(FetchError::Unreachable(request.path.clone()))
    }

    fn is_same_origin(&self, path: &str) -> bool {
        Url::parse(path).is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_origin_same_origin() {
        let origin = HttpOrigin::new(Url::parse("https://example.com/bundle/").unwrap()).unwrap();
        assert!(origin.is_same_origin("checklists.json"));
        assert!(origin.is_same_origin("https://example.com/other.css"));
        assert!(!origin.is_same_origin("https://cdn.example.net/lib.js"));
    }

    #[tokio::test]
    async fn test_null_origin_always_fails() {
        let err = NullOrigin
            .fetch(&AssetRequest::get("checklists.json"))
            .await
            .unwrap_err();
        assert!(err.is_network_failure());
    }
}
