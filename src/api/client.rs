//! HTTP client for the claimdesk REST API

use reqwest::{multipart::Form, Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::api::error::{ApiError, HttpValidationError, Result};
use crate::api::resources::{ClaimsApi, ContractorsApi, CountriesApi, ProjectsApi};

/// Default page size for list endpoints
pub const DEFAULT_LIMIT: u32 = 100;

/// Offset/limit pagination for list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListParams {
    pub offset: u32,
    pub limit: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ListParams {
    pub fn page(offset: u32, limit: u32) -> Self {
        Self { offset, limit }
    }

    /// Parameters for the page after this one
    pub fn next(&self) -> Self {
        Self {
            offset: self.offset + self.limit,
            limit: self.limit,
        }
    }

    fn query(&self) -> [(&'static str, String); 2] {
        [
            ("offset", self.offset.to_string()),
            ("limit", self.limit.to_string()),
        ]
    }
}

/// Body of an empty (204) response
#[derive(Debug, Default, Deserialize)]
pub struct Empty {}

/// HTTP client for the REST API
///
/// # Example
///
/// ```rust,no_run
/// use claimdesk::api::{ApiClient, ListParams};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::new("http://localhost:8000", None)?;
/// let projects = client.projects().list(ListParams::default()).await?;
/// println!("{} projects", projects.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    /// Create a client for the given base URL
    ///
    /// No timeout is applied unless one is given.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidBaseUrl(base_url));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url,
            http: builder.build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn countries(&self) -> CountriesApi<'_> {
        CountriesApi::new(self)
    }

    pub fn projects(&self) -> ProjectsApi<'_> {
        ProjectsApi::new(self)
    }

    pub fn contractors(&self) -> ContractorsApi<'_> {
        ContractorsApi::new(self)
    }

    pub fn claims(&self) -> ClaimsApi<'_> {
        ClaimsApi::new(self)
    }

    // ==================== Request helpers ====================

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(%method, path, "api request");
        self.http.request(method, self.url(path))
    }

    /// `GET {collection}?offset=&limit=`
    pub(crate) async fn list<T: DeserializeOwned>(
        &self,
        collection: &str,
        params: ListParams,
    ) -> Result<Vec<T>> {
        let req = self.request(Method::GET, collection).query(&params.query());
        self.send(req).await
    }

    /// `GET {collection}{id}`
    pub(crate) async fn get<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<T> {
        let req = self.request(Method::GET, &format!("{}{}", collection, id));
        self.send(req).await
    }

    /// `POST {collection}?scalars` with a multipart body
    pub(crate) async fn create<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &[(&str, String)],
        form: Form,
    ) -> Result<T> {
        let req = self
            .request(Method::POST, collection)
            .query(query)
            .multipart(form);
        self.send(req).await
    }

    /// `PATCH {collection}{id}?scalars` with a multipart body
    pub(crate) async fn update<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
        query: &[(&str, String)],
        form: Form,
    ) -> Result<T> {
        let req = self
            .request(Method::PATCH, &format!("{}{}", collection, id))
            .query(query)
            .multipart(form);
        self.send(req).await
    }

    /// `DELETE {collection}{id}`
    pub(crate) async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let req = self.request(Method::DELETE, &format!("{}{}", collection, id));
        let _: Empty = self.send(req).await?;
        Ok(())
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let response = req.send().await?;
        handle_response(response).await
    }
}

/// Turn a response into a typed body or a structured error
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();

    if !status.is_success() {
        let reason = status.canonical_reason().unwrap_or("Unknown").to_string();
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<HttpValidationError>(&body).ok();
        debug!(status = status.as_u16(), %body, "api error response");
        return Err(ApiError::Status {
            status: status.as_u16(),
            reason,
            detail,
        });
    }

    let bytes = response.bytes().await?;
    decode_body(status, &bytes)
}

/// Decode a successful body, normalizing 204/empty bodies to `{}`
fn decode_body<T: DeserializeOwned>(status: StatusCode, bytes: &[u8]) -> Result<T> {
    let is_blank = bytes.iter().all(|b| b.is_ascii_whitespace());
    if status == StatusCode::NO_CONTENT || is_blank {
        return Ok(serde_json::from_str("{}")?);
    }
    Ok(serde_json::from_slice(bytes)?)
}
