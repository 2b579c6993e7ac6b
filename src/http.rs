//! HTTP client wrapper for GM Data requests.

use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::error::{DataError, Result};

/// Header carrying the caller's identity on every request.
pub const IDENTITY_HEADER: &str = "USER_DN";

/// HTTP client bound to one GM Data deployment.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    identity: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client.
    ///
    /// # Arguments
    /// * `base_url` - URL that GM Data lives at; endpoint suffixes are appended to it
    /// * `identity` - Optional `USER_DN` value attached to every request
    pub fn new(base_url: &str, identity: Option<&str>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            identity: identity.map(str::to_string),
        }
    }

    /// The base URL with any trailing slash removed.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an endpoint suffix such as `/list/1/`.
    pub fn url(&self, suffix: &str) -> String {
        if suffix.starts_with('/') {
            format!("{}{}", self.base_url, suffix)
        } else {
            format!("{}/{}", self.base_url, suffix)
        }
    }

    /// Start a request with the identity header already applied.
    pub fn request(&self, method: Method, suffix: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(suffix));
        match &self.identity {
            Some(dn) => builder.header(IDENTITY_HEADER, dn),
            None => builder,
        }
    }

    /// Send a GET and fail on any non-success status.
    pub async fn get(&self, suffix: &str) -> Result<Response> {
        let response = self.request(Method::GET, suffix).send().await?;
        check_status(response)
    }

    /// GET an endpoint and return its body as text.
    pub async fn get_text(&self, suffix: &str) -> Result<String> {
        Ok(self.get(suffix).await?.text().await?)
    }

    /// GET an endpoint and decode its JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, suffix: &str) -> Result<T> {
        let body = self.get_text(suffix).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// POST a multipart form and return the response body as text.
    pub async fn post_multipart(&self, suffix: &str, form: Form) -> Result<String> {
        let response = self
            .request(Method::POST, suffix)
            .multipart(form)
            .send()
            .await?;
        Ok(check_status(response)?.text().await?)
    }
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if !status.is_success() {
        return Err(DataError::HttpError(status.as_u16()));
    }
    Ok(response)
}
