//! HTTP request/response values and the transport seam.
//!
//! ARCHITECTURE
//! ============
//! Auth and API layers build plain [`HttpRequest`] values and hand them to a
//! [`Transport`]. In the browser that is [`GlooTransport`] (`gloo-net`); host
//! builds get [`OfflineTransport`], and tests script their own backend. Keeping
//! the seam this narrow lets the refresh/retry logic run under a host executor.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self { method, url: url.into(), headers: Vec::new(), body: None }
    }

    /// Attach a JSON body and the matching content type.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Decode`] if the value cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ClientError> {
        let raw = serde_json::to_string(body).map_err(|e| ClientError::Decode(e.to_string()))?;
        self.set_header("Content-Type", "application/json");
        self.body = Some(raw);
        Ok(self)
    }

    /// Replace (or drop) the bearer credential.
    #[must_use]
    pub fn with_bearer(mut self, token: Option<&str>) -> Self {
        self.headers.retain(|(name, _)| !name.eq_ignore_ascii_case("authorization"));
        if let Some(token) = token {
            self.headers.push(("Authorization".to_owned(), format!("Bearer {token}")));
        }
        self
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Token currently carried in the `Authorization` header, if any.
    #[must_use]
    pub fn bearer(&self) -> Option<&str> {
        self.header("authorization").and_then(|value| value.strip_prefix("Bearer "))
    }

    fn set_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        self.headers.push((name.to_owned(), value.to_owned()));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Decode`] when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_str(&self.body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Map a non-success response onto the error taxonomy.
    ///
    /// `entity` names the resource for 404 messages (e.g. `"Course"`).
    #[must_use]
    pub fn into_error(self, entity: &str) -> ClientError {
        let message = response_message(&self.body);
        match self.status {
            400 => ClientError::Validation(message.unwrap_or_else(|| "The request was rejected.".to_owned())),
            401 => ClientError::TokenExpired,
            403 => ClientError::Forbidden(
                message.unwrap_or_else(|| "You do not have permission to access this resource.".to_owned()),
            ),
            404 => ClientError::NotFound(entity.to_owned()),
            status => ClientError::Http { status, message: message.unwrap_or_else(|| "unexpected response".to_owned()) },
        }
    }
}

/// Pull a human-readable message out of a JSON error body.
///
/// Looks at `detail`, `error`, then `message`; DRF field errors
/// (`{"title": ["This field is required."]}`) fall back to the first entry.
#[must_use]
pub fn response_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;
    for key in ["detail", "error", "message"] {
        if let Some(text) = object.get(key).and_then(serde_json::Value::as_str) {
            return Some(text.to_owned());
        }
    }
    object.iter().find_map(|(field, errors)| {
        let first = errors.as_array()?.first()?.as_str()?;
        Some(format!("{field}: {first}"))
    })
}

/// Sends requests. Implementations never retry; that is the interceptor's job.
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError>;
}

/// Transport for builds without a browser; every call fails as a network error.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineTransport;

#[async_trait(?Send)]
impl Transport for OfflineTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        Err(ClientError::Network(format!("{} {} not available outside the browser", request.method.as_str(), request.url)))
    }
}

/// Browser transport backed by `gloo-net`.
#[cfg(feature = "csr")]
#[derive(Debug, Default, Clone, Copy)]
pub struct GlooTransport;

#[cfg(feature = "csr")]
#[async_trait(?Send)]
impl Transport for GlooTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        use gloo_net::http::RequestBuilder;

        let method = match request.method {
            Method::Get => gloo_net::http::Method::GET,
            Method::Post => gloo_net::http::Method::POST,
            Method::Put => gloo_net::http::Method::PUT,
            Method::Delete => gloo_net::http::Method::DELETE,
        };
        let mut builder = RequestBuilder::new(&request.url).method(method);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        let built = match request.body {
            Some(body) => builder.body(body),
            None => builder.build(),
        }
        .map_err(|e| ClientError::Network(e.to_string()))?;

        let resp = built.send().await.map_err(|e| ClientError::Network(e.to_string()))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}
