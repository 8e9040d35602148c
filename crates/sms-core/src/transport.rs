use std::time::Duration;

use async_trait::async_trait;

use crate::Headers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Fully built provider request, independent of any HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub body: Option<String>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// First header value with the given name, case-insensitive.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body with any leading raw header block removed.
    ///
    /// Some transports hand back the status line and headers in front of the
    /// payload; everything up to the last blank line of that block is dropped.
    pub fn payload(&self) -> &str {
        let mut rest = self.body.as_str();
        while rest.starts_with("HTTP/") {
            match rest.find("\r\n\r\n") {
                Some(idx) => rest = &rest[idx + 4..],
                None => match rest.find("\n\n") {
                    Some(idx) => rest = &rest[idx + 2..],
                    None => return "",
                },
            }
        }
        rest
    }
}

/// Network level failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Map into the adapter-facing error for `provider`.
    pub fn into_sms_error(self, provider: &'static str) -> crate::SmsError {
        match self {
            TransportError::Timeout(_) => crate::SmsError::Timeout { provider },
            other => crate::SmsError::Http {
                provider,
                message: other.to_string(),
            },
        }
    }
}

/// Executes provider requests. Implementations must not interpret status codes.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[cfg(feature = "reqwest")]
pub use self::reqwest_transport::ReqwestTransport;

#[cfg(feature = "reqwest")]
mod reqwest_transport {
    use super::*;
    use tracing::debug;

    /// [`HttpTransport`] backed by a shared `reqwest::Client`.
    #[derive(Debug, Clone, Default)]
    pub struct ReqwestTransport {
        http: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_client(http: reqwest::Client) -> Self {
            Self { http }
        }

        /// Client sending a fixed `User-Agent`.
        pub fn with_user_agent(user_agent: &str) -> Result<Self, TransportError> {
            let http = reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .map_err(classify)?;
            Ok(Self { http })
        }
    }

    fn classify(e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout(e.to_string())
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Other(e.to_string())
        }
    }

    #[async_trait]
    impl HttpTransport for ReqwestTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            let mut builder = match request.method {
                Method::Get => self.http.get(&request.url),
                Method::Post => self.http.post(&request.url),
            };
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }
            if let Some(timeout) = request.timeout {
                builder = builder.timeout(timeout);
            }

            let res = builder.send().await.map_err(classify)?;
            let status = res.status().as_u16();
            debug!("{:?} request answered with HTTP {}", request.method, status);
            let body = res.text().await.map_err(classify)?;
            Ok(HttpResponse { status, body })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_strips_header_block() {
        let res = HttpResponse::new(
            200,
            "HTTP/1.1 100 Continue\r\n\r\nHTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nOK:61400000000:42",
        );
        assert_eq!(res.payload(), "OK:61400000000:42");

        let res = HttpResponse::new(200, "{\"ok\":true}");
        assert_eq!(res.payload(), "{\"ok\":true}");
    }

    #[test]
    fn timeout_maps_to_distinct_error() {
        let err = TransportError::Timeout("deadline".into()).into_sms_error("Messagenet");
        assert!(err.is_timeout());
        let err = TransportError::Connect("refused".into()).into_sms_error("Messagenet");
        assert!(err.is_transport() && !err.is_timeout());
    }

    #[test]
    fn request_builder_collects_headers() {
        let req = HttpRequest::post("https://example.test")
            .header("Content-Type", "application/json")
            .body("{}");
        assert_eq!(req.header_value("content-type"), Some("application/json"));
        assert_eq!(req.body.as_deref(), Some("{}"));
        assert_eq!(req.method, Method::Post);
    }
}
