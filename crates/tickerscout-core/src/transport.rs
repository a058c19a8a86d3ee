use std::collections::{BTreeMap, VecDeque};
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

/// Outbound HTTP request envelope.
///
/// Every acquisition path is a plain GET; auth state (cookie, crumb)
/// travels in headers and query parameters assembled by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub timeout_ms: u64,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
            timeout_ms: 10_000,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// HTTP response envelope returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            headers: BTreeMap::new(),
        }
    }

    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level error, below any HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    message: String,
    retryable: bool,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }

    pub fn non_retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TransportError {}

/// Transport contract every acquisition path goes through.
///
/// Implementations must be callable from concurrent tasks; the boxed
/// future keeps the trait object-safe.
pub trait HttpTransport: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + 'a>>;
}

/// No-op transport answering every request with an empty JSON body.
#[derive(Debug, Default)]
pub struct NoopTransport;

impl HttpTransport for NoopTransport {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + 'a>> {
        let _ = request;
        Box::pin(async move { Ok(HttpResponse::ok("{}")) })
    }
}

/// Production transport backed by `reqwest`.
///
/// The underlying client keeps a cookie store so upstream-set session
/// cookies survive between calls even when the caller does not manage
/// them explicitly.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Arc<reqwest::Client>,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: Arc::new(
                reqwest::Client::builder()
                    .user_agent("tickerscout/0.1.0")
                    .cookie_store(true)
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new()),
            ),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + 'a>> {
        Box::pin(async move {
            let mut builder = self.client.get(&request.url);

            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            builder = builder.timeout(std::time::Duration::from_millis(request.timeout_ms));

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    TransportError::new(format!("request timeout: {e}"))
                } else if e.is_connect() {
                    TransportError::new(format!("connection failed: {e}"))
                } else {
                    TransportError::new(format!("request failed: {e}"))
                }
            })?;

            let status = response.status().as_u16();
            let mut headers = BTreeMap::new();
            for (name, value) in response.headers() {
                if let Ok(text) = value.to_str() {
                    headers.insert(name.as_str().to_ascii_lowercase(), text.to_string());
                }
            }

            let body = response
                .text()
                .await
                .map_err(|e| TransportError::new(format!("failed to read response body: {e}")))?;

            Ok(HttpResponse {
                status,
                body,
                headers,
            })
        })
    }
}

/// Deterministic offline transport.
///
/// Answers from a FIFO script first, then from URL-substring routes;
/// records every request it sees. Drives both the behavior tests and
/// the CLI's `--mock` mode, so no canned-data branch exists inside the
/// acquisition code itself.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    routes: Mutex<Vec<(String, HttpResponse)>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next scripted reply (consumed in order).
    pub fn push_response(&self, response: HttpResponse) {
        self.script
            .lock()
            .expect("transport script lock should not be poisoned")
            .push_back(Ok(response));
    }

    pub fn push_ok(&self, body: impl Into<String>) {
        self.push_response(HttpResponse::ok(body));
    }

    pub fn push_status(&self, status: u16, body: impl Into<String>) {
        self.push_response(HttpResponse::with_status(status, body));
    }

    pub fn push_error(&self, error: TransportError) {
        self.script
            .lock()
            .expect("transport script lock should not be poisoned")
            .push_back(Err(error));
    }

    /// Register a fallback reply for any URL containing `pattern`.
    ///
    /// Routes are consulted only when the FIFO script is empty, in
    /// registration order.
    pub fn route(&self, pattern: impl Into<String>, response: HttpResponse) {
        self.routes
            .lock()
            .expect("transport routes lock should not be poisoned")
            .push((pattern.into(), response));
    }

    /// Every request executed so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen
            .lock()
            .expect("transport seen lock should not be poisoned")
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.seen
            .lock()
            .expect("transport seen lock should not be poisoned")
            .len()
    }
}

impl HttpTransport for ScriptedTransport {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + 'a>> {
        Box::pin(async move {
            self.seen
                .lock()
                .expect("transport seen lock should not be poisoned")
                .push(request.clone());

            if let Some(scripted) = self
                .script
                .lock()
                .expect("transport script lock should not be poisoned")
                .pop_front()
            {
                return scripted;
            }

            let routes = self
                .routes
                .lock()
                .expect("transport routes lock should not be poisoned");
            for (pattern, response) in routes.iter() {
                if request.url.contains(pattern.as_str()) {
                    return Ok(response.clone());
                }
            }

            Err(TransportError::non_retryable(format!(
                "scripted transport has no reply for {}",
                request.url
            )))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_replies_are_consumed_in_order() {
        let transport = ScriptedTransport::new();
        transport.push_ok("first");
        transport.push_status(503, "second");

        let a = transport
            .execute(HttpRequest::get("https://example.test/a"))
            .await
            .expect("scripted");
        let b = transport
            .execute(HttpRequest::get("https://example.test/b"))
            .await
            .expect("scripted");

        assert_eq!(a.body, "first");
        assert_eq!(b.status, 503);
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn routes_answer_when_script_is_empty() {
        let transport = ScriptedTransport::new();
        transport.route("/markets/crypto", HttpResponse::ok("<table></table>"));

        let hit = transport
            .execute(HttpRequest::get("https://example.test/markets/crypto"))
            .await
            .expect("routed");
        assert_eq!(hit.body, "<table></table>");

        let miss = transport
            .execute(HttpRequest::get("https://example.test/other"))
            .await
            .expect_err("unrouted");
        assert!(!miss.retryable());
    }

    #[test]
    fn request_headers_are_lowercased() {
        let request = HttpRequest::get("https://example.test").with_header("Cookie", "A1=b");
        assert_eq!(request.header("cookie"), Some("A1=b"));
        assert_eq!(request.header("COOKIE"), Some("A1=b"));
    }

    #[test]
    fn response_header_lookup_is_case_insensitive() {
        let response = HttpResponse::ok("").with_header("Set-Cookie", "A3=d; Path=/");
        assert_eq!(response.header("set-cookie"), Some("A3=d; Path=/"));
    }
}
