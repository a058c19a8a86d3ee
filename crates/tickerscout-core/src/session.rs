//! Authenticated session with single-shot refresh on auth rejection.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{FetchError, FetchErrorKind};
use crate::transport::{HttpRequest, HttpTransport};

pub(crate) const REFERER: &str = "https://finance.yahoo.com/";

/// Builds a fresh transport whenever the session is rebuilt.
pub type TransportFactory = Arc<dyn Fn() -> Arc<dyn HttpTransport> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Endpoint that issues the session cookie.
    pub cookie_url: String,
    /// Crumb endpoints, tried in order.
    pub crumb_urls: Vec<String>,
    /// Pause between discarding a rejected session and rebuilding it.
    pub cooldown: Duration,
    pub request_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_url: String::from("https://fc.yahoo.com/"),
            crumb_urls: vec![
                String::from("https://query1.finance.yahoo.com/v1/test/getcrumb"),
                String::from("https://query2.finance.yahoo.com/v1/test/getcrumb"),
            ],
            cooldown: Duration::from_secs(3),
            request_timeout_ms: 10_000,
        }
    }
}

/// Auth state attached to document requests: the session cookie goes
/// in a header, the crumb in a query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionAuth {
    pub cookie: String,
    pub crumb: String,
}

/// Stateful upstream session holding lazily acquired cookie + crumb.
///
/// The upstream can silently invalidate a session: a 200 response
/// whose payload carries an auth sentinel. Operations report that as
/// an auth-expired error and [`CrumbSession::with_refresh`] reacts by
/// discarding the session, cooling down, building a fresh client, and
/// re-invoking the operation exactly once. A second rejection goes
/// back to the caller untouched so the outer retry policy sees it.
pub struct CrumbSession {
    config: SessionConfig,
    factory: TransportFactory,
    transport: Mutex<Arc<dyn HttpTransport>>,
    auth: Mutex<Option<SessionAuth>>,
}

impl CrumbSession {
    pub fn new(config: SessionConfig, factory: TransportFactory) -> Self {
        let transport = factory();
        Self {
            config,
            factory,
            transport: Mutex::new(transport),
            auth: Mutex::new(None),
        }
    }

    /// Session over one shared transport; rebuilds reuse it. Serves
    /// tests and mock mode, where the transport is scripted.
    pub fn with_transport(config: SessionConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self::new(config, Arc::new(move || transport.clone()))
    }

    fn current_transport(&self) -> Arc<dyn HttpTransport> {
        self.transport
            .lock()
            .expect("session transport lock should not be poisoned")
            .clone()
    }

    /// Drop cached auth; the next call re-acquires lazily.
    pub fn invalidate(&self) {
        *self
            .auth
            .lock()
            .expect("session auth lock should not be poisoned") = None;
    }

    /// Discard the session, wait out the cooldown, swap in a fresh
    /// client from the factory.
    pub async fn refresh(&self) {
        self.invalidate();
        if !self.config.cooldown.is_zero() {
            tokio::time::sleep(self.config.cooldown).await;
        }
        let fresh = (self.factory)();
        *self
            .transport
            .lock()
            .expect("session transport lock should not be poisoned") = fresh;
        info!("session rebuilt with a fresh client");
    }

    /// Run an authenticated operation, refreshing the session at most
    /// once when it reports an auth rejection.
    pub async fn with_refresh<T, F>(&self, operation: F) -> Result<T, FetchError>
    where
        F: Fn(
            Arc<dyn HttpTransport>,
            &SessionAuth,
        ) -> Pin<Box<dyn Future<Output = Result<T, FetchError>> + Send + 'static>>,
    {
        let auth = self.ensure_auth().await?;
        let first = operation(self.current_transport(), &auth).await;
        match first {
            Err(error) if error.kind() == FetchErrorKind::AuthExpired => {
                warn!(
                    code = error.code(),
                    message = error.message(),
                    cooldown_ms = self.config.cooldown.as_millis() as u64,
                    "auth rejected mid-session, rebuilding"
                );
                self.refresh().await;
                let auth = self.ensure_auth().await?;
                operation(self.current_transport(), &auth).await
            }
            other => other,
        }
    }

    /// Return cached auth or acquire it: cookie first, then a crumb
    /// minted against that cookie.
    ///
    /// Acquisition runs outside the state lock; concurrent first
    /// callers may race and the last write wins, which only costs a
    /// duplicate handshake.
    pub async fn ensure_auth(&self) -> Result<SessionAuth, FetchError> {
        if let Some(auth) = self
            .auth
            .lock()
            .expect("session auth lock should not be poisoned")
            .clone()
        {
            return Ok(auth);
        }

        let transport = self.current_transport();

        let cookie_request = HttpRequest::get(&self.config.cookie_url)
            .with_header("referer", REFERER)
            .with_timeout_ms(self.config.request_timeout_ms);
        let cookie_response = transport.execute(cookie_request).await.map_err(|e| {
            FetchError::transport(format!("session cookie fetch failed: {}", e.message()))
        })?;

        let cookie = cookie_response
            .header("set-cookie")
            .map(leading_cookie)
            .filter(|cookie| !cookie.is_empty())
            .ok_or_else(|| FetchError::auth_expired("upstream issued no session cookie"))?;

        for crumb_url in &self.config.crumb_urls {
            let crumb_request = HttpRequest::get(crumb_url)
                .with_header("cookie", cookie.clone())
                .with_header("referer", REFERER)
                .with_timeout_ms(self.config.request_timeout_ms);

            match transport.execute(crumb_request).await {
                Ok(response) if response.is_success() && !response.body.is_empty() => {
                    let body = response.body.trim();
                    if body.contains("<html") || body.contains("<!DOCTYPE") {
                        debug!(crumb_url, "crumb endpoint answered with an error page");
                        continue;
                    }
                    if body.to_lowercase().contains("too many requests") {
                        return Err(FetchError::upstream(429, crumb_url));
                    }
                    if body.len() < 100 && !body.contains(' ') {
                        let auth = SessionAuth {
                            cookie: cookie.clone(),
                            crumb: body.to_string(),
                        };
                        *self
                            .auth
                            .lock()
                            .expect("session auth lock should not be poisoned") =
                            Some(auth.clone());
                        debug!("session auth acquired");
                        return Ok(auth);
                    }
                }
                _ => continue,
            }
        }

        Err(FetchError::auth_expired(
            "no crumb endpoint yielded a usable token",
        ))
    }
}

/// Cookie value without its attributes (`A3=d; Path=/` -> `A3=d`).
fn leading_cookie(header: &str) -> String {
    header.split(';').next().unwrap_or("").trim().to_string()
}
