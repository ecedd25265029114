//! Minimal HTTP client with safe logging and flexible query auth.
//!
//! - Request options: query params, `Auth::Query` (api-key style), timeout
//! - Redacts sensitive query params and never logs secret values
//! - No retry logic: every failure surfaces as a distinguishable
//!   [`HttpError`] and retrying is the caller's responsibility
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), multa_http::HttpError> {
//! let client = multa_http::HttpClient::new("https://2captcha.com")?;
//! let got: serde_json::Value = client
//!     .get_json("res.php", multa_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response status/timing, decode failures, and final errors. Query params
//! with secret-looking names only ever appear as `<redacted>`.

use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::time::Duration;
use thiserror::Error;

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}")]
    Api { status: StatusCode, message: String },
}

// ==============================
// Auth & Request Options
// ==============================

/// Authentication strategies supported by the HTTP client helpers.
///
/// The captcha provider authenticates via an api-key query parameter, so
/// that is the only non-trivial strategy carried here.
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// Auth via query param (e.g. `?key=<apiKey>`).
    Query { name: &'a str, value: Cow<'a, str> },
    None,
}

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use multa_http::{Auth, RequestOpts};
/// use std::borrow::Cow;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     auth: Some(Auth::Query {
///         name: "key",
///         value: Cow::Borrowed("demo"),
///     }),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub auth: Option<Auth<'a>>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>, // e.g. [("action", "get".into())]
}

// ==============================
// Client
// ==============================

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use multa_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://2captcha.com")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(15),
        })
    }

    /// GET JSON with per-request options (query/auth/timeout).
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        self.request_json_internal(Method::GET, path, opts).await
    }

    // ==============================
    // Core request implementation
    // ==============================

    async fn request_json_internal<T>(
        &self,
        method: Method,
        path: &str,
        mut opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let url = self
            .base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))?;

        // ----- Build request -----
        let mut rb = self.inner.request(method.clone(), url.clone());

        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        rb = rb.timeout(timeout);

        // Fold query auth into the query list before it is applied.
        if let Some(Auth::Query { name, value }) = &opts.auth {
            let mut q = opts.query.take().unwrap_or_default();
            q.push((*name, value.clone()));
            opts.query = Some(q);
        }

        if let Some(q) = &opts.query {
            let pairs: Vec<(&str, &str)> = q.iter().map(|(k, v)| (*k, v.as_ref())).collect();
            rb = rb.query(&pairs);
        }

        // ----- Safe request logging (pre-send) -----
        let redacted_q: Vec<(String, String)> = opts
            .query
            .as_ref()
            .map(|q| q.iter().map(|(k, v)| redact_pair(k, v.as_ref())).collect())
            .unwrap_or_default();

        let host_path = format!("{}{}", url.domain().unwrap_or("-"), url.path());
        tracing::debug!(
            method=%method,
            host_path=%host_path,
            query=?redacted_q,
            timeout_ms=timeout.as_millis() as u64,
            "http.request.start"
        );

        // ----- Send -----
        let t0 = std::time::Instant::now();
        let resp = rb.send().await.map_err(|err| {
            let message = err.to_string();
            tracing::warn!(host_path=%host_path, message=%message, "http.network_error.send");
            HttpError::Network {
                url: host_path.clone(),
                message,
            }
        })?;

        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|err| {
            let message = err.to_string();
            tracing::warn!(host_path=%host_path, message=%message, "http.network_error.body");
            HttpError::Network {
                url: host_path.clone(),
                message,
            }
        })?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        let snippet = snip_body(&bytes);
        tracing::debug!(
            %status,
            duration_ms=dur_ms,
            body_len=bytes.len(),
            "http.response"
        );
        tracing::trace!(body_snippet=%snippet, "http.response.body_snippet");

        if status.is_success() {
            return serde_json::from_slice::<T>(&bytes).map_err(|e| {
                tracing::warn!(
                    serde_err=%e.to_string(),
                    body_snippet=%snippet,
                    "http.response.decode_error"
                );
                HttpError::Decode(e.to_string(), snippet)
            });
        }

        tracing::warn!(%status, body_snippet=%snippet, "http.error");
        Err(HttpError::Api {
            status,
            message: snippet,
        })
    }
}

// ==============================
// Helpers
// ==============================

fn redact_pair(k: &str, v: &str) -> (String, String) {
    let is_secret = matches!(
        k.to_ascii_lowercase().as_str(),
        "access_token"
            | "authorization"
            | "auth"
            | "key"
            | "api_key"
            | "token"
            | "secret"
            | "client_secret"
            | "bearer"
    );
    (
        k.to_string(),
        if is_secret {
            "<redacted>".to_string()
        } else {
            v.to_string()
        },
    )
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > 500 {
        // Cut on a char boundary; a multibyte character straddling the cap
        // must not turn a bad provider response into a panic.
        let mut cut = 500;
        while !snip.is_char_boundary(cut) {
            cut -= 1;
        }
        snip.truncate(cut);
        snip.push_str("...");
    }
    snip
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_query_params_are_redacted() {
        assert_eq!(redact_pair("key", "s3cret").1, "<redacted>");
        assert_eq!(redact_pair("API_KEY", "s3cret").1, "<redacted>");
        assert_eq!(redact_pair("action", "get").1, "get");
    }

    #[test]
    fn long_bodies_are_snipped() {
        let body = vec![b'x'; 2000];
        let snip = snip_body(&body);
        assert!(snip.ends_with("..."));
        assert_eq!(snip.len(), 503);
    }

    #[test]
    fn snipping_respects_multibyte_char_boundaries() {
        // 'é' straddles the 500-byte cap: its two bytes sit at 499..501.
        let mut body = vec![b'x'; 499];
        body.extend_from_slice("ééé".as_bytes());
        let snip = snip_body(&body);
        assert!(snip.ends_with("..."));
        assert!(snip.len() <= 503);
        assert!(snip.starts_with(&"x".repeat(499)));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            HttpClient::new("not a url"),
            Err(HttpError::Url(_))
        ));
    }
}
