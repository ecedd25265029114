//! Concrete client for the 2captcha HTTP API.
//!
//! Both endpoints are plain GETs with the api key as a query parameter and
//! `json=true` to get the JSON envelope instead of the pipe-separated legacy
//! format. Retrying is owned by [`crate::resolver`], never here.

use crate::types::{ChallengeRequest, ChallengeTicket, SolverReply};
use async_trait::async_trait;
use multa_http::{Auth, HttpClient, HttpError, RequestOpts};
use std::borrow::Cow;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptchaError {
    /// The provider credential is absent; checked before any network call.
    #[error("captcha api key is missing or empty")]
    MissingApiKey,
    #[error(transparent)]
    Http(#[from] HttpError),
}

/// Seam between the resolver state machine and the provider wire protocol.
///
/// The resolver is generic over this trait so its retry/poll behaviour can
/// be exercised against scripted replies without a network.
#[async_trait]
pub trait SolverTransport: Send + Sync {
    /// Hand a challenge to the provider; an accepted reply carries a ticket id.
    async fn submit(&self, request: &ChallengeRequest) -> Result<SolverReply, HttpError>;

    /// Ask whether the ticket's challenge has been solved yet.
    async fn poll(&self, ticket: &ChallengeTicket) -> Result<SolverReply, HttpError>;
}

/// 2captcha client for reCAPTCHA v2 challenges.
#[derive(Clone)]
pub struct TwoCaptchaApi {
    http: HttpClient,
    api_key: String,
}

impl TwoCaptchaApi {
    /// Build a client for the given provider endpoint.
    ///
    /// An empty api key is rejected here so misconfiguration surfaces at
    /// startup rather than as a failed submission mid-lookup.
    pub fn new(api_key: impl Into<String>, base_url: &str) -> Result<Self, CaptchaError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(CaptchaError::MissingApiKey);
        }
        let http = HttpClient::new(base_url)?;
        Ok(Self { http, api_key })
    }

    fn key_auth(&self) -> Auth<'_> {
        Auth::Query {
            name: "key",
            value: Cow::Borrowed(&self.api_key),
        }
    }
}

#[async_trait]
impl SolverTransport for TwoCaptchaApi {
    async fn submit(&self, request: &ChallengeRequest) -> Result<SolverReply, HttpError> {
        self.http
            .get_json(
                "in.php",
                RequestOpts {
                    auth: Some(self.key_auth()),
                    query: Some(vec![
                        ("method", "userrecaptcha".into()),
                        ("googlekey", Cow::Borrowed(request.site_key.as_str())),
                        ("pageurl", Cow::Borrowed(request.page_url.as_str())),
                        ("json", "true".into()),
                    ]),
                    ..Default::default()
                },
            )
            .await
    }

    async fn poll(&self, ticket: &ChallengeTicket) -> Result<SolverReply, HttpError> {
        self.http
            .get_json(
                "res.php",
                RequestOpts {
                    auth: Some(self.key_auth()),
                    query: Some(vec![
                        ("action", "get".into()),
                        ("id", Cow::Borrowed(ticket.id.as_str())),
                        ("json", "true".into()),
                    ]),
                    ..Default::default()
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_is_rejected_before_any_network_call() {
        assert!(matches!(
            TwoCaptchaApi::new("", "https://2captcha.com"),
            Err(CaptchaError::MissingApiKey)
        ));
        assert!(matches!(
            TwoCaptchaApi::new("   ", "https://2captcha.com"),
            Err(CaptchaError::MissingApiKey)
        ));
    }

    #[test]
    fn valid_key_builds_a_client() {
        assert!(TwoCaptchaApi::new("abc123", "https://2captcha.com").is_ok());
    }
}
