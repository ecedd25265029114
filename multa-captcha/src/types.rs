//! Wire and ownership types for the solving-service protocol.

use serde::Deserialize;

/// Reply code on a pending poll.
pub const NOT_READY: &str = "CAPCHA_NOT_READY";
/// Reply code when the provider gives up on the challenge.
pub const UNSOLVABLE: &str = "ERROR_CAPTCHA_UNSOLVABLE";

/// Common JSON envelope for both submit and poll replies.
///
/// `status == 1` marks success; `request` then carries the ticket id (on
/// submit) or the solved token (on poll). On `status == 0` it carries a
/// provider error code instead.
#[derive(Debug, Clone, Deserialize)]
pub struct SolverReply {
    pub status: i32,
    pub request: String,
}

impl SolverReply {
    pub fn is_ok(&self) -> bool {
        self.status == 1
    }
}

/// One challenge to be solved, created per lookup attempt.
#[derive(Debug, Clone)]
pub struct ChallengeRequest {
    pub site_key: String,
    pub page_url: String,
}

impl ChallengeRequest {
    pub fn new(site_key: impl Into<String>, page_url: impl Into<String>) -> Self {
        Self {
            site_key: site_key.into(),
            page_url: page_url.into(),
        }
    }
}

/// Provider-issued handle used to poll for a challenge's token.
///
/// Owned by the resolver for the lifetime of one resolution attempt and
/// dropped once that attempt reaches a terminal outcome.
#[derive(Debug)]
pub struct ChallengeTicket {
    pub id: String,
}

/// The opaque string proving a challenge was solved.
///
/// Consumed exactly once via [`SolvedToken::into_value`]; ownership keeps a
/// token from being reused across challenge requests.
#[derive(Debug)]
pub struct SolvedToken {
    value: String,
}

impl SolvedToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Hand the token over to whoever injects it into the form.
    pub fn into_value(self) -> String {
        self.value
    }
}
