//! Bounded submit/poll/retry state machine over a [`SolverTransport`].
//!
//! Per resolution attempt: submit the challenge, then poll at a fixed
//! interval until the provider reports a token, gives up, or returns
//! something unexpected. An unsolvable challenge (or a transport hiccup)
//! burns one of the outer submission attempts; an unexpected provider code
//! is terminal for the whole chain so provider-side faults are not masked
//! as transient.

use crate::client::SolverTransport;
use crate::types::{self, ChallengeRequest, ChallengeTicket, SolvedToken};
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Tuning knobs for [`CaptchaResolver`].
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    /// Fixed pause between status polls.
    pub poll_interval: Duration,
    /// Maximum number of full submission cycles.
    pub max_attempts: u32,
    /// Wall-clock cap on polling within a single submission attempt.
    /// Exceeding it is treated like an unsolvable challenge.
    pub max_poll_duration: Duration,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(15),
            max_attempts: 3,
            max_poll_duration: Duration::from_secs(180),
        }
    }
}

/// Terminal states of one submission attempt.
enum Attempt {
    Solved(SolvedToken),
    /// Worth another submission cycle (rejected submit, unsolvable, transport error).
    Retry,
    /// Unexpected provider reply; abort the whole chain.
    Fatal,
}

pub struct CaptchaResolver<T: SolverTransport> {
    transport: T,
    settings: ResolverSettings,
}

impl<T: SolverTransport> CaptchaResolver<T> {
    pub fn new(transport: T) -> Self {
        Self::with_settings(transport, ResolverSettings::default())
    }

    pub fn with_settings(transport: T, settings: ResolverSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// Resolve one challenge, or report that no token is available.
    ///
    /// Transport failures and unsolvable challenges are absorbed by the
    /// bounded retry budget; only an unexpected provider code short-circuits.
    pub async fn resolve(&self, site_key: &str, page_url: &str) -> Option<SolvedToken> {
        let request = ChallengeRequest::new(site_key, page_url);

        let mut attempts = 0;
        while attempts < self.settings.max_attempts {
            attempts += 1;
            tracing::debug!(attempt = attempts, "captcha.attempt.start");

            match self.run_attempt(&request).await {
                Attempt::Solved(token) => {
                    tracing::info!(attempt = attempts, "captcha.solved");
                    return Some(token);
                }
                Attempt::Retry => continue,
                Attempt::Fatal => return None,
            }
        }

        tracing::error!(
            attempts,
            "captcha resolution failed after exhausting all attempts"
        );
        None
    }

    async fn run_attempt(&self, request: &ChallengeRequest) -> Attempt {
        let reply = match self.transport.submit(request).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(error = %err, "captcha.submit.transport_error");
                return Attempt::Retry;
            }
        };

        if !reply.is_ok() {
            tracing::warn!(code = %reply.request, "captcha.submit.rejected");
            return Attempt::Retry;
        }

        let ticket = ChallengeTicket { id: reply.request };
        tracing::debug!(ticket = %ticket.id, "captcha.submitted");

        let started = Instant::now();
        loop {
            sleep(self.settings.poll_interval).await;

            if started.elapsed() > self.settings.max_poll_duration {
                tracing::warn!(
                    ticket = %ticket.id,
                    cap_secs = self.settings.max_poll_duration.as_secs(),
                    "captcha.poll.duration_cap_reached"
                );
                return Attempt::Retry;
            }

            let reply = match self.transport.poll(&ticket).await {
                Ok(reply) => reply,
                Err(err) => {
                    tracing::warn!(ticket = %ticket.id, error = %err, "captcha.poll.transport_error");
                    return Attempt::Retry;
                }
            };

            if reply.is_ok() {
                return Attempt::Solved(SolvedToken::new(reply.request));
            }

            match reply.request.as_str() {
                types::NOT_READY => continue,
                types::UNSOLVABLE => {
                    tracing::info!(ticket = %ticket.id, "captcha.poll.unsolvable");
                    return Attempt::Retry;
                }
                other => {
                    tracing::error!(ticket = %ticket.id, code = %other, "captcha.poll.unexpected_reply");
                    return Attempt::Fatal;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SolverTransport;
    use crate::types::SolverReply;
    use async_trait::async_trait;
    use multa_http::HttpError;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    type Scripted = Result<SolverReply, HttpError>;

    fn ok(status: i32, request: &str) -> Scripted {
        Ok(SolverReply {
            status,
            request: request.to_string(),
        })
    }

    fn net_err() -> Scripted {
        Err(HttpError::Network {
            url: "2captcha.com/in.php".into(),
            message: "connection reset".into(),
        })
    }

    /// Transport that replays scripted replies and counts calls. Running out
    /// of scripted submit replies is a test failure: it means the resolver
    /// issued more submissions than the scenario allows.
    struct ScriptedTransport {
        submits: Mutex<VecDeque<Scripted>>,
        polls: Mutex<VecDeque<Scripted>>,
        /// Used when the poll script runs dry (e.g. endless NOT_READY).
        default_poll: Option<SolverReply>,
        submit_count: AtomicU32,
        poll_count: AtomicU32,
    }

    impl ScriptedTransport {
        fn new(submits: Vec<Scripted>, polls: Vec<Scripted>) -> Self {
            Self {
                submits: Mutex::new(submits.into()),
                polls: Mutex::new(polls.into()),
                default_poll: None,
                submit_count: AtomicU32::new(0),
                poll_count: AtomicU32::new(0),
            }
        }

        fn with_default_poll(mut self, reply: SolverReply) -> Self {
            self.default_poll = Some(reply);
            self
        }

        fn submits(&self) -> u32 {
            self.submit_count.load(Ordering::SeqCst)
        }

        fn polls(&self) -> u32 {
            self.poll_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SolverTransport for &ScriptedTransport {
        async fn submit(&self, _request: &ChallengeRequest) -> Result<SolverReply, HttpError> {
            self.submit_count.fetch_add(1, Ordering::SeqCst);
            self.submits
                .lock()
                .unwrap()
                .pop_front()
                .expect("resolver submitted more often than the scenario allows")
        }

        async fn poll(&self, _ticket: &ChallengeTicket) -> Result<SolverReply, HttpError> {
            self.poll_count.fetch_add(1, Ordering::SeqCst);
            if let Some(reply) = self.polls.lock().unwrap().pop_front() {
                return reply;
            }
            match &self.default_poll {
                Some(reply) => Ok(reply.clone()),
                None => panic!("resolver polled more often than the scenario allows"),
            }
        }
    }

    fn fast_settings() -> ResolverSettings {
        ResolverSettings {
            poll_interval: Duration::from_secs(15),
            max_attempts: 3,
            max_poll_duration: Duration::from_secs(180),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_submissions_never_poll_and_exhaust_the_budget() {
        let transport = ScriptedTransport::new(
            vec![
                ok(0, "ERROR_WRONG_USER_KEY"),
                ok(0, "ERROR_ZERO_BALANCE"),
                ok(0, "ERROR_ZERO_BALANCE"),
            ],
            vec![],
        );
        let resolver = CaptchaResolver::with_settings(&transport, fast_settings());

        let token = resolver.resolve("sitekey", "https://example.test").await;

        assert!(token.is_none());
        assert_eq!(transport.submits(), 3);
        assert_eq!(transport.polls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn solves_after_two_not_ready_polls_and_stops_polling() {
        let transport = ScriptedTransport::new(
            vec![ok(1, "ticket-1")],
            vec![
                ok(0, "CAPCHA_NOT_READY"),
                ok(0, "CAPCHA_NOT_READY"),
                ok(1, "TOKEN123"),
            ],
        );
        let resolver = CaptchaResolver::with_settings(&transport, fast_settings());

        let token = resolver.resolve("sitekey", "https://example.test").await;

        assert_eq!(token.expect("should solve").into_value(), "TOKEN123");
        assert_eq!(transport.submits(), 1);
        assert_eq!(transport.polls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn three_unsolvable_submissions_yield_none_and_no_fourth_submission() {
        let transport = ScriptedTransport::new(
            vec![ok(1, "t1"), ok(1, "t2"), ok(1, "t3")],
            vec![
                ok(0, "ERROR_CAPTCHA_UNSOLVABLE"),
                ok(0, "ERROR_CAPTCHA_UNSOLVABLE"),
                ok(0, "ERROR_CAPTCHA_UNSOLVABLE"),
            ],
        );
        let resolver = CaptchaResolver::with_settings(&transport, fast_settings());

        let token = resolver.resolve("sitekey", "https://example.test").await;

        assert!(token.is_none());
        assert_eq!(transport.submits(), 3);
        assert_eq!(transport.polls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn unexpected_poll_reply_is_fatal_for_the_whole_chain() {
        let transport = ScriptedTransport::new(
            vec![ok(1, "t1")],
            vec![ok(0, "CAPCHA_NOT_READY"), ok(0, "ERROR_WRONG_CAPTCHA_ID")],
        );
        let resolver = CaptchaResolver::with_settings(&transport, fast_settings());

        let token = resolver.resolve("sitekey", "https://example.test").await;

        // No retry and no late success after the fatal exit: the scripted
        // transport would panic on any further submit or poll.
        assert!(token.is_none());
        assert_eq!(transport.submits(), 1);
        assert_eq!(transport.polls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_errors_count_against_the_retry_budget() {
        let transport = ScriptedTransport::new(vec![net_err(), net_err(), net_err()], vec![]);
        let resolver = CaptchaResolver::with_settings(&transport, fast_settings());

        let token = resolver.resolve("sitekey", "https://example.test").await;

        assert!(token.is_none());
        assert_eq!(transport.submits(), 3);
        assert_eq!(transport.polls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn endless_not_ready_is_capped_by_the_poll_duration() {
        let transport = ScriptedTransport::new(
            vec![ok(1, "t1"), ok(1, "t2"), ok(1, "t3")],
            vec![],
        )
        .with_default_poll(SolverReply {
            status: 0,
            request: "CAPCHA_NOT_READY".into(),
        });
        let resolver = CaptchaResolver::with_settings(&transport, fast_settings());

        let token = resolver.resolve("sitekey", "https://example.test").await;

        assert!(token.is_none());
        assert_eq!(transport.submits(), 3);
        // 180s cap at a 15s interval: 12 polls per attempt before the cap trips.
        assert_eq!(transport.polls(), 36);
    }
}
