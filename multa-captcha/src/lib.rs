//! Captcha resolution against a paid solving service.
//!
//! The provider exposes a submit-then-poll protocol: a challenge is handed
//! over and a ticket comes back, then the ticket is polled until a solved
//! token (or a terminal error code) appears. This crate carries:
//!
//! - [`types`]: wire reply plus the challenge/ticket/token ownership model
//! - [`client::TwoCaptchaApi`]: the concrete provider client over `multa-http`
//! - [`resolver::CaptchaResolver`]: the bounded submit/poll/retry state machine

pub mod client;
pub mod resolver;
pub mod types;

pub use client::{CaptchaError, SolverTransport, TwoCaptchaApi};
pub use resolver::{CaptchaResolver, ResolverSettings};
pub use types::{ChallengeRequest, ChallengeTicket, SolvedToken, SolverReply};
