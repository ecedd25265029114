//! Common types and utilities shared across Multa crates.
//!
//! This crate is intentionally lightweight so that every other crate in the
//! workspace can depend on it without heavy transitive costs.
//!
//! - [`FormInputs`]: the identification numbers required by the lookup form
//! - [`observability`]: centralised tracing/logging initialisation

use serde::{Deserialize, Serialize};

pub mod observability;

/// Identification numbers required by the Detran consultation form.
///
/// Both values are opaque strings as far as this system is concerned; the
/// only validation applied is non-emptiness, at configuration load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormInputs {
    /// Vehicle registration number (RENAVAM).
    pub renavam: String,
    /// Owner's CPF or CNPJ.
    pub cpf: String,
}

impl FormInputs {
    pub fn new(renavam: impl Into<String>, cpf: impl Into<String>) -> Self {
        Self {
            renavam: renavam.into(),
            cpf: cpf.into(),
        }
    }
}
