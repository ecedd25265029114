//! The Detran-RJ consultation sequence.
//!
//! A single lookup is a straight line: navigate, step into the nested frame
//! hosting the form, fill the identification fields, obtain a solved captcha
//! token, inject it, submit, wait for the results container, extract. Any
//! stage failure aborts the lookup; the browser context is released exactly
//! once no matter where the sequence stopped.

use crate::extract::{extract_fine_record, ExtractError};
use crate::types::FineRecord;
use multa_captcha::{CaptchaResolver, SolverTransport};
use multa_common::FormInputs;
use multa_driver::{DocumentContext, DriverError};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Consultation entry page; the form itself lives in a nested frame.
pub const TARGET_URL: &str =
    "https://www.detran.rj.gov.br/_monta_aplicacoes.asp?cod=11&tipo=consulta_multa";
/// reCAPTCHA v2 site key embedded in the consultation form.
pub const SITE_KEY: &str = "6LfP47IUAAAAAIwbI5NOKHyvT9Pda17dl0nXl4xv";

const FRAME_SELECTOR: &str = "iframe";
const RENAVAM_INPUT: &str = "#MultasRenavam";
const CPF_INPUT: &str = "#MultasCpfcnpj";
const SUBMIT_BUTTON: &str = "#btPesquisar";
const RESULTS_CONTAINER: &str = "#conteudoConsulta";

const ELEMENT_TIMEOUT: Duration = Duration::from_secs(10);
/// Server-side processing after submit is slow; give the results longer.
const RESULTS_TIMEOUT: Duration = Duration::from_secs(60);

/// Writes the solved token into the hidden response field and fires a
/// bubbling `input` event so the host form notices the value.
const INJECT_TOKEN_SCRIPT: &str = r#"
const token = arguments[0];
const field = document.querySelector('#g-recaptcha-response');
if (field) {
    field.value = token;
    field.dispatchEvent(new Event('input', { bubbles: true }));
}
"#;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error(transparent)]
    Driver(#[from] DriverError),
    /// The resolver exhausted its attempts without producing a token.
    #[error("no captcha token available")]
    CaptchaUnavailable,
    #[error(transparent)]
    Extraction(#[from] ExtractError),
}

/// Run one complete lookup and release the browser context on every path.
///
/// All stage failures are caught here, logged with a per-kind diagnostic,
/// and converted into `None`; nothing escapes to the caller as a fault.
pub async fn run_lookup<C, T>(
    mut ctx: C,
    resolver: &CaptchaResolver<T>,
    inputs: &FormInputs,
) -> Option<FineRecord>
where
    C: DocumentContext,
    T: SolverTransport,
{
    let outcome = lookup_sequence(&mut ctx, resolver, inputs).await;

    if let Err(err) = ctx.close().await {
        tracing::warn!(error = %err, "browser session teardown failed");
    }

    match outcome {
        Ok(record) => {
            tracing::info!("lookup completed");
            Some(record)
        }
        Err(err) => {
            log_failure(&err);
            None
        }
    }
}

async fn lookup_sequence<C, T>(
    ctx: &mut C,
    resolver: &CaptchaResolver<T>,
    inputs: &FormInputs,
) -> Result<FineRecord, LookupError>
where
    C: DocumentContext,
    T: SolverTransport,
{
    tracing::debug!(url = TARGET_URL, "lookup.navigate");
    ctx.goto(TARGET_URL).await?;

    ctx.enter_frame(FRAME_SELECTOR, ELEMENT_TIMEOUT).await?;

    ctx.fill(RENAVAM_INPUT, &inputs.renavam, ELEMENT_TIMEOUT)
        .await?;
    ctx.fill(CPF_INPUT, &inputs.cpf, ELEMENT_TIMEOUT).await?;

    let token = resolver
        .resolve(SITE_KEY, TARGET_URL)
        .await
        .ok_or(LookupError::CaptchaUnavailable)?;

    ctx.evaluate(INJECT_TOKEN_SCRIPT, vec![json!(token.into_value())])
        .await?;
    tracing::debug!("lookup.token_injected");

    ctx.click(SUBMIT_BUTTON, ELEMENT_TIMEOUT).await?;

    ctx.wait_for(RESULTS_CONTAINER, RESULTS_TIMEOUT).await?;
    let html = ctx.source().await?;

    Ok(extract_fine_record(&html)?)
}

fn log_failure(err: &LookupError) {
    match err {
        LookupError::Driver(DriverError::Timeout { selector }) => {
            tracing::error!(%selector, "lookup aborted: expected element never appeared");
        }
        LookupError::Driver(driver_err) => {
            tracing::error!(error = %driver_err, "lookup aborted: webdriver failure");
        }
        LookupError::CaptchaUnavailable => {
            tracing::error!("lookup aborted: captcha could not be resolved");
        }
        LookupError::Extraction(extract_err) => {
            tracing::error!(error = %extract_err, "lookup aborted: results page had unexpected shape");
        }
    }
}
