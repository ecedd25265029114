//! Document access as a capability, not as direct DOM reach.
//!
//! The lookup sequence needs a handful of operations on a page (navigate,
//! step into a nested frame, fill and click elements, run a script, read the
//! source). [`DocumentContext`] names exactly those, so any runtime with a
//! scripting bridge can satisfy it and tests can swap in a scripted fake.

use async_trait::async_trait;
use fantoccini::error::{CmdError, NewSessionError};
use fantoccini::{Client, Locator};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("webdriver session could not be established at {url}: {source}")]
    Session {
        url: String,
        #[source]
        source: NewSessionError,
    },
    /// An expected page/frame/element did not appear within its timeout.
    #[error("timed out waiting for `{selector}`")]
    Timeout { selector: String },
    #[error("webdriver command failed: {0}")]
    Webdriver(#[from] CmdError),
}

fn classify_wait(err: CmdError, selector: &str) -> DriverError {
    match err {
        CmdError::WaitTimeout => DriverError::Timeout {
            selector: selector.to_string(),
        },
        other => DriverError::Webdriver(other),
    }
}

/// Capability interface over a live document.
///
/// Every locate-style operation carries its own bounded timeout; there is no
/// external cancellation signal beyond those.
#[async_trait]
pub trait DocumentContext: Send {
    /// Navigate the session to `url` and wait until the load settles.
    async fn goto(&mut self, url: &str) -> Result<(), DriverError>;

    /// Switch the context into the nested frame matched by `selector`.
    /// Subsequent operations address the frame's document.
    async fn enter_frame(&mut self, selector: &str, timeout: Duration) -> Result<(), DriverError>;

    /// Wait for the input matched by `selector` and type `text` into it.
    async fn fill(&mut self, selector: &str, text: &str, timeout: Duration)
        -> Result<(), DriverError>;

    /// Wait for the element matched by `selector` and click it.
    async fn click(&mut self, selector: &str, timeout: Duration) -> Result<(), DriverError>;

    /// Run a script inside the current document, with `args` exposed to it.
    async fn evaluate(&mut self, script: &str, args: Vec<Value>) -> Result<Value, DriverError>;

    /// Wait until `selector` matches something in the current document.
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<(), DriverError>;

    /// Full HTML source of the current document.
    async fn source(&mut self) -> Result<String, DriverError>;

    /// Tear the session down. Must be called exactly once, on every exit path.
    async fn close(&mut self) -> Result<(), DriverError>;
}

/// Fantoccini-backed [`DocumentContext`].
pub struct WebdriverContext {
    client: Client,
}

impl WebdriverContext {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn wait_element(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<fantoccini::elements::Element, DriverError> {
        self.client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
            .map_err(|e| classify_wait(e, selector))
    }
}

#[async_trait]
impl DocumentContext for WebdriverContext {
    async fn goto(&mut self, url: &str) -> Result<(), DriverError> {
        self.client.goto(url).await?;
        Ok(())
    }

    async fn enter_frame(&mut self, selector: &str, timeout: Duration) -> Result<(), DriverError> {
        let frame = self.wait_element(selector, timeout).await?;
        // enter_frame consumes the element and scopes the session to the
        // frame's document; subsequent commands address that frame.
        frame.enter_frame().await?;
        Ok(())
    }

    async fn fill(
        &mut self,
        selector: &str,
        text: &str,
        timeout: Duration,
    ) -> Result<(), DriverError> {
        let element = self.wait_element(selector, timeout).await?;
        element.send_keys(text).await?;
        Ok(())
    }

    async fn click(&mut self, selector: &str, timeout: Duration) -> Result<(), DriverError> {
        let element = self.wait_element(selector, timeout).await?;
        element.click().await?;
        Ok(())
    }

    async fn evaluate(&mut self, script: &str, args: Vec<Value>) -> Result<Value, DriverError> {
        let value = self.client.execute(script, args).await?;
        Ok(value)
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<(), DriverError> {
        self.wait_element(selector, timeout).await?;
        Ok(())
    }

    async fn source(&mut self) -> Result<String, DriverError> {
        let html = self.client.source().await?;
        Ok(html)
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        self.client.clone().close().await?;
        Ok(())
    }
}
