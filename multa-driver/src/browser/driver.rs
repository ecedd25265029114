use crate::browser::context::{DriverError, WebdriverContext};
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use std::collections::HashMap;
use webdriver::capabilities::Capabilities;

/// Thin wrapper around a `fantoccini` WebDriver client.
pub struct MultaDriver {
    pub client: Client,
}

impl MultaDriver {
    /// Create a new driver connected to a running WebDriver service
    /// (typically Chromedriver on `http://localhost:9515`).
    pub async fn connect(webdriver_url: &str, headless: bool) -> Result<Self, DriverError> {
        let mut caps = Capabilities::new();
        let mut chrome_opts = HashMap::new();

        let mut args = vec!["--disable-dev-shm-usage".to_string()];
        if headless {
            args.push("--headless".to_string());
            args.push("--disable-gpu".to_string());
        }
        chrome_opts.insert("args".to_string(), json!(args));

        caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(webdriver_url)
            .await
            .map_err(|source| DriverError::Session {
                url: webdriver_url.to_string(),
                source,
            })?;

        tracing::debug!(%webdriver_url, headless, "browser session established");
        Ok(Self { client })
    }

    /// Hand the session over as a [`WebdriverContext`], which owns teardown.
    pub fn into_context(self) -> WebdriverContext {
        WebdriverContext::new(self.client)
    }
}
