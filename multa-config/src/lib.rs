//! Loader for workspace configuration with YAML + environment overlays.
//!
//! The schema covers the three collaborators the lookup needs at startup:
//! the captcha-solving service credential, the identification numbers typed
//! into the form, and the WebDriver endpoint. Required secrets are validated
//! here so a missing credential fails before any network or browser work.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct MultaConfig {
    pub captcha: CaptchaSettings,
    pub lookup: LookupSettings,
    #[serde(default)]
    pub driver: DriverSettings,
}

/// Credential and endpoint for the captcha-solving provider.
#[derive(Debug, Deserialize)]
pub struct CaptchaSettings {
    pub api_key: String,
    #[serde(default = "default_solver_endpoint")]
    pub base_url: String,
}

/// Identification numbers typed into the consultation form.
#[derive(Debug, Deserialize)]
pub struct LookupSettings {
    pub renavam: String,
    pub cpf: String,
}

/// WebDriver session settings.
#[derive(Debug, Deserialize)]
pub struct DriverSettings {
    #[serde(default = "default_webdriver_endpoint")]
    pub webdriver_url: String,
    #[serde(default = "default_headless")]
    pub headless: bool,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_endpoint(),
            headless: default_headless(),
        }
    }
}

fn default_solver_endpoint() -> String {
    "https://2captcha.com".into()
}
fn default_webdriver_endpoint() -> String {
    "http://localhost:9515".into()
}
fn default_headless() -> bool {
    true
}

impl MultaConfig {
    /// Reject configurations that would only fail later, mid-lookup.
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("captcha.api_key", &self.captcha.api_key),
            ("lookup.renavam", &self.lookup.renavam),
            ("lookup.cpf", &self.lookup.cpf),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Message(format!(
                    "required configuration value `{field}` is missing or empty"
                )));
            }
        }
        Ok(())
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct MultaConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for MultaConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl MultaConfigLoader {
    /// Start with sensible defaults: YAML file + `MULTA_` env overrides.
    ///
    /// Environment variables use `__` as the nesting separator, so
    /// `MULTA_CAPTCHA__API_KEY` overrides `captcha.api_key`.
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("MULTA").separator("__"));
        Self { builder }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self.builder.add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly
    /// typed config.
    ///
    /// Combines YAML with `MULTA_`-prefixed environment variables, expands
    /// `${VAR}` placeholders, and validates required secrets before handing
    /// the config back.
    pub fn load(self) -> Result<MultaConfig, ConfigError> {
        let cfg = self.builder.build()?;

        // Convert to serde_json::Value first so ${VAR} expansion can walk
        // the whole tree before typing it.
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: MultaConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        typed.validate()?;
        Ok(typed)
    }
}
