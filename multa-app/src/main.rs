use anyhow::{bail, Result};
use multa_captcha::{CaptchaResolver, TwoCaptchaApi};
use multa_common::observability::{init_logging, LogConfig};
use multa_common::FormInputs;
use multa_config::{MultaConfig, MultaConfigLoader};
use multa_driver::MultaDriver;
use multa_lookup::run_lookup;
use std::path::Path;

const CONFIG_FILE: &str = "multa.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    // 1) Load config (env wins); the file is optional so a pure-env
    //    deployment works too.
    let mut loader = MultaConfigLoader::new();
    if Path::new(CONFIG_FILE).exists() {
        loader = loader.with_file(CONFIG_FILE);
    }
    let cfg: MultaConfig = loader.load()?;

    let log_path = init_logging(LogConfig::default())?;
    tracing::info!(log_path = %log_path.display(), "starting fine lookup");

    let solver = TwoCaptchaApi::new(cfg.captcha.api_key, &cfg.captcha.base_url)?;
    let resolver = CaptchaResolver::new(solver);

    let driver = MultaDriver::connect(&cfg.driver.webdriver_url, cfg.driver.headless).await?;
    let ctx = driver.into_context();

    let inputs = FormInputs::new(cfg.lookup.renavam, cfg.lookup.cpf);
    match run_lookup(ctx, &resolver, &inputs).await {
        Some(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        None => bail!("lookup did not produce a result; see logs for the failure kind"),
    }
}
