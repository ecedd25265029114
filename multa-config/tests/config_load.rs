use multa_config::MultaConfigLoader;
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn test_config_load() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
captcha:
  api_key: "${SOLVER_API_KEY}"
lookup:
  renavam: "00531492290"
  cpf: "13210189757"
driver:
  headless: false
"#;
    let p = write_yaml(&tmp, "multa.yaml", file_yaml);

    temp_env::with_var("SOLVER_API_KEY", Some("k-from-env"), || {
        let config = MultaConfigLoader::new()
            .with_file(&p)
            .load()
            .expect("load system config");

        assert_eq!(config.captcha.api_key, "k-from-env");
        assert_eq!(config.captcha.base_url, "https://2captcha.com");
        assert_eq!(config.lookup.renavam, "00531492290");
        assert_eq!(config.driver.webdriver_url, "http://localhost:9515");
        assert!(!config.driver.headless);
    });
}

#[test]
#[serial]
fn missing_api_key_is_a_load_error() {
    let err = MultaConfigLoader::new()
        .with_yaml_str(
            r#"
captcha:
  api_key: ""
lookup:
  renavam: "00531492290"
  cpf: "13210189757"
"#,
        )
        .load()
        .unwrap_err();

    assert!(err.to_string().contains("captcha.api_key"));
}

#[test]
#[serial]
fn missing_identification_numbers_are_load_errors() {
    let err = MultaConfigLoader::new()
        .with_yaml_str(
            r#"
captcha:
  api_key: "abc123"
lookup:
  renavam: "00531492290"
  cpf: "   "
"#,
        )
        .load()
        .unwrap_err();

    assert!(err.to_string().contains("lookup.cpf"));
}
