//! Credential loading: env-var fallback behind the OS keychain.
//!
//! These tests mutate process environment variables, so they run serially.

use serial_test::serial;

use nutriscan_dashboard::config::GlobalConfig;

fn config_in(temp: &tempfile::TempDir) -> GlobalConfig {
    let toml = format!(
        r#"
data_dir = '{}'

[roboflow]
workspace = "malaysian-food-detection"
project_id = "malaysian-food-detection-wy3kt"

[gemini]
"#,
        temp.path().to_str().expect("utf8")
    );
    GlobalConfig::from_toml_str(&toml).expect("valid config")
}

#[tokio::test]
#[serial]
async fn env_vars_supply_credentials_when_keychain_is_empty() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut config = config_in(&temp);

    std::env::set_var("GEMINI_API_KEY", "env-gemini-key");
    std::env::set_var("ROBOFLOW_API_KEY", "env-roboflow-key");

    config.load_credentials().await.expect("load credentials");

    assert_eq!(config.gemini.api_key, "env-gemini-key");
    assert_eq!(config.roboflow.api_key, "env-roboflow-key");

    std::env::remove_var("GEMINI_API_KEY");
    std::env::remove_var("ROBOFLOW_API_KEY");
}

#[tokio::test]
#[serial]
async fn missing_credentials_are_non_fatal() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut config = config_in(&temp);

    std::env::remove_var("GEMINI_API_KEY");
    std::env::remove_var("ROBOFLOW_API_KEY");

    // Dependent clients degrade to fallback behavior on empty keys, so
    // loading must succeed even with no credential source available.
    config.load_credentials().await.expect("load credentials");

    assert!(config.gemini.api_key.is_empty());
    assert!(config.roboflow.api_key.is_empty());
}
