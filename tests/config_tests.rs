//! Tests for layered configuration loading.

use std::sync::{Mutex, OnceLock};

use device_flow::config::FlowConfig;
use device_flow::error::FlowError;
use tempfile::TempDir;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_ENV_VARS: [&str; 5] = [
    "DEVICE_FLOW_BASE_URL",
    "DEVICE_FLOW_CLIENT_ID",
    "DEVICE_FLOW_CLIENT_SECRET",
    "DEVICE_FLOW_POLL_INTERVAL",
    "DEVICE_FLOW_POLLING",
];

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn capture(keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        for key in keys {
            std::env::remove_var(key);
        }
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[test]
fn from_env_without_variables_yields_defaults() {
    let _env_lock = env_lock_guard();
    let _env_guard = EnvGuard::capture(&CONFIG_ENV_VARS);

    assert_eq!(FlowConfig::from_env().unwrap(), FlowConfig::default());
}

#[test]
fn from_env_overrides_every_field() {
    let _env_lock = env_lock_guard();
    let _env_guard = EnvGuard::capture(&CONFIG_ENV_VARS);

    std::env::set_var("DEVICE_FLOW_BASE_URL", "http://idp.test");
    std::env::set_var("DEVICE_FLOW_CLIENT_ID", "env-id");
    std::env::set_var("DEVICE_FLOW_CLIENT_SECRET", "env-secret");
    std::env::set_var("DEVICE_FLOW_POLL_INTERVAL", "9");
    std::env::set_var("DEVICE_FLOW_POLLING", "off");

    let config = FlowConfig::from_env().unwrap();
    assert_eq!(config.base_url, "http://idp.test");
    assert_eq!(config.client_id, "env-id");
    assert_eq!(config.client_secret, "env-secret");
    assert_eq!(config.polling_interval_secs, 9);
    assert!(!config.polling_enabled);
}

#[test]
fn env_takes_precedence_over_file() {
    let _env_lock = env_lock_guard();
    let _env_guard = EnvGuard::capture(&CONFIG_ENV_VARS);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "client_id = \"file-id\"\npolling_interval_secs = 4\n",
    )
    .unwrap();
    std::env::set_var("DEVICE_FLOW_CLIENT_ID", "env-id");

    let config = FlowConfig::resolve(Some(&path)).unwrap();
    assert_eq!(config.client_id, "env-id");
    assert_eq!(config.polling_interval_secs, 4);
}

#[test]
fn invalid_env_values_are_rejected() {
    let _env_lock = env_lock_guard();
    let _env_guard = EnvGuard::capture(&CONFIG_ENV_VARS);

    std::env::set_var("DEVICE_FLOW_POLL_INTERVAL", "soon");
    assert!(matches!(
        FlowConfig::from_env(),
        Err(FlowError::InvalidConfig(_))
    ));

    std::env::set_var("DEVICE_FLOW_POLL_INTERVAL", "0");
    assert!(matches!(
        FlowConfig::from_env(),
        Err(FlowError::InvalidConfig(_))
    ));

    std::env::remove_var("DEVICE_FLOW_POLL_INTERVAL");
    std::env::set_var("DEVICE_FLOW_POLLING", "sometimes");
    assert!(matches!(
        FlowConfig::from_env(),
        Err(FlowError::InvalidConfig(_))
    ));
}

#[test]
fn malformed_file_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "polling_enabled = \"yes please\"").unwrap();
    assert!(matches!(
        FlowConfig::load(&path),
        Err(FlowError::ConfigParse(_))
    ));
}
