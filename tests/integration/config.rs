//! Global config discovery. These tests mutate the process environment and
//! run serially.

use dekube_manager::config::GlobalConfig;
use dekube_manager::constants::CONFIG_PATH_ENV;
use dekube_manager::test_utils::RegistryFixture;
use serial_test::serial;
use tempfile::TempDir;

#[tokio::test]
#[serial]
async fn test_config_path_from_environment() {
    let temp = TempDir::new().unwrap();
    let fixture = RegistryFixture::write(temp.path()).unwrap();

    // SAFETY: serialized with every other environment-mutating test
    unsafe { std::env::set_var(CONFIG_PATH_ENV, &fixture.config) };
    let config = GlobalConfig::load_with_optional(None).await;
    unsafe { std::env::remove_var(CONFIG_PATH_ENV) };

    let config = config.unwrap();
    assert_eq!(config.registries.extensions, fixture.extensions.display().to_string());
    assert_eq!(config.network.max_attempts, 1);
}

#[tokio::test]
#[serial]
async fn test_explicit_path_beats_environment() {
    let temp = TempDir::new().unwrap();
    let fixture = RegistryFixture::write(temp.path()).unwrap();
    let other = temp.path().join("other.toml");
    std::fs::write(&other, "[network]\nmax_attempts = 7\n").unwrap();

    // SAFETY: serialized with every other environment-mutating test
    unsafe { std::env::set_var(CONFIG_PATH_ENV, &fixture.config) };
    let config = GlobalConfig::load_with_optional(Some(other)).await;
    unsafe { std::env::remove_var(CONFIG_PATH_ENV) };

    assert_eq!(config.unwrap().network.max_attempts, 7);
}

#[tokio::test]
#[serial]
async fn test_unknown_key_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(&path, "[plugins]\nextra = 'x'\n").unwrap();

    assert!(GlobalConfig::load_with_optional(Some(path)).await.is_err());
}
