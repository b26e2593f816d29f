//! Integration tests for config

#[cfg(test)]
mod tests {
    use pkengine_config::*;
    use pkengine_errors::{ConfigError, Error};
    use pkengine_types::OutputFormat;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[general]
locale = "de_DE.utf8"
network_online = false
default_output = "json"

[timing]
install = 10
cancel-grace = 50

[policy]
remove_requires_network = false

[[repositories]]
id = "local-mirror"
description = "Mirror on the LAN"
enabled = false
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.general.locale, "de_DE.utf8");
        assert!(!config.general.network_online);
        assert_eq!(config.general.default_output, OutputFormat::Json);
        assert_eq!(config.timing.install, 10);
        assert_eq!(config.timing.cancel_grace, 50);
        // untouched fields keep their defaults
        assert_eq!(config.timing.update_system, 1000);
        assert!(!config.policy.remove_requires_network);
        assert!(config.policy.updates_require_network);

        let repos = config.repository_descriptors();
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].id, "local-mirror");
        assert!(!repos[0].enabled);
    }

    #[tokio::test]
    async fn test_empty_file_uses_defaults() {
        let temp_file = NamedTempFile::new().unwrap();
        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.repositories, default_repositories());
        assert_eq!(config.timing.search_name, 2000);
    }

    #[tokio::test]
    async fn test_malformed_file_is_parse_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[general\nlocale = ").unwrap();

        let err = Config::load_from_file(temp_file.path()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::ParseError { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = Config::load_or_default(Some(&path)).await.unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::set_var("PKENGINE_LOCALE", "fr_FR.utf8");
        std::env::set_var("PKENGINE_OFFLINE", "yes");

        let mut config = Config::default();
        config.merge_env().unwrap();

        assert_eq!(config.general.locale, "fr_FR.utf8");
        assert!(!config.general.network_online);

        // Clean up
        std::env::remove_var("PKENGINE_LOCALE");
        std::env::remove_var("PKENGINE_OFFLINE");
    }

    #[test]
    fn test_invalid_env_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::remove_var("PKENGINE_LOCALE");
        std::env::set_var("PKENGINE_OFFLINE", "maybe");

        let mut config = Config::default();
        let result = config.merge_env();
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue { .. }))
        ));

        // Clean up
        std::env::remove_var("PKENGINE_OFFLINE");
    }
}
