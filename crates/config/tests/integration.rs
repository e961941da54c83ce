//! Integration tests for config

#[cfg(test)]
mod tests {
    use bgdl_config::*;
    use std::collections::HashMap;
    use std::io::Write;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[network]
timeout = 120
retries = 5
user_agent = "MyAgent/1.0"
progress_interval_ms = 100

[paths]
app_data = "/var/lib/bgdl"

[session]
uri_matcher = "[^?]+"
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.network.timeout(), Duration::from_secs(120));
        assert_eq!(config.network.retries, 5);
        assert_eq!(config.network.user_agent.as_deref(), Some("MyAgent/1.0"));
        assert_eq!(config.network.progress_interval(), Duration::from_millis(100));
        // Unset fields keep their defaults
        assert_eq!(config.network.connect_timeout, 30);
        assert_eq!(config.app_data_path(), PathBuf::from("/var/lib/bgdl"));
        assert_eq!(config.logs_path(), PathBuf::from("/var/lib/bgdl/logs"));
        assert_eq!(config.session.uri_matcher.as_deref(), Some("[^?]+"));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let err = Config::load_from_file(std::path::Path::new("/nonexistent/bgdl.toml"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            bgdl_errors::Error::Config(bgdl_errors::ConfigError::NotFound { .. })
        ));
    }

    #[test]
    fn test_parse_error() {
        let err = Config::parse("[network]\ntimeout = \"soon\"").unwrap_err();
        assert!(matches!(
            err,
            bgdl_errors::Error::Config(bgdl_errors::ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_merge_vars() {
        let vars: HashMap<&str, &str> = [
            ("BGDL_USER_AGENT", "EnvAgent/2.0"),
            ("BGDL_RETRIES", "7"),
            ("BGDL_APP_DATA", "/tmp/bgdl-data"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .merge_vars(|name| vars.get(name).map(ToString::to_string))
            .unwrap();

        assert_eq!(config.network.user_agent.as_deref(), Some("EnvAgent/2.0"));
        assert_eq!(config.network.retries, 7);
        assert_eq!(config.paths.app_data, Some(PathBuf::from("/tmp/bgdl-data")));
        assert_eq!(config.network.timeout, 300);
    }

    #[test]
    fn test_merge_vars_rejects_invalid_numbers() {
        let mut config = Config::default();
        let err = config
            .merge_vars(|name| (name == "BGDL_TIMEOUT").then(|| "forever".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            bgdl_errors::Error::Config(bgdl_errors::ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_empty_user_agent_clears_override() {
        let mut config = Config::default();
        config.network.user_agent = Some("Old/1.0".into());
        config
            .merge_vars(|name| (name == "BGDL_USER_AGENT").then(String::new))
            .unwrap();
        assert!(config.network.user_agent.is_none());
    }
}
