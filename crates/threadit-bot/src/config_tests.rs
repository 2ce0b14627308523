#[cfg(test)]
mod tests {
    use crate::config::{Config, DiscordBotConfig, ReadEnv};
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use threadit_core::RelaySettings;

    struct InMemoryEnv(HashMap<&'static str, &'static str>);

    impl InMemoryEnv {
        fn new(pairs: &[(&'static str, &'static str)]) -> Self {
            Self(pairs.iter().cloned().collect())
        }
    }

    impl ReadEnv for InMemoryEnv {
        fn var(&self, key: &str) -> Option<String> {
            self.0.get(key).map(|v| v.to_string())
        }
    }

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    fn config_with_token(token: &str) -> Config {
        Config {
            discord: DiscordBotConfig {
                bot_token: token.to_string(),
            },
            relay: RelaySettings::default(),
        }
    }

    // ── from_file ─────────────────────────────────────────────────────────────

    #[test]
    fn test_from_file_minimal() {
        let toml = r#"
[discord]
bot_token = "BOT-TOKEN-123"
"#;
        let f = write_toml(toml);
        let cfg = Config::from_file(f.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.discord.bot_token, "BOT-TOKEN-123");
        assert_eq!(cfg.relay, RelaySettings::default());
    }

    #[test]
    fn test_from_file_relay_overrides() {
        let toml = r#"
[discord]
bot_token = "SECRET"

[relay]
auto_archive_minutes = 60
notice_delete_after_secs = 3
"#;
        let f = write_toml(toml);
        let cfg = Config::from_file(f.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.relay.auto_archive_minutes, 60);
        assert_eq!(cfg.relay.notice_delete_after_secs, 3);
        // unspecified keys keep their defaults
        assert_eq!(cfg.relay.max_thread_name_length, 100);
        assert_eq!(cfg.relay.accent_color, 0x5865F2);
    }

    #[test]
    fn test_from_file_hex_accent_color() {
        let toml = r#"
[relay]
accent_color = 0xFF0000
"#;
        let f = write_toml(toml);
        let cfg = Config::from_file(f.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.relay.accent_color, 0xFF0000);
        assert!(cfg.discord.bot_token.is_empty());
    }

    #[test]
    fn test_shipped_config_file_parses() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/threadit.toml");
        let cfg = Config::from_file(path).unwrap();
        assert_eq!(cfg.relay, RelaySettings::default());
    }

    #[test]
    fn test_from_file_missing_returns_error() {
        let result = Config::from_file("/nonexistent/path/config.toml");
        assert!(result.is_err());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("Failed to read config file"));
    }

    #[test]
    fn test_from_file_invalid_toml_returns_error() {
        let f = write_toml("this is not valid toml !!!");
        let result = Config::from_file(f.path().to_str().unwrap());
        assert!(result.is_err());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("Failed to parse config file"));
    }

    // ── from_env ──────────────────────────────────────────────────────────────

    #[test]
    fn test_from_env_missing_token_returns_error() {
        let env = InMemoryEnv::new(&[]);
        let result = Config::from_env_impl(&env);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "DISCORD_TOKEN environment variable not set."
        );
    }

    #[test]
    fn test_from_env_blank_token_returns_error() {
        let env = InMemoryEnv::new(&[("DISCORD_TOKEN", "   ")]);
        assert!(Config::from_env_impl(&env).is_err());
    }

    #[test]
    fn test_from_env_reads_token() {
        let env = InMemoryEnv::new(&[("DISCORD_TOKEN", "my-secret-token")]);
        let cfg = Config::from_env_impl(&env).unwrap();
        assert_eq!(cfg.discord.bot_token, "my-secret-token");
    }

    #[test]
    fn test_from_env_uses_fixed_relay_defaults() {
        let env = InMemoryEnv::new(&[("DISCORD_TOKEN", "tok")]);
        let cfg = Config::from_env_impl(&env).unwrap();
        assert_eq!(cfg.relay.auto_archive_minutes, 1440);
        assert_eq!(cfg.relay.max_thread_name_length, 100);
        assert_eq!(cfg.relay.notice_delete_after_secs, 8);
        assert_eq!(cfg.relay.accent_color, 0x5865F2);
    }

    // ── validate ──────────────────────────────────────────────────────────────

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(config_with_token("tok").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_token() {
        let err = config_with_token("").validate().unwrap_err();
        assert_eq!(err.to_string(), "DISCORD_TOKEN environment variable not set.");
    }

    #[test]
    fn test_validate_rejects_unsupported_archive_window() {
        let mut cfg = config_with_token("tok");
        cfg.relay.auto_archive_minutes = 120;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid [relay] settings"));
        assert!(format!("{:#}", err).contains("auto_archive_minutes"));
    }

    #[test]
    fn test_validate_rejects_thread_name_limit_above_discord_max() {
        let mut cfg = config_with_token("tok");
        cfg.relay.max_thread_name_length = 101;
        assert!(cfg.validate().is_err());
    }
}
