use huddle_core::config::CoreConfig;
use huddle_api::types::Role;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read {0}")]
    Read(#[from] std::io::Error),
    #[error("parse {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HuddleConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub core: CoreConfig,
    #[serde(default, rename = "token")]
    pub tokens: Vec<TokenEntry>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:9400".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Static credential table for deployments without a real auth backend.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct TokenEntry {
    pub token: String,
    pub user_id: String,
    pub display_name: String,
    pub role: Role,
}

pub fn load_config(path: &Path) -> Result<HuddleConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_config() {
        let raw = r#"
[server]
bind = "0.0.0.0:9500"

[logging]
level = "debug"

[core]
typing_debounce_ms = 750
allow_attachments = true
max_text_bytes = 32768
max_filename_len = 128

[[token]]
token = "tok-amy"
userId = "amy"
displayName = "Amy"
role = "staff"
"#;
        let cfg: HuddleConfig = toml::from_str(raw).expect("parse");
        assert_eq!(cfg.server.bind, "0.0.0.0:9500");
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.core.typing_debounce_ms, 750);
        assert_eq!(cfg.tokens.len(), 1);
        assert_eq!(cfg.tokens[0].user_id, "amy");
        assert_eq!(cfg.tokens[0].role, Role::Staff);
    }

    #[test]
    fn defaults_apply_when_sections_are_missing() {
        let cfg: HuddleConfig = toml::from_str("").expect("parse");
        assert_eq!(cfg.server.bind, "127.0.0.1:9400");
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.core.typing_debounce_ms, 1000);
        assert!(cfg.tokens.is_empty());
    }
}
