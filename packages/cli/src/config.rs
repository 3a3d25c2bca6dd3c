use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use yamlpatch_editor::{ConcurrencyPolicy, PatchPolicy, SessionOptions};

pub const DEFAULT_CONFIG_NAME: &str = "yamlpatch.config.json";

/// yamlpatch configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Keys whose sequences are always written one item per line
    #[serde(default = "default_block_style_keys")]
    pub block_style_keys: Vec<String>,

    /// New scalar sequences up to this length are written as `[a, b]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_sequence_limit: Option<usize>,

    #[serde(default)]
    pub concurrency: ConcurrencyPolicy,

    /// Re-parse rendered text before writing it
    #[serde(default = "default_verify")]
    pub verify: bool,

    /// Maximum undo depth (0 = unlimited)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_block_style_keys() -> Vec<String> {
    vec!["tags".to_string()]
}

fn default_verify() -> bool {
    true
}

fn default_history_limit() -> usize {
    100
}

impl Config {
    /// Load `path`, or the default config file in `cwd` when no path is given.
    /// A missing default file yields the defaults; a missing explicit file is
    /// an error.
    pub fn load(cwd: &Path, path: Option<&Path>) -> anyhow::Result<Self> {
        let (config_path, required) = match path {
            Some(path) => (cwd.join(path), true),
            None => (cwd.join(DEFAULT_CONFIG_NAME), false),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|err| anyhow::anyhow!("Invalid config {}: {}", config_path.display(), err))?;
            tracing::debug!(path = %config_path.display(), "loaded config");
            Ok(config)
        } else if required {
            Err(anyhow::anyhow!("Config file does not exist: {}", config_path.display()))
        } else {
            Ok(Config::default())
        }
    }

    pub fn path(cwd: &Path) -> PathBuf {
        cwd.join(DEFAULT_CONFIG_NAME)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            policy: PatchPolicy::default()
                .with_block_style_keys(self.block_style_keys.iter().cloned())
                .with_inline_sequence_limit(self.inline_sequence_limit),
            concurrency: self.concurrency,
            verify: self.verify,
            history_limit: self.history_limit,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            block_style_keys: default_block_style_keys(),
            inline_sequence_limit: None,
            concurrency: ConcurrencyPolicy::Detect,
            verify: default_verify(),
            history_limit: default_history_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "blockStyleKeys": ["tags", "required"],
            "inlineSequenceLimit": 3,
            "concurrency": "lastWriterWins",
            "verify": false,
            "historyLimit": 10
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.block_style_keys, vec!["tags", "required"]);
        assert_eq!(config.inline_sequence_limit, Some(3));
        assert_eq!(config.concurrency, ConcurrencyPolicy::LastWriterWins);
        assert!(!config.verify);
        assert_eq!(config.history_limit, 10);
    }

    #[test]
    fn test_default_config() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.block_style_keys, vec!["tags"]);
        assert!(config.verify);
    }

    #[test]
    fn test_session_options() {
        let config = Config {
            block_style_keys: vec!["required".to_string()],
            inline_sequence_limit: Some(2),
            ..Config::default()
        };
        let options = config.session_options();
        assert!(options.policy.force_block_style("required"));
        assert!(!options.policy.force_block_style("tags"));
        assert_eq!(options.policy.inline_sequence_limit, Some(2));
        assert_eq!(options.history_limit, 100);
    }

    #[test]
    fn test_load_missing_default_and_explicit() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load(dir.path(), None).unwrap(), Config::default());
        assert!(Config::load(dir.path(), Some(Path::new("other.json"))).is_err());

        std::fs::write(Config::path(dir.path()), r#"{"historyLimit": 5}"#).unwrap();
        assert_eq!(Config::load(dir.path(), None).unwrap().history_limit, 5);
    }
}
