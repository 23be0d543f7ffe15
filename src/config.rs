use anyhow::{Context, Result};
use colored::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "arbor.toml";

#[derive(Debug, Deserialize, Default)]
pub struct ArborConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Which file each overlay variable came from.
    #[serde(skip)]
    pub env_sources: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum LogStrategy {
    Always,
    ErrorOnly,
    None,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EngineConfig {
    #[serde(default)]
    pub trace: bool,
    pub log_strategy: Option<LogStrategy>,
}

impl ArborConfig {
    /// Exports the overlay into the process environment, where word
    /// resolution and spawned programs read it.
    pub fn export_env(&self) {
        for (key, val) in &self.env {
            // SAFETY: called from main before any command runs or forks.
            unsafe { env::set_var(key, val) };
        }
    }
}

pub fn parse_config(content: &str) -> Result<ArborConfig> {
    let mut config: ArborConfig = toml::from_str(content).context("Failed to parse arbor.toml")?;
    for key in config.env.keys() {
        config.env_sources.insert(key.clone(), CONFIG_FILE.to_string());
    }
    Ok(config)
}

/// Loads `arbor.toml` from `dir` (optional) and layers `.env` on top.
/// `ARBOR_ENV=prod` selects `.env.prod` instead.
pub fn load_config(dir: &Path) -> Result<ArborConfig> {
    let config_path = dir.join(CONFIG_FILE);
    let mut config = if config_path.exists() {
        let content = fs::read_to_string(&config_path).context("Failed to read arbor.toml")?;
        parse_config(&content)?
    } else {
        ArborConfig::default()
    };

    let env_filename = env::var("ARBOR_ENV")
        .map(|v| format!(".env.{}", v))
        .unwrap_or_else(|_| ".env".to_string());
    let env_path = dir.join(&env_filename);

    if env_path.exists() {
        eprintln!("{} Loading environment from: {}", "🌿".green(), env_filename.bold());

        // Collected as a map; nothing is exported until the run starts.
        for item in dotenvy::from_path_iter(&env_path)? {
            let (key, val) = item?;
            config.env_sources.insert(key.clone(), env_filename.clone());
            config.env.insert(key, val);
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_engine_section() {
        let config = parse_config(
            r#"
            [engine]
            trace = true
            log_strategy = "error-only"

            [env]
            GREETING = "hi"
            "#,
        )
        .unwrap();
        assert!(config.engine.trace);
        assert_eq!(config.engine.log_strategy, Some(LogStrategy::ErrorOnly));
        assert_eq!(config.env["GREETING"], "hi");
        assert_eq!(config.env_sources["GREETING"], CONFIG_FILE);
    }

    #[test]
    fn test_missing_config_is_default() {
        let dir = tempdir().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert!(!config.engine.trace);
        assert!(config.engine.log_strategy.is_none());
    }

    #[test]
    fn test_dotenv_overrides_config() {
        let _guard = crate::engine::test_lock();
        unsafe { env::remove_var("ARBOR_ENV") };
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[env]\nMODE = \"toml\"\nKEEP = \"yes\"\n").unwrap();
        fs::write(dir.path().join(".env"), "MODE=dotenv\n").unwrap();

        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.env["MODE"], "dotenv");
        assert_eq!(config.env_sources["MODE"], ".env");
        assert_eq!(config.env["KEEP"], "yes");
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        assert!(parse_config("[engine]\nlog_strategy = \"sometimes\"\n").is_err());
    }
}
