use anyhow::{Context, Result};
use blake3::Hasher;
use chrono::Local;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use crate::config::LogStrategy;

/// One executed command line, as recorded in an execution log.
pub struct LogEntry<'a> {
    pub label: &'a str,
    pub command: &'a str,
    pub duration: Duration,
    pub exit_code: i32,
    pub env_vars: &'a HashMap<String, String>,
}

fn is_sensitive(key: &str) -> bool {
    let k_upper = key.to_uppercase();
    ["KEY", "TOKEN", "PASS", "SECRET"].iter().any(|word| k_upper.contains(word))
}

/// Writes `entry` under `<root>/<date>/<exit code>/` when the strategy asks
/// for it. Returns the path of the written file.
pub fn write_log(root: &Path, strategy: Option<LogStrategy>, entry: &LogEntry) -> Result<Option<PathBuf>> {
    match strategy.unwrap_or(LogStrategy::None) {
        LogStrategy::None => return Ok(None),
        LogStrategy::ErrorOnly => {
            if entry.exit_code == 0 {
                return Ok(None);
            }
        },
        LogStrategy::Always => {},
    }

    let now = Local::now();
    let date_str = now.format("%Y-%m-%d").to_string();
    let time_str = now.format("%H%M%S").to_string();

    // Short Hash
    let mut hasher = Hasher::new();
    hasher.update(entry.label.as_bytes());
    hasher.update(entry.command.as_bytes());
    hasher.update(time_str.as_bytes());
    let hash_full = hasher.finalize().to_hex().to_string();
    let short_hash = &hash_full[0..6];

    let filename = format!("{}_{}_{}.log", time_str, entry.label.replace('/', "_"), short_hash);
    let log_dir = root.join(date_str).join(entry.exit_code.to_string());

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;
    let log_path = log_dir.join(filename);

    let mut file_content = String::new();

    file_content.push_str("=== ARBOR EXECUTION LOG ===\n");
    file_content.push_str(&format!("Label: {}\n", entry.label));
    file_content.push_str(&format!("Command: {}\n", entry.command));
    file_content.push_str(&format!("Time: {}\n", now.to_rfc3339()));
    file_content.push_str("=== ENVIRONMENT SNAPSHOT ===\n");

    let mut sorted_keys: Vec<_> = entry.env_vars.keys().collect();
    sorted_keys.sort();

    for k in sorted_keys {
        if is_sensitive(k) {
            file_content.push_str(&format!("{} = [REDACTED]\n", k));
        } else {
            file_content.push_str(&format!("{} = {}\n", k, entry.env_vars[k]));
        }
    }

    file_content.push_str("============================\n");
    file_content.push_str(&format!("Exit Code: {}\n", entry.exit_code));
    file_content.push_str(&format!("Duration: {} ms\n", entry.duration.as_millis()));
    file_content.push_str(&format!("End Time: {}\n", Local::now().to_rfc3339()));
    file_content.push_str("============================\n");

    fs::write(&log_path, file_content).context("Failed to write log file")?;

    Ok(Some(log_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entry<'a>(env_vars: &'a HashMap<String, String>, exit_code: i32) -> LogEntry<'a> {
        LogEntry {
            label: "build/all",
            command: "make | tee out.log",
            duration: Duration::from_millis(12),
            exit_code,
            env_vars,
        }
    }

    #[test]
    fn test_strategy_filters() {
        let dir = tempdir().unwrap();
        let env_vars = HashMap::new();
        assert!(write_log(dir.path(), None, &entry(&env_vars, 1)).unwrap().is_none());
        assert!(write_log(dir.path(), Some(LogStrategy::ErrorOnly), &entry(&env_vars, 0)).unwrap().is_none());
        assert!(write_log(dir.path(), Some(LogStrategy::ErrorOnly), &entry(&env_vars, 2)).unwrap().is_some());
    }

    #[test]
    fn test_log_redacts_secrets() {
        let dir = tempdir().unwrap();
        let mut env_vars = HashMap::new();
        env_vars.insert("API_TOKEN".to_string(), "hunter2".to_string());
        env_vars.insert("EDITOR".to_string(), "vi".to_string());

        let path = write_log(dir.path(), Some(LogStrategy::Always), &entry(&env_vars, 3))
            .unwrap()
            .unwrap();
        assert_eq!(path.parent().unwrap().file_name().unwrap(), "3");
        assert!(path.file_name().unwrap().to_string_lossy().contains("build_all"));

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("Command: make | tee out.log"));
        assert!(content.contains("API_TOKEN = [REDACTED]"));
        assert!(!content.contains("hunter2"));
        assert!(content.contains("EDITOR = vi"));
        assert!(content.contains("Exit Code: 3"));
    }
}
