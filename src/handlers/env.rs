use anyhow::Result;
use colored::*;
use std::env;
use crate::config::load_config;

pub fn handle_env() -> Result<()> {
    let current_dir = env::current_dir()?;
    // Load config which merges arbor.toml and .env
    let config = load_config(&current_dir)?;

    println!("{} Environment Overlay:", "🔍".cyan());

    if config.env.is_empty() {
        println!("  (none)");
        return Ok(());
    }

    let max_len = config.env.keys().map(|k| k.len()).max().unwrap_or(0);
    for (key, val) in &config.env {
        let padding = " ".repeat(max_len - key.len() + 1);
        let source = config.env_sources.get(key).map(String::as_str).unwrap_or("?");
        let shadowed = env::var(key).is_ok_and(|current| &current != val);
        if shadowed {
            println!("  {}{}= {} {}", key.bold(), padding, val, format!("({}, overrides shell)", source).yellow());
        } else {
            println!("  {}{}= {} {}", key.bold(), padding, val, format!("({})", source).dimmed());
        }
    }

    Ok(())
}
