use anyhow::Result;
use colored::*;
use log::{info, warn};
use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::time::Instant;
use crate::config::load_config;
use crate::engine::context::ShellContext;
use crate::engine::{SHELL_EXIT, run_command_line};
use crate::logger::{LogEntry, write_log};
use crate::script::load_script;

/// Runs each command line of `file` in order and returns the status the
/// process should exit with: the last ordinary status seen.
pub fn handle_run(file: &Path, trace: bool, name: Option<&str>) -> Result<i32> {
    let current_dir = env::current_dir()?;
    let config = load_config(&current_dir)?;
    let script = load_script(file)?;

    config.export_env();

    let label = name
        .map(str::to_string)
        .or_else(|| file.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "tree".to_string());
    // `cd` may move us; logs stay where the run started.
    let log_root = current_dir.join(".arbor").join("logs");

    let mut ctx = ShellContext::with_trace(trace || config.engine.trace);
    let mut last_status = 0;

    for (idx, line) in script.lines.iter().enumerate() {
        let started = Instant::now();
        let status = match run_command_line(line, &mut ctx) {
            Ok(status) => status,
            Err(e) => {
                // Only this command line is abandoned.
                eprintln!("{} line {}: {:#}", "arbor:".red(), idx + 1, e);
                1
            }
        };

        if status == SHELL_EXIT {
            info!("exit requested at line {}", idx + 1);
            break;
        }
        last_status = status;

        let env_vars: HashMap<String, String> = env::vars().collect();
        let rendered = line.to_string();
        let entry = LogEntry {
            label: &label,
            command: &rendered,
            duration: started.elapsed(),
            exit_code: status,
            env_vars: &env_vars,
        };
        match write_log(&log_root, config.engine.log_strategy, &entry) {
            Ok(Some(path)) => info!("execution log written to {}", path.display()),
            Ok(None) => {}
            Err(e) => warn!("could not write execution log: {:#}", e),
        }
    }

    Ok(last_status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_run_stops_at_exit_and_keeps_last_status() {
        let _guard = crate::engine::test_lock();
        let dir = tempdir().unwrap();
        let before = dir.path().join("before.txt");
        let after = dir.path().join("after.txt");
        let tree = dir.path().join("lines.toml");
        fs::write(
            &tree,
            format!(
                r#"
                [[line]]
                simple.invocation = {{ verb = "printf", params = ["ok"], redirects = {{ output = '{}' }} }}

                [[line]]
                simple.invocation = {{ verb = "sh", params = ["-c", "exit 3"] }}

                [[line]]
                simple.invocation = {{ verb = "quit" }}

                [[line]]
                simple.invocation = {{ verb = "printf", params = ["no"], redirects = {{ output = '{}' }} }}
                "#,
                before.display(),
                after.display()
            ),
        )
        .unwrap();

        let status = handle_run(&tree, false, Some("unit")).unwrap();
        assert_eq!(status, 3);
        assert_eq!(fs::read_to_string(&before).unwrap(), "ok");
        assert!(!after.exists());
    }

    #[test]
    fn test_run_rejects_malformed_file() {
        let dir = tempdir().unwrap();
        let tree = dir.path().join("bad.toml");
        fs::write(&tree, "[[line]]\nsimple.invocation = { verb = [] }\n").unwrap();
        assert!(handle_run(&tree, false, None).is_err());
    }
}
