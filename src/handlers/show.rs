use anyhow::Result;
use colored::*;
use std::path::Path;
use crate::script::load_script;

pub fn handle_show(file: &Path) -> Result<()> {
    let script = load_script(file)?;

    if script.lines.is_empty() {
        println!("No command lines defined in {}.", file.display());
        return Ok(());
    }

    let width = script.lines.len().to_string().len();
    for (idx, line) in script.lines.iter().enumerate() {
        let number = format!("{:>width$}", idx + 1, width = width);
        println!("{}  {}", number.dimmed(), line);
    }

    Ok(())
}
