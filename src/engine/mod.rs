pub mod ast;
pub mod commands;
pub mod context;
pub mod executor;
pub mod expand;
pub mod redirect;

use ast::CommandNode;
use context::ShellContext;
use executor::interpret;
use anyhow::Result;

/// Returned by `exit`/`quit`: the session should end. Never a process status.
pub const SHELL_EXIT: i32 = -100;

/// Status of a command whose executable could not be loaded.
pub const EXEC_FAILED: i32 = 127;


pub fn run_command_line(node: &CommandNode, ctx: &mut ShellContext) -> Result<i32> {
    node.validate()?;
    let status = interpret(node, ctx, 0)?;
    ctx.exit_code = status;
    Ok(status)
}

// Tests share the process's cwd, environment and children.
#[cfg(test)]
pub(crate) fn test_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
