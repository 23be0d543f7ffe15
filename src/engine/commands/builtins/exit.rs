// Exit command

use crate::engine::SHELL_EXIT;
use crate::engine::ast::Invocation;
use crate::engine::commands::Executable;
use crate::engine::context::ShellContext;
use anyhow::Result;

/// `exit` and `quit`. The session loop, not this command, ends the process.
pub struct ExitCommand;

impl Executable for ExitCommand {
    fn execute(&self, _args: &[String], _inv: &Invocation, _ctx: &mut ShellContext) -> Result<i32> {
        Ok(SHELL_EXIT)
    }
}
