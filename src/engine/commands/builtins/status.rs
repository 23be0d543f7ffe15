use crate::engine::ast::Invocation;
use crate::engine::commands::Executable;
use crate::engine::context::ShellContext;
use anyhow::Result;

/// `true` and `false`: a fixed status, no process.
pub struct StatusCommand(pub i32);

impl Executable for StatusCommand {
    fn execute(&self, _args: &[String], _inv: &Invocation, _ctx: &mut ShellContext) -> Result<i32> {
        Ok(self.0)
    }
}
