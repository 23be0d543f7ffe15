pub mod builtin;
pub mod builtins;
pub mod system;

use crate::engine::ast::Invocation;
use crate::engine::context::ShellContext;
use anyhow::Result;

/// A command the interpreter can run once its words are resolved.
/// `args[0]` is the verb.
pub trait Executable: Send + Sync {
    fn execute(&self, args: &[String], inv: &Invocation, ctx: &mut ShellContext) -> Result<i32>;
}
