// Cd command

use crate::engine::ast::Invocation;
use crate::engine::commands::Executable;
use crate::engine::context::ShellContext;
use anyhow::Result;
use colored::*;
use log::debug;
use std::env;

pub struct CdCommand;

impl Executable for CdCommand {
    fn execute(&self, args: &[String], _inv: &Invocation, _ctx: &mut ShellContext) -> Result<i32> {
        // args[0] is "cd". Anything but a single directory is a no-op.
        if args.len() != 2 {
            return Ok(0);
        }
        let target = &args[1];

        match env::set_current_dir(target) {
            Ok(()) => {
                debug!("cd: now in {}", target);
                Ok(0)
            }
            Err(e) => {
                eprintln!("{} {}: {}", "cd:".red(), target, e);
                Ok(1)
            }
        }
    }
}
