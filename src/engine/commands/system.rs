// System command
use crate::engine::EXEC_FAILED;
use crate::engine::ast::Invocation;
use crate::engine::commands::Executable;
use crate::engine::context::ShellContext;
use crate::engine::redirect;
use anyhow::{Context, Result};
use colored::*;
use log::{info, warn};
use nix::libc;
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::process::{Command, ExitStatus, Stdio};

pub struct SystemCommand;

impl Executable for SystemCommand {
    fn execute(&self, args: &[String], inv: &Invocation, _ctx: &mut ShellContext) -> Result<i32> {
        let program = &args[0];

        let streams = match redirect::open_streams(&inv.redirects) {
            Ok(streams) => streams,
            Err(e) => return redirect::report_failure(e),
        };

        // Environment and working directory are inherited from this process.
        let mut cmd = Command::new(program);
        cmd.args(&args[1..]);
        if let Some(file) = streams.stdin {
            cmd.stdin(Stdio::from(file));
        }
        if let Some(file) = streams.stdout {
            cmd.stdout(Stdio::from(file));
        }
        if let Some(file) = streams.stderr {
            cmd.stderr(Stdio::from(file));
        }

        let spawned = cmd.spawn();
        // Release our copies of the redirection files before waiting.
        drop(cmd);

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) if is_resource_error(&e) => {
                return Err(e).with_context(|| format!("Failed to create process for '{}'", program));
            }
            Err(e) => {
                info!("exec {} failed: {}", program, e);
                eprintln!("{}", format!("Execution failed for '{}'", program).red());
                return Ok(EXEC_FAILED);
            }
        };

        info!("spawned {} (pid {})", program, child.id());
        let status = child
            .wait()
            .with_context(|| format!("Failed to wait for '{}'", program))?;
        Ok(exit_code(program, status))
    }
}

// Fork-level failures abort the command line; everything else means the
// program could not be loaded.
fn is_resource_error(err: &io::Error) -> bool {
    matches!(err.raw_os_error(), Some(libc::EAGAIN) | Some(libc::ENOMEM))
}

fn exit_code(program: &str, status: ExitStatus) -> i32 {
    match status.code() {
        Some(code) => code,
        None => {
            warn!("{} terminated by signal {:?}", program, status.signal());
            1
        }
    }
}
