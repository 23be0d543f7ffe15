use crate::engine::SHELL_EXIT;
use crate::engine::ast::{CommandNode, Operator, SimpleCommand};
use crate::engine::commands::Executable;
use crate::engine::commands::builtin::Builtin;
use crate::engine::commands::builtins::assign::assign;
use crate::engine::commands::system::SystemCommand;
use crate::engine::context::ShellContext;
use crate::engine::expand::build_argv;
use anyhow::{Context, Result, bail};
use colored::*;
use log::{debug, warn};
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::libc::{STDIN_FILENO, STDOUT_FILENO};
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{self, ForkResult, Pid, close, dup2, fork};
use std::fs::File;
use std::io::{self, Read, Write};
use std::os::fd::{AsRawFd, OwnedFd};
use std::process;
#[cfg(test)]
use std::sync::atomic::{AtomicBool, Ordering};

/// Makes every forked child fail while wiring its descriptors.
#[cfg(test)]
pub(crate) static FAIL_WIRING: AtomicBool = AtomicBool::new(false);

/// Single recursive entry point: leaves run as simple commands, internal
/// nodes as operators. Every subtree, forked or not, comes back through here.
pub fn interpret(node: &CommandNode, ctx: &mut ShellContext, level: usize) -> Result<i32> {
    match node {
        CommandNode::Simple(cmd) => execute_simple(cmd, ctx, level),
        CommandNode::Compound { op, left, right } => {
            debug!("{:indent$}{}", "", op.symbol(), indent = level * 2);
            execute_compound(*op, left, right, ctx, level + 1)
        }
    }
}

fn execute_simple(cmd: &SimpleCommand, ctx: &mut ShellContext, level: usize) -> Result<i32> {
    debug!("{:indent$}{}", "", cmd, indent = level * 2);
    if ctx.trace {
        eprintln!("{} {}", "+".dimmed(), cmd);
    }

    match cmd {
        SimpleCommand::Assignment { name, value } => Ok(assign(name, value)),
        SimpleCommand::Invocation(inv) => {
            let args = build_argv(&inv.verb, &inv.params);
            match Builtin::lookup(&args[0]) {
                Some(builtin) => builtin.run(&args, inv, ctx),
                None => SystemCommand.execute(&args, inv, ctx),
            }
        }
    }
}

#[derive(PartialEq)]
enum SequenceMode {
    And,
    Or,
    Always,
}

fn execute_compound(
    op: Operator,
    left: &CommandNode,
    right: &CommandNode,
    ctx: &mut ShellContext,
    level: usize,
) -> Result<i32> {
    match op {
        Operator::Sequential => handle_sequence(left, right, ctx, level, SequenceMode::Always),
        Operator::IfSuccess => handle_sequence(left, right, ctx, level, SequenceMode::And),
        Operator::IfFailure => handle_sequence(left, right, ctx, level, SequenceMode::Or),
        Operator::Parallel => run_in_parallel(left, right, ctx, level),
        Operator::Pipe => run_on_pipe(left, right, ctx, level),
    }
}

fn handle_sequence(
    left: &CommandNode,
    right: &CommandNode,
    ctx: &mut ShellContext,
    level: usize,
    mode: SequenceMode,
) -> Result<i32> {
    let left_res = interpret(left, ctx, level)?;
    // A session exit is not a status; nothing after it runs.
    if left_res == SHELL_EXIT {
        return Ok(SHELL_EXIT);
    }

    let proceed = match mode {
        SequenceMode::And => left_res == 0,
        SequenceMode::Or => left_res != 0,
        SequenceMode::Always => true,
    };

    if proceed {
        interpret(right, ctx, level)
    } else {
        Ok(left_res)
    }
}

/// Both subtrees run in their own process; the result is the status of the
/// child waited for last (the right one).
fn run_in_parallel(
    left: &CommandNode,
    right: &CommandNode,
    ctx: &mut ShellContext,
    level: usize,
) -> Result<i32> {
    let left_child = fork_subtree(left, ctx, level, || Ok(()))?;
    let right_child = match fork_subtree(right, ctx, level, || Ok(())) {
        Ok(child) => child,
        Err(e) => {
            let _ = wait_child(left_child);
            return Err(e);
        }
    };

    let left_res = wait_child(left_child);
    let right_res = wait_child(right_child);
    left_res?;
    right_res
}

fn run_on_pipe(
    left: &CommandNode,
    right: &CommandNode,
    ctx: &mut ShellContext,
    level: usize,
) -> Result<i32> {
    let (read_end, write_end) = unistd::pipe().context("Failed to create pipe")?;
    let (read_fd, write_fd) = (read_end.as_raw_fd(), write_end.as_raw_fd());

    let left_child = fork_subtree(left, ctx, level, || {
        dup2(write_fd, STDOUT_FILENO)?;
        close(read_fd)?;
        close(write_fd)
    })?;

    let right_child = match fork_subtree(right, ctx, level, || {
        dup2(read_fd, STDIN_FILENO)?;
        close(read_fd)?;
        close(write_fd)
    }) {
        Ok(child) => child,
        Err(e) => {
            drop((read_end, write_end));
            let _ = wait_child(left_child);
            return Err(e);
        }
    };

    // The reader only sees EOF once no process holds the write end.
    drop(read_end);
    drop(write_end);

    let left_res = wait_child(left_child);
    let right_res = wait_child(right_child);
    left_res?;
    right_res
}

/// A forked subtree. `report` is the read end of a pipe the child writes to
/// only when it hits an engine error instead of producing a status.
struct Forked {
    pid: Pid,
    report: OwnedFd,
}

/// Forks a process that applies `wire` to its descriptors, interprets `node`
/// and exits with the resulting status.
fn fork_subtree(
    node: &CommandNode,
    ctx: &mut ShellContext,
    level: usize,
    wire: impl FnOnce() -> nix::Result<()>,
) -> Result<Forked> {
    let (report_read, report_write) = unistd::pipe2(OFlag::O_CLOEXEC | OFlag::O_NONBLOCK)
        .context("Failed to create report pipe")?;

    // Unflushed output would otherwise be written twice.
    io::stdout().flush().ok();
    io::stderr().flush().ok();

    // SAFETY: the child never returns into the caller; it rewires descriptors,
    // evaluates its subtree and leaves through process::exit.
    match unsafe { fork() }.context("Failed to fork")? {
        ForkResult::Parent { child } => {
            debug!("{:indent$}forked pid {}", "", child, indent = level * 2);
            drop(report_write);
            Ok(Forked {
                pid: child,
                report: report_read,
            })
        }
        ForkResult::Child => {
            drop(report_read);
            let wired = wire();
            #[cfg(test)]
            let wired = match FAIL_WIRING.load(Ordering::SeqCst) {
                true => Err(Errno::EBADF),
                false => wired,
            };

            let outcome = match wired {
                Ok(()) => interpret(node, ctx, level),
                Err(errno) => Err(anyhow::Error::new(errno).context("Failed to redirect descriptors")),
            };
            let status = match outcome {
                Ok(SHELL_EXIT) => 0,
                Ok(status) => status,
                Err(e) => {
                    let _ = File::from(report_write).write_all(format!("{:#}", e).as_bytes());
                    1
                }
            };
            process::exit(status)
        }
    }
}

/// Blocks until the child terminates. A signal death maps to status 1; an
/// engine error reported by the child is raised again here.
fn wait_child(child: Forked) -> Result<i32> {
    let Forked { pid, report } = child;
    let status = loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => break code,
            Ok(WaitStatus::Signaled(_, signal, _)) => {
                warn!("pid {} terminated by {:?}", pid, signal);
                break 1;
            }
            Ok(other) => debug!("pid {}: ignoring {:?}", pid, other),
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(e).with_context(|| format!("Failed to wait for pid {}", pid)),
        }
    };

    // Grandchildren may still hold the write end, so an empty pipe is not EOF.
    let mut message = Vec::new();
    match File::from(report).read_to_end(&mut message) {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
        Err(e) => return Err(e).with_context(|| format!("Failed to read report of pid {}", pid)),
    }
    if !message.is_empty() {
        bail!("subtree in pid {} aborted: {}", pid, String::from_utf8_lossy(&message));
    }
    Ok(status)
}
