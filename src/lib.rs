//! Executes already-parsed shell command lines: a tree of `;`, `&`, `||`,
//! `&&` and `|` operators over simple commands with redirections.
//!
//! ```no_run
//! use arbor::engine::ast::{CommandNode, Invocation, Operator, Word};
//! use arbor::engine::context::ShellContext;
//! use arbor::engine::run_command_line;
//!
//! let tree = CommandNode::compound(
//!     Operator::Pipe,
//!     Invocation::new(Word::literal("printf"), vec![Word::literal("abc")]),
//!     Invocation::new(Word::literal("wc"), vec![Word::literal("-c")]),
//! );
//! let status = run_command_line(&tree, &mut ShellContext::new())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod handlers;
pub mod logger;
pub mod script;
