// Variable assignment
use crate::engine::ast::Word;
use colored::*;
use log::debug;
use std::env;

/// `NAME=value`: resolves the value and exports it into this process's
/// environment, where later commands in the same process lineage see it.
pub fn assign(name: &str, value: &Word) -> i32 {
    let val_str = value.resolve();
    if val_str.contains('\0') {
        eprintln!("{} {}: value contains a NUL byte", "arbor:".red(), name);
        return 1;
    }
    debug!("assign {}={:?}", name, val_str);
    // SAFETY: the engine evaluates one node at a time on a single thread;
    // concurrency only happens across forked processes with their own copy.
    unsafe { env::set_var(name, val_str) };
    0
}
