// Builtin dispatch
use crate::engine::ast::Invocation;
use crate::engine::commands::Executable;
use crate::engine::commands::builtins::{cd::CdCommand, exit::ExitCommand, status::StatusCommand};
use crate::engine::context::ShellContext;
use crate::engine::redirect;
use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Cd,
    Exit,
    True,
    False,
}

const BUILTINS: &[(&str, Builtin)] = &[
    ("cd", Builtin::Cd),
    ("exit", Builtin::Exit),
    ("quit", Builtin::Exit),
    ("true", Builtin::True),
    ("false", Builtin::False),
];

static CD: CdCommand = CdCommand;
static EXIT: ExitCommand = ExitCommand;
static TRUE: StatusCommand = StatusCommand(0);
static FALSE: StatusCommand = StatusCommand(1);

impl Builtin {
    pub fn lookup(name: &str) -> Option<Self> {
        BUILTINS
            .iter()
            .find(|(builtin_name, _)| *builtin_name == name)
            .map(|(_, builtin)| *builtin)
    }

    fn command(self) -> &'static dyn Executable {
        match self {
            Builtin::Cd => &CD,
            Builtin::Exit => &EXIT,
            Builtin::True => &TRUE,
            Builtin::False => &FALSE,
        }
    }

    /// Runs in the calling process. Output and error targets are touched first.
    pub fn run(self, args: &[String], inv: &Invocation, ctx: &mut ShellContext) -> Result<i32> {
        if inv.redirects.has_outputs() {
            if let Err(e) = redirect::touch_outputs(&inv.redirects) {
                return redirect::report_failure(e);
            }
        }
        self.command().execute(args, inv, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SHELL_EXIT;
    use crate::engine::ast::Word;

    #[test]
    fn test_lookup_table() {
        assert_eq!(Builtin::lookup("cd"), Some(Builtin::Cd));
        assert_eq!(Builtin::lookup("exit"), Some(Builtin::Exit));
        assert_eq!(Builtin::lookup("quit"), Some(Builtin::Exit));
        assert_eq!(Builtin::lookup("true"), Some(Builtin::True));
        assert_eq!(Builtin::lookup("false"), Some(Builtin::False));
        assert_eq!(Builtin::lookup("echo"), None);
        assert_eq!(Builtin::lookup("CD"), None);
    }

    #[test]
    fn test_status_builtins() {
        let mut ctx = ShellContext::new();
        let inv = Invocation::new(Word::literal("true"), vec![]);
        assert_eq!(Builtin::True.run(&["true".to_string()], &inv, &mut ctx).unwrap(), 0);
        assert_eq!(Builtin::False.run(&["false".to_string()], &inv, &mut ctx).unwrap(), 1);
        assert_eq!(Builtin::Exit.run(&["quit".to_string()], &inv, &mut ctx).unwrap(), SHELL_EXIT);
    }
}
