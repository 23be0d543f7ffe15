/// Interpreter state that lives across command lines.
///
/// Environment and working directory are not mirrored here: they are the
/// process's own, so forked subtrees and spawned programs inherit them.
#[derive(Debug, Clone, Default)]
pub struct ShellContext {
    pub exit_code: i32,
    pub trace: bool,
}

impl ShellContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trace(trace: bool) -> Self {
        Self {
            trace,
            ..Self::default()
        }
    }
}
