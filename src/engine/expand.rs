// Word resolution
use crate::engine::ast::{Word, WordPart};
use std::env;

impl Word {
    /// Concatenates every part in order. Variables are read from the process
    /// environment at call time; unset ones contribute nothing.
    pub fn resolve(&self) -> String {
        let mut res = String::new();
        for part in &self.0 {
            match part {
                WordPart::Literal(s) => res.push_str(s),
                WordPart::Var(name) => {
                    if let Some(val) = lookup_var(name) {
                        res.push_str(&val);
                    }
                }
            }
        }
        res
    }
}

/// Resolves the verb and parameters into an argument vector, verb first.
pub fn build_argv(verb: &Word, params: &[Word]) -> Vec<String> {
    std::iter::once(verb).chain(params).map(Word::resolve).collect()
}

fn lookup_var(name: &str) -> Option<String> {
    // Names the OS cannot store are never set.
    if name.is_empty() || name.contains(['=', '\0']) {
        return None;
    }
    env::var_os(name).map(|v| v.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_lock;

    #[test]
    fn test_resolve_concatenates_parts() {
        let _guard = test_lock();
        unsafe { env::set_var("ARBOR_EXPAND_STEM", "report") };
        let word = Word(vec![
            WordPart::Literal("/tmp/".into()),
            WordPart::Var("ARBOR_EXPAND_STEM".into()),
            WordPart::Literal(".txt".into()),
        ]);
        assert_eq!(word.resolve(), "/tmp/report.txt");
        unsafe { env::remove_var("ARBOR_EXPAND_STEM") };
    }

    #[test]
    fn test_unset_variable_is_empty() {
        let _guard = test_lock();
        unsafe { env::remove_var("ARBOR_EXPAND_UNSET") };
        let word = Word(vec![
            WordPart::Literal("a".into()),
            WordPart::Var("ARBOR_EXPAND_UNSET".into()),
            WordPart::Literal("b".into()),
        ]);
        assert_eq!(word.resolve(), "ab");
        assert_eq!(Word::var("bad=name").resolve(), "");
        assert_eq!(Word::default().resolve(), "");
    }

    #[test]
    fn test_resolution_is_not_cached() {
        let _guard = test_lock();
        let word = Word::var("ARBOR_EXPAND_LIVE");
        unsafe { env::set_var("ARBOR_EXPAND_LIVE", "one") };
        assert_eq!(word.resolve(), "one");
        unsafe { env::set_var("ARBOR_EXPAND_LIVE", "two") };
        assert_eq!(word.resolve(), "two");
        unsafe { env::remove_var("ARBOR_EXPAND_LIVE") };
    }

    #[test]
    fn test_build_argv_keeps_order() {
        let argv = build_argv(&Word::literal("ls"), &[Word::literal("-l"), Word::literal("dir")]);
        assert_eq!(argv, vec!["ls", "-l", "dir"]);
    }
}
