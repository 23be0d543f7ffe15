// Tree files: already-parsed command lines stored as TOML
use crate::engine::ast::CommandNode;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct CommandScript {
    #[serde(default, rename = "line")]
    pub lines: Vec<CommandNode>,
}

pub fn parse_script(content: &str) -> Result<CommandScript> {
    let script: CommandScript = toml::from_str(content).context("Failed to parse command tree")?;
    for (idx, line) in script.lines.iter().enumerate() {
        line.validate().with_context(|| format!("Command line {} is malformed", idx + 1))?;
    }
    Ok(script)
}

pub fn load_script(path: &Path) -> Result<CommandScript> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read tree file: {}", path.display()))?;
    parse_script(&content).with_context(|| format!("In {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ast::{Invocation, Operator, OutputMode, SimpleCommand, Word, WordPart};

    #[test]
    fn test_parse_pipeline_line() {
        let script = parse_script(
            r#"
            [[line]]
            [line.compound]
            op = "pipe"
            left.simple.invocation = { verb = "printf", params = ["abc"] }
            right.simple.invocation = { verb = "wc", params = ["-c"], redirects = { output = [{ var = "OUT" }], output_mode = "append" } }

            [[line]]
            simple.assignment = { name = "OUT", value = [{ literal = "dir/" }, { var = "HOME" }] }
            "#,
        )
        .unwrap();
        assert_eq!(script.lines.len(), 2);

        let expected_right = Invocation::new(Word::literal("wc"), vec![Word::literal("-c")])
            .with_stdout(Word::var("OUT"), OutputMode::Append);
        let expected = CommandNode::compound(
            Operator::Pipe,
            Invocation::new(Word::literal("printf"), vec![Word::literal("abc")]),
            expected_right,
        );
        assert_eq!(script.lines[0], expected);

        match &script.lines[1] {
            CommandNode::Simple(SimpleCommand::Assignment { name, value }) => {
                assert_eq!(name, "OUT");
                assert_eq!(
                    value.0,
                    vec![WordPart::Literal("dir/".into()), WordPart::Var("HOME".into())]
                );
            }
            other => panic!("Expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_line_is_rejected() {
        let err = parse_script(
            r#"
            [[line]]
            simple.assignment = { name = "9lives", value = "x" }
            "#,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("Command line 1"));
    }

    #[test]
    fn test_unknown_operator_is_rejected() {
        let res = parse_script(
            r#"
            [[line]]
            [line.compound]
            op = "xor"
            left.simple.invocation = { verb = "true" }
            right.simple.invocation = { verb = "false" }
            "#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_empty_script() {
        assert!(parse_script("").unwrap().lines.is_empty());
    }
}
