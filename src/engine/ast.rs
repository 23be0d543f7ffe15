use anyhow::{Result, bail};
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::sync::LazyLock;

static ASSIGNMENT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex"));

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordPart {
    // Plain text: "echo", "out.txt"
    Literal(String),
    // Environment reference: "$HOME"
    Var(String),
}

/// A token built from literal and variable parts, resolved at execution time.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "WordRepr")]
pub struct Word(pub Vec<WordPart>);

// Tree files may spell a single-literal word as a bare string.
#[derive(Deserialize)]
#[serde(untagged)]
enum WordRepr {
    Plain(String),
    Parts(Vec<WordPart>),
}

impl From<WordRepr> for Word {
    fn from(repr: WordRepr) -> Self {
        match repr {
            WordRepr::Plain(s) => Word::literal(&s),
            WordRepr::Parts(parts) => Word(parts),
        }
    }
}

impl Word {
    pub fn literal(s: &str) -> Self {
        Word(vec![WordPart::Literal(s.to_string())])
    }

    pub fn var(name: &str) -> Self {
        Word(vec![WordPart::Var(name.to_string())])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    #[default]
    Truncate, // >
    Append,   // >>
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Redirects {
    pub input: Option<Word>,
    pub output: Option<Word>,
    pub error: Option<Word>,
    #[serde(default)]
    pub output_mode: OutputMode,
    #[serde(default)]
    pub error_mode: OutputMode,
}

impl Redirects {
    pub fn has_outputs(&self) -> bool {
        self.output.is_some() || self.error.is_some()
    }
}

/// A builtin or external program call: "sort -r < in > out".
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Invocation {
    pub verb: Word,
    #[serde(default)]
    pub params: Vec<Word>,
    #[serde(default)]
    pub redirects: Redirects,
}

impl Invocation {
    pub fn new(verb: Word, params: Vec<Word>) -> Self {
        Self {
            verb,
            params,
            redirects: Redirects::default(),
        }
    }

    pub fn with_stdin(mut self, target: Word) -> Self {
        self.redirects.input = Some(target);
        self
    }

    pub fn with_stdout(mut self, target: Word, mode: OutputMode) -> Self {
        self.redirects.output = Some(target);
        self.redirects.output_mode = mode;
        self
    }

    pub fn with_stderr(mut self, target: Word, mode: OutputMode) -> Self {
        self.redirects.error = Some(target);
        self.redirects.error_mode = mode;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.verb.is_empty() {
            bail!("Malformed command: invocation without a verb");
        }
        let targets = [
            ("input", &self.redirects.input),
            ("output", &self.redirects.output),
            ("error", &self.redirects.error),
        ];
        for (stream, target) in targets {
            if target.as_ref().is_some_and(Word::is_empty) {
                bail!("Malformed command: empty {} redirection for '{}'", stream, self.verb);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimpleCommand {
    // Assignment: "NAME=value"
    Assignment { name: String, value: Word },
    Invocation(Invocation),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Sequential, // ;
    Parallel,   // &
    IfFailure,  // ||
    IfSuccess,  // &&
    Pipe,       // |
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Sequential => ";",
            Operator::Parallel => "&",
            Operator::IfFailure => "||",
            Operator::IfSuccess => "&&",
            Operator::Pipe => "|",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandNode {
    Simple(SimpleCommand),
    Compound {
        op: Operator,
        left: Box<CommandNode>,
        right: Box<CommandNode>,
    },
}

impl From<Invocation> for CommandNode {
    fn from(inv: Invocation) -> Self {
        CommandNode::Simple(SimpleCommand::Invocation(inv))
    }
}

impl CommandNode {
    pub fn compound(op: Operator, left: impl Into<CommandNode>, right: impl Into<CommandNode>) -> Self {
        CommandNode::Compound {
            op,
            left: Box::new(left.into()),
            right: Box::new(right.into()),
        }
    }

    pub fn assign(name: &str, value: Word) -> Self {
        CommandNode::Simple(SimpleCommand::Assignment {
            name: name.to_string(),
            value,
        })
    }

    /// Rejects trees the interpreter cannot run: verbless invocations,
    /// empty redirection words and assignment names that are not identifiers.
    pub fn validate(&self) -> Result<()> {
        match self {
            CommandNode::Simple(SimpleCommand::Assignment { name, .. }) => {
                if !ASSIGNMENT_NAME.is_match(name) {
                    bail!("Malformed command: invalid variable name {:?}", name);
                }
                Ok(())
            }
            CommandNode::Simple(SimpleCommand::Invocation(inv)) => inv.validate(),
            CommandNode::Compound { left, right, .. } => {
                left.validate()?;
                right.validate()
            }
        }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("''");
        }
        for part in &self.0 {
            match part {
                WordPart::Literal(s) => f.write_str(&shell_words::quote(s))?,
                WordPart::Var(name) => write!(f, "${{{}}}", name)?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.verb)?;
        for param in &self.params {
            write!(f, " {}", param)?;
        }
        let r = &self.redirects;
        if let Some(input) = &r.input {
            write!(f, " < {}", input)?;
        }
        if let Some(output) = &r.output {
            let arrow = if r.output_mode == OutputMode::Append { ">>" } else { ">" };
            write!(f, " {} {}", arrow, output)?;
        }
        if let Some(error) = &r.error {
            let arrow = if r.error_mode == OutputMode::Append { "2>>" } else { "2>" };
            write!(f, " {} {}", arrow, error)?;
        }
        Ok(())
    }
}

impl fmt::Display for SimpleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimpleCommand::Assignment { name, value } => write!(f, "{}={}", name, value),
            SimpleCommand::Invocation(inv) => write!(f, "{}", inv),
        }
    }
}

impl fmt::Display for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandNode::Simple(cmd) => write!(f, "{}", cmd),
            CommandNode::Compound { op, left, right } => {
                fmt_operand(left, f)?;
                write!(f, " {} ", op.symbol())?;
                fmt_operand(right, f)
            }
        }
    }
}

// Nested compounds are parenthesized so the rendering keeps the tree shape.
fn fmt_operand(node: &CommandNode, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match node {
        CommandNode::Simple(_) => write!(f, "{}", node),
        CommandNode::Compound { .. } => write!(f, "({})", node),
    }
}
