// Parser module - pest grammar for Echo plus the stable dialect check
use std::fmt;
use std::str::FromStr;

use pest::error::LineColLocation;
use pest::Parser as _;
use pest_derive::Parser;

use crate::ast::SyntaxTree;

mod builder;
mod dialect;


#[derive(Parser)]
#[grammar = "parser/echo.pest"]
pub(crate) struct EchoGrammar;

/// Parse failure with a 1-based line and 1-based column
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} ({line}:{column})")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

impl From<pest::error::Error<Rule>> for ParseError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        let (line, column) = match err.line_col {
            LineColLocation::Pos(pos) => pos,
            LineColLocation::Span(start, _) => start,
        };
        Self::new(err.variant.message().into_owned(), line, column)
    }
}

/// Which flavour of Echo a parser accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Everything the grammar understands, including Next-only constructs
    #[default]
    Next,
    /// The narrower dialect produced by the transform pipeline
    Stable,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Next => write!(f, "next"),
            Dialect::Stable => write!(f, "stable"),
        }
    }
}

impl FromStr for Dialect {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "next" => Ok(Dialect::Next),
            "stable" => Ok(Dialect::Stable),
            _ => anyhow::bail!("Unknown dialect: {}", s),
        }
    }
}

/// Trait for Echo parsers
pub trait Parser: Send + Sync {
    /// Parse source code into a syntax tree
    fn parse(&self, source: &str) -> Result<SyntaxTree, ParseError>;

    /// Get parser name for debugging
    fn name(&self) -> &'static str;
}

/// The pest-backed parser, optionally restricted to the stable dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoParser {
    dialect: Dialect,
}

impl EchoParser {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// Parser that rejects every Next-only construct
    pub fn strict() -> Self {
        Self::new(Dialect::Stable)
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }
}

impl Parser for EchoParser {
    fn parse(&self, source: &str) -> Result<SyntaxTree, ParseError> {
        parse(source, self.dialect)
    }

    fn name(&self) -> &'static str {
        match self.dialect {
            Dialect::Next => "echo-next",
            Dialect::Stable => "echo-stable",
        }
    }
}

/// Create a parser by name
pub fn create_parser(parser_type: &str) -> anyhow::Result<Box<dyn Parser>> {
    match parser_type {
        "echo" | "echo-next" => Ok(Box::new(EchoParser::new(Dialect::Next))),
        "echo-stable" => Ok(Box::new(EchoParser::strict())),
        _ => anyhow::bail!("Unknown parser type: {}", parser_type),
    }
}

/// Parse `source` as a whole program in the given dialect
pub fn parse(source: &str, dialect: Dialect) -> Result<SyntaxTree, ParseError> {
    let mut pairs = EchoGrammar::parse(Rule::program, source)?;
    let program = pairs
        .next()
        .ok_or_else(|| ParseError::new("expected program", 1, 1))?;
    let tree = builder::build(source, program)?;

    if dialect == Dialect::Stable {
        dialect::check_stable(&tree)?;
    }

    Ok(tree)
}
