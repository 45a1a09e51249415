//! Query language - textual filters over the resource graph
//!
//! A query is a boolean expression over kind names and annotation values:
//!
//! ```text
//! ApplicationService AND status = "current"
//! name =~ /billing/ OR NOT (kind = "Requirement")
//! ```
//!
//! Grammar, precedence low to high: `OR` < `AND` < `NOT` < comparison <
//! parenthesized/atomic. A bare identifier filters by kind name; a
//! `key OP value` triple compares an annotation (`=`/`!=` equality,
//! `=~`/`!~` regex match). The empty query matches everything.

pub mod lexer;
pub mod parser;
pub mod eval;

pub use eval::evaluate;
pub use lexer::{LexError, Token};
pub use parser::{ParseError, QueryExpr, parse_query};

use crate::graph::{ResourceGraph, ResourceId};

/// Error surfaced at the query boundary, wrapping lexer and parser
/// failures with their character position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl QueryError {
    /// Character position the failure was detected at
    pub fn position(&self) -> usize {
        match self {
            QueryError::Lex(e) => e.position(),
            QueryError::Parse(e) => e.position,
        }
    }
}

/// Compile and evaluate a query in one step.
///
/// Evaluation itself never fails; an expression that cannot match
/// anything yields an empty result. Result order is unspecified - callers
/// needing determinism sort explicitly.
pub fn execute(graph: &ResourceGraph, text: &str) -> Result<Vec<ResourceId>, QueryError> {
    let expr = parse_query(text)?;
    Ok(evaluate(graph, &expr))
}
