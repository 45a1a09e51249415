//! Query parser - recursive descent over the token stream
//!
//! Precedence, low to high: `OR` < `AND` < `NOT` < comparison <
//! parenthesized/atomic. Negated comparators desugar to `Not` around the
//! positive form, so the evaluator only knows four leaf shapes.

use regex::Regex;

use super::lexer::{Token, tokenize};

/// Parsed query expression.
///
/// `Display` renders a fully parenthesized canonical form that re-parses
/// to an equivalent expression; the empty query renders as the empty
/// string and parses to [`QueryExpr::True`].
#[derive(Debug, Clone)]
pub enum QueryExpr {
    /// Matches every instance (the empty query)
    True,
    /// Matches instances of one kind
    Kind(String),
    /// Annotation equality against the value's string form
    Eq { key: String, value: String },
    /// Annotation regex match against the value's string form
    Matches { key: String, pattern: Regex },
    And(Box<QueryExpr>, Box<QueryExpr>),
    Or(Box<QueryExpr>, Box<QueryExpr>),
    Not(Box<QueryExpr>),
}

impl PartialEq for QueryExpr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (QueryExpr::True, QueryExpr::True) => true,
            (QueryExpr::Kind(a), QueryExpr::Kind(b)) => a == b,
            (QueryExpr::Eq { key: ka, value: va }, QueryExpr::Eq { key: kb, value: vb }) => {
                ka == kb && va == vb
            }
            (
                QueryExpr::Matches { key: ka, pattern: pa },
                QueryExpr::Matches { key: kb, pattern: pb },
            ) => ka == kb && pa.as_str() == pb.as_str(),
            (QueryExpr::And(la, ra), QueryExpr::And(lb, rb)) => la == lb && ra == rb,
            (QueryExpr::Or(la, ra), QueryExpr::Or(lb, rb)) => la == lb && ra == rb,
            (QueryExpr::Not(a), QueryExpr::Not(b)) => a == b,
            _ => false,
        }
    }
}

impl std::fmt::Display for QueryExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryExpr::True => Ok(()),
            QueryExpr::Kind(name) => write!(f, "{}", name),
            QueryExpr::Eq { key, value } => {
                write!(f, "{} = \"{}\"", key, value.replace('\\', "\\\\").replace('"', "\\\""))
            }
            QueryExpr::Matches { key, pattern } => {
                write!(f, "{} =~ /{}/", key, pattern.as_str().replace('/', "\\/"))
            }
            QueryExpr::And(left, right) => write!(f, "({} AND {})", left, right),
            QueryExpr::Or(left, right) => write!(f, "({} OR {})", left, right),
            QueryExpr::Not(inner) => write!(f, "NOT {}", inner),
        }
    }
}

/// Failure while parsing a scanned query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected}, found {found} at position {position}")]
pub struct ParseError {
    /// Byte position of the offending token (input length at end of input)
    pub position: usize,
    /// What the grammar needed next
    pub expected: String,
    /// What was there instead
    pub found: String,
}

/// Parse a query string into an expression.
///
/// Whitespace-only input yields [`QueryExpr::True`].
pub fn parse_query(input: &str) -> Result<QueryExpr, super::QueryError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Ok(QueryExpr::True);
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: input.len(),
    };
    let expr = parser.parse_or()?;
    parser.expect_end()?;
    Ok(expr)
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn parse_or(&mut self) -> Result<QueryExpr, ParseError> {
        let mut expr = self.parse_and()?;
        while self.eat(&Token::Or) {
            let rhs = self.parse_and()?;
            expr = QueryExpr::Or(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<QueryExpr, ParseError> {
        let mut expr = self.parse_not()?;
        while self.eat(&Token::And) {
            let rhs = self.parse_not()?;
            expr = QueryExpr::And(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn parse_not(&mut self) -> Result<QueryExpr, ParseError> {
        if self.eat(&Token::Not) {
            let inner = self.parse_not()?;
            Ok(QueryExpr::Not(Box::new(inner)))
        } else {
            self.parse_primary()
        }
    }

    fn parse_primary(&mut self) -> Result<QueryExpr, ParseError> {
        if self.eat(&Token::LParen) {
            let expr = self.parse_or()?;
            if !self.eat(&Token::RParen) {
                return Err(self.error_here("')'"));
            }
            return Ok(expr);
        }
        self.parse_atom()
    }

    /// `IDENT` alone filters by kind; `IDENT COMPARATOR value` compares an
    /// annotation. Negated comparators wrap the positive form in `Not`.
    fn parse_atom(&mut self) -> Result<QueryExpr, ParseError> {
        let key = match self.peek() {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.advance();
                name
            }
            _ => return Err(self.error_here("an identifier, 'NOT' or '('")),
        };

        let (negated, is_match) = match self.peek() {
            Some(Token::Eq) => (false, false),
            Some(Token::NotEq) => (true, false),
            Some(Token::Match) => (false, true),
            Some(Token::NotMatch) => (true, true),
            _ => return Ok(QueryExpr::Kind(key)),
        };
        self.advance();

        let expr = if is_match {
            let (position, pattern) = match self.peek_with_position() {
                Some((position, Token::Regex(pattern))) | Some((position, Token::Str(pattern))) => {
                    (position, pattern.clone())
                }
                _ => return Err(self.error_here("a regex or quoted string")),
            };
            self.advance();
            let pattern = Regex::new(&pattern).map_err(|e| ParseError {
                position,
                expected: "a valid regex".to_string(),
                found: e.to_string(),
            })?;
            QueryExpr::Matches { key, pattern }
        } else {
            let value = match self.peek() {
                Some(Token::Str(value)) => value.clone(),
                _ => return Err(self.error_here("a quoted string")),
            };
            self.advance();
            QueryExpr::Eq { key, value }
        };

        Ok(if negated { QueryExpr::Not(Box::new(expr)) } else { expr })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn peek_with_position(&self) -> Option<(usize, &Token)> {
        self.tokens.get(self.pos).map(|(p, t)| (*p, t))
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_end(&mut self) -> Result<(), ParseError> {
        if self.pos < self.tokens.len() {
            Err(self.error_here("end of input"))
        } else {
            Ok(())
        }
    }

    fn error_here(&self, expected: &str) -> ParseError {
        match self.tokens.get(self.pos) {
            Some((position, token)) => ParseError {
                position: *position,
                expected: expected.to_string(),
                found: token.describe(),
            },
            None => ParseError {
                position: self.end,
                expected: expected.to_string(),
                found: "end of input".to_string(),
            },
        }
    }
}
