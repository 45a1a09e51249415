//! Query lexer - scans a filter expression into tokens
//!
//! Tokens: identifiers, quoted strings, `/…/` regex literals, the
//! comparators `=` `!=` `=~` `!~`, the keywords `AND`/`OR`/`NOT`, and
//! parentheses. Every token carries the byte position it starts at so
//! parse failures can point back into the source text.

/// One scanned token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Bare identifier or keyword-free word (kind name or annotation key)
    Ident(String),
    /// Double-quoted string literal, unescaped
    Str(String),
    /// `/…/` regex literal, delimiters stripped
    Regex(String),
    /// `=`
    Eq,
    /// `!=`
    NotEq,
    /// `=~`
    Match,
    /// `!~`
    NotMatch,
    /// `AND`
    And,
    /// `OR`
    Or,
    /// `NOT`
    Not,
    /// `(`
    LParen,
    /// `)`
    RParen,
}

impl Token {
    /// Short human form for error messages
    pub fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("identifier {:?}", name),
            Token::Str(value) => format!("string {:?}", value),
            Token::Regex(pattern) => format!("regex /{}/", pattern),
            Token::Eq => "'='".to_string(),
            Token::NotEq => "'!='".to_string(),
            Token::Match => "'=~'".to_string(),
            Token::NotMatch => "'!~'".to_string(),
            Token::And => "'AND'".to_string(),
            Token::Or => "'OR'".to_string(),
            Token::Not => "'NOT'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
        }
    }
}

/// Failure while scanning query text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("unexpected character {found:?} at position {position}")]
    UnexpectedChar { position: usize, found: char },

    #[error("unterminated string literal starting at position {position}")]
    UnterminatedString { position: usize },

    #[error("unterminated regex literal starting at position {position}")]
    UnterminatedRegex { position: usize },
}

impl LexError {
    /// Character position the failure was detected at
    pub fn position(&self) -> usize {
        match self {
            LexError::UnexpectedChar { position, .. }
            | LexError::UnterminatedString { position }
            | LexError::UnterminatedRegex { position } => *position,
        }
    }
}

/// Scan a query string into positioned tokens.
pub fn tokenize(input: &str) -> Result<Vec<(usize, Token)>, LexError> {
    Lexer::new(input).run()
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.char_indices().peekable(),
        }
    }

    fn run(mut self) -> Result<Vec<(usize, Token)>, LexError> {
        let mut tokens = Vec::new();
        while let Some(&(position, ch)) = self.chars.peek() {
            if ch.is_whitespace() {
                self.chars.next();
                continue;
            }
            let token = match ch {
                '(' => {
                    self.chars.next();
                    Token::LParen
                }
                ')' => {
                    self.chars.next();
                    Token::RParen
                }
                '=' => {
                    self.chars.next();
                    if self.eat('~') { Token::Match } else { Token::Eq }
                }
                '!' => {
                    self.chars.next();
                    if self.eat('=') {
                        Token::NotEq
                    } else if self.eat('~') {
                        Token::NotMatch
                    } else {
                        return Err(LexError::UnexpectedChar { position, found: '!' });
                    }
                }
                '"' => self.lex_string(position)?,
                '/' => self.lex_regex(position)?,
                c if is_ident_start(c) => self.lex_ident(),
                other => {
                    return Err(LexError::UnexpectedChar { position, found: other });
                }
            };
            tokens.push((position, token));
        }
        Ok(tokens)
    }

    fn eat(&mut self, expected: char) -> bool {
        if matches!(self.chars.peek(), Some(&(_, c)) if c == expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn lex_string(&mut self, start: usize) -> Result<Token, LexError> {
        self.chars.next(); // opening quote
        let mut out = String::new();
        loop {
            match self.chars.next() {
                Some((_, '"')) => return Ok(Token::Str(out)),
                Some((_, '\\')) => match self.chars.next() {
                    Some((_, escaped)) => out.push(escaped),
                    None => return Err(LexError::UnterminatedString { position: start }),
                },
                Some((_, c)) => out.push(c),
                None => return Err(LexError::UnterminatedString { position: start }),
            }
        }
    }

    fn lex_regex(&mut self, start: usize) -> Result<Token, LexError> {
        self.chars.next(); // opening slash
        let mut out = String::new();
        loop {
            match self.chars.next() {
                Some((_, '/')) => return Ok(Token::Regex(out)),
                Some((_, '\\')) => match self.chars.next() {
                    // Only the delimiter escape is consumed; regex escapes
                    // like \d pass through for the regex engine
                    Some((_, '/')) => out.push('/'),
                    Some((_, other)) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => return Err(LexError::UnterminatedRegex { position: start }),
                },
                Some((_, c)) => out.push(c),
                None => return Err(LexError::UnterminatedRegex { position: start }),
            }
        }
    }

    fn lex_ident(&mut self) -> Token {
        let mut word = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if is_ident_continue(c) {
                word.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        match word.as_str() {
            "AND" => Token::And,
            "OR" => Token::Or,
            "NOT" => Token::Not,
            _ => Token::Ident(word),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.' || c == '-'
}
