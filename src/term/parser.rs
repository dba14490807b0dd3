//! Recursive descent parser for the textual term grammar.
//!
//! Parses term text into a [`Value`] tree. Uses the logos-based tokenizer
//! from [`crate::term::tokenizer`]. The grammar is the exact inverse of the
//! canonical `Display` rendering:
//!
//! ```text
//! value ::= "nil" | "true" | "false" | int | float | string
//!         | ident                          // symbol
//!         | ident "(" [ value, ... ] ")"   // term
//!         | "[" [ value, ... ] "]"         // list
//!         | "{" [ value ":" value, ... ] "}"
//! ```

use logos::Logos;

use super::tokenizer::Token;
use super::{Term, Value};

/// Errors from term text parsing.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected token at position {position}: {message}")]
    UnexpectedToken { position: usize, message: String },
    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),
    #[error("trailing input after value at position {0}")]
    TrailingInput(usize),
}

/// A positioned token.
#[derive(Debug, Clone)]
struct PToken {
    token: Token,
    text: String,
    /// Index in the token stream (for error reporting).
    pos: usize,
}

fn tokenize_positioned(input: &str) -> Vec<PToken> {
    let lexer = Token::lexer(input);
    let mut tokens = Vec::new();
    let mut idx = 0;

    for (result, span) in lexer.spanned() {
        if let Ok(token) = result {
            tokens.push(PToken {
                text: input[span].to_string(),
                token,
                pos: idx,
            });
            idx += 1;
        }
    }

    tokens
}

/// Parse term text into a [`Value`]. The whole input must be consumed.
pub fn parse_value(input: &str) -> Result<Value, ParseError> {
    let tokens = tokenize_positioned(input);
    let mut parser = Parser { tokens, cursor: 0 };

    let value = parser.parse_value()?;
    if !parser.is_eof() {
        return Err(ParseError::TrailingInput(parser.current_pos()));
    }

    Ok(value)
}

/// Parse term text that must be a term at the top level (e.g. a whole
/// dialog description).
pub fn parse_term(input: &str) -> Result<Term, ParseError> {
    match parse_value(input)? {
        Value::Term(t) => Ok(t),
        other => Err(ParseError::UnexpectedToken {
            position: 0,
            message: format!("expected a term, got {other}"),
        }),
    }
}

/// Recursive descent parser state.
struct Parser {
    tokens: Vec<PToken>,
    cursor: usize,
}

impl Parser {
    fn is_eof(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    fn peek(&self) -> Option<&PToken> {
        self.tokens.get(self.cursor)
    }

    fn advance(&mut self) -> Option<&PToken> {
        if self.cursor < self.tokens.len() {
            let tok = &self.tokens[self.cursor];
            self.cursor += 1;
            Some(tok)
        } else {
            None
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), ParseError> {
        match self.advance() {
            Some(tok) if &tok.token == expected => Ok(()),
            Some(tok) => Err(ParseError::UnexpectedToken {
                position: tok.pos,
                message: format!("expected {:?}, got {:?} '{}'", expected, tok.token, tok.text),
            }),
            None => Err(ParseError::UnexpectedEof(format!("expected {expected:?}"))),
        }
    }

    fn current_pos(&self) -> usize {
        self.peek().map(|t| t.pos).unwrap_or(self.tokens.len())
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        let tok = match self.advance() {
            Some(tok) => tok.clone(),
            None => return Err(ParseError::UnexpectedEof("expected a value".into())),
        };

        match tok.token {
            Token::Nil => Ok(Value::Nil),
            Token::True => Ok(Value::Bool(true)),
            Token::False => Ok(Value::Bool(false)),
            Token::Int => tok.text.parse::<i64>().map(Value::Int).map_err(|_| {
                ParseError::UnexpectedToken {
                    position: tok.pos,
                    message: format!("integer out of range: '{}'", tok.text),
                }
            }),
            Token::Float => tok.text.parse::<f64>().map(Value::Float).map_err(|_| {
                ParseError::UnexpectedToken {
                    position: tok.pos,
                    message: format!("malformed float: '{}'", tok.text),
                }
            }),
            Token::StringLiteral => Ok(Value::Str(unescape(&tok.text))),
            Token::Ident => {
                if matches!(self.peek(), Some(p) if p.token == Token::ParenOpen) {
                    self.advance(); // consume '('
                    let args = self.parse_args()?;
                    Ok(Value::Term(Term::with_args(tok.text, args)))
                } else {
                    Ok(Value::Sym(tok.text))
                }
            }
            Token::BracketOpen => {
                let mut items = Vec::new();
                if matches!(self.peek(), Some(p) if p.token == Token::BracketClose) {
                    self.advance();
                    return Ok(Value::List(items));
                }
                loop {
                    items.push(self.parse_value()?);
                    match self.advance() {
                        Some(t) if t.token == Token::Comma => continue,
                        Some(t) if t.token == Token::BracketClose => break,
                        Some(t) => {
                            return Err(ParseError::UnexpectedToken {
                                position: t.pos,
                                message: format!("expected ',' or ']', got '{}'", t.text),
                            })
                        }
                        None => return Err(ParseError::UnexpectedEof("expected ']'".into())),
                    }
                }
                Ok(Value::List(items))
            }
            Token::BraceOpen => {
                let mut pairs = Vec::new();
                if matches!(self.peek(), Some(p) if p.token == Token::BraceClose) {
                    self.advance();
                    return Ok(Value::Map(pairs));
                }
                loop {
                    let key = self.parse_value()?;
                    self.expect(&Token::Colon)?;
                    let value = self.parse_value()?;
                    pairs.push((key, value));
                    match self.advance() {
                        Some(t) if t.token == Token::Comma => continue,
                        Some(t) if t.token == Token::BraceClose => break,
                        Some(t) => {
                            return Err(ParseError::UnexpectedToken {
                                position: t.pos,
                                message: format!("expected ',' or '}}', got '{}'", t.text),
                            })
                        }
                        None => return Err(ParseError::UnexpectedEof("expected '}'".into())),
                    }
                }
                Ok(Value::Map(pairs))
            }
            other => Err(ParseError::UnexpectedToken {
                position: tok.pos,
                message: format!("expected a value, got {:?} '{}'", other, tok.text),
            }),
        }
    }

    /// Parse a comma-separated argument list up to and including `)`.
    fn parse_args(&mut self) -> Result<Vec<Value>, ParseError> {
        let mut args = Vec::new();

        if matches!(self.peek(), Some(p) if p.token == Token::ParenClose) {
            self.advance();
            return Ok(args);
        }

        loop {
            args.push(self.parse_value()?);
            match self.advance() {
                Some(t) if t.token == Token::Comma => continue,
                Some(t) if t.token == Token::ParenClose => break,
                Some(t) => {
                    return Err(ParseError::UnexpectedToken {
                        position: t.pos,
                        message: format!("expected ',' or ')', got '{}'", t.text),
                    })
                }
                None => return Err(ParseError::UnexpectedEof("expected ')'".into())),
            }
        }

        Ok(args)
    }
}

/// Strip surrounding quotes and resolve backslash escapes.
fn unescape(quoted: &str) -> String {
    let inner = &quoted[1..quoted.len() - 1];
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some(other) => result.push(other), // covers \" and \\
            None => break,
        }
    }

    result
}
