//! logos-based tokenizer for the textual term grammar.
//!
//! Token priority in logos is determined by:
//! 1. Longest match wins (`nilpotent` lexes as an identifier, not `nil` + rest)
//! 2. Explicit `#[token]` keywords beat the identifier regex at equal length
//!
//! Floats are defined before integers so `1.5` matches [`Token::Float`]
//! rather than `Int` + junk.

use logos::Logos;

/// Term-grammar token produced by the lexer.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum Token {
    // ── Keywords ─────────────────────────────────────────────────────

    #[token("nil")]
    Nil,

    #[token("true")]
    True,

    #[token("false")]
    False,

    // ── Literals ─────────────────────────────────────────────────────

    /// Float literal with a mandatory decimal point: `1.5`, `-0.25`.
    #[regex(r"-?[0-9]+\.[0-9]+")]
    Float,

    /// Integer literal, possibly negative.
    #[regex(r"-?[0-9]+")]
    Int,

    /// Double-quoted string literal with backslash escapes.
    #[regex(r#""([^"\\]|\\.)*""#)]
    StringLiteral,

    /// Identifier: a bare symbol, or a term name when followed by `(`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    // ── Punctuation ──────────────────────────────────────────────────

    #[token("(")]
    ParenOpen,

    #[token(")")]
    ParenClose,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    #[token("{")]
    BraceOpen,

    #[token("}")]
    BraceClose,

    #[token(",")]
    Comma,

    #[token(":")]
    Colon,
}

/// Tokenize input into `(Token, text)` pairs. Unlexable input is skipped.
pub fn tokenize(input: &str) -> Vec<(Token, String)> {
    let lexer = Token::lexer(input);
    lexer
        .spanned()
        .filter_map(|(result, span)| {
            result.ok().map(|token| (token, input[span].to_string()))
        })
        .collect()
}
