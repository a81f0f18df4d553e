//! Tokenizer for the rich-text field encoding using logos
//!
//! The encoding is a small HTML subset, so the token set is tags, entities
//! and text. Bytes that match nothing (a stray `<` or `&`) come back as text.

use logos::Logos;
use std::ops::Range;

#[derive(Logos, Debug, Clone, PartialEq, Eq)]
pub enum Token<'src> {
    #[regex(r"</[a-zA-Z][a-zA-Z0-9]*[ \t\r\n]*>", |lex| lex.slice())]
    CloseTag(&'src str),

    #[regex(r"<[a-zA-Z][a-zA-Z0-9]*[^<>]*>", |lex| lex.slice())]
    OpenTag(&'src str),

    #[regex(r"&[a-zA-Z]+;|&#[0-9]+;|&#[xX][0-9a-fA-F]+;", |lex| lex.slice())]
    Entity(&'src str),

    #[regex(r"[^<&]+", |lex| lex.slice())]
    Text(&'src str),
}

impl<'src> Token<'src> {
    /// Lowercased tag name for open/close tags
    pub fn tag_name(&self) -> Option<String> {
        let body = match self {
            Token::OpenTag(s) => &s[1..],
            Token::CloseTag(s) => &s[2..],
            _ => return None,
        };
        let name: String = body
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect();
        Some(name.to_ascii_lowercase())
    }

    /// `<br/>` style self-closing open tag
    pub fn is_self_closing(&self) -> bool {
        matches!(self, Token::OpenTag(s) if s.trim_end_matches('>').trim_end().ends_with('/'))
    }
}

/// Tokenize a field value into tokens with byte spans
pub fn tokenize(source: &str) -> Vec<(Token<'_>, Range<usize>)> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let token = match result {
            Ok(token) => token,
            Err(_) => Token::Text(lexer.slice()),
        };
        tokens.push((token, span));
    }

    tokens
}
