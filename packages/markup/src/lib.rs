//! # Sitebuilder Markup
//!
//! Document model for rich-text editable regions and the string encoding
//! those regions are stored as.
//!
//! ```text
//! field value ──tokenize──▶ tokens ──parse──▶ Document ──serialize──▶ field value
//! ```
//!
//! A Document lives only for one edit session: it is built from the field's
//! stored string when a region mounts and flattened back when the session
//! commits.

pub mod ast;
pub mod error;
pub mod parser;
pub mod serializer;
pub mod tokenizer;

pub use ast::{Align, Block, BlockKind, Document, Inline, Link, Mark, Marks, TextRun};
pub use error::{ParseError, ParseResult};
pub use parser::{parse, parse_or_plain, Parser};
pub use serializer::{escape_html, serialize, Serializer};
pub use tokenizer::{tokenize, Token};

#[cfg(feature = "pretty-errors")]
pub use error::format_error;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenizer_basic() {
        let tokens = tokenize("<p>Hello</p>");
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_field_text_round_trip() {
        let doc = Document::from_field_text("<p><u>Sale</u> ends soon</p>");
        assert_eq!(doc.to_field_text(), "<p><u>Sale</u> ends soon</p>");
    }
}
