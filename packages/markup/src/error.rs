use std::ops::Range;
use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unexpected {found} at {pos}: {message}")]
    UnexpectedToken {
        pos: usize,
        found: String,
        message: String,
    },

    #[error("Unclosed <{tag}> opened at {pos}")]
    UnclosedTag { pos: usize, tag: String },

    #[error("Mismatched closing tag at {pos}: expected </{expected}>, found </{found}>")]
    MismatchedTag {
        pos: usize,
        expected: String,
        found: String,
    },

    #[error("Nested link at {pos}: links cannot contain other links")]
    NestedLink { pos: usize },

    #[error("Invalid attribute at {pos}: {message}")]
    InvalidAttribute { pos: usize, message: String },
}

impl ParseError {
    pub fn unexpected_token(pos: usize, found: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnexpectedToken {
            pos,
            found: found.into(),
            message: message.into(),
        }
    }

    pub fn invalid_attribute(pos: usize, message: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            pos,
            message: message.into(),
        }
    }

    /// Byte offset the error points at
    pub fn pos(&self) -> usize {
        match self {
            ParseError::UnexpectedToken { pos, .. }
            | ParseError::UnclosedTag { pos, .. }
            | ParseError::MismatchedTag { pos, .. }
            | ParseError::NestedLink { pos }
            | ParseError::InvalidAttribute { pos, .. } => *pos,
        }
    }

    /// Short label for the offending span
    pub fn label(&self) -> String {
        match self {
            ParseError::UnexpectedToken { message, .. } => message.clone(),
            ParseError::UnclosedTag { tag, .. } => format!("<{}> is never closed", tag),
            ParseError::MismatchedTag { expected, .. } => format!("expected </{}>", expected),
            ParseError::NestedLink { .. } => "link opened inside another link".to_string(),
            ParseError::InvalidAttribute { message, .. } => message.clone(),
        }
    }

    /// Span used when rendering the error against its source
    pub fn span(&self, source: &str) -> Range<usize> {
        let start = self.pos().min(source.len());
        let end = source[start..]
            .find('>')
            .map(|i| start + i + 1)
            .unwrap_or(source.len())
            .max(start);
        start..end
    }
}

/// Pretty-print an error with source context using ariadne
#[cfg(feature = "pretty-errors")]
pub fn format_error(source: &str, filename: &str, error: &ParseError) -> String {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let span = error.span(source);
    let mut output = Vec::new();

    let report = Report::build(ReportKind::Error, filename, span.start)
        .with_message(error.to_string())
        .with_label(
            Label::new((filename, span))
                .with_color(Color::Red)
                .with_message(error.label()),
        )
        .finish();

    if report
        .write((filename, Source::from(source)), &mut output)
        .is_err()
    {
        return error.to_string();
    }

    String::from_utf8_lossy(&output).into_owned()
}
