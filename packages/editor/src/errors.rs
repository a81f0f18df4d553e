//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Parse error: {0}")]
    Parse(#[from] sitebuilder_markup::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No field '{0}' in this project")]
    UnknownField(String),

    #[error("Page is read-only")]
    ReadOnly,

    #[error("Field '{eid}' holds {expected} content, got {found}")]
    FieldShape {
        eid: String,
        expected: &'static str,
        found: &'static str,
    },
}
