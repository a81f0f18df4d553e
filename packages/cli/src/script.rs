//! Parsing of `--select` and `--command` arguments

use sitebuilder_editor::{Align, BlockKind, Command, Mark, Point, Selection};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ScriptError {
    #[error("Invalid selection '{0}', expected BLOCK:START-END or BLOCK:START-BLOCK:END")]
    Selection(String),

    #[error("Unknown command '{0}'")]
    Command(String),

    #[error("{0}")]
    Value(String),
}

/// One editing step from the command line
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Run(Command),
    Undo,
    Redo,
}

impl FromStr for Step {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = match s.split_once('=') {
            Some((name, value)) => (name.trim(), Some(value.trim())),
            None => (s.trim(), None),
        };

        let command = match (name, value) {
            ("undo", None) => return Ok(Step::Undo),
            ("redo", None) => return Ok(Step::Redo),
            ("bold" | "italic" | "underline" | "code", None) => Command::ToggleMark {
                mark: Mark::from_str(name).map_err(ScriptError::Value)?,
            },
            ("color", Some(color)) if !color.is_empty() => Command::ToggleMark {
                mark: Mark::Color(color.to_string()),
            },
            ("h1" | "h2" | "quote" | "paragraph", None) => Command::ToggleBlockType {
                kind: BlockKind::from_str(name).map_err(ScriptError::Value)?,
            },
            ("align", Some(align)) => Command::SetAlignment {
                align: Align::from_str(align).map_err(ScriptError::Value)?,
            },
            ("link", Some(url)) => Command::InsertLink {
                url: url.to_string(),
            },
            ("unlink", None) => Command::RemoveLink,
            _ => return Err(ScriptError::Command(s.to_string())),
        };
        Ok(Step::Run(command))
    }
}

/// `0:4-11` selects chars 4..11 of block 0; `0:4-1:3` spans blocks
pub fn parse_selection(s: &str) -> Result<Selection, ScriptError> {
    let invalid = || ScriptError::Selection(s.to_string());

    let (anchor, focus) = s.split_once('-').ok_or_else(invalid)?;
    let anchor = parse_point(anchor, None).ok_or_else(invalid)?;
    let focus = parse_point(focus, Some(anchor.block)).ok_or_else(invalid)?;
    Ok(Selection::new(anchor, focus))
}

fn parse_point(s: &str, default_block: Option<usize>) -> Option<Point> {
    match (s.split_once(':'), default_block) {
        (Some((block, offset)), _) => Some(Point::new(
            block.trim().parse().ok()?,
            offset.trim().parse().ok()?,
        )),
        (None, Some(block)) => Some(Point::new(block, s.trim().parse().ok()?)),
        (None, None) => None,
    }
}
