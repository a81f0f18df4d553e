//! # Sitebuilder Editor
//!
//! Inline rich-text editing for template fields.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ bindings: eid → stored field value          │
//! └─────────────────────────────────────────────┘
//!                     ↓ mount (markup parse)
//! ┌─────────────────────────────────────────────┐
//! │ session: one editable region                │
//! │  - selection tracker (host geometry)        │
//! │  - floating toolbar state machine           │
//! │  - commands over (document, selection)      │
//! │  - snapshot undo/redo                       │
//! └─────────────────────────────────────────────┘
//!                     ↓ commit (markup serialize)
//! ┌─────────────────────────────────────────────┐
//! │ bindings: on_content_change → sink          │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sitebuilder_editor::{Command, EditorConfig, FieldBindings, Page, Selection};
//! use sitebuilder_markup::Mark;
//!
//! let bindings = FieldBindings::from_json(&project_json, true)?
//!     .with_sink(|eid: &str, value: &FieldValue| save(eid, value));
//! let mut page = Page::new(bindings, EditorConfig::load(".")?);
//!
//! let session = page.session("hero.title", "Welcome");
//! session.select(Selection::within(0, 0, 7));
//! session.execute(&Command::ToggleMark { mark: Mark::Bold });
//!
//! page.commit("hero.title")?;
//! ```

mod bindings;
mod commands;
mod config;
mod errors;
mod selection;
mod session;
mod toolbar;
mod undo_stack;

pub use bindings::{ButtonData, ButtonValue, ContentSink, FieldBindings, FieldData, FieldValue};
pub use commands::{
    active_link, insert_link, is_block_active, is_mark_active, remove_link, set_alignment,
    toggle_block_type, toggle_mark, Command, CommandOutcome,
};
pub use config::{EditorConfig, ToolbarMetrics, CONFIG_FILE_NAME};
pub use errors::EditorError;
pub use selection::{
    place_toolbar, HostSurface, Placement, Point, RangeOffsets, Rect, Selection,
    SelectionTracker, StaticHost, ToolbarPosition, TrackerUpdate,
};
pub use session::{EditSession, Page};
pub use toolbar::{FloatingToolbar, LinkInput, ToolbarButton, ToolbarEvent, ToolbarResponse, ToolbarState};
pub use undo_stack::{HistoryEntry, Snapshot, UndoStack};

// Re-export the document model
pub use sitebuilder_markup::{Align, Block, BlockKind, Document, Inline, Link, Mark, Marks, TextRun};
