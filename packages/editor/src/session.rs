//! # Edit Session Management
//!
//! An EditSession is one mounted editable region: its own document,
//! selection tracker, toolbar and history. Sessions never share state, so
//! commands in one region can't reach the content of another.
//!
//! A [`Page`] owns the field bindings and mounts sessions lazily, one per
//! field id.

use crate::bindings::{ButtonValue, FieldBindings, FieldValue};
use crate::commands::Command;
use crate::config::EditorConfig;
use crate::selection::{HostSurface, Selection, SelectionTracker, TrackerUpdate};
use crate::toolbar::{FloatingToolbar, ToolbarEvent, ToolbarResponse};
use crate::undo_stack::{HistoryEntry, Snapshot, UndoStack};
use crate::EditorError;
use sitebuilder_markup::Document;
use std::collections::HashMap;
use tracing::{debug, instrument};

pub struct EditSession {
    /// Field id this region is bound to
    pub eid: String,

    document: Document,
    selection: Selection,
    tracker: SelectionTracker,
    toolbar: FloatingToolbar,
    history: UndoStack,

    /// Rich fields carry structure; plain fields are a single paragraph
    rich: bool,

    /// Edited since the last commit
    dirty: bool,
}

impl EditSession {
    /// Mount a region from its stored field value.
    ///
    /// Rich fields go through the lenient parser, so a malformed value is
    /// edited as plain text rather than refused.
    pub fn mount(eid: impl Into<String>, stored: &str, rich: bool, config: &EditorConfig) -> Self {
        let eid = eid.into();
        let document = if rich {
            Document::from_field_text(stored)
        } else {
            Document::from_plain_text(stored)
        };
        debug!(eid = %eid, rich, blocks = document.blocks.len(), "mounted edit session");

        Self {
            eid,
            document,
            selection: Selection::default(),
            tracker: SelectionTracker::new(config.toolbar),
            toolbar: FloatingToolbar::new(),
            history: UndoStack::with_max_levels(config.history_depth),
            rich,
            dirty: false,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn toolbar(&self) -> &FloatingToolbar {
        &self.toolbar
    }

    pub fn tracker(&self) -> &SelectionTracker {
        &self.tracker
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn is_rich(&self) -> bool {
        self.rich
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Set the selection directly, bypassing the host
    pub fn select(&mut self, selection: Selection) {
        self.selection = selection.clamp(&self.document);
    }

    /// Pull the live selection from the host and update the toolbar
    pub fn sync_selection(&mut self, host: &dyn HostSurface) -> Option<TrackerUpdate> {
        let update = self.tracker.refresh(&self.document, host)?;
        self.selection = update.selection;
        self.toolbar
            .handle(ToolbarEvent::VisibilityChanged(update.visible));
        Some(update)
    }

    /// Route a toolbar event, executing the command it produces
    pub fn handle_toolbar(&mut self, event: ToolbarEvent) -> ToolbarResponse {
        if event == ToolbarEvent::Blur {
            self.tracker.reset();
        }

        let response = self.toolbar.handle(event);
        if let Some(command) = &response.command {
            self.execute(command);
        }
        response
    }

    /// Apply a command to the current selection. Returns whether the
    /// document changed.
    #[instrument(skip(self), fields(eid = %self.eid))]
    pub fn execute(&mut self, command: &Command) -> bool {
        if !self.rich {
            debug!("plain field, formatting ignored");
            return false;
        }

        let outcome = command.apply(&self.document, &self.selection);
        if outcome.changed {
            self.record(outcome.document, outcome.selection, command.to_string());
        } else {
            self.selection = outcome.selection;
        }
        outcome.changed
    }

    /// Replace the whole content, as typing in the host does
    pub fn replace_content(&mut self, stored: &str) -> bool {
        let document = if self.rich {
            Document::from_field_text(stored)
        } else {
            Document::from_plain_text(stored)
        };
        if document == self.document {
            return false;
        }

        let selection = self.selection.clamp(&document);
        self.record(document, selection, "edit text");
        true
    }

    fn record(&mut self, document: Document, selection: Selection, description: impl Into<String>) {
        let before = Snapshot {
            document: std::mem::replace(&mut self.document, document),
            selection: std::mem::replace(&mut self.selection, selection),
        };
        let after = Snapshot {
            document: self.document.clone(),
            selection: self.selection,
        };
        self.history
            .record(HistoryEntry::new(before, after).with_description(description));
        self.dirty = true;
    }

    pub fn undo(&mut self) -> bool {
        self.restore(UndoStack::undo)
    }

    pub fn redo(&mut self) -> bool {
        self.restore(UndoStack::redo)
    }

    fn restore(&mut self, step: fn(&mut UndoStack) -> Option<Snapshot>) -> bool {
        match step(&mut self.history) {
            Some(snapshot) => {
                self.document = snapshot.document;
                self.selection = snapshot.selection;
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Current content in its stored encoding
    pub fn field_value(&self) -> FieldValue {
        let text = if self.rich {
            self.document.to_field_text()
        } else {
            self.document.to_plain_text()
        };
        FieldValue::Text { text }
    }

    /// Push pending edits to the bindings. Returns whether anything was
    /// sent.
    pub fn commit(&mut self, bindings: &mut FieldBindings) -> Result<bool, EditorError> {
        if !self.dirty {
            return Ok(false);
        }

        bindings.on_content_change(&self.eid, self.field_value())?;
        self.dirty = false;
        Ok(true)
    }
}

/// One page of template fields and the regions mounted on it
pub struct Page {
    bindings: FieldBindings,
    config: EditorConfig,
    sessions: HashMap<String, EditSession>,
}

impl Page {
    pub fn new(bindings: FieldBindings, config: EditorConfig) -> Self {
        Self {
            bindings,
            config,
            sessions: HashMap::new(),
        }
    }

    pub fn bindings(&self) -> &FieldBindings {
        &self.bindings
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Session for `eid`, mounted on first use from the stored value or the
    /// template default
    pub fn session(&mut self, eid: &str, fallback: &str) -> &mut EditSession {
        self.sessions.entry(eid.to_string()).or_insert_with(|| {
            let stored = self.bindings.get_text(eid, fallback);
            EditSession::mount(eid, &stored, self.config.is_rich(eid), &self.config)
        })
    }

    pub fn get_session(&self, eid: &str) -> Option<&EditSession> {
        self.sessions.get(eid)
    }

    pub fn mounted(&self) -> impl Iterator<Item = &str> {
        self.sessions.keys().map(String::as_str)
    }

    pub fn commit(&mut self, eid: &str) -> Result<bool, EditorError> {
        let Self {
            bindings, sessions, ..
        } = self;

        match sessions.get_mut(eid) {
            Some(session) => session.commit(bindings),
            None => Ok(false),
        }
    }

    /// Commit every dirty session, returning the ids that were sent
    pub fn commit_all(&mut self) -> Result<Vec<String>, EditorError> {
        let Self {
            bindings, sessions, ..
        } = self;

        let mut committed = Vec::new();
        for (eid, session) in sessions.iter_mut() {
            if session.commit(bindings)? {
                committed.push(eid.clone());
            }
        }
        committed.sort();
        Ok(committed)
    }

    /// Drop a session without committing it
    pub fn unmount(&mut self, eid: &str) -> Option<EditSession> {
        self.sessions.remove(eid)
    }

    /// Image fields bypass sessions: a new picture is one replacement
    pub fn set_image(&mut self, eid: &str, image: &str, link_url: Option<&str>) -> Result<(), EditorError> {
        self.bindings.on_content_change(
            eid,
            FieldValue::Image {
                image: image.to_string(),
                link_url: link_url.map(str::to_string),
            },
        )
    }

    pub fn set_button(&mut self, eid: &str, text: &str, url: &str) -> Result<(), EditorError> {
        self.bindings.on_content_change(
            eid,
            FieldValue::Button {
                button: ButtonValue {
                    text: text.to_string(),
                    url: url.to_string(),
                },
            },
        )
    }
}
