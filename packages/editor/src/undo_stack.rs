//! # Undo/Redo Stack
//!
//! Session history as whole-document snapshots. Documents for a single
//! editable region are small, so each entry keeps the state before and
//! after a command instead of computing inverses.
//!
//! - Undo restores `before` and moves the entry to the redo stack
//! - Redo restores `after`
//! - A new entry clears the redo stack

use crate::selection::Selection;
use sitebuilder_markup::Document;

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub document: Document,
    pub selection: Selection,
}

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub before: Snapshot,
    pub after: Snapshot,
    pub description: Option<String>,
}

impl HistoryEntry {
    pub fn new(before: Snapshot, after: Snapshot) -> Self {
        Self {
            before,
            after,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug)]
pub struct UndoStack {
    /// Most recent last
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    /// 0 = unlimited
    max_levels: usize,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
        }
    }

    pub fn record(&mut self, entry: HistoryEntry) {
        self.undo_stack.push(entry);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        self.redo_stack.clear();
    }

    /// Snapshot to restore, if anything can be undone
    pub fn undo(&mut self) -> Option<Snapshot> {
        let entry = self.undo_stack.pop()?;
        let snapshot = entry.before.clone();
        self.redo_stack.push(entry);
        Some(snapshot)
    }

    pub fn redo(&mut self) -> Option<Snapshot> {
        let entry = self.redo_stack.pop()?;
        let snapshot = entry.after.clone();
        self.undo_stack.push(entry);
        Some(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(text: &str) -> Snapshot {
        Snapshot {
            document: Document::from_plain_text(text),
            selection: Selection::default(),
        }
    }

    fn entry(from: &str, to: &str) -> HistoryEntry {
        HistoryEntry::new(snapshot(from), snapshot(to))
    }

    #[test]
    fn test_undo_stack_creation() {
        let stack = UndoStack::new();
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 0);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_record_undo_redo() {
        let mut stack = UndoStack::new();
        stack.record(entry("a", "b").with_description("toggle bold"));
        assert_eq!(stack.undo_description(), Some("toggle bold"));

        assert_eq!(stack.undo(), Some(snapshot("a")));
        assert_eq!(stack.redo_levels(), 1);
        assert_eq!(stack.redo_description(), Some("toggle bold"));

        assert_eq!(stack.redo(), Some(snapshot("b")));
        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_empty_stack_returns_none() {
        let mut stack = UndoStack::new();
        assert!(stack.undo().is_none());
        assert!(stack.redo().is_none());
    }

    #[test]
    fn test_new_entry_clears_redo() {
        let mut stack = UndoStack::new();
        stack.record(entry("a", "b"));
        stack.undo();
        assert_eq!(stack.redo_levels(), 1);

        stack.record(entry("a", "c"));
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut stack = UndoStack::with_max_levels(2);
        for i in 0..3 {
            stack.record(entry(&i.to_string(), &(i + 1).to_string()));
        }

        assert_eq!(stack.undo_levels(), 2);
        assert_eq!(stack.undo(), Some(snapshot("2")));
        assert_eq!(stack.undo(), Some(snapshot("1")));
        assert!(stack.undo().is_none());
    }
}
