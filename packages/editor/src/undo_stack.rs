//! # Undo/Redo Stack
//!
//! Tracks committed text history for a session.
//!
//! ## Design
//!
//! - Each commit records the text it replaced
//! - Undo hands back the previous text and moves the current one to redo
//! - Redo reverses an undo
//! - New commits clear the redo stack
//!
//! The session restores a returned text through its normal commit path, so
//! an undo is persisted like any other change.

use std::collections::VecDeque;

/// Undo/redo stack of committed document texts
#[derive(Debug)]
pub struct UndoStack {
    /// Texts replaced by commits (most recent at the back)
    undo_stack: VecDeque<String>,

    /// Texts replaced by undos (most recent last)
    redo_stack: Vec<String>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_levels,
        }
    }

    /// Record the text a new commit replaced
    pub fn record(&mut self, previous: String) {
        self.undo_stack.push_back(previous);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.pop_front();
        }

        // A new commit invalidates anything undone
        self.redo_stack.clear();
    }

    /// Step back from `current`. Returns the text to restore.
    pub fn undo(&mut self, current: &str) -> Option<String> {
        let previous = self.undo_stack.pop_back()?;
        self.redo_stack.push(current.to_string());
        Some(previous)
    }

    /// Step forward from `current`. Returns the text to restore.
    pub fn redo(&mut self, current: &str) -> Option<String> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push_back(current.to_string());
        Some(next)
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

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
