//! # Edit Session Management
//!
//! An EditSession owns one document in a text storage and turns value-level
//! edits into minimal text edits.
//!
//! ## Commit protocol
//!
//! ```text
//! check storage ─▶ parse (cached) ─▶ transform ─▶ patch ─▶ render ─▶ verify
//!                                                                   │
//!                        persist ◀─ install text, bump version ◀────┘
//! ```
//!
//! The new text is installed in memory before it is written. A failed write
//! is reported as [`EditorError::Persistence`] and is not rolled back; the
//! next successful commit writes the latest text.

use crate::document::{fingerprint, parse_text, ParseCache, ParsedDocument};
use crate::patch::{PatchOutcome, Patcher};
use crate::policy::{ConcurrencyPolicy, SessionOptions};
use crate::undo_stack::UndoStack;
use crate::EditorError;
use tracing::{debug, error, info, warn};
use yamlpatch_common::{load, store, TextStorage};
use yamlpatch_parser::{serialize, values_equal, Document, Value};

/// Outcome of a successful commit, undo or redo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitResult {
    /// Session version after the operation
    pub version: u64,
    /// Committed text after the operation
    pub text: String,
    /// False when the text did not change and nothing was written
    pub changed: bool,
}

/// Editing session for a single document
pub struct EditSession<S: TextStorage> {
    storage: S,
    locator: String,

    /// Committed text
    text: String,

    /// Fingerprint of what storage is known to hold
    stored_fingerprint: u32,

    cache: ParseCache,
    options: SessionOptions,

    /// Increments on every commit, undo and redo that changes the text
    version: u64,

    history: UndoStack,
}

impl<S: TextStorage> EditSession<S> {
    /// Open the document at `locator`. A missing document starts empty.
    pub fn open(storage: S, locator: impl Into<String>, options: SessionOptions) -> Result<Self, EditorError> {
        let locator = locator.into();
        let text = load(&storage, &locator).map_err(EditorError::Storage)?.unwrap_or_default();
        info!(locator = %locator, bytes = text.len(), "opened document");

        Ok(Self {
            stored_fingerprint: fingerprint(&text),
            history: UndoStack::with_max_levels(options.history_limit),
            storage,
            locator,
            text,
            cache: ParseCache::new(),
            options,
            version: 0,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Value of the committed text. Malformed text reads as an empty mapping.
    pub fn current_value(&mut self) -> Value {
        self.cache.get(&self.text).value.clone()
    }

    /// Value of the committed text, surfacing parse errors instead of
    /// falling back
    pub fn parsed_value(&self) -> Result<Value, EditorError> {
        Ok(parse_text(&self.text)?.to_value())
    }

    /// Apply `transform` to the current value and commit the result
    pub fn commit<F>(&mut self, transform: F) -> Result<CommitResult, EditorError>
    where
        F: FnOnce(&Value) -> Value,
    {
        self.check_storage()?;

        let parsed = self.cache.get(&self.text);
        if parsed.fallback {
            warn!(locator = %self.locator, "committing over a document that does not parse");
        }
        let document = parsed.document.clone();
        let old = parsed.value.clone();

        let new = transform(&old);
        self.apply(document, &old, &new)
    }

    /// Commit `new` against a baseline the caller remembers.
    ///
    /// With verification on, a baseline that no longer matches the committed
    /// text is rejected with [`EditorError::StaleBaseline`].
    pub fn commit_values(&mut self, old: &Value, new: &Value) -> Result<CommitResult, EditorError> {
        self.check_storage()?;

        let parsed = self.cache.get(&self.text);
        if self.options.verify && !values_equal(&parsed.value, old) {
            warn!(locator = %self.locator, "baseline does not match the committed document");
            return Err(EditorError::StaleBaseline);
        }
        let document = parsed.document.clone();

        self.apply(document, old, new)
    }

    /// Restore the text before the last commit
    pub fn undo(&mut self) -> Result<CommitResult, EditorError> {
        self.check_storage()?;
        let previous = self.history.undo(&self.text).ok_or(EditorError::NothingToUndo)?;
        debug!(locator = %self.locator, "undo");
        self.install(previous, None)
    }

    /// Reapply the last undone commit
    pub fn redo(&mut self) -> Result<CommitResult, EditorError> {
        self.check_storage()?;
        let next = self.history.redo(&self.text).ok_or(EditorError::NothingToRedo)?;
        debug!(locator = %self.locator, "redo");
        self.install(next, None)
    }

    /// Drop local state and read the document from storage again
    pub fn reload(&mut self) -> Result<(), EditorError> {
        let text = load(&self.storage, &self.locator)
            .map_err(EditorError::Storage)?
            .unwrap_or_default();
        info!(locator = %self.locator, "reloaded document");

        self.stored_fingerprint = fingerprint(&text);
        self.text = text;
        self.cache.clear();
        self.history.clear();
        Ok(())
    }

    fn check_storage(&self) -> Result<(), EditorError> {
        if self.options.concurrency == ConcurrencyPolicy::LastWriterWins {
            return Ok(());
        }

        let stored = load(&self.storage, &self.locator)
            .map_err(EditorError::Storage)?
            .unwrap_or_default();
        if fingerprint(&stored) != self.stored_fingerprint {
            warn!(locator = %self.locator, "document changed in storage since it was loaded");
            return Err(EditorError::ExternalModification {
                locator: self.locator.clone(),
            });
        }
        Ok(())
    }

    fn apply(&mut self, mut document: Document, old: &Value, new: &Value) -> Result<CommitResult, EditorError> {
        let outcome = Patcher::new(&self.options.policy).patch_document(&mut document, old, new);
        if outcome == PatchOutcome::Unchanged {
            debug!(locator = %self.locator, "value unchanged, nothing to commit");
            return Ok(self.unchanged());
        }

        let text = serialize(&document);

        let reparsed = if self.options.verify {
            let reparsed = parse_text(&text)
                .map_err(|err| EditorError::PatchDivergence(format!("rendered text does not parse: {}", err)))?;
            let parsed = ParsedDocument::new(reparsed);
            if !values_equal(&parsed.value, new) {
                error!(locator = %self.locator, "rendered text does not decode to the requested value");
                return Err(EditorError::PatchDivergence(format!(
                    "expected {}, decoded {}",
                    new, parsed.value
                )));
            }
            Some(parsed)
        } else {
            None
        };

        if text == self.text {
            debug!(locator = %self.locator, "rendered text unchanged, skipping write");
            return Ok(self.unchanged());
        }

        self.history.record(std::mem::take(&mut self.text));
        self.install(text, reparsed)
    }

    /// Make `text` the committed text, then persist it
    fn install(&mut self, text: String, parsed: Option<ParsedDocument>) -> Result<CommitResult, EditorError> {
        self.text = text;
        self.version += 1;
        match parsed {
            Some(parsed) => self.cache.insert(&self.text, parsed),
            None => self.cache.clear(),
        }
        info!(locator = %self.locator, version = self.version, bytes = self.text.len(), "committed document");

        if let Err(err) = store(&self.storage, &self.locator, &self.text) {
            error!(locator = %self.locator, error = %err, "failed to persist document");
            return Err(EditorError::Persistence(err));
        }
        self.stored_fingerprint = fingerprint(&self.text);

        Ok(CommitResult {
            version: self.version,
            text: self.text.clone(),
            changed: true,
        })
    }

    fn unchanged(&self) -> CommitResult {
        CommitResult {
            version: self.version,
            text: self.text.clone(),
            changed: false,
        }
    }
}
