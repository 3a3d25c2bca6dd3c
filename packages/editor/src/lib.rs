//! # yamlpatch editor
//!
//! Format-preserving edits of YAML documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: YAML text ⇄ span-annotated Document │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document lifecycle + patching       │
//! │  - Patcher: old/new values → span edits     │
//! │  - EditSession: parse cache, verification,  │
//! │    undo/redo, conflict detection            │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ common: TextStorage (files, memory)         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Values are the interface**: callers edit plain data, never text
//! 2. **Untouched means byte-identical**: only changed nodes are re-rendered
//! 3. **Memory first**: a commit is installed before it is persisted
//!
//! ## Usage
//!
//! ```rust,ignore
//! use yamlpatch_common::FileStorage;
//! use yamlpatch_editor::{EditSession, SessionOptions};
//!
//! let mut session = EditSession::open(FileStorage::current_dir(), "openapi.yaml", SessionOptions::default())?;
//!
//! session.commit(|value| {
//!     let mut value = value.clone();
//!     value["info"]["version"] = "2.0".into();
//!     value
//! })?;
//! ```

mod document;
mod errors;
mod patch;
mod policy;
mod render;
mod session;
mod undo_stack;

pub use document::{fingerprint, parse_text, ParseCache, ParsedDocument};
pub use errors::EditorError;
pub use patch::{PatchOutcome, Patcher};
pub use policy::{ConcurrencyPolicy, PatchPolicy, SessionOptions};
pub use session::{CommitResult, EditSession};
pub use undo_stack::UndoStack;

// Re-export common types for convenience
pub use yamlpatch_parser::{Document, Value};
