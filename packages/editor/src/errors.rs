//! Error types for the editor

use thiserror::Error;
use yamlpatch_common::StorageError;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Parse error: {0}")]
    Parse(#[from] yamlpatch_parser::ParseError),

    #[error("Baseline value does not match the committed document")]
    StaleBaseline,

    #[error("Patched document does not encode the requested value: {0}")]
    PatchDivergence(String),

    #[error("'{locator}' was modified outside this session")]
    ExternalModification { locator: String },

    /// The commit is applied in memory but could not be written
    #[error("Failed to persist document: {0}")]
    Persistence(#[source] StorageError),

    #[error("Storage error: {0}")]
    Storage(#[source] StorageError),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,
}
