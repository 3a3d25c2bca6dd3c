//! Knobs for the patcher and edit sessions

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Formatting decisions the patcher makes for changed nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchPolicy {
    /// Keys whose sequence values are always written one item per line
    /// once they change
    pub block_style_keys: BTreeSet<String>,

    /// New scalar-only sequences with at most this many items are written
    /// in flow style (`[a, b]`). `None` always uses block style.
    pub inline_sequence_limit: Option<usize>,
}

impl PatchPolicy {
    pub fn force_block_style(&self, key: &str) -> bool {
        self.block_style_keys.contains(key)
    }

    pub fn with_block_style_keys<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.block_style_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_inline_sequence_limit(mut self, limit: Option<usize>) -> Self {
        self.inline_sequence_limit = limit;
        self
    }
}

impl Default for PatchPolicy {
    fn default() -> Self {
        Self {
            block_style_keys: BTreeSet::from([String::from("tags")]),
            inline_sequence_limit: None,
        }
    }
}

/// What a session does when storage changed behind its back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConcurrencyPolicy {
    /// Re-read storage before each commit and refuse to overwrite text that
    /// differs from the last loaded or written version
    #[default]
    Detect,
    /// Overwrite whatever storage holds
    LastWriterWins,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub policy: PatchPolicy,
    pub concurrency: ConcurrencyPolicy,
    /// Re-parse every rendered document and compare it with the requested
    /// value before committing
    pub verify: bool,
    /// Maximum undo depth (0 = unlimited)
    pub history_limit: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            policy: PatchPolicy::default(),
            concurrency: ConcurrencyPolicy::Detect,
            verify: true,
            history_limit: 100,
        }
    }
}
