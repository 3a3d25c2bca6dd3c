pub mod apply;
pub mod check;
pub mod delete;
pub mod get;
pub mod init;
pub mod set;

pub use apply::{apply, ApplyArgs};
pub use check::{check, CheckArgs};
pub use delete::{delete, DeleteArgs};
pub use get::{get, GetArgs};
pub use init::{init, InitArgs};
pub use set::{set, SetArgs};

use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use serde_json::Value;
use std::path::Path;
use yamlpatch_common::FileStorage;
use yamlpatch_editor::{CommitResult, EditSession, EditorError};
use yamlpatch_parser::format_error;

/// Shared context for every command
pub struct Env<'a> {
    pub cwd: &'a Path,
    pub config: Config,
}

impl<'a> Env<'a> {
    pub fn load(cwd: &'a Path, config: Option<&Path>) -> Result<Self> {
        Ok(Self {
            config: Config::load(cwd, config)?,
            cwd,
        })
    }

    pub fn open(&self, file: &str) -> Result<EditSession<FileStorage>> {
        EditSession::open(FileStorage::new(self.cwd), file, self.config.session_options())
            .with_context(|| format!("Cannot open {}", file))
    }

    /// Strictly parsed value of an open session, with a rendered report on
    /// parse errors
    pub fn parsed_value(&self, session: &EditSession<FileStorage>) -> Result<Value> {
        session.parsed_value().map_err(|err| match err {
            EditorError::Parse(err) => anyhow!("{}", format_error(session.text(), session.locator(), &err)),
            err => err.into(),
        })
    }
}

/// Read a JSON argument, taking anything that is not valid JSON as a string
pub fn json_argument(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

pub fn report(file: &str, result: &CommitResult) {
    if result.changed {
        println!("  {} {} (version {})", "✓".green(), file, result.version);
    } else {
        println!("  {} {} unchanged", "·".dimmed(), file);
    }
}

fn parse_index(token: &str, len: usize) -> Option<usize> {
    if token.len() > 1 && token.starts_with('0') {
        return None;
    }
    token.parse::<usize>().ok().filter(|idx| *idx < len)
}

/// Split off the last token and look up its container
fn parent_mut<'v>(root: &'v mut Value, pointer: &str) -> Result<(&'v mut Value, String)> {
    let split = pointer
        .rfind('/')
        .ok_or_else(|| anyhow!("Pointer must name a key or index: {:?}", pointer))?;
    let (parent, last) = pointer.split_at(split);
    let last = last[1..].replace("~1", "/").replace("~0", "~");

    let target = root
        .pointer_mut(parent)
        .ok_or_else(|| anyhow!("Nothing at {:?} in {}", parent, pointer))?;
    Ok((target, last))
}

/// Set the value at `pointer`, creating the final key. `-` appends to an array.
pub fn set_pointer(root: &mut Value, pointer: &str, new: Value) -> Result<()> {
    if pointer.is_empty() {
        *root = new;
        return Ok(());
    }

    let (parent, last) = parent_mut(root, pointer)?;
    match parent {
        Value::Object(map) => {
            map.insert(last, new);
            Ok(())
        }
        Value::Array(items) if last == "-" => {
            items.push(new);
            Ok(())
        }
        Value::Array(items) => {
            let len = items.len();
            let slot = parse_index(&last, len)
                .and_then(|idx| items.get_mut(idx))
                .ok_or_else(|| anyhow!("Index {} out of range ({} items) at {}", last, len, pointer))?;
            *slot = new;
            Ok(())
        }
        _ => Err(anyhow!("Cannot set a key on a scalar at {}", pointer)),
    }
}

/// Remove the key or element at `pointer`, returning what was removed
pub fn delete_pointer(root: &mut Value, pointer: &str) -> Result<Value> {
    let (parent, last) = parent_mut(root, pointer)?;
    match parent {
        Value::Object(map) => map
            .shift_remove(&last)
            .ok_or_else(|| anyhow!("No key {:?} at {}", last, pointer)),
        Value::Array(items) => {
            let len = items.len();
            let idx = parse_index(&last, len)
                .ok_or_else(|| anyhow!("Index {} out of range ({} items) at {}", last, len, pointer))?;
            Ok(items.remove(idx))
        }
        _ => Err(anyhow!("Cannot delete from a scalar at {}", pointer)),
    }
}
