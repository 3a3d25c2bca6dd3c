use super::{report, Env};
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// YAML file to edit
    pub file: String,

    /// JSON file holding the complete new document value
    pub value: PathBuf,
}

/// Patch the whole document so it decodes to the given value
pub fn apply(args: ApplyArgs, env: &Env) -> Result<()> {
    let path = env.cwd.join(&args.value);
    let content = std::fs::read_to_string(&path).with_context(|| format!("Cannot read {}", path.display()))?;
    let new: serde_json::Value =
        serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))?;

    let mut session = env.open(&args.file)?;
    let result = session.commit(|_| new)?;
    report(&args.file, &result);
    Ok(())
}
