use super::Env;
use anyhow::{anyhow, Result};
use clap::Args;

#[derive(Debug, Args)]
pub struct GetArgs {
    /// YAML file to read
    pub file: String,

    /// JSON pointer selecting part of the document
    #[arg(short, long, default_value = "")]
    pub pointer: String,

    /// Print compact JSON on one line
    #[arg(long)]
    pub compact: bool,
}

pub fn get(args: GetArgs, env: &Env) -> Result<()> {
    let session = env.open(&args.file)?;
    let value = env.parsed_value(&session)?;

    let selected = value
        .pointer(&args.pointer)
        .ok_or_else(|| anyhow!("Nothing at {} in {}", args.pointer, args.file))?;

    let output = if args.compact {
        serde_json::to_string(selected)?
    } else {
        serde_json::to_string_pretty(selected)?
    };
    println!("{}", output);
    Ok(())
}
