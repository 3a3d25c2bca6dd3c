use super::Env;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use yamlpatch_parser::{parse, serialize};

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// YAML files to check
    #[arg(required = true)]
    pub files: Vec<String>,
}

/// Verify that each file parses and renders back byte for byte
pub fn check(args: CheckArgs, env: &Env) -> Result<()> {
    let mut failures = 0;

    for file in &args.files {
        match check_file(file, env) {
            Ok(()) => println!("  {} {}", "✓".green(), file),
            Err(err) => {
                failures += 1;
                eprintln!("  {} {} - {}", "✗".red(), file, err);
            }
        }
    }

    println!();
    if failures == 0 {
        println!("{} Checked {} files", "✅".green(), args.files.len());
        Ok(())
    } else {
        Err(anyhow!("{} of {} files failed", failures, args.files.len()))
    }
}

fn check_file(file: &str, env: &Env) -> Result<()> {
    let session = env.open(file)?;
    // strict parse first so errors come with a report
    env.parsed_value(&session)?;

    let document = parse(session.text())?;
    let rendered = serialize(&document);
    if rendered != session.text() {
        let line = first_difference(session.text(), &rendered);
        return Err(anyhow!("round trip differs at line {}", line));
    }
    Ok(())
}

/// 1-based line of the first differing byte
fn first_difference(left: &str, right: &str) -> usize {
    let offset = left
        .bytes()
        .zip(right.bytes())
        .position(|(a, b)| a != b)
        .unwrap_or_else(|| left.len().min(right.len()));
    left.as_bytes()[..offset].iter().filter(|byte| **byte == b'\n').count() + 1
}
