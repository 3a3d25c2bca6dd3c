mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    apply, check, delete, get, init, set, ApplyArgs, CheckArgs, DeleteArgs, Env, GetArgs, InitArgs, SetArgs,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// yamlpatch - edit YAML documents without losing their formatting
#[derive(Parser, Debug)]
#[command(name = "yamlpatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ./yamlpatch.config.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a yamlpatch.config.json
    Init(InitArgs),

    /// Print a document, or part of it, as JSON
    Get(GetArgs),

    /// Set the value at a JSON pointer
    Set(SetArgs),

    /// Remove the key or item at a JSON pointer
    Delete(DeleteArgs),

    /// Patch a document to match a JSON value
    Apply(ApplyArgs),

    /// Verify documents render back unchanged
    Check(CheckArgs),
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let env = || Env::load(&cwd, cli.config.as_deref());

    match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Get(args) => get(args, &env()?),
        Command::Set(args) => set(args, &env()?),
        Command::Delete(args) => delete(args, &env()?),
        Command::Apply(args) => apply(args, &env()?),
        Command::Check(args) => check(args, &env()?),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
