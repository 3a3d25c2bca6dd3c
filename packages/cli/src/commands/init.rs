use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::Path;
use yamlpatch_editor::ConcurrencyPolicy;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Keys whose sequences are always written one item per line
    #[arg(long, value_delimiter = ',', default_value = "tags")]
    pub block_style_keys: Vec<String>,

    /// Overwrite storage even if it changed since it was read
    #[arg(long)]
    pub last_writer_wins: bool,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = Config::path(cwd);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let config = Config {
        block_style_keys: args.block_style_keys,
        concurrency: if args.last_writer_wins {
            ConcurrencyPolicy::LastWriterWins
        } else {
            ConcurrencyPolicy::Detect
        },
        ..Config::default()
    };

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json + "\n")?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        let args = InitArgs {
            block_style_keys: vec!["tags".to_string(), "required".to_string()],
            last_writer_wins: true,
            force: false,
        };
        init(args, dir.path()).unwrap();

        let config = Config::load(dir.path(), None).unwrap();
        assert_eq!(config.block_style_keys, vec!["tags", "required"]);
        assert_eq!(config.concurrency, ConcurrencyPolicy::LastWriterWins);
    }
}
