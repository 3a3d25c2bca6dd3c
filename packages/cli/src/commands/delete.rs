use super::{delete_pointer, report, Env};
use anyhow::{anyhow, Result};
use clap::Args;

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// YAML file to edit
    pub file: String,

    /// JSON pointer of the key or sequence item to remove
    pub pointer: String,
}

pub fn delete(args: DeleteArgs, env: &Env) -> Result<()> {
    let mut session = env.open(&args.file)?;

    let old = env.parsed_value(&session)?;
    let mut new = old.clone();
    delete_pointer(&mut new, &args.pointer).map_err(|err| anyhow!("{} in {}", err, args.file))?;

    let result = session.commit_values(&old, &new)?;
    report(&args.file, &result);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_delete_keeps_neighbours() {
        let dir = tempfile::tempdir().unwrap();
        let source = "a: 1  # first\nb: 2\nc: 3  # last\n";
        std::fs::write(dir.path().join("api.yaml"), source).unwrap();
        let env = Env {
            cwd: dir.path(),
            config: Config::default(),
        };

        let args = DeleteArgs {
            file: "api.yaml".to_string(),
            pointer: "/b".to_string(),
        };
        delete(args, &env).unwrap();

        let text = std::fs::read_to_string(dir.path().join("api.yaml")).unwrap();
        assert_eq!(text, "a: 1  # first\nc: 3  # last\n");
    }
}
