use super::{json_argument, report, set_pointer, Env};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct SetArgs {
    /// YAML file to edit
    pub file: String,

    /// JSON pointer of the value to set (`-` appends to a sequence)
    pub pointer: String,

    /// New value as JSON. Text that is not valid JSON is taken as a string.
    pub value: String,
}

pub fn set(args: SetArgs, env: &Env) -> Result<()> {
    let mut session = env.open(&args.file)?;
    let new = json_argument(&args.value);

    let mut failure = None;
    let result = session.commit(|value| {
        let mut value = value.clone();
        if let Err(err) = set_pointer(&mut value, &args.pointer, new) {
            failure = Some(err);
        }
        value
    });

    if let Some(err) = failure {
        return Err(err);
    }
    report(&args.file, &result?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_set_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("api.yaml"), "info:\n  title: Demo   # name\n").unwrap();
        let env = Env {
            cwd: dir.path(),
            config: Config::default(),
        };

        let args = SetArgs {
            file: "api.yaml".to_string(),
            pointer: "/info/version".to_string(),
            value: "1.0".to_string(),
        };
        set(args, &env).unwrap();

        let text = std::fs::read_to_string(dir.path().join("api.yaml")).unwrap();
        assert_eq!(text, "info:\n  title: Demo   # name\n  version: 1.0\n");
    }

    #[test]
    fn test_set_bad_pointer_leaves_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("api.yaml"), "a: 1\n").unwrap();
        let env = Env {
            cwd: dir.path(),
            config: Config::default(),
        };

        let args = SetArgs {
            file: "api.yaml".to_string(),
            pointer: "/missing/key".to_string(),
            value: "1".to_string(),
        };
        assert!(set(args, &env).is_err());
        assert_eq!(std::fs::read_to_string(dir.path().join("api.yaml")).unwrap(), "a: 1\n");
    }
}
