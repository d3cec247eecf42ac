//! Description of a child process to run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// How the child's stdout is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// stdout goes straight to the terminal.
    #[default]
    Inherit,
    /// stdout is piped and forwarded line by line to a sink.
    Stream,
}

/// A command line plus its working directory and extra environment.
///
/// The extra environment is added on top of the parent's environment for
/// the child only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    #[serde(skip)]
    pub env: BTreeMap<String, String>,
    pub output: OutputMode,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn streaming(mut self, enabled: bool) -> Self {
        self.output = if enabled {
            OutputMode::Stream
        } else {
            OutputMode::Inherit
        };
        self
    }

    /// Shell-like rendering for logs and error messages. Never includes env values.
    pub fn display(&self) -> String {
        format_command(&self.program, &self.args)
    }

    /// Names of the extra environment variables.
    pub fn env_keys(&self) -> Vec<&str> {
        self.env.keys().map(String::as_str).collect()
    }
}

/// Render a command line, single-quoting arguments with whitespace or quotes.
pub fn format_command(program: &str, args: &[String]) -> String {
    let mut cmd = program.to_string();
    for arg in args {
        cmd.push(' ');
        if arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '\'' || c == '"') {
            cmd.push('\'');
            cmd.push_str(&arg.replace('\'', r"'\''"));
            cmd.push('\'');
        } else {
            cmd.push_str(arg);
        }
    }
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let spec = CommandSpec::new("tofu")
            .arg("apply")
            .args(["--var-file", "/tmp/x.tfvars"])
            .current_dir("/work")
            .env("AWS_REGION", "us-east-1")
            .streaming(true);

        assert_eq!(spec.args, vec!["apply", "--var-file", "/tmp/x.tfvars"]);
        assert_eq!(spec.working_dir, Some(PathBuf::from("/work")));
        assert_eq!(spec.output, OutputMode::Stream);
        assert_eq!(spec.env_keys(), vec!["AWS_REGION"]);
    }

    #[test]
    fn test_format_command_quoting() {
        let args = vec![
            "plan".to_string(),
            "--backend-config".to_string(),
            "key=env/prod.tfstate".to_string(),
            "a b".to_string(),
            String::new(),
        ];
        assert_eq!(
            format_command("tofu", &args),
            "tofu plan --backend-config key=env/prod.tfstate 'a b' ''"
        );
    }

    #[test]
    fn test_display_hides_env() {
        let spec = CommandSpec::new("pulumi").arg("up").env("SECRET", "hunter2");
        assert!(!spec.display().contains("hunter2"));
    }
}
