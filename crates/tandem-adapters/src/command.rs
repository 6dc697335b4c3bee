//! Subprocess execution

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, instrument};

use tandem_core::error::{CommandError, Result};

/// A program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory
    pub cwd: PathBuf,
    /// Environment added to the inherited one
    pub env: BTreeMap<String, String>,
}

impl Invocation {
    /// Invoke `program` in `cwd`
    pub fn new(program: impl Into<String>, cwd: &Path) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.to_path_buf(),
            env: BTreeMap::new(),
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

    /// Pass the environment of the release run
    pub fn envs(mut self, env: &BTreeMap<String, String>) -> Self {
        self.env.extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Program and arguments joined by spaces
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Outcome of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// Exit status description
    pub status: String,
    /// Captured standard output
    pub stdout: String,
}

/// Runs commands on behalf of the collaborators
pub trait CommandRunner {
    /// Run to completion, reporting failure in the output instead of an error
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput>;
}

/// Run `invocation` and fail when it exits unsuccessfully
pub fn run_checked(runner: &dyn CommandRunner, invocation: &Invocation) -> Result<CommandOutput> {
    let output = runner.run(invocation)?;
    if !output.success {
        return Err(CommandError::Failed {
            command: invocation.command_line(),
            status: output.status,
        }
        .into());
    }
    Ok(output)
}

/// Runs commands as child processes; stderr goes to the terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    #[instrument(skip_all, fields(command = %invocation.command_line()))]
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        let spawn_error = |reason: String| CommandError::Spawn {
            command: invocation.command_line(),
            reason,
        };

        let program = which::which(&invocation.program).map_err(|e| spawn_error(e.to_string()))?;
        let output = Command::new(program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .envs(&invocation.env)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| spawn_error(e.to_string()))?;

        debug!(status = %output.status, "command finished");
        Ok(CommandOutput {
            success: output.status.success(),
            status: output.status.to_string(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedRunner;
    use super::*;
    use tandem_core::TandemError;

    #[test]
    fn test_command_line() {
        let invocation = Invocation::new("npm", Path::new("/repo"))
            .arg("whoami")
            .args(["--registry", "https://registry.npmjs.org/"]);
        assert_eq!(
            invocation.command_line(),
            "npm whoami --registry https://registry.npmjs.org/"
        );
    }

    #[test]
    fn test_run_checked_fails_fast() {
        let runner = ScriptedRunner::default().respond("npm whoami", false, "");
        let invocation = Invocation::new("npm", Path::new("/repo")).arg("whoami");

        let err = run_checked(&runner, &invocation).unwrap_err();
        assert!(matches!(
            err,
            TandemError::Command(CommandError::Failed { ref command, .. }) if command == "npm whoami"
        ));
    }

    #[test]
    fn test_missing_program() {
        let invocation = Invocation::new("tandem-no-such-program", Path::new("."));
        let err = SystemRunner.run(&invocation).unwrap_err();
        assert!(matches!(err, TandemError::Command(CommandError::Spawn { .. })));
    }
}
