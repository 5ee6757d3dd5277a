//! Invocations of the external `pkl` command-line tool.

use std::process::{Command, Output, Stdio};
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::{GenError, GenResult};
use crate::metadata::SkipReason;
use crate::process::{ProcessOutcome, run_with_timeout};

/// Handle on the `pkl` executable, run from a fixed working directory.
#[derive(Debug, Clone)]
pub struct PklTool {
    program: String,
    working_dir: Utf8PathBuf,
    timeout: Duration,
}

impl PklTool {
    /// Creates a tool handle.
    ///
    /// `timeout` bounds reflection calls only; formatting runs to completion.
    #[must_use]
    pub fn new(
        program: impl Into<String>,
        working_dir: impl Into<Utf8PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            working_dir: working_dir.into(),
            timeout,
        }
    }

    /// Rewrites `path` in place with `pkl format --write`.
    ///
    /// The formatter exits non-zero even after formatting successfully, so the
    /// captured output is returned for logging and never treated as a failure.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Spawn`] when the tool cannot be started.
    pub fn format_in_place(&self, path: &Utf8Path) -> GenResult<Output> {
        self.command()
            .arg("format")
            .arg("--write")
            .arg(path.as_str())
            .stdin(Stdio::null())
            .output()
            .map_err(|source| GenError::Spawn {
                program: self.program.clone(),
                source,
            })
    }

    /// Evaluates `expression` against the module at `path` and returns the
    /// JSON it renders.
    ///
    /// # Errors
    ///
    /// Every failure is reported as a [`SkipReason`]: the caller drops the
    /// fragment and carries on.
    pub fn reflect(&self, path: &Utf8Path, expression: &str) -> Result<String, SkipReason> {
        let mut command = self.command();
        command
            .arg("eval")
            .arg(path.as_str())
            .arg("--format")
            .arg("json")
            .arg("-x")
            .arg(expression);

        let output = match run_with_timeout(&mut command, self.timeout) {
            Ok(ProcessOutcome::Exited(output)) => output,
            Ok(ProcessOutcome::TimedOut) => return Err(SkipReason::Timeout(self.timeout)),
            Err(err) => return Err(SkipReason::Spawn(err.to_string())),
        };

        if !output.status.success() {
            return Err(SkipReason::NonZeroExit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| SkipReason::InvalidUtf8)
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        if !self.working_dir.as_str().is_empty() {
            command.current_dir(self.working_dir.as_std_path());
        }
        command
    }
}

/// Pkl expression that renders the evaluated module through the reflection
/// script at `script_uri`.
#[must_use]
pub fn reflection_expression(script_uri: &str) -> String {
    format!("import(\"{script_uri}\").render(module)")
}
