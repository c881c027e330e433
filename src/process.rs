//! External command execution shared by the hook-tool and Pebble adapters

use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tracing::trace;

use crate::error::{OperatorError, Result};

/// A command to run to completion
pub(crate) struct Invocation<'a> {
    program: &'a Path,
    args: Vec<String>,
    envs: Vec<(&'a str, &'a OsStr)>,
    stdin: Option<&'a str>,
}

impl<'a> Invocation<'a> {
    pub(crate) fn new(program: &'a Path) -> Self {
        Self {
            program,
            args: Vec::new(),
            envs: Vec::new(),
            stdin: None,
        }
    }

    pub(crate) fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub(crate) fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub(crate) fn env(mut self, key: &'a str, value: &'a OsStr) -> Self {
        self.envs.push((key, value));
        self
    }

    pub(crate) fn stdin(mut self, input: &'a str) -> Self {
        self.stdin = Some(input);
        self
    }

    /// Run and return the raw output, whatever the exit status
    pub(crate) fn output(&self) -> Result<Output> {
        trace!(program = %self.program.display(), args = ?self.args, "Running command");

        let mut command = Command::new(self.program);
        command
            .args(&self.args)
            .envs(self.envs.iter().copied())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let Some(input) = self.stdin else {
            return Ok(command.stdin(Stdio::null()).output()?);
        };

        let mut child = command.stdin(Stdio::piped()).spawn()?;
        if let Some(mut pipe) = child.stdin.take() {
            pipe.write_all(input.as_bytes())?;
        }
        Ok(child.wait_with_output()?)
    }

    /// Run and return standard output; a non-zero exit is an error
    pub(crate) fn run(&self) -> Result<String> {
        let output = self.output()?;
        if !output.status.success() {
            return Err(OperatorError::command_failed(
                &self.program.display().to_string(),
                &self.args,
                &output.stderr,
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
