//! Pebble CLI adapter
//!
//! Implements [`Workload`] by running the `pebble` client against the
//! workload container's socket.

use std::ffi::OsString;
use std::path::PathBuf;
use tracing::debug;

use crate::config::Settings;
use crate::error::{OperatorError, Result};
use crate::process::Invocation;
use crate::workload::{Layer, Workload};

/// Pebble client for one container
#[derive(Debug, Clone)]
pub struct PebbleClient {
    binary: PathBuf,
    socket: OsString,
}

impl PebbleClient {
    pub fn new(binary: impl Into<PathBuf>, socket: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            socket: socket.into().into_os_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.pebble.binary.clone(), settings.pebble_socket())
    }

    fn invocation(&self) -> Invocation<'_> {
        Invocation::new(&self.binary).env("PEBBLE_SOCKET", &self.socket)
    }

    fn exec_args(command: &[String]) -> Vec<String> {
        let mut args = vec!["exec".to_string(), "--".to_string()];
        args.extend(command.iter().cloned());
        args
    }
}

impl Workload for PebbleClient {
    fn can_connect(&self) -> bool {
        match self.invocation().arg("plan").output() {
            Ok(output) => output.status.success(),
            Err(e) => {
                debug!("Cannot reach pebble: {}", e);
                false
            }
        }
    }

    fn exists(&self, path: &str) -> Result<bool> {
        let output = self
            .invocation()
            .args(["exec", "--", "test", "-e", path])
            .output()?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(OperatorError::command_failed(
                "pebble",
                &["exec", "--", "test", "-e", path],
                &output.stderr,
            )),
        }
    }

    fn pull(&self, path: &str) -> Result<Option<String>> {
        if !self.exists(path)? {
            return Ok(None);
        }
        let content = self
            .invocation()
            .args(["exec", "--", "cat", path])
            .run()?;
        Ok(Some(content))
    }

    fn push(&self, path: &str, content: &str) -> Result<()> {
        self.invocation()
            .args(["exec", "--", "sh", "-c", r#"cat > "$1""#, "sh", path])
            .stdin(content)
            .run()?;
        Ok(())
    }

    fn exec(&self, command: &[String]) -> Result<String> {
        if command.is_empty() {
            return Err(OperatorError::Workload("empty command".to_string()));
        }
        self.invocation().args(Self::exec_args(command)).run()
    }

    fn plan(&self) -> Result<Layer> {
        let raw = self.invocation().arg("plan").run()?;
        Layer::from_yaml(&raw)
    }

    fn add_layer(&self, label: &str, layer: &Layer) -> Result<()> {
        let yaml = layer.to_yaml()?;
        self.invocation()
            .args(["add", "--combine", label, "/dev/stdin"])
            .stdin(&yaml)
            .run()?;
        Ok(())
    }

    fn replan(&self) -> Result<()> {
        self.invocation().arg("replan").run()?;
        Ok(())
    }

    fn restart(&self, service: &str) -> Result<()> {
        self.invocation().args(["restart", service]).run()?;
        Ok(())
    }
}
