//! Juju hook tools
//!
//! [`UnitModel`] and [`RelationStore`] backed by the hook tools the runtime
//! places on `PATH` (`is-leader`, `config-get`, `relation-get`, ...).

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{HookToolSettings, RawConfig};
use crate::error::{OperatorError, Result};
use crate::operator::{UnitModel, UnitStatus};
use crate::process::Invocation;
use crate::relations::{DataBag, RelationId, RelationStore};

/// Hook-tool client for one unit
#[derive(Debug, Clone)]
pub struct HookTools {
    tools_dir: Option<PathBuf>,
    model_name: String,
    /// `<app>/<number>`
    unit_name: String,
}

impl HookTools {
    pub fn new(
        settings: &HookToolSettings,
        model_name: impl Into<String>,
        unit_name: impl Into<String>,
    ) -> Self {
        Self {
            tools_dir: settings.tools_dir.clone(),
            model_name: model_name.into(),
            unit_name: unit_name.into(),
        }
    }

    fn tool(&self, name: &str) -> PathBuf {
        match &self.tools_dir {
            Some(dir) => dir.join(name),
            None => Path::new(name).to_path_buf(),
        }
    }

    fn run<I, S>(&self, name: &str, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let program = self.tool(name);
        Invocation::new(&program).args(args).run()
    }

    fn remote_app(&self, relation: &RelationId) -> Result<Option<String>> {
        let app = self.run(
            "relation-list",
            ["-r".to_string(), relation.to_string(), "--app".to_string()],
        )?;
        let app = app.trim();
        Ok((!app.is_empty()).then(|| app.to_string()))
    }
}

impl UnitModel for HookTools {
    fn is_leader(&self) -> Result<bool> {
        let raw = self.run("is-leader", ["--format=json"])?;
        Ok(serde_json::from_str(raw.trim())?)
    }

    fn private_address(&self) -> Result<Option<String>> {
        let raw = self.run("unit-get", ["private-address"])?;
        let address = raw.trim();
        Ok((!address.is_empty()).then(|| address.to_string()))
    }

    fn charm_config(&self) -> Result<RawConfig> {
        let raw = self.run("config-get", ["--format=json"])?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn model_name(&self) -> Result<String> {
        Ok(self.model_name.clone())
    }

    fn app_name(&self) -> Result<String> {
        self.unit_name
            .split_once('/')
            .map(|(app, _)| app.to_string())
            .ok_or_else(|| OperatorError::Config(format!("malformed unit name: {}", self.unit_name)))
    }

    fn set_status(&self, status: &UnitStatus) -> Result<()> {
        self.run(
            "status-set",
            [status.kind.as_str().to_string(), status.message.clone()],
        )?;
        Ok(())
    }

    fn set_workload_version(&self, version: &str) -> Result<()> {
        self.run("application-version-set", [version])?;
        Ok(())
    }
}

impl RelationStore for HookTools {
    fn relation_ids(&self, endpoint: &str) -> Result<Vec<RelationId>> {
        let raw = self.run("relation-ids", [endpoint, "--format=json"])?;
        let ids: Vec<String> = serde_json::from_str(raw.trim())?;
        ids.iter().map(|id| id.parse()).collect()
    }

    fn remote_app_data(&self, relation: &RelationId) -> Result<DataBag> {
        let Some(app) = self.remote_app(relation)? else {
            debug!(%relation, "Remote application not known yet");
            return Ok(DataBag::new());
        };
        let raw = self.run(
            "relation-get",
            [
                "--app".to_string(),
                "-r".to_string(),
                relation.to_string(),
                "--format=json".to_string(),
                "-".to_string(),
                app,
            ],
        )?;
        if raw.trim().is_empty() || raw.trim() == "null" {
            return Ok(DataBag::new());
        }
        Ok(serde_json::from_str(raw.trim())?)
    }

    fn update_local_app_data(&self, relation: &RelationId, data: &DataBag) -> Result<()> {
        let mut args = vec!["--app".to_string(), "-r".to_string(), relation.to_string()];
        args.extend(data.iter().map(|(key, value)| format!("{}={}", key, value)));
        self.run("relation-set", args)?;
        Ok(())
    }
}
