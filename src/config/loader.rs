use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Runtime settings of the operator process itself.
///
/// These are not charm options: they describe where the workload lives and
/// how to reach the collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub workload: WorkloadSettings,
    pub pebble: PebbleSettings,
    pub hook_tools: HookToolSettings,
    pub kubernetes: KubernetesSettings,
    pub logging: LoggingSettings,
}

/// Workload container layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadSettings {
    /// Container name (also the Pebble layer label)
    pub container_name: String,
    /// Supervised service name
    pub service_name: String,
    /// Directory backed by the config storage mount
    pub config_dir: String,
    /// Rendered config file name inside `config_dir`
    pub config_file_name: String,
    /// File carrying the workload version
    pub workload_version_path: String,
    /// CU binary started by the supervisor
    pub softmodem_path: String,
}

impl WorkloadSettings {
    /// Absolute path of the rendered config file
    pub fn config_path(&self) -> String {
        format!(
            "{}/{}",
            self.config_dir.trim_end_matches('/'),
            self.config_file_name
        )
    }
}

/// Pebble CLI access
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PebbleSettings {
    pub binary: PathBuf,
    /// Socket override; defaults to `/charm/containers/<container>/pebble.socket`
    pub socket: Option<PathBuf>,
}

/// Juju hook tools
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HookToolSettings {
    /// Directory holding the hook tools; `PATH` lookup when unset
    pub tools_dir: Option<PathBuf>,
}

/// Kubernetes object names
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KubernetesSettings {
    /// Namespace override; defaults to the model name
    pub namespace: Option<String>,
    /// StatefulSet override; defaults to the application name
    pub statefulset_name: Option<String>,
}

/// Logging options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of the human format
    pub json: bool,
    /// Also write a daily rolling file into this directory
    pub log_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workload: WorkloadSettings::default(),
            pebble: PebbleSettings::default(),
            hook_tools: HookToolSettings::default(),
            kubernetes: KubernetesSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for WorkloadSettings {
    fn default() -> Self {
        Self {
            container_name: "cu".to_string(),
            service_name: "cu".to_string(),
            config_dir: "/tmp/conf".to_string(),
            config_file_name: "cu.conf".to_string(),
            workload_version_path: "/etc/workload-version".to_string(),
            softmodem_path: "/opt/oai-gnb/bin/nr-softmodem".to_string(),
        }
    }
}

impl Default for PebbleSettings {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("/charm/bin/pebble"),
            socket: None,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            log_dir: None,
        }
    }
}

impl Settings {
    /// Pebble socket of the workload container
    pub fn pebble_socket(&self) -> PathBuf {
        self.pebble.socket.clone().unwrap_or_else(|| {
            PathBuf::from(format!(
                "/charm/containers/{}/pebble.socket",
                self.workload.container_name
            ))
        })
    }

    /// サンプル設定ファイルを生成
    pub fn sample_toml() -> Result<String> {
        let body = toml::to_string_pretty(&Settings::default())
            .context("Failed to serialize default settings")?;
        Ok(format!(
            "# ran-cu-operator settings\n\
             #\n\
             # Every key can be overridden from the environment, e.g.\n\
             # RAN_CU_WORKLOAD__CONFIG_DIR=/tmp/conf\n\n{}",
            body
        ))
    }
}

/// Configuration loader with builder pattern
pub struct ConfigLoader {
    config_file: Option<String>,
    load_env: bool,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            config_file: None,
            load_env: false,
        }
    }

    /// Load configuration from file
    pub fn load_from_file(mut self, path: Option<&str>) -> Self {
        self.config_file = path.map(String::from);
        self
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Result<Settings> {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);

        if let Some(config_path) = &self.config_file {
            builder = builder.add_source(File::with_name(config_path).required(true));
        } else {
            builder = builder
                .add_source(File::with_name("ran-cu-operator").required(false))
                .add_source(File::with_name("/etc/ran-cu-operator/settings").required(false));
        }

        if self.load_env {
            builder = builder.add_source(
                Environment::with_prefix("RAN_CU")
                    .prefix_separator("_")
                    .separator("__"),
            );
        }

        let settings: Settings = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Ok(settings)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
