//! Pebble layer types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::WorkloadSettings;
use crate::error::Result;

/// A Pebble layer (also the shape of `pebble plan` output)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub services: BTreeMap<String, Service>,
}

/// One supervised service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Service {
    #[serde(rename = "override", skip_serializing_if = "Option::is_none")]
    pub override_: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startup: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
}

impl Layer {
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(raw)?)
    }

    /// Whether `plan` already runs every service of this layer unchanged
    pub fn is_applied_in(&self, plan: &Layer) -> bool {
        self.services
            .iter()
            .all(|(name, service)| plan.services.get(name) == Some(service))
    }
}

/// The layer supervising the CU process
pub fn desired_layer(workload: &WorkloadSettings) -> Layer {
    let environment = BTreeMap::from([
        ("OAI_GDBSTACKS".to_string(), "1".to_string()),
        ("TZ".to_string(), "UTC".to_string()),
    ]);
    let service = Service {
        override_: Some("replace".to_string()),
        summary: None,
        command: Some(format!(
            "{} -O {} --sa",
            workload.softmodem_path,
            workload.config_path()
        )),
        startup: Some("enabled".to_string()),
        environment,
    };

    Layer {
        summary: Some("cu layer".to_string()),
        description: Some("pebble config layer for the OAI CU".to_string()),
        services: BTreeMap::from([(workload.service_name.clone(), service)]),
    }
}
