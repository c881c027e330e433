//! Kubernetes Resource Creation
//!
//! Multus network attachment definitions, the pod network annotation and the
//! StatefulSet patches built from the validated config. Everything here is
//! pure; [`super::cluster`] sends the objects to the API server.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::{CniType, TypedConfig};
use crate::error::Result;

/// API group of `NetworkAttachmentDefinition`
pub const NAD_GROUP: &str = "k8s.cni.cncf.io";
pub const NAD_VERSION: &str = "v1";
pub const NAD_KIND: &str = "NetworkAttachmentDefinition";
pub const NAD_PLURAL: &str = "network-attachment-definitions";
/// CRD whose presence means Multus is installed
pub const NAD_CRD_NAME: &str = "network-attachment-definitions.k8s.cni.cncf.io";
/// Pod annotation listing the extra interfaces
pub const NETWORK_ANNOTATION: &str = "k8s.v1.cni.cncf.io/networks";

const CNI_VERSION: &str = "0.3.1";

/// A `NetworkAttachmentDefinition` to maintain
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentDefinition {
    pub name: String,
    /// CNI configuration carried in `spec.config`
    pub config: Value,
}

impl AttachmentDefinition {
    fn for_interface(name: &str, interface: &str, cni_type: CniType) -> Self {
        let mut config = json!({
            "cniVersion": CNI_VERSION,
            "ipam": {"type": "static"},
            "capabilities": {"mac": true},
            "type": cni_type.as_str(),
        });
        match cni_type {
            CniType::Bridge => config["bridge"] = json!(format!("{}-br", interface)),
            CniType::Macvlan => config["master"] = json!(interface),
        }
        Self {
            name: name.to_string(),
            config,
        }
    }

    /// Full manifest in `namespace`
    pub fn manifest(&self, namespace: &str) -> Value {
        json!({
            "apiVersion": format!("{}/{}", NAD_GROUP, NAD_VERSION),
            "kind": NAD_KIND,
            "metadata": {
                "name": self.name,
                "namespace": namespace,
            },
            "spec": {
                "config": self.config.to_string(),
            },
        })
    }

    /// Whether an existing `spec.config` string carries this CNI configuration
    pub fn matches(&self, existing_config: Option<&str>) -> bool {
        existing_config
            .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
            .is_some_and(|existing| existing == self.config)
    }
}

/// One entry of the pod network annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkAnnotation {
    pub name: String,
    pub interface: String,
    pub ips: Vec<String>,
}

/// Desired Multus state of the workload
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentPlan {
    pub definitions: Vec<AttachmentDefinition>,
    pub annotations: Vec<NetworkAnnotation>,
}

impl AttachmentPlan {
    /// F1 and N3 attachments with static addresses
    pub fn from_config(config: &TypedConfig) -> Self {
        let f1_name = "cu-f1-net";
        let n3_name = "cu-n3-net";

        Self {
            definitions: vec![
                AttachmentDefinition::for_interface(
                    f1_name,
                    &config.f1_interface_name,
                    config.cni_type,
                ),
                AttachmentDefinition::for_interface(
                    n3_name,
                    &config.n3_interface_name,
                    config.cni_type,
                ),
            ],
            annotations: vec![
                NetworkAnnotation {
                    name: f1_name.to_string(),
                    interface: config.f1_interface_name.clone(),
                    ips: vec![config.f1_ip_address.to_string()],
                },
                NetworkAnnotation {
                    name: n3_name.to_string(),
                    interface: config.n3_interface_name.clone(),
                    ips: vec![config.n3_ip_address.to_string()],
                },
            ],
        }
    }

    /// Value of [`NETWORK_ANNOTATION`]
    pub fn annotation_value(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.annotations)?)
    }

    /// Whether an existing annotation value lists exactly these networks
    pub fn annotation_matches(&self, existing: Option<&str>) -> bool {
        existing
            .and_then(|raw| serde_json::from_str::<Vec<NetworkAnnotation>>(raw).ok())
            .is_some_and(|existing| existing == self.annotations)
    }

    /// StatefulSet patch placing the annotation on the pod template
    pub fn annotation_patch(&self) -> Result<Value> {
        Ok(json!({
            "spec": {
                "template": {
                    "metadata": {
                        "annotations": {
                            NETWORK_ANNOTATION: self.annotation_value()?,
                        }
                    }
                }
            }
        }))
    }
}

/// Strategic merge patch making `container` privileged
pub fn privilege_patch(container: &str) -> Value {
    json!({
        "spec": {
            "template": {
                "spec": {
                    "containers": [{
                        "name": container,
                        "securityContext": {"privileged": true},
                    }]
                }
            }
        }
    })
}
