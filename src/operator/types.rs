//! Operator Types
//!
//! Collaborator seams of the reconcile core and the context bundling them

use std::fmt;
use std::sync::Arc;

use super::resources::AttachmentPlan;
use crate::config::{RawConfig, Settings};
use crate::error::Result;
use crate::relations::RelationStore;
use crate::workload::Workload;

/// Unit status category reported to the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Active,
    Blocked,
    Waiting,
}

impl StatusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Active => "active",
            StatusKind::Blocked => "blocked",
            StatusKind::Waiting => "waiting",
        }
    }
}

/// Status shown for the unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitStatus {
    pub kind: StatusKind,
    pub message: String,
}

impl UnitStatus {
    pub fn active() -> Self {
        Self {
            kind: StatusKind::Active,
            message: String::new(),
        }
    }

    pub fn blocked(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Blocked,
            message: message.into(),
        }
    }

    pub fn waiting(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Waiting,
            message: message.into(),
        }
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind.as_str())
        } else {
            write!(f, "{}: {}", self.kind.as_str(), self.message)
        }
    }
}

/// This unit as seen by the runtime
#[cfg_attr(test, mockall::automock)]
pub trait UnitModel {
    fn is_leader(&self) -> Result<bool>;

    /// Address assigned to the unit, if any yet
    fn private_address(&self) -> Result<Option<String>>;

    /// Raw charm options
    fn charm_config(&self) -> Result<RawConfig>;

    fn model_name(&self) -> Result<String>;

    fn app_name(&self) -> Result<String>;

    fn set_status(&self, status: &UnitStatus) -> Result<()>;

    fn set_workload_version(&self, version: &str) -> Result<()>;
}

/// Privileged security context of the workload container
#[cfg_attr(test, mockall::automock)]
pub trait PrivilegeGrant {
    fn is_privileged(&self, container: &str) -> Result<bool>;

    fn grant(&self, container: &str) -> Result<()>;
}

/// Multus network attachments of the workload pod
#[cfg_attr(test, mockall::automock)]
pub trait NetworkAttachments {
    /// Multus is installed in the cluster
    fn is_available(&self) -> Result<bool>;

    /// Definitions and pod annotation match `desired`
    fn is_ready(&self, desired: &AttachmentPlan) -> Result<bool>;

    /// Create or update definitions and annotation
    fn configure(&self, desired: &AttachmentPlan) -> Result<()>;
}

/// Context data for one invocation
pub struct Context {
    pub unit: Arc<dyn UnitModel>,
    pub relations: Arc<dyn RelationStore>,
    pub workload: Arc<dyn Workload>,
    pub privilege: Arc<dyn PrivilegeGrant>,
    pub attachments: Arc<dyn NetworkAttachments>,
    pub settings: Settings,
}

impl Context {
    pub fn new(
        unit: Arc<dyn UnitModel>,
        relations: Arc<dyn RelationStore>,
        workload: Arc<dyn Workload>,
        privilege: Arc<dyn PrivilegeGrant>,
        attachments: Arc<dyn NetworkAttachments>,
        settings: Settings,
    ) -> Self {
        Self {
            unit,
            relations,
            workload,
            privilege,
            attachments,
            settings,
        }
    }
}

/// Name published to peers, `<model>-<app>-cu`
pub fn unit_name(model: &str, app: &str) -> String {
    format!("{}-{}-cu", model, app)
}
