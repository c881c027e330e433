//! Reconcile core
//!
//! Observation, status aggregation, side-effect planning and hook dispatch
//! for the CU unit, plus the collaborator traits they run against.

#[cfg(feature = "kubernetes-operator")]
mod cluster;
mod dispatch;
mod reconcile;
mod resources;
mod snapshot;
mod status;
mod types;

#[cfg(feature = "kubernetes-operator")]
pub use cluster::{ClusterTarget, K8sPrivileged, MultusAttachments};
pub use dispatch::{collect_status, dispatch, Handler, Outcome, Trigger};
pub use reconcile::{apply, plan, reconcile, SideEffect};
pub use resources::{
    privilege_patch, AttachmentDefinition, AttachmentPlan, NetworkAnnotation, NAD_CRD_NAME,
    NETWORK_ANNOTATION,
};
pub use snapshot::{ClusterFacts, ContainerFacts, LeaderSnapshot, MultusState, Observation};
pub use status::{evaluate, workload_version, Condition};
pub use types::{
    unit_name, Context, NetworkAttachments, PrivilegeGrant, StatusKind, UnitModel, UnitStatus,
};
#[cfg(test)]
pub(crate) use types::{MockNetworkAttachments, MockPrivilegeGrant, MockUnitModel};
