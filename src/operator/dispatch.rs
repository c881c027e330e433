//! Hook dispatch
//!
//! Every runtime event maps to a [`Trigger`]; a static table decides which
//! handler runs. Status collection always follows.

use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

use super::reconcile::{reconcile, SideEffect};
use super::snapshot::Observation;
use super::status::{evaluate, workload_version};
use super::types::{Context, UnitStatus};
use crate::error::Result;

/// Events the operator reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Install,
    ConfigChanged,
    UpdateStatus,
    PebbleReady,
    N2RelationJoined,
    N2RelationChanged,
    F1RelationJoined,
    F1RelationChanged,
    CoreGnbRelationJoined,
    CoreGnbRelationChanged,
    GnbIdentityRelationJoined,
    LeaderElected,
    CollectStatus,
    Unknown,
}

/// What a trigger does before status collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    Reconcile,
    StatusOnly,
}

/// Trigger → (hook name, handler)
const DISPATCH_TABLE: &[(Trigger, &str, Handler)] = &[
    (Trigger::Install, "install", Handler::Reconcile),
    (Trigger::ConfigChanged, "config-changed", Handler::Reconcile),
    (Trigger::UpdateStatus, "update-status", Handler::Reconcile),
    (Trigger::PebbleReady, "cu-pebble-ready", Handler::Reconcile),
    (Trigger::N2RelationJoined, "fiveg_n2-relation-joined", Handler::Reconcile),
    (Trigger::N2RelationChanged, "fiveg_n2-relation-changed", Handler::Reconcile),
    (Trigger::F1RelationJoined, "fiveg_f1-relation-joined", Handler::Reconcile),
    (Trigger::F1RelationChanged, "fiveg_f1-relation-changed", Handler::Reconcile),
    (
        Trigger::CoreGnbRelationJoined,
        "fiveg_core_gnb-relation-joined",
        Handler::Reconcile,
    ),
    (
        Trigger::CoreGnbRelationChanged,
        "fiveg_core_gnb-relation-changed",
        Handler::Reconcile,
    ),
    (
        Trigger::GnbIdentityRelationJoined,
        "fiveg_gnb_identity-relation-joined",
        Handler::Reconcile,
    ),
    (Trigger::LeaderElected, "leader-elected", Handler::Reconcile),
    (Trigger::CollectStatus, "collect-status", Handler::StatusOnly),
    (Trigger::Unknown, "unknown", Handler::StatusOnly),
];

impl Trigger {
    /// Trigger for a hook name or a `hooks/<name>` dispatch path
    pub fn from_hook(hook: &str) -> Self {
        let name = hook.trim().rsplit('/').next().unwrap_or_default();
        DISPATCH_TABLE
            .iter()
            .find(|(_, hook_name, _)| *hook_name == name)
            .map(|(trigger, _, _)| *trigger)
            .unwrap_or(Trigger::Unknown)
    }

    pub fn hook_name(&self) -> &'static str {
        self.entry().1
    }

    pub fn handler(&self) -> Handler {
        self.entry().2
    }

    fn entry(&self) -> &'static (Trigger, &'static str, Handler) {
        DISPATCH_TABLE
            .iter()
            .find(|(trigger, _, _)| trigger == self)
            .unwrap_or(&DISPATCH_TABLE[DISPATCH_TABLE.len() - 1])
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hook_name())
    }
}

impl FromStr for Trigger {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Trigger::from_hook(s))
    }
}

/// Result of one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub effects: Vec<SideEffect>,
    pub status: UnitStatus,
}

/// Run the handler for `trigger`, then collect and report status
pub fn dispatch(ctx: &Context, trigger: Trigger) -> Result<Outcome> {
    info!(hook = %trigger, "Dispatching");

    let effects = match trigger.handler() {
        Handler::Reconcile => reconcile(ctx)?,
        Handler::StatusOnly => {
            if trigger == Trigger::Unknown {
                warn!("Unhandled hook, collecting status only");
            }
            Vec::new()
        }
    };

    let status = collect_status(ctx)?;
    Ok(Outcome { effects, status })
}

/// Evaluate and report the unit status (and workload version)
pub fn collect_status(ctx: &Context) -> Result<UnitStatus> {
    let observation = Observation::capture(ctx)?;
    let status = evaluate(&observation).status();

    if let Some(version) = workload_version(&observation) {
        ctx.unit.set_workload_version(&version)?;
    }
    ctx.unit.set_status(&status)?;
    debug!(%status, "Status reported");
    Ok(status)
}
