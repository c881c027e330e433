//! Observation of the environment for one invocation
//!
//! Everything the status and reconcile paths need is read once into an
//! [`Observation`]. Both paths then decide from the same predicates.

use tracing::{debug, info};

use super::resources::AttachmentPlan;
use super::types::{unit_name, Context};
use crate::config::{validate, FieldErrors, TypedConfig, WorkloadSettings};
use crate::error::Result;
use crate::network::{N3Route, NetworkFacts};
use crate::relations::{PeerFacts, RelationTopology};
use crate::workload::{Layer, Workload};

/// Multus state in the cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultusState {
    /// The `NetworkAttachmentDefinition` CRD is missing
    Unavailable,
    NotReady,
    Ready,
}

/// Facts read from the workload container (only when reachable)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerFacts {
    /// The config storage is mounted
    pub storage_attached: bool,
    /// Current content of the rendered config file
    pub persisted_config: Option<String>,
    /// Current supervision plan
    pub plan: Layer,
    pub workload_version: Option<String>,
}

impl ContainerFacts {
    pub fn capture(workload: &dyn Workload, settings: &WorkloadSettings) -> Result<Self> {
        let storage_attached = workload.exists(&settings.config_dir)?;
        let persisted_config = if storage_attached {
            workload.pull(&settings.config_path())?
        } else {
            None
        };
        Ok(Self {
            storage_attached,
            persisted_config,
            plan: workload.plan()?,
            workload_version: workload.pull(&settings.workload_version_path)?,
        })
    }
}

/// Desired cluster state derived from a valid config, with its observed counterpart
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterFacts {
    pub attachments: AttachmentPlan,
    pub multus: MultusState,
    pub route: N3Route,
    pub privileged: bool,
}

/// What the leader sees
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderSnapshot {
    /// `<model>-<app>-cu`
    pub unit_name: String,
    pub config: std::result::Result<TypedConfig, FieldErrors>,
    pub topology: RelationTopology,
    pub peers: PeerFacts,
    /// `None` when the config is invalid
    pub cluster: Option<ClusterFacts>,
    /// `None` when the container is unreachable
    pub container: Option<ContainerFacts>,
    pub network: NetworkFacts,
}

/// One invocation's view of the world
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    /// Non-leader units observe nothing else
    Follower,
    Leader(Box<LeaderSnapshot>),
}

impl Observation {
    pub fn capture(ctx: &Context) -> Result<Self> {
        if !ctx.unit.is_leader()? {
            debug!("Not the leader, skipping observation");
            return Ok(Observation::Follower);
        }

        let unit_name = unit_name(&ctx.unit.model_name()?, &ctx.unit.app_name()?);
        let config = validate(&ctx.unit.charm_config()?);
        if let Err(errors) = &config {
            info!("{}", errors);
        }

        let topology = RelationTopology::resolve(ctx.relations.as_ref())?;
        let peers = PeerFacts::resolve(ctx.relations.as_ref(), &topology)?;

        let container = if ctx.workload.can_connect() {
            Some(ContainerFacts::capture(
                ctx.workload.as_ref(),
                &ctx.settings.workload,
            )?)
        } else {
            debug!("Workload container not reachable");
            None
        };

        let cluster = match &config {
            Ok(config) => Some(capture_cluster(ctx, config)?),
            Err(_) => None,
        };

        let route_to_check = cluster
            .as_ref()
            .filter(|_| container.is_some() && topology.needs_n3_route())
            .map(|cluster| cluster.route);
        let workload = container.as_ref().map(|_| ctx.workload.as_ref());
        let network = NetworkFacts::resolve(ctx.unit.as_ref(), workload, route_to_check.as_ref())?;

        Ok(Observation::Leader(Box::new(LeaderSnapshot {
            unit_name,
            config,
            topology,
            peers,
            cluster,
            container,
            network,
        })))
    }
}

fn capture_cluster(ctx: &Context, config: &TypedConfig) -> Result<ClusterFacts> {
    let attachments = AttachmentPlan::from_config(config);
    let multus = if !ctx.attachments.is_available()? {
        MultusState::Unavailable
    } else if ctx.attachments.is_ready(&attachments)? {
        MultusState::Ready
    } else {
        MultusState::NotReady
    };
    let privileged = ctx
        .privilege
        .is_privileged(&ctx.settings.workload.container_name)?;

    Ok(ClusterFacts {
        attachments,
        multus,
        route: N3Route::from_config(config),
        privileged,
    })
}

impl LeaderSnapshot {
    pub fn valid_config(&self) -> Option<&TypedConfig> {
        self.config.as_ref().ok()
    }

    pub fn multus_available(&self) -> bool {
        self.cluster
            .as_ref()
            .is_some_and(|cluster| cluster.multus != MultusState::Unavailable)
    }

    pub fn multus_ready(&self) -> bool {
        self.cluster
            .as_ref()
            .is_some_and(|cluster| cluster.multus == MultusState::Ready)
    }

    pub fn n2_created(&self) -> bool {
        self.topology.n2_created()
    }

    pub fn container_reachable(&self) -> bool {
        self.container.is_some()
    }

    pub fn address_known(&self) -> bool {
        self.network.address.is_some()
    }

    pub fn privileged(&self) -> bool {
        self.cluster.as_ref().is_some_and(|cluster| cluster.privileged)
    }

    pub fn storage_attached(&self) -> bool {
        self.container
            .as_ref()
            .is_some_and(|container| container.storage_attached)
    }

    /// The core network published its hostname
    pub fn core_endpoint_known(&self) -> bool {
        self.peers.n2.amf_hostname.is_some()
    }

    /// The route is needed and confirmed absent
    pub fn route_missing(&self) -> bool {
        self.topology.needs_n3_route() && self.network.route_exists == Some(false)
    }

    pub fn core_gnb_created(&self) -> bool {
        self.topology.core_gnb_created()
    }

    pub fn identity_available(&self) -> bool {
        self.peers.identity_available()
    }
}
