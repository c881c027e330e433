//! Reconcile logic
//!
//! [`plan`] turns an [`Observation`] into the ordered side effects that move
//! the unit towards its desired state; [`apply`] executes them. Planning is
//! pure, so a second run over an unchanged environment plans no mutation.

use tracing::{debug, info};

use super::resources::AttachmentPlan;
use super::snapshot::{LeaderSnapshot, Observation};
use super::types::Context;
use crate::config::WorkloadSettings;
use crate::error::Result;
use crate::network::N3Route;
use crate::relations::{
    CoreGnbRequirerData, F1ProviderData, GnbIdentityData, Publication, RelationId,
};
use crate::render::{effective_identity, render, RenderInput, RenderedConfig};
use crate::workload::{desired_layer, Layer};

/// One change to the environment, in execution order
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    ConfigureNetworkAttachments(AttachmentPlan),
    WriteConfig { path: String, content: String },
    ApplyLayer { label: String, layer: Layer },
    Replan,
    RestartService(String),
    GrantPrivilege { container: String },
    CreateRoute(N3Route),
    Publish {
        relation: RelationId,
        publication: Publication,
    },
}

impl SideEffect {
    /// Publications re-send the same data on every run and do not count as mutations
    pub fn is_mutating(&self) -> bool {
        !matches!(self, SideEffect::Publish { .. })
    }
}

/// Side effects required by `observation`
pub fn plan(observation: &Observation, workload: &WorkloadSettings) -> Vec<SideEffect> {
    match observation {
        Observation::Follower => Vec::new(),
        Observation::Leader(snapshot) => plan_leader(snapshot, workload),
    }
}

fn plan_leader(snapshot: &LeaderSnapshot, workload: &WorkloadSettings) -> Vec<SideEffect> {
    let (Some(config), Some(cluster), Some(container)) = (
        snapshot.valid_config(),
        snapshot.cluster.as_ref(),
        snapshot.container.as_ref(),
    ) else {
        debug!("Config, cluster or container not ready, nothing to reconcile");
        return Vec::new();
    };
    if !snapshot.multus_available()
        || !snapshot.n2_created()
        || !snapshot.storage_attached()
        || !snapshot.address_known()
        || !snapshot.core_endpoint_known()
    {
        debug!("Readiness gate not met, nothing to reconcile");
        return Vec::new();
    }

    let rendered = render(&RenderInput {
        gnb_name: &snapshot.unit_name,
        config,
        peers: &snapshot.peers,
        network: &snapshot.network,
    });
    let RenderedConfig::Defined(content) = &rendered else {
        return Vec::new();
    };

    let mut effects = Vec::new();

    if !snapshot.multus_ready() {
        effects.push(SideEffect::ConfigureNetworkAttachments(
            cluster.attachments.clone(),
        ));
    }

    let config_changed = !rendered.matches(container.persisted_config.as_deref());
    if config_changed {
        effects.push(SideEffect::WriteConfig {
            path: workload.config_path(),
            content: content.clone(),
        });
    }

    let layer = desired_layer(workload);
    if !layer.is_applied_in(&container.plan) {
        effects.push(SideEffect::ApplyLayer {
            label: workload.container_name.clone(),
            layer,
        });
        effects.push(SideEffect::Replan);
    }

    if config_changed {
        effects.push(SideEffect::RestartService(workload.service_name.clone()));
    }

    if !cluster.privileged {
        effects.push(SideEffect::GrantPrivilege {
            container: workload.container_name.clone(),
        });
    }

    if snapshot.route_missing() {
        effects.push(SideEffect::CreateRoute(cluster.route));
    }

    let identity = effective_identity(config, &snapshot.peers);
    for relation in &snapshot.topology.f1 {
        effects.push(SideEffect::Publish {
            relation: relation.clone(),
            publication: Publication::F1(F1ProviderData {
                ip_address: config.f1_ip_address.addr(),
                port: config.f1_port,
                tac: identity.tac,
                plmns: identity.plmns.clone(),
            }),
        });
    }
    for relation in &snapshot.topology.core_gnb {
        effects.push(SideEffect::Publish {
            relation: relation.clone(),
            publication: Publication::CoreGnb(CoreGnbRequirerData {
                cu_name: snapshot.unit_name.clone(),
            }),
        });
    }
    for relation in &snapshot.topology.gnb_identity {
        effects.push(SideEffect::Publish {
            relation: relation.clone(),
            publication: Publication::GnbIdentity(GnbIdentityData {
                gnb_name: snapshot.unit_name.clone(),
                tac: identity.tac,
            }),
        });
    }

    effects
}

/// Execute `effects` in order; the first failure aborts the rest
pub fn apply(ctx: &Context, effects: &[SideEffect]) -> Result<()> {
    for effect in effects {
        match effect {
            SideEffect::ConfigureNetworkAttachments(attachments) => {
                ctx.attachments.configure(attachments)?;
                info!("Network attachments configured");
            }
            SideEffect::WriteConfig { path, content } => {
                ctx.workload.push(path, content)?;
                info!("Config file written");
            }
            SideEffect::ApplyLayer { label, layer } => {
                ctx.workload.add_layer(label, layer)?;
                info!("New layer added: {}", label);
            }
            SideEffect::Replan => {
                ctx.workload.replan()?;
            }
            SideEffect::RestartService(service) => {
                ctx.workload.restart(service)?;
                info!("Restarted container {}", service);
            }
            SideEffect::GrantPrivilege { container } => {
                ctx.privilege.grant(container)?;
                info!("Container {} is now privileged", container);
            }
            SideEffect::CreateRoute(route) => {
                ctx.workload.exec(&route.replace_command())?;
                info!(
                    "Route to {} via {} created",
                    route.destination, route.gateway
                );
            }
            SideEffect::Publish {
                relation,
                publication,
            } => {
                ctx.relations
                    .update_local_app_data(relation, &publication.to_bag()?)?;
                debug!(%relation, "Published relation data");
            }
        }
    }
    Ok(())
}

/// Observe, plan and apply
pub fn reconcile(ctx: &Context) -> Result<Vec<SideEffect>> {
    let observation = Observation::capture(ctx)?;
    let effects = plan(&observation, &ctx.settings.workload);
    debug!(count = effects.len(), "Planned side effects");
    apply(ctx, &effects)?;
    Ok(effects)
}
