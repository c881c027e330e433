//! Unit status aggregation
//!
//! The first failing condition, in precedence order, decides the status.

use super::snapshot::{LeaderSnapshot, Observation};
use super::types::UnitStatus;
use crate::config::FieldErrors;

/// Readiness condition of the unit, ordered by precedence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    NotLeader,
    InvalidConfig(FieldErrors),
    MultusUnavailable,
    RelationNotCreated,
    ContainerUnreachable,
    NoNetworkAddress,
    MultusNotReady,
    NotPrivileged,
    StorageNotAttached,
    PeerEndpointUnknown,
    RouteMissing,
    UpstreamRelationMissing,
    IdentityParamsMissing,
    Active,
}

impl Condition {
    pub fn status(&self) -> UnitStatus {
        match self {
            Condition::NotLeader => UnitStatus::blocked("Scaling is not implemented for this charm"),
            Condition::InvalidConfig(errors) => UnitStatus::blocked(errors.to_string()),
            Condition::MultusUnavailable => UnitStatus::blocked("Multus is not installed or enabled"),
            Condition::RelationNotCreated => {
                UnitStatus::blocked("Waiting for N2 relation to be created")
            }
            Condition::ContainerUnreachable => UnitStatus::waiting("Waiting for container to be ready"),
            Condition::NoNetworkAddress => {
                UnitStatus::waiting("Waiting for Pod IP address to be available")
            }
            Condition::MultusNotReady => UnitStatus::waiting("Waiting for Multus to be ready"),
            Condition::NotPrivileged => UnitStatus::waiting("Waiting for statefulset to be patched"),
            Condition::StorageNotAttached => UnitStatus::waiting("Waiting for storage to be attached"),
            Condition::PeerEndpointUnknown => UnitStatus::waiting("Waiting for N2 information"),
            Condition::RouteMissing => UnitStatus::waiting("Waiting for the N3 route to be created"),
            Condition::UpstreamRelationMissing => {
                UnitStatus::blocked("Waiting for fiveg_core_gnb relation to be created")
            }
            Condition::IdentityParamsMissing => {
                UnitStatus::waiting("Waiting for TAC and PLMNs configuration")
            }
            Condition::Active => UnitStatus::active(),
        }
    }
}

/// Current condition of the unit
pub fn evaluate(observation: &Observation) -> Condition {
    match observation {
        Observation::Follower => Condition::NotLeader,
        Observation::Leader(snapshot) => evaluate_leader(snapshot),
    }
}

fn evaluate_leader(snapshot: &LeaderSnapshot) -> Condition {
    if let Err(errors) = &snapshot.config {
        return Condition::InvalidConfig(errors.clone());
    }
    if !snapshot.multus_available() {
        return Condition::MultusUnavailable;
    }
    if !snapshot.n2_created() {
        return Condition::RelationNotCreated;
    }
    if !snapshot.container_reachable() {
        return Condition::ContainerUnreachable;
    }
    if !snapshot.address_known() {
        return Condition::NoNetworkAddress;
    }
    if !snapshot.multus_ready() {
        return Condition::MultusNotReady;
    }
    if !snapshot.privileged() {
        return Condition::NotPrivileged;
    }
    if !snapshot.storage_attached() {
        return Condition::StorageNotAttached;
    }
    if !snapshot.core_endpoint_known() {
        return Condition::PeerEndpointUnknown;
    }
    if snapshot.route_missing() {
        return Condition::RouteMissing;
    }
    if !snapshot.core_gnb_created() {
        return Condition::UpstreamRelationMissing;
    }
    if !snapshot.identity_available() {
        return Condition::IdentityParamsMissing;
    }
    Condition::Active
}

/// 作業負荷のバージョン (末尾の空白は除く)
pub fn workload_version(observation: &Observation) -> Option<String> {
    let Observation::Leader(snapshot) = observation else {
        return None;
    };
    snapshot
        .container
        .as_ref()
        .and_then(|container| container.workload_version.as_deref())
        .map(|version| version.trim().to_string())
        .filter(|version| !version.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{validate, ConfigValue, RawConfig};
    use crate::network::{N3Route, NetworkFacts};
    use crate::operator::resources::AttachmentPlan;
    use crate::operator::snapshot::{ClusterFacts, ContainerFacts, MultusState};
    use crate::operator::types::StatusKind;
    use crate::relations::{PeerFacts, Plmn, RelationId, RelationTopology};

    fn ready_snapshot() -> LeaderSnapshot {
        let config = validate(&RawConfig::new()).unwrap();
        let cluster = ClusterFacts {
            attachments: AttachmentPlan::from_config(&config),
            multus: MultusState::Ready,
            route: N3Route::from_config(&config),
            privileged: true,
        };
        let mut peers = PeerFacts::default();
        peers.n2.amf_hostname = Some("amf".to_string());
        peers.n2.amf_ip_address = Some("1.2.3.4".parse().unwrap());
        peers.tac = Some(1);
        peers.plmns = Some(vec![Plmn::new("001", "01", 1, None)]);

        LeaderSnapshot {
            unit_name: "whatever-oai-ran-cu-k8s-cu".to_string(),
            config: Ok(config),
            topology: RelationTopology {
                n2: vec![RelationId::new("fiveg_n2", 1)],
                core_gnb: vec![RelationId::new("fiveg_core_gnb", 2)],
                ..Default::default()
            },
            peers,
            cluster: Some(cluster),
            container: Some(ContainerFacts {
                storage_attached: true,
                ..Default::default()
            }),
            network: NetworkFacts {
                address: Some("1.1.1.1".parse().unwrap()),
                route_exists: Some(true),
            },
        }
    }

    fn condition(snapshot: LeaderSnapshot) -> Condition {
        evaluate(&Observation::Leader(Box::new(snapshot)))
    }

    #[test]
    fn test_follower_is_blocked() {
        let status = evaluate(&Observation::Follower).status();
        assert_eq!(status.kind, StatusKind::Blocked);
        assert_eq!(status.message, "Scaling is not implemented for this charm");
    }

    #[test]
    fn test_ready_snapshot_is_active() {
        assert_eq!(condition(ready_snapshot()), Condition::Active);
    }

    #[test]
    fn test_invalid_config_lists_fields() {
        let mut snapshot = ready_snapshot();
        let raw: RawConfig = [
            ("sst".to_string(), ConfigValue::from(0_i64)),
            ("mcc".to_string(), ConfigValue::from("01")),
        ]
        .into_iter()
        .collect();
        snapshot.config = validate(&raw);
        snapshot.cluster = None;

        let status = condition(snapshot).status();
        assert_eq!(status.kind, StatusKind::Blocked);
        assert_eq!(
            status.message,
            "The following configurations are not valid: ['mcc', 'sst']"
        );
    }

    #[test]
    fn test_precedence_walk() {
        let mut snapshot = ready_snapshot();

        snapshot.peers.plmns = None;
        assert_eq!(condition(snapshot.clone()), Condition::IdentityParamsMissing);

        snapshot.topology.core_gnb.clear();
        assert_eq!(condition(snapshot.clone()), Condition::UpstreamRelationMissing);

        snapshot.topology.f1.push(RelationId::new("fiveg_f1", 3));
        snapshot.network.route_exists = Some(false);
        assert_eq!(condition(snapshot.clone()), Condition::RouteMissing);

        snapshot.peers.n2.amf_hostname = None;
        assert_eq!(condition(snapshot.clone()), Condition::PeerEndpointUnknown);

        snapshot.container.as_mut().unwrap().storage_attached = false;
        assert_eq!(condition(snapshot.clone()), Condition::StorageNotAttached);

        snapshot.cluster.as_mut().unwrap().privileged = false;
        assert_eq!(condition(snapshot.clone()), Condition::NotPrivileged);

        snapshot.cluster.as_mut().unwrap().multus = MultusState::NotReady;
        assert_eq!(condition(snapshot.clone()), Condition::MultusNotReady);

        snapshot.network.address = None;
        assert_eq!(condition(snapshot.clone()), Condition::NoNetworkAddress);

        snapshot.container = None;
        assert_eq!(condition(snapshot.clone()), Condition::ContainerUnreachable);

        snapshot.topology.n2.clear();
        assert_eq!(condition(snapshot.clone()), Condition::RelationNotCreated);

        snapshot.cluster.as_mut().unwrap().multus = MultusState::Unavailable;
        assert_eq!(condition(snapshot), Condition::MultusUnavailable);
    }

    #[test]
    fn test_route_ignored_without_second_relation() {
        let mut snapshot = ready_snapshot();
        snapshot.topology.core_gnb.clear();
        snapshot.network.route_exists = Some(false);
        assert_eq!(condition(snapshot), Condition::UpstreamRelationMissing);
    }

    #[test]
    fn test_workload_version() {
        let mut snapshot = ready_snapshot();
        snapshot.container.as_mut().unwrap().workload_version = Some("2.1.0\n".to_string());
        let observation = Observation::Leader(Box::new(snapshot));
        assert_eq!(workload_version(&observation), Some("2.1.0".to_string()));
        assert_eq!(workload_version(&Observation::Follower), None);
    }
}
