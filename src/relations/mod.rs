//! Relation interfaces
//!
//! Typed views over the string data bags exchanged with peer operators.
//! Remote fields are parsed on read; a missing or malformed field is simply
//! absent, so a misbehaving peer degrades to "not published yet".

mod core_gnb;
mod f1;
mod gnb_identity;
mod n2;
mod plmn;

pub use core_gnb::{CoreGnbProviderData, CoreGnbRequirerData};
pub use f1::{F1ProviderData, F1RequirerData};
pub use gnb_identity::GnbIdentityData;
pub use n2::N2Information;
pub use plmn::{encode_plmns, parse_plmns, Plmn};

use crate::error::{OperatorError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Mandatory relation towards the core network (AMF)
pub const N2_RELATION_NAME: &str = "fiveg_n2";
/// Relation with the Distributed Unit
pub const F1_RELATION_NAME: &str = "fiveg_f1";
/// Relation providing the TAC and PLMNs
pub const CORE_GNB_RELATION_NAME: &str = "fiveg_core_gnb";
/// Relation publishing the gNB identity
pub const GNB_IDENTITY_RELATION_NAME: &str = "fiveg_gnb_identity";

/// Highest valid Tracking Area Code
pub const MAX_TAC: u32 = 16_777_215;

/// A relation data bag
pub type DataBag = BTreeMap<String, String>;

/// Relation identifier, `<endpoint>:<id>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationId {
    pub endpoint: String,
    pub id: u32,
}

impl RelationId {
    pub fn new(endpoint: impl Into<String>, id: u32) -> Self {
        Self {
            endpoint: endpoint.into(),
            id,
        }
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.endpoint, self.id)
    }
}

impl FromStr for RelationId {
    type Err = OperatorError;

    fn from_str(s: &str) -> Result<Self> {
        let (endpoint, id) = s
            .trim()
            .rsplit_once(':')
            .ok_or_else(|| OperatorError::Relation(format!("malformed relation id: {}", s)))?;
        let id = id
            .parse()
            .map_err(|_| OperatorError::Relation(format!("malformed relation id: {}", s)))?;
        Ok(Self::new(endpoint, id))
    }
}

/// Transport of relation data bags (application-level bags only)
#[cfg_attr(test, mockall::automock)]
pub trait RelationStore {
    /// Established relations on an endpoint
    fn relation_ids(&self, endpoint: &str) -> Result<Vec<RelationId>>;

    /// Data published by the remote application
    fn remote_app_data(&self, relation: &RelationId) -> Result<DataBag>;

    /// Merge `data` into this application's bag
    fn update_local_app_data(&self, relation: &RelationId, data: &DataBag) -> Result<()>;
}

/// Parse a port field; anything outside 1-65535 is absent
pub fn parse_port(raw: Option<&String>) -> Option<u16> {
    raw?.trim().parse::<u16>().ok().filter(|port| *port != 0)
}

/// Parse a TAC field; anything outside 1-16777215 is absent
pub fn parse_tac(raw: Option<&String>) -> Option<u32> {
    raw?
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|tac| (1..=MAX_TAC).contains(tac))
}

/// Which relations currently exist
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationTopology {
    pub n2: Vec<RelationId>,
    pub f1: Vec<RelationId>,
    pub core_gnb: Vec<RelationId>,
    pub gnb_identity: Vec<RelationId>,
}

impl RelationTopology {
    pub fn resolve(store: &dyn RelationStore) -> Result<Self> {
        Ok(Self {
            n2: store.relation_ids(N2_RELATION_NAME)?,
            f1: store.relation_ids(F1_RELATION_NAME)?,
            core_gnb: store.relation_ids(CORE_GNB_RELATION_NAME)?,
            gnb_identity: store.relation_ids(GNB_IDENTITY_RELATION_NAME)?,
        })
    }

    pub fn n2_created(&self) -> bool {
        !self.n2.is_empty()
    }

    pub fn core_gnb_created(&self) -> bool {
        !self.core_gnb.is_empty()
    }

    /// A relation beyond N2 exists, which means user-plane traffic needs the N3 route
    pub fn needs_n3_route(&self) -> bool {
        !self.f1.is_empty() || !self.core_gnb.is_empty()
    }
}

/// Information published by peers, each field independently present or absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerFacts {
    /// Core network endpoint
    pub n2: N2Information,
    /// F1 port advertised by the DU
    pub du_f1_port: Option<u16>,
    /// TAC advertised over `fiveg_core_gnb`
    pub tac: Option<u32>,
    /// PLMNs advertised over `fiveg_core_gnb`
    pub plmns: Option<Vec<Plmn>>,
}

impl PeerFacts {
    /// Read peer data from the first relation of each endpoint
    pub fn resolve(store: &dyn RelationStore, topology: &RelationTopology) -> Result<Self> {
        let n2 = match topology.n2.first() {
            Some(relation) => N2Information::from_bag(&store.remote_app_data(relation)?),
            None => N2Information::default(),
        };
        let du = match topology.f1.first() {
            Some(relation) => F1RequirerData::from_bag(&store.remote_app_data(relation)?),
            None => F1RequirerData::default(),
        };
        let core = match topology.core_gnb.first() {
            Some(relation) => CoreGnbProviderData::from_bag(&store.remote_app_data(relation)?),
            None => CoreGnbProviderData::default(),
        };

        let facts = Self {
            n2,
            du_f1_port: du.f1_port,
            tac: core.tac,
            plmns: core.plmns,
        };
        debug!(?facts, "Resolved peer facts");
        Ok(facts)
    }

    /// TAC and PLMNs are both known
    pub fn identity_available(&self) -> bool {
        self.tac.is_some() && self.plmns.is_some()
    }
}

/// Data this unit publishes, one variant per relation interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Publication {
    F1(F1ProviderData),
    CoreGnb(CoreGnbRequirerData),
    GnbIdentity(GnbIdentityData),
}

impl Publication {
    pub fn to_bag(&self) -> Result<DataBag> {
        match self {
            Publication::F1(data) => data.to_bag(),
            Publication::CoreGnb(data) => Ok(data.to_bag()),
            Publication::GnbIdentity(data) => Ok(data.to_bag()),
        }
    }
}
