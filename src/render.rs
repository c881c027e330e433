//! CU configuration rendering
//!
//! A pure function from the validated config and the resolved facts to the
//! text of `cu.conf`. Identical inputs always produce identical text.

use std::net::IpAddr;
use tracing::{info, warn};

use crate::config::TypedConfig;
use crate::network::NetworkFacts;
use crate::relations::{PeerFacts, Plmn};

/// F1 port assumed for the DU until it publishes its own
pub const DU_F1_DEFAULT_PORT: u16 = 2153;

/// Outcome of rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedConfig {
    /// A required input (unit address, AMF address) is missing
    Undefined,
    Defined(String),
}

impl RenderedConfig {
    pub fn text(&self) -> Option<&str> {
        match self {
            RenderedConfig::Undefined => None,
            RenderedConfig::Defined(text) => Some(text),
        }
    }

    /// Whether `persisted` already holds this config, ignoring surrounding whitespace
    pub fn matches(&self, persisted: Option<&str>) -> bool {
        match (self.text(), persisted) {
            (Some(desired), Some(current)) => desired.trim() == current.trim(),
            _ => false,
        }
    }
}

/// TAC and PLMNs the CU serves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub tac: u32,
    pub plmns: Vec<Plmn>,
}

/// Identity advertised by the core network, or the configured one until it is
pub fn effective_identity(config: &TypedConfig, peers: &PeerFacts) -> Identity {
    match (peers.tac, &peers.plmns) {
        (Some(tac), Some(plmns)) => Identity {
            tac,
            plmns: plmns.clone(),
        },
        _ => Identity {
            tac: config.tac,
            plmns: vec![Plmn::new(
                config.mcc.clone(),
                config.mnc.clone(),
                config.sst,
                None,
            )],
        },
    }
}

/// F1 port advertised by the DU, or [`DU_F1_DEFAULT_PORT`]
pub fn effective_du_port(peers: &PeerFacts) -> u16 {
    match peers.du_f1_port {
        Some(port) => port,
        None => {
            info!(
                "DU F1 port information not available. Using default value {}",
                DU_F1_DEFAULT_PORT
            );
            DU_F1_DEFAULT_PORT
        }
    }
}

/// Everything the CU config depends on
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub gnb_name: &'a str,
    pub config: &'a TypedConfig,
    pub peers: &'a PeerFacts,
    pub network: &'a NetworkFacts,
}

/// Render `cu.conf`
pub fn render(input: &RenderInput<'_>) -> RenderedConfig {
    let Some(pod_ip) = input.network.address else {
        warn!("Pod IP address not available");
        return RenderedConfig::Undefined;
    };
    let Some(amf_ip) = input.peers.n2.amf_ip_address else {
        warn!("AMF IP address not available");
        return RenderedConfig::Undefined;
    };

    let config = input.config;
    let identity = effective_identity(config, input.peers);
    let du_f1_port = effective_du_port(input.peers);

    let gnb_name = input.gnb_name;
    let tac = identity.tac;
    let plmn_list = render_plmn_list(&identity.plmns);
    let f1_if = &config.f1_interface_name;
    let f1_ip = config.f1_ip_address.addr();
    let cu_f1_port = config.f1_port;
    let n2_if = &config.n2_interface_name;
    let n3_if = &config.n3_interface_name;
    let n3_ip = config.n3_ip_address.addr();
    let (amf_ipv4, amf_ipv6, amf_preference) = match amf_ip {
        IpAddr::V4(v4) => (v4.to_string(), "::1".to_string(), "ipv4"),
        IpAddr::V6(v6) => ("127.0.0.1".to_string(), v6.to_string(), "ipv6"),
    };

    RenderedConfig::Defined(format!(
        r#"Active_gNBs = ( "{gnb_name}");
Asn1_verbosity = "none";
sa = 1;

gNBs =
(
  {{
    gNB_ID = 0xe00;
    gNB_name = "{gnb_name}";

    tracking_area_code = {tac};
    plmn_list = ({plmn_list});

    nr_cellid = 12345678L;

    tr_s_preference = "f1";

    local_s_if_name = "{f1_if}";
    local_s_address = "{f1_ip}";
    remote_s_address = "0.0.0.0";
    local_s_portc = 501;
    local_s_portd = {cu_f1_port};
    remote_s_portc = 500;
    remote_s_portd = {du_f1_port};

    SCTP :
    {{
      SCTP_INSTREAMS = 2;
      SCTP_OUTSTREAMS = 2;
    }};

    amf_ip_address = (
      {{
        ipv4 = "{amf_ipv4}";
        ipv6 = "{amf_ipv6}";
        active = "yes";
        preference = "{amf_preference}";
      }}
    );

    NETWORK_INTERFACES :
    {{
      GNB_INTERFACE_NAME_FOR_NG_AMF = "{n2_if}";
      GNB_IPV4_ADDRESS_FOR_NG_AMF = "{pod_ip}";
      GNB_INTERFACE_NAME_FOR_NGU = "{n3_if}";
      GNB_IPV4_ADDRESS_FOR_NGU = "{n3_ip}";
      GNB_PORT_FOR_S1U = 2152;
    }};
  }}
);

security = {{
  ciphering_algorithms = ( "nea0" );
  integrity_algorithms = ( "nia2", "nia0" );
  drb_ciphering = "yes";
  drb_integrity = "no";
}};

log_config : {{
  global_log_level = "info";
  hw_log_level = "info";
  phy_log_level = "info";
  mac_log_level = "info";
  rlc_log_level = "info";
  pdcp_log_level = "info";
  rrc_log_level = "info";
  f1ap_log_level = "info";
  ngap_log_level = "debug";
}};
"#
    ))
}

fn render_plmn_list(plmns: &[Plmn]) -> String {
    plmns
        .iter()
        .map(|plmn| {
            let sd = plmn
                .sd
                .map(|sd| format!(" sd = 0x{:06x};", sd))
                .unwrap_or_default();
            format!(
                "{{ mcc = {}; mnc = {}; mnc_length = {}; snssaiList = ( {{ sst = {};{} }} ); }}",
                plmn.mcc,
                plmn.mnc,
                plmn.mnc.len(),
                plmn.sst,
                sd
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}
