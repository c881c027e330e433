//! Network facts
//!
//! This unit's address and the N3 route towards the UPF subnet.

use ipnet::Ipv4Net;
use std::net::Ipv4Addr;
use tracing::{debug, warn};

use crate::config::TypedConfig;
use crate::error::Result;
use crate::operator::UnitModel;
use crate::workload::Workload;

/// Static route from the N3 interface to the UPF subnet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct N3Route {
    pub destination: Ipv4Net,
    pub gateway: Ipv4Addr,
}

impl N3Route {
    pub fn from_config(config: &TypedConfig) -> Self {
        Self {
            destination: config.upf_subnet.trunc(),
            gateway: config.n3_gateway_ip,
        }
    }

    /// Command listing the routing table
    pub fn show_command() -> Vec<String> {
        vec!["ip".to_string(), "route".to_string(), "show".to_string()]
    }

    /// Command creating (or replacing) the route
    pub fn replace_command(&self) -> Vec<String> {
        vec![
            "ip".to_string(),
            "route".to_string(),
            "replace".to_string(),
            self.destination.to_string(),
            "via".to_string(),
            self.gateway.to_string(),
        ]
    }

    /// Whether `ip route show` output contains this route
    ///
    /// `ip` prints host routes without the `/32` suffix, so the destination
    /// token is parsed rather than compared as text.
    pub fn is_present_in(&self, route_table: &str) -> bool {
        route_table.lines().any(|line| {
            let mut tokens = line.split_whitespace();
            let Some(destination) = tokens.next().and_then(parse_destination) else {
                return false;
            };
            destination == self.destination
                && tokens.next() == Some("via")
                && tokens
                    .next()
                    .and_then(|gateway| gateway.parse::<Ipv4Addr>().ok())
                    == Some(self.gateway)
        })
    }
}

fn parse_destination(token: &str) -> Option<Ipv4Net> {
    token
        .parse::<Ipv4Net>()
        .ok()
        .or_else(|| token.parse::<Ipv4Addr>().ok().map(Ipv4Net::from))
}

/// Parse the address reported by the runtime
pub fn parse_address(raw: &str) -> Option<Ipv4Addr> {
    raw.trim().parse().ok()
}

/// Environment facts gathered for one invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkFacts {
    /// This unit's address, if assigned yet
    pub address: Option<Ipv4Addr>,
    /// Whether the N3 route exists; `None` when it could not be inspected
    pub route_exists: Option<bool>,
}

impl NetworkFacts {
    /// Resolve the unit address and, when a workload and route are given, the route state
    pub fn resolve(
        unit: &dyn UnitModel,
        workload: Option<&dyn Workload>,
        route: Option<&N3Route>,
    ) -> Result<Self> {
        let address = unit.private_address()?.as_deref().and_then(parse_address);
        if address.is_none() {
            warn!("Pod IP address not available");
        }

        let route_exists = match (workload, route) {
            (Some(workload), Some(route)) => {
                let table = workload.exec(&N3Route::show_command())?;
                let present = route.is_present_in(&table);
                debug!(route = ?route, present, "Checked N3 route");
                Some(present)
            }
            _ => None,
        };

        Ok(Self {
            address,
            route_exists,
        })
    }
}
