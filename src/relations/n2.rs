use super::{parse_port, DataBag};
use std::net::IpAddr;

/// AMF endpoint published over `fiveg_n2`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct N2Information {
    pub amf_hostname: Option<String>,
    pub amf_ip_address: Option<IpAddr>,
    pub amf_port: Option<u16>,
}

impl N2Information {
    pub fn from_bag(bag: &DataBag) -> Self {
        Self {
            amf_hostname: bag
                .get("amf_hostname")
                .map(|host| host.trim().to_string())
                .filter(|host| !host.is_empty()),
            amf_ip_address: bag
                .get("amf_ip_address")
                .and_then(|ip| ip.trim().parse().ok()),
            amf_port: parse_port(bag.get("amf_port")),
        }
    }
}
