use super::{encode_plmns, parse_port, DataBag, Plmn};
use crate::error::Result;
use std::net::Ipv4Addr;

/// Data the DU publishes over `fiveg_f1`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct F1RequirerData {
    pub f1_port: Option<u16>,
}

impl F1RequirerData {
    pub fn from_bag(bag: &DataBag) -> Self {
        Self {
            f1_port: parse_port(bag.get("f1_port")),
        }
    }
}

/// Data the CU publishes over `fiveg_f1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct F1ProviderData {
    pub ip_address: Ipv4Addr,
    pub port: u16,
    pub tac: u32,
    pub plmns: Vec<Plmn>,
}

impl F1ProviderData {
    pub fn to_bag(&self) -> Result<DataBag> {
        let mut bag = DataBag::new();
        bag.insert("f1_ip_address".to_string(), self.ip_address.to_string());
        bag.insert("f1_port".to_string(), self.port.to_string());
        bag.insert("tac".to_string(), self.tac.to_string());
        bag.insert("plmns".to_string(), encode_plmns(&self.plmns)?);
        Ok(bag)
    }
}
