use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// A single raw configuration value as reported by the runtime (`config-get`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Str(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::Str(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Int(value)
    }
}

/// Raw charm configuration, keyed by kebab-case option name
pub type RawConfig = BTreeMap<String, ConfigValue>;

/// CNI plugin used for the F1 and N3 network attachments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CniType {
    Bridge,
    Macvlan,
}

impl CniType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CniType::Bridge => "bridge",
            CniType::Macvlan => "macvlan",
        }
    }
}

impl fmt::Display for CniType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CniType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bridge" => Ok(CniType::Bridge),
            "macvlan" => Ok(CniType::Macvlan),
            other => Err(format!("unsupported CNI type: {}", other)),
        }
    }
}

/// Validated charm configuration.
///
/// Only [`crate::config::validate`] builds this type, so holding one means
/// every field passed its constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct TypedConfig {
    /// CNI plugin for the F1 / N3 attachments
    pub cni_type: CniType,
    /// In-pod name of the F1 interface
    pub f1_interface_name: String,
    /// F1 address with prefix length
    pub f1_ip_address: Ipv4Net,
    /// Local F1 port
    pub f1_port: u16,
    /// In-pod name of the interface facing the AMF
    pub n2_interface_name: String,
    /// In-pod name of the N3 interface
    pub n3_interface_name: String,
    /// N3 address with prefix length
    pub n3_ip_address: Ipv4Net,
    /// Gateway towards the UPF subnet
    pub n3_gateway_ip: Ipv4Addr,
    /// UPF subnet reached through the N3 gateway
    pub upf_subnet: Ipv4Net,
    /// Mobile Country Code (3 digits)
    pub mcc: String,
    /// Mobile Network Code (2 or 3 digits)
    pub mnc: String,
    /// Slice/Service Type
    pub sst: u8,
    /// Tracking Area Code
    pub tac: u32,
}
