//! Charm configuration validation
//!
//! Raw `config-get` output is read into an intermediate input struct checked
//! with `validator`, then converted into a [`TypedConfig`]. Every violated
//! option is reported at once.

use super::types::{ConfigValue, RawConfig, TypedConfig};
use ipnet::Ipv4Net;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::net::Ipv4Addr;
use std::sync::LazyLock;
use tracing::debug;
use validator::{Validate, ValidationError};

pub(crate) static MCC_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{3}$").expect("MCC pattern is valid"));

pub(crate) static MNC_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2,3}$").expect("MNC pattern is valid"));

/// Default values, as declared by the charm's config options
pub mod defaults {
    pub const CNI_TYPE: &str = "bridge";
    pub const F1_INTERFACE_NAME: &str = "f1";
    pub const F1_IP_ADDRESS: &str = "192.168.254.7/24";
    pub const F1_PORT: i64 = 2152;
    pub const N2_INTERFACE_NAME: &str = "eth0";
    pub const N3_INTERFACE_NAME: &str = "n3";
    pub const N3_IP_ADDRESS: &str = "192.168.251.7/24";
    pub const N3_GATEWAY_IP: &str = "192.168.251.1";
    pub const UPF_SUBNET: &str = "192.168.252.0/24";
    pub const MCC: &str = "001";
    pub const MNC: &str = "01";
    pub const SST: i64 = 1;
    pub const TAC: i64 = 1;
}

/// Aggregate validation failure: every invalid option, sorted and deduplicated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    fields: Vec<String>,
}

impl FieldErrors {
    fn new(fields: BTreeSet<String>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    fn single(field: &str) -> Self {
        Self {
            fields: vec![field.to_string()],
        }
    }

    /// Offending option names in lexicographic order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quoted: Vec<String> = self.fields.iter().map(|f| format!("'{}'", f)).collect();
        write!(
            f,
            "The following configurations are not valid: [{}]",
            quoted.join(", ")
        )
    }
}

impl std::error::Error for FieldErrors {}

#[derive(Debug, Validate)]
struct ConfigInput {
    #[validate(custom(function = "validate_cni_type"))]
    cni_type: String,
    #[validate(length(min = 1))]
    f1_interface_name: String,
    #[validate(custom(function = "validate_ipv4_cidr"))]
    f1_ip_address: String,
    #[validate(range(min = 1, max = 65535))]
    f1_port: i64,
    #[validate(length(min = 1))]
    n2_interface_name: String,
    #[validate(length(min = 1))]
    n3_interface_name: String,
    #[validate(custom(function = "validate_ipv4_cidr"))]
    n3_ip_address: String,
    #[validate(custom(function = "validate_ipv4_address"))]
    n3_gateway_ip: String,
    #[validate(custom(function = "validate_ipv4_cidr"))]
    upf_subnet: String,
    #[validate(regex(path = *MCC_PATTERN))]
    mcc: String,
    #[validate(regex(path = *MNC_PATTERN))]
    mnc: String,
    #[validate(range(min = 1, max = 4))]
    sst: i64,
    #[validate(range(min = 1, max = 16_777_215))]
    tac: i64,
}

/// Reads typed values out of the raw map, remembering options of the wrong type
struct RawReader<'a> {
    raw: &'a RawConfig,
    invalid: BTreeSet<String>,
}

impl<'a> RawReader<'a> {
    fn new(raw: &'a RawConfig) -> Self {
        Self {
            raw,
            invalid: BTreeSet::new(),
        }
    }

    fn text(&mut self, key: &str, default: &str) -> String {
        match self.raw.get(key) {
            None => default.to_string(),
            Some(ConfigValue::Str(value)) => value.clone(),
            Some(_) => {
                self.invalid.insert(key.to_string());
                default.to_string()
            }
        }
    }

    fn integer(&mut self, key: &str, default: i64) -> i64 {
        match self.raw.get(key) {
            None => default,
            Some(ConfigValue::Int(value)) => *value,
            Some(ConfigValue::Str(value)) => match value.trim().parse::<i64>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    self.invalid.insert(key.to_string());
                    default
                }
            },
            Some(_) => {
                self.invalid.insert(key.to_string());
                default
            }
        }
    }
}

impl ConfigInput {
    fn read(reader: &mut RawReader<'_>) -> Self {
        Self {
            cni_type: reader.text("cni-type", defaults::CNI_TYPE),
            f1_interface_name: reader.text("f1-interface-name", defaults::F1_INTERFACE_NAME),
            f1_ip_address: reader.text("f1-ip-address", defaults::F1_IP_ADDRESS),
            f1_port: reader.integer("f1-port", defaults::F1_PORT),
            n2_interface_name: reader.text("n2-interface-name", defaults::N2_INTERFACE_NAME),
            n3_interface_name: reader.text("n3-interface-name", defaults::N3_INTERFACE_NAME),
            n3_ip_address: reader.text("n3-ip-address", defaults::N3_IP_ADDRESS),
            n3_gateway_ip: reader.text("n3-gateway-ip", defaults::N3_GATEWAY_IP),
            upf_subnet: reader.text("upf-subnet", defaults::UPF_SUBNET),
            mcc: reader.text("mcc", defaults::MCC),
            mnc: reader.text("mnc", defaults::MNC),
            sst: reader.integer("sst", defaults::SST),
            tac: reader.integer("tac", defaults::TAC),
        }
    }

    fn into_typed(self) -> Result<TypedConfig, FieldErrors> {
        Ok(TypedConfig {
            cni_type: field(self.cni_type.parse(), "cni-type")?,
            f1_interface_name: self.f1_interface_name,
            f1_ip_address: field(self.f1_ip_address.parse::<Ipv4Net>(), "f1-ip-address")?,
            f1_port: field(u16::try_from(self.f1_port), "f1-port")?,
            n2_interface_name: self.n2_interface_name,
            n3_interface_name: self.n3_interface_name,
            n3_ip_address: field(self.n3_ip_address.parse::<Ipv4Net>(), "n3-ip-address")?,
            n3_gateway_ip: field(self.n3_gateway_ip.parse::<Ipv4Addr>(), "n3-gateway-ip")?,
            upf_subnet: field(self.upf_subnet.parse::<Ipv4Net>(), "upf-subnet")?,
            mcc: self.mcc,
            mnc: self.mnc,
            sst: field(u8::try_from(self.sst), "sst")?,
            tac: field(u32::try_from(self.tac), "tac")?,
        })
    }
}

fn field<T, E>(result: Result<T, E>, name: &str) -> Result<T, FieldErrors> {
    result.map_err(|_| FieldErrors::single(name))
}

fn validate_cni_type(value: &str) -> Result<(), ValidationError> {
    match value {
        "bridge" | "macvlan" => Ok(()),
        _ => Err(ValidationError::new("cni_type")),
    }
}

fn validate_ipv4_cidr(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<Ipv4Net>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("ipv4_cidr"))
}

fn validate_ipv4_address(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<Ipv4Addr>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("ipv4_address"))
}

fn to_kebab(name: &str) -> String {
    name.replace('_', "-")
}

/// Validate raw charm configuration into a [`TypedConfig`]
pub fn validate(raw: &RawConfig) -> Result<TypedConfig, FieldErrors> {
    let mut reader = RawReader::new(raw);
    let input = ConfigInput::read(&mut reader);
    let mut invalid = reader.invalid;

    if let Err(errors) = input.validate() {
        invalid.extend(errors.field_errors().keys().map(|name| to_kebab(name)));
    }

    if !invalid.is_empty() {
        let errors = FieldErrors::new(invalid);
        debug!("Charm configuration rejected: {}", errors);
        return Err(errors);
    }

    input.into_typed()
}
