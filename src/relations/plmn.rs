use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::config::{MCC_PATTERN, MNC_PATTERN};

/// Mobile network identity advertised over relations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Plmn {
    /// Mobile Country Code
    #[validate(regex(path = *MCC_PATTERN))]
    pub mcc: String,
    /// Mobile Network Code
    #[validate(regex(path = *MNC_PATTERN))]
    pub mnc: String,
    /// Slice/Service Type
    pub sst: u8,
    /// Slice Differentiator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(max = 16_777_215))]
    pub sd: Option<u32>,
}

impl Plmn {
    pub fn new(mcc: impl Into<String>, mnc: impl Into<String>, sst: u8, sd: Option<u32>) -> Self {
        Self {
            mcc: mcc.into(),
            mnc: mnc.into(),
            sst,
            sd,
        }
    }
}

/// Parse a `plmns` relation field.
///
/// Returns `None` when the value is not a JSON array of well-formed PLMNs or
/// when the array is empty.
pub fn parse_plmns(raw: &str) -> Option<Vec<Plmn>> {
    let plmns: Vec<Plmn> = serde_json::from_str(raw).ok()?;
    if plmns.is_empty() || plmns.iter().any(|plmn| plmn.validate().is_err()) {
        return None;
    }
    Some(plmns)
}

/// Encode PLMNs for a relation data bag
pub fn encode_plmns(plmns: &[Plmn]) -> serde_json::Result<String> {
    serde_json::to_string(plmns)
}
