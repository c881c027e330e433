use super::{parse_plmns, parse_tac, DataBag, Plmn};

/// Identity the core network publishes over `fiveg_core_gnb`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreGnbProviderData {
    pub tac: Option<u32>,
    pub plmns: Option<Vec<Plmn>>,
}

impl CoreGnbProviderData {
    pub fn from_bag(bag: &DataBag) -> Self {
        Self {
            tac: parse_tac(bag.get("tac")),
            plmns: bag.get("plmns").and_then(|raw| parse_plmns(raw)),
        }
    }
}

/// Name the CU publishes over `fiveg_core_gnb`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreGnbRequirerData {
    pub cu_name: String,
}

impl CoreGnbRequirerData {
    pub fn to_bag(&self) -> DataBag {
        DataBag::from([("cu_name".to_string(), self.cu_name.clone())])
    }
}
