use super::DataBag;

/// gNB name and TAC published over `fiveg_gnb_identity`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GnbIdentityData {
    pub gnb_name: String,
    pub tac: u32,
}

impl GnbIdentityData {
    pub fn to_bag(&self) -> DataBag {
        DataBag::from([
            ("gnb_name".to_string(), self.gnb_name.clone()),
            ("tac".to_string(), self.tac.to_string()),
        ])
    }
}
