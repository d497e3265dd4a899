use serde::{Deserialize, Serialize};

/// A named grouping of items on one host. Inherited applications keep a
/// back-reference to the template application they came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub application_id: u64,
    pub host_id: u64,
    pub name: String,
    pub template_id: Option<u64>,
}

/// Membership of an item in an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemApplication {
    pub item_application_id: u64,
    pub application_id: u64,
    pub item_id: u64,
}
