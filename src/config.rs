use serde::{Deserialize, Serialize};

use crate::db::enums::InterfaceKind;

/// Tunables for the propagation engine. Deserializable so deployments
/// can override the defaults from their service configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Order in which interface categories are tried when an item type
    /// accepts any interface.
    pub interface_priority: Vec<InterfaceKind>,
    /// History tables swept by the housekeeper when items are deleted.
    pub history_tables: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interface_priority: vec![
                InterfaceKind::Agent,
                InterfaceKind::Snmp,
                InterfaceKind::Jmx,
                InterfaceKind::Ipmi,
            ],
            history_tables: [
                "history",
                "history_str",
                "history_uint",
                "history_log",
                "history_text",
                "trends",
                "trends_uint",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}
