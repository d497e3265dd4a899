use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostStatus {
    Monitored,
    NotMonitored,
    Template,
}

/// Collection categories an interface can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceKind {
    Agent,
    Snmp,
    Ipmi,
    Jmx,
}

impl fmt::Display for InterfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InterfaceKind::Agent => "agent",
            InterfaceKind::Snmp => "SNMP",
            InterfaceKind::Ipmi => "IPMI",
            InterfaceKind::Jmx => "JMX",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Agent,
    AgentActive,
    SnmpV1,
    SnmpV2,
    SnmpV3,
    Trapper,
    Internal,
    Aggregate,
    External,
    DbMonitor,
    Ipmi,
    Ssh,
    Telnet,
    Calculated,
    Jmx,
    WebCheck,
}

/// What kind of interface an item of this type must be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceRequirement {
    /// The item never talks to the host directly.
    None,
    /// Any interface will do, picked by configured priority.
    Any,
    /// Exactly this category is required.
    Kind(InterfaceKind),
}

impl ItemType {
    pub fn interface_requirement(self) -> InterfaceRequirement {
        match self {
            ItemType::Agent => InterfaceRequirement::Kind(InterfaceKind::Agent),
            ItemType::SnmpV1 | ItemType::SnmpV2 | ItemType::SnmpV3 => {
                InterfaceRequirement::Kind(InterfaceKind::Snmp)
            }
            ItemType::Ipmi => InterfaceRequirement::Kind(InterfaceKind::Ipmi),
            ItemType::Jmx => InterfaceRequirement::Kind(InterfaceKind::Jmx),
            ItemType::External | ItemType::Ssh | ItemType::Telnet => InterfaceRequirement::Any,
            ItemType::AgentActive
            | ItemType::Trapper
            | ItemType::Internal
            | ItemType::Aggregate
            | ItemType::DbMonitor
            | ItemType::Calculated
            | ItemType::WebCheck => InterfaceRequirement::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Float,
    Character,
    Log,
    Unsigned,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    Enabled,
    Disabled,
}

/// How an entity relates to low-level discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryFlag {
    /// A plain, manually defined entity.
    Normal,
    /// A prototype that discovery stamps real entities from.
    Prototype,
    /// A real entity created from a prototype by discovery.
    Discovered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisScale {
    /// Fixed numeric bound.
    Fixed,
    /// Bound tracks the last value of a referenced item.
    ItemValue,
    /// Calculated from the drawn data.
    Calculated,
}

/// Entity categories referenced by screens, favorites and similar
/// presentation rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Item,
    Trigger,
    Graph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Host,
    TemplateLink,
    Application,
    Item,
    Trigger,
    Graph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Link,
    Unlink,
}
