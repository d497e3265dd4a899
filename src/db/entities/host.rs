use serde::{Deserialize, Serialize};

use crate::db::enums::{HostStatus, InterfaceKind};

/// A monitored host or a template. Templates are hosts with
/// `status == HostStatus::Template` and carry no interfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    pub host_id: u64,
    pub name: String,
    pub status: HostStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    pub interface_id: u64,
    pub host_id: u64,
    pub kind: InterfaceKind,
    /// Whether this is the default interface of its kind on the host.
    pub main: bool,
    pub address: String,
    pub port: u16,
}

/// One host-to-template attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateLink {
    pub link_id: u64,
    pub host_id: u64,
    pub template_id: u64,
}
