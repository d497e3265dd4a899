use serde::{Deserialize, Serialize};

use crate::db::enums::{AxisScale, DiscoveryFlag};

/// A chart drawing one or more items. Graphs belong to whichever hosts
/// own the items they draw; `name` is unique among the graphs of a
/// host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub graph_id: u64,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub ymin_type: AxisScale,
    pub ymax_type: AxisScale,
    pub ymin: f64,
    pub ymax: f64,
    /// Item driving the lower bound when `ymin_type` is `ItemValue`.
    pub ymin_item_id: Option<u64>,
    pub ymax_item_id: Option<u64>,
    pub show_legend: bool,
    pub flags: DiscoveryFlag,
    pub template_id: Option<u64>,
}

/// One drawn line of a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphItem {
    pub graph_item_id: u64,
    pub graph_id: u64,
    pub item_id: u64,
    pub draw_type: u8,
    pub sort_order: u8,
    pub color: String,
    pub y_side: u8,
    /// Aggregation applied when one pixel covers several values.
    pub calc_fnc: u8,
}

/// Prototype ancestry row for graphs spawned by discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDiscovery {
    pub graph_id: u64,
    pub parent_graph_id: u64,
}
