//! Nets: routed groups of wires with a driver and users.

use crate::ids::CellId;
use iceasc_arch::{PipId, WireId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A reference to one port of one cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRef {
    /// The cell.
    pub cell: CellId,
    /// Port name.
    pub port: String,
}

/// A wire bound to a net, with the pip that drives it inside the net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetWire {
    /// The wire.
    pub wire: WireId,
    /// The uphill pip, `None` at the net's source.
    pub pip: Option<PipId>,
}

/// A logical net.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Net {
    /// Unique net name.
    pub name: String,
    /// Driving port; `None` for constant nets and undriven fragments.
    pub driver: Option<PortRef>,
    /// Reading ports.
    pub users: Vec<PortRef>,
    /// Routing, keyed by wire.
    pub wires: BTreeMap<WireId, NetWire>,
    /// Whether the net carries the implicit constant of an unused logic
    /// cell output.
    pub constant: bool,
}

impl Net {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            driver: None,
            users: Vec::new(),
            wires: BTreeMap::new(),
            constant: false,
        }
    }

    /// Whether the net has no routing.
    pub fn is_unrouted(&self) -> bool {
        self.wires.is_empty()
    }
}
