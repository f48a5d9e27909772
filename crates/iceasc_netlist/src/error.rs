//! Errors raised while building or editing a netlist.

use iceasc_arch::ArchError;
use iceasc_common::InternalError;

/// A netlist edit that would break one of the context's invariants.
#[derive(Debug, thiserror::Error)]
pub enum NetlistError {
    /// A cell with this name already exists.
    #[error("duplicate cell '{0}'")]
    DuplicateCell(String),

    /// A net with this name already exists.
    #[error("duplicate net '{0}'")]
    DuplicateNet(String),

    /// The bel already hosts another cell.
    #[error("bel {bel} is already occupied by cell '{cell}'")]
    BelOccupied {
        /// Bel name.
        bel: String,
        /// Name of the cell already placed there.
        cell: String,
    },

    /// The cell kind cannot be placed on this kind of bel.
    #[error("cell '{cell}' of type {cell_type} cannot be placed on bel {bel}")]
    BelKindMismatch {
        /// Cell name.
        cell: String,
        /// Cell type name.
        cell_type: &'static str,
        /// Bel name.
        bel: String,
    },

    /// The cell type has no port with this name.
    #[error("cell '{cell}' has no port '{port}'")]
    UnknownPort {
        /// Cell name.
        cell: String,
        /// Port name.
        port: String,
    },

    /// The port is already connected to a net.
    #[error("port '{port}' of cell '{cell}' is already connected")]
    PortConnected {
        /// Cell name.
        cell: String,
        /// Port name.
        port: String,
    },

    /// The net already has a driver.
    #[error("net '{net}' already has a driver")]
    MultipleDrivers {
        /// Net name.
        net: String,
    },

    /// The wire is already part of another net.
    #[error("wire {wire} already belongs to net '{net}'")]
    WireBound {
        /// Wire name.
        wire: String,
        /// Name of the owning net.
        net: String,
    },

    /// The pip is already used by another net.
    #[error("pip {pip} already belongs to net '{net}'")]
    PipBound {
        /// Pip name.
        pip: String,
        /// Name of the owning net.
        net: String,
    },

    /// The pip does not end on the wire it was bound with.
    #[error("pip {pip} does not drive wire {wire}")]
    PipMismatch {
        /// Pip name.
        pip: String,
        /// Wire name.
        wire: String,
    },

    /// The cell type has no parameter with this name.
    #[error("{cell_type} has no parameter '{name}'")]
    UnknownParam {
        /// Cell type name.
        cell_type: &'static str,
        /// Parameter name.
        name: String,
    },

    /// The value is not valid for the parameter.
    #[error("invalid value {value} for parameter '{name}' of {cell_type}")]
    InvalidParam {
        /// Cell type name.
        cell_type: &'static str,
        /// Parameter name.
        name: String,
        /// Rendered value.
        value: String,
    },

    /// A chip database lookup failed.
    #[error(transparent)]
    Arch(#[from] ArchError),

    /// Building the chip database failed.
    #[error(transparent)]
    Internal(#[from] InternalError),
}
