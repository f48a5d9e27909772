//! Placed and routed netlists for iCE40 devices.
//!
//! A [`Context`] owns the cells and nets of one design and binds them to the
//! chip database: cells to bels, nets to wires and the pips that drive them.
//! Cell parameters are typed per primitive kind ([`CellKind`]) and can also
//! be addressed by their conventional names through [`ParamValue`].

#![warn(missing_docs)]

pub mod cell;
pub mod context;
pub mod error;
pub mod ids;
pub mod net;
pub mod params;

pub use cell::{
    Cell, CellKind, DspParams, HfoscParams, IoParams, LcParams, PllParams, Port, RamParams,
    RgbaParams, GROUND_CELL_NAME, RAM_INIT_WIDTH, RAM_INIT_WORDS,
};
pub use context::Context;
pub use error::NetlistError;
pub use ids::{CellId, NetId};
pub use net::{Net, NetWire, PortRef};
pub use params::{FeedbackPath, ParamType, ParamValue, PullupResistor};
