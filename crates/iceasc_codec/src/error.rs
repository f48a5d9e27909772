//! Error types for reading and writing ASC text.

use iceasc_common::InternalError;
use iceasc_netlist::NetlistError;
use serde::{Deserialize, Serialize};

/// The grammar rule a line of ASC text broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum FormatErrorKind {
    /// The text never selects a device, or carries data before doing so.
    #[error("no device selected")]
    NoDevice,
    /// A second `.device` line.
    #[error("device selected more than once")]
    MultipleDevices,
    /// A `.device` line after tile data.
    #[error("device selected after tile data")]
    DeviceAfterTile,
    /// The device token and package name no chip.
    #[error("unknown device")]
    UnknownDevice,
    /// A tile header with fewer than two coordinates.
    #[error("missing tile coordinate")]
    MissingCoord,
    /// A coordinate that is not an integer.
    #[error("coordinate is not a number")]
    InvalidNumber,
    /// A negative coordinate.
    #[error("negative tile coordinate")]
    NegativeCoord,
    /// A coordinate with no tile.
    #[error("tile coordinate out of range")]
    CoordOutOfRange,
    /// A tile header whose type differs from the device grid.
    #[error("tile type does not match the device")]
    TileTypeMismatch,
    /// A tile given twice.
    #[error("tile given more than once")]
    DuplicateTile,
    /// A row character other than a binary (or hex, for RAM data) digit.
    #[error("unexpected symbol in row")]
    WrongSymbol,
    /// A row narrower than its tile.
    #[error("row too short")]
    RowTooShort,
    /// A row wider than its tile.
    #[error("row too long")]
    RowTooLong,
    /// More rows than the tile type has.
    #[error("extra row")]
    ExtraRow,
    /// Fewer rows than the tile type has.
    #[error("missing row")]
    MissingRow,
    /// A `.wire` record without a wire name.
    #[error("missing wire name")]
    MissingWireId,
    /// A `.net` record without a name.
    #[error("missing net name")]
    MissingNetName,
    /// A `.wire` record outside a `.net` block.
    #[error("wire record outside a net")]
    WireOutsideNet,
    /// A wire name the device does not have.
    #[error("unknown wire")]
    UnknownWire,
    /// A pip name the device does not have, or one not driving its wire.
    #[error("unknown pip")]
    UnknownPip,
    /// An unrecognised directive.
    #[error("unknown directive")]
    UnknownDirective,
    /// A data line outside any block.
    #[error("unexpected line")]
    UnexpectedLine,
}

/// A grammar violation, with the line it occurred on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {kind}: `{text}`")]
pub struct FormatError {
    /// The violated rule.
    pub kind: FormatErrorKind,
    /// 1-based line number; one past the last line for end-of-input errors.
    pub line: usize,
    /// The offending line, trimmed.
    pub text: String,
}

impl FormatError {
    pub(crate) fn new(kind: FormatErrorKind, line: usize, text: &str) -> Self {
        Self {
            kind,
            line,
            text: text.to_string(),
        }
    }
}

/// A configuration field holding a code with no meaning.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("undefined {field} code {value} for {bel} in tile ({x}, {y})")]
pub struct DecodeError {
    /// Tile column.
    pub x: u32,
    /// Tile row.
    pub y: u32,
    /// Full bel name.
    pub bel: String,
    /// Field name.
    pub field: &'static str,
    /// The raw field value.
    pub value: u64,
}

/// A netlist that cannot be expressed as configuration bits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// A cell without placement.
    #[error("cell '{cell}' is not placed")]
    Unplaced {
        /// Cell name.
        cell: String,
    },
    /// A cell placed on a bel of another kind.
    #[error("cell '{cell}' of type {cell_type} cannot be placed on {bel}")]
    KindMismatch {
        /// Cell name.
        cell: String,
        /// Cell type name.
        cell_type: &'static str,
        /// Bel name.
        bel: String,
    },
    /// A parameter that does not fit its field.
    #[error("parameter {param} = {value} of cell '{cell}' cannot be encoded")]
    ParamOutOfRange {
        /// Cell name.
        cell: String,
        /// Parameter name.
        param: String,
        /// Rendered value.
        value: String,
    },
    /// Two cells disagree on a setting shared by their tile.
    #[error("conflicting {field} settings in tile ({x}, {y})")]
    TileSettingConflict {
        /// Tile column.
        x: u32,
        /// Tile row.
        y: u32,
        /// Shared field name.
        field: &'static str,
    },
    /// Two pips select different inputs of the same mux.
    #[error("pip {pip} conflicts with {other}")]
    PipConflict {
        /// The pip being written.
        pip: String,
        /// The pip already occupying the mux.
        other: String,
    },
    /// A net wire whose pip drives another wire.
    #[error("net '{net}' binds {wire} through {pip}, which drives another wire")]
    PipWireMismatch {
        /// Net name.
        net: String,
        /// Wire name.
        wire: String,
        /// Pip name.
        pip: String,
    },
}

/// Any failure of the codec.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Malformed ASC text.
    #[error(transparent)]
    Format(#[from] FormatError),
    /// Undefined configuration codes.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// Netlist that cannot be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),
    /// Netlist construction failed.
    #[error(transparent)]
    Netlist(#[from] NetlistError),
    /// Reading or writing the text failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A broken internal invariant.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl CodecError {
    /// The grammar rule broken, if this is a format error.
    pub fn format_kind(&self) -> Option<FormatErrorKind> {
        match self {
            CodecError::Format(e) => Some(e.kind),
            _ => None,
        }
    }
}
