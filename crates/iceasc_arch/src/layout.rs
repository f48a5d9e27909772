//! Configuration bit layout: where mux selects and bel fields live.
//!
//! Every position here is (row, column) inside a 16-row tile. Field values
//! are stored least significant bit first across the listed positions.

use crate::bel::{BelInfo, BelKind};
use crate::chip::Family;
use serde::{Deserialize, Serialize};

/// Physical position of each truth-table bit among the 20 logic-cell bits.
pub const LUT_PHYSICAL_ORDER: [u8; 16] = [4, 14, 15, 5, 6, 16, 17, 7, 3, 13, 12, 2, 1, 11, 10, 0];

/// Logic-cell bit index of the carry enable.
pub const LC_CARRY_ENABLE: u8 = 8;
/// Logic-cell bit index of the flip-flop enable.
pub const LC_DFF_ENABLE: u8 = 9;
/// Logic-cell bit index of the set-not-reset flag.
pub const LC_SET_NORESET: u8 = 18;
/// Logic-cell bit index of the asynchronous set/reset flag.
pub const LC_ASYNC_SR: u8 = 19;
/// Number of configuration bits owned by one logic cell.
pub const LC_BITS: u8 = 20;

/// First column of the logic-cell bit block.
const LC_COL: u8 = 36;

/// Column of the local-track muxes in I/O tiles and everywhere else.
pub(crate) const IO_LOCAL_COL: u8 = 0;
pub(crate) const LOCAL_COL: u8 = 14;
/// Column of the span-4 muxes in I/O tiles and everywhere else.
pub(crate) const IO_SPAN_COL: u8 = 4;
pub(crate) const SPAN_COL: u8 = 18;
/// Column of the clock, enable and set/reset muxes of logic, DSP and RAM tiles.
pub(crate) const GLOBAL_MUX_COL: u8 = 2;
/// First column of the logic-cell input muxes.
pub(crate) const LC_INPUT_COL: u8 = 26;
/// First column of the RAM input muxes.
pub(crate) const RAM_INPUT_COL: u8 = 22;
/// Column of the I/O pin and PLL input muxes.
pub(crate) const IO_PIN_COL: u8 = 7;
/// Column of the I/O tile global muxes (inclk, outclk, cen, fabout).
pub(crate) const IO_GLOBAL_COL: u8 = 13;
/// Column of the hard-IP input muxes.
pub(crate) const IP_INPUT_COL: u8 = 26;
/// Position of the single carry-chain pip bit.
pub(crate) const CARRY_PIP: (u8, u8) = (1, 50);

/// Field names shared by the layout tables and the codec.
pub mod names {
    /// Truth table of a logic cell, in physical order.
    pub const LUT_INIT: &str = "LUT_INIT";
    /// Carry chain enable.
    pub const CARRY_ENABLE: &str = "CARRY_ENABLE";
    /// Flip-flop enable.
    pub const DFF_ENABLE: &str = "DFF_ENABLE";
    /// Flip-flop initialises/sets to one.
    pub const SET_NORESET: &str = "SET_NORESET";
    /// Asynchronous set/reset.
    pub const ASYNC_SR: &str = "ASYNC_SR";
    /// Inverted clock, shared by the whole logic tile.
    pub const NEG_CLK: &str = "NEG_CLK";
    /// Constant one on the carry input of the first cell.
    pub const CIN_SET: &str = "CIN_SET";
    /// I/O pin type.
    pub const PIN_TYPE: &str = "PIN_TYPE";
    /// Inverted I/O clocks, shared by the whole I/O tile.
    pub const NEG_TRIGGER: &str = "NEG_TRIGGER";
    /// Pull-up disabled.
    pub const PULLUP_OFF: &str = "PULLUP_OFF";
    /// I/O cell in use.
    pub const IO_ENABLE: &str = "IO_ENABLE";
    /// Differential input.
    pub const LVDS: &str = "LVDS";
    /// Pull-up strength code (UltraPlus only).
    pub const PULLUP_RESISTOR: &str = "PULLUP_RESISTOR";
    /// Inverted write clock.
    pub const NEG_CLK_W: &str = "NEG_CLK_W";
    /// Inverted read clock.
    pub const NEG_CLK_R: &str = "NEG_CLK_R";
    /// Write port geometry.
    pub const WRITE_MODE: &str = "WRITE_MODE";
    /// Read port geometry.
    pub const READ_MODE: &str = "READ_MODE";
    /// Block RAM powered.
    pub const POWER_UP: &str = "POWER_UP";
    /// Generic block enable.
    pub const ENABLE: &str = "ENABLE";
    /// High-frequency oscillator divider.
    pub const CLKHF_DIV: &str = "CLKHF_DIV";
    /// LED driver current mode.
    pub const CURRENT_MODE: &str = "CURRENT_MODE";
    /// LED driver channel currents.
    pub const RGB_CURRENT: [&str; 3] = ["RGB0_CURRENT", "RGB1_CURRENT", "RGB2_CURRENT"];
    /// PLL type.
    pub const PLLTYPE: &str = "PLLTYPE";
    /// PLL feedback path.
    pub const FEEDBACK_PATH: &str = "FEEDBACK_PATH";
}

/// MAC16 mode fields and their widths, in bit order after the enable bit.
pub const MAC16_FIELDS: [(&str, u8); 20] = [
    ("NEG_TRIGGER", 1),
    ("C_REG", 1),
    ("A_REG", 1),
    ("B_REG", 1),
    ("D_REG", 1),
    ("TOP_8x8_MULT_REG", 1),
    ("BOT_8x8_MULT_REG", 1),
    ("PIPELINE_16x16_MULT_REG1", 1),
    ("PIPELINE_16x16_MULT_REG2", 1),
    ("TOPOUTPUT_SELECT", 2),
    ("TOPADDSUB_LOWERINPUT", 2),
    ("TOPADDSUB_UPPERINPUT", 1),
    ("TOPADDSUB_CARRYSELECT", 2),
    ("BOTOUTPUT_SELECT", 2),
    ("BOTADDSUB_LOWERINPUT", 2),
    ("BOTADDSUB_UPPERINPUT", 1),
    ("BOTADDSUB_CARRYSELECT", 2),
    ("MODE_8x8", 1),
    ("A_SIGNED", 1),
    ("B_SIGNED", 1),
];

/// PLL fields and their widths, in bit order.
pub const PLL_FIELDS: [(&str, u8); 14] = [
    ("PLLTYPE", 3),
    ("FEEDBACK_PATH", 3),
    ("DELAY_ADJMODE_FB", 1),
    ("DELAY_ADJMODE_REL", 1),
    ("PLLOUT_SELECT_A", 2),
    ("PLLOUT_SELECT_B", 2),
    ("SHIFTREG_DIV_MODE", 1),
    ("FDA_FEEDBACK", 4),
    ("FDA_RELATIVE", 4),
    ("DIVR", 4),
    ("DIVF", 7),
    ("DIVQ", 3),
    ("FILTER_RANGE", 3),
    ("TEST_MODE", 1),
];

/// A bit position inside a specific tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldBit {
    /// Tile column.
    pub x: u32,
    /// Tile row.
    pub y: u32,
    /// Configuration row inside the tile.
    pub row: u8,
    /// Configuration column inside the tile.
    pub col: u8,
}

/// A named, possibly multi-bit configuration field of a bel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitField {
    /// Field name.
    pub name: &'static str,
    /// Positions, least significant bit first.
    pub bits: Vec<FieldBit>,
}

impl BitField {
    /// Width in bits.
    pub fn width(&self) -> u32 {
        self.bits.len() as u32
    }
}

/// The configuration fields of one bel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BelLayout {
    fields: Vec<BitField>,
}

impl BelLayout {
    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&BitField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// All fields, in layout order.
    pub fn fields(&self) -> &[BitField] {
        &self.fields
    }

    /// Whether the bel has no configuration bits.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn push(&mut self, name: &'static str, bits: Vec<FieldBit>) {
        self.fields.push(BitField { name, bits });
    }
}

/// Logic-cell bit `k` of slot `z`.
pub fn lc_bit(x: u32, y: u32, z: u32, k: u8) -> FieldBit {
    FieldBit {
        x,
        y,
        row: (2 * z) as u8 + k / 10,
        col: LC_COL + k % 10,
    }
}

/// Lays out `count` bits row by row starting at (row, col), `per_row` bits
/// to a row.
fn block(x: u32, y: u32, start: u32, count: u32, row: u8, col: u8, per_row: u32) -> Vec<FieldBit> {
    (start..start + count)
        .map(|b| FieldBit {
            x,
            y,
            row: row + (b / per_row) as u8,
            col: col + (b % per_row) as u8,
        })
        .collect()
}

fn run(x: u32, y: u32, row: u8, col: u8, width: u8) -> Vec<FieldBit> {
    (0..width)
        .map(|i| FieldBit {
            x,
            y,
            row,
            col: col + i,
        })
        .collect()
}

/// Computes the configuration fields of a bel.
pub fn bel_layout(family: Family, bel: &BelInfo) -> BelLayout {
    let (x, y, z) = (bel.x, bel.y, bel.z);
    let mut layout = BelLayout::default();
    match bel.kind {
        BelKind::Lc => {
            let lut = LUT_PHYSICAL_ORDER
                .iter()
                .map(|&k| lc_bit(x, y, z, k))
                .collect();
            layout.push(names::LUT_INIT, lut);
            layout.push(names::CARRY_ENABLE, vec![lc_bit(x, y, z, LC_CARRY_ENABLE)]);
            layout.push(names::DFF_ENABLE, vec![lc_bit(x, y, z, LC_DFF_ENABLE)]);
            layout.push(names::SET_NORESET, vec![lc_bit(x, y, z, LC_SET_NORESET)]);
            layout.push(names::ASYNC_SR, vec![lc_bit(x, y, z, LC_ASYNC_SR)]);
            layout.push(names::NEG_CLK, run(x, y, 0, 0, 1));
            if z == 0 {
                layout.push(names::CIN_SET, run(x, y, 1, 49, 1));
            }
        }
        BelKind::Io => {
            let base = 8 * z as u8;
            layout.push(names::PIN_TYPE, run(x, y, base + 3, IO_PIN_COL, 6));
            layout.push(names::NEG_TRIGGER, run(x, y, 4, IO_PIN_COL, 1));
            layout.push(names::PULLUP_OFF, run(x, y, base + 4, IO_PIN_COL + 1, 1));
            layout.push(names::IO_ENABLE, run(x, y, base + 4, IO_PIN_COL + 2, 1));
            layout.push(names::LVDS, run(x, y, base + 4, IO_PIN_COL + 3, 1));
            if family == Family::F5k {
                layout.push(names::PULLUP_RESISTOR, run(x, y, base + 4, IO_PIN_COL + 4, 2));
            }
        }
        BelKind::Ram => {
            let top = y + 1;
            layout.push(names::NEG_CLK_W, run(x, y, 0, 36, 1));
            layout.push(names::NEG_CLK_R, run(x, top, 0, 36, 1));
            layout.push(names::WRITE_MODE, run(x, top, 1, 36, 2));
            layout.push(names::READ_MODE, run(x, top, 2, 36, 2));
            layout.push(names::POWER_UP, run(x, top, 3, 36, 1));
        }
        BelKind::Dsp => {
            layout.push(names::ENABLE, block(x, y, 0, 1, 0, 46, 7));
            let mut start = 1;
            for (name, width) in MAC16_FIELDS {
                layout.push(name, block(x, y, start, width as u32, 0, 46, 7));
                start += width as u32;
            }
        }
        BelKind::Pll => {
            let mut start = 0;
            for (name, width) in PLL_FIELDS {
                layout.push(name, block(x, y, start, width as u32, 8, 13, 5));
                start += width as u32;
            }
        }
        BelKind::Hfosc => {
            layout.push(names::ENABLE, run(x, y, 0, 36, 1));
            layout.push(names::CLKHF_DIV, run(x, y, 0, 37, 2));
        }
        BelKind::RgbaDrv => {
            layout.push(names::ENABLE, run(x, y, 0, 36, 1));
            layout.push(names::CURRENT_MODE, run(x, y, 0, 37, 1));
            for (i, name) in names::RGB_CURRENT.into_iter().enumerate() {
                layout.push(name, run(x, y, 1 + i as u8, 36, 6));
            }
        }
        BelKind::Gb | BelKind::Lfosc | BelKind::Warmboot => {}
    }
    layout
}

/// Whether a field is shared by every bel of its kind in a tile.
pub fn is_tile_wide(name: &str) -> bool {
    name == names::NEG_CLK || name == names::NEG_TRIGGER
}
