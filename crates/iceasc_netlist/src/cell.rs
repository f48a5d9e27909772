//! Cells and their typed kinds.

use crate::error::NetlistError;
use crate::ids::NetId;
use crate::params::{params, FeedbackPath, ParamType, ParamValue, PullupResistor};
use iceasc_arch::{BelId, BelKind, PinDir};
use iceasc_common::BitVector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name under which placers create the constant-driver cell.
pub const GROUND_CELL_NAME: &str = "$PACKER_GND";

/// Number of 256-bit init words of a block RAM.
pub const RAM_INIT_WORDS: usize = 16;
/// Width of one block RAM init word.
pub const RAM_INIT_WIDTH: u32 = 256;

params! {
    "ICESTORM_LC"
    /// Logic cell parameters.
    pub struct LcParams {
        /// Truth table, bit `i` is the output for input value `i`.
        lut_init: u16 = 0 => "LUT_INIT",
        /// Clock inverted (shared by every cell in the tile).
        neg_clk: bool = false => "NEG_CLK",
        /// Carry logic used.
        carry_enable: bool = false => "CARRY_ENABLE",
        /// Output registered.
        dff_enable: bool = false => "DFF_ENABLE",
        /// Flip-flop sets instead of resetting.
        set_noreset: bool = false => "SET_NORESET",
        /// Set/reset is asynchronous.
        async_sr: bool = false => "ASYNC_SR",
        /// Carry input tied high (first cell of a tile only).
        cin_set: bool = false => "CIN_SET",
    }
}

params! {
    "SB_IO"
    /// I/O cell parameters.
    pub struct IoParams {
        /// Input and output register modes.
        pin_type: u8 = 0 => "PIN_TYPE",
        /// I/O clocks inverted (shared by the tile).
        neg_trigger: bool = false => "NEG_TRIGGER",
        /// Weak pull-up enabled.
        pullup: bool = false => "PULLUP",
        /// Differential input.
        lvds: bool = false => "LVDS",
        /// Pull-up strength (UltraPlus only).
        pullup_resistor: PullupResistor = PullupResistor::R100k => "PULLUP_RESISTOR",
    }
}

params! {
    "ICESTORM_DSP"
    /// MAC16 mode parameters.
    pub struct DspParams {
        /// Clock inverted.
        neg_trigger: bool = false => "NEG_TRIGGER",
        /// C input registered.
        c_reg: bool = false => "C_REG",
        /// A input registered.
        a_reg: bool = false => "A_REG",
        /// B input registered.
        b_reg: bool = false => "B_REG",
        /// D input registered.
        d_reg: bool = false => "D_REG",
        /// Upper 8x8 product registered.
        top_8x8_mult_reg: bool = false => "TOP_8x8_MULT_REG",
        /// Lower 8x8 product registered.
        bot_8x8_mult_reg: bool = false => "BOT_8x8_MULT_REG",
        /// First 16x16 pipeline stage.
        pipeline_16x16_mult_reg1: bool = false => "PIPELINE_16x16_MULT_REG1",
        /// Second 16x16 pipeline stage.
        pipeline_16x16_mult_reg2: bool = false => "PIPELINE_16x16_MULT_REG2",
        /// Upper output source.
        topoutput_select: u8 = 0 => "TOPOUTPUT_SELECT",
        /// Upper adder lower operand.
        topaddsub_lowerinput: u8 = 0 => "TOPADDSUB_LOWERINPUT",
        /// Upper adder upper operand.
        topaddsub_upperinput: bool = false => "TOPADDSUB_UPPERINPUT",
        /// Upper adder carry source.
        topaddsub_carryselect: u8 = 0 => "TOPADDSUB_CARRYSELECT",
        /// Lower output source.
        botoutput_select: u8 = 0 => "BOTOUTPUT_SELECT",
        /// Lower adder lower operand.
        botaddsub_lowerinput: u8 = 0 => "BOTADDSUB_LOWERINPUT",
        /// Lower adder upper operand.
        botaddsub_upperinput: bool = false => "BOTADDSUB_UPPERINPUT",
        /// Lower adder carry source.
        botaddsub_carryselect: u8 = 0 => "BOTADDSUB_CARRYSELECT",
        /// Split into two 8x8 multipliers.
        mode_8x8: bool = false => "MODE_8x8",
        /// A operand signed.
        a_signed: bool = false => "A_SIGNED",
        /// B operand signed.
        b_signed: bool = false => "B_SIGNED",
    }
}

params! {
    "ICESTORM_PLL"
    /// PLL parameters.
    pub struct PllParams {
        /// Primitive variant, 1 to 5.
        pll_type: u8 = 1 => "PLLTYPE",
        /// Feedback path.
        feedback_path: FeedbackPath = FeedbackPath::Simple => "FEEDBACK_PATH",
        /// Feedback delay adjusted dynamically.
        delay_adjmode_fb: bool = false => "DELAY_ADJMODE_FB",
        /// Relative delay adjusted dynamically.
        delay_adjmode_rel: bool = false => "DELAY_ADJMODE_REL",
        /// Port A output selection.
        pllout_select_a: u8 = 0 => "PLLOUT_SELECT_A",
        /// Port B output selection.
        pllout_select_b: u8 = 0 => "PLLOUT_SELECT_B",
        /// Shift register divides by 7 instead of 4.
        shiftreg_div_mode: bool = false => "SHIFTREG_DIV_MODE",
        /// Fixed feedback delay.
        fda_feedback: u8 = 0 => "FDA_FEEDBACK",
        /// Fixed relative delay.
        fda_relative: u8 = 0 => "FDA_RELATIVE",
        /// Reference divider.
        divr: u8 = 0 => "DIVR",
        /// Feedback divider.
        divf: u8 = 0 => "DIVF",
        /// VCO divider.
        divq: u8 = 0 => "DIVQ",
        /// Loop filter range.
        filter_range: u8 = 0 => "FILTER_RANGE",
        /// Test mode.
        test_mode: bool = false => "TEST_MODE",
    }
}

params! {
    "ICESTORM_HFOSC"
    /// High-frequency oscillator parameters.
    pub struct HfoscParams {
        /// Output divider code (48 MHz divided by 1, 2, 4 or 8).
        clkhf_div: u8 = 0 => "CLKHF_DIV",
    }
}

params! {
    "SB_RGBA_DRV"
    /// RGB LED driver parameters.
    pub struct RgbaParams {
        /// Half-current mode.
        current_mode: bool = false => "CURRENT_MODE",
        /// Channel 0 current, thermometer coded.
        rgb0_current: u8 = 0 => "RGB0_CURRENT",
        /// Channel 1 current, thermometer coded.
        rgb1_current: u8 = 0 => "RGB1_CURRENT",
        /// Channel 2 current, thermometer coded.
        rgb2_current: u8 = 0 => "RGB2_CURRENT",
    }
}

/// Block RAM parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RamParams {
    /// Read clock inverted.
    pub neg_clk_r: bool,
    /// Write clock inverted.
    pub neg_clk_w: bool,
    /// Write port geometry code.
    pub write_mode: u8,
    /// Read port geometry code.
    pub read_mode: u8,
    /// Initial contents, `INIT_0` to `INIT_F`.
    pub init: Vec<BitVector>,
}

impl Default for RamParams {
    fn default() -> Self {
        Self {
            neg_clk_r: false,
            neg_clk_w: false,
            write_mode: 0,
            read_mode: 0,
            init: vec![BitVector::new(RAM_INIT_WIDTH); RAM_INIT_WORDS],
        }
    }
}

impl RamParams {
    /// Cell type name these parameters belong to.
    pub const TYPE_NAME: &'static str = "ICESTORM_RAM";

    /// Conventional parameter names.
    pub const PARAM_NAMES: &'static [&'static str] = &[
        "NEG_CLK_R", "NEG_CLK_W", "WRITE_MODE", "READ_MODE", "INIT_0", "INIT_1", "INIT_2",
        "INIT_3", "INIT_4", "INIT_5", "INIT_6", "INIT_7", "INIT_8", "INIT_9", "INIT_A", "INIT_B",
        "INIT_C", "INIT_D", "INIT_E", "INIT_F",
    ];

    fn init_index(name: &str) -> Option<usize> {
        let digit = name.strip_prefix("INIT_")?;
        let mut chars = digit.chars();
        let index = chars.next()?.to_digit(16)?;
        // upper-case only, as written in PARAM_NAMES
        if chars.next().is_some() || digit.chars().any(|c| c.is_ascii_lowercase()) {
            return None;
        }
        Some(index as usize)
    }

    /// Reads a parameter by name.
    pub fn get_param(&self, name: &str) -> Option<ParamValue> {
        match name {
            "NEG_CLK_R" => Some(self.neg_clk_r.to_param()),
            "NEG_CLK_W" => Some(self.neg_clk_w.to_param()),
            "WRITE_MODE" => Some(self.write_mode.to_param()),
            "READ_MODE" => Some(self.read_mode.to_param()),
            _ => Self::init_index(name).and_then(|i| self.init.get(i)).map(ParamType::to_param),
        }
    }

    /// Writes a parameter by name.
    pub fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), NetlistError> {
        let invalid = || NetlistError::InvalidParam {
            cell_type: Self::TYPE_NAME,
            name: name.to_string(),
            value: value.to_string(),
        };
        match name {
            "NEG_CLK_R" => self.neg_clk_r = bool::from_param(value).ok_or_else(invalid)?,
            "NEG_CLK_W" => self.neg_clk_w = bool::from_param(value).ok_or_else(invalid)?,
            "WRITE_MODE" => self.write_mode = u8::from_param(value).ok_or_else(invalid)?,
            "READ_MODE" => self.read_mode = u8::from_param(value).ok_or_else(invalid)?,
            _ => {
                let index = Self::init_index(name).ok_or_else(|| NetlistError::UnknownParam {
                    cell_type: Self::TYPE_NAME,
                    name: name.to_string(),
                })?;
                let word = BitVector::from_param(value)
                    .filter(|w| w.width() == RAM_INIT_WIDTH)
                    .ok_or_else(invalid)?;
                self.init[index] = word;
            }
        }
        Ok(())
    }
}

/// The closed set of primitive kinds, each with its typed parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    /// Logic cell.
    Lc(LcParams),
    /// I/O cell.
    Io(IoParams),
    /// Global buffer.
    Gb,
    /// Block RAM.
    Ram(RamParams),
    /// MAC16 DSP block.
    Dsp(DspParams),
    /// PLL.
    Pll(PllParams),
    /// High-frequency oscillator.
    Hfosc(HfoscParams),
    /// Low-frequency oscillator.
    Lfosc,
    /// Warm boot controller.
    Warmboot,
    /// RGB LED driver.
    RgbaDrv(RgbaParams),
}

impl CellKind {
    /// A cell of the kind that fits `bel`, with default parameters.
    pub fn default_for(bel: BelKind) -> CellKind {
        match bel {
            BelKind::Lc => CellKind::Lc(LcParams::default()),
            BelKind::Io => CellKind::Io(IoParams::default()),
            BelKind::Gb => CellKind::Gb,
            BelKind::Ram => CellKind::Ram(RamParams::default()),
            BelKind::Dsp => CellKind::Dsp(DspParams::default()),
            BelKind::Pll => CellKind::Pll(PllParams::default()),
            BelKind::Hfosc => CellKind::Hfosc(HfoscParams::default()),
            BelKind::Lfosc => CellKind::Lfosc,
            BelKind::Warmboot => CellKind::Warmboot,
            BelKind::RgbaDrv => CellKind::RgbaDrv(RgbaParams::default()),
        }
    }

    /// Conventional primitive type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            CellKind::Lc(_) => LcParams::TYPE_NAME,
            CellKind::Io(_) => IoParams::TYPE_NAME,
            CellKind::Gb => "SB_GB",
            CellKind::Ram(_) => RamParams::TYPE_NAME,
            CellKind::Dsp(_) => DspParams::TYPE_NAME,
            CellKind::Pll(_) => PllParams::TYPE_NAME,
            CellKind::Hfosc(_) => HfoscParams::TYPE_NAME,
            CellKind::Lfosc => "ICESTORM_LFOSC",
            CellKind::Warmboot => "SB_WARMBOOT",
            CellKind::RgbaDrv(_) => RgbaParams::TYPE_NAME,
        }
    }

    /// The bel kind cells of this kind are placed on.
    pub fn bel_kind(&self) -> BelKind {
        match self {
            CellKind::Lc(_) => BelKind::Lc,
            CellKind::Io(_) => BelKind::Io,
            CellKind::Gb => BelKind::Gb,
            CellKind::Ram(_) => BelKind::Ram,
            CellKind::Dsp(_) => BelKind::Dsp,
            CellKind::Pll(_) => BelKind::Pll,
            CellKind::Hfosc(_) => BelKind::Hfosc,
            CellKind::Lfosc => BelKind::Lfosc,
            CellKind::Warmboot => BelKind::Warmboot,
            CellKind::RgbaDrv(_) => BelKind::RgbaDrv,
        }
    }

    /// Names of the parameters this kind carries.
    pub fn param_names(&self) -> &'static [&'static str] {
        match self {
            CellKind::Lc(_) => LcParams::PARAM_NAMES,
            CellKind::Io(_) => IoParams::PARAM_NAMES,
            CellKind::Ram(_) => RamParams::PARAM_NAMES,
            CellKind::Dsp(_) => DspParams::PARAM_NAMES,
            CellKind::Pll(_) => PllParams::PARAM_NAMES,
            CellKind::Hfosc(_) => HfoscParams::PARAM_NAMES,
            CellKind::RgbaDrv(_) => RgbaParams::PARAM_NAMES,
            CellKind::Gb | CellKind::Lfosc | CellKind::Warmboot => &[],
        }
    }

    /// Reads a parameter by its conventional name.
    pub fn get_param(&self, name: &str) -> Option<ParamValue> {
        match self {
            CellKind::Lc(p) => p.get_param(name),
            CellKind::Io(p) => p.get_param(name),
            CellKind::Ram(p) => p.get_param(name),
            CellKind::Dsp(p) => p.get_param(name),
            CellKind::Pll(p) => p.get_param(name),
            CellKind::Hfosc(p) => p.get_param(name),
            CellKind::RgbaDrv(p) => p.get_param(name),
            CellKind::Gb | CellKind::Lfosc | CellKind::Warmboot => None,
        }
    }

    /// Writes a parameter by its conventional name.
    pub fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), NetlistError> {
        match self {
            CellKind::Lc(p) => p.set_param(name, value),
            CellKind::Io(p) => p.set_param(name, value),
            CellKind::Ram(p) => p.set_param(name, value),
            CellKind::Dsp(p) => p.set_param(name, value),
            CellKind::Pll(p) => p.set_param(name, value),
            CellKind::Hfosc(p) => p.set_param(name, value),
            CellKind::RgbaDrv(p) => p.set_param(name, value),
            CellKind::Gb | CellKind::Lfosc | CellKind::Warmboot => {
                Err(NetlistError::UnknownParam {
                    cell_type: self.type_name(),
                    name: name.to_string(),
                })
            }
        }
    }
}

/// One port of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    /// Direction, seen from the cell.
    pub dir: PinDir,
    /// Connected net.
    pub net: Option<NetId>,
}

/// A logical instance of a primitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    /// Unique cell name.
    pub name: String,
    /// Kind and parameters.
    pub kind: CellKind,
    /// Placement; `None` while unplaced.
    pub bel: Option<BelId>,
    /// Open-ended string metadata.
    pub attrs: BTreeMap<String, String>,
    /// Connected ports by name.
    pub ports: BTreeMap<String, Port>,
}

impl Cell {
    /// Whether this cell only provides a constant and leaves no trace in the
    /// configuration: the placer's ground cell or a logic cell with every
    /// parameter at its default.
    ///
    /// `NEG_CLK` is a tile setting, so a logic cell that only inverts the
    /// clock has nothing of its own to keep and also counts as ground.
    pub fn is_ground(&self) -> bool {
        self.name == GROUND_CELL_NAME
            || matches!(&self.kind, CellKind::Lc(p) if LcParams {
                neg_clk: false,
                ..p.clone()
            } == LcParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_access_matches_fields() {
        let mut kind = CellKind::default_for(BelKind::Lc);
        kind.set_param("LUT_INIT", &ParamValue::Int(0xcafe)).unwrap();
        kind.set_param("DFF_ENABLE", &ParamValue::Int(1)).unwrap();
        match &kind {
            CellKind::Lc(p) => {
                assert_eq!(p.lut_init, 0xcafe);
                assert!(p.dff_enable);
            }
            other => panic!("unexpected kind {other:?}"),
        }
        assert_eq!(kind.get_param("LUT_INIT"), Some(ParamValue::Int(0xcafe)));
        assert_eq!(kind.type_name(), "ICESTORM_LC");
    }

    #[test]
    fn bad_params_are_rejected() {
        let mut kind = CellKind::default_for(BelKind::Io);
        let err = kind.set_param("PIN_TYPE", &ParamValue::Int(300)).unwrap_err();
        assert!(matches!(err, NetlistError::InvalidParam { .. }));
        let err = kind.set_param("FOO", &ParamValue::Int(1)).unwrap_err();
        assert!(matches!(err, NetlistError::UnknownParam { cell_type: "SB_IO", .. }));
        assert!(CellKind::Gb.set_param("X", &ParamValue::Int(0)).is_err());
    }

    #[test]
    fn ram_init_words() {
        let mut kind = CellKind::default_for(BelKind::Ram);
        let word = BitVector::from_hex_str(RAM_INIT_WIDTH, "deadbeef").unwrap();
        kind.set_param("INIT_A", &ParamValue::Bits(word.clone())).unwrap();
        assert_eq!(kind.get_param("INIT_A"), Some(ParamValue::Bits(word)));
        assert!(kind.get_param("INIT_a").is_none());
        assert!(kind.get_param("INIT_10").is_none());
        let short = BitVector::new(8);
        assert!(kind.set_param("INIT_0", &ParamValue::Bits(short)).is_err());
        assert_eq!(kind.param_names().len(), 20);
    }

    #[test]
    fn kinds_match_bels() {
        for bel in [BelKind::Lc, BelKind::Io, BelKind::Gb, BelKind::Ram, BelKind::Dsp, BelKind::Pll, BelKind::Hfosc, BelKind::Lfosc, BelKind::Warmboot, BelKind::RgbaDrv] {
            assert_eq!(CellKind::default_for(bel).bel_kind(), bel);
        }
        assert_eq!(DspParams::PARAM_NAMES.len(), iceasc_arch::layout::MAC16_FIELDS.len());
        assert_eq!(PllParams::PARAM_NAMES.len(), iceasc_arch::layout::PLL_FIELDS.len());
    }

    #[test]
    fn ground_detection() {
        let cell = Cell {
            name: "c".into(),
            kind: CellKind::default_for(BelKind::Lc),
            bel: None,
            attrs: BTreeMap::new(),
            ports: BTreeMap::new(),
        };
        assert!(cell.is_ground());
        let mut inverted = cell.clone();
        inverted.kind = CellKind::Lc(LcParams {
            neg_clk: true,
            ..LcParams::default()
        });
        assert!(inverted.is_ground());
        let mut registered = cell.clone();
        registered.kind = CellKind::Lc(LcParams {
            neg_clk: true,
            dff_enable: true,
            ..LcParams::default()
        });
        assert!(!registered.is_ground());
        let mut io = cell.clone();
        io.kind = CellKind::default_for(BelKind::Io);
        assert!(!io.is_ground());
    }
}
