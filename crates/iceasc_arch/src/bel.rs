//! Bel kinds and their pin tables.
//!
//! The pin table of a bel kind is the single source of truth for both the
//! chip database (which wire each pin sits on) and the netlist (which port
//! names a cell of that kind accepts, and in which direction).

use iceasc_common::Ident;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a bel pin, seen from the bel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinDir {
    /// The bel reads the wire.
    Input,
    /// The bel drives the wire.
    Output,
}

/// The kind of physical site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BelKind {
    /// Logic cell: 4-input LUT, flip-flop and carry.
    Lc,
    /// I/O cell.
    Io,
    /// Global buffer.
    Gb,
    /// 4 Kbit block RAM.
    Ram,
    /// MAC16 multiply-accumulate block.
    Dsp,
    /// Phase-locked loop.
    Pll,
    /// High-frequency oscillator.
    Hfosc,
    /// Low-frequency oscillator.
    Lfosc,
    /// Warm boot controller.
    Warmboot,
    /// RGB LED driver.
    RgbaDrv,
}

impl BelKind {
    /// Short name used in bel names, e.g. `lc` in `X1/Y2/lc3`.
    pub fn short_name(self) -> &'static str {
        match self {
            BelKind::Lc => "lc",
            BelKind::Io => "io",
            BelKind::Gb => "gb",
            BelKind::Ram => "ram",
            BelKind::Dsp => "mac16",
            BelKind::Pll => "pll",
            BelKind::Hfosc => "hfosc",
            BelKind::Lfosc => "lfosc",
            BelKind::Warmboot => "warmboot",
            BelKind::RgbaDrv => "rgba_drv",
        }
    }

    /// Whether bels of this kind have no configuration bits.
    ///
    /// Such bels are recovered from connectivity alone.
    pub fn is_configless(self) -> bool {
        matches!(self, BelKind::Gb | BelKind::Lfosc | BelKind::Warmboot)
    }

    /// Whether the bel name carries its slot index (`lc3`, `io1`, `gb5`).
    fn indexed(self) -> bool {
        matches!(self, BelKind::Lc | BelKind::Io | BelKind::Gb)
    }

    /// Formats the tile-local bel name for slot `z`.
    pub fn local_name(self, z: u32) -> String {
        if self.indexed() {
            format!("{}{z}", self.short_name())
        } else {
            self.short_name().to_string()
        }
    }

    /// Direction of the named pin, if bels of this kind have it.
    pub fn pin_dir(self, pin: &str) -> Option<PinDir> {
        pin_specs(self, 1)
            .into_iter()
            .find(|spec| spec.name == pin)
            .map(|spec| spec.dir)
    }
}

impl fmt::Display for BelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Where a bel pin lands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PinWire {
    /// A tile-local wire in the bel's tile, or `dy` tiles above it.
    Local {
        /// Row offset from the bel's tile.
        dy: u32,
        /// Tile-local wire name.
        name: String,
    },
    /// Global network `n`.
    Global(u32),
}

/// One entry of a bel kind's pin table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinSpec {
    /// Pin name.
    pub name: String,
    /// Pin direction.
    pub dir: PinDir,
    /// Wire the pin is attached to.
    pub wire: PinWire,
}

fn local(name: impl Into<String>, dir: PinDir, dy: u32, wire: impl Into<String>) -> PinSpec {
    PinSpec {
        name: name.into(),
        dir,
        wire: PinWire::Local {
            dy,
            name: wire.into(),
        },
    }
}

/// Returns the pin table for a bel of `kind` in slot `z`.
pub fn pin_specs(kind: BelKind, z: u32) -> Vec<PinSpec> {
    use PinDir::{Input, Output};
    match kind {
        BelKind::Lc => {
            let mut pins: Vec<PinSpec> = (0..4)
                .map(|j| local(format!("I{j}"), Input, 0, format!("lutff_{z}/in_{j}_lut")))
                .collect();
            let cin = if z == 0 {
                "carry_in_mux".to_string()
            } else {
                format!("lutff_{}/cout", z - 1)
            };
            pins.push(local("CIN", Input, 0, cin));
            pins.push(local("COUT", Output, 0, format!("lutff_{z}/cout")));
            pins.push(local("O", Output, 0, format!("lutff_{z}/out")));
            pins.push(local("CLK", Input, 0, "lutff_global/clk"));
            pins.push(local("CEN", Input, 0, "lutff_global/cen"));
            pins.push(local("SR", Input, 0, "lutff_global/s_r"));
            pins
        }
        BelKind::Io => vec![
            local("D_IN_0", Output, 0, format!("io_{z}/D_IN_0")),
            local("D_IN_1", Output, 0, format!("io_{z}/D_IN_1")),
            local("D_OUT_0", Input, 0, format!("io_{z}/D_OUT_0")),
            local("D_OUT_1", Input, 0, format!("io_{z}/D_OUT_1")),
            local("OUTPUT_ENABLE", Input, 0, format!("io_{z}/OUT_ENB")),
            local("INPUT_CLK", Input, 0, "io_global/inclk"),
            local("OUTPUT_CLK", Input, 0, "io_global/outclk"),
            local("CLOCK_ENABLE", Input, 0, "io_global/cen"),
        ],
        BelKind::Gb => vec![
            local("USER_SIGNAL_TO_GLOBAL_BUFFER", Input, 0, "fabout"),
            PinSpec {
                name: "GLOBAL_BUFFER_OUTPUT".to_string(),
                dir: Output,
                wire: PinWire::Global(z),
            },
        ],
        BelKind::Ram => {
            let mut pins = Vec::new();
            for n in 0..16 {
                let dy = n / 8;
                pins.push(local(format!("RDATA_{n}"), Output, dy, format!("ram/RDATA_{n}")));
                pins.push(local(format!("WDATA_{n}"), Input, dy, format!("ram/WDATA_{n}")));
            }
            for n in 0..11 {
                pins.push(local(format!("WADDR_{n}"), Input, 0, format!("ram/WADDR_{n}")));
                pins.push(local(format!("RADDR_{n}"), Input, 1, format!("ram/RADDR_{n}")));
            }
            for (pin, dy) in [("WE", 0), ("WCLK", 0), ("WCLKE", 0), ("RE", 1), ("RCLK", 1), ("RCLKE", 1)] {
                pins.push(local(pin, Input, dy, format!("ram/{pin}")));
            }
            pins
        }
        BelKind::Dsp => dsp_pins(),
        BelKind::Pll => vec![
            local("REFERENCECLK", Input, 0, "pll/referenceclk"),
            local("RESETB", Input, 0, "pll/resetb"),
            local("BYPASS", Input, 0, "pll/bypass"),
            local("PLLOUTCOREA", Output, 0, "pll/outcorea"),
            local("LOCK", Output, 0, "pll/lock"),
        ],
        BelKind::Hfosc => vec![
            local("CLKHFPU", Input, 0, "ip/in_0"),
            local("CLKHFEN", Input, 0, "ip/in_1"),
            local("CLKHF", Output, 0, "ip/out_0"),
        ],
        BelKind::Lfosc => vec![
            local("CLKLFPU", Input, 0, "ip/in_0"),
            local("CLKLFEN", Input, 0, "ip/in_1"),
            local("CLKLF", Output, 0, "ip/out_0"),
        ],
        BelKind::Warmboot => vec![
            local("BOOT", Input, 0, "ip/in_0"),
            local("S1", Input, 0, "ip/in_1"),
            local("S0", Input, 0, "ip/in_2"),
        ],
        BelKind::RgbaDrv => vec![
            local("CURREN", Input, 0, "ip/in_0"),
            local("RGBLEDEN", Input, 0, "ip/in_1"),
            local("RGB0PWM", Input, 0, "ip/in_2"),
            local("RGB1PWM", Input, 0, "ip/in_3"),
            local("RGB2PWM", Input, 0, "ip/in_4"),
        ],
    }
}

/// MAC16 pins spread over the four DSP tiles of a block.
fn dsp_pins() -> Vec<PinSpec> {
    use PinDir::{Input, Output};
    let mut pins = Vec::new();
    for (bus, input) in [("A", 0), ("B", 1), ("C", 2), ("D", 3)] {
        for n in 0..16u32 {
            pins.push(local(
                format!("{bus}_{n}"),
                Input,
                n / 8,
                format!("lutff_{}/in_{input}", n % 8),
            ));
        }
    }
    for n in 0..32u32 {
        pins.push(local(format!("O_{n}"), Output, n / 8, format!("lutff_{}/out", n % 8)));
    }
    let controls = [
        ("AHOLD", 2, 0),
        ("BHOLD", 2, 1),
        ("CHOLD", 2, 2),
        ("DHOLD", 2, 3),
        ("OHOLDTOP", 2, 4),
        ("OHOLDBOT", 2, 5),
        ("OLOADTOP", 2, 6),
        ("OLOADBOT", 2, 7),
        ("ADDSUBTOP", 3, 0),
        ("ADDSUBBOT", 3, 1),
        ("CI", 3, 2),
    ];
    for (pin, dy, slot) in controls {
        pins.push(local(pin, Input, dy, format!("lutff_{slot}/in_0")));
    }
    pins.push(local("CLK", Input, 0, "lutff_global/clk"));
    pins.push(local("CE", Input, 0, "lutff_global/cen"));
    pins.push(local("IRSTTOP", Input, 1, "lutff_global/s_r"));
    pins.push(local("IRSTBOT", Input, 2, "lutff_global/s_r"));
    pins.push(local("ORSTTOP", Input, 3, "lutff_global/s_r"));
    pins
}

/// A bel pin bound to its wire in the chip database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BelPin {
    /// Interned pin name.
    pub name: Ident,
    /// Pin direction.
    pub dir: PinDir,
    /// Wire the pin sits on.
    pub wire: crate::ids::WireId,
}

/// Database record for one bel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BelInfo {
    /// Tile column.
    pub x: u32,
    /// Tile row.
    pub y: u32,
    /// Slot within the tile.
    pub z: u32,
    /// Bel kind.
    pub kind: BelKind,
    /// Full bel name, `X{x}/Y{y}/{local}`.
    pub name: String,
    /// Pins, in pin-table order.
    pub pins: Vec<BelPin>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lc_pins_follow_slot() {
        let pins = pin_specs(BelKind::Lc, 0);
        let cin = pins.iter().find(|p| p.name == "CIN").unwrap();
        assert_eq!(
            cin.wire,
            PinWire::Local {
                dy: 0,
                name: "carry_in_mux".into()
            }
        );
        let pins = pin_specs(BelKind::Lc, 5);
        let cin = pins.iter().find(|p| p.name == "CIN").unwrap();
        assert_eq!(
            cin.wire,
            PinWire::Local {
                dy: 0,
                name: "lutff_4/cout".into()
            }
        );
        assert_eq!(pins.len(), 10);
    }

    #[test]
    fn pin_dirs() {
        assert_eq!(BelKind::Lc.pin_dir("O"), Some(PinDir::Output));
        assert_eq!(BelKind::Io.pin_dir("D_OUT_0"), Some(PinDir::Input));
        assert_eq!(BelKind::Dsp.pin_dir("O_31"), Some(PinDir::Output));
        assert_eq!(BelKind::Ram.pin_dir("RADDR_10"), Some(PinDir::Input));
        assert_eq!(BelKind::Lc.pin_dir("Q"), None);
    }

    #[test]
    fn dsp_pin_wires_are_unique() {
        let pins = dsp_pins();
        let mut seen = std::collections::HashSet::new();
        for pin in &pins {
            assert!(seen.insert(pin.wire.clone()), "{} reuses a wire", pin.name);
        }
    }

    #[test]
    fn local_names() {
        assert_eq!(BelKind::Lc.local_name(3), "lc3");
        assert_eq!(BelKind::Ram.local_name(0), "ram");
        assert!(BelKind::Gb.is_configless());
        assert!(!BelKind::Hfosc.is_configless());
    }
}
