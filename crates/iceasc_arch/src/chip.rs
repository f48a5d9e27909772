//! Chip variants, device tokens and packages.

use crate::error::ArchError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A die family, identified in ASC text by its device token.
///
/// All chips of one family share the same tile grid and therefore the same
/// chip database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Family {
    /// The 384-LUT die (`384`).
    F384,
    /// The 1K die (`1k`).
    F1k,
    /// The UltraPlus 5K die (`5k`).
    F5k,
    /// The 8K die (`8k`), also sold as HX4K.
    F8k,
}

impl Family {
    /// All families.
    pub const ALL: [Family; 4] = [Family::F384, Family::F1k, Family::F5k, Family::F8k];

    /// The token used on the `.device` line.
    pub fn token(self) -> &'static str {
        match self {
            Family::F384 => "384",
            Family::F1k => "1k",
            Family::F5k => "5k",
            Family::F8k => "8k",
        }
    }

    /// Looks up a family by its device token.
    pub fn from_token(token: &str) -> Option<Family> {
        Family::ALL.into_iter().find(|f| f.token() == token)
    }

    /// Grid size as (width, height) in tiles, corners included.
    pub fn grid_size(self) -> (u32, u32) {
        match self {
            Family::F384 => (8, 10),
            Family::F1k => (14, 18),
            Family::F5k => (26, 32),
            Family::F8k => (34, 34),
        }
    }

    /// Columns holding block RAM.
    pub fn ram_columns(self) -> &'static [u32] {
        match self {
            Family::F384 => &[],
            Family::F1k => &[3, 10],
            Family::F5k => &[6, 19],
            Family::F8k => &[8, 25],
        }
    }

    /// Whether the family has a PLL.
    pub fn has_pll(self) -> bool {
        matches!(self, Family::F5k | Family::F8k)
    }

    /// Chips of this family, in the order used to resolve a package.
    pub fn chips(self) -> &'static [Chip] {
        match self {
            Family::F384 => &[Chip::Lp384],
            Family::F1k => &[Chip::Hx1k, Chip::Lp1k],
            Family::F5k => &[Chip::Up5k],
            Family::F8k => &[Chip::Hx8k, Chip::Lp8k, Chip::Hx4k],
        }
    }

    /// Package assumed when a `.device` line names none.
    pub fn default_package(self) -> &'static str {
        match self {
            Family::F384 => "qn32",
            Family::F1k => "tq144",
            Family::F5k => "sg48",
            Family::F8k => "ct256",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A sellable chip variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Chip {
    /// iCE40 LP384.
    Lp384,
    /// iCE40 LP1K.
    Lp1k,
    /// iCE40 HX1K.
    Hx1k,
    /// iCE40 LP8K.
    Lp8k,
    /// iCE40 HX4K (an 8K die with a reduced package set).
    Hx4k,
    /// iCE40 HX8K.
    Hx8k,
    /// iCE40 UltraPlus 5K.
    Up5k,
}

impl Chip {
    /// All chips.
    pub const ALL: [Chip; 7] = [
        Chip::Lp384,
        Chip::Lp1k,
        Chip::Hx1k,
        Chip::Lp8k,
        Chip::Hx4k,
        Chip::Hx8k,
        Chip::Up5k,
    ];

    /// Lowercase chip name, e.g. `"hx1k"`.
    pub fn name(self) -> &'static str {
        match self {
            Chip::Lp384 => "lp384",
            Chip::Lp1k => "lp1k",
            Chip::Hx1k => "hx1k",
            Chip::Lp8k => "lp8k",
            Chip::Hx4k => "hx4k",
            Chip::Hx8k => "hx8k",
            Chip::Up5k => "up5k",
        }
    }

    /// Parses a chip name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Chip> {
        let lower = name.to_ascii_lowercase();
        Chip::ALL.into_iter().find(|c| c.name() == lower)
    }

    /// The die family.
    pub fn family(self) -> Family {
        match self {
            Chip::Lp384 => Family::F384,
            Chip::Lp1k | Chip::Hx1k => Family::F1k,
            Chip::Lp8k | Chip::Hx4k | Chip::Hx8k => Family::F8k,
            Chip::Up5k => Family::F5k,
        }
    }

    /// Packages this chip ships in.
    pub fn packages(self) -> &'static [&'static str] {
        match self {
            Chip::Lp384 => &["qn32", "cm36", "cm49"],
            Chip::Lp1k => &["cm36", "cm49", "cm81", "cm121", "qn84", "swg16"],
            Chip::Hx1k => &["tq144", "vq100", "cb132"],
            Chip::Lp8k => &["cm81", "cm121", "cm225"],
            Chip::Hx4k => &["tq144:4k", "bg121:4k", "cb132:4k"],
            Chip::Hx8k => &["ct256", "cb132", "bg121", "tq144"],
            Chip::Up5k => &["sg48", "uwg30"],
        }
    }

    /// First listed package.
    pub fn default_package(self) -> &'static str {
        self.packages()[0]
    }
}

impl fmt::Display for Chip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A concrete target: chip variant plus package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChipArgs {
    /// Chip variant.
    pub chip: Chip,
    /// Package name as it appears on the `.device` line.
    pub package: String,
}

impl ChipArgs {
    /// Creates a target after checking that the chip ships in `package`.
    pub fn new(chip: Chip, package: &str) -> Result<Self, ArchError> {
        if !chip.packages().contains(&package) {
            return Err(ArchError::UnknownPackage {
                chip: chip.name().to_string(),
                package: package.to_string(),
            });
        }
        Ok(Self {
            chip,
            package: package.to_string(),
        })
    }

    /// Resolves a `.device` token and optional package to a chip.
    ///
    /// Without a package the family default is used. Chips are tried in
    /// [`Family::chips`] order.
    pub fn resolve(token: &str, package: Option<&str>) -> Result<Self, ArchError> {
        let family =
            Family::from_token(token).ok_or_else(|| ArchError::UnknownDevice(token.to_string()))?;
        let package = package.unwrap_or_else(|| family.default_package());
        family
            .chips()
            .iter()
            .find(|chip| chip.packages().contains(&package))
            .map(|&chip| Self {
                chip,
                package: package.to_string(),
            })
            .ok_or_else(|| ArchError::UnknownDevice(format!("{token} {package}")))
    }

    /// The family of the chip.
    pub fn family(&self) -> Family {
        self.chip.family()
    }

    /// The device token written to the `.device` line.
    pub fn device_token(&self) -> &'static str {
        self.family().token()
    }

    /// Whether a configuration written for `other` can be read into `self`.
    ///
    /// Chips sharing a die and package are interchangeable (HX1K/LP1K, the
    /// 8K variants).
    pub fn is_compatible(&self, other: &ChipArgs) -> bool {
        self.family() == other.family() && self.package == other.package
    }
}

impl fmt::Display for ChipArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.chip, self.package)
    }
}
