//! Typed cell parameters with name-based access.
//!
//! Every cell kind stores its parameters in a plain struct. The [`params!`]
//! macro generates that struct together with a name table so tools can still
//! address parameters by their conventional names (`LUT_INIT`, `PIN_TYPE`).

use iceasc_common::BitVector;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A parameter value as seen through the name-based interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamValue {
    /// Integer or flag.
    Int(u64),
    /// Enumerated value by name.
    Str(String),
    /// Wide bit pattern.
    Bits(BitVector),
}

impl ParamValue {
    /// The integer value, if this is an integer.
    pub fn as_int(&self) -> Option<u64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Str(s) => write!(f, "\"{s}\""),
            ParamValue::Bits(b) => write!(f, "{b}"),
        }
    }
}

/// Conversion between a typed parameter field and [`ParamValue`].
pub trait ParamType: Sized {
    /// Renders the field.
    fn to_param(&self) -> ParamValue;
    /// Parses a value, `None` if it does not fit the field.
    fn from_param(value: &ParamValue) -> Option<Self>;
}

impl ParamType for bool {
    fn to_param(&self) -> ParamValue {
        ParamValue::Int(u64::from(*self))
    }

    fn from_param(value: &ParamValue) -> Option<Self> {
        match value.as_int()? {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }
    }
}

macro_rules! int_param {
    ($($ty:ty),*) => {
        $(
            impl ParamType for $ty {
                fn to_param(&self) -> ParamValue {
                    ParamValue::Int(u64::from(*self))
                }

                fn from_param(value: &ParamValue) -> Option<Self> {
                    match value {
                        ParamValue::Int(v) => <$ty>::try_from(*v).ok(),
                        ParamValue::Bits(b) if b.width() <= <$ty>::BITS => {
                            <$ty>::try_from(b.to_u64()).ok()
                        }
                        _ => None,
                    }
                }
            }
        )*
    };
}

int_param!(u8, u16);

impl ParamType for BitVector {
    fn to_param(&self) -> ParamValue {
        ParamValue::Bits(self.clone())
    }

    fn from_param(value: &ParamValue) -> Option<Self> {
        match value {
            ParamValue::Bits(b) => Some(b.clone()),
            _ => None,
        }
    }
}

/// Declares a parameter struct.
///
/// Each field lists its type, default value and conventional name:
///
/// ```ignore
/// params! {
///     "SB_EXAMPLE"
///     /// Doc.
///     pub struct ExampleParams {
///         /// Field doc.
///         width: u8 = 4 => "WIDTH",
///     }
/// }
/// ```
macro_rules! params {
    (
        $type_name:literal
        $(#[$meta:meta])*
        pub struct $name:ident {
            $( $(#[$fmeta:meta])* $field:ident : $ty:ty = $default:expr => $pname:literal ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
        pub struct $name {
            $( $(#[$fmeta])* pub $field: $ty, )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self { $( $field: $default, )* }
            }
        }

        impl $name {
            /// Cell type name these parameters belong to.
            pub const TYPE_NAME: &'static str = $type_name;

            /// Conventional parameter names.
            pub const PARAM_NAMES: &'static [&'static str] = &[$($pname),*];

            /// Reads a parameter by name.
            pub fn get_param(&self, name: &str) -> Option<$crate::params::ParamValue> {
                match name {
                    $( $pname => Some($crate::params::ParamType::to_param(&self.$field)), )*
                    _ => None,
                }
            }

            /// Writes a parameter by name.
            pub fn set_param(
                &mut self,
                name: &str,
                value: &$crate::params::ParamValue,
            ) -> Result<(), $crate::error::NetlistError> {
                match name {
                    $(
                        $pname => {
                            self.$field = $crate::params::ParamType::from_param(value).ok_or_else(|| {
                                $crate::error::NetlistError::InvalidParam {
                                    cell_type: $type_name,
                                    name: name.to_string(),
                                    value: value.to_string(),
                                }
                            })?;
                            Ok(())
                        }
                    )*
                    _ => Err($crate::error::NetlistError::UnknownParam {
                        cell_type: $type_name,
                        name: name.to_string(),
                    }),
                }
            }
        }
    };
}

pub(crate) use params;

/// PLL feedback path selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedbackPath {
    /// Through the fine delay line.
    Delay,
    /// Directly from the VCO divider.
    Simple,
    /// Through the phase shifter and delay line.
    PhaseAndDelay,
    /// From an external pin.
    External,
}

impl FeedbackPath {
    /// All feedback paths.
    pub const ALL: [FeedbackPath; 4] = [
        FeedbackPath::Delay,
        FeedbackPath::Simple,
        FeedbackPath::PhaseAndDelay,
        FeedbackPath::External,
    ];

    /// The 3-bit configuration code.
    pub fn code(self) -> u64 {
        match self {
            FeedbackPath::Delay => 0,
            FeedbackPath::Simple => 1,
            FeedbackPath::PhaseAndDelay => 2,
            FeedbackPath::External => 6,
        }
    }

    /// Decodes a configuration code; the unassigned codes give `None`.
    pub fn from_code(code: u64) -> Option<Self> {
        FeedbackPath::ALL.into_iter().find(|p| p.code() == code)
    }

    /// Conventional name.
    pub fn name(self) -> &'static str {
        match self {
            FeedbackPath::Delay => "DELAY",
            FeedbackPath::Simple => "SIMPLE",
            FeedbackPath::PhaseAndDelay => "PHASE_AND_DELAY",
            FeedbackPath::External => "EXTERNAL",
        }
    }
}

impl ParamType for FeedbackPath {
    fn to_param(&self) -> ParamValue {
        ParamValue::Str(self.name().to_string())
    }

    fn from_param(value: &ParamValue) -> Option<Self> {
        match value {
            ParamValue::Str(s) => FeedbackPath::ALL.into_iter().find(|p| p.name() == s),
            ParamValue::Int(code) => FeedbackPath::from_code(*code),
            ParamValue::Bits(_) => None,
        }
    }
}

/// Pull-up strength of an UltraPlus I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PullupResistor {
    /// 100 kOhm.
    R100k,
    /// 10 kOhm.
    R10k,
    /// 6.8 kOhm.
    R6p8k,
    /// 3.3 kOhm.
    R3p3k,
}

impl PullupResistor {
    /// All strengths, indexed by configuration code.
    pub const ALL: [PullupResistor; 4] = [
        PullupResistor::R100k,
        PullupResistor::R10k,
        PullupResistor::R6p8k,
        PullupResistor::R3p3k,
    ];

    /// The 2-bit configuration code.
    pub fn code(self) -> u64 {
        match self {
            PullupResistor::R100k => 0,
            PullupResistor::R10k => 1,
            PullupResistor::R6p8k => 2,
            PullupResistor::R3p3k => 3,
        }
    }

    /// Decodes a configuration code.
    pub fn from_code(code: u64) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|i| PullupResistor::ALL.get(i).copied())
    }

    /// Conventional name, e.g. `"10K"`.
    pub fn name(self) -> &'static str {
        match self {
            PullupResistor::R100k => "100K",
            PullupResistor::R10k => "10K",
            PullupResistor::R6p8k => "6P8K",
            PullupResistor::R3p3k => "3P3K",
        }
    }
}

impl ParamType for PullupResistor {
    fn to_param(&self) -> ParamValue {
        ParamValue::Str(self.name().to_string())
    }

    fn from_param(value: &ParamValue) -> Option<Self> {
        match value {
            ParamValue::Str(s) => PullupResistor::ALL
                .into_iter()
                .find(|r| r.name().eq_ignore_ascii_case(s)),
            ParamValue::Int(code) => PullupResistor::from_code(*code),
            ParamValue::Bits(_) => None,
        }
    }
}
