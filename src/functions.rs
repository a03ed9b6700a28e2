// src/functions.rs

use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use paste::paste;

use crate::math;

/// Whether a unary function may be folded when its argument is a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldPolicy {
    Always,
    /// Fold only when the literal argument is >= 0.
    NonNegative,
    Never,
}

// --- Macro Template System ---

// Each entry names the function, its `math::fl_<name>` primitive and its fold
// policy. The enum variant is the camel-cased name.
macro_rules! define_unary_functions {
    ( $( ($name:ident, $policy:ident) ),* $(,)? ) => {
        paste! {
            /// The fixed catalog of single-argument math functions.
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub enum UnaryFunc {
                $( [<$name:camel>], )*
            }

            impl UnaryFunc {
                pub const ALL: &'static [UnaryFunc] = &[ $( UnaryFunc::[<$name:camel>], )* ];

                pub fn name(self) -> &'static str {
                    match self {
                        $( UnaryFunc::[<$name:camel>] => stringify!($name), )*
                    }
                }

                pub fn apply(self, arg: f64) -> f64 {
                    match self {
                        $( UnaryFunc::[<$name:camel>] => math::[<fl_ $name>](arg), )*
                    }
                }

                pub fn fold_policy(self) -> FoldPolicy {
                    match self {
                        $( UnaryFunc::[<$name:camel>] => FoldPolicy::$policy, )*
                    }
                }
            }
        }
    };
}

define_unary_functions! {
    (sin, Always),
    (cos, Always),
    (tan, Always),
    (exp, Always),
    (log, Never),
    (ln, Never),
    (sqrt, NonNegative),
    (abs, Always),
    (asin, Never),
    (acos, Never),
    (atan, Never),
    (sinh, Never),
    (cosh, Never),
    (tanh, Never),
    (ceil, Never),
    (floor, Never),
}

lazy_static! {
    static ref UNARY_BY_NAME: HashMap<&'static str, UnaryFunc> =
        UnaryFunc::ALL.iter().map(|f| (f.name(), *f)).collect();
}

impl UnaryFunc {
    pub fn from_name(name: &str) -> Option<UnaryFunc> {
        UNARY_BY_NAME.get(name).copied()
    }

    /// Applies the function to a literal if the fold policy allows it.
    pub fn try_fold(self, arg: f64) -> Option<f64> {
        match self.fold_policy() {
            FoldPolicy::Always => Some(self.apply(arg)),
            FoldPolicy::NonNegative if arg >= 0.0 => Some(self.apply(arg)),
            _ => None,
        }
    }
}

impl fmt::Display for UnaryFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Two-argument functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryFunc {
    Max,
    Min,
}

static BINARY_BY_NAME: phf::Map<&'static str, BinaryFunc> = phf::phf_map! {
    "max" => BinaryFunc::Max,
    "min" => BinaryFunc::Min,
};

impl BinaryFunc {
    pub fn from_name(name: &str) -> Option<BinaryFunc> {
        BINARY_BY_NAME.get(name).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            BinaryFunc::Max => "max",
            BinaryFunc::Min => "min",
        }
    }

    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryFunc::Max => math::fl_max(a, b),
            BinaryFunc::Min => math::fl_min(a, b),
        }
    }
}

impl fmt::Display for BinaryFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named constants recognised by the parser.
pub static CONSTANTS: phf::Map<&'static str, f64> = phf::phf_map! {
    "pi" => math::PI,
    "e" => math::E,
};
