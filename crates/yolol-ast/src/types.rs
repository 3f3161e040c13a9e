//! Value kinds, numbers and variable names
//!
//! `Type` is a small flag set rather than a single kind so that inference
//! can express partial results such as "a number, unless it faults".

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::str::FromStr;

/// Set of value kinds a variable or expression may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Type(u8);

impl Type {
    /// Nothing known yet
    pub const UNASSIGNED: Type = Type(0);
    pub const NUMBER: Type = Type(1);
    pub const STRING: Type = Type(2);
    /// Evaluating the expression may fault at run time
    pub const ERROR: Type = Type(4);

    const ALL: Type = Type(7);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn from_bits(bits: u8) -> Option<Type> {
        if bits & !Self::ALL.0 == 0 {
            Some(Type(bits))
        } else {
            None
        }
    }

    pub const fn contains(self, other: Type) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Type) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_unassigned(self) -> bool {
        self.0 == 0
    }

    pub const fn has_error(self) -> bool {
        self.intersects(Self::ERROR)
    }

    /// Drop the error flag, keeping only the value kinds
    pub const fn without_error(self) -> Type {
        Type(self.0 & !Self::ERROR.0)
    }

    /// The concrete value kinds (`NUMBER`, `STRING`) present in this set
    pub fn value_kinds(self) -> impl Iterator<Item = Type> {
        [Type::NUMBER, Type::STRING]
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

impl BitOr for Type {
    type Output = Type;

    fn bitor(self, rhs: Type) -> Type {
        Type(self.0 | rhs.0)
    }
}

impl BitOrAssign for Type {
    fn bitor_assign(&mut self, rhs: Type) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Type {
    type Output = Type;

    fn bitand(self, rhs: Type) -> Type {
        Type(self.0 & rhs.0)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unassigned() {
            return f.write_str("unassigned");
        }

        let names = [(Type::NUMBER, "number"), (Type::STRING, "string"), (Type::ERROR, "error")];
        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Error returned when parsing a [`Type`] from text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown type name `{0}`")]
pub struct ParseTypeError(pub String);

impl FromStr for Type {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut ty = Type::UNASSIGNED;
        for part in s.split('|').map(str::trim) {
            ty |= match part.to_ascii_lowercase().as_str() {
                "unassigned" => Type::UNASSIGNED,
                "number" => Type::NUMBER,
                "string" => Type::STRING,
                "error" => Type::ERROR,
                _ => return Err(ParseTypeError(part.to_string())),
            };
        }
        Ok(ty)
    }
}

impl TryFrom<String> for Type {
    type Error = ParseTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Type> for String {
    fn from(value: Type) -> Self {
        value.to_string()
    }
}

/// Fixed point decimal with three fractional digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Number(i64);

impl Number {
    pub const SCALE: i64 = 1000;
    pub const ZERO: Number = Number(0);
    pub const ONE: Number = Number(Self::SCALE);

    /// Build from the scaled representation (`1500` is `1.5`)
    pub const fn from_raw(raw: i64) -> Self {
        Number(raw)
    }

    pub const fn raw(self) -> i64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn from_f64(value: f64) -> Self {
        Number((value * Self::SCALE as f64).round() as i64)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number(value.saturating_mul(Self::SCALE))
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::from(i64::from(value))
    }
}

/// Canonical decimal text: no trailing fractional zeros, no trailing point.
/// This is the text a number becomes when coerced into a string.
impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = Self::SCALE.unsigned_abs();
        let magnitude = self.0.unsigned_abs();
        let whole = magnitude / scale;
        let mut frac = magnitude % scale;

        if self.0 < 0 {
            f.write_str("-")?;
        }
        write!(f, "{whole}")?;

        if frac != 0 {
            let mut digits = 3;
            while frac % 10 == 0 {
                frac /= 10;
                digits -= 1;
            }
            write!(f, ".{frac:0digits$}")?;
        }
        Ok(())
    }
}

/// Name of a variable. Names starting with `:` are fields of external devices.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableName(String);

impl VariableName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is_external(&self) -> bool {
        self.0.starts_with(':')
    }
}

impl fmt::Display for VariableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VariableName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for VariableName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for VariableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for VariableName {
    fn borrow(&self) -> &str {
        &self.0
    }
}
