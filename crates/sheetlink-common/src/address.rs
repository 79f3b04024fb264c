//! Single-cell addresses in A1 notation.
//!
//! An [`Address`] is a 1-based `(row, column)` pair. It can be built from an A1
//! label (`"AZ100"`), a coordinate tuple, or another address, and always renders
//! back to its canonical upper-case label.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::coord::{column_to_letters, letters_to_column};
use crate::error::RangeError;

static CELL_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]+)([0-9]+)$").expect("static cell label pattern"));

/// Immutable 1-based cell coordinate.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Address {
    row: u32,
    col: u32,
}

impl Address {
    /// Encode a 1-based coordinate pair. Both values must be at least 1.
    pub fn new(row: u32, col: u32) -> Result<Self, RangeError> {
        if row < 1 || col < 1 {
            return Err(RangeError::invalid_argument(format!(
                "cell coordinates must be 1-based, got ({row}, {col})"
            )));
        }
        Ok(Address { row, col })
    }

    /// Decode an A1 label such as `"C7"` or `"az100"`.
    pub fn parse(label: &str) -> Result<Self, RangeError> {
        let incorrect = || RangeError::IncorrectCellLabel {
            label: label.to_string(),
        };
        let caps = CELL_LABEL.captures(label).ok_or_else(incorrect)?;
        let col = letters_to_column(&caps[1]).ok_or_else(incorrect)?;
        let row: u32 = caps[2].parse().map_err(|_| incorrect())?;
        Address::new(row, col)
    }

    #[inline]
    pub fn row(self) -> u32 {
        self.row
    }

    #[inline]
    pub fn column(self) -> u32 {
        self.col
    }

    /// `(row, column)`, both 1-based.
    #[inline]
    pub fn coords(self) -> (u32, u32) {
        (self.row, self.col)
    }

    /// Canonical A1 label.
    pub fn label(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `new` guarantees col >= 1
        let letters = column_to_letters(self.col).unwrap_or_default();
        write!(f, "{letters}{}", self.row)
    }
}

impl FromStr for Address {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl TryFrom<&str> for Address {
    type Error = RangeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Address::parse(value)
    }
}

impl TryFrom<String> for Address {
    type Error = RangeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Address::parse(&value)
    }
}

impl TryFrom<(u32, u32)> for Address {
    type Error = RangeError;

    fn try_from(value: (u32, u32)) -> Result<Self, Self::Error> {
        Address::new(value.0, value.1)
    }
}

impl TryFrom<(i64, i64)> for Address {
    type Error = RangeError;

    fn try_from(value: (i64, i64)) -> Result<Self, Self::Error> {
        let (row, col) = value;
        let out_of_domain = || {
            RangeError::invalid_argument(format!(
                "cell coordinates must be 1-based, got ({row}, {col})"
            ))
        };
        let row = u32::try_from(row).map_err(|_| out_of_domain())?;
        let col = u32::try_from(col).map_err(|_| out_of_domain())?;
        Address::new(row, col)
    }
}

impl From<Address> for (u32, u32) {
    fn from(addr: Address) -> Self {
        addr.coords()
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.label()
    }
}

impl PartialEq<str> for Address {
    fn eq(&self, other: &str) -> bool {
        self.label() == other
    }
}

impl PartialEq<&str> for Address {
    fn eq(&self, other: &&str) -> bool {
        self.label() == *other
    }
}

impl PartialEq<String> for Address {
    fn eq(&self, other: &String) -> bool {
        self.label() == *other
    }
}

impl PartialEq<(u32, u32)> for Address {
    fn eq(&self, other: &(u32, u32)) -> bool {
        self.coords() == *other
    }
}

/// Anything that can name a single cell: labels, coordinate tuples, addresses.
///
/// Range constructors take `impl IntoAddress` so callers can mix forms freely.
pub trait IntoAddress {
    fn into_address(self) -> Result<Address, RangeError>;
}

impl IntoAddress for Address {
    fn into_address(self) -> Result<Address, RangeError> {
        Ok(self)
    }
}

impl IntoAddress for &Address {
    fn into_address(self) -> Result<Address, RangeError> {
        Ok(*self)
    }
}

impl IntoAddress for &str {
    fn into_address(self) -> Result<Address, RangeError> {
        Address::parse(self)
    }
}

impl IntoAddress for String {
    fn into_address(self) -> Result<Address, RangeError> {
        Address::parse(&self)
    }
}

impl IntoAddress for &String {
    fn into_address(self) -> Result<Address, RangeError> {
        Address::parse(self)
    }
}

impl IntoAddress for (u32, u32) {
    fn into_address(self) -> Result<Address, RangeError> {
        Address::new(self.0, self.1)
    }
}
