use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::address::{Address, IntoAddress};
use crate::error::RangeError;

/// Inclusive rectangular span of cells, ordered so `start` is above/left of `end`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawSpan"))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Span {
    start: Address,
    end: Address,
}

/// Unchecked wire form; ordering is validated on the way in.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawSpan {
    start: Address,
    end: Address,
}

#[cfg(feature = "serde")]
impl TryFrom<RawSpan> for Span {
    type Error = RangeError;

    fn try_from(raw: RawSpan) -> Result<Self, Self::Error> {
        Span::from_addresses(raw.start, raw.end)
    }
}

impl Span {
    /// Build a span from any pair of cell designators, validating the ordering.
    pub fn new(start: impl IntoAddress, end: impl IntoAddress) -> Result<Self, RangeError> {
        Span::from_addresses(start.into_address()?, end.into_address()?)
    }

    pub fn from_addresses(start: Address, end: Address) -> Result<Self, RangeError> {
        if start.row() > end.row() || start.column() > end.column() {
            return Err(RangeError::InvalidRange {
                label: format!("{start}:{end}"),
            });
        }
        Ok(Span { start, end })
    }

    /// Parse `"A1:B7"`. A single label (`"C3"`) yields a one-cell span.
    pub fn parse(text: &str) -> Result<Self, RangeError> {
        match text.split_once(':') {
            Some((start, end)) => Span::new(start, end),
            None => {
                let cell = Address::parse(text)?;
                Span::from_addresses(cell, cell)
            }
        }
    }

    #[inline]
    pub fn start(&self) -> Address {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Address {
        self.end
    }

    /// `"START:END"` label.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Replace both bounds. On error the span is left unchanged.
    pub fn resize(
        &mut self,
        start: impl IntoAddress,
        end: impl IntoAddress,
    ) -> Result<(), RangeError> {
        *self = Span::new(start, end)?;
        Ok(())
    }

    /// Number of rows covered (inclusive bounds).
    pub fn height(&self) -> u32 {
        self.end.row() - self.start.row() + 1
    }

    /// Number of columns covered (inclusive bounds).
    pub fn width(&self) -> u32 {
        self.end.column() - self.start.column() + 1
    }

    pub fn contains(&self, addr: Address) -> bool {
        addr.row() >= self.start.row()
            && addr.row() <= self.end.row()
            && addr.column() >= self.start.column()
            && addr.column() <= self.end.column()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

impl FromStr for Span {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Span::parse(s)
    }
}

impl PartialEq<str> for Span {
    fn eq(&self, other: &str) -> bool {
        self.render() == other
    }
}

impl PartialEq<&str> for Span {
    fn eq(&self, other: &&str) -> bool {
        self.render() == *other
    }
}
