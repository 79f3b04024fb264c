//! Typed request options for the values API.
//!
//! Every enum serializes to the remote's `SCREAMING_SNAKE_CASE` spelling, so
//! option structs can be loaded from any serde format by the embedding app.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a value matrix is organised row-first or column-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MajorDimension {
    #[default]
    Rows,
    Columns,
}

impl MajorDimension {
    pub fn as_str(self) -> &'static str {
        match self {
            MajorDimension::Rows => "ROWS",
            MajorDimension::Columns => "COLUMNS",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            MajorDimension::Rows => MajorDimension::Columns,
            MajorDimension::Columns => MajorDimension::Rows,
        }
    }
}

/// How cell values are rendered when read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueRenderOption {
    #[default]
    FormattedValue,
    UnformattedValue,
    Formula,
}

impl ValueRenderOption {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueRenderOption::FormattedValue => "FORMATTED_VALUE",
            ValueRenderOption::UnformattedValue => "UNFORMATTED_VALUE",
            ValueRenderOption::Formula => "FORMULA",
        }
    }
}

/// How dates and times are rendered when `ValueRenderOption` is not formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DateTimeRenderOption {
    #[default]
    SerialNumber,
    FormattedString,
}

impl DateTimeRenderOption {
    pub fn as_str(self) -> &'static str {
        match self {
            DateTimeRenderOption::SerialNumber => "SERIAL_NUMBER",
            DateTimeRenderOption::FormattedString => "FORMATTED_STRING",
        }
    }
}

/// How written values are interpreted by the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueInputOption {
    Raw,
    #[default]
    UserEntered,
}

impl ValueInputOption {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueInputOption::Raw => "RAW",
            ValueInputOption::UserEntered => "USER_ENTERED",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(
    MajorDimension,
    ValueRenderOption,
    DateTimeRenderOption,
    ValueInputOption
);

/// Read-side options carried by a `ValueWindow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WindowOptions {
    pub major_dimension: MajorDimension,
    pub value_render_option: ValueRenderOption,
    pub date_time_render_option: DateTimeRenderOption,
}

/// Write-side options used when flushing a `ValueWindow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SaveOptions {
    pub value_input_option: ValueInputOption,
    pub include_values_in_response: bool,
}
