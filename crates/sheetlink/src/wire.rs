//! JSON shapes exchanged with the remote. Row/column indices are 0-based and
//! end indices are exclusive.

use serde::{Deserialize, Serialize};
use sheetlink_common::CellValue;

use crate::options::MajorDimension;
use crate::sheet::SheetId;

/// Half-open rectangular span in remote coordinates.
///
/// The remote omits zero-valued fields, so every bound is optional: a missing
/// start means 0, a missing end means "through the last row/column".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRange {
    #[serde(default)]
    pub sheet_id: SheetId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_row_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_row_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_column_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column_index: Option<u32>,
}

impl GridRange {
    /// Whole-sheet target: only the sheet id, no bounds.
    pub fn unbounded(sheet_id: SheetId) -> Self {
        GridRange {
            sheet_id,
            ..GridRange::default()
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start_row_index.is_none()
            && self.end_row_index.is_none()
            && self.start_column_index.is_none()
            && self.end_column_index.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedRangeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub named_range_id: Option<String>,
    pub name: String,
    pub range: GridRange,
}

/// Principals allowed to edit a protected range.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Editors {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    #[serde(default)]
    pub domain_users_can_edit: bool,
}

impl Editors {
    pub fn users<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Editors {
            users: users.into_iter().map(Into::into).collect(),
            ..Editors::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectedRangeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected_range_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<GridRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub named_range_id: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub warning_only: bool,
    /// Output-only on the remote; never sent back.
    #[serde(default, skip_serializing)]
    pub requesting_user_can_edit: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unprotected_ranges: Vec<GridRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editors: Option<Editors>,
}

/// Body of a values read/write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    pub range: String,
    pub major_dimension: MajorDimension,
    #[serde(default)]
    pub values: Vec<Vec<CellValue>>,
}
