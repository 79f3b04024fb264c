//! Spans bound to a sheet, and their projection onto remote grid ranges.
//!
//! Locally a span is 1-based with inclusive bounds; the remote wants 0-based
//! indices with an exclusive end. For rows (columns are identical):
//!
//! ```text
//! startRowIndex = start.row - 1
//! endRowIndex   = end.row          // exclusive remote end == inclusive 1-based row
//! ```

use std::fmt;

use serde_json::Value as JsonValue;
use sheetlink_common::{Address, IntoAddress, RangeError, Span};

use crate::gateway::{RemoteGateway, Request, send_one};
use crate::sheet::{SheetId, SheetRef};
use crate::sync::RangeKind;
use crate::wire::GridRange;

/// Fields mask sent with `repeatCell` when the caller does not pick one.
pub const DEFAULT_FORMAT_FIELDS: &str =
    "userEnteredFormat,hyperlink,note,textFormatRuns,dataValidation,pivotTable";

/// A [`Span`] on a specific sheet.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SheetBoundSpan {
    sheet: SheetRef,
    span: Span,
}

impl SheetBoundSpan {
    pub fn new(
        sheet: SheetRef,
        start: impl IntoAddress,
        end: impl IntoAddress,
    ) -> Result<Self, RangeError> {
        Ok(SheetBoundSpan {
            sheet,
            span: Span::new(start, end)?,
        })
    }

    pub fn from_span(sheet: SheetRef, span: Span) -> Self {
        SheetBoundSpan { sheet, span }
    }

    /// Parse `"A1:B7"` (no sheet prefix) onto `sheet`.
    pub fn parse(sheet: SheetRef, text: &str) -> Result<Self, RangeError> {
        Ok(SheetBoundSpan {
            sheet,
            span: Span::parse(text)?,
        })
    }

    /// Rebuild from a remote grid range.
    ///
    /// Missing start indices are 0. Missing end indices run to the edge of the
    /// sheet and need [`SheetRef::grid_size`]; without it the range cannot be
    /// resolved.
    pub fn from_grid_range(sheet: SheetRef, grid: &GridRange) -> Result<Self, RangeError> {
        if grid.sheet_id != sheet.sheet_id() {
            return Err(RangeError::invalid_argument(format!(
                "grid range targets sheet {} but was bound to sheet {} ({})",
                grid.sheet_id,
                sheet.sheet_id(),
                sheet.title()
            )));
        }
        let one_based = |idx: Option<u32>| {
            idx.unwrap_or(0)
                .checked_add(1)
                .ok_or_else(|| RangeError::invalid_argument("grid index overflows u32"))
        };
        let grid_size = sheet.grid_size();
        let start = Address::new(
            one_based(grid.start_row_index)?,
            one_based(grid.start_column_index)?,
        )?;
        let end = Address::new(
            resolve_end(grid.end_row_index, grid_size.map(|(rows, _)| rows), &sheet)?,
            resolve_end(grid.end_column_index, grid_size.map(|(_, cols)| cols), &sheet)?,
        )?;
        let span = Span::from_addresses(start, end)?;
        Ok(SheetBoundSpan { sheet, span })
    }

    /// Fully-bounded remote projection of this span.
    pub fn to_grid_range(&self) -> GridRange {
        GridRange {
            sheet_id: self.sheet.sheet_id(),
            start_row_index: Some(self.span.start().row() - 1),
            end_row_index: Some(self.span.end().row()),
            start_column_index: Some(self.span.start().column() - 1),
            end_column_index: Some(self.span.end().column()),
        }
    }

    pub fn sheet(&self) -> &SheetRef {
        &self.sheet
    }

    pub fn sheet_id(&self) -> SheetId {
        self.sheet.sheet_id()
    }

    pub fn spreadsheet_id(&self) -> &str {
        self.sheet.spreadsheet_id()
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn start(&self) -> Address {
        self.span.start()
    }

    pub fn end(&self) -> Address {
        self.span.end()
    }

    /// `"A1:B7"` without the sheet prefix.
    pub fn render(&self) -> String {
        self.span.render()
    }

    /// Sheet-qualified A1 range for the values API, e.g. `'My Sheet'!A1:B7`.
    pub fn a1_range(&self) -> String {
        format!("{}!{}", self.sheet.a1_prefix(), self.span)
    }

    /// Replace both bounds locally. Remote state is not touched.
    pub fn resize(
        &mut self,
        start: impl IntoAddress,
        end: impl IntoAddress,
    ) -> Result<(), RangeError> {
        self.span.resize(start, end)
    }

    pub fn kind(&self) -> RangeKind {
        RangeKind::SheetBound
    }

    /// Apply one cell format to every cell of the span via `repeatCell`.
    ///
    /// `cell` is passed through untouched; `fields` defaults to
    /// [`DEFAULT_FORMAT_FIELDS`].
    pub fn apply_format<G: RemoteGateway + ?Sized>(
        &self,
        gateway: &G,
        cell: JsonValue,
        fields: Option<&str>,
    ) -> Result<JsonValue, RangeError> {
        let request = Request::RepeatCell {
            range: self.to_grid_range(),
            cell,
            fields: fields.unwrap_or(DEFAULT_FORMAT_FIELDS).to_string(),
        };
        Ok(send_one(gateway, self.spreadsheet_id(), request)?)
    }
}

fn resolve_end(
    idx: Option<u32>,
    sheet_edge: Option<u32>,
    sheet: &SheetRef,
) -> Result<u32, RangeError> {
    idx.or(sheet_edge).ok_or_else(|| {
        RangeError::invalid_argument(format!(
            "grid range on `{}` is unbounded and the sheet size is unknown",
            sheet.title()
        ))
    })
}

impl fmt::Display for SheetBoundSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}", self.sheet.title(), self.span)
    }
}
