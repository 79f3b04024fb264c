//! Non-owning sheet handles.

use std::fmt;
use std::sync::Arc;

/// Remote sheet identifier (`sheetId` in grid ranges).
pub type SheetId = i64;

/// Cheap, clonable handle naming one sheet of one remote spreadsheet.
///
/// Every range bound to the same sheet holds its own clone. The handle never
/// owns or mutates sheet metadata; `grid_size` is a snapshot used only to
/// resolve unbounded grid ranges.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SheetRef {
    spreadsheet_id: Arc<str>,
    sheet_id: SheetId,
    title: Arc<str>,
    grid_size: Option<(u32, u32)>,
}

impl SheetRef {
    pub fn new(
        spreadsheet_id: impl Into<Arc<str>>,
        sheet_id: SheetId,
        title: impl Into<Arc<str>>,
    ) -> Self {
        SheetRef {
            spreadsheet_id: spreadsheet_id.into(),
            sheet_id,
            title: title.into(),
            grid_size: None,
        }
    }

    /// Attach the sheet's `(rows, columns)` as last reported by the remote.
    pub fn with_grid_size(mut self, rows: u32, cols: u32) -> Self {
        self.grid_size = Some((rows, cols));
        self
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn sheet_id(&self) -> SheetId {
        self.sheet_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn grid_size(&self) -> Option<(u32, u32)> {
        self.grid_size
    }

    /// Sheet title as it must appear before `!` in an A1 range.
    pub fn a1_prefix(&self) -> String {
        if needs_quoting(&self.title) {
            format!("'{}'", self.title.replace('\'', "''"))
        } else {
            self.title.to_string()
        }
    }
}

impl fmt::Display for SheetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

fn needs_quoting(title: &str) -> bool {
    let mut chars = title.chars();
    match chars.next() {
        None => true,
        Some(first) if first.is_ascii_digit() => true,
        Some(first) => {
            !(first.is_alphanumeric() || first == '_')
                || chars.any(|c| !(c.is_alphanumeric() || c == '_'))
        }
    }
}
