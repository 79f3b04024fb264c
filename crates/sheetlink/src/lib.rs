//! Spreadsheet ranges that stay in sync with a remote spreadsheet service.
//!
//! Plain spans and the A1 codec live in [`sheetlink_common`] and are
//! re-exported here. This crate binds spans to sheets and adds the synchronized
//! layers on top:
//!
//! - [`ValueWindow`]: a span with a cached value matrix
//! - [`NamedRange`] / [`NamedRangeRegistry`]: remotely named spans
//! - [`ProtectedRange`]: edit protection over a span, a sheet, or a named range
//!
//! All remote traffic goes through a caller-supplied [`RemoteGateway`].

pub mod gateway;
pub mod grid;
pub mod named_range;
pub mod options;
pub mod protected_range;
pub mod sheet;
pub mod sync;
pub mod value_window;
pub mod wire;

pub use sheetlink_common::{
    Address, CellValue, GatewayError, IntoAddress, RangeError, RangeErrorKind, Span,
    column_to_letters, letters_to_column,
};

pub use gateway::{RemoteGateway, Request};
pub use grid::{DEFAULT_FORMAT_FIELDS, SheetBoundSpan};
pub use named_range::{NamedRange, NamedRangeRegistry};
pub use options::{
    DateTimeRenderOption, MajorDimension, SaveOptions, ValueInputOption, ValueRenderOption,
    WindowOptions,
};
pub use protected_range::{ProtectedRange, ProtectedRangeBuilder, ProtectedTarget};
pub use sheet::{SheetId, SheetRef};
pub use sync::{LinkMode, RangeKind, SequenceLike};
pub use value_window::{Matrix, ValueWindow};
pub use wire::{Editors, GridRange, NamedRangeData, ProtectedRangeData, ValueRange};
