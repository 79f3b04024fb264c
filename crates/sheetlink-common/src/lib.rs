//! Address, span, value, and error types shared by the SheetLink range layer.
//!
//! Nothing in this crate talks to a remote; see the `sheetlink` crate for the
//! sheet-bound and synchronized range types.

pub mod address;
pub mod coord;
pub mod error;
pub mod range;
pub mod value;

pub use address::{Address, IntoAddress};
pub use coord::{column_to_letters, letters_to_column};
pub use error::{GatewayError, RangeError, RangeErrorKind};
pub use range::Span;
pub use value::CellValue;
