//! Sheet-bound spans that carry a cached value matrix.

use std::fmt;

use serde_json::Value as JsonValue;
use sheetlink_common::{CellValue, GatewayError, IntoAddress, RangeError};

use crate::gateway::RemoteGateway;
use crate::grid::SheetBoundSpan;
use crate::options::{MajorDimension, SaveOptions, ValueInputOption, WindowOptions};
use crate::sheet::SheetRef;
use crate::sync::{LinkMode, RangeKind, SequenceLike};
use crate::wire::ValueRange;

pub type Matrix = Vec<Vec<CellValue>>;

/// A [`SheetBoundSpan`] plus the values last fetched from (or staged for) it.
///
/// The matrix is stored in the orientation given by the window's
/// [`MajorDimension`]: with `Rows` the outer vector holds rows, with `Columns`
/// it holds columns. A cached matrix always spans the full range; short replies
/// from the remote are padded with [`CellValue::Empty`].
#[derive(Debug, Clone)]
pub struct ValueWindow {
    bound: SheetBoundSpan,
    values: Option<Matrix>,
    options: WindowOptions,
    mode: LinkMode,
    dirty: bool,
}

impl ValueWindow {
    /// A window with nothing fetched yet.
    pub fn new(bound: SheetBoundSpan) -> Self {
        ValueWindow {
            bound,
            values: None,
            options: WindowOptions::default(),
            mode: LinkMode::default(),
            dirty: false,
        }
    }

    pub fn on_sheet(
        sheet: SheetRef,
        start: impl IntoAddress,
        end: impl IntoAddress,
    ) -> Result<Self, RangeError> {
        Ok(ValueWindow::new(SheetBoundSpan::new(sheet, start, end)?))
    }

    /// A window seeded with caller-supplied row-major values.
    ///
    /// An empty matrix seeds nothing: the window stays unloaded and the first
    /// [`values`](Self::values) call fetches.
    pub fn with_values(bound: SheetBoundSpan, values: Matrix) -> Result<Self, RangeError> {
        let mut window = ValueWindow::new(bound);
        window.check_shape(&values)?;
        if !values.is_empty() {
            window.values = Some(values);
        }
        Ok(window)
    }

    /// Replace the read options. A change of major dimension re-orients any
    /// cached values.
    pub fn with_options(mut self, options: WindowOptions) -> Self {
        self.set_major_dimension(options.major_dimension);
        self.options = options;
        self
    }

    pub fn bound(&self) -> &SheetBoundSpan {
        &self.bound
    }

    pub fn sheet(&self) -> &SheetRef {
        self.bound.sheet()
    }

    /// `"A1:B7"` label of the window.
    pub fn render(&self) -> String {
        self.bound.render()
    }

    pub fn options(&self) -> WindowOptions {
        self.options
    }

    pub fn major_dimension(&self) -> MajorDimension {
        self.options.major_dimension
    }

    pub fn link_mode(&self) -> LinkMode {
        self.mode
    }

    /// Local values differ from what the remote was last told.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_loaded(&self) -> bool {
        self.values.is_some()
    }

    pub fn kind(&self) -> RangeKind {
        RangeKind::ValueBacked
    }

    /// Cached matrix, without fetching.
    pub fn cached(&self) -> Option<&[Vec<CellValue>]> {
        self.values.as_deref()
    }

    /// Cached matrix, fetching it first if nothing is cached.
    pub fn values<G: RemoteGateway + ?Sized>(
        &mut self,
        gateway: &G,
    ) -> Result<&[Vec<CellValue>], RangeError> {
        if self.values.is_none() {
            self.load(gateway)?;
        }
        Ok(self.values.as_deref().unwrap_or(&[]))
    }

    /// Drop the cache so the next [`values`](Self::values) call refetches.
    pub fn invalidate(&mut self) {
        self.values = None;
        self.dirty = false;
    }

    /// Fetch the range and overwrite the cache.
    ///
    /// This is destructive: unsaved local edits are discarded.
    pub fn load<G: RemoteGateway + ?Sized>(&mut self, gateway: &G) -> Result<(), RangeError> {
        let range = self.bound.a1_range();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            spreadsheet_id = self.bound.spreadsheet_id(),
            range = range.as_str(),
            major_dimension = %self.options.major_dimension,
            "values_get"
        );
        let fetched = gateway.values_get(
            self.bound.spreadsheet_id(),
            &range,
            self.options.major_dimension,
            self.options.value_render_option,
            self.options.date_time_render_option,
        )?;
        self.values = Some(self.pad_to_shape(fetched)?);
        self.dirty = false;
        Ok(())
    }

    pub fn reload<G: RemoteGateway + ?Sized>(&mut self, gateway: &G) -> Result<(), RangeError> {
        self.invalidate();
        self.load(gateway)
    }

    /// Push the cached matrix to the remote. Does not reload afterwards.
    pub fn save<G: RemoteGateway + ?Sized>(
        &mut self,
        gateway: &G,
        value_input_option: ValueInputOption,
        include_values_in_response: bool,
    ) -> Result<JsonValue, RangeError> {
        let values = self.values.as_ref().ok_or_else(|| {
            RangeError::invalid_argument(format!(
                "window {} has no values to save",
                self.bound
            ))
        })?;
        let response = self.push(gateway, values, value_input_option, include_values_in_response)?;
        self.dirty = false;
        Ok(response)
    }

    /// Replace the window's values.
    ///
    /// Linked: the values are written first and cached only once the remote
    /// accepted them. Unlinked: they are cached and the window becomes dirty.
    pub fn set_values<G: RemoteGateway + ?Sized>(
        &mut self,
        gateway: &G,
        values: Matrix,
    ) -> Result<(), RangeError> {
        self.check_shape(&values)?;
        match self.mode {
            LinkMode::Linked => {
                let defaults = SaveOptions::default();
                self.push(
                    gateway,
                    &values,
                    defaults.value_input_option,
                    defaults.include_values_in_response,
                )?;
                self.values = Some(values);
                self.dirty = false;
            }
            LinkMode::Unlinked => {
                #[cfg(feature = "tracing")]
                tracing::trace!(range = %self.bound, "buffered value edit");
                self.values = Some(values);
                self.dirty = true;
            }
        }
        Ok(())
    }

    /// Re-orient the cache. Changing the dimension transposes the matrix;
    /// setting the current one is a no-op.
    pub fn set_major_dimension(&mut self, dim: MajorDimension) {
        if dim == self.options.major_dimension {
            return;
        }
        if let Some(values) = self.values.take() {
            self.values = Some(transpose(values));
        }
        self.options.major_dimension = dim;
    }

    /// Move the window. Cached values no longer describe the range and are dropped.
    pub fn resize(
        &mut self,
        start: impl IntoAddress,
        end: impl IntoAddress,
    ) -> Result<(), RangeError> {
        self.bound.resize(start, end)?;
        self.invalidate();
        Ok(())
    }

    /// Switch to linked mode, flushing buffered edits when `push` is set.
    pub fn link<G: RemoteGateway + ?Sized>(
        &mut self,
        gateway: &G,
        push: bool,
    ) -> Result<(), RangeError> {
        if push && self.dirty {
            let defaults = SaveOptions::default();
            self.save(
                gateway,
                defaults.value_input_option,
                defaults.include_values_in_response,
            )?;
        }
        self.mode = LinkMode::Linked;
        Ok(())
    }

    pub fn unlink(&mut self) {
        self.mode = LinkMode::Unlinked;
    }

    fn push<G: RemoteGateway + ?Sized>(
        &self,
        gateway: &G,
        values: &Matrix,
        value_input_option: ValueInputOption,
        include_values_in_response: bool,
    ) -> Result<JsonValue, RangeError> {
        let body = ValueRange {
            range: self.bound.a1_range(),
            major_dimension: self.options.major_dimension,
            values: values.clone(),
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(
            spreadsheet_id = self.bound.spreadsheet_id(),
            range = body.range.as_str(),
            input = %value_input_option,
            "values_update"
        );
        Ok(gateway.values_update(
            self.bound.spreadsheet_id(),
            &body.range,
            &body,
            value_input_option,
            include_values_in_response,
        )?)
    }

    /// `(outer, inner)` lengths a full matrix must have.
    fn expected_shape(&self) -> (usize, usize) {
        let span = self.bound.span();
        let (rows, cols) = (span.height() as usize, span.width() as usize);
        match self.options.major_dimension {
            MajorDimension::Rows => (rows, cols),
            MajorDimension::Columns => (cols, rows),
        }
    }

    fn check_shape(&self, values: &Matrix) -> Result<(), RangeError> {
        if values.is_empty() {
            return Ok(());
        }
        let (outer, inner) = self.expected_shape();
        if values.len() != outer || values.iter().any(|line| line.len() != inner) {
            return Err(RangeError::invalid_argument(format!(
                "values do not fit {} ({} major): expected {outer}x{inner}",
                self.bound, self.options.major_dimension
            )));
        }
        Ok(())
    }

    fn pad_to_shape(&self, mut values: Matrix) -> Result<Matrix, RangeError> {
        let (outer, inner) = self.expected_shape();
        if values.len() > outer || values.iter().any(|line| line.len() > inner) {
            return Err(GatewayError::MalformedResponse(format!(
                "values for {} exceed {outer}x{inner}",
                self.bound
            ))
            .into());
        }
        values.resize_with(outer, Vec::new);
        for line in &mut values {
            line.resize(inner, CellValue::Empty);
        }
        Ok(values)
    }
}

fn transpose(values: Matrix) -> Matrix {
    let inner = values.first().map_or(0, Vec::len);
    let mut out: Matrix = (0..inner).map(|_| Vec::with_capacity(values.len())).collect();
    for line in values {
        for (j, cell) in line.into_iter().enumerate() {
            out[j].push(cell);
        }
    }
    out
}

impl SequenceLike for ValueWindow {
    type Item = Vec<CellValue>;

    fn len(&self) -> usize {
        self.values.as_ref().map_or(0, Vec::len)
    }

    fn get(&self, index: usize) -> Result<&Self::Item, RangeError> {
        self.values
            .as_ref()
            .and_then(|values| values.get(index))
            .ok_or(RangeError::CellNotFound {
                index,
                len: self.len(),
            })
    }

    fn iter(&self) -> std::slice::Iter<'_, Self::Item> {
        self.values.as_deref().unwrap_or(&[]).iter()
    }
}

/// Windows are the same window when they cover the same cells of the same
/// spreadsheet; cached contents are not compared.
impl PartialEq for ValueWindow {
    fn eq(&self, other: &Self) -> bool {
        self.bound.a1_range() == other.bound.a1_range()
            && self.bound.spreadsheet_id() == other.bound.spreadsheet_id()
    }
}

impl fmt::Display for ValueWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.bound.fmt(f)
    }
}
