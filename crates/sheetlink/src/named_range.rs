//! Named ranges: sheet-bound spans registered remotely under a unique name.

use std::fmt;

use rustc_hash::FxHashMap;
use serde_json::Value as JsonValue;
use sheetlink_common::{GatewayError, IntoAddress, RangeError, Span};

use crate::gateway::{RemoteGateway, Request, first_reply, send_one};
use crate::grid::SheetBoundSpan;
use crate::sheet::SheetRef;
use crate::sync::{Lifecycle, LinkMode, RangeKind};
use crate::wire::NamedRangeData;

const ENTITY: &str = "named range";
const ID_POINTER: &str = "/addNamedRange/namedRange/namedRangeId";

/// A named span whose id is assigned by the remote on [`create`](Self::create).
///
/// Edits are only accepted once the range is registered. In linked mode each
/// edit is pushed before it is committed locally, so a rejected rename leaves
/// the old name in place.
#[derive(Debug, Clone)]
pub struct NamedRange {
    bound: SheetBoundSpan,
    name: String,
    state: Lifecycle<String>,
    mode: LinkMode,
    dirty: bool,
}

impl NamedRange {
    /// An unregistered named range.
    pub fn new(bound: SheetBoundSpan, name: impl Into<String>) -> Result<Self, RangeError> {
        let name = name.into();
        check_name(&name)?;
        Ok(NamedRange {
            bound,
            name,
            state: Lifecycle::Unregistered,
            mode: LinkMode::default(),
            dirty: false,
        })
    }

    /// Wrap a named range the remote already knows, e.g. one entry of
    /// `spreadsheet.namedRanges`.
    pub fn from_json(sheet: SheetRef, json: &JsonValue) -> Result<Self, RangeError> {
        let data: NamedRangeData = serde_json::from_value(json.clone()).map_err(|e| {
            RangeError::invalid_argument(format!("not a named range object: {e}"))
        })?;
        NamedRange::from_data(sheet, data)
    }

    pub fn from_data(sheet: SheetRef, data: NamedRangeData) -> Result<Self, RangeError> {
        let id = data
            .named_range_id
            .ok_or_else(|| RangeError::invalid_argument("named range object has no namedRangeId"))?;
        check_name(&data.name)?;
        Ok(NamedRange {
            bound: SheetBoundSpan::from_grid_range(sheet, &data.range)?,
            name: data.name,
            state: Lifecycle::Registered(id),
            mode: LinkMode::default(),
            dirty: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Remote id, once registered.
    pub fn id(&self) -> Option<&str> {
        self.state.id().map(String::as_str)
    }

    pub fn bound(&self) -> &SheetBoundSpan {
        &self.bound
    }

    pub fn sheet(&self) -> &SheetRef {
        self.bound.sheet()
    }

    pub fn span(&self) -> Span {
        self.bound.span()
    }

    pub fn kind(&self) -> RangeKind {
        RangeKind::Named
    }

    pub fn link_mode(&self) -> LinkMode {
        self.mode
    }

    pub fn is_registered(&self) -> bool {
        matches!(self.state, Lifecycle::Registered(_))
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self.state, Lifecycle::Deleted)
    }

    /// Buffered edits not yet sent.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Wire form of the current local state.
    pub fn to_data(&self) -> NamedRangeData {
        NamedRangeData {
            named_range_id: self.state.id().cloned(),
            name: self.name.clone(),
            range: self.bound.to_grid_range(),
        }
    }

    /// Register with the remote and adopt the id it assigns.
    pub fn create<G: RemoteGateway + ?Sized>(&mut self, gateway: &G) -> Result<&str, RangeError> {
        self.state.require_unregistered(ENTITY)?;
        let request = Request::AddNamedRange {
            named_range: self.to_data(),
        };
        let response = send_one(gateway, self.bound.spreadsheet_id(), request)
            .map_err(|e| RangeError::from_named_range_failure(e, &self.name))?;
        let id = first_reply(&response, ID_POINTER)?
            .as_str()
            .ok_or_else(|| {
                GatewayError::MalformedResponse(format!("{ID_POINTER} is not a string"))
            })?
            .to_string();

        #[cfg(feature = "tracing")]
        tracing::debug!(name = self.name.as_str(), id = id.as_str(), "named range created");

        self.state = Lifecycle::Registered(id);
        Ok(self.id().unwrap_or_default())
    }

    pub fn rename<G: RemoteGateway + ?Sized>(
        &mut self,
        gateway: &G,
        name: impl Into<String>,
    ) -> Result<(), RangeError> {
        let name = name.into();
        check_name(&name)?;
        self.state.require_registered(ENTITY)?;
        if self.mode.is_linked() {
            let data = NamedRangeData {
                name: name.clone(),
                ..self.to_data()
            };
            self.push(gateway, data, &name)?;
        } else {
            self.buffered("rename");
        }
        self.name = name;
        Ok(())
    }

    /// Move the range to new bounds on the same sheet.
    pub fn resize<G: RemoteGateway + ?Sized>(
        &mut self,
        gateway: &G,
        start: impl IntoAddress,
        end: impl IntoAddress,
    ) -> Result<(), RangeError> {
        let span = Span::new(start, end)?;
        self.state.require_registered(ENTITY)?;
        if self.mode.is_linked() {
            let moved = SheetBoundSpan::from_span(self.bound.sheet().clone(), span);
            let data = NamedRangeData {
                range: moved.to_grid_range(),
                ..self.to_data()
            };
            let name = self.name.clone();
            self.push(gateway, data, &name)?;
        } else {
            self.buffered("resize");
        }
        self.bound = SheetBoundSpan::from_span(self.bound.sheet().clone(), span);
        Ok(())
    }

    /// Remove the range remotely. Afterwards every operation fails with `Deleted`.
    pub fn delete<G: RemoteGateway + ?Sized>(&mut self, gateway: &G) -> Result<(), RangeError> {
        let id = self.state.require_registered(ENTITY)?;
        send_one(
            gateway,
            self.bound.spreadsheet_id(),
            Request::DeleteNamedRange { named_range_id: id },
        )?;

        #[cfg(feature = "tracing")]
        tracing::debug!(name = self.name.as_str(), "named range deleted");

        self.state = Lifecycle::Deleted;
        self.dirty = false;
        Ok(())
    }

    /// Flush buffered edits as one update. Returns whether anything was sent.
    pub fn sync<G: RemoteGateway + ?Sized>(&mut self, gateway: &G) -> Result<bool, RangeError> {
        self.state.require_registered(ENTITY)?;
        if !self.dirty {
            return Ok(false);
        }
        let name = self.name.clone();
        self.push(gateway, self.to_data(), &name)?;
        self.dirty = false;
        Ok(true)
    }

    /// Return to linked mode, flushing buffered edits first when `push` is set.
    pub fn link<G: RemoteGateway + ?Sized>(
        &mut self,
        gateway: &G,
        push: bool,
    ) -> Result<(), RangeError> {
        self.state.require_live(ENTITY)?;
        if push && self.is_registered() {
            self.sync(gateway)?;
        }
        self.mode = LinkMode::Linked;
        Ok(())
    }

    /// Buffer further edits until [`sync`](Self::sync) or [`link`](Self::link).
    pub fn unlink(&mut self) -> Result<(), RangeError> {
        self.state.require_live(ENTITY)?;
        self.mode = LinkMode::Unlinked;
        Ok(())
    }

    fn push<G: RemoteGateway + ?Sized>(
        &self,
        gateway: &G,
        data: NamedRangeData,
        name: &str,
    ) -> Result<(), RangeError> {
        let request = Request::UpdateNamedRange {
            named_range: data,
            fields: "*".to_string(),
        };
        send_one(gateway, self.bound.spreadsheet_id(), request)
            .map_err(|e| RangeError::from_named_range_failure(e, name))?;
        Ok(())
    }

    fn buffered(&mut self, _edit: &'static str) {
        #[cfg(feature = "tracing")]
        tracing::trace!(name = self.name.as_str(), edit = _edit, "buffered named range edit");
        self.dirty = true;
    }
}

fn check_name(name: &str) -> Result<(), RangeError> {
    if name.trim().is_empty() {
        return Err(RangeError::invalid_argument("named range name is empty"));
    }
    Ok(())
}

impl fmt::Display for NamedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.bound)
    }
}

/// The named ranges of one spreadsheet, keyed by name.
///
/// Protected ranges refer to named ranges by id only; this is where those ids
/// resolve. Ranges are only handed out by shared reference: edits go through
/// the registry so the name key never goes stale.
#[derive(Debug, Default, Clone)]
pub struct NamedRangeRegistry {
    by_name: FxHashMap<String, NamedRange>,
}

impl NamedRangeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap the `namedRanges` array of a spreadsheet reply. Each entry is bound
    /// to the sheet in `sheets` whose id matches its `range.sheetId`.
    pub fn from_json(sheets: &[SheetRef], list: &JsonValue) -> Result<Self, RangeError> {
        let entries = list
            .as_array()
            .ok_or_else(|| RangeError::invalid_argument("namedRanges is not an array"))?;
        let mut registry = NamedRangeRegistry::new();
        for entry in entries {
            let data: NamedRangeData = serde_json::from_value(entry.clone()).map_err(|e| {
                RangeError::invalid_argument(format!("not a named range object: {e}"))
            })?;
            let sheet = sheets
                .iter()
                .find(|sheet| sheet.sheet_id() == data.range.sheet_id)
                .ok_or_else(|| {
                    RangeError::invalid_argument(format!(
                        "named range `{}` is on unknown sheet {}",
                        data.name, data.range.sheet_id
                    ))
                })?;
            registry.insert(NamedRange::from_data(sheet.clone(), data)?);
        }
        Ok(registry)
    }

    /// Track an already registered range, replacing any entry with its name.
    pub fn insert(&mut self, range: NamedRange) -> Option<NamedRange> {
        self.by_name.insert(range.name().to_string(), range)
    }

    /// Register `range` remotely and track it. A name the registry already
    /// tracks is refused without a round trip.
    pub fn create<G: RemoteGateway + ?Sized>(
        &mut self,
        gateway: &G,
        mut range: NamedRange,
    ) -> Result<&NamedRange, RangeError> {
        self.check_free(range.name())?;
        range.create(gateway)?;
        let name = range.name().to_string();
        let tracked: &NamedRange = self.by_name.entry(name).or_insert(range);
        Ok(tracked)
    }

    pub fn get(&self, name: &str) -> Option<&NamedRange> {
        self.by_name.get(name)
    }

    pub fn get_by_id(&self, id: &str) -> Option<&NamedRange> {
        self.by_name.values().find(|range| range.id() == Some(id))
    }

    /// Rename through the range's own link mode and re-key the entry.
    ///
    /// Fails with `DuplicateNamedRange` when `new` names another tracked range,
    /// even if the range is unlinked and the remote would not be asked.
    pub fn rename<G: RemoteGateway + ?Sized>(
        &mut self,
        gateway: &G,
        old: &str,
        new: &str,
    ) -> Result<(), RangeError> {
        if old != new {
            self.check_free(new)?;
        }
        let mut range = self.by_name.remove(old).ok_or_else(|| unknown(old))?;
        let result = range.rename(gateway, new);
        let key = range.name().to_string();
        self.by_name.insert(key, range);
        result
    }

    pub fn resize<G: RemoteGateway + ?Sized>(
        &mut self,
        gateway: &G,
        name: &str,
        start: impl IntoAddress,
        end: impl IntoAddress,
    ) -> Result<(), RangeError> {
        self.entry(name)?.resize(gateway, start, end)
    }

    pub fn unlink(&mut self, name: &str) -> Result<(), RangeError> {
        self.entry(name)?.unlink()
    }

    pub fn link<G: RemoteGateway + ?Sized>(
        &mut self,
        gateway: &G,
        name: &str,
        push: bool,
    ) -> Result<(), RangeError> {
        self.entry(name)?.link(gateway, push)
    }

    pub fn sync<G: RemoteGateway + ?Sized>(
        &mut self,
        gateway: &G,
        name: &str,
    ) -> Result<bool, RangeError> {
        self.entry(name)?.sync(gateway)
    }

    /// Delete remotely, then stop tracking the range.
    pub fn delete<G: RemoteGateway + ?Sized>(
        &mut self,
        gateway: &G,
        name: &str,
    ) -> Result<NamedRange, RangeError> {
        self.entry(name)?.delete(gateway)?;
        self.by_name.remove(name).ok_or_else(|| unknown(name))
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedRange> {
        self.by_name.values()
    }

    fn entry(&mut self, name: &str) -> Result<&mut NamedRange, RangeError> {
        self.by_name.get_mut(name).ok_or_else(|| unknown(name))
    }

    fn check_free(&self, name: &str) -> Result<(), RangeError> {
        if self.by_name.contains_key(name) {
            return Err(RangeError::DuplicateNamedRange {
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

fn unknown(name: &str) -> RangeError {
    RangeError::invalid_argument(format!("no named range called `{name}`"))
}
