//! Protected ranges: edit restrictions over a span, a whole sheet, or a named range.

use std::fmt;

use serde_json::Value as JsonValue;
use sheetlink_common::{GatewayError, RangeError};

use crate::gateway::{RemoteGateway, Request, first_reply, send_one};
use crate::grid::SheetBoundSpan;
use crate::named_range::{NamedRange, NamedRangeRegistry};
use crate::sheet::SheetRef;
use crate::sync::{Lifecycle, LinkMode, RangeKind};
use crate::wire::{Editors, GridRange, ProtectedRangeData};

const ENTITY: &str = "protected range";
const ID_POINTER: &str = "/addProtectedRange/protectedRange/protectedRangeId";

/// What a protected range covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtectedTarget {
    Span(SheetBoundSpan),
    /// The whole sheet except the carve-outs.
    WholeSheet {
        sheet: SheetRef,
        unprotected: Vec<SheetBoundSpan>,
    },
    /// A named range, held by id. Resolve it with [`ProtectedRange::named_range`].
    NamedRange {
        sheet: SheetRef,
        named_range_id: String,
    },
}

impl ProtectedTarget {
    pub fn sheet(&self) -> &SheetRef {
        match self {
            ProtectedTarget::Span(bound) => bound.sheet(),
            ProtectedTarget::WholeSheet { sheet, .. }
            | ProtectedTarget::NamedRange { sheet, .. } => sheet,
        }
    }

    fn write_into(&self, data: &mut ProtectedRangeData) {
        match self {
            ProtectedTarget::Span(bound) => data.range = Some(bound.to_grid_range()),
            ProtectedTarget::WholeSheet { sheet, unprotected } => {
                data.range = Some(GridRange::unbounded(sheet.sheet_id()));
                data.unprotected_ranges = unprotected
                    .iter()
                    .map(SheetBoundSpan::to_grid_range)
                    .collect();
            }
            ProtectedTarget::NamedRange { named_range_id, .. } => {
                data.named_range_id = Some(named_range_id.clone());
            }
        }
    }
}

/// Fields edited locally but not yet sent, in remote field-mask order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PendingFields {
    description: bool,
    warning_only: bool,
    editors: bool,
}

impl PendingFields {
    fn is_empty(self) -> bool {
        !(self.description || self.warning_only || self.editors)
    }

    fn mask(self) -> String {
        [
            (self.description, "description"),
            (self.warning_only, "warningOnly"),
            (self.editors, "editors"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect::<Vec<_>>()
        .join(",")
    }
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Description,
    WarningOnly,
    Editors,
}

impl Field {
    fn mark(self, pending: &mut PendingFields) {
        match self {
            Field::Description => pending.description = true,
            Field::WarningOnly => pending.warning_only = true,
            Field::Editors => pending.editors = true,
        }
    }
}

fn same_sheet(a: &SheetRef, b: &SheetRef) -> bool {
    a.sheet_id() == b.sheet_id() && a.spreadsheet_id() == b.spreadsheet_id()
}

/// Collects a protected range's target and metadata; exactly one target
/// (`span`, `whole_sheet` or `named_range`) must be chosen.
#[derive(Debug, Default, Clone)]
pub struct ProtectedRangeBuilder {
    span: Option<SheetBoundSpan>,
    whole_sheet: Option<SheetRef>,
    unprotected: Vec<SheetBoundSpan>,
    named: Option<(SheetRef, Option<String>)>,
    description: String,
    warning_only: bool,
    editors: Option<Editors>,
}

impl ProtectedRangeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn span(mut self, bound: SheetBoundSpan) -> Self {
        self.span = Some(bound);
        self
    }

    pub fn whole_sheet(mut self, sheet: SheetRef) -> Self {
        self.whole_sheet = Some(sheet);
        self
    }

    /// Leave `bound` editable inside a whole-sheet protection.
    pub fn unprotected(mut self, bound: SheetBoundSpan) -> Self {
        self.unprotected.push(bound);
        self
    }

    /// Protect a registered named range.
    pub fn named_range(mut self, range: &NamedRange) -> Self {
        self.named = Some((range.sheet().clone(), range.id().map(str::to_string)));
        self
    }

    pub fn named_range_id(mut self, sheet: SheetRef, id: impl Into<String>) -> Self {
        self.named = Some((sheet, Some(id.into())));
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn warning_only(mut self, warning_only: bool) -> Self {
        self.warning_only = warning_only;
        self
    }

    pub fn editors(mut self, editors: Editors) -> Self {
        self.editors = Some(editors);
        self
    }

    pub fn build(self) -> Result<ProtectedRange, RangeError> {
        if !self.unprotected.is_empty() && self.whole_sheet.is_none() {
            return Err(RangeError::invalid_argument(
                "unprotected ranges are only allowed when protecting a whole sheet",
            ));
        }
        let target = match (self.span, self.whole_sheet, self.named) {
            (Some(bound), None, None) => ProtectedTarget::Span(bound),
            (None, Some(sheet), None) => {
                if let Some(foreign) = self
                    .unprotected
                    .iter()
                    .find(|b| !same_sheet(b.sheet(), &sheet))
                {
                    return Err(RangeError::invalid_argument(format!(
                        "unprotected range {foreign} is not on sheet `{}`",
                        sheet.title()
                    )));
                }
                ProtectedTarget::WholeSheet {
                    sheet,
                    unprotected: self.unprotected,
                }
            }
            (None, None, Some((sheet, id))) => ProtectedTarget::NamedRange {
                sheet,
                named_range_id: id.ok_or(RangeError::NotRegistered {
                    entity: "named range",
                })?,
            },
            (span, whole_sheet, named) => {
                let chosen = [span.is_some(), whole_sheet.is_some(), named.is_some()]
                    .into_iter()
                    .filter(|set| *set)
                    .count();
                return Err(RangeError::invalid_argument(format!(
                    "protected range needs exactly one of span, whole sheet \
                     or named range ({chosen} given)"
                )));
            }
        };

        Ok(ProtectedRange {
            target,
            state: Lifecycle::Unregistered,
            description: self.description,
            warning_only: self.warning_only,
            requesting_user_can_edit: true,
            editors: self.editors,
            mode: LinkMode::default(),
            pending: PendingFields::default(),
        })
    }
}

/// Edit protection over part of a spreadsheet.
///
/// Editors are only visible to users who may edit the range themselves;
/// [`editors`](Self::editors) and [`set_editors`](Self::set_editors) fail with
/// `NoPermission` otherwise.
#[derive(Debug, Clone)]
pub struct ProtectedRange {
    target: ProtectedTarget,
    state: Lifecycle<i64>,
    description: String,
    warning_only: bool,
    requesting_user_can_edit: bool,
    editors: Option<Editors>,
    mode: LinkMode,
    pending: PendingFields,
}

impl ProtectedRange {
    pub fn builder() -> ProtectedRangeBuilder {
        ProtectedRangeBuilder::new()
    }

    /// Wrap an existing remote protected range (one entry of `sheet.protectedRanges`).
    pub fn from_json(sheet: SheetRef, json: &JsonValue) -> Result<Self, RangeError> {
        let data: ProtectedRangeData = serde_json::from_value(json.clone()).map_err(|e| {
            RangeError::invalid_argument(format!("not a protected range object: {e}"))
        })?;
        ProtectedRange::from_data(sheet, data)
    }

    pub fn from_data(sheet: SheetRef, data: ProtectedRangeData) -> Result<Self, RangeError> {
        let id = data.protected_range_id.ok_or_else(|| {
            RangeError::invalid_argument("protected range object has no protectedRangeId")
        })?;
        let target = match (data.named_range_id, data.range) {
            (Some(named_range_id), _) => ProtectedTarget::NamedRange {
                sheet,
                named_range_id,
            },
            (None, Some(range)) if range.is_unbounded() => {
                if range.sheet_id != sheet.sheet_id() {
                    return Err(RangeError::invalid_argument(format!(
                        "protected range targets sheet {} but was bound to sheet {}",
                        range.sheet_id,
                        sheet.sheet_id()
                    )));
                }
                let unprotected = data
                    .unprotected_ranges
                    .iter()
                    .map(|grid| SheetBoundSpan::from_grid_range(sheet.clone(), grid))
                    .collect::<Result<Vec<_>, _>>()?;
                ProtectedTarget::WholeSheet { sheet, unprotected }
            }
            (None, Some(range)) => {
                ProtectedTarget::Span(SheetBoundSpan::from_grid_range(sheet, &range)?)
            }
            (None, None) => {
                return Err(RangeError::invalid_argument(
                    "protected range object has neither range nor namedRangeId",
                ));
            }
        };
        Ok(ProtectedRange {
            target,
            state: Lifecycle::Registered(id),
            description: data.description,
            warning_only: data.warning_only,
            requesting_user_can_edit: data.requesting_user_can_edit,
            editors: data.editors,
            mode: LinkMode::default(),
            pending: PendingFields::default(),
        })
    }

    pub fn id(&self) -> Option<i64> {
        self.state.id().copied()
    }

    pub fn target(&self) -> &ProtectedTarget {
        &self.target
    }

    pub fn sheet(&self) -> &SheetRef {
        self.target.sheet()
    }

    /// The protected named range, looked up by id.
    pub fn named_range<'r>(&self, registry: &'r NamedRangeRegistry) -> Option<&'r NamedRange> {
        match &self.target {
            ProtectedTarget::NamedRange { named_range_id, .. } => {
                registry.get_by_id(named_range_id)
            }
            _ => None,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn warning_only(&self) -> bool {
        self.warning_only
    }

    pub fn requesting_user_can_edit(&self) -> bool {
        self.requesting_user_can_edit
    }

    pub fn kind(&self) -> RangeKind {
        RangeKind::Protected
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

    /// Field mask of edits waiting for [`save`](Self::save), if any.
    pub fn pending_fields(&self) -> Option<String> {
        (!self.pending.is_empty()).then(|| self.pending.mask())
    }

    /// Full wire form, as sent on creation.
    pub fn to_data(&self) -> ProtectedRangeData {
        let mut data = ProtectedRangeData {
            protected_range_id: self.id(),
            description: self.description.clone(),
            warning_only: self.warning_only,
            requesting_user_can_edit: self.requesting_user_can_edit,
            editors: self.editors.clone(),
            ..ProtectedRangeData::default()
        };
        self.target.write_into(&mut data);
        data
    }

    pub fn editors(&self) -> Result<Option<&Editors>, RangeError> {
        self.check_permission()?;
        Ok(self.editors.as_ref())
    }

    pub fn set_editors<G: RemoteGateway + ?Sized>(
        &mut self,
        gateway: &G,
        editors: Editors,
    ) -> Result<(), RangeError> {
        self.check_permission()?;
        self.edit(gateway, Field::Editors, |range| range.editors = Some(editors))
    }

    pub fn set_description<G: RemoteGateway + ?Sized>(
        &mut self,
        gateway: &G,
        description: impl Into<String>,
    ) -> Result<(), RangeError> {
        let description = description.into();
        self.edit(gateway, Field::Description, |range| range.description = description)
    }

    pub fn set_warning_only<G: RemoteGateway + ?Sized>(
        &mut self,
        gateway: &G,
        warning_only: bool,
    ) -> Result<(), RangeError> {
        self.edit(gateway, Field::WarningOnly, |range| range.warning_only = warning_only)
    }

    /// Register the protection. Buffered edits ride along and are no longer pending.
    pub fn create<G: RemoteGateway + ?Sized>(&mut self, gateway: &G) -> Result<i64, RangeError> {
        self.state.require_unregistered(ENTITY)?;
        let request = Request::AddProtectedRange {
            protected_range: self.to_data(),
        };
        let response = send_one(gateway, self.sheet().spreadsheet_id(), request)?;
        let id = first_reply(&response, ID_POINTER)?
            .as_i64()
            .ok_or_else(|| {
                GatewayError::MalformedResponse(format!("{ID_POINTER} is not an integer"))
            })?;

        #[cfg(feature = "tracing")]
        tracing::debug!(id, sheet = self.sheet().title(), "protected range created");

        self.state = Lifecycle::Registered(id);
        self.pending = PendingFields::default();
        Ok(id)
    }

    pub fn delete<G: RemoteGateway + ?Sized>(&mut self, gateway: &G) -> Result<(), RangeError> {
        let id = self.state.require_registered(ENTITY)?;
        send_one(
            gateway,
            self.sheet().spreadsheet_id(),
            Request::DeleteProtectedRange {
                protected_range_id: id,
            },
        )?;

        #[cfg(feature = "tracing")]
        tracing::debug!(id, "protected range deleted");

        self.state = Lifecycle::Deleted;
        self.pending = PendingFields::default();
        Ok(())
    }

    /// Send every pending edit as one `updateProtectedRange`.
    ///
    /// Returns `Ok(None)` without a round trip when nothing is pending.
    pub fn save<G: RemoteGateway + ?Sized>(
        &mut self,
        gateway: &G,
    ) -> Result<Option<JsonValue>, RangeError> {
        let id = self.state.require_registered(ENTITY)?;
        if self.pending.is_empty() {
            return Ok(None);
        }
        let response = self.push(gateway, self.to_update(id), self.pending.mask())?;
        self.pending = PendingFields::default();
        Ok(Some(response))
    }

    /// Return to linked mode, saving pending edits first when `push` is set.
    pub fn link<G: RemoteGateway + ?Sized>(
        &mut self,
        gateway: &G,
        push: bool,
    ) -> Result<(), RangeError> {
        self.state.require_live(ENTITY)?;
        if push && self.is_registered() {
            self.save(gateway)?;
        }
        self.mode = LinkMode::Linked;
        Ok(())
    }

    /// Buffer further edits until [`save`](Self::save) or [`link`](Self::link).
    pub fn unlink(&mut self) -> Result<(), RangeError> {
        self.state.require_live(ENTITY)?;
        self.mode = LinkMode::Unlinked;
        Ok(())
    }

    fn check_permission(&self) -> Result<(), RangeError> {
        if self.requesting_user_can_edit {
            Ok(())
        } else {
            Err(RangeError::NoPermission)
        }
    }

    /// Apply one field edit. Linked and registered: push it alone and commit
    /// after the remote accepts. Otherwise commit now and mark it pending.
    fn edit<G, F>(&mut self, gateway: &G, field: Field, apply: F) -> Result<(), RangeError>
    where
        G: RemoteGateway + ?Sized,
        F: FnOnce(&mut ProtectedRange),
    {
        self.state.require_live(ENTITY)?;
        match (self.mode, self.state.id().copied()) {
            (LinkMode::Linked, Some(id)) => {
                let mut staged = self.clone();
                apply(&mut staged);
                let mut only = PendingFields::default();
                field.mark(&mut only);
                staged.push(gateway, staged.to_update(id), only.mask())?;
                *self = staged;
            }
            _ => {
                apply(self);
                field.mark(&mut self.pending);
                #[cfg(feature = "tracing")]
                tracing::trace!(fields = %self.pending.mask(), "buffered protected range edit");
            }
        }
        Ok(())
    }

    /// Update body: the id plus the editable metadata. The target is never resent.
    fn to_update(&self, id: i64) -> ProtectedRangeData {
        ProtectedRangeData {
            protected_range_id: Some(id),
            description: self.description.clone(),
            warning_only: self.warning_only,
            editors: self.editors.clone(),
            ..ProtectedRangeData::default()
        }
    }

    fn push<G: RemoteGateway + ?Sized>(
        &self,
        gateway: &G,
        data: ProtectedRangeData,
        fields: String,
    ) -> Result<JsonValue, RangeError> {
        #[cfg(feature = "tracing")]
        tracing::trace!(
            id = ?data.protected_range_id,
            fields = fields.as_str(),
            "updating protected range"
        );
        let request = Request::UpdateProtectedRange {
            protected_range: data,
            fields,
        };
        Ok(send_one(gateway, self.sheet().spreadsheet_id(), request)?)
    }
}

impl fmt::Display for ProtectedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            ProtectedTarget::Span(bound) => write!(f, "protected {bound}"),
            ProtectedTarget::WholeSheet { sheet, .. } => write!(f, "protected sheet {sheet}"),
            ProtectedTarget::NamedRange { named_range_id, .. } => {
                write!(f, "protected named range {named_range_id}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sheetlink_common::RangeErrorKind;

    fn sheet() -> SheetRef {
        SheetRef::new("ss", 5, "Budget")
    }

    fn bound(start: &str, end: &str) -> SheetBoundSpan {
        SheetBoundSpan::new(sheet(), start, end).unwrap()
    }

    #[test]
    fn builder_requires_exactly_one_target() {
        let none = ProtectedRange::builder().build().unwrap_err();
        assert_eq!(none.kind(), RangeErrorKind::InvalidArgumentValue);

        let both = ProtectedRange::builder()
            .span(bound("A1", "B2"))
            .whole_sheet(sheet())
            .build()
            .unwrap_err();
        assert_eq!(both.kind(), RangeErrorKind::InvalidArgumentValue);

        let ok = ProtectedRange::builder().span(bound("A1", "B2")).build().unwrap();
        assert_eq!(ok.kind(), RangeKind::Protected);
        assert!(!ok.is_registered());
    }

    #[test]
    fn carve_outs_need_whole_sheet_on_same_sheet() {
        let stray = ProtectedRange::builder()
            .span(bound("A1", "B2"))
            .unprotected(bound("A1", "A1"))
            .build()
            .unwrap_err();
        assert_eq!(stray.kind(), RangeErrorKind::InvalidArgumentValue);

        let other_sheet = SheetBoundSpan::new(SheetRef::new("ss", 6, "Other"), "A1", "A1").unwrap();
        let foreign = ProtectedRange::builder()
            .whole_sheet(sheet())
            .unprotected(other_sheet)
            .build()
            .unwrap_err();
        assert_eq!(foreign.kind(), RangeErrorKind::InvalidArgumentValue);
    }

    #[test]
    fn unregistered_named_range_cannot_be_protected() {
        let named = NamedRange::new(bound("A1", "A3"), "inputs").unwrap();
        let err = ProtectedRange::builder().named_range(&named).build().unwrap_err();
        assert_eq!(err.kind(), RangeErrorKind::NotRegistered);
    }

    #[test]
    fn creation_payload_is_shaped_by_target() {
        let span = ProtectedRange::builder()
            .span(bound("A5", "B10"))
            .description("totals")
            .build()
            .unwrap();
        assert_eq!(
            serde_json::to_value(span.to_data()).unwrap(),
            json!({
                "range": {"sheetId": 5, "startRowIndex": 4, "endRowIndex": 10,
                          "startColumnIndex": 0, "endColumnIndex": 2},
                "description": "totals",
                "warningOnly": false
            })
        );

        let sheet_wide = ProtectedRange::builder()
            .whole_sheet(sheet())
            .unprotected(bound("C1", "C1"))
            .warning_only(true)
            .build()
            .unwrap();
        assert_eq!(
            serde_json::to_value(sheet_wide.to_data()).unwrap(),
            json!({
                "range": {"sheetId": 5},
                "warningOnly": true,
                "unprotectedRanges": [{"sheetId": 5, "startRowIndex": 0, "endRowIndex": 1,
                                       "startColumnIndex": 2, "endColumnIndex": 3}]
            })
        );

        let named = ProtectedRange::builder()
            .named_range_id(sheet(), "nr-9")
            .build()
            .unwrap();
        assert_eq!(
            serde_json::to_value(named.to_data()).unwrap(),
            json!({"namedRangeId": "nr-9", "warningOnly": false})
        );
    }

    #[test]
    fn from_json_recovers_target_and_permission() {
        let whole = ProtectedRange::from_json(
            sheet(),
            &json!({
                "protectedRangeId": 77,
                "range": {"sheetId": 5},
                "unprotectedRanges": [{"sheetId": 5, "startRowIndex": 0, "endRowIndex": 2,
                                       "startColumnIndex": 0, "endColumnIndex": 1}],
                "requestingUserCanEdit": false
            }),
        )
        .unwrap();
        assert_eq!(whole.id(), Some(77));
        match whole.target() {
            ProtectedTarget::WholeSheet { unprotected, .. } => {
                assert_eq!(unprotected[0].render(), "A1:A2");
            }
            other => panic!("unexpected target {other:?}"),
        }
        assert_eq!(whole.editors().unwrap_err(), RangeError::NoPermission);

        let missing = ProtectedRange::from_json(sheet(), &json!({"protectedRangeId": 1}));
        assert_eq!(missing.unwrap_err().kind(), RangeErrorKind::InvalidArgumentValue);
    }

    #[test]
    fn pending_mask_keeps_remote_field_order() {
        let pending = PendingFields {
            description: true,
            warning_only: false,
            editors: true,
        };
        assert_eq!(pending.mask(), "description,editors");
        assert!(PendingFields::default().is_empty());
    }
}
