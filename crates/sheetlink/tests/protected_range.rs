use serde_json::json;
use sheetlink::{
    Editors, GatewayError, NamedRange, NamedRangeRegistry, ProtectedRange, ProtectedTarget,
    RangeError, RangeErrorKind, Request, SheetBoundSpan,
};
use sheetlink_testkit::{RecordingGateway, sheet};

fn span_protection() -> ProtectedRange {
    let bound = SheetBoundSpan::new(sheet(1, "Budget"), "A1", "C3").unwrap();
    ProtectedRange::builder()
        .span(bound)
        .description("locked")
        .build()
        .unwrap()
}

#[test]
fn create_stores_the_assigned_id() {
    let gw = RecordingGateway::new();
    let mut protection = span_protection();
    assert_eq!(protection.create(&gw).unwrap(), 1);
    assert_eq!(protection.id(), Some(1));

    let again = protection.create(&gw).unwrap_err();
    assert_eq!(again.kind(), RangeErrorKind::AlreadyRegistered);
    assert_eq!(gw.call_count(), 1);
}

#[test]
fn whole_sheet_creation_sends_unbounded_range_and_carve_outs() {
    let gw = RecordingGateway::new();
    let budget = sheet(1, "Budget");
    let mut protection = ProtectedRange::builder()
        .whole_sheet(budget.clone())
        .unprotected(SheetBoundSpan::new(budget.clone(), "B2", "B5").unwrap())
        .build()
        .unwrap();
    protection.create(&gw).unwrap();

    assert_eq!(
        gw.last_request_json().unwrap(),
        json!({"addProtectedRange": {"protectedRange": {
            "range": {"sheetId": 1},
            "warningOnly": false,
            "unprotectedRanges": [{"sheetId": 1, "startRowIndex": 1, "endRowIndex": 5,
                                   "startColumnIndex": 1, "endColumnIndex": 2}]
        }}})
    );
}

#[test]
fn named_range_protection_resolves_through_registry() {
    let gw = RecordingGateway::new();
    let mut registry = NamedRangeRegistry::new();
    let bound = SheetBoundSpan::new(sheet(1, "Budget"), "A1", "A9").unwrap();
    let named = registry
        .create(&gw, NamedRange::new(bound, "inputs").unwrap())
        .unwrap();

    let mut protection = ProtectedRange::builder().named_range(named).build().unwrap();
    protection.create(&gw).unwrap();

    match gw.requests().last().unwrap() {
        Request::AddProtectedRange { protected_range } => {
            assert_eq!(protected_range.named_range_id.as_deref(), Some("nr-1"));
            assert_eq!(protected_range.range, None);
        }
        other => panic!("unexpected request {other:?}"),
    }
    assert_eq!(
        protection.named_range(&registry).map(NamedRange::name),
        Some("inputs")
    );

    registry.delete(&gw, "inputs").unwrap();
    assert!(protection.named_range(&registry).is_none());
}

#[test]
fn editors_require_edit_permission_on_every_call() {
    let gw = RecordingGateway::new();
    let mut locked = ProtectedRange::from_json(
        sheet(1, "Budget"),
        &json!({
            "protectedRangeId": 12,
            "range": {"sheetId": 1, "startRowIndex": 0, "endRowIndex": 1,
                      "startColumnIndex": 0, "endColumnIndex": 1},
            "requestingUserCanEdit": false,
            "editors": {"users": ["owner@example.com"]}
        }),
    )
    .unwrap();
    assert_eq!(locked.editors().unwrap_err(), RangeError::NoPermission);
    assert_eq!(
        locked
            .set_editors(&gw, Editors::users(["me@example.com"]))
            .unwrap_err(),
        RangeError::NoPermission
    );
    assert_eq!(locked.editors().unwrap_err(), RangeError::NoPermission);
    assert_eq!(gw.call_count(), 0);

    let mut open = ProtectedRange::from_json(
        sheet(1, "Budget"),
        &json!({
            "protectedRangeId": 13,
            "range": {"sheetId": 1},
            "requestingUserCanEdit": true
        }),
    )
    .unwrap();
    assert_eq!(open.editors().unwrap(), None);
    let editors = Editors::users(["a@example.com", "b@example.com"]);
    open.set_editors(&gw, editors.clone()).unwrap();
    assert_eq!(open.editors().unwrap(), Some(&editors));
}

#[test]
fn linked_edits_push_one_field_at_a_time() {
    let gw = RecordingGateway::new();
    let mut protection = span_protection();
    protection.create(&gw).unwrap();

    protection.set_warning_only(&gw, true).unwrap();
    assert!(protection.warning_only());
    assert_eq!(protection.pending_fields(), None);
    assert_eq!(
        gw.last_request_json().unwrap(),
        json!({"updateProtectedRange": {
            "protectedRange": {"protectedRangeId": 1, "description": "locked", "warningOnly": true},
            "fields": "warningOnly"
        }})
    );

    gw.fail_next_batch(GatewayError::Api {
        code: 403,
        message: "forbidden".into(),
    });
    let err = protection.set_description(&gw, "open").unwrap_err();
    assert_eq!(err.kind(), RangeErrorKind::RequestError);
    assert_eq!(protection.description(), "locked");
}

#[test]
fn unlinked_edits_save_as_one_update() {
    let gw = RecordingGateway::new();
    let mut protection = span_protection();
    protection.create(&gw).unwrap();
    gw.clear();

    assert_eq!(protection.save(&gw).unwrap(), None);
    assert_eq!(gw.call_count(), 0);

    protection.unlink().unwrap();
    protection.set_editors(&gw, Editors::users(["x@example.com"])).unwrap();
    protection.set_description(&gw, "review").unwrap();
    assert_eq!(gw.call_count(), 0);
    assert_eq!(protection.pending_fields().as_deref(), Some("description,editors"));

    assert!(protection.save(&gw).unwrap().is_some());
    assert_eq!(protection.pending_fields(), None);
    let requests = gw.requests();
    assert_eq!(requests.len(), 1);
    match &requests[0] {
        Request::UpdateProtectedRange {
            protected_range,
            fields,
        } => {
            assert_eq!(fields, "description,editors");
            assert_eq!(protected_range.protected_range_id, Some(1));
            assert_eq!(protected_range.description, "review");
            assert_eq!(protected_range.range, None);
        }
        other => panic!("unexpected request {other:?}"),
    }
}

#[test]
fn edits_before_creation_ride_along() {
    let gw = RecordingGateway::new();
    let mut protection = span_protection();
    protection.set_warning_only(&gw, true).unwrap();
    assert_eq!(gw.call_count(), 0);
    assert_eq!(protection.pending_fields().as_deref(), Some("warningOnly"));
    assert_eq!(
        protection.save(&gw).unwrap_err().kind(),
        RangeErrorKind::NotRegistered
    );

    protection.create(&gw).unwrap();
    assert_eq!(protection.pending_fields(), None);
    match gw.requests().last().unwrap() {
        Request::AddProtectedRange { protected_range } => assert!(protected_range.warning_only),
        other => panic!("unexpected request {other:?}"),
    }
}

#[test]
fn delete_ends_the_lifecycle() {
    let gw = RecordingGateway::new();
    let mut protection = span_protection();
    assert_eq!(
        protection.delete(&gw).unwrap_err().kind(),
        RangeErrorKind::NotRegistered
    );

    protection.create(&gw).unwrap();
    protection.delete(&gw).unwrap();
    assert!(protection.is_deleted());
    assert_eq!(
        gw.last_request_json().unwrap(),
        json!({"deleteProtectedRange": {"protectedRangeId": 1}})
    );
    assert_eq!(
        protection.set_description(&gw, "x").unwrap_err().kind(),
        RangeErrorKind::Deleted
    );
    assert_eq!(protection.save(&gw).unwrap_err().kind(), RangeErrorKind::Deleted);
}

#[test]
fn from_json_keeps_span_targets() {
    let protection = ProtectedRange::from_json(
        sheet(1, "Budget"),
        &json!({
            "protectedRangeId": 4,
            "range": {"sheetId": 1, "startRowIndex": 4, "endRowIndex": 10,
                      "startColumnIndex": 0, "endColumnIndex": 2},
            "description": "rates",
            "warningOnly": true
        }),
    )
    .unwrap();
    match protection.target() {
        ProtectedTarget::Span(bound) => assert_eq!(bound.render(), "A5:B10"),
        other => panic!("unexpected target {other:?}"),
    }
    assert_eq!(protection.description(), "rates");
    assert!(protection.warning_only());
    assert!(!protection.requesting_user_can_edit());
}

#[test]
fn link_saves_pending_edits_only_once_registered() {
    let gw = RecordingGateway::new();
    let mut protection = span_protection();
    protection.unlink().unwrap();
    protection.set_description(&gw, "draft").unwrap();

    protection.link(&gw, true).unwrap();
    assert!(protection.link_mode().is_linked());
    assert_eq!(gw.call_count(), 0);
    assert_eq!(protection.pending_fields().as_deref(), Some("description"));

    protection.create(&gw).unwrap();
    protection.unlink().unwrap();
    protection.set_warning_only(&gw, true).unwrap();
    protection.link(&gw, false).unwrap();
    assert_eq!(protection.pending_fields().as_deref(), Some("warningOnly"));

    protection.unlink().unwrap();
    protection.link(&gw, true).unwrap();
    assert_eq!(protection.pending_fields(), None);
    assert_eq!(
        gw.request_names(),
        vec!["addProtectedRange", "updateProtectedRange"]
    );
}

#[test]
fn from_json_prefers_named_range_target() {
    let protection = ProtectedRange::from_json(
        sheet(1, "Budget"),
        &json!({
            "protectedRangeId": 21,
            "namedRangeId": "nr-7",
            "range": {"sheetId": 1, "startRowIndex": 0, "endRowIndex": 3,
                      "startColumnIndex": 0, "endColumnIndex": 1}
        }),
    )
    .unwrap();
    match protection.target() {
        ProtectedTarget::NamedRange {
            sheet,
            named_range_id,
        } => {
            assert_eq!(named_range_id, "nr-7");
            assert_eq!(sheet.sheet_id(), 1);
        }
        other => panic!("unexpected target {other:?}"),
    }
    let data = protection.to_data();
    assert_eq!(data.named_range_id.as_deref(), Some("nr-7"));
    assert_eq!(data.range, None);
}

#[test]
fn unlink_after_delete_is_refused() {
    let gw = RecordingGateway::new();
    let mut protection = span_protection();
    protection.create(&gw).unwrap();
    protection.delete(&gw).unwrap();
    assert_eq!(protection.unlink().unwrap_err().kind(), RangeErrorKind::Deleted);
    assert_eq!(
        protection.link(&gw, false).unwrap_err().kind(),
        RangeErrorKind::Deleted
    );
}
