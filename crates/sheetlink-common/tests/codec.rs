use proptest::prelude::*;
use sheetlink_common::{Address, RangeErrorKind, Span, column_to_letters, letters_to_column};

proptest! {
    #[test]
    fn encode_then_decode_restores_coordinates(row in 1u32..=1_048_576, col in 1u32..=50_000) {
        let label = Address::new(row, col).unwrap().label();
        let decoded = Address::parse(&label).unwrap();
        prop_assert_eq!(decoded.coords(), (row, col));
    }

    #[test]
    fn decode_ignores_letter_case(row in 1u32..10_000, col in 1u32..20_000) {
        let label = Address::new(row, col).unwrap().label();
        let lower = Address::parse(&label.to_ascii_lowercase()).unwrap();
        prop_assert_eq!(lower.label(), label);
    }

    #[test]
    fn letters_never_contain_a_zero_digit(col in 1u32..=u32::MAX) {
        let letters = column_to_letters(col).unwrap();
        prop_assert!(letters.bytes().all(|b| b.is_ascii_uppercase()));
        prop_assert_eq!(letters_to_column(&letters), Some(col));
    }

    #[test]
    fn ordered_spans_always_build(
        r1 in 1u32..500, c1 in 1u32..500, dr in 0u32..500, dc in 0u32..500,
    ) {
        let span = Span::new((r1, c1), (r1 + dr, c1 + dc)).unwrap();
        prop_assert_eq!(span.height(), dr + 1);
        prop_assert_eq!(span.width(), dc + 1);
        prop_assert_eq!(Span::parse(&span.render()).unwrap(), span);
    }
}

#[test]
fn az100_end_to_end() {
    let addr = Address::parse("AZ100").unwrap();
    assert_eq!(addr.coords(), (100, 52));
    assert_eq!(Address::new(100, 52).unwrap().label(), "AZ100");
}

#[test]
fn documented_boundaries() {
    let expected = [
        ((1, 1), "A1"),
        ((1, 26), "Z1"),
        ((1, 27), "AA1"),
        ((25, 5), "E25"),
        ((3, 52), "AZ3"),
        ((3, 53), "BA3"),
        ((3, 702), "ZZ3"),
        ((3, 703), "AAA3"),
    ];
    for ((row, col), label) in expected {
        assert_eq!(Address::new(row, col).unwrap().label(), label);
        assert_eq!(Address::parse(label).unwrap().coords(), (row, col));
    }
}

#[test]
fn inverted_span_is_invalid_range() {
    assert_eq!(
        Span::new("B7", "A1").unwrap_err().kind(),
        RangeErrorKind::InvalidRange
    );
}

#[cfg(feature = "serde")]
mod serde_forms {
    use sheetlink_common::{Address, CellValue, Span};

    #[test]
    fn address_serializes_as_label() {
        let addr = Address::parse("c7").unwrap();
        assert_eq!(serde_json::to_string(&addr).unwrap(), "\"C7\"");
        let back: Address = serde_json::from_str("\"C7\"").unwrap();
        assert_eq!(back, addr);
        assert!(serde_json::from_str::<Address>("\"7C\"").is_err());
    }

    #[test]
    fn span_serializes_bounds() {
        let span = Span::new("A1", "B7").unwrap();
        let json = serde_json::to_value(span).unwrap();
        assert_eq!(json, serde_json::json!({"start": "A1", "end": "B7"}));
        let back: Span = serde_json::from_value(json).unwrap();
        assert_eq!(back, span);
    }

    #[test]
    fn inverted_spans_do_not_deserialize() {
        let err = serde_json::from_value::<Span>(serde_json::json!({"start": "B7", "end": "A1"}))
            .unwrap_err();
        assert!(err.to_string().contains("B7:A1"), "{err}");
    }

    #[test]
    fn cell_values_follow_wire_conventions() {
        let row: Vec<CellValue> = serde_json::from_str(r#"["a", 1.5, true, "", null]"#).unwrap();
        assert_eq!(
            row,
            vec![
                CellValue::Text("a".into()),
                CellValue::Number(1.5),
                CellValue::Boolean(true),
                CellValue::Empty,
                CellValue::Empty,
            ]
        );
        assert_eq!(
            serde_json::to_string(&vec![CellValue::Empty, CellValue::Number(2.0)]).unwrap(),
            r#"["",2.0]"#
        );
    }
}
