#![allow(non_snake_case)]

use super::*;

fn sample() -> DataMap {
    let mut map = DataMap::new();
    map.put("title", WireValue::String("Song".to_string()));
    map.put("length", WireValue::Int(215));
    map
}

#[test]
fn DataMap___put___replaces_existing_key_in_place() {
    let mut map = sample();

    map.put("title", WireValue::String("Other".to_string()));

    assert_eq!(map.len(), 2);
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["title", "length"]);
    assert_eq!(
        map.get("title"),
        Some(&WireValue::String("Other".to_string()))
    );
}

#[test]
fn DataMap___get_as___wrong_wire_type_returns_none() {
    let map = sample();

    let value: Option<i64> = map.get_as("length");

    assert_eq!(value, None);
}

#[test]
fn DataMap___get_as___matching_type_returns_value() {
    let map = sample();

    let value: Option<i32> = map.get_as("length");

    assert_eq!(value, Some(215));
}

#[test]
fn DataMap___remove___drops_entry() {
    let mut map = sample();

    let removed = map.remove("title");

    assert!(removed.is_some());
    assert!(!map.contains_key("title"));
    assert_eq!(map.len(), 1);
}

#[test]
fn DataMap___to_bytes___starts_with_frame_header() {
    let bytes = sample().to_bytes().unwrap();

    assert!(DataMap::is_framed(&bytes));
    assert_eq!(&bytes[..4], b"CDM1");
}

#[test]
fn DataMap___from_bytes___restores_nested_map() {
    let mut map = sample();
    map.put("inner", WireValue::Map(sample()));

    let decoded = DataMap::from_bytes(&map.to_bytes().unwrap()).unwrap();

    assert_eq!(decoded, map);
}

#[test]
fn DataMap___from_bytes___unframed_json_is_rejected() {
    let result = DataMap::from_bytes(b"[]");

    assert!(matches!(result, Err(CodecError::InvalidFormat(_))));
}

#[test]
fn DataMap___from_bytes___corrupt_body_returns_error() {
    let result = DataMap::from_bytes(b"CDM1{oops");

    assert!(matches!(result, Err(CodecError::Deserialization(_))));
}

#[test]
fn DataMap___is_framed___plain_json_is_not_framed() {
    assert!(!DataMap::is_framed(br#"{"a":1}"#));
    assert!(!DataMap::is_framed(b""));
}

#[test]
fn DataMap___from_iter___deduplicates_keys() {
    let map: DataMap = vec![
        ("a".to_string(), WireValue::Int(1)),
        ("a".to_string(), WireValue::Int(2)),
    ]
    .into_iter()
    .collect();

    assert_eq!(map.len(), 1);
    assert_eq!(map.get_as::<i32>("a"), Some(2));
}

#[test]
fn DataMap___from_bytes___non_finite_floats_survive() {
    let mut map = DataMap::new();
    map.put("level", WireValue::Double(f64::INFINITY));
    map.put("ratio", WireValue::Float(f32::NAN));
    map.put("samples", WireValue::FloatArray(vec![f32::NEG_INFINITY, -0.0, 1.5]));

    let decoded = DataMap::from_bytes(&map.to_bytes().unwrap()).unwrap();

    assert_eq!(decoded.get_as::<f64>("level"), Some(f64::INFINITY));
    assert!(decoded.get_as::<f32>("ratio").is_some_and(f32::is_nan));
    let samples: Vec<u32> = decoded
        .get_as::<Vec<f32>>("samples")
        .unwrap()
        .into_iter()
        .map(f32::to_bits)
        .collect();
    assert_eq!(
        samples,
        vec![f32::NEG_INFINITY.to_bits(), (-0.0f32).to_bits(), 1.5f32.to_bits()]
    );
}

#[test]
fn DataMap___from_bytes___repeated_key_keeps_last_value() {
    let frame = br#"CDM1[["a",{"t":"int","v":1}],["b",{"t":"bool","v":true}],["a",{"t":"int","v":2}]]"#;

    let decoded = DataMap::from_bytes(frame).unwrap();

    assert_eq!(decoded.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(decoded.get_as::<i32>("a"), Some(2));
}

#[test]
fn DataMap___from_bytes___repeated_key_in_nested_map_is_merged() {
    let frame = br#"CDM1[["inner",{"t":"map","v":[["x",{"t":"int","v":1}],["x",{"t":"int","v":3}]]}]]"#;

    let decoded = DataMap::from_bytes(frame).unwrap();

    let inner: DataMap = decoded.get_as("inner").unwrap();
    assert_eq!(inner.len(), 1);
    assert_eq!(inner.get_as::<i32>("x"), Some(3));
}
