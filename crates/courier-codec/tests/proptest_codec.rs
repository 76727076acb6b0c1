//! Property-based tests for the data map codec
//!
//! Framed maps survive the byte form unchanged, and opaque values survive
//! the fallback path, whatever their content.

use courier_codec::{CodecRegistry, DataMap, Packager, WireValue};
use proptest::prelude::*;
use std::sync::Arc;

// Strategy: leaf values, non-finite floats included
fn arb_leaf() -> impl Strategy<Value = WireValue> {
    prop_oneof![
        prop_oneof![any::<f64>(), Just(f64::NAN), Just(f64::INFINITY)].prop_map(WireValue::Double),
        prop_oneof![any::<f32>(), Just(f32::NAN), Just(f32::NEG_INFINITY)].prop_map(WireValue::Float),
        prop::collection::vec(any::<f32>(), 0..8).prop_map(WireValue::FloatArray),
        any::<bool>().prop_map(WireValue::Bool),
        any::<i8>().prop_map(WireValue::Byte),
        any::<i32>().prop_map(WireValue::Int),
        any::<i64>().prop_map(WireValue::Long),
        ".*".prop_map(WireValue::String),
        prop::collection::vec(any::<u8>(), 0..32).prop_map(WireValue::ByteArray),
        prop::collection::vec(".*", 0..4).prop_map(WireValue::StringList),
    ]
}

fn arb_key() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9_]{0,15}"
}

fn arb_map() -> impl Strategy<Value = DataMap> {
    let flat = prop::collection::vec((arb_key(), arb_leaf()), 0..8)
        .prop_map(|entries| entries.into_iter().collect::<DataMap>());
    flat.prop_recursive(2, 16, 4, |inner| {
        prop::collection::vec((arb_key(), inner.prop_map(WireValue::Map)), 0..4)
            .prop_map(|entries| entries.into_iter().collect::<DataMap>())
    })
}

proptest! {
    /// Property: the framed byte form restores the same map
    ///
    /// Compared through a second encoding, since NaN entries are never equal.
    #[test]
    fn proptest_data_map_bytes_roundtrip(map in arb_map()) {
        let bytes = map.to_bytes().expect("encoding a map should succeed");

        prop_assert!(DataMap::is_framed(&bytes));
        let decoded = DataMap::from_bytes(&bytes).expect("decoding a framed map should succeed");
        prop_assert_eq!(decoded.len(), map.len());
        prop_assert_eq!(decoded.to_bytes().expect("re-encoding should succeed"), bytes);
    }

    /// Property: unframed input is never mistaken for a map
    #[test]
    fn proptest_unframed_bytes_rejected(data in prop::collection::vec(any::<u8>(), 0..64)) {
        prop_assume!(!data.starts_with(b"CDM1"));

        prop_assert!(DataMap::from_bytes(&data).is_err());
    }

    /// Property: opaque fallback round-trips arbitrary string lists
    #[test]
    fn proptest_opaque_fallback_roundtrip(values in prop::collection::vec(".*", 0..8)) {
        let packager = Packager::new(Arc::new(CodecRegistry::new()));

        let bytes = packager.pack(&values).expect("opaque encoding should succeed");
        let restored: Vec<String> = packager.unpack(&bytes).expect("opaque decoding should succeed");

        prop_assert_eq!(restored, values);
    }
}
