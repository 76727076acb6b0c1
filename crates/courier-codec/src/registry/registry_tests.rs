#![allow(non_snake_case)]

use super::*;
use crate::{Blob, MemoryAssetStore, WireValue, field};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Song {
    title: String,
    plays: i64,
}

impl Packable for Song {
    const TYPE_NAME: &'static str = "Song";

    fn pack_into(&self, map: &mut DataMap, _ctx: &CodecContext<'_>) -> Result<(), CodecError> {
        field::put(map, "title", &self.title);
        field::put(map, "plays", &self.plays);
        Ok(())
    }

    fn unpack_from(&mut self, map: &DataMap, _ctx: &CodecContext<'_>) -> Result<(), CodecError> {
        field::take(map, "title", &mut self.title);
        field::take(map, "plays", &mut self.plays);
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Artwork {
    image: Blob,
}

impl Packable for Artwork {
    const TYPE_NAME: &'static str = "Artwork";

    fn pack_into(&self, map: &mut DataMap, ctx: &CodecContext<'_>) -> Result<(), CodecError> {
        field::put_asset(map, "image", &self.image, ctx)
    }

    fn unpack_from(&mut self, map: &DataMap, ctx: &CodecContext<'_>) -> Result<(), CodecError> {
        field::take_asset(map, "image", &mut self.image, ctx)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Unregistered {
    id: u32,
    tags: Vec<String>,
}

fn packager() -> Packager {
    Packager::new(Arc::new(CodecRegistry::new().with_packable::<Song>()))
}

#[test]
fn Packager___pack___registered_type_uses_structured_frame() {
    let song = Song {
        title: "Rain".to_string(),
        plays: 3,
    };

    let bytes = packager().pack(&song).unwrap();

    assert!(DataMap::is_framed(&bytes));
    let map = DataMap::from_bytes(&bytes).unwrap();
    assert_eq!(map.get("plays"), Some(&WireValue::Long(3)));
}

#[test]
fn Packager___unpack___registered_type_round_trips() {
    let packager = packager();
    let song = Song {
        title: "Rain".to_string(),
        plays: 3,
    };

    let restored: Song = packager.unpack(&packager.pack(&song).unwrap()).unwrap();

    assert_eq!(restored, song);
}

#[test]
fn Packager___unregistered_type___falls_back_to_opaque_and_round_trips() {
    let packager = packager();
    let value = Unregistered {
        id: 7,
        tags: vec!["a".to_string()],
    };

    let bytes = packager.pack(&value).unwrap();
    let restored: Unregistered = packager.unpack(&bytes).unwrap();

    assert!(!DataMap::is_framed(&bytes));
    assert_eq!(restored, value);
}

#[test]
fn Packager___unpack___unframed_bytes_for_registered_type_use_opaque_path() {
    let json = serde_json::to_vec(&Song {
        title: "Old sender".to_string(),
        plays: 1,
    })
    .unwrap();

    let restored: Song = packager().unpack(&json).unwrap();

    assert_eq!(restored.title, "Old sender");
}

#[test]
fn Packager___pack___primitive_is_opaque_json() {
    let bytes = packager().pack(&42i32).unwrap();

    assert_eq!(bytes, b"42");
}

#[test]
fn Packager___assets___stored_through_configured_store() {
    let store = Arc::new(MemoryAssetStore::new());
    let packager = Packager::new(Arc::new(CodecRegistry::new().with_packable::<Artwork>()))
        .with_assets(store.clone());
    let artwork = Artwork {
        image: Blob::new(vec![1u8; 64]),
    };

    let bytes = packager.pack_packable(&artwork).unwrap();
    let restored: Artwork = packager.unpack_packable(&bytes).unwrap();

    assert_eq!(restored, artwork);
    assert_eq!(store.len(), 1);
}

#[test]
fn CodecRegistry___new___registers_primitive_decoders() {
    let registry = CodecRegistry::new();

    assert!(registry.has_decoder("i32"));
    assert!(registry.has_decoder("String"));
    assert!(registry.has_decoder("Vec< u8 >"));
    assert!(!registry.has_decoder("Song"));
}

#[test]
fn CodecRegistry___decode_payload___primitive_downcasts() {
    let registry = CodecRegistry::new();

    let payload = registry
        .decode_payload("i32", b"42", &CodecContext::new())
        .unwrap();

    assert_eq!(payload.downcast_ref::<i32>(), Some(&42));
}

#[test]
fn CodecRegistry___decode_payload___packable_requires_frame() {
    let registry = CodecRegistry::new().with_packable::<Song>();

    let result = registry.decode_payload("Song", b"{}", &CodecContext::new());

    assert!(matches!(result, Err(CodecError::InvalidFormat(_))));
}

#[test]
fn CodecRegistry___decode_payload___unknown_name_is_not_registered() {
    let registry = CodecRegistry::empty();

    let result = registry.decode_payload("Song", b"{}", &CodecContext::new());

    assert!(matches!(result, Err(CodecError::NotRegistered(name)) if name == "Song"));
}

#[test]
fn CodecRegistry___with_decoder___custom_decoder_is_used() {
    let registry = CodecRegistry::empty().with_decoder("Upper", |data: &[u8], _: &CodecContext<'_>| {
        let text = String::from_utf8_lossy(data).to_uppercase();
        Ok(Arc::new(text) as Payload)
    });

    let payload = registry
        .decode_payload("Upper", b"quiet", &CodecContext::new())
        .unwrap();

    assert_eq!(
        payload.downcast_ref::<String>().map(String::as_str),
        Some("QUIET")
    );
}

#[test]
fn CodecRegistry___has_structured___only_for_registered_types() {
    let registry = CodecRegistry::new().with_packable::<Song>();

    assert!(registry.has_structured::<Song>());
    assert!(!registry.has_structured::<Unregistered>());
}
