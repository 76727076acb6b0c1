#![allow(non_snake_case)]

use super::*;

#[test]
fn Declarations___from_toml___parses_types_and_annotations() {
    let source = r#"
        [[types]]
        name = "MainActivity"
        supertype = "BaseActivity"

        [[types.fields]]
        name = "value"
        ty = "i32"
        annotations = [{ receive_data = "/value" }]

        [[types.methods]]
        name = "on_node"
        params = ["Node"]
        annotations = ["local_node", "background_thread"]
    "#;

    let decls = Declarations::from_toml(source).unwrap();

    let main = decls.get("MainActivity").unwrap();
    assert_eq!(main.supertype.as_deref(), Some("BaseActivity"));
    assert_eq!(
        main.fields[0].annotations,
        vec![Annotation::ReceiveData("/value".to_string())]
    );
    assert_eq!(
        main.methods[0].annotations,
        vec![Annotation::LocalNode, Annotation::BackgroundThread]
    );
}

#[test]
fn Declarations___from_toml___parses_modifiers() {
    let source = r#"
        [[types]]
        name = "Song"
        deliverable = true

        [[types.fields]]
        name = "id"
        ty = "i64"
        modifiers = { final = true, static = true }
    "#;

    let decls = Declarations::from_toml(source).unwrap();

    let song = decls.get("Song").unwrap();
    assert!(song.deliverable);
    assert!(song.fields[0].modifiers.is_final);
    assert!(song.fields[0].modifiers.is_static);
    assert!(!song.fields[0].modifiers.private);
}

#[test]
fn Declarations___from_json___parses_same_shape() {
    let source = r#"{
        "types": [{
            "name": "Main",
            "methods": [{
                "name": "on_message",
                "params": ["String", "&str"],
                "annotations": [{"receive_messages": "/chat"}]
            }]
        }]
    }"#;

    let decls = Declarations::from_json(source).unwrap();

    assert_eq!(decls.types[0].methods[0].params, vec!["String", "&str"]);
}

#[test]
fn Declarations___from_toml___unknown_annotation_is_config_error() {
    let source = r#"
        [[types]]
        name = "Main"

        [[types.fields]]
        name = "x"
        ty = "i32"
        annotations = ["receive_everything"]
    "#;

    let result = Declarations::from_toml(source);

    assert!(matches!(result, Err(courier_core::CourierError::Config(_))));
}

#[test]
fn TypeDecl___builder___collects_members() {
    let decl = TypeDecl::new("Main")
        .extends("Base")
        .field(FieldDecl::new("value", "i32").annotate(Annotation::ReceiveData("/v".into())))
        .method(MethodDecl::new("on_value", ["i32"]));

    assert_eq!(decl.supertype.as_deref(), Some("Base"));
    assert_eq!(decl.fields.len(), 1);
    assert_eq!(decl.methods[0].params, vec!["i32".to_string()]);
}

#[test]
fn Annotation___is_category___false_only_for_background_marker() {
    assert!(Annotation::LocalNode.is_category());
    assert!(Annotation::ReceiveMessages("/m".into()).is_category());
    assert!(!Annotation::BackgroundThread.is_category());
}
