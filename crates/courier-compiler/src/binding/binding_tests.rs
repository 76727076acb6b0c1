#![allow(non_snake_case)]

use super::*;
use crate::decl::Modifiers;
use test_case::test_case;

fn data(path: &str) -> Annotation {
    Annotation::ReceiveData(path.to_string())
}

fn message(path: &str) -> Annotation {
    Annotation::ReceiveMessages(path.to_string())
}

#[test]
fn bind_field___data_field___binds_with_background_affinity() {
    let field = FieldDecl::new("value", "i32").annotate(data("/value"));

    let out = bind_field("Main", &field);

    assert!(out.diagnostics.is_empty());
    assert_eq!(out.bindings.len(), 1);
    let binding = &out.bindings[0];
    assert_eq!(binding.category, Category::Data);
    assert_eq!(binding.path.as_deref(), Some("/value"));
    assert_eq!(binding.recipient.affinity, Affinity::Background);
}

#[test_case(Modifiers { private: true, ..Modifiers::default() })]
#[test_case(Modifiers { is_static: true, ..Modifiers::default() })]
#[test_case(Modifiers { is_final: true, ..Modifiers::default() })]
fn bind_field___restricted_modifiers___reported(modifiers: Modifiers) {
    let field = FieldDecl::new("value", "i32")
        .with_modifiers(modifiers)
        .annotate(data("/value"));

    let out = bind_field("Main", &field);

    assert!(out.bindings.is_empty());
    assert_eq!(
        out.diagnostics[0].message,
        "Annotated fields must not be private, static, nor final"
    );
}

#[test]
fn bind_field___local_node_wrong_type___reported() {
    let field = FieldDecl::new("me", "String").annotate(Annotation::LocalNode);

    let out = bind_field("Main", &field);

    assert!(out.bindings.is_empty());
    assert_eq!(out.diagnostics[0].member, "me");
}

#[test]
fn bind_field___remote_nodes_list___binds() {
    let field = FieldDecl::new("peers", "Vec< Node >").annotate(Annotation::RemoteNodes);

    let out = bind_field("Main", &field);

    assert!(out.diagnostics.is_empty());
    assert_eq!(out.bindings[0].recipient.payload_type, "Vec<Node>");
}

#[test]
fn bind_field___background_marker___accepted_and_redundant() {
    let field = FieldDecl::new("value", "i32")
        .annotate(data("/value"))
        .annotate(Annotation::BackgroundThread);

    let out = bind_field("Main", &field);

    assert!(out.diagnostics.is_empty());
    assert!(out.bindings[0].recipient.is_background());
}

#[test]
fn bind_field___each_category_yields_own_binding() {
    let field = FieldDecl::new("value", "i32")
        .annotate(data("/value"))
        .annotate(message("/value"));

    let out = bind_field("Main", &field);

    let categories: Vec<Category> = out.bindings.iter().map(|b| b.category).collect();
    assert_eq!(categories, vec![Category::Data, Category::Message]);
}

#[test]
fn bind_method___single_payload___binds_main_affinity() {
    let method = MethodDecl::new("on_new_value", ["i32"]).annotate(data("/value"));

    let out = bind_method("Main", &method);

    assert!(out.diagnostics.is_empty());
    let recipient = &out.bindings[0].recipient;
    assert_eq!(recipient.affinity, Affinity::Main);
    assert!(!recipient.has_node_param);
}

#[test]
fn bind_method___trailing_node_id___sets_node_param() {
    let method = MethodDecl::new("on_song", ["Song", "&str"]).annotate(message("/song"));

    let out = bind_method("Main", &method);

    assert!(out.bindings[0].recipient.has_node_param);
}

#[test]
fn bind_method___background_marker___sets_background_affinity() {
    let method = MethodDecl::new("on_song", ["Song"])
        .annotate(Annotation::BackgroundThread)
        .annotate(data("/song"));

    let out = bind_method("Main", &method);

    assert!(out.bindings[0].recipient.is_background());
}

#[test_case(vec![], "Incorrect number of parameters for method." ; "no parameters")]
#[test_case(vec!["i32", "String", "String"], "Incorrect number of parameters for method." ; "three parameters")]
#[test_case(vec!["i32", "i64"], "The second parameter must be a String (represents the source node ID)" ; "bad second parameter")]
fn bind_method___bad_data_parameters___reported(params: Vec<&str>, expected: &str) {
    let method = MethodDecl::new("on_value", params).annotate(data("/value"));

    let out = bind_method("Main", &method);

    assert!(out.bindings.is_empty());
    assert_eq!(out.diagnostics.len(), 1);
    assert_eq!(out.diagnostics[0].message, expected);
}

#[test]
fn bind_method___private___reported() {
    let method = MethodDecl::new("on_value", ["i32"])
        .with_modifiers(Modifiers {
            private: true,
            ..Modifiers::default()
        })
        .annotate(data("/value"));

    let out = bind_method("Main", &method);

    assert_eq!(
        out.diagnostics[0].message,
        "Annotated methods must not be private or static"
    );
}

#[test]
fn bind_method___local_node_requires_node_parameter() {
    let good = MethodDecl::new("on_local", ["Node"]).annotate(Annotation::LocalNode);
    let bad = MethodDecl::new("on_local", ["String"]).annotate(Annotation::LocalNode);

    assert_eq!(bind_method("Main", &good).bindings.len(), 1);
    assert_eq!(bind_method("Main", &bad).diagnostics.len(), 1);
}

#[test]
fn bind_method___remote_nodes_requires_single_list_parameter() {
    let extra = MethodDecl::new("on_peers", ["Vec<Node>", "String"]).annotate(Annotation::RemoteNodes);

    let out = bind_method("Main", &extra);

    assert!(out.bindings.is_empty());
    assert_eq!(
        out.diagnostics[0].message,
        "Incorrect number of parameters for method."
    );
}

#[test]
fn bind_method___background_marker_alone___reported() {
    let method = MethodDecl::new("work", ["i32"]).annotate(Annotation::BackgroundThread);

    let out = bind_method("Main", &method);

    assert!(out.bindings.is_empty());
    assert_eq!(out.diagnostics.len(), 1);
    assert!(out.diagnostics[0].message.starts_with("BackgroundThread must be used with"));
}

#[test]
fn bind_method___one_bad_category_keeps_other() {
    let method = MethodDecl::new("on_node", ["Node"])
        .annotate(Annotation::LocalNode)
        .annotate(Annotation::RemoteNodes);

    let out = bind_method("Main", &method);

    assert_eq!(out.bindings.len(), 1);
    assert_eq!(out.bindings[0].category, Category::LocalNode);
    assert_eq!(out.diagnostics.len(), 1);
}
