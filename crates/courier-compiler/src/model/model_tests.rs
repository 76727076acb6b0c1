#![allow(non_snake_case)]

use super::*;
use crate::decl::{Annotation, FieldDecl, MethodDecl, TypeDecl};
use crate::{Affinity, DiagnosticKind};

fn data(path: &str) -> Annotation {
    Annotation::ReceiveData(path.to_string())
}

fn hierarchy() -> Declarations {
    Declarations::new(vec![
        TypeDecl::new("A").field(FieldDecl::new("a", "i32").annotate(data("/x"))),
        TypeDecl::new("B")
            .extends("A")
            .method(MethodDecl::new("on_x", ["i32"]).annotate(data("/x"))),
        TypeDecl::new("C").extends("B"),
    ])
}

#[test]
fn BindingModel___build___links_nearest_bound_ancestor() {
    let (model, diagnostics) = BindingModel::build(&hierarchy());

    assert!(diagnostics.is_empty());
    assert_eq!(model.areas().len(), 2);
    assert_eq!(model.area("B").unwrap().parent.as_deref(), Some("A"));
    assert_eq!(model.area("A").unwrap().parent, None);
}

#[test]
fn BindingModel___dispatch_area_for___unbound_type_uses_ancestor() {
    let (model, _) = BindingModel::build(&hierarchy());

    assert!(model.area("C").is_none());
    assert_eq!(model.dispatch_area_for("C").unwrap().owner, "B");
}

#[test]
fn BindingModel___dispatch_area_for___unknown_type_is_none() {
    let (model, _) = BindingModel::build(&hierarchy());

    assert!(model.dispatch_area_for("Plain").is_none());
    assert!(model.chain("Plain").is_empty());
}

#[test]
fn BindingModel___chain___root_first() {
    let (model, _) = BindingModel::build(&hierarchy());

    let owners: Vec<&str> = model.chain("C").iter().map(|a| a.owner.as_str()).collect();

    assert_eq!(owners, vec!["A", "B"]);
}

#[test]
fn BindingModel___build___skips_invalid_and_keeps_valid() {
    let decls = Declarations::new(vec![
        TypeDecl::new("Main")
            .field(FieldDecl::new("hidden", "i32").private().annotate(data("/x")))
            .field(FieldDecl::new("shown", "i32").annotate(data("/x"))),
    ]);

    let (model, diagnostics) = BindingModel::build(&decls);

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].member, "hidden");
    let route = model.area("Main").unwrap().route("/x", true).unwrap();
    assert_eq!(route.recipients().len(), 1);
    assert_eq!(route.recipients()[0].name, "shown");
}

#[test]
fn BindingModel___build___type_with_only_invalid_bindings_has_no_area() {
    let decls = Declarations::new(vec![
        TypeDecl::new("Broken").method(MethodDecl::new("on_x", Vec::<String>::new()).annotate(data("/x"))),
    ]);

    let (model, diagnostics) = BindingModel::build(&decls);

    assert!(model.area("Broken").is_none());
    assert_eq!(diagnostics[0].kind, DiagnosticKind::InvalidBinding);
}

#[test]
fn BindingModel___build___value_scenario_route() {
    let decls = Declarations::new(vec![
        TypeDecl::new("Main")
            .field(FieldDecl::new("value", "i32").annotate(data("/value")))
            .method(MethodDecl::new("on_new_value", ["i32"]).annotate(data("/value"))),
    ]);

    let (model, _) = BindingModel::build(&decls);

    let route = model.area("Main").unwrap().route("/value", true).unwrap();
    assert_eq!(route.payload_types(), vec!["i32"]);
    let affinities: Vec<Affinity> = route.recipients().iter().map(|r| r.affinity).collect();
    assert_eq!(affinities, vec![Affinity::Background, Affinity::Main]);
}

#[test]
fn BindingModel___build___cycle_reported_without_hanging() {
    let decls = Declarations::new(vec![
        TypeDecl::new("A")
            .extends("B")
            .field(FieldDecl::new("a", "i32").annotate(data("/a"))),
        TypeDecl::new("B")
            .extends("A")
            .field(FieldDecl::new("b", "i32").annotate(data("/b"))),
    ]);

    let (model, diagnostics) = BindingModel::build(&decls);

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::InheritanceCycle);
    assert_eq!(model.chain("A").len(), 2);
}
