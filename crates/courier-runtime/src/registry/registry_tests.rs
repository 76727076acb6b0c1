#![allow(non_snake_case)]

use super::*;
use courier_compiler::decl::Declarations;

const HIERARCHY: &str = r#"
[[types]]
name = "Base"

[[types.fields]]
name = "value"
ty = "i32"
annotations = [{ receive_messages = "/value" }]

[[types]]
name = "Middle"
supertype = "Base"

[[types]]
name = "Leaf"
supertype = "Middle"

[[types.methods]]
name = "on_text"
params = ["String"]
annotations = [{ receive_messages = "/text" }]

[[types]]
name = "Plain"
"#;

#[derive(Default)]
struct Base;

#[derive(Default)]
struct Middle {
    base: Base,
}

#[derive(Default)]
struct Leaf {
    middle: Middle,
}

struct Plain;

fn base_of(m: &Middle) -> &Base {
    &m.base
}

fn middle_of(l: &Leaf) -> &Middle {
    &l.middle
}

fn base_of_leaf(l: &Leaf) -> &Base {
    &l.middle.base
}

fn itself(b: &Base) -> &Base {
    b
}

fn model() -> BindingModel {
    let (model, diagnostics) = BindingModel::build(&Declarations::from_toml(HIERARCHY).unwrap());
    assert!(diagnostics.is_empty());
    model
}

fn base_table() -> RecipientTable<Base> {
    RecipientTable::new().assign("value", |_: &Base, _: i32| {})
}

fn leaf_table() -> RecipientTable<Leaf> {
    RecipientTable::new().invoke("on_text", |_: &Leaf, _: String| {})
}

#[test]
fn RegistryBuilder___hierarchy___composes_layers_root_first() {
    let registry = DispatchRegistry::builder(&model())
        .bind("Base", base_table())
        .unwrap()
        .derive("Middle", RecipientTable::new(), base_of)
        .unwrap()
        .derive("Leaf", leaf_table(), middle_of)
        .unwrap()
        .build();

    assert_eq!(registry.len(), 3);
    assert_eq!(registry.names(), vec!["Base", "Leaf", "Middle"]);
    let leaf = registry.dispatcher::<Leaf>().unwrap();
    assert_eq!(leaf.layer_owners(), vec!["Base".to_string(), "Leaf".to_string()]);
    let middle = registry.dispatcher::<Middle>().unwrap();
    assert_eq!(middle.layer_owners(), vec!["Base".to_string()]);
}

#[test]
fn RegistryBuilder___derive_from_served_ancestor___accepted() {
    let registry = DispatchRegistry::builder(&model())
        .bind("Base", base_table())
        .unwrap()
        .derive("Leaf", leaf_table(), base_of_leaf)
        .unwrap()
        .build();

    let leaf = registry.dispatcher::<Leaf>().unwrap();
    assert_eq!(leaf.layer_owners(), vec!["Base".to_string(), "Leaf".to_string()]);
    assert!(registry.dispatcher::<Middle>().is_none());
}

#[test]
fn RegistryBuilder___bind_type_with_bound_ancestor___fails() {
    let result = DispatchRegistry::builder(&model())
        .bind("Base", base_table())
        .unwrap()
        .bind("Leaf", leaf_table());

    assert!(matches!(result, Err(CourierError::Registry(msg)) if msg.contains("derive")));
}

#[test]
fn RegistryBuilder___derive_before_parent_bound___fails() {
    let result = DispatchRegistry::builder(&model()).derive("Middle", RecipientTable::new(), base_of);

    assert!(matches!(result, Err(CourierError::Registry(msg)) if msg.contains("not bound yet")));
}

#[test]
fn RegistryBuilder___derive_root_type___fails() {
    let result = DispatchRegistry::builder(&model()).derive("Base", base_table(), itself);

    assert!(matches!(result, Err(CourierError::Registry(msg)) if msg.contains("no bound ancestor")));
}

#[test]
fn RegistryBuilder___bind_twice___fails() {
    let result = DispatchRegistry::builder(&model())
        .bind("Base", base_table())
        .unwrap()
        .bind("Base", base_table());

    assert!(matches!(result, Err(CourierError::Registry(msg)) if msg.contains("already bound")));
}

#[test]
fn RegistryBuilder___nothing_to_dispatch___has_no_dispatcher() {
    let registry = DispatchRegistry::builder(&model())
        .bind::<Plain>("Plain", RecipientTable::new())
        .unwrap()
        .build();

    assert!(registry.is_empty());
    assert!(registry.dispatcher::<Plain>().is_none());
    assert_eq!(registry.name_of::<Plain>(), Some("Plain"));
}
