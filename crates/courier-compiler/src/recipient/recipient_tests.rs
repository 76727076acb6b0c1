#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

#[test]
fn Recipient___render___field_assignment() {
    let recipient = Recipient::field("value", "i32");

    assert_eq!(recipient.render("as_i32", None), "target.value = as_i32;");
}

#[test]
fn Recipient___render___method_invocation() {
    let recipient = Recipient::method("on_new_value", "i32", false, Affinity::Main);

    assert_eq!(
        recipient.render("as_i32", Some("node")),
        "target.on_new_value(as_i32);"
    );
}

#[test]
fn Recipient___render___method_with_node_parameter() {
    let recipient = Recipient::method("on_song", "Song", true, Affinity::Main);

    assert_eq!(
        recipient.render("as_song", Some("node")),
        "target.on_song(as_song, node);"
    );
}

#[test]
fn Recipient___field___is_always_background() {
    assert!(Recipient::field("value", "i32").is_background());
}

#[test]
fn Recipient___same_member___ignores_affinity() {
    let main = Recipient::method("on_value", "i32", false, Affinity::Main);
    let background = Recipient::method("on_value", "i32", false, Affinity::Background);
    let other_type = Recipient::method("on_value", "i64", false, Affinity::Main);

    assert!(main.same_member(&background));
    assert!(!main.same_member(&other_type));
}

#[test_case(Recipient::field("v", "i32"), Category::Data, HandlerKind::Assign)]
#[test_case(Recipient::method("m", "i32", false, Affinity::Main), Category::Message, HandlerKind::Invoke)]
#[test_case(Recipient::method("m", "i32", true, Affinity::Main), Category::Data, HandlerKind::InvokeWithNode)]
#[test_case(Recipient::field("n", "Node"), Category::LocalNode, HandlerKind::LocalNode)]
#[test_case(Recipient::method("n", "Vec<Node>", false, Affinity::Main), Category::RemoteNodes, HandlerKind::RemoteNodes)]
fn Recipient___handler_kind___matches_shape(
    recipient: Recipient,
    category: Category,
    expected: HandlerKind,
) {
    assert_eq!(recipient.handler_kind(category), expected);
}
