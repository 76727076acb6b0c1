//! Readable listings of generated dispatchers and codecs.
//!
//! The runtime builds dispatchers from the model directly; these listings
//! show what each dispatcher does for a given event, in Rust-like form.

use crate::{
    Affinity, BindingModel, Category, FieldClass, PostalArea, Recipient, Route, TypeCodecPlan,
};

/// Local name for a decoded payload of a declared type
///
/// `Vec<Node>` becomes `as_vec_node`, `Box<[String]>` becomes `as_box_string`.
pub fn payload_ident(ty: &str) -> String {
    let mut ident = String::from("as");
    let mut pending_sep = true;
    for c in ty.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep {
                ident.push('_');
                pending_sep = false;
            } else if c.is_ascii_uppercase()
                && ident.chars().last().is_some_and(|p| p.is_ascii_lowercase())
            {
                ident.push('_');
            }
            ident.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    ident
}

/// Background statements in order, then one main-thread batch
fn push_delivery(
    code: &mut String,
    indent: &str,
    recipients: &[Recipient],
    source: impl Fn(&Recipient) -> String,
    node: Option<&str>,
) {
    for recipient in recipients.iter().filter(|r| r.is_background()) {
        code.push_str(&format!("{indent}{}\n", recipient.render(&source(recipient), node)));
    }

    let main: Vec<&Recipient> = recipients
        .iter()
        .filter(|r| r.affinity == Affinity::Main)
        .collect();
    if !main.is_empty() {
        code.push_str(&format!("{indent}main.post(move || {{\n"));
        for recipient in main {
            code.push_str(&format!(
                "{indent}    {}\n",
                recipient.render(&source(recipient), node)
            ));
        }
        code.push_str(&format!("{indent}}});\n"));
    }
}

fn push_route(code: &mut String, route: &Route) {
    let event = if route.is_data { "data" } else { "message" };
    let node = format!("{event}.source_node");
    code.push_str(&format!("        \"{}\" => {{\n", route.path));
    for ty in route.payload_types() {
        code.push_str(&format!(
            "            let {} = codecs.decode_payload(\"{}\", &{event}.data)?;\n",
            payload_ident(ty),
            ty
        ));
    }
    push_delivery(
        code,
        "            ",
        route.recipients(),
        |r| format!("{}.clone()", payload_ident(&r.payload_type)),
        Some(node.as_str()),
    );
    code.push_str("        }\n");
}

/// Render the dispatcher listing for one postal area
pub fn render_dispatcher(area: &PostalArea) -> String {
    let mut code = String::new();

    code.push_str(&format!("// Dispatcher for {}\n", area.owner));
    if let Some(parent) = &area.parent {
        code.push_str(&format!("// Parent: {parent}, started and stopped before this layer\n"));
    }

    let mut listeners = Vec::new();
    if !area.local_node_recipients().is_empty() {
        listeners.push("local_node");
    }
    if area.needs_node_listener() {
        listeners.push("node");
    }
    if !area.message_routes().is_empty() {
        listeners.push("message");
    }
    if !area.data_routes().is_empty() {
        listeners.push("data");
    }
    code.push_str(&format!("// Listeners: [{}]\n", listeners.join(", ")));

    code.push_str(&format!("fn start(source, target: &{}) {{\n", area.owner));
    if area.parent.is_some() {
        code.push_str("    parent.start(source, target);\n");
    }

    if !area.local_node_recipients().is_empty() {
        code.push_str("\n    let node = source.local_node().await?;\n");
        push_delivery(
            &mut code,
            "    ",
            area.local_node_recipients(),
            |_| "node.clone()".to_string(),
            None,
        );
    }

    if area.needs_node_listener() {
        code.push_str("\n    on node event {\n");
        if !area.remote_node_recipients().is_empty() {
            code.push_str("        let nodes = source.connected_nodes().await?;\n");
            push_delivery(
                &mut code,
                "        ",
                area.remote_node_recipients(),
                |_| "nodes.clone()".to_string(),
                None,
            );
        }
        if !area.data_routes().is_empty() {
            code.push_str("        if connected { replay(source.data_items().await?); }\n");
        }
        code.push_str("    }\n");
    }

    if !area.message_routes().is_empty() {
        code.push_str("\n    on message match message.path {\n");
        for route in area.message_routes() {
            push_route(&mut code, route);
        }
        code.push_str("        _ => {}\n    }\n");
    }

    if !area.data_routes().is_empty() {
        code.push_str("\n    on data match data.path {\n");
        for route in area.data_routes() {
            push_route(&mut code, route);
        }
        code.push_str("        _ => {}\n    }\n");
        code.push_str("    replay(source.data_items().await?);\n");
    }

    code.push_str("}\n\n");
    code.push_str(&format!("fn stop(target: &{}) {{\n", area.owner));
    if area.parent.is_some() {
        code.push_str("    parent.stop(target);\n");
    }
    for listener in listeners.iter().filter(|l| **l != "local_node") {
        code.push_str(&format!("    remove_{listener}_listener();\n"));
    }
    code.push_str("}\n");
    code
}

/// Render the pack/unpack listing for one codec plan
pub fn render_codec(plan: &TypeCodecPlan) -> String {
    let mut pack = String::new();
    let mut unpack = String::new();

    if let Some(parent) = &plan.parent {
        pack.push_str(&format!("    {parent}::pack_into(self, map, ctx)?;\n"));
        unpack.push_str(&format!("    {parent}::unpack_from(self, map, ctx)?;\n"));
    }

    for field in &plan.fields {
        let (put, take) = match &field.class {
            FieldClass::Primitive(_) => (
                format!("field::put(map, \"{0}\", &self.{0});", field.name),
                format!("field::take(map, \"{0}\", &mut self.{0});", field.name),
            ),
            FieldClass::Nested(_) => (
                format!("field::put_nested(map, \"{0}\", &self.{0}, ctx)?;", field.name),
                format!("field::take_nested(map, \"{0}\", &mut self.{0}, ctx)?;", field.name),
            ),
            FieldClass::NestedList(_) => (
                format!("field::put_nested_list(map, \"{0}\", &self.{0}, ctx)?;", field.name),
                format!("field::take_nested_list(map, \"{0}\", &mut self.{0}, ctx)?;", field.name),
            ),
            FieldClass::Asset => (
                format!("field::put_asset(map, \"{0}\", &self.{0}, ctx)?;", field.name),
                format!("field::take_asset(map, \"{0}\", &mut self.{0}, ctx)?;", field.name),
            ),
            FieldClass::Unsupported => continue,
        };
        pack.push_str(&format!("    {put}\n"));
        unpack.push_str(&format!("    {take}\n"));
    }

    let mut code = String::new();
    code.push_str(&format!("// Codec for {}\n", plan.name));
    code.push_str(&format!("impl Packable for {} {{\n", plan.name));
    code.push_str(&format!("    const TYPE_NAME: &'static str = \"{}\";\n\n", plan.name));
    code.push_str("    fn pack_into(&self, map: &mut DataMap, ctx: &CodecContext<'_>) -> Result<(), CodecError> {\n");
    for line in pack.lines() {
        code.push_str(&format!("    {line}\n"));
    }
    code.push_str("        Ok(())\n    }\n\n");
    code.push_str("    fn unpack_from(&mut self, map: &DataMap, ctx: &CodecContext<'_>) -> Result<(), CodecError> {\n");
    for line in unpack.lines() {
        code.push_str(&format!("    {line}\n"));
    }
    code.push_str("        Ok(())\n    }\n}\n");
    code
}

/// Plain-text routing plan for one type: the areas its dispatcher composes
pub fn render_plan(model: &BindingModel, name: &str) -> String {
    let mut out = String::new();
    let chain = model.chain(name);
    if chain.is_empty() {
        out.push_str(&format!("{name}: nothing to dispatch\n"));
        return out;
    }

    out.push_str(&format!("{name}\n"));
    for area in chain {
        out.push_str(&format!("  layer {}\n", area.owner));
        for (category, recipient) in area.recipients() {
            let path = match category {
                Category::Data | Category::Message => area
                    .data_routes()
                    .iter()
                    .chain(area.message_routes())
                    .find(|r| r.category() == category && r.recipients().contains(recipient))
                    .map(|r| format!(" {}", r.path))
                    .unwrap_or_default(),
                _ => String::new(),
            };
            out.push_str(&format!(
                "    {category}{path} -> {} ({}, {:?})\n",
                recipient.name,
                recipient.handler_kind(category),
                recipient.affinity
            ));
        }
    }
    out
}
