//! `courierc generate` and `courierc plan`

use crate::Format;
use crate::input;
use anyhow::{Context, Result};
use courier_compiler::decl::Declarations;
use courier_compiler::render::{render_codec, render_dispatcher, render_plan};
use courier_compiler::{Compilation, compile};
use std::fs;
use std::path::Path;

pub fn run(path: &str, output: Option<&str>, format: Format) -> Result<()> {
    let decls = input::load(path)?;
    let compilation = compile(&decls);
    for diagnostic in &compilation.diagnostics {
        eprintln!("warning: {diagnostic} (skipped)");
    }

    let source_name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path);
    let content = match format {
        Format::Text => listing(&compilation, source_name),
        Format::Json => json(&compilation)?,
    };

    match output {
        Some(output) => {
            let output_path = Path::new(output);
            if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            fs::write(output_path, content)
                .with_context(|| format!("Failed to write listing: {output}"))?;
            println!(
                "✓ Wrote {} dispatcher(s) and {} codec(s) to {output}",
                compilation.model.areas().len(),
                compilation.codecs.len()
            );
        }
        None => print!("{content}"),
    }
    Ok(())
}

pub fn plan(path: &str, type_name: Option<&str>) -> Result<()> {
    let decls = input::load(path)?;
    let compilation = compile(&decls);
    print!("{}", plan_text(&decls, &compilation, type_name));
    Ok(())
}

/// Dispatcher listings for every postal area, then codec listings
pub fn listing(compilation: &Compilation, source_name: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("// Generated by courierc from {source_name}\n"));
    out.push_str("// Do not edit; regenerate from the declarations instead.\n");

    for area in compilation.model.areas() {
        out.push('\n');
        out.push_str(&render_dispatcher(area));
    }
    for plan in &compilation.codecs {
        out.push('\n');
        out.push_str(&render_codec(plan));
    }
    out
}

pub fn json(compilation: &Compilation) -> Result<String> {
    let value = serde_json::json!({
        "areas": compilation.model.areas(),
        "codecs": compilation.codecs,
        "diagnostics": compilation.diagnostics,
    });
    serde_json::to_string_pretty(&value).context("Failed to serialize listing")
}

/// Routing plans for one type, or for every declared type that receives
pub fn plan_text(decls: &Declarations, compilation: &Compilation, type_name: Option<&str>) -> String {
    if let Some(name) = type_name {
        return render_plan(&compilation.model, name);
    }

    let mut out = String::new();
    for decl in &decls.types {
        if compilation.model.chain(&decl.name).is_empty() {
            continue;
        }
        out.push_str(&render_plan(&compilation.model, &decl.name));
    }
    if out.is_empty() {
        out.push_str("No type receives anything.\n");
    }
    out
}
