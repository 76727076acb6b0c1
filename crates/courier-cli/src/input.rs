//! Loading binding declarations from disk

use anyhow::{Context, Result, bail};
use courier_compiler::decl::Declarations;
use std::path::Path;
use tracing::debug;

/// Read declarations, choosing the parser by file extension
pub fn load(path: impl AsRef<Path>) -> Result<Declarations> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading declarations");
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read declarations: {}", path.display()))?;
    parse(&content, extension(path))
        .with_context(|| format!("Failed to parse declarations: {}", path.display()))
}

fn extension(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("toml")
}

pub fn parse(content: &str, extension: &str) -> Result<Declarations> {
    let decls = match extension {
        "toml" => Declarations::from_toml(content)?,
        "json" => Declarations::from_json(content)?,
        other => bail!("Unsupported declarations format: .{other} (expected .toml or .json)"),
    };
    Ok(decls)
}
