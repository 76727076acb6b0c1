//! `courierc check`

use crate::input;
use anyhow::{Result, bail};
use courier_compiler::compile;

pub fn run(path: &str) -> Result<()> {
    println!("Checking declarations: {path}");

    let decls = input::load(path)?;
    let compilation = compile(&decls);

    let receiving = compilation.model.areas().len();
    let deliverable = compilation.codecs.len();

    if !compilation.is_clean() {
        for diagnostic in &compilation.diagnostics {
            println!("✗ {diagnostic}");
        }
        bail!(
            "{} problem(s) found in {} declared type(s)",
            compilation.diagnostics.len(),
            decls.types.len()
        );
    }

    println!("✓ Types: {}", decls.types.len());
    println!("✓ Receiving types: {receiving}");
    println!("✓ Deliverable types: {deliverable}");
    println!("\nDeclarations are valid!");
    Ok(())
}
