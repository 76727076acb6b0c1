//! Integration tests for the courierc binary

use std::fs;
use std::process::Command;
use tempfile::TempDir;

const VALID: &str = r#"
[[types]]
name = "Screen"

[[types.fields]]
name = "value"
ty = "i32"
annotations = [{ receive_messages = "/value" }]
"#;

const INVALID: &str = r#"
[[types]]
name = "Screen"

[[types.fields]]
name = "value"
ty = "i32"
annotations = ["background_thread"]
"#;

fn courierc() -> Command {
    Command::new(env!("CARGO_BIN_EXE_courierc"))
}

fn write(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_check_valid_declarations_succeeds() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "bindings.toml", VALID);

    let output = courierc().args(["check", &path]).output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Declarations are valid!"));
}

#[test]
fn test_check_invalid_declarations_fails_with_diagnostic() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "bindings.toml", INVALID);

    let output = courierc().args(["check", &path]).output().unwrap();

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("BackgroundThread must be used with"));
}

#[test]
fn test_generate_writes_listing() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "bindings.toml", VALID);
    let out = dir.path().join("out").join("listing.rs");

    let output = courierc()
        .args(["generate", &path, "-o", &out.to_string_lossy()])
        .output()
        .unwrap();

    assert!(output.status.success());
    let listing = fs::read_to_string(out).unwrap();
    assert!(listing.contains("// Dispatcher for Screen"));
    assert!(listing.contains("target.value = as_i32.clone();"));
}

#[test]
fn test_plan_prints_routes() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "bindings.json", r#"{"types": [{"name": "Screen", "fields": [{"name": "value", "ty": "i32", "annotations": [{"receive_messages": "/value"}]}]}]}"#);

    let output = courierc().args(["plan", &path]).output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("layer Screen"));
    assert!(stdout.contains("/value -> value"));
}
