use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

const MODULE: &str = r#"
name: button
styles:
  button:
    color: green
  label:
    color: $tone
instances:
  - { tone: red }
  - { tone: blue }
"#;

#[test]
fn extract_prints_registry_css() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(
        dir.path().join("button.yml"),
        "name: button\nstyles:\n  button:\n    color: green\n",
    )?;

    #[allow(deprecated)]
    Command::cargo_bin("restyle")?
        .current_dir(dir.path())
        .args(["extract", "button.yml"])
        .assert()
        .success()
        .stdout(".button-button-0 {\n  color: green;\n}\n");

    Ok(())
}

#[test]
fn extract_mounts_every_instance() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("module.yml"), MODULE)?;

    #[allow(deprecated)]
    Command::cargo_bin("restyle")?
        .current_dir(dir.path())
        .args(["extract", "module.yml"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains(".button-label-d0-2 {\n  color: red;\n}")
                .and(predicate::str::contains(".button-label-d1-3 {\n  color: blue;\n}")),
        );

    Ok(())
}

#[test]
fn extract_json_lists_class_maps() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("module.yml"), MODULE)?;

    #[allow(deprecated)]
    let assert = Command::cargo_bin("restyle")?
        .current_dir(dir.path())
        .args(["extract", "module.yml", "--json"])
        .assert()
        .success();

    let output: Value = serde_json::from_slice(&assert.get_output().stdout)?;
    let classes = output["classes"].as_array().expect("classes array");
    assert_eq!(classes.len(), 2);
    assert_eq!(classes[0]["button"], "button-button-0");
    assert_eq!(classes[0]["label"], "button-label-1 button-label-d0-2");
    assert_eq!(classes[1]["label"], "button-label-1 button-label-d1-3");
    assert!(output["css"].as_str().unwrap_or_default().contains("color: blue;"));

    Ok(())
}

#[test]
fn extract_honors_config_and_minify() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("module.yml"), MODULE)?;
    fs::write(dir.path().join("restyle.yml"), "class_name_prefix: app-\n")?;

    #[allow(deprecated)]
    Command::cargo_bin("restyle")?
        .current_dir(dir.path())
        .args(["--config", "restyle.yml", "extract", "module.yml", "--minify"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(".app-c0 {\n  color: green;\n}"));

    Ok(())
}

#[test]
fn extract_reports_invalid_modules() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("bad.yml"), "styles:\n  button: red\n")?;

    #[allow(deprecated)]
    Command::cargo_bin("restyle")?
        .current_dir(dir.path())
        .args(["extract", "bad.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load style module"));

    #[allow(deprecated)]
    Command::cargo_bin("restyle")?
        .current_dir(dir.path())
        .args(["extract", "missing.yml"])
        .assert()
        .failure();

    Ok(())
}
