//! Integration tests for the `strata` binary.

use assert_cmd::{Command, cargo::cargo_bin_cmd};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const MODEL: &str = r#"{
    "projectId": "billing",
    "projectName": "Billing",
    "modules": [{
        "name": "Billing",
        "description": "Invoices and payments",
        "tables": [{
            "name": "invoice",
            "columns": [
                { "name": "id", "type": "uuid", "primaryKey": true },
                { "name": "amount", "type": "decimal" },
                { "name": "status", "type": "text" },
                { "name": "location", "type": "geometry" }
            ]
        }],
        "screens": [
            { "name": "Invoices", "kind": "list", "route": "/invoices" },
            { "name": "New invoice", "kind": "form", "route": "/invoices/new" }
        ]
    }]
}"#;

/// A `strata` command isolated from the user's config and environment.
fn strata(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("strata");
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join(".config"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("STRATA_CONFIG");
    cmd
}

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("billing.json"), MODEL).unwrap();
    dir
}

#[test]
fn help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    strata(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("files"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn version_flag() {
    let dir = TempDir::new().unwrap();
    strata(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn generate_writes_the_project_tree() {
    let dir = workspace();
    strata(&dir)
        .args(["generate", "billing.json", "-o", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated 'Billing'"))
        .stdout(predicate::str::contains("npx prisma migrate dev"))
        .stdout(predicate::str::contains("Billing.invoice.location"));

    let project = dir.path().join("out/billing");
    let schema = fs::read_to_string(project.join("backend/prisma/schema.prisma")).unwrap();
    assert!(schema.contains("model Invoice {"));
    assert!(project.join("backend/src/routes/billing.ts").is_file());
    assert!(project.join("frontend/src/pages/BillingInvoices.tsx").is_file());
    assert!(project.join("frontend/src/components").is_dir());
    assert!(project.join("README.md").is_file());
}

#[test]
fn generate_defaults_to_configured_root() {
    let dir = workspace();
    strata(&dir).args(["generate", "billing.json"]).assert().success();
    assert!(dir.path().join("generated/billing/project.json").is_file());
}

#[test]
fn generate_reads_toml_models() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("notes.toml"),
        r#"
projectId = "notes"

[[modules]]
name = "Notes"

[[modules.tables]]
name = "note"
columns = [{ name = "body", type = "text" }]
"#,
    )
    .unwrap();

    strata(&dir)
        .args(["generate", "notes.toml", "-o", "out"])
        .assert()
        .success();
    let schema =
        fs::read_to_string(dir.path().join("out/notes/backend/prisma/schema.prisma")).unwrap();
    assert!(schema.contains("@id @default(uuid())"));
}

#[test]
fn dry_run_writes_nothing() {
    let dir = workspace();
    strata(&dir)
        .args(["generate", "billing.json", "-o", "out", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"))
        .stdout(predicate::str::contains("backend/prisma/schema.prisma"));

    assert!(!dir.path().join("out").exists());
}

#[test]
fn dry_run_json_report() {
    let dir = workspace();
    let output = strata(&dir)
        .args(["generate", "billing.json", "--dry-run", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["projectId"], "billing");
    assert_eq!(report["dryRun"], true);
    let files = report["files"].as_array().unwrap();
    assert!(files.iter().any(|f| f["path"] == "backend/prisma/schema.prisma"
        && f["class"] == "persistence"));
    assert!(report["diagnostics"]
        .as_array()
        .unwrap()
        .iter()
        .any(|d| d["severity"] == "warning"));
}

#[test]
fn regenerating_requires_force() {
    let dir = workspace();
    strata(&dir)
        .args(["generate", "billing.json", "-o", "out"])
        .assert()
        .success();

    strata(&dir)
        .args(["generate", "billing.json", "-o", "out"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"))
        .stderr(predicate::str::contains("--force"));

    strata(&dir)
        .args(["generate", "billing.json", "-o", "out", "--force", "-y"])
        .assert()
        .success();
}

#[test]
fn atomic_regeneration_replaces_the_tree() {
    let dir = workspace();
    strata(&dir)
        .args(["generate", "billing.json", "-o", "out"])
        .assert()
        .success();
    let stale = dir.path().join("out/billing/stale.txt");
    fs::write(&stale, "left over").unwrap();

    strata(&dir)
        .args(["generate", "billing.json", "-o", "out", "--force", "--atomic"])
        .assert()
        .success();

    assert!(!stale.exists());
    assert!(dir.path().join("out/billing/README.md").is_file());
    let leftovers: Vec<_> = fs::read_dir(dir.path().join("out"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, vec![std::ffi::OsString::from("billing")]);
}

#[test]
fn quiet_generate_prints_nothing() {
    let dir = workspace();
    strata(&dir)
        .args(["-q", "generate", "billing.json", "-o", "out"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn files_lists_what_generate_wrote() {
    let dir = workspace();
    strata(&dir)
        .args(["generate", "billing.json", "-o", "out"])
        .assert()
        .success();
    fs::create_dir_all(dir.path().join("out/billing/node_modules/x")).unwrap();
    fs::write(dir.path().join("out/billing/node_modules/x/index.js"), "").unwrap();

    strata(&dir)
        .args(["files", "billing", "-o", "out", "--format", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("backend/prisma/schema.prisma"))
        .stdout(predicate::str::contains("frontend/src/pages/BillingInvoices.tsx"))
        .stdout(predicate::str::contains("node_modules").not());
}

#[test]
fn files_filters_by_class() {
    let dir = workspace();
    strata(&dir)
        .args(["generate", "billing.json", "-o", "out"])
        .assert()
        .success();

    let output = strata(&dir)
        .args(["files", "billing", "-o", "out", "--class", "persistence", "--format", "csv"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let mut lines = stdout.lines();
    assert_eq!(lines.next(), Some("path,class,bytes"));
    let rows: Vec<&str> = lines.collect();
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|r| r.contains(",persistence,")));
    assert!(rows.iter().any(|r| r.starts_with("backend/prisma/schema.prisma,")));
}

#[test]
fn inspect_name_shows_cases() {
    let dir = TempDir::new().unwrap();
    strata(&dir)
        .args(["inspect", "name", "unit_price"])
        .assert()
        .success()
        .stdout(predicate::str::contains("UnitPrice"))
        .stdout(predicate::str::contains("unit-price"));
}

#[test]
fn inspect_type_shows_the_rule() {
    let dir = TempDir::new().unwrap();
    strata(&dir)
        .args(["inspect", "type", "money", "--database", "mysql"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Decimal"))
        .stdout(predicate::str::contains("rule 6 (money)"));
}

#[test]
fn shell_completions() {
    let dir = TempDir::new().unwrap();
    strata(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("strata"));
}

#[test]
fn config_set_then_get() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("strata.toml");
    fs::write(&config, "").unwrap();
    let config = config.to_str().unwrap();

    strata(&dir)
        .args(["-c", config, "config", "set", "materialize.output_root", "projects"])
        .assert()
        .success();

    strata(&dir)
        .args(["-c", config, "config", "get", "materialize.output_root"])
        .assert()
        .success()
        .stdout(predicate::str::contains("materialize.output_root = projects"));
}

#[test]
fn local_config_file_sets_the_output_root() {
    let dir = workspace();
    fs::write(
        dir.path().join(".strata.toml"),
        "[materialize]\noutput_root = \"site\"\n",
    )
    .unwrap();

    strata(&dir).args(["generate", "billing.json"]).assert().success();
    assert!(dir.path().join("site/billing/README.md").is_file());
}

#[test]
fn environment_overrides_files() {
    let dir = workspace();
    fs::write(
        dir.path().join(".strata.toml"),
        "[materialize]\noutput_root = \"site\"\n",
    )
    .unwrap();

    strata(&dir)
        .env("STRATA__MATERIALIZE__OUTPUT_ROOT", "from-env")
        .args(["generate", "billing.json"])
        .assert()
        .success();
    assert!(dir.path().join("from-env/billing/README.md").is_file());
}

#[test]
fn init_local_writes_defaults() {
    let dir = TempDir::new().unwrap();
    strata(&dir).args(["init", "--local"]).assert().success();

    let written = fs::read_to_string(dir.path().join(".strata.toml")).unwrap();
    assert!(written.contains("output_root = \"generated\""));

    strata(&dir)
        .args(["init", "--local"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}
