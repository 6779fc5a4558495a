//! Runs the `flowshare` binary against a throwaway home directory

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

const AUGUST_CSV: &str = "\
partner_id,measurement_date,gross_volume,bsw_percent,temperature,api_gravity,meter_factor
partner-alpha,2025-08-01,10000,2.0,85,35,1.0
partner-bravo,2025-08-01,6000,5.0,75,52,1.0
partner-alpha,2025-08-31T23:59:59.500Z,10100,2.1,84,35,1.0
";

struct Home {
    dir: TempDir,
}

impl Home {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn config_file(&self) -> PathBuf {
        let base = if cfg!(target_os = "macos") {
            self.path().join("Library").join("Application Support")
        } else {
            self.path().join(".config")
        };
        base.join("flowshare").join("config.json")
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_flowshare"))
            .args(args)
            .env("HOME", self.path())
            .env("XDG_CONFIG_HOME", self.path().join(".config"))
            .env("XDG_DATA_HOME", self.path().join(".local").join("share"))
            .env_remove("FLOWSHARE_LOG")
            .output()
            .unwrap()
    }

    fn run_ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "{:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap()
    }

    fn run_err(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert_eq!(output.status.code(), Some(1), "{:?} should fail", args);
        String::from_utf8(output.stderr).unwrap()
    }

    fn run_json(&self, args: &[&str]) -> Value {
        serde_json::from_str(&self.run_ok(args)).unwrap()
    }
}

#[test]
fn test_broken_config_blocks_only_config_dependent_commands() {
    let home = Home::new();
    let config_file = home.config_file();
    fs::create_dir_all(config_file.parent().unwrap()).unwrap();
    fs::write(&config_file, "{ not json").unwrap();

    let strength = home.run_json(&["--format", "json", "strength", "Password123"]);
    assert_eq!(strength["score"], 2);
    assert_eq!(strength["label"], "Good");
    home.run_ok(&["validate", "email", "a@b.com"]);

    let stderr = home.run_err(&["entries", "--tenant", "t"]);
    assert!(stderr.contains("Failed to parse configuration"), "{}", stderr);

    let stdout = home.run_ok(&["config", "--reset"]);
    assert!(stdout.contains("Configuration reset to defaults"));
    let repaired: Value = serde_json::from_str(&fs::read_to_string(&config_file).unwrap()).unwrap();
    assert_eq!(repaired["log_level"], "warn");

    home.run_ok(&["entries", "--tenant", "t"]);
}

#[test]
fn test_validate_reports_failures_and_exits_zero() {
    let home = Home::new();
    let result = home.run_json(&["--format", "json", "validate", "email", "not-an-email"]);
    assert_eq!(result["valid"], false);
    assert_eq!(result["errors"][0], "Must be a valid email address");

    let stdout = home.run_ok(&["validate", "phone", "123"]);
    assert!(stdout.contains("invalid phone"));
}

#[test]
fn test_tenant_is_required_without_session() {
    let home = Home::new();
    let stderr = home.run_err(&["entries"]);
    assert!(stderr.contains("Session error"), "{}", stderr);
    assert!(stderr.contains("not logged in"));

    home.run_ok(&["login", "Coordinator@Example.com", "--tenant", "tenant-a"]);
    let whoami = home.run_json(&["--format", "json", "whoami"]);
    assert_eq!(whoami["user"]["email"], "coordinator@example.com");
    home.run_ok(&["entries"]);

    assert!(home.run_ok(&["logout"]).contains("Logged out"));
    assert!(home.run_ok(&["logout"]).contains("Not logged in"));
    home.run_err(&["entries"]);
}

#[test]
fn test_config_setters_validate_values() {
    let home = Home::new();

    let stderr = home.run_err(&["config", "--set-history-window", "0"]);
    assert!(stderr.contains("history window must be at least 1"));
    let stderr = home.run_err(&["config", "--set-z-threshold=-1"]);
    assert!(stderr.contains("z-score threshold must be a positive number"));
    let stderr = home.run_err(&["config", "--set-log-level", "loud"]);
    assert!(stderr.contains("invalid log level"));
    assert!(!home.config_file().exists());

    home.run_ok(&["config", "--set-log-level", "DEBUG", "--set-history-window", "5"]);
    let saved: Value =
        serde_json::from_str(&fs::read_to_string(home.config_file()).unwrap()).unwrap();
    assert_eq!(saved["log_level"], "debug");
    assert_eq!(saved["anomaly_history_window"], 5);

    let elsewhere = home.path().join("elsewhere");
    home.run_ok(&["--data-dir", elsewhere.to_str().unwrap(), "config", "--set-output", "json"]);
    let saved: Value =
        serde_json::from_str(&fs::read_to_string(home.config_file()).unwrap()).unwrap();
    assert_eq!(saved["output_format"], "json");
    assert!(saved["data_dir"].is_null());
}

#[test]
fn test_register_variants() {
    let home = Home::new();
    let coordinator = home.run_json(&[
        "--format", "json", "register", "--full-name", "Ada Lovelace", "--tenant-name",
        "Delta JV", "--phone", "+1 (555) 123-4567", "--password", "Str0ng!pass",
    ]);
    assert_eq!(coordinator["valid"], true);
    assert_eq!(coordinator["registration"]["role"], "coordinator");

    let invitee = home.run_json(&[
        "--format", "json", "register", "--full-name", "Grace Hopper", "--phone",
        "123.456.7890", "--invitation-id", "inv-1", "--password", "weak",
    ]);
    assert_eq!(invitee["valid"], false);
    assert_eq!(invitee["errors"][0], "Password must be at least 8 characters long");
}

#[test]
fn test_reconciliation_runs_are_stored_and_readable() {
    let home = Home::new();
    let data_dir = home.path().join("data");
    let data = data_dir.to_str().unwrap();
    let csv = home.path().join("august.csv");
    fs::write(&csv, AUGUST_CSV).unwrap();

    home.run_ok(&["login", "coordinator@example.com", "--tenant", "tenant-a"]);
    home.run_ok(&["--data-dir", data, "import", csv.to_str().unwrap()]);
    assert!(data_dir.join("production_entries.json").exists());
    home.run_ok(&["--data-dir", data, "audit"]);

    let completed = home.run_json(&[
        "--data-dir", data, "--format", "json", "reconcile", "--start", "2025-08-01", "--end",
        "2025-08-31", "--terminal-volume", "25000",
    ]);
    assert_eq!(completed["status"], "completed");
    assert_eq!(completed["triggered_by"], "coordinator@example.com");
    // the entry stamped half a second before midnight is inside the period
    assert_eq!(completed["result"]["total_gross_volume"], 26100.0);

    let stderr = home.run_err(&[
        "--data-dir", data, "reconcile", "--start", "2025-09-01", "--end", "2025-09-30",
        "--terminal-volume", "1000",
    ]);
    assert!(stderr.contains("No validated production entries"));

    let listed = home.run_json(&["--data-dir", data, "--format", "json", "reconciliations"]);
    assert_eq!(listed.as_array().unwrap().len(), 2);
    assert_eq!(listed[0]["status"], "failed");

    let failed = home.run_json(&[
        "--data-dir", data, "--format", "json", "reconciliations", "--status", "failed",
    ]);
    assert_eq!(failed.as_array().unwrap().len(), 1);
    assert!(failed[0]["error_message"]
        .as_str()
        .unwrap()
        .contains("No validated production entries"));

    let id = completed["id"].as_str().unwrap();
    let xlsx = home.path().join("run.xlsx");
    let report = home.run_ok(&[
        "--data-dir", data, "reconciliation", id, "--export", xlsx.to_str().unwrap(),
    ]);
    assert!(report.contains("Reconciliation Report"));
    assert!(report.contains("[Partner Allocations]"));
    assert!(xlsx.exists());

    let stderr = home.run_err(&["--data-dir", data, "reconciliation", "no-such-run"]);
    assert!(stderr.contains("Not found"));
}
