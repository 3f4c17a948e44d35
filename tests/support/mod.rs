use std::fs;
use std::path::Path;

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

pub struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create tempdir"),
        }
    }

    pub fn data_dir(&self) -> &Path {
        self.dir.path()
    }

    /// A questlog command bound to this environment's data directory
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("questlog").expect("questlog binary");
        cmd.env("QUESTLOG_DATA_DIR", self.dir.path());
        cmd
    }

    pub fn write_config(&self, contents: &str) {
        fs::write(self.dir.path().join("questlog.toml"), contents).expect("write config");
    }

    /// Sign up (and therefore sign in) a fresh account
    pub fn sign_up(&self, email: &str) -> String {
        let output = self
            .cmd()
            .args(["signup", "--email", email, "--password", "hunter22", "--json"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let value: Value = serde_json::from_slice(&output).expect("signup json");
        value["data"]["uid"].as_str().expect("uid").to_string()
    }

    /// Create a task and return its id
    pub fn new_todo(&self, title: &str, extra: &[&str]) -> String {
        let mut args = vec!["todo", "new", title, "--json"];
        args.extend_from_slice(extra);
        let output = self
            .cmd()
            .args(&args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let value: Value = serde_json::from_slice(&output).expect("todo new json");
        value["data"]["id"].as_str().expect("todo id").to_string()
    }

    /// `todo show --json` envelope for a task
    pub fn todo_json(&self, id: &str) -> Value {
        let output = self
            .cmd()
            .args(["todo", "show", id, "--json"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&output).expect("todo show json")
    }

    /// `todo list --json` ids, in order
    pub fn list_ids(&self, status: &str, sort: &str) -> Vec<String> {
        let output = self
            .cmd()
            .args(["todo", "list", "--status", status, "--sort", sort, "--json"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let value: Value = serde_json::from_slice(&output).expect("todo list json");
        value["data"]["todos"]
            .as_array()
            .expect("todos array")
            .iter()
            .map(|todo| todo["id"].as_str().expect("id").to_string())
            .collect()
    }

    /// `profile show --json` data payload
    pub fn profile_json(&self) -> Value {
        let output = self
            .cmd()
            .args(["profile", "show", "--json"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let value: Value = serde_json::from_slice(&output).expect("profile json");
        value["data"].clone()
    }
}
