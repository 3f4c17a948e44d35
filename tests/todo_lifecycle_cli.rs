mod support;

use predicates::str::contains;

use support::TestEnv;

#[test]
fn create_starts_active_and_owned() {
    let env = TestEnv::new();
    let uid = env.sign_up("sam@example.com");

    let id = env.new_todo("water the plants", &["--deadline", "2h"]);
    let value = env.todo_json(&id);

    assert_eq!(value["data"]["status"].as_str(), Some("active"));
    assert_eq!(value["data"]["author"].as_str(), Some(uid.as_str()));
    assert!(value["data"]["completed"].is_null());
}

#[test]
fn optional_fields_have_defaults() {
    let env = TestEnv::new();
    env.sign_up("sam@example.com");

    let id = env.new_todo("bare minimum", &[]);
    let value = env.todo_json(&id);

    assert_eq!(value["data"]["content"].as_str(), Some(""));
    assert_eq!(value["data"]["is_outdoor"].as_bool(), Some(false));
    assert!(value["data"]["deadline"].is_string());
}

#[test]
fn done_completes_and_stamps() {
    let env = TestEnv::new();
    env.sign_up("sam@example.com");

    let id = env.new_todo("run 5k", &[]);
    env.cmd()
        .args(["todo", "done", &id])
        .assert()
        .success()
        .stdout(contains("Exp awarded: 50"));

    let value = env.todo_json(&id);
    assert_eq!(value["data"]["status"].as_str(), Some("completed"));
    assert!(value["data"]["completed"].is_string());
}

#[test]
fn done_twice_is_guarded_and_awards_once() {
    let env = TestEnv::new();
    env.sign_up("sam@example.com");

    let id = env.new_todo("once only", &[]);
    env.cmd().args(["todo", "done", &id]).assert().success();

    env.cmd()
        .args(["todo", "done", &id])
        .assert()
        .failure()
        .code(3)
        .stderr(contains("already completed"));

    let profile = env.profile_json();
    assert_eq!(profile["exp"].as_u64(), Some(50));
}

#[test]
fn edit_of_completed_task_is_guarded() {
    let env = TestEnv::new();
    env.sign_up("sam@example.com");

    let id = env.new_todo("finish report", &[]);
    env.cmd().args(["todo", "done", &id]).assert().success();

    env.cmd()
        .args(["todo", "edit", &id, "--title", "rewrite report"])
        .assert()
        .failure()
        .code(3)
        .stderr(contains("can no longer be edited"));

    // The guarded edit left the document alone.
    let value = env.todo_json(&id);
    assert_eq!(value["data"]["title"].as_str(), Some("finish report"));
    assert_eq!(value["data"]["status"].as_str(), Some("completed"));
}

#[test]
fn edit_rejects_empty_title_before_writing() {
    let env = TestEnv::new();
    env.sign_up("sam@example.com");

    let id = env.new_todo("keep me", &[]);
    env.cmd()
        .args(["todo", "edit", &id, "--title", "   "])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("title cannot be empty"));

    let value = env.todo_json(&id);
    assert_eq!(value["data"]["title"].as_str(), Some("keep me"));
}

#[test]
fn edit_overwrites_mutable_fields_only() {
    let env = TestEnv::new();
    let uid = env.sign_up("sam@example.com");

    let id = env.new_todo("old title", &[]);
    env.cmd()
        .args([
            "todo", "edit", &id, "--title", "new title", "--outdoor", "true",
        ])
        .assert()
        .success();

    let value = env.todo_json(&id);
    assert_eq!(value["data"]["title"].as_str(), Some("new title"));
    assert_eq!(value["data"]["is_outdoor"].as_bool(), Some(true));
    assert_eq!(value["data"]["status"].as_str(), Some("active"));
    assert_eq!(value["data"]["author"].as_str(), Some(uid.as_str()));
}

#[test]
fn delete_works_in_any_status() {
    let env = TestEnv::new();
    env.sign_up("sam@example.com");

    let active = env.new_todo("active one", &[]);
    let done = env.new_todo("done one", &[]);
    env.cmd().args(["todo", "done", &done]).assert().success();

    env.cmd().args(["todo", "delete", &active]).assert().success();
    env.cmd().args(["todo", "delete", &done]).assert().success();

    assert!(env.list_ids("active", "asc").is_empty());
    assert!(env.list_ids("completed", "asc").is_empty());
}

#[test]
fn missing_task_reports_not_found() {
    let env = TestEnv::new();
    env.sign_up("sam@example.com");

    env.cmd()
        .args(["todo", "show", "no-such-id"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Task not found"));
}

#[test]
fn bad_deadline_is_a_validation_error() {
    let env = TestEnv::new();
    env.sign_up("sam@example.com");

    env.cmd()
        .args(["todo", "new", "someday", "--deadline", "whenever"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("deadline"));

    assert!(env.list_ids("active", "asc").is_empty());
}
