mod support;

use predicates::str::contains;

use support::TestEnv;

#[test]
fn fresh_profile_is_level_one() {
    let env = TestEnv::new();
    env.sign_up("sam@example.com");

    let profile = env.profile_json();
    assert_eq!(profile["exp"].as_u64(), Some(0));
    assert_eq!(profile["level"].as_u64(), Some(1));
    assert_eq!(profile["exp_in_level"].as_u64(), Some(0));

    env.cmd()
        .args(["profile", "show"])
        .assert()
        .success()
        .stdout(contains("Lv. 1 - EXP 0/100"));
}

#[test]
fn two_completions_reach_level_two() {
    let env = TestEnv::new();
    env.sign_up("sam@example.com");

    for title in ["first", "second"] {
        let id = env.new_todo(title, &[]);
        env.cmd().args(["todo", "done", &id]).assert().success();
    }

    let profile = env.profile_json();
    assert_eq!(profile["exp"].as_u64(), Some(100));
    assert_eq!(profile["level"].as_u64(), Some(2));
    assert_eq!(profile["exp_in_level"].as_u64(), Some(0));

    env.cmd()
        .args(["profile", "show"])
        .assert()
        .success()
        .stdout(contains("Lv. 2 - EXP 0/100"));
}

#[test]
fn award_size_comes_from_config() {
    let env = TestEnv::new();
    env.write_config("[exp]\naward = 125\n");
    env.sign_up("sam@example.com");

    let id = env.new_todo("big one", &[]);
    env.cmd()
        .args(["todo", "done", &id])
        .assert()
        .success()
        .stdout(contains("Exp awarded: 125"));

    let profile = env.profile_json();
    assert_eq!(profile["exp"].as_u64(), Some(125));
    assert_eq!(profile["level"].as_u64(), Some(2));
    assert_eq!(profile["exp_in_level"].as_u64(), Some(25));
}

#[test]
fn avatar_upload_sets_photo_url() {
    let env = TestEnv::new();
    env.sign_up("sam@example.com");

    let image = env.data_dir().join("portrait.png");
    std::fs::write(&image, b"not really a png").expect("write image");

    env.cmd()
        .args(["profile", "set", "--avatar", image.to_str().expect("utf8 path")])
        .assert()
        .success()
        .stdout(contains("file://"));

    env.cmd()
        .arg("whoami")
        .assert()
        .success()
        .stdout(contains("Photo: file://"));
}
