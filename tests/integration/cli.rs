//! Tests of the `rubygems-import` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use rubygems_import::test_utils::GemSourceFixture;
use std::fs;
use std::path::Path;

fn cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("rubygems-import").unwrap();
    cmd.env("HOME", home).env_remove("RUST_LOG").env_remove("MORPH_LOG_FD");
    cmd
}

#[test]
fn test_locate_prints_gemspec() {
    let fixture = GemSourceFixture::new().unwrap();
    let gemspec = fixture.gemspec("foo", "1.2", &[]).unwrap();

    cmd(fixture.path())
        .arg("locate")
        .arg(fixture.path())
        .arg("foo")
        .assert()
        .success()
        .stdout(predicate::str::contains(gemspec.display().to_string()));
}

#[test]
fn test_locate_missing_fails() {
    let fixture = GemSourceFixture::new().unwrap();
    cmd(fixture.path())
        .arg("locate")
        .arg(fixture.path())
        .arg("foo")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("foo.gemspec"));
}

#[test]
fn test_find_deps_json_report() {
    let fixture = GemSourceFixture::new().unwrap();
    fixture.gemspec("foo", "1.2", &[("rake", None)]).unwrap();
    fixture
        .lockfile("GEM\n  remote: https://rubygems.org/\n  specs:\n    rake (13.0.6)\n")
        .unwrap();
    let script = fixture
        .write(Path::new("build.txt"), "gem install bundler --version 2.4.10\ngem build foo.gemspec\n")
        .unwrap();

    cmd(fixture.path())
        .arg("find-deps")
        .arg(fixture.path())
        .args(["foo", "1.2", "--build-script"])
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"rubygems\": {"))
        .stdout(predicate::str::contains("\"bundler\": \"= 2.4.10\""))
        .stdout(predicate::str::contains("\"rake\": \"13.0.6\""));
}

#[test]
fn test_find_deps_yaml_to_file() {
    let fixture = GemSourceFixture::new().unwrap();
    fixture.gemspec("foo", "1.2", &[]).unwrap();
    let out = fixture.path().join("out/foo.yaml");

    cmd(fixture.path())
        .arg("find-deps")
        .arg(fixture.path())
        .args(["foo", "--format", "yaml", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let content = fs::read_to_string(&out).unwrap();
    assert!(content.starts_with("rubygems:"));
}

#[test]
fn test_find_deps_version_mismatch() {
    let fixture = GemSourceFixture::new().unwrap();
    fixture.gemspec("foo", "1.2", &[]).unwrap();

    cmd(fixture.path())
        .arg("find-deps")
        .arg(fixture.path())
        .args(["foo", "2.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("foo-1.2"))
        .stderr(predicate::str::contains("2.0"));
}

#[test]
fn test_intercept_prints_declarations() {
    let fixture = GemSourceFixture::new().unwrap();
    let script = fixture
        .write(Path::new("steps.yaml"), "- gem: install rake -v '~> 13.0'\n- command: gem build foo.gemspec\n")
        .unwrap();

    cmd(fixture.path())
        .arg("intercept")
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"artifact\": \"foo.gemspec\""))
        .stdout(predicate::str::contains("\"requirement\": \"~> 13.0\""));
}

#[test]
fn test_config_file_changes_executables() {
    let fixture = GemSourceFixture::new().unwrap();
    let config = fixture.write(Path::new("config.toml"), "gem_executables = [\"gem2.7\"]\n").unwrap();
    let script = fixture.write(Path::new("steps.txt"), "gem install ignored\ngem2.7 install kept\n").unwrap();

    cmd(fixture.path())
        .arg("--config")
        .arg(&config)
        .arg("intercept")
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("kept"))
        .stdout(predicate::str::contains("ignored").not());
}

#[test]
fn test_missing_config_file_fails() {
    let fixture = GemSourceFixture::new().unwrap();
    cmd(fixture.path())
        .args(["--config", "/nonexistent/config.toml", "locate", "."])
        .arg("foo")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}
