//! CLI integration tests for extconf.
//!
//! These exercise the binary end to end against throwaway project trees.
//! Anything that would need the host's real SDL2 or pkg-config stays in the
//! library tests, which run against a mock probe.

use std::fs;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the extconf binary command.
fn extconf() -> Command {
    let mut cmd = Command::cargo_bin("extconf").unwrap();
    // Keep a developer's global config out of the tests
    cmd.env("HOME", env!("CARGO_TARGET_TMPDIR"))
        .env("XDG_CONFIG_HOME", env!("CARGO_TARGET_TMPDIR"))
        .env_remove("EXTCONF_STATIC_DEPENDENCIES");
    cmd
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

const TINY_MANIFEST: &str = r#"
[package]
name = "tiny"

[sources]
root = "src"
base = ["Input.cpp", "Audio/Audio.cpp"]
macos = ["Audio/Audio.mm"]
linux = ["TimingUnix.cpp"]
"#;

// ============================================================================
// extconf --help / --version
// ============================================================================

#[test]
fn test_help_lists_commands() {
    extconf()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("configure"))
        .stdout(predicate::str::contains("flags"))
        .stdout(predicate::str::contains("doctor"))
        .stdout(predicate::str::contains("clean"));
}

#[test]
fn test_version() {
    extconf()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("extconf"));
}

#[test]
fn test_unknown_command_fails() {
    extconf().arg("frobnicate").assert().failure();
}

// ============================================================================
// extconf configure
// ============================================================================

#[test]
fn test_configure_windows_redirects_to_prebuilt_gem() {
    let tmp = temp_dir();

    extconf()
        .args(["configure", "--host-platform", "x64-mingw32"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("host `x64-mingw32`"))
        .stderr(predicate::str::contains(
            "Instead, please use: gem install gosu --platform=x64-mingw32",
        ));

    // Nothing is generated for an unsupported host
    assert!(!tmp.path().join("ext").exists());
}

#[test]
fn test_configure_windows_32bit_redirect() {
    let tmp = temp_dir();

    extconf()
        .args(["configure", "--host-platform", "i386-mingw32"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("gem install gosu --platform=i386-mingw32"));
}

#[test]
fn test_configure_windows_redirect_uses_manifest_name() {
    let tmp = temp_dir();
    fs::write(tmp.path().join("extconf.toml"), TINY_MANIFEST).unwrap();

    extconf()
        .args(["configure", "--host-platform", "x64-mingw32"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("gem install tiny --platform=x64-mingw32"));
}

#[test]
fn test_configure_name_override() {
    let tmp = temp_dir();

    extconf()
        .args(["configure", "--host-platform", "x64-mingw32", "--name", "other"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("gem install other --platform=x64-mingw32"));
}

#[cfg(unix)]
#[test]
fn test_configure_missing_sources_fails() {
    let tmp = temp_dir();

    extconf()
        .arg("configure")
        .arg("--root")
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));

    assert!(!tmp.path().join("ext/gosu/Makefile").exists());
}

#[test]
fn test_configure_rejects_bad_toolchain_version() {
    let tmp = temp_dir();
    fs::write(tmp.path().join("extconf.toml"), TINY_MANIFEST).unwrap();

    extconf()
        .args(["configure", "--toolchain-version", "not-a-version"])
        .current_dir(tmp.path())
        .assert()
        .failure();
}

#[test]
fn test_configure_malformed_manifest_fails() {
    let tmp = temp_dir();
    fs::write(
        tmp.path().join("extconf.toml"),
        "[package]\nname = \"tiny\n\n[sources]\nbase = [\"core.c\"]\n",
    )
    .unwrap();

    extconf()
        .args(["configure", "--host-platform", "x86_64-linux"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config file"));

    assert!(!tmp.path().join("ext").exists());
}

#[cfg(unix)]
#[test]
fn test_configure_intro_goes_to_stdout() {
    let tmp = temp_dir();
    fs::write(tmp.path().join("extconf.toml"), TINY_MANIFEST).unwrap();

    // Fails on the missing sources, after the intro
    extconf()
        .args(["configure", "--host-platform", "x86_64-linux"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "The tiny extension needs some system libraries installed system-wide.",
        ))
        .stderr(predicate::str::contains("does not exist"));
}

// ============================================================================
// extconf flags
// ============================================================================

#[test]
fn test_flags_compile_and_link_conflict() {
    extconf()
        .args(["flags", "--compile", "--link"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_flags_windows_host_fails() {
    let tmp = temp_dir();

    extconf()
        .args(["flags", "--host-platform", "x64-mingw32"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("x64-mingw32"));
}

// ============================================================================
// extconf doctor
// ============================================================================

#[test]
fn test_doctor_windows_reports_prebuilt_gem() {
    let tmp = temp_dir();

    extconf()
        .args(["doctor", "--host-platform", "x64-mingw32"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("gem install gosu --platform=x64-mingw32"));
}

// ============================================================================
// extconf clean
// ============================================================================

#[test]
fn test_clean_empty_project() {
    let tmp = temp_dir();

    extconf()
        .arg("clean")
        .current_dir(tmp.path())
        .assert()
        .success();
}

#[test]
fn test_clean_removes_generated_files_only() {
    let tmp = temp_dir();
    fs::write(tmp.path().join("extconf.toml"), TINY_MANIFEST).unwrap();

    let out = tmp.path().join("ext/tiny");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("Makefile"), "all:\n").unwrap();
    fs::write(out.join("Input.cpp"), "#include \"../../src/Input.cpp\"\n").unwrap();
    fs::write(out.join("Audio-Audio.cpp"), "#include \"../../src/Audio/Audio.cpp\"\n").unwrap();
    fs::write(out.join("README"), "keep me").unwrap();

    extconf()
        .arg("clean")
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(!out.join("Makefile").exists());
    assert!(!out.join("Input.cpp").exists());
    assert!(!out.join("Audio-Audio.cpp").exists());
    assert!(out.join("README").exists());
}

#[test]
fn test_clean_respects_out_dir() {
    let tmp = temp_dir();
    let out = tmp.path().join("build");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("Makefile"), "all:\n").unwrap();

    extconf()
        .args(["clean", "--out-dir", "build"])
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(!out.join("Makefile").exists());
}

// ============================================================================
// extconf completions
// ============================================================================

#[test]
fn test_completions_bash() {
    extconf()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("extconf"));
}

#[test]
fn test_completions_unknown_shell() {
    extconf().args(["completions", "tcsh"]).assert().failure();
}
