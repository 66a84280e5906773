#![allow(deprecated)] // assert_cmd::Command::cargo_bin is deprecated but replacement requires nightly

use predicates::prelude::*;
use std::fs;

fn configseek_cmd() -> assert_cmd::Command {
	assert_cmd::Command::cargo_bin("configseek").unwrap()
}

// ============================================================================
// CLI flag tests
// ============================================================================

#[test]
fn test_help_flag() {
	configseek_cmd()
		.arg("--help")
		.assert()
		.success()
		.stdout(predicate::str::contains("Find and load a project's configuration file"));
}

#[test]
fn test_version_flag() {
	configseek_cmd()
		.arg("--version")
		.assert()
		.success()
		.stdout(predicate::str::contains("configseek"));
}

#[test]
fn test_no_args_shows_help() {
	configseek_cmd()
		.assert()
		.failure()
		.stderr(predicate::str::contains("Usage"));
}

// ============================================================================
// search tests
// ============================================================================

#[test]
fn test_search_finds_rc_file_in_ancestor() {
	let temp_dir = tempfile::tempdir().unwrap();
	let root = temp_dir.path();
	fs::write(root.join(".demorc.json"), r#"{"answer": 42}"#).unwrap();
	let nested = root.join("a/b");
	fs::create_dir_all(&nested).unwrap();

	configseek_cmd()
		.args(["demo", "search"])
		.arg(&nested)
		.arg("--stop-dir")
		.arg(root)
		.assert()
		.success()
		.stdout(predicate::str::contains(".demorc.json"))
		.stdout(predicate::str::contains("\"answer\": 42"));
}

#[test]
fn test_search_defaults_to_current_directory() {
	let temp_dir = tempfile::tempdir().unwrap();
	let root = temp_dir.path();
	fs::write(root.join("package.json"), r#"{"name": "x", "demo": {"from": "pkg"}}"#).unwrap();

	configseek_cmd()
		.args(["demo", "search", "--stop-dir"])
		.arg(root)
		.current_dir(root)
		.assert()
		.success()
		.stdout(predicate::str::contains("package.json"))
		.stdout(predicate::str::contains("\"from\": \"pkg\""));
}

#[test]
fn test_search_not_found() {
	let temp_dir = tempfile::tempdir().unwrap();
	let root = temp_dir.path();

	configseek_cmd()
		.args(["demo", "search"])
		.arg(root)
		.arg("--stop-dir")
		.arg(root)
		.assert()
		.success()
		.stdout(predicate::str::contains("No configuration found."));
}

#[test]
fn test_search_keep_empty_reports_empty_file() {
	let temp_dir = tempfile::tempdir().unwrap();
	let root = temp_dir.path();
	fs::write(root.join(".demorc"), "").unwrap();

	configseek_cmd()
		.args(["demo", "search", "--keep-empty"])
		.arg(root)
		.arg("--stop-dir")
		.arg(root)
		.assert()
		.success()
		.stdout(predicate::str::contains("\"isEmpty\": true"));
}

#[test]
fn test_search_custom_places_and_package_prop() {
	let temp_dir = tempfile::tempdir().unwrap();
	let root = temp_dir.path();
	fs::write(root.join("demo.toml"), "level = 3").unwrap();
	fs::write(
		root.join("package.json"),
		r#"{"tools": {"demo": {"level": 1}}}"#,
	)
	.unwrap();

	configseek_cmd()
		.args([
			"demo",
			"search",
			"--search-place",
			"package.json",
			"--search-place",
			"demo.toml",
			"--package-prop",
			"tools.demo",
		])
		.arg(root)
		.arg("--stop-dir")
		.arg(root)
		.assert()
		.success()
		.stdout(predicate::str::contains("\"level\": 1"));
}

#[test]
fn test_search_package_prop_segments_keep_dots_literal() {
	let temp_dir = tempfile::tempdir().unwrap();
	let root = temp_dir.path();
	fs::write(
		root.join("package.json"),
		r#"{"tools": {"demo.v2": {"level": 2}}, "demo": {"level": 0}}"#,
	)
	.unwrap();

	configseek_cmd()
		.args([
			"demo",
			"search",
			"--package-prop-segment",
			"tools",
			"--package-prop-segment",
			"demo.v2",
		])
		.arg(root)
		.arg("--stop-dir")
		.arg(root)
		.assert()
		.success()
		.stdout(predicate::str::contains("\"level\": 2"));
}

#[test]
fn test_package_prop_flags_conflict() {
	configseek_cmd()
		.args([
			"demo",
			"search",
			"--package-prop",
			"a.b",
			"--package-prop-segment",
			"a",
		])
		.assert()
		.failure()
		.stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_search_async_mode() {
	let temp_dir = tempfile::tempdir().unwrap();
	let root = temp_dir.path();
	fs::write(root.join(".demorc"), r#"{"mode": "async"}"#).unwrap();

	configseek_cmd()
		.args(["demo", "search", "--async"])
		.arg(root)
		.arg("--stop-dir")
		.arg(root)
		.assert()
		.success()
		.stdout(predicate::str::contains("\"mode\": \"async\""));
}

#[test]
fn test_search_invalid_config_fails() {
	let temp_dir = tempfile::tempdir().unwrap();
	let root = temp_dir.path();
	fs::write(root.join(".demorc.json"), "{ not json").unwrap();

	configseek_cmd()
		.args(["demo", "search"])
		.arg(root)
		.arg("--stop-dir")
		.arg(root)
		.assert()
		.failure()
		.stderr(predicate::str::contains("Failed to load config file"));
}

#[test]
fn test_search_place_without_loader_fails() {
	configseek_cmd()
		.args(["demo", "search", "--search-place", ".demorc.yaml", "--stop-dir", "/"])
		.assert()
		.failure()
		.stderr(predicate::str::contains("No loader specified"));
}

// ============================================================================
// load tests
// ============================================================================

#[test]
fn test_load_explicit_file() {
	let temp_dir = tempfile::tempdir().unwrap();
	let config_path = temp_dir.path().join("custom.json");
	fs::write(&config_path, r#"{"explicit": true}"#).unwrap();

	configseek_cmd()
		.args(["demo", "load"])
		.arg(&config_path)
		.args(["--stop-dir", "/"])
		.assert()
		.success()
		.stdout(predicate::str::contains("\"explicit\": true"));
}

#[test]
fn test_load_relative_to_current_directory() {
	let temp_dir = tempfile::tempdir().unwrap();
	fs::write(temp_dir.path().join("rel.json"), r#"{"rel": 1}"#).unwrap();

	configseek_cmd()
		.args(["demo", "load", "rel.json", "--stop-dir", "/"])
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("\"rel\": 1"));
}

#[test]
fn test_load_empty_file_is_reported() {
	let temp_dir = tempfile::tempdir().unwrap();
	let config_path = temp_dir.path().join(".demorc");
	fs::write(&config_path, "   \n").unwrap();

	configseek_cmd()
		.args(["demo", "load"])
		.arg(&config_path)
		.args(["--stop-dir", "/"])
		.assert()
		.success()
		.stdout(predicate::str::contains("\"isEmpty\": true"));
}

#[test]
fn test_load_missing_file_fails() {
	let temp_dir = tempfile::tempdir().unwrap();

	configseek_cmd()
		.args(["demo", "load"])
		.arg(temp_dir.path().join("missing.json"))
		.args(["--stop-dir", "/"])
		.assert()
		.failure()
		.stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn test_verbose_logs_to_stderr() {
	let temp_dir = tempfile::tempdir().unwrap();
	let root = temp_dir.path();
	fs::write(root.join(".demorc.json"), "{}").unwrap();

	configseek_cmd()
		.args(["demo", "search", "-v"])
		.arg(root)
		.arg("--stop-dir")
		.arg(root)
		.assert()
		.success()
		.stderr(predicate::str::contains("Searching for config"));
}
