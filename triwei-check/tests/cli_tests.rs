//! Integration tests for the triwei-check binary
//!
//! Each test builds a small site in a temp directory and runs the compiled
//! binary against it, asserting on exit codes and output lines.

use std::{
    fs,
    path::Path,
    process::{
        Command,
        Output,
    },
};

use serde_json::Value;
use tempfile::TempDir;

const SPEC_PAGE: &str = r#"---
layout: spec
title: "Spec: linreg"
slug: linreg
kind: lab
game_url: /games/linreg/
permalink: /games/specs/linreg/
tags: [math]
difficulty: easy
session_length: 5m
last_reviewed: 2026-01-15
asset_budget:
  initial_transfer_kb: 100
  interactive_transfer_kb: 200
  max_runtime_ram_mb: 64
  max_gpu_tex_mb: 16
---
## Overview
[Play](/games/linreg/)
## Learning Lens
## Controls
## Core Loop
## Scoring and Metrics
## Failure States
## Determinism and Randomness
## Instrumentation Contract
## Accessibility Notes
## Test Checklist
"#;

fn write(root: &Path, rel: &str, content: impl AsRef<[u8]>) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A site that passes every content check
fn valid_site() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write(
        root,
        "games/manifest.json",
        r#"{"games":[{"slug":"linreg","title":"Linear Regression","route":"/games/linreg/","spec_url":"/games/specs/linreg/","asset_packs":["core"],"unique_assets":["games/linreg/hero.png"]}]}"#,
    );
    write(root, "games/card_overrides.json", r#"{"linreg":{"badge":"new"}}"#);
    write(
        root,
        "_data/asset_packs.json",
        r#"[{"slug":"core","globs":["assets/core/**"],"preload_policy":"precache","budgets":{"max_transfer_kb":64,"max_single_file_kb":32}}]"#,
    );
    write(root, "assets/core/engine.js", vec![b'e'; 4096]);
    write(root, "games/linreg/hero.png", vec![b'p'; 2048]);
    write(
        root,
        "games/linreg/index.html",
        "---\nlayout: game\npermalink: /games/linreg/\n---\n<canvas id=\"game\"></canvas>\n<script>\nlet score = 0;\n</script>\n",
    );
    write(root, "games/index.md", "---\npermalink: /games/\n---\n<a href=\"{{ '/games/linreg/' | relative_url }}\">Play</a>\n");
    write(root, "games/specs/index.md", "---\npermalink: /games/specs/\n---\n{% for g in site.data.games_manifest.games %}{% endfor %}\n");
    write(root, "games/specs/linreg.md", SPEC_PAGE);
    write(root, "_layouts/default.html", "<script src=\"{{ '/assets/core/engine.js' | relative_url }}\"></script>\n");
    write(root, "_includes/nav.html", "<a href=\"{{ '/games/' | relative_url }}\">Games</a>\n");
    write(root, "index.md", "---\npermalink: /\n---\n");
    write(root, "dist/index.html", "<html></html>");

    temp
}

fn run(site: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_triwei-check"))
        .arg("--root")
        .arg(site)
        .arg("--no-color")
        .args(args)
        .current_dir(site)
        .env_remove("TRIWEI_SITE_ROOT")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

#[test]
fn test_all_checks_pass_on_valid_site() {
    let site = valid_site();
    let output = run(site.path(), &["all"]);
    let text = stdout(&output);

    assert_eq!(output.status.code(), Some(0), "{}", text);
    for check in ["games", "specs", "links", "assets"] {
        assert!(text.contains(&format!("PASS: {}\n", check)), "{}", text);
    }
    assert!(text.contains("dist size OK: 1 MB <= 300 MB"));
    assert!(text.contains("WARN: Game folder not listed in manifest: games/specs"));
    assert!(text.contains("Summary: 0 error(s), 1 warning(s) across 5 check(s)"));
    assert!(!text.contains('\u{1b}'));
}

#[test]
fn test_single_check_line_protocol() {
    let site = valid_site();
    let output = run(site.path(), &["games"]);
    let text = stdout(&output);
    let lines: Vec<_> = text.lines().collect();

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(lines.first(), Some(&"Games discovered: 2"));
    assert_eq!(lines.last(), Some(&"PASS: games"));
    assert!(!text.contains("Summary:"));
}

#[test]
fn test_content_errors_exit_one() {
    let site = valid_site();
    let output = run(site.path(), &["dist", "--budget-mb", "0"]);
    let text = stdout(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(text.contains("FAIL: 1 issue(s) found.\nERROR: Build too large: 1 MB > 0 MB\n"), "{}", text);
}

#[test]
fn test_broken_link_reported() {
    let site = valid_site();
    write(site.path(), "_includes/footer.html", "<a href=\"/missing/\">gone</a>\n");
    let output = run(site.path(), &["links"]);
    let text = stdout(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(text.contains("ERROR: Unresolved internal route: /missing/ (from _includes/footer.html)"), "{}", text);
}

#[test]
fn test_fail_fast_stops_after_first_failure() {
    let site = valid_site();
    fs::remove_file(site.path().join("games/index.md")).unwrap();
    let output = run(site.path(), &["all", "--fail-fast"]);
    let text = stdout(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(text.contains("ERROR: Missing games hub page: games/index.md"));
    assert!(!text.contains("PASS: specs"));
    assert!(stderr(&output).contains("Stopped after 1 of 5 checks"));
}

#[test]
fn test_json_output() {
    let site = valid_site();
    let output = run(site.path(), &["specs", "--output", "json"]);
    assert_eq!(output.status.code(), Some(0));

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["command"], "specs");
    assert_eq!(json["checks"], serde_json::json!(["specs"]));
    assert_eq!(json["summary"]["errors"], 0);
}

#[test]
fn test_json_lines_with_severity_filter() {
    let site = valid_site();
    fs::remove_dir_all(site.path().join("dist")).unwrap();
    let output = run(site.path(), &["all", "--output", "json-lines", "--filter-severity", "error"]);

    // filters never change the exit status
    assert_eq!(output.status.code(), Some(1));
    let lines: Vec<Value> = stdout(&output).lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["check"], "dist");
    assert_eq!(lines[0]["severity"], "error");
    assert_eq!(lines[0]["message"], "Missing build output directory: dist");
}

#[test]
fn test_group_by_check() {
    let site = valid_site();
    let output = run(site.path(), &["all", "--group-by", "check"]);
    let text = stdout(&output);

    assert_eq!(output.status.code(), Some(0));
    assert!(text.contains("== games ("), "{}", text);
    assert!(text.contains("== assets ("));
    assert!(text.lines().last().unwrap().starts_with("Shown: "));
    assert!(!text.contains("PASS:"));
}

#[test]
fn test_config_file_overrides_defaults() {
    let site = valid_site();
    write(site.path(), ".triwei-check.toml", "[games]\nnon_game_dirs = [\"specs\"]\n\n[dist]\nbudget_mb = 0\n");
    let output = run(site.path(), &["all"]);
    let text = stdout(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(!text.contains("WARN: Game folder not listed"));
    assert!(text.contains("ERROR: Build too large: 1 MB > 0 MB"));
}

#[test]
fn test_tool_failure_exits_two() {
    let site = valid_site();
    let output = run(site.path(), &["all", "--config", "does-not-exist.toml"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).starts_with("error: Failed to load config file"));

    write(site.path(), "bad.toml", "[dist]\nbudget_mb = \"big\"\n");
    let output = run(site.path(), &["dist", "--config", "bad.toml"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_list_checks() {
    let site = valid_site();
    let output = run(site.path(), &["list", "--output", "json"]);
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<_> = json.as_array().unwrap().iter().map(|c| c["name"].as_str().unwrap().to_string()).collect();
    assert_eq!(names, vec!["games", "specs", "links", "assets", "dist"]);
}

#[test]
fn test_sync_data() {
    let site = valid_site();
    let output = run(site.path(), &["sync-data"]);
    let text = stdout(&output);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        text,
        "Synced games/manifest.json -> _data/games_manifest.json\n\
         Synced games/card_overrides.json -> _data/games_card_overrides.json\n"
    );
    let synced = fs::read_to_string(site.path().join("_data/games_card_overrides.json")).unwrap();
    assert_eq!(synced, "{\n  \"linreg\": {\n    \"badge\": \"new\"\n  }\n}\n");

    fs::remove_file(site.path().join("games/card_overrides.json")).unwrap();
    let output = run(site.path(), &["sync-data"]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stdout(&output), "Synced games/manifest.json -> _data/games_manifest.json\n");
    assert!(stderr(&output).contains("Missing source JSON: games/card_overrides.json"));
}

#[test]
fn test_new_post() {
    let site = valid_site();
    let args = ["new-post", "--topic", "AI tools", "--date", "2026-02-03"];

    let output = run(site.path(), &args);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "Generated post: _posts/ai-tools-20260203.md\n");
    let post = fs::read_to_string(site.path().join("_posts/ai-tools-20260203.md")).unwrap();
    assert!(post.contains("February 03, 2026: Ai Tools"));

    let output = run(site.path(), &args);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Post already exists"));

    let forced = ["new-post", "--topic", "AI tools", "--date", "2026-02-03", "--force"];
    let output = run(site.path(), &forced);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_invalid_date_is_rejected() {
    let site = valid_site();
    let output = run(site.path(), &["new-post", "--date", "03/02/2026"]);
    assert_eq!(output.status.code(), Some(2));
}
