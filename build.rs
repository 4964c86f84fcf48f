//! Build script for automerge - bakes a human-readable version string into
//! the binary for clap's `--version` output.
//!
//! Prefers `git describe --tags --always --dirty`; when no tag is reachable,
//! falls back to a pseudo-version built from the Cargo.toml version, a
//! timestamp, and the short commit hash.

use std::{env, process::Command};

use chrono::Utc;

fn main() {
    ["src", "build.rs", "Cargo.toml"]
        .iter()
        .for_each(|path| println!("cargo:rerun-if-changed={path}"));

    println!("cargo:rustc-env=BUILD_INFO_HUMAN={}", build_info());
}

/// Executes a git command and returns the trimmed stdout, if any.
fn git_command(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn pseudo_version() -> String {
    let version = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "unknown".to_string());
    let commit =
        git_command(&["rev-parse", "--short=12", "HEAD"]).unwrap_or_else(|| "unknown".to_string());
    let timestamp = Utc::now().format("%Y%m%d%H%M%S");
    format!("v{version}-{timestamp}-{commit}")
}

fn build_info() -> String {
    let described = git_command(&["describe", "--tags", "--always", "--dirty"]);
    match described {
        // A bare hash means no tag is reachable; synthesise a pseudo-version.
        Some(desc) if desc.contains('v') || desc.contains("-g") => desc,
        _ => pseudo_version(),
    }
}
