//! Build script to capture git version information at compile time.

use std::process::Command;

fn main() {
    // Rebuild when the checked-out commit or tags move
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");

    // Fall back to the crate version outside a git checkout
    let version = get_git_version().unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=CRONOMETER_VERSION={}", version);
}

fn get_git_version() -> Option<String> {
    // Tag name when tagged, else the abbreviated commit hash
    let output = Command::new("git")
        .args(["describe", "--tags", "--always"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let version = String::from_utf8(output.stdout).ok()?;
    let version = version.trim();

    if version.is_empty() {
        return None;
    }

    // v0.2.0 -> 0.2.0
    let version = version.strip_prefix('v').unwrap_or(version);

    Some(version.to_string())
}
