//! Build script for pencil-relay
//!
//! Stamps build date, time and git hash for the startup banner. Honours
//! `SOURCE_DATE_EPOCH` so packaged builds carry a reproducible timestamp.

use std::process::Command;

fn main() {
    let stamp = match std::env::var("SOURCE_DATE_EPOCH") {
        Ok(epoch) => run("date", &["-u", &format!("-d@{epoch}"), "+%Y-%m-%d %H:%M:%S"]),
        Err(_) => run("date", &["+%Y-%m-%d %H:%M:%S"]),
    };
    let (date, time) = stamp
        .as_deref()
        .and_then(|s| s.split_once(' '))
        .unwrap_or(("unknown", ""));

    let hash = run("git", &["rev-parse", "--short", "HEAD"]);

    println!("cargo:rustc-env=BUILD_DATE={date}");
    println!("cargo:rustc-env=BUILD_TIME={time}");
    println!("cargo:rustc-env=GIT_HASH={}", hash.as_deref().unwrap_or("unknown"));

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
}

/// Trimmed stdout of a successful command with non-empty output
fn run(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (output.status.success() && !text.is_empty()).then_some(text)
}
