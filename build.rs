use std::process::Command;

const NIGHTLY_FLAG: &str = "SPOTSYNC_NIGHTLY";

/// `1` or `true` (any case) in the nightly flag
fn nightly_requested() -> bool {
    std::env::var(NIGHTLY_FLAG)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Short commit id from git, falling back to `GIT_SHA` for CI without a checkout
fn commit_id() -> Option<String> {
    let from_git = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
        .filter(|sha| !sha.is_empty());

    from_git.or_else(|| std::env::var("GIT_SHA").ok().filter(|sha| !sha.is_empty()))
}

fn main() {
    let mut version = env!("CARGO_PKG_VERSION").to_string();
    if nightly_requested() {
        version.push_str("-nightly");
        if let Some(sha) = commit_id() {
            version.push('+');
            version.push_str(&sha);
        }
    }

    println!("cargo:rustc-env=APP_VERSION={}", version);
    for var in [NIGHTLY_FLAG, "GIT_SHA"] {
        println!("cargo:rerun-if-env-changed={}", var);
    }
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads");
}
