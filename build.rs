use std::process::Command;

/// Stamps `PROJTRACK_VERSION` with the nearest git tag, falling back to the
/// package version outside a checkout.
fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/tags");

    let version = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| {
            let described = String::from_utf8_lossy(&o.stdout).trim().to_string();
            described.strip_prefix('v').unwrap_or(&described).to_string()
        })
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").into());

    println!("cargo:rustc-env=PROJTRACK_VERSION={version}");
}
