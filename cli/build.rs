fn main() {
    println!("cargo:rerun-if-env-changed=STAKESIGN_VERSION");
    let version = std::env::var("STAKESIGN_VERSION")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());
    println!("cargo:rustc-env=APP_VERSION={}", version.trim_start_matches('v'));
}
