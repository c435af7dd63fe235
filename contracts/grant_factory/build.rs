use std::{env, path::PathBuf};

// The factory tests deploy real grant accounts, so they need the account wasm.
// It is produced by `make build` (or
// `cargo build -p grant-account --target wasm32v1-none --release`). Without
// it the test build fails.
fn main() {
    println!("cargo:rustc-check-cfg=cfg(grant_account_wasm)");
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let target_dir = env::var("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| manifest_dir.join("../../target"));

    let candidates = [
        target_dir.join("wasm32v1-none/release/grant_account.wasm"),
        target_dir.join("wasm32-unknown-unknown/release/grant_account.wasm"),
    ];
    for wasm in &candidates {
        println!("cargo:rerun-if-changed={}", wasm.display());
    }

    match candidates.iter().find(|wasm| wasm.exists()) {
        Some(wasm) => {
            println!("cargo:rustc-cfg=grant_account_wasm");
            println!("cargo:rustc-env=GRANT_ACCOUNT_WASM={}", wasm.display());
        }
        None => println!(
            "cargo:warning=grant_account.wasm not built, run `make build` before testing the factory"
        ),
    }
}
