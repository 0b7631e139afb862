//! Collects information about the build environment and writes it to the
//! output directory so that the binary can report how it was built.

use std::path::Path;
use std::{env, fs};

fn generate_file(filename: &str, contents: &str) {
    let out_dir = env::var_os("OUT_DIR").expect("cargo sets OUT_DIR for build scripts");
    let dest_path = Path::new(&out_dir).join(filename);
    fs::write(dest_path, contents).expect("OUT_DIR is writable");
}

fn generate_build_info() {
    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    generate_file("target", &format!("{target} ({profile})"));
}

fn main() -> shadow_rs::SdResult<()> {
    generate_build_info();
    let _ = shadow_rs::ShadowBuilder::builder().build()?;
    Ok(())
}
