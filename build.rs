//! Build script for Volume Mixer
//!
//! Embeds the Windows application manifest for DPI awareness and
//! links required Windows libraries.

fn main() {
    // Only run on Windows
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows") {
        return;
    }

    embed_resource::compile("resources/app.rc", embed_resource::NONE);

    println!("cargo:rustc-link-lib=ole32");
    println!("cargo:rustc-link-lib=user32");
    println!("cargo:rustc-link-lib=advapi32");

    println!("cargo:rerun-if-changed=resources/app.rc");
    println!("cargo:rerun-if-changed=resources/app.manifest");
}
