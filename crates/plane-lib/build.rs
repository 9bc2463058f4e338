//! Build script for generating protobuf code
//!
//! Generates Rust code from the monitoring protobuf definitions when both
//! protoc and the definitions are available; otherwise the hand-maintained
//! stubs in src/proto are used.

use std::path::{Path, PathBuf};
use std::process::Command;

const PROTO_FILE: &str = "../../proto/monitoring/v1/monitoring.proto";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed={}", PROTO_FILE);

    let protoc_available =
        std::env::var("PROTOC").is_ok() || Command::new("protoc").arg("--version").output().is_ok();

    if !protoc_available || !Path::new(PROTO_FILE).exists() {
        println!("cargo:warning=protoc or proto definitions not found, using stub types");
        return Ok(());
    }

    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);

    tonic_build::configure()
        .build_server(false) // The plane only consumes these services
        .build_client(true)
        .out_dir(&out_dir)
        .compile(&[PROTO_FILE], &["../../proto"])?;

    Ok(())
}
