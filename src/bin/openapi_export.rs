//! Writes the OpenAPI document to disk, or to stdout with `-`.
//!
//! Run with: cargo run --bin openapi-export [-- <path>]

use std::{fs, path::PathBuf};

use influence_api::openapi::ApiDocV1;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(&ApiDocV1::openapi())?;

    let target = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "openapi/influence-api.v1.json".to_string());

    if target == "-" {
        println!("{}", json);
        return Ok(());
    }

    let output_path = PathBuf::from(target);
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output_path, json)?;

    println!("OpenAPI spec written to {}", output_path.display());
    Ok(())
}
