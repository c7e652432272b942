//! services/api/src/bin/openapi.rs
//!
//! Writes the pantry planner's OpenAPI document to `openapi.json`, for client
//! generation without a running server.

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

fn write_document(
    api_doc: utoipa::openapi::OpenApi,
    path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = api_doc.to_pretty_json()?;
    std::fs::write(path, json)?;
    println!("OpenAPI document written to {}", path);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    write_document(ApiDoc::openapi(), "openapi.json")?;
    Ok(())
}
