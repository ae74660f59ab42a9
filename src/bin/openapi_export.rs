// Prints the OpenAPI schema of the demo API to stdout
// Usage: cargo run --bin openapi_export > openapi.json

use controller_advice::api::openapi::ApiDoc;
use utoipa::OpenApi;

fn main() -> anyhow::Result<()> {
    println!("{}", ApiDoc::openapi().to_pretty_json()?);
    Ok(())
}
