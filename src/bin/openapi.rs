//! Print the OpenAPI document to stdout, for docs pipelines and client
//! generation without running the server.

use anyhow::Result;

fn main() -> Result<()> {
    let spec = custode::api::openapi().to_pretty_json()?;
    println!("{spec}");
    Ok(())
}
