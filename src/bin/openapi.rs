//! Prints the OpenAPI document for the task API.

use std::io::Write;

use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let doc = tareas::api::docs::ApiDoc::openapi().to_pretty_json()?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{doc}")?;
    Ok(())
}
