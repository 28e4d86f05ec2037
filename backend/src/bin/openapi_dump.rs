//! Print the OpenAPI document as JSON.

use artmarket::doc::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<(), serde_json::Error> {
    let json = ApiDoc::openapi().to_pretty_json()?;
    #[expect(clippy::print_stdout, reason = "the document is the program output")]
    {
        println!("{json}");
    }
    Ok(())
}
