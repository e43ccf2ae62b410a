//! Print a service's OpenAPI document as JSON.
//!
//! `openapi-dump news` (default) or `openapi-dump users`.

use color_eyre::eyre::{Context, Result, bail};
use utoipa::OpenApi;

use sportnews::doc::{NewsApiDoc, UsersApiDoc};

fn main() -> Result<()> {
    color_eyre::install()?;
    let service = std::env::args().nth(1).unwrap_or_else(|| "news".to_owned());
    let document = match service.as_str() {
        "news" => NewsApiDoc::openapi(),
        "users" => UsersApiDoc::openapi(),
        other => bail!("unknown service {other}; expected news or users"),
    };
    let json = document
        .to_pretty_json()
        .wrap_err("failed to serialise the OpenAPI document")?;
    println!("{json}");
    Ok(())
}
