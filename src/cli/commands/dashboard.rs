use anyhow::bail;
use serde_json::Value;

use crate::cli::client::ApiClient;
use crate::cli::config::Session;
use crate::cli::utils::output_value;
use crate::cli::OutputFormat;

pub async fn handle(session: &Session, output_format: OutputFormat) -> anyhow::Result<()> {
    if !session.is_logged_in() {
        bail!("not logged in; run `workbench auth login <email>` first");
    }

    let client = ApiClient::new(&session.server, session.token.clone());
    let tiles = client.get("/api/dashboard").await?;

    match output_format {
        OutputFormat::Json => output_value(output_format, &tiles),
        OutputFormat::Text => {
            for tile in tiles.as_array().into_iter().flatten() {
                let name = tile.get("name").and_then(Value::as_str).unwrap_or("?");
                let count = tile.get("count").and_then(Value::as_i64).unwrap_or(0);
                let href = tile.get("href").and_then(Value::as_str).unwrap_or("");
                println!("{:<10} {:>5}  {}", name, count, href);
            }
            Ok(())
        }
    }
}
