use serde_json::Value;

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<&Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let payload = data.cloned().unwrap_or(Value::Null);
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "success": true,
                    "message": message,
                    "data": payload,
                }))?
            );
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output a raw value: pretty JSON, or one line per record in text mode
pub fn output_value(output_format: OutputFormat, value: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        OutputFormat::Text => match value {
            Value::Array(items) => {
                if items.is_empty() {
                    println!("(no records)");
                }
                for item in items {
                    println!("{}", summarize(item));
                }
            }
            other => println!("{}", summarize(other)),
        },
    }
    Ok(())
}

/// One-line rendering of a record: id first, then remaining fields
fn summarize(value: &Value) -> String {
    match value.as_object() {
        Some(map) => {
            let mut parts = Vec::new();
            if let Some(id) = map.get("id").and_then(Value::as_str) {
                parts.push(format!("id={}", id));
            }
            for (key, val) in map {
                if key == "id" {
                    continue;
                }
                match val {
                    Value::String(s) => parts.push(format!("{}={}", key, s)),
                    Value::Null => {}
                    other => parts.push(format!("{}={}", key, other)),
                }
            }
            parts.join("  ")
        }
        None => value.to_string(),
    }
}
