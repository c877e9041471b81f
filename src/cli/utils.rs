use std::io::{BufRead, Write};

use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });
            if let (Some(obj), Some(extra)) = (response.as_object_mut(), data.as_ref()) {
                if let Some(extra) = extra.as_object() {
                    obj.extend(extra.clone());
                }
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output a collection: pretty JSON under `key`, or one text line per item.
pub fn output_collection(
    output_format: &OutputFormat,
    key: &str,
    items: Value,
    lines: Vec<String>,
    empty_message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ key: items }))?);
        }
        OutputFormat::Text => {
            if lines.is_empty() {
                println!("{}", empty_message);
            } else {
                for line in lines {
                    println!("{}", line);
                }
            }
        }
    }
    Ok(())
}

/// Output a single record as pretty JSON, or the given text block.
pub fn output_record(
    output_format: &OutputFormat,
    record: Value,
    text: String,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
        OutputFormat::Text => println!("{}", text),
    }
    Ok(())
}

/// Read a secret from stdin when it was not passed as a flag.
pub fn prompt_secret(label: &str) -> anyhow::Result<String> {
    eprint!("{}: ", label);
    std::io::stderr().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
