use anyhow::{Context, Result};
use colored::*;
use serato_tags_core::{database, Field, FieldValue};
use std::fmt::Write;
use std::fs;
use tracing::{debug, info};

/// Render a field value on one line
pub fn format_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Bool(v) => v.to_string(),
        FieldValue::Text(text) => format!("{:?}", text),
        FieldValue::U16(v) => v.to_string(),
        FieldValue::U32(v) => v.to_string(),
        FieldValue::Bytes(raw) => format!("0x{}", hex::encode(raw)),
        FieldValue::Nested(children) => format!("[{} fields]", children.len()),
    }
}

/// Render a field tree, one field per line, children indented
pub fn render(fields: &[Field]) -> String {
    let mut out = String::new();
    render_into(fields, 0, &mut out);
    out
}

fn render_into(fields: &[Field], depth: usize, out: &mut String) {
    for field in fields {
        let indent = "  ".repeat(depth);
        let label = field.name.label().unwrap_or("Unknown");

        match &field.value {
            FieldValue::Nested(children) => {
                let _ = writeln!(out, "{}{} ({}, {} B)", indent, field.name, label, field.length);
                render_into(children, depth + 1, out);
            }
            value => {
                let _ = writeln!(
                    out,
                    "{}{} ({}, {} B): {}",
                    indent,
                    field.name,
                    label,
                    field.length,
                    format_value(value)
                );
            }
        }
    }
}

pub fn execute(input: &str, output: Option<&str>) -> Result<()> {
    info!("Reading field stream from {}", input);

    let data = fs::read(input)
        .with_context(|| format!("Failed to read input file: {}", input))?;

    info!("File size: {} bytes", data.len());

    let (fields, anomalies) = database::decode_with_diagnostics(&data)
        .with_context(|| format!("Failed to decode {}", input))?;

    for anomaly in &anomalies {
        debug!(
            "Unable to parse data: ({}, {} bytes): {}",
            anomaly.path, anomaly.length, anomaly.error
        );
    }

    if let Some(output_path) = output {
        let json = serde_json::to_string_pretty(&fields)
            .with_context(|| "Failed to serialize fields")?;

        fs::write(output_path, json)
            .with_context(|| format!("Failed to write output file: {}", output_path))?;

        info!("{} fields written to: {}", fields.len(), output_path);
    } else {
        print!("{}", render(&fields));
    }

    if !anomalies.is_empty() {
        println!(
            "{} {} field(s) kept as raw bytes",
            "!".yellow(),
            anomalies.len()
        );
    }

    Ok(())
}
