//! Decode a database V2 file, print its tracks and re-encode it

use serato_tags_core::{database, FieldValue};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "database V2".to_string());

    let data = std::fs::read(&path)?;
    let (fields, anomalies) = database::decode_with_diagnostics(&data)?;

    for field in &fields {
        match &field.value {
            FieldValue::Nested(_) => {
                let path = field
                    .child("pfil")
                    .and_then(|f| f.value.as_text())
                    .unwrap_or("<no path>");
                println!("{}: {}", field.name, path);
            }
            value => println!("{}: {:?}", field.name, value),
        }
    }

    for anomaly in &anomalies {
        println!("Could not decode {} ({} bytes)", anomaly.path, anomaly.length);
    }

    let encoded = database::encode(&fields)?;
    println!(
        "\n{} fields, {} bytes in, {} bytes out",
        fields.len(),
        data.len(),
        encoded.len()
    );

    Ok(())
}
