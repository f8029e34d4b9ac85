use crate::geob::GeobSource;
use anyhow::{Context, Result};
use serato_tags_core::constants::MARKERS_GEOB_DESCRIPTION;
use serato_tags_core::{markers, MarkerRecord};
use std::fs;
use std::path::Path;
use tracing::info;

/// Render one marker record on one line
pub fn describe(record: &MarkerRecord) -> String {
    match record {
        MarkerRecord::Entry(e) => format!(
            "Entry(is_set={}, start_position={:?}, field3={:02x?}, end_position={:?}, \
             field5={:02x?}, color={}, type={:?}, field6={:02x?})",
            e.is_set,
            e.start_position,
            e.field3,
            e.end_position,
            e.field5,
            e.color,
            e.entry_type,
            e.field6
        ),
        MarkerRecord::Color(c) => format!(
            "Color(color_mask={:02x?}, rgb={})",
            c.color_mask,
            c.rgb()
        ),
    }
}

/// Render all records with indices padded to a common width
pub fn render(records: &[MarkerRecord]) -> String {
    let width = records.len().to_string().len();
    records
        .iter()
        .enumerate()
        .map(|(i, record)| format!("{:>width$}: {}\n", i, describe(record), width = width))
        .collect()
}

pub fn execute(input: &str, output: Option<&str>) -> Result<()> {
    info!("Reading markers from {}", input);

    let source = GeobSource::open(Path::new(input), MARKERS_GEOB_DESCRIPTION)?;
    let data = source.require_data(MARKERS_GEOB_DESCRIPTION)?;

    let records = markers::decode_records(data)
        .with_context(|| format!("Failed to decode markers in {}", input))?;

    info!("Found {} entries", records.len() - 1);

    if let Some(output_path) = output {
        let json = serde_json::to_string_pretty(&records)
            .with_context(|| "Failed to serialize markers")?;

        fs::write(output_path, json)
            .with_context(|| format!("Failed to write output file: {}", output_path))?;

        info!("Markers written to: {}", output_path);
    } else {
        print!("{}", render(&records));
    }

    Ok(())
}

/// Encode records from a JSON file and store them in `target`
///
/// Returns `false` without touching `target` if the payload is unchanged.
pub fn import(input: &str, target: &str) -> Result<bool> {
    info!("Importing markers from {} into {}", input, target);

    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file: {}", input))?;

    let records: Vec<MarkerRecord> = serde_json::from_str(&content)
        .with_context(|| "Failed to parse JSON input")?;

    let encoded = markers::encode_records(&records)
        .with_context(|| "Marker records are invalid")?;

    let target_path = Path::new(target);
    let source = GeobSource::open(target_path, MARKERS_GEOB_DESCRIPTION)?;

    if source.data() == Some(encoded.as_ref()) {
        println!("No changes made.");
        return Ok(false);
    }

    source.store(target_path, MARKERS_GEOB_DESCRIPTION, &encoded)?;
    println!("Saved {} entries to {}", records.len() - 1, target);

    Ok(true)
}
