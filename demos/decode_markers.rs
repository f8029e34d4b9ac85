//! Build a markers payload, write it out and decode it again

use serato_tags_core::{markers, ColorRecord, Entry, EntryType, Markers, Rgb};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Serato Markers_ Example\n");

    // Serato writes 5 cue slots followed by 9 loop slots
    let mut entries: Vec<Entry> = (0..5).map(|_| Entry::unset(EntryType::Cue)).collect();
    entries.extend((0..9).map(|_| Entry::unset(EntryType::Loop)));

    entries[0] = Entry::cue(1_500, Rgb::new(0xCC, 0x00, 0x00));
    entries[5] = Entry::looped(30_000, 38_000, Rgb::new(0x27, 0xAA, 0xE1));

    let payload = Markers::new(entries, ColorRecord::from_rgb(Rgb::new(0xFF, 0xFF, 0xFF)));
    let encoded = markers::encode(&payload)?;

    std::fs::write("example_markers.bin", &encoded)?;
    println!("Wrote {} bytes to example_markers.bin", encoded.len());

    let decoded = markers::decode(&encoded)?;
    for (i, entry) in decoded.entries.iter().enumerate().filter(|(_, e)| e.is_set) {
        println!(
            "{:2}: {:?} start={:?} end={:?} color={}",
            i, entry.entry_type, entry.start_position, entry.end_position, entry.color
        );
    }
    println!("Track color: {}", decoded.color.rgb());
    println!("\nUse 'serato-tags markers --input example_markers.bin' to read it back");

    Ok(())
}
