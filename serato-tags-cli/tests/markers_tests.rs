use std::fs;
use std::path::Path;
use tempfile::tempdir;

use id3::frame::{Content, EncapsulatedObject};
use id3::{Tag, TagLike, Version};
use serato_tags_cli::commands::markers;
use serato_tags_cli::geob::GeobSource;
use serato_tags_core::constants::MARKERS_GEOB_DESCRIPTION;
use serato_tags_core::{
    markers as codec, ColorRecord, Entry, EntryType, MarkerRecord, Markers, Rgb,
};

/// Helper: a typical payload with 5 cue and 9 loop slots
fn create_payload() -> Vec<u8> {
    let mut entries: Vec<Entry> = (0..5).map(|_| Entry::unset(EntryType::Cue)).collect();
    entries.extend((0..9).map(|_| Entry::unset(EntryType::Loop)));
    entries[0] = Entry::cue(1000, Rgb::new(0xCC, 0x00, 0x00));

    let payload = Markers::new(entries, ColorRecord::from_rgb(Rgb::new(0xFF, 0xFF, 0xFF)));
    codec::encode(&payload).unwrap().to_vec()
}

/// Helper: an MP3-ish file whose ID3 tag carries the payload and one unrelated GEOB
fn create_tagged_file(path: &Path, payload: &[u8]) {
    fs::write(path, [0xFF, 0xFB, 0x90, 0x00, 0x00, 0x00, 0x00, 0x00]).unwrap();

    let mut tag = Tag::new();
    tag.set_title("Test Track");
    tag.add_frame(EncapsulatedObject {
        mime_type: "application/octet-stream".to_string(),
        filename: String::new(),
        description: MARKERS_GEOB_DESCRIPTION.to_string(),
        data: payload.to_vec(),
    });
    tag.add_frame(EncapsulatedObject {
        mime_type: "application/octet-stream".to_string(),
        filename: String::new(),
        description: "Serato Overview".to_string(),
        data: vec![0x01, 0x05, 0x00],
    });
    tag.write_to_path(path, Version::Id3v24).unwrap();
}

fn read_geob(path: &Path, description: &str) -> Option<Vec<u8>> {
    let tag = Tag::read_from_path(path).unwrap();
    let found = tag.frames().find_map(|frame| match frame.content() {
        Content::EncapsulatedObject(obj) if obj.description == description => {
            Some(obj.data.clone())
        }
        _ => None,
    });
    found
}

#[test]
fn test_markers_raw_file_to_json() {
    let td = tempdir().unwrap();
    let input_path = td.path().join("markers.bin");
    let output_path = td.path().join("markers.json");
    fs::write(&input_path, create_payload()).unwrap();

    markers::execute(
        input_path.to_str().unwrap(),
        Some(output_path.to_str().unwrap()),
    )
    .unwrap();

    let json = fs::read_to_string(&output_path).unwrap();
    let records: Vec<MarkerRecord> = serde_json::from_str(&json).unwrap();

    assert_eq!(records.len(), 15);
    match &records[0] {
        MarkerRecord::Entry(entry) => {
            assert!(entry.is_set);
            assert_eq!(entry.start_position, Some(1000));
            assert_eq!(entry.color, Rgb::new(0xCC, 0x00, 0x00));
        }
        other => panic!("expected entry, got {:?}", other),
    }
    assert!(matches!(records[14], MarkerRecord::Color(_)));
}

#[test]
fn test_markers_tagged_file() {
    let td = tempdir().unwrap();
    let input_path = td.path().join("track.mp3");
    let output_path = td.path().join("markers.json");
    create_tagged_file(&input_path, &create_payload());

    markers::execute(
        input_path.to_str().unwrap(),
        Some(output_path.to_str().unwrap()),
    )
    .unwrap();

    let records: Vec<MarkerRecord> =
        serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(records.len(), 15);
}

#[test]
fn test_markers_tag_without_object() {
    let td = tempdir().unwrap();
    let input_path = td.path().join("track.mp3");
    fs::write(&input_path, [0xFF, 0xFB, 0x90, 0x00]).unwrap();

    let mut tag = Tag::new();
    tag.set_title("No markers");
    tag.write_to_path(&input_path, Version::Id3v24).unwrap();

    let err = markers::execute(input_path.to_str().unwrap(), None).unwrap_err();
    assert!(err.to_string().contains("Serato Markers_"));
}

#[test]
fn test_import_into_tagged_file() {
    let td = tempdir().unwrap();
    let track_path = td.path().join("track.mp3");
    let json_path = td.path().join("markers.json");
    create_tagged_file(&track_path, &create_payload());

    // Export, set a loop, import
    markers::execute(track_path.to_str().unwrap(), Some(json_path.to_str().unwrap())).unwrap();
    let mut records: Vec<MarkerRecord> =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    records[5] = MarkerRecord::Entry(Entry::looped(5000, 9000, Rgb::new(0x27, 0xAA, 0xE1)));
    fs::write(&json_path, serde_json::to_string_pretty(&records).unwrap()).unwrap();

    let changed =
        markers::import(json_path.to_str().unwrap(), track_path.to_str().unwrap()).unwrap();
    assert!(changed);

    let stored = read_geob(&track_path, MARKERS_GEOB_DESCRIPTION).unwrap();
    let decoded = codec::decode(&stored).unwrap();
    assert_eq!(decoded.entries.len(), 14);
    assert_eq!(decoded.entries[5].start_position, Some(5000));
    assert_eq!(decoded.entries[5].end_position, Some(9000));
    assert_eq!(decoded.entries[5].entry_type, EntryType::Loop);

    // Other GEOB objects and frames survive
    assert_eq!(read_geob(&track_path, "Serato Overview"), Some(vec![0x01, 0x05, 0x00]));
    let tag = Tag::read_from_path(&track_path).unwrap();
    assert_eq!(tag.title(), Some("Test Track"));
}

#[test]
fn test_import_unchanged_is_noop() {
    let td = tempdir().unwrap();
    let raw_path = td.path().join("markers.bin");
    let json_path = td.path().join("markers.json");
    fs::write(&raw_path, create_payload()).unwrap();

    markers::execute(raw_path.to_str().unwrap(), Some(json_path.to_str().unwrap())).unwrap();

    let changed =
        markers::import(json_path.to_str().unwrap(), raw_path.to_str().unwrap()).unwrap();
    assert!(!changed);
    assert_eq!(fs::read(&raw_path).unwrap(), create_payload());
}

#[test]
fn test_import_into_raw_file() {
    let td = tempdir().unwrap();
    let raw_path = td.path().join("markers.bin");
    let json_path = td.path().join("markers.json");
    fs::write(&raw_path, create_payload()).unwrap();

    let records = vec![
        MarkerRecord::Entry(Entry::cue(42, Rgb::new(1, 2, 3))),
        MarkerRecord::Color(ColorRecord::default()),
    ];
    fs::write(&json_path, serde_json::to_string(&records).unwrap()).unwrap();

    assert!(markers::import(json_path.to_str().unwrap(), raw_path.to_str().unwrap()).unwrap());

    let stored = fs::read(&raw_path).unwrap();
    assert_eq!(&stored[..6], &[0x02, 0x05, 0x00, 0x00, 0x00, 0x01]);
    assert_eq!(codec::decode_records(&stored).unwrap(), records);
}

#[test]
fn test_import_rejects_missing_color() {
    let td = tempdir().unwrap();
    let raw_path = td.path().join("markers.bin");
    let json_path = td.path().join("markers.json");
    fs::write(&raw_path, create_payload()).unwrap();

    let records = vec![MarkerRecord::Entry(Entry::unset(EntryType::Cue))];
    fs::write(&json_path, serde_json::to_string(&records).unwrap()).unwrap();

    assert!(markers::import(json_path.to_str().unwrap(), raw_path.to_str().unwrap()).is_err());
    assert_eq!(fs::read(&raw_path).unwrap(), create_payload());
}

#[test]
fn test_geob_source_raw() {
    let td = tempdir().unwrap();
    let raw_path = td.path().join("markers.bin");
    fs::write(&raw_path, create_payload()).unwrap();

    let source = GeobSource::open(&raw_path, MARKERS_GEOB_DESCRIPTION).unwrap();
    assert!(matches!(source, GeobSource::Raw(_)));
    assert_eq!(source.data(), Some(create_payload().as_slice()));
}

/// Helper: an MP3 frame header followed by audio-like bytes, no ID3 tag
fn create_untagged_audio(path: &Path) -> Vec<u8> {
    let mut audio = vec![0xFF, 0xFB, 0x90, 0x64];
    audio.extend((0..4096u32).map(|i| (i * 31 % 251) as u8));
    fs::write(path, &audio).unwrap();
    audio
}

#[test]
fn test_import_leaves_untagged_audio_alone() {
    let td = tempdir().unwrap();
    let track_path = td.path().join("untagged.mp3");
    let json_path = td.path().join("markers.json");
    let audio = create_untagged_audio(&track_path);

    let records = vec![
        MarkerRecord::Entry(Entry::cue(42, Rgb::new(1, 2, 3))),
        MarkerRecord::Color(ColorRecord::default()),
    ];
    fs::write(&json_path, serde_json::to_string(&records).unwrap()).unwrap();

    let err = markers::import(json_path.to_str().unwrap(), track_path.to_str().unwrap())
        .unwrap_err();
    assert!(err.to_string().contains("GEOB:Serato Markers_"));
    assert_eq!(fs::read(&track_path).unwrap(), audio);
}

#[test]
fn test_markers_untagged_audio_reports_missing_tag() {
    let td = tempdir().unwrap();
    let track_path = td.path().join("untagged.mp3");
    create_untagged_audio(&track_path);

    let err = markers::execute(track_path.to_str().unwrap(), None).unwrap_err();
    assert!(err.to_string().contains("File is missing \"GEOB:Serato Markers_\" tag"));
}
