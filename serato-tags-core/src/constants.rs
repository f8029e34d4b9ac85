//! Constants and lookup tables for the Serato tag formats

use serde::{Deserialize, Serialize};

/// Version bytes at the start of a `Serato Markers_` payload
pub const MARKERS_VERSION: [u8; 2] = [0x02, 0x05];

/// Size of one cue/loop entry in the markers payload
/// 1 (is_set) + 4 (start) + 1 (field3) + 4 (end) + 6 (field5) + 4 (color) + 1 (type) + 1 (field6) = 22 bytes
pub const ENTRY_SIZE: usize = 0x16;

/// Size of the trailing color record
pub const COLOR_RECORD_SIZE: usize = 4;

/// Stored position value meaning "no position"
pub const POSITION_SENTINEL: u32 = 0x7F7F7F7F;

/// Stored `is_set` byte for a set entry (inverted relative to the logical value)
pub const IS_SET_TRUE: u8 = 0x00;

/// Stored `is_set` byte for an unset entry
pub const IS_SET_FALSE: u8 = 0x7F;

/// Tagged field header: 4-byte name + 4-byte big-endian length
pub const FIELD_HEADER_SIZE: usize = 8;

/// Field whose leading character is not a type code but which always holds text
pub const VERSION_FIELD: &[u8; 4] = b"vrsn";

/// Maximum nesting of `o`/`r` field streams accepted by the codec
pub const MAX_NESTING_DEPTH: usize = 64;

/// GEOB description of the cue/loop marker object
pub const MARKERS_GEOB_DESCRIPTION: &str = "Serato Markers_";

/// MIME type Serato writes on its GEOB objects
pub const GEOB_MIME_TYPE: &str = "application/octet-stream";

/// Human-readable labels for known database and crate field names
pub const FIELD_LABELS: &[(&str, &str)] = &[
    // Database
    ("vrsn", "Version"),
    ("otrk", "Track"),
    ("ttyp", "File Type"),
    ("pfil", "File Path"),
    ("tsng", "Song Title"),
    ("tlen", "Length"),
    ("tbit", "Bitrate"),
    ("tsmp", "Sample Rate"),
    ("tbpm", "BPM"),
    ("tadd", "Date added"),
    ("uadd", "Date added"),
    ("tkey", "Key"),
    ("bbgl", "Beatgrid Locked"),
    ("tart", "Artist"),
    ("utme", "File Time"),
    ("bmis", "Missing"),
    // Crates
    ("osrt", "Sorting"),
    ("brev", "Reverse Order"),
    ("ovct", "Column Title"),
    ("tvcn", "Column Name"),
    ("tvcw", "Column Width"),
    ("ptrk", "Track Path"),
];

/// Payload interpretation selected by a field's type code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeCode {
    /// `b`: single-byte boolean
    Bool,
    /// `o`, `r`: nested field stream
    Nested,
    /// `p`, `t`: UTF-16BE text without BOM or terminator
    Text,
    /// `s`: big-endian u16
    U16,
    /// `u`: big-endian u32
    U32,
    /// Anything else: opaque bytes
    Raw,
}

impl TypeCode {
    /// Resolve the type for a type-code character
    pub const fn from_code(code: u8) -> Self {
        match code {
            b'b' => TypeCode::Bool,
            b'o' | b'r' => TypeCode::Nested,
            b'p' | b't' => TypeCode::Text,
            b's' => TypeCode::U16,
            b'u' => TypeCode::U32,
            _ => TypeCode::Raw,
        }
    }

    /// Resolve the type for a field name, honouring the `vrsn` exception
    pub fn for_name(name: &[u8; 4]) -> Self {
        if name == VERSION_FIELD {
            TypeCode::Text
        } else {
            Self::from_code(name[0])
        }
    }

    /// Returns the payload width for fixed-width types
    pub const fn width(&self) -> Option<usize> {
        match self {
            TypeCode::Bool => Some(1),
            TypeCode::U16 => Some(2),
            TypeCode::U32 => Some(4),
            TypeCode::Nested | TypeCode::Text | TypeCode::Raw => None,
        }
    }
}

/// Look up the label for a field name
pub fn field_label(name: &str) -> Option<&'static str> {
    FIELD_LABELS
        .iter()
        .find(|(field, _)| *field == name)
        .map(|(_, label)| *label)
}
