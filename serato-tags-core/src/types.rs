//! Core types for database fields and cue/loop markers

use crate::constants::{field_label, TypeCode, FIELD_HEADER_SIZE};
use crate::error::TagError;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Four-character ASCII field identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldName([u8; 4]);

impl FieldName {
    /// Create a field name, rejecting non-ASCII bytes
    pub fn new(bytes: [u8; 4]) -> Result<Self, TagError> {
        if bytes.is_ascii() {
            Ok(Self(bytes))
        } else {
            Err(TagError::InvalidFieldName(bytes))
        }
    }

    /// Raw name bytes as stored on the wire
    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Name as a string slice
    pub fn as_str(&self) -> &str {
        // ASCII is checked on construction
        core::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Type code used to interpret this field's payload
    pub fn type_code(&self) -> TypeCode {
        TypeCode::for_name(&self.0)
    }

    /// Human-readable label, if the field is a known one
    pub fn label(&self) -> Option<&'static str> {
        field_label(self.as_str())
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldName({:?})", self.as_str())
    }
}

impl TryFrom<&str> for FieldName {
    type Error = TagError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        let mut bytes = [0u8; 4];
        if name.len() != bytes.len() {
            let mut padded = [0u8; 4];
            for (dst, src) in padded.iter_mut().zip(name.bytes()) {
                *dst = src;
            }
            return Err(TagError::InvalidFieldName(padded));
        }
        bytes.copy_from_slice(name.as_bytes());
        Self::new(bytes)
    }
}

impl TryFrom<String> for FieldName {
    type Error = TagError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::try_from(name.as_str())
    }
}

impl From<FieldName> for String {
    fn from(name: FieldName) -> Self {
        String::from(name.as_str())
    }
}

/// Decoded payload of a tagged field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// `b` fields
    Bool(bool),
    /// `p`, `t` and `vrsn` fields
    Text(String),
    /// `s` fields
    U16(u16),
    /// `u` fields
    U32(u32),
    /// Unknown type codes, and text that failed to decode
    Bytes(Vec<u8>),
    /// `o` and `r` fields
    Nested(Vec<Field>),
}

impl FieldValue {
    /// Number of bytes this value occupies once encoded
    pub fn encoded_len(&self) -> usize {
        match self {
            FieldValue::Bool(_) => 1,
            FieldValue::Text(text) => text.encode_utf16().count() * 2,
            FieldValue::U16(_) => 2,
            FieldValue::U32(_) => 4,
            FieldValue::Bytes(raw) => raw.len(),
            FieldValue::Nested(children) => children
                .iter()
                .map(|child| FIELD_HEADER_SIZE + child.value.encoded_len())
                .sum(),
        }
    }

    /// Child fields of a nested value
    pub fn as_nested(&self) -> Option<&[Field]> {
        match self {
            FieldValue::Nested(children) => Some(children),
            _ => None,
        }
    }

    /// Text content of a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// One (name, length, value) record of a tagged field stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field identifier
    pub name: FieldName,

    /// Payload length as read from the stream; recomputed on encode
    pub length: u32,

    /// Decoded payload
    pub value: FieldValue,
}

impl Field {
    /// Create a field, deriving its length from the value
    pub fn new(name: FieldName, value: FieldValue) -> Self {
        Self {
            name,
            length: advisory_length(value.encoded_len()),
            value,
        }
    }

    /// Find the first direct child field with the given name
    pub fn child(&self, name: &str) -> Option<&Field> {
        self.value
            .as_nested()?
            .iter()
            .find(|child| child.name.as_str() == name)
    }
}

/// Header length for a payload, saturating at `u32::MAX`
fn advisory_length(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Create a color from its channels
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as `[r, g, b]`
    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Kind of a marker entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EntryType {
    /// Unused slot
    Invalid = 0,
    /// Cue point
    Cue = 1,
    /// Loop
    Loop = 3,
}

impl EntryType {
    /// Stored byte value
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for EntryType {
    type Error = TagError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EntryType::Invalid),
            1 => Ok(EntryType::Cue),
            3 => Ok(EntryType::Loop),
            other => Err(TagError::InvalidEntryType(other)),
        }
    }
}

/// A cue point or loop marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Whether the slot holds a marker
    pub is_set: bool,

    /// Start position in milliseconds
    pub start_position: Option<u32>,

    /// Unknown byte
    pub field3: [u8; 1],

    /// End position in milliseconds (loops only)
    pub end_position: Option<u32>,

    /// Unknown bytes
    pub field5: [u8; 6],

    /// Marker color
    pub color: Rgb,

    /// Cue, loop or unused slot
    pub entry_type: EntryType,

    /// Unknown byte
    pub field6: [u8; 1],
}

impl Entry {
    /// Create an unset slot of the given type
    pub fn unset(entry_type: EntryType) -> Self {
        Self {
            is_set: false,
            start_position: None,
            field3: [0x00],
            end_position: None,
            field5: [0x00; 6],
            color: Rgb::default(),
            entry_type,
            field6: [0x00],
        }
    }

    /// Create a set cue point
    pub fn cue(position: u32, color: Rgb) -> Self {
        Self {
            is_set: true,
            start_position: Some(position),
            color,
            ..Self::unset(EntryType::Cue)
        }
    }

    /// Create a set loop
    pub fn looped(start: u32, end: u32, color: Rgb) -> Self {
        Self {
            is_set: true,
            start_position: Some(start),
            end_position: Some(end),
            color,
            ..Self::unset(EntryType::Loop)
        }
    }
}

/// Trailing color record of a markers payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColorRecord {
    /// Packed color bytes, kept as stored
    pub color_mask: [u8; 4],
}

/// One element of the flat marker record list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarkerRecord {
    /// A cue or loop entry
    Entry(Entry),
    /// The trailing color record
    Color(ColorRecord),
}

/// Decoded `Serato Markers_` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markers {
    /// Entries in stored order
    pub entries: Vec<Entry>,

    /// Trailing color record (not counted in the entry count)
    pub color: ColorRecord,
}

impl Markers {
    /// Create a markers payload
    pub fn new(entries: Vec<Entry>, color: ColorRecord) -> Self {
        Self { entries, color }
    }

    /// Flatten into entries followed by the color record
    pub fn into_records(self) -> Vec<MarkerRecord> {
        let mut records: Vec<MarkerRecord> =
            self.entries.into_iter().map(MarkerRecord::Entry).collect();
        records.push(MarkerRecord::Color(self.color));
        records
    }

    /// Build from a flat record list whose last element is the color record
    pub fn from_records(records: Vec<MarkerRecord>) -> Result<Self, TagError> {
        let mut entries = Vec::with_capacity(records.len().saturating_sub(1));
        let mut color = None;

        for (index, record) in records.into_iter().enumerate() {
            if color.is_some() {
                return Err(TagError::MisplacedColor(index - 1));
            }
            match record {
                MarkerRecord::Entry(entry) => entries.push(entry),
                MarkerRecord::Color(record) => color = Some(record),
            }
        }

        let color = color.ok_or(TagError::MissingColor)?;
        Ok(Self { entries, color })
    }
}
