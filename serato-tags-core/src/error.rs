//! Error types for Serato tag codecs

use crate::constants::TypeCode;
use alloc::string::String;

/// Errors that can occur while decoding or encoding Serato tag payloads
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[derive(Debug, Clone, PartialEq)]
pub enum TagError {
    /// Fewer bytes available than a fixed-width field or declared length requires
    #[cfg_attr(feature = "std", error("Truncated input: expected {expected} bytes, got {actual}"))]
    Truncated {
        /// The number of bytes required.
        expected: usize,
        /// The number of bytes actually available.
        actual: usize,
    },

    /// A fixed-width payload carries more bytes than its type allows
    #[cfg_attr(feature = "std", error("Field {field} expects {expected} bytes, got {actual}"))]
    UnexpectedWidth {
        /// Field or record the payload belongs to.
        field: String,
        /// The fixed width of the type.
        expected: usize,
        /// The payload length found.
        actual: usize,
    },

    /// Marker payload starts with an unknown format version
    #[cfg_attr(feature = "std", error("Unsupported markers version: {0:02x?}"))]
    UnsupportedVersion([u8; 2]),

    /// Byte sequence handed to the pair swap has odd length
    #[cfg_attr(feature = "std", error("Odd byte count {0} in UTF-16 data"))]
    OddLength(usize),

    /// Text payload is not a valid UTF-16 code unit sequence
    #[cfg_attr(feature = "std", error("Invalid UTF-16: unpaired surrogate {unit:#06x}"))]
    InvalidUtf16 {
        /// The offending code unit.
        unit: u16,
    },

    /// Sentinel byte outside its defined domain
    #[cfg_attr(feature = "std", error("Invalid {field} byte: {value:#04x}"))]
    InvalidSentinel {
        /// Name of the sentinel-encoded field.
        field: &'static str,
        /// The byte found.
        value: u8,
    },

    /// Entry type byte that is not Invalid (0), Cue (1) or Loop (3)
    #[cfg_attr(feature = "std", error("Invalid entry type: {0}"))]
    InvalidEntryType(u8),

    /// Field name is not four ASCII characters
    #[cfg_attr(feature = "std", error("Invalid field name: {0:02x?}"))]
    InvalidFieldName([u8; 4]),

    /// Nested field streams exceed the maximum depth
    #[cfg_attr(feature = "std", error("Nesting depth exceeds maximum of {0}"))]
    NestingTooDeep(usize),

    /// Field value variant does not match the field's type code
    #[cfg_attr(feature = "std", error("Value for field {field} does not match type {expected:?}"))]
    ValueMismatch {
        /// The field name.
        field: String,
        /// The type code resolved from the name.
        expected: TypeCode,
    },

    /// Encoded payload does not fit the 32-bit length field
    #[cfg_attr(feature = "std", error("Payload of {0} bytes exceeds the 32-bit length field"))]
    PayloadTooLarge(usize),

    /// Marker record list does not end with a color record
    #[cfg_attr(feature = "std", error("Marker records must end with a color record"))]
    MissingColor,

    /// Color record found before the end of the marker record list
    #[cfg_attr(feature = "std", error("Color record at index {0} is not the last record"))]
    MisplacedColor(usize),
}

impl TagError {
    /// Shorthand for a truncation error
    pub(crate) const fn truncated(expected: usize, actual: usize) -> Self {
        TagError::Truncated { expected, actual }
    }

    /// Returns true for truncation-class errors
    pub fn is_truncation(&self) -> bool {
        matches!(self, TagError::Truncated { .. })
    }
}
