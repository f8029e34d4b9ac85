//! Fixed-entry codec for `Serato Markers_` payloads
//!
//! Layout:
//! 1. Version (2 bytes): `0x02 0x05`
//! 2. Entry count (4 bytes, big-endian)
//! 3. `count` entries of 22 bytes each:
//!    - is_set (1 byte): `0x00` set, `0x7F` unset
//!    - start position (4 bytes, big-endian, `0x7F7F7F7F` = none)
//!    - field3 (1 byte)
//!    - end position (4 bytes, big-endian, `0x7F7F7F7F` = none)
//!    - field5 (6 bytes)
//!    - color (4 bytes, 7-bit packed)
//!    - entry type (1 byte): 0 invalid, 1 cue, 3 loop
//!    - field6 (1 byte)
//! 4. Trailing color record (4 bytes), not counted

use crate::color::{pack_rgb, unpack_rgb};
use crate::constants::{
    COLOR_RECORD_SIZE, ENTRY_SIZE, IS_SET_FALSE, IS_SET_TRUE, MARKERS_VERSION,
    POSITION_SENTINEL,
};
use crate::error::TagError;
use crate::types::{ColorRecord, Entry, EntryType, MarkerRecord, Markers, Rgb};
use alloc::string::String;
use alloc::vec::Vec;
use bytes::{Buf, BufMut, Bytes, BytesMut};

#[cfg(feature = "logging")]
use tracing::debug;

const fn decode_position(raw: u32) -> Option<u32> {
    if raw == POSITION_SENTINEL {
        None
    } else {
        Some(raw)
    }
}

const fn encode_position(position: Option<u32>) -> u32 {
    match position {
        Some(value) => value,
        None => POSITION_SENTINEL,
    }
}

fn decode_is_set(byte: u8) -> Result<bool, TagError> {
    match byte {
        IS_SET_TRUE => Ok(true),
        IS_SET_FALSE => Ok(false),
        value => Err(TagError::InvalidSentinel {
            field: "is_set",
            value,
        }),
    }
}

const fn encode_is_set(is_set: bool) -> u8 {
    if is_set {
        IS_SET_TRUE
    } else {
        IS_SET_FALSE
    }
}

impl Entry {
    /// Decode one 22-byte entry block
    pub fn decode(block: &[u8]) -> Result<Self, TagError> {
        if block.len() < ENTRY_SIZE {
            return Err(TagError::truncated(ENTRY_SIZE, block.len()));
        }
        if block.len() > ENTRY_SIZE {
            return Err(TagError::UnexpectedWidth {
                field: String::from("entry"),
                expected: ENTRY_SIZE,
                actual: block.len(),
            });
        }

        let mut buf = block;
        let is_set = decode_is_set(buf.get_u8())?;
        let start_position = decode_position(buf.get_u32());
        let field3 = [buf.get_u8()];
        let end_position = decode_position(buf.get_u32());
        let mut field5 = [0u8; 6];
        buf.copy_to_slice(&mut field5);
        let mut color = [0u8; 4];
        buf.copy_to_slice(&mut color);
        let entry_type = EntryType::try_from(buf.get_u8())?;
        let field6 = [buf.get_u8()];

        Ok(Self {
            is_set,
            start_position,
            field3,
            end_position,
            field5,
            color: unpack_rgb(color),
            entry_type,
            field6,
        })
    }

    /// Encode this entry as a 22-byte block
    pub fn encode(&self) -> [u8; ENTRY_SIZE] {
        let mut block = [0u8; ENTRY_SIZE];
        let mut buf = &mut block[..];
        self.write_to(&mut buf);
        block
    }

    fn write_to<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(encode_is_set(self.is_set));
        buf.put_u32(encode_position(self.start_position));
        buf.put_slice(&self.field3);
        buf.put_u32(encode_position(self.end_position));
        buf.put_slice(&self.field5);
        buf.put_slice(&pack_rgb(self.color));
        buf.put_u8(self.entry_type.as_u8());
        buf.put_slice(&self.field6);
    }
}

impl ColorRecord {
    /// Create a record from an RGB color
    pub const fn from_rgb(rgb: Rgb) -> Self {
        Self {
            color_mask: pack_rgb(rgb),
        }
    }

    /// Interpret the stored mask as a packed color
    pub const fn rgb(&self) -> Rgb {
        unpack_rgb(self.color_mask)
    }

    /// Decode the trailing color record
    ///
    /// Bytes beyond the first four are ignored.
    pub fn decode(data: &[u8]) -> Result<Self, TagError> {
        if data.len() < COLOR_RECORD_SIZE {
            return Err(TagError::truncated(COLOR_RECORD_SIZE, data.len()));
        }

        #[cfg(feature = "logging")]
        if data.len() > COLOR_RECORD_SIZE {
            debug!(
                "Ignoring {} bytes after the color record",
                data.len() - COLOR_RECORD_SIZE
            );
        }

        let mut color_mask = [0u8; COLOR_RECORD_SIZE];
        color_mask.copy_from_slice(&data[..COLOR_RECORD_SIZE]);
        Ok(Self { color_mask })
    }

    /// Encode the color record
    pub const fn encode(&self) -> [u8; COLOR_RECORD_SIZE] {
        self.color_mask
    }
}

/// Decode a markers payload
pub fn decode(data: &[u8]) -> Result<Markers, TagError> {
    let mut buf = data;

    if buf.remaining() < MARKERS_VERSION.len() {
        return Err(TagError::truncated(MARKERS_VERSION.len(), buf.remaining()));
    }
    let version = [buf.get_u8(), buf.get_u8()];
    if version != MARKERS_VERSION {
        return Err(TagError::UnsupportedVersion(version));
    }

    if buf.remaining() < 4 {
        return Err(TagError::truncated(4, buf.remaining()));
    }
    let count = buf.get_u32() as usize;

    #[cfg(feature = "logging")]
    debug!("Decoding {} marker entries from {} bytes", count, data.len());

    // The count comes from the input; don't trust it for preallocation
    let mut entries = Vec::with_capacity(count.min(buf.remaining() / ENTRY_SIZE));
    for _ in 0..count {
        if buf.remaining() < ENTRY_SIZE {
            return Err(TagError::truncated(ENTRY_SIZE, buf.remaining()));
        }
        let (block, rest) = buf.split_at(ENTRY_SIZE);
        entries.push(Entry::decode(block)?);
        buf = rest;
    }

    let color = ColorRecord::decode(buf)?;

    Ok(Markers { entries, color })
}

/// Decode a markers payload into a flat record list ending with the color record
pub fn decode_records(data: &[u8]) -> Result<Vec<MarkerRecord>, TagError> {
    decode(data).map(Markers::into_records)
}

/// Encode a markers payload
pub fn encode(markers: &Markers) -> Result<Bytes, TagError> {
    let count = u32::try_from(markers.entries.len())
        .map_err(|_| TagError::PayloadTooLarge(markers.entries.len()))?;

    let size = MARKERS_VERSION.len() + 4 + markers.entries.len() * ENTRY_SIZE + COLOR_RECORD_SIZE;
    let mut buf = BytesMut::with_capacity(size);

    buf.put_slice(&MARKERS_VERSION);
    buf.put_u32(count);
    for entry in &markers.entries {
        entry.write_to(&mut buf);
    }
    buf.put_slice(&markers.color.encode());

    Ok(buf.freeze())
}

/// Encode a flat record list
///
/// The last record must be the color record; it is not included in the count.
pub fn encode_records(records: &[MarkerRecord]) -> Result<Bytes, TagError> {
    let markers = Markers::from_records(records.to_vec())?;
    encode(&markers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    const CUE_BLOCK: [u8; ENTRY_SIZE] = [
        0x00, // is_set
        0x00, 0x00, 0x03, 0xE8, // start = 1000
        0x7F, // field3
        0x7F, 0x7F, 0x7F, 0x7F, // end = none
        0x00, 0x7F, 0x7F, 0x7F, 0x7F, 0x7F, // field5
        0x06, 0x30, 0x00, 0x00, // color = #CC0000
        0x01, // cue
        0x00, // field6
    ];

    #[test]
    fn test_decode_entry() {
        let entry = Entry::decode(&CUE_BLOCK).unwrap();
        assert!(entry.is_set);
        assert_eq!(entry.start_position, Some(1000));
        assert_eq!(entry.field3, [0x7F]);
        assert_eq!(entry.end_position, None);
        assert_eq!(entry.field5, [0x00, 0x7F, 0x7F, 0x7F, 0x7F, 0x7F]);
        assert_eq!(entry.color, Rgb::new(0xCC, 0x00, 0x00));
        assert_eq!(entry.entry_type, EntryType::Cue);
        assert_eq!(entry.field6, [0x00]);

        assert_eq!(entry.encode(), CUE_BLOCK);
    }

    #[test]
    fn test_position_sentinel() {
        let entry = Entry::unset(EntryType::Cue);
        let block = entry.encode();
        assert_eq!(block[0], IS_SET_FALSE);
        assert_eq!(&block[1..5], &[0x7F, 0x7F, 0x7F, 0x7F]);
        assert_eq!(&block[6..10], &[0x7F, 0x7F, 0x7F, 0x7F]);
        assert_eq!(Entry::decode(&block).unwrap().start_position, None);
    }

    #[test]
    fn test_invalid_sentinels() {
        let mut block = CUE_BLOCK;
        block[0] = 0x01;
        assert_eq!(
            Entry::decode(&block),
            Err(TagError::InvalidSentinel {
                field: "is_set",
                value: 0x01
            })
        );

        let mut block = CUE_BLOCK;
        block[20] = 2;
        assert_eq!(Entry::decode(&block), Err(TagError::InvalidEntryType(2)));
    }

    #[test]
    fn test_entry_block_size() {
        assert_eq!(
            Entry::decode(&CUE_BLOCK[..21]),
            Err(TagError::Truncated { expected: 22, actual: 21 })
        );
        let mut long = CUE_BLOCK.to_vec();
        long.push(0);
        assert!(matches!(
            Entry::decode(&long),
            Err(TagError::UnexpectedWidth { expected: 22, actual: 23, .. })
        ));
    }

    #[test]
    fn test_decode_payload() {
        let mut data = vec![0x02, 0x05, 0x00, 0x00, 0x00, 0x02];
        data.extend_from_slice(&CUE_BLOCK);
        data.extend_from_slice(&Entry::unset(EntryType::Loop).encode());
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

        let markers = decode(&data).unwrap();
        assert_eq!(markers.entries.len(), 2);
        assert_eq!(markers.entries[1].entry_type, EntryType::Loop);
        assert_eq!(markers.color.color_mask, [0, 0, 0, 0]);

        assert_eq!(encode(&markers).unwrap().as_ref(), data.as_slice());
    }

    #[test]
    fn test_count_excludes_color() {
        let records = vec![
            MarkerRecord::Entry(Entry::cue(10, Rgb::new(1, 2, 3))),
            MarkerRecord::Entry(Entry::looped(20, 30, Rgb::new(4, 5, 6))),
            MarkerRecord::Entry(Entry::unset(EntryType::Invalid)),
            MarkerRecord::Color(ColorRecord::from_rgb(Rgb::new(0xFF, 0xFF, 0xFF))),
        ];

        let encoded = encode_records(&records).unwrap();
        assert_eq!(&encoded[2..6], &3u32.to_be_bytes());
        assert_eq!(encoded.len(), 2 + 4 + 3 * ENTRY_SIZE + COLOR_RECORD_SIZE);
        assert_eq!(decode_records(&encoded).unwrap(), records);
    }

    #[test]
    fn test_version_checked_first() {
        let data = [0x02, 0x04, 0xFF];
        assert_eq!(decode(&data), Err(TagError::UnsupportedVersion([0x02, 0x04])));
    }

    #[test]
    fn test_truncation() {
        assert_eq!(decode(&[0x02]), Err(TagError::Truncated { expected: 2, actual: 1 }));
        assert_eq!(
            decode(&[0x02, 0x05, 0x00]),
            Err(TagError::Truncated { expected: 4, actual: 1 })
        );

        let mut data = vec![0x02, 0x05, 0x00, 0x00, 0x00, 0x01];
        data.extend_from_slice(&CUE_BLOCK[..10]);
        assert_eq!(decode(&data), Err(TagError::Truncated { expected: 22, actual: 10 }));

        let mut data = vec![0x02, 0x05, 0x00, 0x00, 0x00, 0x01];
        data.extend_from_slice(&CUE_BLOCK);
        data.extend_from_slice(&[0x00, 0x00]);
        assert_eq!(decode(&data), Err(TagError::Truncated { expected: 4, actual: 2 }));
    }

    #[test]
    fn test_huge_count_does_not_preallocate() {
        let data = [0x02, 0x05, 0xFF, 0xFF, 0xFF, 0xFF, 0x00];
        assert!(decode(&data).unwrap_err().is_truncation());
    }

    #[test]
    fn test_color_record_rgb() {
        let record = ColorRecord::from_rgb(Rgb::new(0x12, 0x34, 0x56));
        assert!(record.color_mask.iter().all(|b| b & 0x80 == 0));
        assert_eq!(record.rgb(), Rgb::new(0x12, 0x34, 0x56));
    }

    #[test]
    fn test_encode_records_requires_color() {
        let records = vec![MarkerRecord::Entry(Entry::unset(EntryType::Cue))];
        assert_eq!(encode_records(&records), Err(TagError::MissingColor));
    }
}
