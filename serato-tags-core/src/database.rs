//! Tagged-field stream codec (database V2 and crate files)
//!
//! A stream is a sequence of `[name: 4 ASCII bytes][length: u32 BE][payload]`
//! records running to the end of the input. The payload type is chosen by the
//! first character of the name (see [`TypeCode`]); `o` and `r` payloads are
//! themselves field streams.

use crate::constants::{TypeCode, FIELD_HEADER_SIZE, MAX_NESTING_DEPTH};
use crate::error::TagError;
use crate::primitives::{
    decode_bool, decode_u16be, decode_u32be, decode_utf16be, encode_bool, encode_u16be,
    encode_u32be, encode_utf16be,
};
use crate::types::{Field, FieldName, FieldValue};
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use bytes::{Buf, BufMut, Bytes, BytesMut};

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// A text payload that could not be decoded and was kept as raw bytes
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeAnomaly {
    /// Slash-separated path of the field, e.g. `otrk/tsng`
    pub path: String,

    /// Payload length in bytes
    pub length: u32,

    /// Why decoding failed
    pub error: TagError,
}

/// Lazy reader over a tagged-field stream
///
/// Yields one decoded [`Field`] per record. After the first error the reader
/// is fused and yields `None`.
pub struct FieldReader<'a> {
    remaining: &'a [u8],
    depth: usize,
    parent: Option<String>,
    anomalies: Vec<DecodeAnomaly>,
    failed: bool,
}

impl<'a> FieldReader<'a> {
    /// Create a reader over a top-level field stream
    pub fn new(data: &'a [u8]) -> Self {
        Self::nested(data, 0, None)
    }

    fn nested(data: &'a [u8], depth: usize, parent: Option<String>) -> Self {
        Self {
            remaining: data,
            depth,
            parent,
            anomalies: Vec::new(),
            failed: false,
        }
    }

    /// Text decode failures seen so far, including those in nested streams
    pub fn anomalies(&self) -> &[DecodeAnomaly] {
        &self.anomalies
    }

    /// Consume the reader, returning its anomalies
    pub fn into_anomalies(self) -> Vec<DecodeAnomaly> {
        self.anomalies
    }

    fn path_of(&self, name: &FieldName) -> String {
        match &self.parent {
            Some(parent) => format!("{}/{}", parent, name),
            None => name.to_string(),
        }
    }

    fn read_field(&mut self) -> Result<Field, TagError> {
        if self.remaining.len() < FIELD_HEADER_SIZE {
            return Err(TagError::truncated(FIELD_HEADER_SIZE, self.remaining.len()));
        }

        let mut name = [0u8; 4];
        self.remaining.copy_to_slice(&mut name);
        let length = self.remaining.get_u32();
        let name = FieldName::new(name)?;

        let payload_len = length as usize;
        if self.remaining.len() < payload_len {
            return Err(TagError::truncated(payload_len, self.remaining.len()));
        }
        let (payload, rest) = self.remaining.split_at(payload_len);
        self.remaining = rest;

        let value = self.decode_value(&name, length, payload)?;

        Ok(Field {
            name,
            length,
            value,
        })
    }

    fn decode_value(
        &mut self,
        name: &FieldName,
        length: u32,
        payload: &[u8],
    ) -> Result<FieldValue, TagError> {
        let type_code = name.type_code();
        if let Some(width) = type_code.width() {
            if payload.len() > width {
                return Err(TagError::UnexpectedWidth {
                    field: self.path_of(name),
                    expected: width,
                    actual: payload.len(),
                });
            }
        }

        let value = match type_code {
            TypeCode::Bool => FieldValue::Bool(decode_bool(payload)?),
            TypeCode::U16 => FieldValue::U16(decode_u16be(payload)?),
            TypeCode::U32 => FieldValue::U32(decode_u32be(payload)?),
            TypeCode::Raw => FieldValue::Bytes(payload.to_vec()),
            TypeCode::Text => match decode_utf16be(payload) {
                Ok(text) => FieldValue::Text(text),
                Err(error @ TagError::InvalidUtf16 { .. }) => {
                    let path = self.path_of(name);

                    #[cfg(feature = "logging")]
                    warn!("Unable to parse data: ({}, {} bytes): {:?}", path, length, error);

                    self.anomalies.push(DecodeAnomaly {
                        path,
                        length,
                        error,
                    });
                    FieldValue::Bytes(payload.to_vec())
                }
                Err(e) => return Err(e),
            },
            TypeCode::Nested => {
                let depth = self.depth + 1;
                if depth > MAX_NESTING_DEPTH {
                    return Err(TagError::NestingTooDeep(MAX_NESTING_DEPTH));
                }
                let mut children = FieldReader::nested(payload, depth, Some(self.path_of(name)));
                let fields = children.by_ref().collect::<Result<Vec<_>, _>>()?;
                self.anomalies.append(&mut children.anomalies);
                FieldValue::Nested(fields)
            }
        };

        Ok(value)
    }
}

impl Iterator for FieldReader<'_> {
    type Item = Result<Field, TagError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining.is_empty() {
            return None;
        }

        let result = self.read_field();
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

/// Parse a field stream lazily
pub fn parse(data: &[u8]) -> FieldReader<'_> {
    FieldReader::new(data)
}

/// Decode a whole field stream, discarding anomaly diagnostics
pub fn decode(data: &[u8]) -> Result<Vec<Field>, TagError> {
    decode_with_diagnostics(data).map(|(fields, _)| fields)
}

/// Decode a whole field stream, returning text decode anomalies alongside the fields
pub fn decode_with_diagnostics(data: &[u8]) -> Result<(Vec<Field>, Vec<DecodeAnomaly>), TagError> {
    #[cfg(feature = "logging")]
    debug!("Decoding field stream of {} bytes", data.len());

    let mut reader = parse(data);
    let fields = reader.by_ref().collect::<Result<Vec<_>, _>>()?;
    let anomalies = reader.into_anomalies();

    #[cfg(feature = "logging")]
    debug!(
        "Decoded {} top-level fields ({} anomalies)",
        fields.len(),
        anomalies.len()
    );

    Ok((fields, anomalies))
}

/// Encode fields into a stream
///
/// Each field's `length` is ignored and recomputed from the encoded payload.
/// A [`FieldValue::Bytes`] value is written verbatim for any type code; for
/// nested types it must itself be a well-formed field stream.
pub fn encode(fields: &[Field]) -> Result<Bytes, TagError> {
    let mut buf = BytesMut::with_capacity(fields.iter().map(encoded_size).sum());
    encode_into(fields, 0, &mut buf)?;
    Ok(buf.freeze())
}

fn encoded_size(field: &Field) -> usize {
    FIELD_HEADER_SIZE + field.value.encoded_len()
}

fn encode_into(fields: &[Field], depth: usize, buf: &mut BytesMut) -> Result<(), TagError> {
    for field in fields {
        let payload = encode_value(field, depth)?;
        let length =
            u32::try_from(payload.len()).map_err(|_| TagError::PayloadTooLarge(payload.len()))?;

        buf.put_slice(field.name.as_bytes());
        buf.put_u32(length);
        buf.put_slice(&payload);
    }
    Ok(())
}

fn encode_value(field: &Field, depth: usize) -> Result<BytesMut, TagError> {
    let type_code = field.name.type_code();
    let mut payload = BytesMut::with_capacity(field.value.encoded_len());

    match (type_code, &field.value) {
        (TypeCode::Nested, FieldValue::Bytes(raw)) => {
            let mut children = FieldReader::nested(raw, depth + 1, Some(field.name.to_string()));
            if let Some(err) = children.by_ref().find_map(Result::err) {
                return Err(err);
            }
            payload.put_slice(raw);
        }
        (_, FieldValue::Bytes(raw)) => payload.put_slice(raw),
        (TypeCode::Bool, FieldValue::Bool(value)) => payload.put_slice(&encode_bool(*value)),
        (TypeCode::U16, FieldValue::U16(value)) => payload.put_slice(&encode_u16be(*value)),
        (TypeCode::U32, FieldValue::U32(value)) => payload.put_slice(&encode_u32be(*value)),
        (TypeCode::Text, FieldValue::Text(text)) => payload.put_slice(&encode_utf16be(text)),
        (TypeCode::Nested, FieldValue::Nested(children)) => {
            if depth + 1 > MAX_NESTING_DEPTH {
                return Err(TagError::NestingTooDeep(MAX_NESTING_DEPTH));
            }
            encode_into(children, depth + 1, &mut payload)?;
        }
        (expected, _) => {
            return Err(TagError::ValueMismatch {
                field: field.name.to_string(),
                expected,
            })
        }
    }

    Ok(payload)
}
