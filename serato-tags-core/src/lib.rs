//! # Serato Tags Core
//!
//! Codecs for the binary payloads Serato DJ stores in GEOB frames and library files.
//!
//! ## Modules
//!
//! - `constants`: Format constants, type codes and field labels
//! - `types`: Core types (Field, FieldValue, Entry, Markers, Rgb)
//! - `primitives`: Big-endian integer, boolean and UTF-16BE text codecs
//! - `color`: 7-bit-safe color packing
//! - `database`: Tagged-field stream codec (database V2, crates)
//! - `markers`: Fixed-entry codec for `Serato Markers_`

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

pub mod color;
pub mod constants;
pub mod database;
pub mod error;
pub mod markers;
pub mod primitives;
pub mod types;

// Re-export commonly used types
pub use database::DecodeAnomaly;
pub use error::TagError;
pub use types::{ColorRecord, Entry, EntryType, Field, FieldName, FieldValue, MarkerRecord, Markers, Rgb};

/// Result type alias for Serato tag operations
pub type Result<T> = core::result::Result<T, TagError>;
