//! Reading and writing GEOB payloads in audio files

use anyhow::{bail, Context, Result};
use id3::frame::{Content, EncapsulatedObject};
use id3::{ErrorKind, Tag, TagLike, Version};
use serato_tags_core::constants::{GEOB_MIME_TYPE, MARKERS_VERSION};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Where a GEOB payload lives
pub enum GeobSource {
    /// File with an ID3 tag; `data` is `None` if the object is absent
    Tagged {
        /// The file's tag
        tag: Tag,
        /// Payload of the matching GEOB frame
        data: Option<Vec<u8>>,
    },
    /// Bare payload file starting with the markers version bytes
    Raw(Vec<u8>),
}

impl GeobSource {
    /// Open `path` and look up the GEOB object with the given description
    pub fn open(path: &Path, description: &str) -> Result<Self> {
        match Tag::read_from_path(path) {
            Ok(tag) => {
                let data = find_object(&tag, description).map(|obj| obj.data.clone());
                debug!(
                    "Read ID3 tag from {} (GEOB:{} present: {})",
                    path.display(),
                    description,
                    data.is_some()
                );
                Ok(GeobSource::Tagged { tag, data })
            }
            Err(e) if matches!(e.kind, ErrorKind::NoTag) => {
                let data = fs::read(path)
                    .with_context(|| format!("Failed to read input file: {}", path.display()))?;
                // Untagged audio must never be overwritten by a bare payload
                if !data.starts_with(&MARKERS_VERSION) {
                    bail!("File is missing \"GEOB:{}\" tag", description);
                }
                debug!("No ID3 tag in {}, reading raw payload", path.display());
                Ok(GeobSource::Raw(data))
            }
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read ID3 tag from {}", path.display())),
        }
    }

    /// Current payload, if any
    pub fn data(&self) -> Option<&[u8]> {
        match self {
            GeobSource::Tagged { data, .. } => data.as_deref(),
            GeobSource::Raw(data) => Some(data),
        }
    }

    /// Current payload, failing if the tag lacks the object
    pub fn require_data(&self, description: &str) -> Result<&[u8]> {
        self.data()
            .with_context(|| format!("File is missing \"GEOB:{}\" tag", description))
    }

    /// Replace the payload and write the file back
    pub fn store(self, path: &Path, description: &str, payload: &[u8]) -> Result<()> {
        match self {
            GeobSource::Tagged { mut tag, .. } => {
                // Keep every other GEOB object
                for frame in tag.remove("GEOB") {
                    let keep = match frame.content() {
                        Content::EncapsulatedObject(obj) => obj.description != description,
                        _ => true,
                    };
                    if keep {
                        let _ = tag.add_frame(frame);
                    }
                }

                let _ = tag.add_frame(EncapsulatedObject {
                    mime_type: GEOB_MIME_TYPE.to_string(),
                    filename: String::new(),
                    description: description.to_string(),
                    data: payload.to_vec(),
                });

                // ID3v2.2 cannot be written back
                let version = match tag.version() {
                    Version::Id3v22 => Version::Id3v23,
                    version => version,
                };
                tag.write_to_path(path, version)
                    .with_context(|| format!("Failed to write ID3 tag to {}", path.display()))?;
                info!("Wrote GEOB:{} ({} bytes) to {}", description, payload.len(), path.display());
            }
            GeobSource::Raw(_) => {
                fs::write(path, payload)
                    .with_context(|| format!("Failed to write output file: {}", path.display()))?;
                info!("Wrote {} bytes to {}", payload.len(), path.display());
            }
        }
        Ok(())
    }
}

fn find_object<'a>(tag: &'a Tag, description: &str) -> Option<&'a EncapsulatedObject> {
    tag.frames().find_map(|frame| match frame.content() {
        Content::EncapsulatedObject(obj) if obj.description == description => Some(obj),
        _ => None,
    })
}
