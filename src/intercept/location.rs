//! Checksum-based interceptable locations.
//!
//! A version-1 location encodes the first 16 bytes of the file's content
//! hash followed by the byte offset of the invoked name as a
//! little-endian `u32`, base64-encoded. Unlike path/line/character
//! declarations, the encoding survives file moves and whitespace edits
//! elsewhere in the file.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::diagnostics::{FileId, SourceFile, SourceFiles};
use crate::tokens::Token;

const LOCATION_VERSION: i32 = 1;
const HASH_PREFIX_LEN: usize = 16;
const PAYLOAD_LEN: usize = HASH_PREFIX_LEN + 4;

/// Opaque, durable address of an interceptable call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterceptableLocation {
    data: String,
    display: String,
}

impl InterceptableLocation {
    #[must_use]
    pub fn version(&self) -> i32 {
        LOCATION_VERSION
    }

    /// The base64 payload carried by a checksum declaration.
    #[must_use]
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Human-readable rendering, `file(line,column)`.
    #[must_use]
    pub fn display(&self) -> &str {
        &self.display
    }

    /// The source annotation a generator would paste above its
    /// interceptor method.
    #[must_use]
    pub fn attribute_syntax(&self) -> String {
        format!("@intercepts({}, \"{}\")", LOCATION_VERSION, self.data)
    }
}

impl fmt::Display for InterceptableLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

/// Why a checksum payload failed to resolve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChecksumError {
    UnsupportedVersion { version: i32 },
    MalformedPayload,
    NoMatchingFile,
}

impl fmt::Display for ChecksumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecksumError::UnsupportedVersion { version } => {
                write!(f, "interception location version {version} is not supported")
            }
            ChecksumError::MalformedPayload => {
                write!(f, "interception location data is malformed")
            }
            ChecksumError::NoMatchingFile => write!(
                f,
                "interception location does not match any file in the compilation"
            ),
        }
    }
}

/// Encode the durable location of a located name token.
///
/// Returns `None` for files larger than a `u32` offset can address.
#[must_use]
pub fn interceptable_location(
    files: &SourceFiles,
    file_id: FileId,
    token: &Token,
) -> Option<InterceptableLocation> {
    let file = files.get(file_id)?;
    let offset = u32::try_from(token.span.start).ok()?;

    let mut payload = [0_u8; PAYLOAD_LEN];
    payload[..HASH_PREFIX_LEN].copy_from_slice(&file.content_hash()[..HASH_PREFIX_LEN]);
    payload[HASH_PREFIX_LEN..].copy_from_slice(&offset.to_le_bytes());

    let position = file.line_col(token.span.start)?;
    Some(InterceptableLocation {
        data: STANDARD.encode(payload),
        display: format!("{}({},{})", file.file_name(), position.line, position.column),
    })
}

/// Decode a checksum declaration back to a file and byte offset.
///
/// # Errors
///
/// Returns a [`ChecksumError`] for unsupported versions, undecodable
/// payloads, and hashes that match no file (or, degenerately, more than
/// one) in the compilation.
pub fn resolve_checksum(
    files: &SourceFiles,
    version: i32,
    data: &str,
) -> Result<(FileId, usize), ChecksumError> {
    if version != LOCATION_VERSION {
        return Err(ChecksumError::UnsupportedVersion { version });
    }
    let payload = STANDARD
        .decode(data)
        .map_err(|_| ChecksumError::MalformedPayload)?;
    if payload.len() != PAYLOAD_LEN {
        return Err(ChecksumError::MalformedPayload);
    }
    let prefix = &payload[..HASH_PREFIX_LEN];
    let offset_bytes: [u8; 4] = payload[HASH_PREFIX_LEN..]
        .try_into()
        .map_err(|_| ChecksumError::MalformedPayload)?;
    let offset = usize::try_from(u32::from_le_bytes(offset_bytes))
        .map_err(|_| ChecksumError::MalformedPayload)?;

    let matches: Vec<&SourceFile> = files
        .iter()
        .filter(|file| &file.content_hash()[..HASH_PREFIX_LEN] == prefix)
        .collect();
    // A hash-prefix shared by two distinct files is adversarial input;
    // picking either would be wrong, so neither is.
    match matches.as_slice() {
        [single] => Ok((single.id, offset)),
        _ => Err(ChecksumError::NoMatchingFile),
    }
}
