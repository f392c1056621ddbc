// ---------------------------------------------------------------------------
// ArchiveError: error types for storing and loading run archives
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors that can occur while writing or reading a run archive.
#[derive(Debug)]
pub enum ArchiveError {
    /// I/O error (file not found, permission denied, disk full, etc.)
    Io(std::io::Error),
    /// File does not start with the archive magic bytes.
    BadMagic,
    /// File is shorter than the fixed header.
    TooShort { len: usize },
    /// Archive header format is newer than this build supports.
    VersionMismatch { expected_max: u32, found: u32 },
    /// Payload checksum does not match the header.
    ChecksumMismatch { expected: u32, computed: u32 },
    /// LZ4 decompression failed.
    Decompress(String),
    /// Decompressed payload size differs from the header.
    SizeMismatch { expected: u32, found: usize },
    /// Bitcode decoding failed (corrupt or invalid payload).
    Decode(String),
    /// A stored timestamp cannot be represented.
    InvalidTimestamp(i64),
    /// A value is too large for its fixed-width archive field.
    FieldOverflow { field: &'static str, value: u64 },
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveError::Io(e) => write!(f, "I/O error: {e}"),
            ArchiveError::BadMagic => write!(f, "Not an AMM run archive (bad magic bytes)"),
            ArchiveError::TooShort { len } => write!(
                f,
                "Archive is too short ({len} bytes, need at least {} for header)",
                crate::header::HEADER_SIZE
            ),
            ArchiveError::VersionMismatch {
                expected_max,
                found,
            } => write!(
                f,
                "Version mismatch: archive is v{found}, but this build only supports up to v{expected_max}"
            ),
            ArchiveError::ChecksumMismatch { expected, computed } => write!(
                f,
                "Archive is corrupted: checksum mismatch (expected {expected:#010X}, got {computed:#010X})"
            ),
            ArchiveError::Decompress(msg) => write!(f, "Decompression error: {msg}"),
            ArchiveError::SizeMismatch { expected, found } => write!(
                f,
                "Archive payload is {found} bytes, header says {expected}"
            ),
            ArchiveError::Decode(msg) => write!(f, "Decoding error: {msg}"),
            ArchiveError::InvalidTimestamp(secs) => {
                write!(f, "Stored timestamp {secs} is out of range")
            }
            ArchiveError::FieldOverflow { field, value } => {
                write!(f, "{field} of {value} does not fit in the archive layout")
            }
        }
    }
}

impl std::error::Error for ArchiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArchiveError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ArchiveError {
    fn from(e: std::io::Error) -> Self {
        ArchiveError::Io(e)
    }
}

impl From<bitcode::Error> for ArchiveError {
    fn from(e: bitcode::Error) -> Self {
        ArchiveError::Decode(e.to_string())
    }
}

impl From<lz4_flex::block::DecompressError> for ArchiveError {
    fn from(e: lz4_flex::block::DecompressError) -> Self {
        ArchiveError::Decompress(e.to_string())
    }
}
