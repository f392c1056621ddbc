// ---------------------------------------------------------------------------
// header – run archive header with magic bytes, version, and checksum
// ---------------------------------------------------------------------------
//
// Header format (28 bytes, fixed-size, little-endian):
//   [0..4]   Magic bytes: "AMMR"
//   [4..8]   Format version (u32)
//   [8..12]  Flags (u32: bit 0 = LZ4 compressed)
//   [12..20] Timestamp the archive was written (Unix epoch, u64)
//   [20..24] Uncompressed payload size (u32)
//   [24..28] xxHash32 checksum of the stored payload (everything after the header)

use xxhash_rust::xxh32::xxh32;

use crate::error::ArchiveError;

/// Magic bytes identifying an AMM run archive.
pub const MAGIC: [u8; 4] = *b"AMMR";

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 28;

/// Current header layout version.
pub const HEADER_FORMAT_VERSION: u32 = 1;

/// Payload is LZ4 block-compressed with its size prepended.
pub const FLAG_COMPRESSED: u32 = 1;

const XXHASH_SEED: u32 = 0;

/// Parsed archive header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveHeader {
    pub format_version: u32,
    pub flags: u32,
    pub timestamp: u64,
    pub uncompressed_size: u32,
    pub checksum: u32,
}

impl ArchiveHeader {
    /// Header for a stored `payload` that expands to `uncompressed_size` bytes.
    pub fn new(payload: &[u8], uncompressed_size: usize, flags: u32) -> Result<Self, ArchiveError> {
        let uncompressed_size =
            u32::try_from(uncompressed_size).map_err(|_| ArchiveError::FieldOverflow {
                field: "uncompressed payload size",
                value: uncompressed_size as u64,
            })?;
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Ok(Self {
            format_version: HEADER_FORMAT_VERSION,
            flags,
            timestamp,
            uncompressed_size,
            checksum: xxh32(payload, XXHASH_SEED),
        })
    }

    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&self.format_version.to_le_bytes());
        out.extend_from_slice(&self.flags.to_le_bytes());
        out.extend_from_slice(&self.timestamp.to_le_bytes());
        out.extend_from_slice(&self.uncompressed_size.to_le_bytes());
        out.extend_from_slice(&self.checksum.to_le_bytes());
    }
}

/// Prefix `payload` with a header.
///
/// Returns bytes: [header (28 bytes)] ++ [payload].
pub fn wrap_with_header(
    payload: &[u8],
    uncompressed_size: usize,
    flags: u32,
) -> Result<Vec<u8>, ArchiveError> {
    let header = ArchiveHeader::new(payload, uncompressed_size, flags)?;
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    header.write_to(&mut out);
    out.extend_from_slice(payload);
    Ok(out)
}

fn le_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Parse and verify the header, returning it with the stored payload.
pub fn unwrap_header(bytes: &[u8]) -> Result<(ArchiveHeader, &[u8]), ArchiveError> {
    if bytes.len() < 4 || bytes[..4] != MAGIC {
        return Err(ArchiveError::BadMagic);
    }
    if bytes.len() < HEADER_SIZE {
        return Err(ArchiveError::TooShort { len: bytes.len() });
    }

    let format_version = le_u32(bytes, 4);
    if format_version > HEADER_FORMAT_VERSION {
        return Err(ArchiveError::VersionMismatch {
            expected_max: HEADER_FORMAT_VERSION,
            found: format_version,
        });
    }

    let mut timestamp = [0u8; 8];
    timestamp.copy_from_slice(&bytes[12..20]);
    let header = ArchiveHeader {
        format_version,
        flags: le_u32(bytes, 8),
        timestamp: u64::from_le_bytes(timestamp),
        uncompressed_size: le_u32(bytes, 20),
        checksum: le_u32(bytes, 24),
    };

    let payload = &bytes[HEADER_SIZE..];
    let computed = xxh32(payload, XXHASH_SEED);
    if computed != header.checksum {
        return Err(ArchiveError::ChecksumMismatch {
            expected: header.checksum,
            computed,
        });
    }

    Ok((header, payload))
}
