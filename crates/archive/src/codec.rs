//! Bytes in, bytes out: bitcode, then LZ4, then the header.

use crate::error::ArchiveError;
use crate::header::{unwrap_header, wrap_with_header, FLAG_COMPRESSED};
use crate::snapshot::{RunArchive, SNAPSHOT_VERSION};

/// Encode an archive. `compress` selects LZ4 block compression.
pub fn encode_archive(archive: &RunArchive, compress: bool) -> Result<Vec<u8>, ArchiveError> {
    let encoded = bitcode::encode(archive);
    if compress {
        let compressed = lz4_flex::compress_prepend_size(&encoded);
        wrap_with_header(&compressed, encoded.len(), FLAG_COMPRESSED)
    } else {
        wrap_with_header(&encoded, encoded.len(), 0)
    }
}

/// Verify and decode archive bytes.
pub fn decode_archive(bytes: &[u8]) -> Result<RunArchive, ArchiveError> {
    let (header, payload) = unwrap_header(bytes)?;
    let decompressed;
    let encoded = if header.is_compressed() {
        decompressed = lz4_flex::decompress_size_prepended(payload)?;
        decompressed.as_slice()
    } else {
        payload
    };
    if encoded.len() != header.uncompressed_size as usize {
        return Err(ArchiveError::SizeMismatch {
            expected: header.uncompressed_size,
            found: encoded.len(),
        });
    }
    let archive: RunArchive = bitcode::decode(encoded)?;
    if archive.version > SNAPSHOT_VERSION {
        return Err(ArchiveError::VersionMismatch {
            expected_max: SNAPSHOT_VERSION,
            found: archive.version,
        });
    }
    Ok(archive)
}
