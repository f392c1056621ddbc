use std::path::Path;

use amm::RunReport;

use crate::atomic_write::atomic_write;
use crate::codec::{decode_archive, encode_archive};
use crate::error::ArchiveError;
use crate::snapshot::RunArchive;

/// Compress and atomically write `report` to `path`. Returns the number of
/// bytes written.
pub fn save_report(path: &Path, report: &RunReport) -> Result<usize, ArchiveError> {
    let bytes = encode_archive(&RunArchive::from_report(report)?, true)?;
    atomic_write(path, &bytes)?;
    Ok(bytes.len())
}

/// Read and verify an archive from `path`.
pub fn load_archive(path: &Path) -> Result<RunArchive, ArchiveError> {
    let bytes = std::fs::read(path)?;
    decode_archive(&bytes)
}
