//! Compact, checksummed storage for AMM run results.
//!
//! A run report is mirrored into bitcode-encodable records, LZ4-compressed,
//! and prefixed with a fixed 28-byte header carrying an xxHash32 checksum.
//! Files are written with the write-rename pattern.

mod atomic_write;
mod codec;
pub mod error;
pub mod header;
mod plugin;
pub mod snapshot;
mod storage;


pub use codec::{decode_archive, encode_archive};
pub use error::ArchiveError;
pub use plugin::{archive_last_run, ArchivePlugin, ArchiveRunRequested, LastArchive};
pub use snapshot::{FailureRecord, RunArchive, SeriesRecord, SNAPSHOT_VERSION};
pub use storage::{load_archive, save_report};
