use std::path::PathBuf;

use bevy::prelude::*;

use amm::plugin::LastRunReport;

use crate::storage::save_report;

/// Write the most recent run report to `path`.
#[derive(Event, Debug, Clone)]
pub struct ArchiveRunRequested {
    pub path: PathBuf,
}

/// Outcome of the most recent archive request.
#[derive(Resource, Debug, Clone, Default)]
pub struct LastArchive {
    pub path: Option<PathBuf>,
    pub bytes_written: usize,
    pub error: Option<String>,
}

pub fn archive_last_run(
    mut requests: EventReader<ArchiveRunRequested>,
    last_run: Res<LastRunReport>,
    mut last_archive: ResMut<LastArchive>,
) {
    for request in requests.read() {
        let Some(report) = last_run.report.as_ref() else {
            warn!(
                "Archive of {} requested before any completed run",
                request.path.display()
            );
            last_archive.path = None;
            last_archive.bytes_written = 0;
            last_archive.error = Some("no completed run".to_string());
            continue;
        };
        match save_report(&request.path, report) {
            Ok(bytes) => {
                info!(
                    "Archived {} series to {} ({} bytes)",
                    report.delivered.len(),
                    request.path.display(),
                    bytes
                );
                last_archive.path = Some(request.path.clone());
                last_archive.bytes_written = bytes;
                last_archive.error = None;
            }
            Err(e) => {
                warn!("Failed to archive run to {}: {}", request.path.display(), e);
                last_archive.path = None;
                last_archive.bytes_written = 0;
                last_archive.error = Some(e.to_string());
            }
        }
    }
}

/// Requires `AmmPlugin` for `LastRunReport`.
pub struct ArchivePlugin;

impl Plugin for ArchivePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LastArchive>()
            .add_event::<ArchiveRunRequested>()
            .add_systems(
                Update,
                archive_last_run.after(amm::plugin::run_moisture_accounting),
            );
    }
}
