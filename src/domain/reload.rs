//! Detection of units whose loaded definition is stale

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::domain::session::Session;
use crate::errors::BusError;
use crate::systemd_client::ServiceManager;

/// Returns whether any non-ignored unit needs a daemon reload.
///
/// Only a failed listing is an error. A unit whose flag cannot be read is
/// assumed to need a reload.
pub async fn scan_needs_reload<M: ServiceManager>(
    session: &mut Session<M>,
    ignore: &HashSet<String>,
) -> Result<bool, BusError> {
    let listing = session.list_units().await?;

    let mut stale = Vec::new();
    for entry in listing {
        if ignore.contains(&entry.name) {
            continue;
        }

        let Some(unit) = session.unit(&entry.name, Some(&entry.object_path)).await else {
            stale.push(entry.name);
            continue;
        };

        match session.manager().need_daemon_reload(&unit).await {
            Ok(true) => stale.push(entry.name),
            Ok(false) => {}
            Err(err) => {
                warn!(
                    unit = %entry.name,
                    kind = err.kind(),
                    error = %err,
                    "failed to read NeedDaemonReload, assuming reload needed"
                );
                stale.push(entry.name);
            }
        }
    }

    if !stale.is_empty() {
        debug!(units = ?stale, "units need daemon reload");
    }
    Ok(!stale.is_empty())
}
