//! System-wide rollup of unit active states
//!
//! One failed unit poisons the whole system. Units matching an ignore pattern
//! never take part in the rollup.

use regex::RegexSet;
use tracing::{debug, warn};

use crate::domain::session::Session;
use crate::domain::state::{ActiveState, SystemState};
use crate::systemd_client::ServiceManager;

pub async fn aggregate_system_state<M: ServiceManager>(
    session: &mut Session<M>,
    ignore: &RegexSet,
) -> SystemState {
    let listing = match session.list_units().await {
        Ok(listing) => listing,
        Err(err) => {
            warn!(kind = err.kind(), error = %err, "failed to list units");
            return SystemState::Broken;
        }
    };

    let mut failed = Vec::new();
    let mut examined = 0_usize;

    for entry in listing {
        if ignore.is_match(&entry.name) {
            continue;
        }
        examined += 1;

        let Some(unit) = session.unit(&entry.name, Some(&entry.object_path)).await else {
            failed.push(entry.name);
            continue;
        };

        match session.manager().active_state(&unit).await {
            Ok(raw) => {
                if ActiveState::parse(&raw) == ActiveState::Failed {
                    failed.push(entry.name);
                }
            }
            Err(err) => {
                warn!(
                    unit = %entry.name,
                    kind = err.kind(),
                    error = %err,
                    "failed to read active state, counting unit as failed"
                );
                failed.push(entry.name);
            }
        }
    }

    if failed.is_empty() {
        debug!(examined, "no failed units");
        SystemState::Running
    } else {
        debug!(examined, failed = ?failed, "failed units found");
        SystemState::Broken
    }
}
