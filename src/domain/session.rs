//! Connection to the service manager together with the handles it produced
//!
//! `Session` is the only place that calls `ServiceManager::connect`, so the
//! handle cache is always emptied before a new connection is used.

use tracing::{debug, warn};

use crate::domain::cache::UnitCache;
use crate::domain::state::{ServiceType, SubState};
use crate::errors::BusError;
use crate::systemd_client::{ServiceManager, UnitListing};

pub struct Session<M: ServiceManager> {
    manager: M,
    units: UnitCache<M::Unit>,
}

impl<M: ServiceManager> Session<M> {
    pub fn new(manager: M) -> Self {
        Self {
            manager,
            units: UnitCache::new(),
        }
    }

    pub async fn connect(&mut self) -> Result<(), BusError> {
        self.units.invalidate();
        self.manager.connect().await
    }

    pub fn manager(&self) -> &M {
        &self.manager
    }

    pub fn generation(&self) -> u64 {
        self.units.generation()
    }

    pub fn cached_units(&self) -> usize {
        self.units.len()
    }

    pub async fn list_units(&self) -> Result<Vec<UnitListing>, BusError> {
        self.manager.list_units().await
    }

    /// Returns the handle for `name`, resolving it on first use.
    ///
    /// A `known_path` from a bulk listing skips the by-name lookup. `None`
    /// means the unit is unreachable; the failure has already been logged.
    pub async fn unit(&mut self, name: &str, known_path: Option<&str>) -> Option<M::Unit> {
        if let Some(unit) = self.units.get(name) {
            return Some(unit);
        }

        let resolved = match known_path {
            Some(path) => self.manager.unit_at(path).await,
            None => self.manager.load_unit(name).await,
        };

        match resolved {
            Ok(unit) => Some(self.units.insert(name, unit)),
            Err(err) => {
                warn!(unit = %name, kind = err.kind(), error = %err, "failed to monitor unit");
                None
            }
        }
    }

    pub async fn sub_state(&mut self, name: &str) -> SubState {
        let Some(unit) = self.unit(name, None).await else {
            return SubState::Broken;
        };

        match self.manager.sub_state(&unit).await {
            Ok(raw) => SubState::parse(&raw),
            Err(err) => {
                debug!(unit = %name, kind = err.kind(), error = %err, "failed to read sub-state");
                SubState::Broken
            }
        }
    }

    pub async fn service_type(&mut self, name: &str) -> ServiceType {
        let Some(unit) = self.unit(name, None).await else {
            return ServiceType::Broken;
        };

        match self.manager.service_type(&unit).await {
            Ok(raw) => ServiceType::parse(&raw),
            Err(err) => {
                debug!(unit = %name, kind = err.kind(), error = %err, "failed to read service type");
                ServiceType::Broken
            }
        }
    }
}
