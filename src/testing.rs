//! Scripted in-memory service manager for unit tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::errors::BusError;
use crate::systemd_client::{ServiceManager, UnitListing};

#[derive(Debug, Clone)]
pub(crate) struct FakeUnit {
    name: String,
    active_state: String,
    sub_state: String,
    service_type: String,
    need_daemon_reload: bool,
    readable: bool,
}

impl FakeUnit {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            active_state: "active".to_string(),
            sub_state: "running".to_string(),
            service_type: "simple".to_string(),
            need_daemon_reload: false,
            readable: true,
        }
    }

    pub(crate) fn active_state(mut self, state: &str) -> Self {
        self.active_state = state.to_string();
        self
    }

    pub(crate) fn sub_state(mut self, state: &str) -> Self {
        self.sub_state = state.to_string();
        self
    }

    pub(crate) fn service_type(mut self, kind: &str) -> Self {
        self.service_type = kind.to_string();
        self
    }

    pub(crate) fn needs_reload(mut self) -> Self {
        self.need_daemon_reload = true;
        self
    }

    pub(crate) fn unreadable(mut self) -> Self {
        self.readable = false;
        self
    }

    fn object_path(&self) -> String {
        let escaped = self.name.replace('.', "_2e").replace('-', "_2d");
        format!("/org/freedesktop/systemd1/unit/{escaped}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FakeHandle {
    name: String,
    connection: usize,
    serial: usize,
}

#[derive(Default)]
pub(crate) struct FakeManager {
    units: Vec<FakeUnit>,
    connected: bool,
    connection: usize,
    connect_calls: usize,
    refuse_connect: bool,
    severed: AtomicBool,
    failing_listings: Vec<usize>,
    failing_reads: AtomicUsize,
    list_calls: AtomicUsize,
    load_calls: AtomicUsize,
    unit_at_calls: AtomicUsize,
    issued: AtomicUsize,
}

impl FakeManager {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_unit(mut self, unit: FakeUnit) -> Self {
        self.units.push(unit);
        self
    }

    pub(crate) fn failing_listings(mut self, calls: &[usize]) -> Self {
        self.failing_listings = calls.to_vec();
        self
    }

    pub(crate) fn failing_reads(self, count: usize) -> Self {
        self.failing_reads.store(count, Ordering::SeqCst);
        self
    }

    pub(crate) fn refusing_connect(mut self) -> Self {
        self.refuse_connect = true;
        self
    }

    pub(crate) fn sever(&self) {
        self.severed.store(true, Ordering::SeqCst);
    }

    pub(crate) fn connect_calls(&self) -> usize {
        self.connect_calls
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn unit_at_calls(&self) -> usize {
        self.unit_at_calls.load(Ordering::SeqCst)
    }

    fn check_connection(&self) -> Result<(), BusError> {
        if !self.connected {
            return Err(BusError::Disconnected);
        }
        if self.severed.load(Ordering::SeqCst) {
            return Err(BusError::transport("connection reset by peer"));
        }
        Ok(())
    }

    fn issue(&self, unit: &FakeUnit) -> FakeHandle {
        FakeHandle {
            name: unit.name.clone(),
            connection: self.connection,
            serial: self.issued.fetch_add(1, Ordering::SeqCst),
        }
    }

    fn readable_unit(&self, handle: &FakeHandle) -> Result<&FakeUnit, BusError> {
        self.check_connection()?;
        if handle.connection != self.connection {
            return Err(BusError::transport("handle belongs to a closed connection"));
        }

        let unit = self
            .units
            .iter()
            .find(|unit| unit.name == handle.name)
            .ok_or_else(|| BusError::not_found(handle.name.clone()))?;

        if !unit.readable {
            return Err(BusError::Remote(format!("cannot read {}", unit.name)));
        }

        let pending = self.failing_reads.load(Ordering::SeqCst);
        if pending > 0 {
            self.failing_reads.store(pending - 1, Ordering::SeqCst);
            return Err(BusError::transport("no reply"));
        }
        Ok(unit)
    }
}

#[async_trait]
impl ServiceManager for FakeManager {
    type Unit = FakeHandle;

    async fn connect(&mut self) -> Result<(), BusError> {
        self.connect_calls += 1;
        if self.refuse_connect {
            self.connected = false;
            return Err(BusError::transport("connection refused"));
        }

        self.connected = true;
        self.connection += 1;
        self.severed.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn list_units(&self) -> Result<Vec<UnitListing>, BusError> {
        let call = self.list_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.check_connection()?;

        if self.failing_listings.contains(&call) {
            return Err(BusError::transport("listing timed out"));
        }

        Ok(self
            .units
            .iter()
            .map(|unit| UnitListing {
                name: unit.name.clone(),
                object_path: unit.object_path(),
            })
            .collect())
    }

    async fn load_unit(&self, name: &str) -> Result<FakeHandle, BusError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        self.check_connection()?;

        self.units
            .iter()
            .find(|unit| unit.name == name)
            .map(|unit| self.issue(unit))
            .ok_or_else(|| BusError::not_found(name))
    }

    async fn unit_at(&self, object_path: &str) -> Result<FakeHandle, BusError> {
        self.unit_at_calls.fetch_add(1, Ordering::SeqCst);
        self.check_connection()?;

        self.units
            .iter()
            .find(|unit| unit.object_path() == object_path)
            .map(|unit| self.issue(unit))
            .ok_or_else(|| BusError::not_found(object_path))
    }

    async fn sub_state(&self, unit: &FakeHandle) -> Result<String, BusError> {
        Ok(self.readable_unit(unit)?.sub_state.clone())
    }

    async fn active_state(&self, unit: &FakeHandle) -> Result<String, BusError> {
        Ok(self.readable_unit(unit)?.active_state.clone())
    }

    async fn service_type(&self, unit: &FakeHandle) -> Result<String, BusError> {
        Ok(self.readable_unit(unit)?.service_type.clone())
    }

    async fn need_daemon_reload(&self, unit: &FakeHandle) -> Result<bool, BusError> {
        Ok(self.readable_unit(unit)?.need_daemon_reload)
    }
}
