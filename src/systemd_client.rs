use async_trait::async_trait;
use zbus::{
    fdo::PropertiesProxy,
    names::InterfaceName,
    zvariant::{OwnedObjectPath, OwnedValue},
    Connection, Proxy,
};

use crate::errors::BusError;

const SYSTEMD_DESTINATION: &str = "org.freedesktop.systemd1";
const SYSTEMD_PATH: &str = "/org/freedesktop/systemd1";
const MANAGER_INTERFACE: &str = "org.freedesktop.systemd1.Manager";
const UNIT_INTERFACE: &str = "org.freedesktop.systemd1.Unit";
const SERVICE_INTERFACE: &str = "org.freedesktop.systemd1.Service";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitListing {
    pub name: String,
    pub object_path: String,
}

type ListUnitRecord = (
    String,
    String,
    String,
    String,
    String,
    String,
    OwnedObjectPath,
    u32,
    String,
    OwnedObjectPath,
);

/// `Unit` is a resolved handle to one remote unit object. A handle is only
/// valid for the connection that produced it; after `connect` every
/// previously returned handle must be discarded.
#[async_trait]
pub trait ServiceManager: Send + Sync {
    type Unit: Clone + Send + Sync;

    async fn connect(&mut self) -> Result<(), BusError>;

    async fn list_units(&self) -> Result<Vec<UnitListing>, BusError>;

    async fn load_unit(&self, name: &str) -> Result<Self::Unit, BusError>;

    async fn unit_at(&self, object_path: &str) -> Result<Self::Unit, BusError>;

    async fn sub_state(&self, unit: &Self::Unit) -> Result<String, BusError>;

    async fn active_state(&self, unit: &Self::Unit) -> Result<String, BusError>;

    async fn service_type(&self, unit: &Self::Unit) -> Result<String, BusError>;

    async fn need_daemon_reload(&self, unit: &Self::Unit) -> Result<bool, BusError>;
}

struct Bus {
    connection: Connection,
    manager: Proxy<'static>,
}

#[derive(Default)]
pub struct DbusServiceManager {
    bus: Option<Bus>,
}

#[derive(Clone)]
pub struct DbusUnit {
    properties: PropertiesProxy<'static>,
}

impl DbusServiceManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn bus(&self) -> Result<&Bus, BusError> {
        self.bus.as_ref().ok_or(BusError::Disconnected)
    }

    async fn unit_proxy(&self, path: OwnedObjectPath) -> Result<DbusUnit, BusError> {
        let bus = self.bus()?;
        let properties = PropertiesProxy::builder(&bus.connection)
            .destination(SYSTEMD_DESTINATION)?
            .path(path.into_inner())?
            .build()
            .await?;

        Ok(DbusUnit { properties })
    }
}

impl DbusUnit {
    async fn get(&self, interface: &'static str, property: &str) -> Result<OwnedValue, BusError> {
        let value = self
            .properties
            .get(InterfaceName::from_static_str_unchecked(interface), property)
            .await?;
        Ok(value)
    }

    async fn get_string(&self, interface: &'static str, property: &str) -> Result<String, BusError> {
        let value = self.get(interface, property).await?;
        Ok(String::try_from(value)?)
    }
}

#[async_trait]
impl ServiceManager for DbusServiceManager {
    type Unit = DbusUnit;

    async fn connect(&mut self) -> Result<(), BusError> {
        self.bus = None;

        let connection = Connection::system().await?;
        let manager = Proxy::new(
            &connection,
            SYSTEMD_DESTINATION,
            SYSTEMD_PATH,
            MANAGER_INTERFACE,
        )
        .await?;

        self.bus = Some(Bus {
            connection,
            manager,
        });
        Ok(())
    }

    async fn list_units(&self) -> Result<Vec<UnitListing>, BusError> {
        let rows: Vec<ListUnitRecord> = self.bus()?.manager.call("ListUnits", &()).await?;
        Ok(rows.into_iter().map(listing_from_record).collect())
    }

    async fn load_unit(&self, name: &str) -> Result<DbusUnit, BusError> {
        let path: OwnedObjectPath = self.bus()?.manager.call("LoadUnit", &(name,)).await?;
        self.unit_proxy(path).await
    }

    async fn unit_at(&self, object_path: &str) -> Result<DbusUnit, BusError> {
        let path = OwnedObjectPath::try_from(object_path.to_string())?;
        self.unit_proxy(path).await
    }

    async fn sub_state(&self, unit: &DbusUnit) -> Result<String, BusError> {
        unit.get_string(UNIT_INTERFACE, "SubState").await
    }

    async fn active_state(&self, unit: &DbusUnit) -> Result<String, BusError> {
        unit.get_string(UNIT_INTERFACE, "ActiveState").await
    }

    async fn service_type(&self, unit: &DbusUnit) -> Result<String, BusError> {
        unit.get_string(SERVICE_INTERFACE, "Type").await
    }

    async fn need_daemon_reload(&self, unit: &DbusUnit) -> Result<bool, BusError> {
        let value = unit.get(UNIT_INTERFACE, "NeedDaemonReload").await?;
        Ok(bool::try_from(value)?)
    }
}

fn listing_from_record(record: ListUnitRecord) -> UnitListing {
    let (
        name,
        _description,
        _load_state,
        _active_state,
        _sub_state,
        _following,
        unit_path,
        _job_id,
        _job_type,
        _job_path,
    ) = record;

    UnitListing {
        name,
        object_path: unit_path.as_str().to_string(),
    }
}
