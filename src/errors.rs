use thiserror::Error;

const NO_SUCH_UNIT: &str = "org.freedesktop.systemd1.NoSuchUnit";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BusError {
    #[error("not connected to the service manager")]
    Disconnected,
    #[error("bus transport failure: {0}")]
    Transport(String),
    #[error("unit not found: {0}")]
    NotFound(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("unexpected reply: {0}")]
    Protocol(String),
    #[error("remote call failed: {0}")]
    Remote(String),
}

impl BusError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Disconnected | Self::Transport(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Disconnected | Self::Transport(_) => "transport",
            Self::NotFound(_) => "not_found",
            Self::PermissionDenied(_) => "permission",
            Self::Protocol(_) => "protocol",
            Self::Remote(_) => "remote",
        }
    }

    fn from_error_name(name: &str, detail: String) -> Self {
        match name {
            NO_SUCH_UNIT
            | "org.freedesktop.DBus.Error.UnknownObject"
            | "org.freedesktop.DBus.Error.UnknownProperty"
            | "org.freedesktop.DBus.Error.UnknownInterface" => Self::NotFound(detail),
            "org.freedesktop.DBus.Error.AccessDenied"
            | "org.freedesktop.DBus.Error.AuthFailed"
            | "org.freedesktop.DBus.Error.InteractiveAuthorizationRequired" => {
                Self::PermissionDenied(detail)
            }
            "org.freedesktop.DBus.Error.NoReply"
            | "org.freedesktop.DBus.Error.Disconnected"
            | "org.freedesktop.DBus.Error.Timeout"
            | "org.freedesktop.DBus.Error.TimedOut"
            | "org.freedesktop.DBus.Error.NoServer"
            | "org.freedesktop.DBus.Error.ServiceUnknown" => Self::Transport(detail),
            _ => Self::Remote(format!("{name}: {detail}")),
        }
    }
}

impl From<zbus::Error> for BusError {
    fn from(err: zbus::Error) -> Self {
        match err {
            zbus::Error::MethodError(name, detail, _) => {
                Self::from_error_name(name.as_str(), detail.unwrap_or_default())
            }
            zbus::Error::FDO(fdo) => Self::from(*fdo),
            zbus::Error::InputOutput(io) => Self::Transport(io.to_string()),
            zbus::Error::Variant(variant) => Self::Protocol(variant.to_string()),
            other => Self::Transport(other.to_string()),
        }
    }
}

impl From<zbus::fdo::Error> for BusError {
    fn from(err: zbus::fdo::Error) -> Self {
        use zbus::fdo::Error as Fdo;

        match err {
            Fdo::ZBus(inner) => Self::from(inner),
            Fdo::UnknownObject(detail)
            | Fdo::UnknownProperty(detail)
            | Fdo::UnknownInterface(detail) => Self::NotFound(detail),
            Fdo::AccessDenied(detail) | Fdo::AuthFailed(detail) => Self::PermissionDenied(detail),
            Fdo::NoReply(detail)
            | Fdo::Disconnected(detail)
            | Fdo::Timeout(detail)
            | Fdo::IOError(detail)
            | Fdo::NoServer(detail)
            | Fdo::ServiceUnknown(detail) => Self::Transport(detail),
            other => Self::Remote(other.to_string()),
        }
    }
}

impl From<zbus::zvariant::Error> for BusError {
    fn from(err: zbus::zvariant::Error) -> Self {
        Self::Protocol(err.to_string())
    }
}
