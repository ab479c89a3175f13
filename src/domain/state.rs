//! Classification of raw unit and manager states into health signals
//!
//! Every raw string reported by the service manager is parsed into a closed
//! enumeration with an explicit `Other` variant. `Broken` is never parsed from
//! manager output; it is synthesized locally when a state could not be read.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubState {
    Running,
    Reload,
    Start,
    AutoRestart,
    Dead,
    Exited,
    Failed,
    Other(String),
    Broken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveState {
    Active,
    Reloading,
    Inactive,
    Failed,
    Activating,
    Deactivating,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceType {
    Simple,
    Exec,
    Forking,
    Oneshot,
    Dbus,
    Notify,
    Idle,
    Other(String),
    Broken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemState {
    Running,
    Degraded,
    Other(String),
    Broken,
}

impl SubState {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "running" => Self::Running,
            "reload" => Self::Reload,
            "start" => Self::Start,
            "auto-restart" => Self::AutoRestart,
            "dead" => Self::Dead,
            "exited" => Self::Exited,
            "failed" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_broken(&self) -> bool {
        matches!(self, Self::Broken)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Running => "running",
            Self::Reload => "reload",
            Self::Start => "start",
            Self::AutoRestart => "auto-restart",
            Self::Dead => "dead",
            Self::Exited => "exited",
            Self::Failed => "failed",
            Self::Other(raw) => raw,
            Self::Broken => "broken",
        }
    }
}

impl ActiveState {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "active" => Self::Active,
            "reloading" => Self::Reloading,
            "inactive" => Self::Inactive,
            "failed" => Self::Failed,
            "activating" => Self::Activating,
            "deactivating" => Self::Deactivating,
            other => Self::Other(other.to_string()),
        }
    }
}

impl ServiceType {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "simple" => Self::Simple,
            "exec" => Self::Exec,
            "forking" => Self::Forking,
            "oneshot" => Self::Oneshot,
            "dbus" => Self::Dbus,
            "notify" => Self::Notify,
            "idle" => Self::Idle,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Simple => "simple",
            Self::Exec => "exec",
            Self::Forking => "forking",
            Self::Oneshot => "oneshot",
            Self::Dbus => "dbus",
            Self::Notify => "notify",
            Self::Idle => "idle",
            Self::Other(raw) => raw,
            Self::Broken => "broken",
        }
    }
}

impl SystemState {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "running" => Self::Running,
            "degraded" => Self::Degraded,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_broken(&self) -> bool {
        matches!(self, Self::Broken)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Running => "running",
            Self::Degraded => "degraded",
            Self::Other(raw) => raw,
            Self::Broken => "broken",
        }
    }
}

impl fmt::Display for SubState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SystemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health gauge of a single service: 1.0 when it is up or mid-transition
/// towards up, or when it is a one-shot unit that already ran to completion.
pub fn service_health(sub_state: &SubState, service_type: &ServiceType) -> f64 {
    let healthy = match sub_state {
        SubState::Running | SubState::Reload | SubState::Start | SubState::AutoRestart => true,
        SubState::Dead => matches!(service_type, ServiceType::Oneshot),
        SubState::Exited | SubState::Failed | SubState::Other(_) | SubState::Broken => false,
    };

    if healthy {
        1.0
    } else {
        0.0
    }
}

pub fn system_health(state: &SystemState) -> bool {
    match state {
        SystemState::Broken | SystemState::Degraded => false,
        SystemState::Running | SystemState::Other(_) => true,
    }
}
