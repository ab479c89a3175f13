//! Health samples and the sinks that receive them

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;

pub const PLUGIN_NAME: &str = "systemd";
pub const SERVICE_TYPE_INSTANCE: &str = "running";
pub const SYSTEM_STATE_INSTANCE: &str = "systemd_state";
pub const NEED_RELOAD_TYPE_INSTANCE: &str = "needreload";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Gauge,
    Boolean,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HealthSample {
    pub kind: MetricKind,
    pub plugin: &'static str,
    pub plugin_instance: String,
    pub type_instance: &'static str,
    pub value: f64,
}

impl HealthSample {
    pub fn service(service: &str, value: f64) -> Self {
        Self {
            kind: MetricKind::Gauge,
            plugin: PLUGIN_NAME,
            plugin_instance: service.to_string(),
            type_instance: SERVICE_TYPE_INSTANCE,
            value,
        }
    }

    pub fn system_state(healthy: bool) -> Self {
        Self {
            kind: MetricKind::Boolean,
            plugin: PLUGIN_NAME,
            plugin_instance: SYSTEM_STATE_INSTANCE.to_string(),
            type_instance: SERVICE_TYPE_INSTANCE,
            value: bool_value(healthy),
        }
    }

    pub fn need_reload(all_synced: bool) -> Self {
        Self {
            kind: MetricKind::Boolean,
            plugin: PLUGIN_NAME,
            plugin_instance: PLUGIN_NAME.to_string(),
            type_instance: NEED_RELOAD_TYPE_INSTANCE,
            value: bool_value(all_synced),
        }
    }
}

fn bool_value(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

#[async_trait]
pub trait MetricSink: Send + Sync {
    async fn publish(&self, samples: Vec<HealthSample>);
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub pass: u64,
    pub collected_at: Option<String>,
    pub samples: Vec<HealthSample>,
}

#[derive(Debug, Default)]
pub struct SampleStore {
    latest: RwLock<Snapshot>,
}

impl SampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.latest.read().await.clone()
    }
}

#[async_trait]
impl MetricSink for SampleStore {
    async fn publish(&self, samples: Vec<HealthSample>) {
        let mut latest = self.latest.write().await;
        latest.pass += 1;
        latest.collected_at = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
        latest.samples = samples;
    }
}

#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl MetricSink for LogSink {
    async fn publish(&self, samples: Vec<HealthSample>) {
        for sample in samples {
            info!(
                plugin = sample.plugin,
                plugin_instance = %sample.plugin_instance,
                type_instance = sample.type_instance,
                value = sample.value,
                "sample"
            );
        }
    }
}

#[async_trait]
impl<T: MetricSink + ?Sized> MetricSink for Arc<T> {
    async fn publish(&self, samples: Vec<HealthSample>) {
        (**self).publish(samples).await;
    }
}

#[async_trait]
impl<A: MetricSink, B: MetricSink> MetricSink for (A, B) {
    async fn publish(&self, samples: Vec<HealthSample>) {
        self.0.publish(samples.clone()).await;
        self.1.publish(samples).await;
    }
}
