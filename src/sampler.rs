//! Sampling orchestrator
//!
//! One pass samples, in order: the system-wide state, the reload-pending flag
//! (when enabled) and every configured service. Each stage gets at most one
//! reconnect-and-retry. A pass never fails; unreadable targets produce
//! unhealthy samples, except the reload flag which is skipped for the pass.

use std::{collections::HashSet, sync::Arc};

use regex::RegexSet;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::domain::{
    aggregate::aggregate_system_state,
    reload::scan_needs_reload,
    session::Session,
    state::{service_health, system_health},
};
use crate::errors::BusError;
use crate::logging::verbose;
use crate::metrics::{HealthSample, MetricSink};
use crate::systemd_client::ServiceManager;

pub struct Engine<M: ServiceManager> {
    config: EngineConfig,
    session: Session<M>,
}

impl<M: ServiceManager> Engine<M> {
    pub fn new(config: EngineConfig, manager: M) -> Self {
        Self {
            config,
            session: Session::new(manager),
        }
    }

    pub async fn start(config: EngineConfig, manager: M) -> Option<Self> {
        if !config.is_active() {
            info!("no services defined in configuration, sampler stays idle");
            return None;
        }

        let mut engine = Self::new(config, manager);
        if let Err(err) = engine.session.connect().await {
            warn!(kind = err.kind(), error = %err, "initial connection to the service manager failed");
        }

        verbose!(
            engine.config.verbose,
            services = ?engine.config.services,
            interval_secs = engine.config.interval.as_secs_f64(),
            scan_need_reload = engine.config.scan_need_reload,
            "sampler configured"
        );
        Some(engine)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn session(&self) -> &Session<M> {
        &self.session
    }

    pub async fn run_pass(&mut self) -> Vec<HealthSample> {
        let Self { config, session } = self;
        let verbose = config.verbose;
        verbose!(verbose, "sampling pass started");

        let mut samples = Vec::with_capacity(config.services.len() + 2);
        samples.push(sample_system_state(session, &config.state_ignore, verbose).await);

        if config.scan_need_reload {
            if let Some(sample) =
                sample_need_reload(session, &config.need_reload_ignore, verbose).await
            {
                samples.push(sample);
            }
        }

        for service in &config.services {
            samples.push(sample_service(session, service, verbose).await);
        }

        samples
    }
}

async fn reconnect<M: ServiceManager>(session: &mut Session<M>, stage: &'static str, verbose: bool) {
    verbose!(verbose, stage, "reinitializing the connection to the service manager");
    if let Err(err) = session.connect().await {
        warn!(stage, kind = err.kind(), error = %err, "reconnect failed");
    }
}

async fn sample_system_state<M: ServiceManager>(
    session: &mut Session<M>,
    ignore: &RegexSet,
    verbose: bool,
) -> HealthSample {
    let mut state = aggregate_system_state(session, ignore).await;
    if state.is_broken() {
        reconnect(session, "systemd_state", verbose).await;
        state = aggregate_system_state(session, ignore).await;
    }

    let healthy = system_health(&state);
    verbose!(verbose, state = %state, healthy, "system state sampled");
    HealthSample::system_state(healthy)
}

async fn sample_need_reload<M: ServiceManager>(
    session: &mut Session<M>,
    ignore: &HashSet<String>,
    verbose: bool,
) -> Option<HealthSample> {
    let needs_reload = match scan_needs_reload(session, ignore).await {
        Ok(needs_reload) => needs_reload,
        Err(err) => {
            log_scan_failure(&err, verbose);
            reconnect(session, "needreload", verbose).await;

            match scan_needs_reload(session, ignore).await {
                Ok(needs_reload) => needs_reload,
                Err(err) => {
                    warn!(
                        kind = err.kind(),
                        error = %err,
                        "reload scan failed after reconnect, skipping sample for this pass"
                    );
                    return None;
                }
            }
        }
    };

    verbose!(verbose, needs_reload, "reload scan finished");
    Some(HealthSample::need_reload(!needs_reload))
}

fn log_scan_failure(err: &BusError, verbose: bool) {
    match err {
        BusError::Disconnected | BusError::Transport(_) => {
            verbose!(verbose, error = %err, "connection lost during reload scan");
        }
        BusError::PermissionDenied(_)
        | BusError::NotFound(_)
        | BusError::Protocol(_)
        | BusError::Remote(_) => {
            warn!(kind = err.kind(), error = %err, "unit listing for reload scan failed");
        }
    }
}

async fn sample_service<M: ServiceManager>(
    session: &mut Session<M>,
    service: &str,
    verbose: bool,
) -> HealthSample {
    let unit = format!("{service}.service");

    let mut sub_state = session.sub_state(&unit).await;
    let service_type = session.service_type(&unit).await;
    if sub_state.is_broken() {
        verbose!(verbose, unit = %unit, "unit reported as broken");
        reconnect(session, "service", verbose).await;
        sub_state = session.sub_state(&unit).await;
    }

    let value = service_health(&sub_state, &service_type);
    verbose!(
        verbose,
        service,
        value,
        state = %sub_state,
        service_type = %service_type,
        "service sampled"
    );
    HealthSample::service(service, value)
}

pub async fn run_schedule<M: ServiceManager>(mut engine: Engine<M>, sink: Arc<dyn MetricSink>) {
    let mut ticker = interval(engine.config().interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let samples = engine.run_pass().await;
        sink.publish(samples).await;
    }
}
