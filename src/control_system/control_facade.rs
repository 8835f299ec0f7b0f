use crate::control_system::config::SchedulerConfig;
use crate::control_system::scheduler::Scheduler;
use crate::control_system::{lock_traffic, SharedTraffic, TrafficState};
use crate::detection::VehicleDetector;
use crate::error::{DetectionError, SignalError};
use crate::shared_data::{Road, RoadId, StatusSnapshot};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{watch, Mutex as AsyncMutex};
use tokio::task::{self, JoinHandle};

struct RunHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

#[derive(Default)]
struct Lifecycle {
    active: Option<RunHandle>,
    // A stopped loop that may still be forcing its roads red.
    draining: Option<JoinHandle<()>>,
}

/// Entry point for every outside request: configuration, count updates,
/// starting and stopping the lights, and status polling.
pub struct ControlFacade {
    traffic: SharedTraffic,
    config: SchedulerConfig,
    running: Arc<AtomicBool>,
    lifecycle: AsyncMutex<Lifecycle>,
}

impl ControlFacade {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            traffic: Arc::new(Mutex::new(TrafficState::default())),
            config,
            running: Arc::new(AtomicBool::new(false)),
            lifecycle: AsyncMutex::new(Lifecycle::default()),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Ensures roads `1..=n` exist. Roads that already exist keep their counts,
    /// so uploads made before a reconfigure are not lost.
    pub fn configure(&self, n: i64) -> Result<Vec<Road>, SignalError> {
        if n <= 0 || n > i64::from(u32::MAX) {
            return Err(SignalError::InvalidConfiguration(n));
        }
        let mut traffic = lock_traffic(&self.traffic);
        if traffic.registry.ensure_roads(n as usize) {
            log::info!("Configured {} roads", n);
        } else if traffic.registry.len() != n as usize {
            log::warn!(
                "Roads already configured ({}); ignoring request for {}",
                traffic.registry.len(),
                n
            );
        }
        let ids: Vec<RoadId> = traffic.registry.ids().collect();
        traffic.signals.ensure(ids);
        Ok(traffic.registry.snapshot())
    }

    pub fn update_count(&self, road: RoadId, count: u32) -> Result<(), SignalError> {
        lock_traffic(&self.traffic).registry.set_count(road, count)?;
        log::info!("Road {}: vehicle count set to {}", road, count);
        Ok(())
    }

    /// Runs `detector` over an image from `road`'s feed and stores the count.
    /// A failed detection leaves the stored count as it was.
    pub async fn ingest_feed(
        &self,
        road: RoadId,
        image: Vec<u8>,
        detector: Arc<dyn VehicleDetector>,
    ) -> Result<u32, SignalError> {
        if !lock_traffic(&self.traffic).registry.contains(road) {
            return Err(SignalError::UnknownRoad(road.to_string()));
        }

        let count = task::spawn_blocking(move || detector.detect(&image))
            .await
            .map_err(|e| {
                SignalError::DetectionFailure(DetectionError::Model(format!(
                    "detector task failed: {}",
                    e
                )))
            })?
            .map_err(|e| {
                log::warn!("Detection failed for road {}: {}", road, e);
                SignalError::DetectionFailure(e)
            })?;

        self.update_count(road, count)?;
        Ok(count)
    }

    /// Launches the scheduler unless it is already running. Returns the counts it starts from.
    pub async fn start(&self) -> Vec<Road> {
        let mut lifecycle = self.lifecycle.lock().await;
        if let Some(run) = &lifecycle.active {
            if !run.task.is_finished() {
                log::debug!("Lights already running");
                return self.counts();
            }
        }
        if let Some(finished) = lifecycle.active.take() {
            Self::reap(finished.task).await;
        }
        if let Some(previous) = lifecycle.draining.take() {
            Self::reap(previous).await;
        }

        let (stop, stop_rx) = watch::channel(false);
        self.running.store(true, Ordering::SeqCst);
        let scheduler = Scheduler::new(
            self.traffic.clone(),
            self.config.clone(),
            stop_rx,
            self.running.clone(),
        );
        let task = tokio::spawn(scheduler.run());
        lifecycle.active = Some(RunHandle { stop, task });
        log::info!("Lights started");
        self.counts()
    }

    /// Asks the scheduler to stop. Does not wait for it to notice.
    pub async fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        self.running.store(false, Ordering::SeqCst);
        if let Some(run) = lifecycle.active.take() {
            run.stop.send_replace(true);
            lifecycle.draining = Some(run.task);
            log::info!("Lights stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Signal and count of every road. Only takes the state lock, never waits on the scheduler.
    pub fn status(&self) -> StatusSnapshot {
        lock_traffic(&self.traffic).snapshot(self.is_running())
    }

    pub fn counts(&self) -> Vec<Road> {
        lock_traffic(&self.traffic).registry.snapshot()
    }

    async fn reap(task: JoinHandle<()>) {
        if let Err(e) = task.await {
            log::error!("Previous scheduler loop ended abnormally: {}", e);
        }
    }
}

impl Default for ControlFacade {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}
