use crate::control_system::config::SchedulerConfig;
use crate::control_system::signal_state::MissingSignal;
use crate::control_system::{lock_traffic, SharedTraffic};
use crate::shared_data::{Phase, RoadId, SignalState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{sleep, Duration};

/// Why the loop stopped driving signals.
#[derive(Debug)]
enum Halt {
    Stopped,
    UnknownRoad(RoadId),
    MissingSignal(MissingSignal),
}

impl From<MissingSignal> for Halt {
    fn from(err: MissingSignal) -> Self {
        Halt::MissingSignal(err)
    }
}

/// Drives roads through yellow, green, yellow and red, busiest road first.
///
/// The loop is the only writer of signal state while it runs. It re-ranks
/// roads from the current counts on every pass and checks the stop signal on
/// every tick, so a stop request is seen well within one tick.
pub struct Scheduler {
    traffic: SharedTraffic,
    config: SchedulerConfig,
    stop: watch::Receiver<bool>,
    running: Arc<AtomicBool>,
}

impl Scheduler {
    pub fn new(
        traffic: SharedTraffic,
        config: SchedulerConfig,
        stop: watch::Receiver<bool>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            traffic,
            config,
            stop,
            running,
        }
    }

    /// Runs passes until a stop is requested or an invariant breaks,
    /// then leaves every road red.
    pub async fn run(mut self) {
        log::info!("Signal scheduler started");
        let halt = loop {
            if let Err(halt) = self.run_pass().await {
                break halt;
            }
            if let Err(halt) = self.pause(self.config.inter_pass_pause()).await {
                break halt;
            }
        };

        match halt {
            Halt::Stopped => log::info!("Signal scheduler stopped"),
            Halt::UnknownRoad(road) => {
                log::error!("Road {} vanished from the registry mid-pass; halting", road)
            }
            Halt::MissingSignal(err) => log::error!("{}; halting", err),
        }
        lock_traffic(&self.traffic).signals.force_all_red();
        self.running.store(false, Ordering::SeqCst);
    }

    async fn run_pass(&mut self) -> Result<(), Halt> {
        let ranked = lock_traffic(&self.traffic).registry.ranked();
        log::debug!(
            "New pass: {:?}",
            ranked
                .iter()
                .map(|road| (road.id.0, road.vehicle_count))
                .collect::<Vec<_>>()
        );
        for road in ranked {
            self.check_stop()?;
            self.run_turn(road.id).await?;
        }
        Ok(())
    }

    // One road's turn. The count is read fresh so a road that just gained traffic is served now.
    async fn run_turn(&mut self, road: RoadId) -> Result<(), Halt> {
        let vehicle_count = {
            let mut traffic = lock_traffic(&self.traffic);
            let count = traffic
                .registry
                .count(road)
                .ok_or(Halt::UnknownRoad(road))?;
            if count == 0 {
                traffic.signals.set(road, SignalState::RED)?;
                log::debug!("Road {}: no vehicles, staying red", road);
                return Ok(());
            }
            traffic.signals.force_others_red(road)?;
            count
        };

        let green_total = self.config.green_total(vehicle_count);
        let green_secs = self.config.green_duration(green_total);
        let yellow_secs = self.config.yellow_to_red_secs;
        log::info!(
            "Road {}: {} vehicles, {}s of right-of-way ({}s green)",
            road,
            vehicle_count,
            green_total,
            green_secs
        );

        self.countdown(road, Phase::YellowToGreen, self.config.yellow_to_green_secs, 0)
            .await?;
        // Green shows time left until red, trailing yellow included.
        self.countdown(road, Phase::Green, green_secs, yellow_secs)
            .await?;
        self.countdown(road, Phase::YellowToRed, yellow_secs, 0).await?;

        self.set_signal(road, SignalState::RED)?;
        log::info!("Road {}: {}", road, Phase::Red);
        Ok(())
    }

    async fn countdown(
        &mut self,
        road: RoadId,
        phase: Phase,
        secs: u32,
        display_offset: u32,
    ) -> Result<(), Halt> {
        log::info!("Road {}: {} for {}s", road, phase, secs);
        for left in (1..=secs).rev() {
            self.check_stop()?;
            self.set_signal(road, SignalState::new(phase, left + display_offset))?;
            log::debug!("Road {}: {} {}", road, phase, left + display_offset);
            self.pause(self.config.tick()).await?;
        }
        Ok(())
    }

    fn set_signal(&self, road: RoadId, state: SignalState) -> Result<(), Halt> {
        lock_traffic(&self.traffic).signals.set(road, state)?;
        Ok(())
    }

    fn check_stop(&self) -> Result<(), Halt> {
        if *self.stop.borrow() {
            Err(Halt::Stopped)
        } else {
            Ok(())
        }
    }

    // Sleeps unless a stop arrives first. A dropped sender counts as a stop.
    async fn pause(&mut self, duration: Duration) -> Result<(), Halt> {
        tokio::select! {
            _ = sleep(duration) => Ok(()),
            _ = self.stop.wait_for(|stop| *stop) => Err(Halt::Stopped),
        }
    }
}
