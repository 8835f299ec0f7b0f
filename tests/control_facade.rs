//! Drives the facade the way the admin CLI and polling clients do, on a paused clock.

use signal_scheduler::control_system::control_facade::ControlFacade;
use signal_scheduler::detection::{DetectionsJsonDetector, VehicleDetector};
use signal_scheduler::error::{DetectionError, SignalError};
use signal_scheduler::shared_data::{Phase, RoadId, StatusSnapshot};
use std::sync::Arc;
use tokio::time::{sleep, sleep_until, Duration, Instant};

struct FailingDetector;

impl VehicleDetector for FailingDetector {
    fn detect(&self, _image: &[u8]) -> Result<u32, DetectionError> {
        Err(DetectionError::Model("weights not loaded".to_string()))
    }
}

fn configured(roads: i64, counts: &[(u32, u32)]) -> ControlFacade {
    let facade = ControlFacade::default();
    facade.configure(roads).unwrap();
    for &(road, count) in counts {
        facade.update_count(RoadId(road), count).unwrap();
    }
    facade
}

async fn observe_at(started: Instant, second: u64, facade: &ControlFacade) -> StatusSnapshot {
    sleep_until(started + Duration::from_millis(second * 1000 + 500)).await;
    facade.status()
}

/// At most one road is ever out of red.
#[tokio::test(start_paused = true)]
async fn only_one_road_is_active_at_a_time() {
    let facade = configured(4, &[(1, 3), (2, 9), (3, 3), (4, 0)]);
    let started = Instant::now();
    facade.start().await;
    for second in 0..150 {
        let status = observe_at(started, second, &facade).await;
        assert!(status.non_red_count() <= 1, "{:?}", status);
        let empty = status.road(RoadId(4)).unwrap();
        assert_eq!((empty.phase, empty.remaining), (Phase::Red, 0));
    }
    facade.stop().await;
}

/// Count 5 gives 20s to red: 15s green shown as 20..6, then yellow 5..1.
#[tokio::test(start_paused = true)]
async fn green_countdown_includes_trailing_yellow() {
    let facade = configured(2, &[(2, 5)]);
    let started = Instant::now();
    facade.start().await;

    let status = observe_at(started, 3, &facade).await;
    let road = status.road(RoadId(2)).unwrap();
    assert_eq!((road.phase, road.remaining), (Phase::Green, 20));

    let status = observe_at(started, 17, &facade).await;
    let road = status.road(RoadId(2)).unwrap();
    assert_eq!((road.phase, road.remaining), (Phase::Green, 6));

    let status = observe_at(started, 18, &facade).await;
    let road = status.road(RoadId(2)).unwrap();
    assert_eq!((road.phase, road.remaining), (Phase::YellowToRed, 5));

    let status = observe_at(started, 23, &facade).await;
    let road = status.road(RoadId(2)).unwrap();
    assert_eq!((road.phase, road.remaining), (Phase::Red, 0));
    facade.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stop_mid_green_forces_all_red() {
    let facade = configured(3, &[(1, 8), (2, 2)]);
    let started = Instant::now();
    facade.start().await;
    let status = observe_at(started, 10, &facade).await;
    assert_eq!(status.road(RoadId(1)).unwrap().phase, Phase::Green);

    facade.stop().await;
    assert!(!facade.is_running());
    // Let the loop observe the stop without advancing past a tick.
    sleep(Duration::from_millis(10)).await;

    for _ in 0..5 {
        let status = facade.status();
        assert!(!status.running);
        assert!(status
            .roads
            .iter()
            .all(|road| road.phase == Phase::Red && road.remaining == 0));
        sleep(Duration::from_secs(1)).await;
    }
}

/// A second start must not spawn a second loop that would double the countdown speed.
#[tokio::test(start_paused = true)]
async fn start_twice_runs_one_loop() {
    let facade = configured(1, &[(1, 5)]);
    let started = Instant::now();
    facade.start().await;
    facade.start().await;
    assert!(facade.is_running());

    let mut previous = None;
    for second in 3..18 {
        let status = observe_at(started, second, &facade).await;
        let road = status.road(RoadId(1)).unwrap();
        assert_eq!(road.phase, Phase::Green);
        if let Some(previous) = previous {
            assert_eq!(road.remaining + 1, previous);
        }
        previous = Some(road.remaining);
    }
    facade.stop().await;
}

#[tokio::test(start_paused = true)]
async fn restart_after_stop_starts_fresh() {
    let facade = configured(1, &[(1, 5)]);
    facade.start().await;
    sleep(Duration::from_millis(6500)).await;
    facade.stop().await;
    let restarted = Instant::now();
    facade.start().await;
    assert!(facade.is_running());

    let status = observe_at(restarted, 0, &facade).await;
    let road = status.road(RoadId(1)).unwrap();
    assert_eq!((road.phase, road.remaining), (Phase::YellowToGreen, 3));
    facade.stop().await;
}

#[tokio::test(start_paused = true)]
async fn start_returns_current_counts() {
    let facade = configured(3, &[(3, 4)]);
    let counts = facade.start().await;
    assert_eq!(counts.len(), 3);
    assert_eq!(counts[2].vehicle_count, 4);
    facade.stop().await;
}

#[test]
fn counts_survive_reconfigure() {
    let facade = ControlFacade::default();
    facade.configure(3).unwrap();
    facade.update_count(RoadId(1), 7).unwrap();
    facade.configure(3).unwrap();
    assert_eq!(facade.status().road(RoadId(1)).unwrap().vehicle_count, 7);
}

#[test]
fn unknown_road_leaves_state_unchanged() {
    let facade = configured(3, &[(2, 4)]);
    let before = facade.status();

    let err = "99"
        .parse::<RoadId>()
        .and_then(|road| facade.update_count(road, 5))
        .unwrap_err();
    assert!(matches!(err, SignalError::UnknownRoad(ref id) if id == "99"));
    assert_eq!(facade.status(), before);
}

#[test]
fn non_positive_road_count_is_invalid() {
    let facade = ControlFacade::default();
    assert!(matches!(
        facade.configure(0),
        Err(SignalError::InvalidConfiguration(0))
    ));
}

#[tokio::test]
async fn detection_result_updates_count() {
    let facade = configured(2, &[]);
    let detector: Arc<dyn VehicleDetector> = Arc::new(DetectionsJsonDetector::new());
    let output = br#"[{"class": 2}, {"class": 2}, {"class": 7}, {"class": 0}]"#.to_vec();

    let count = facade
        .ingest_feed(RoadId(2), output, detector)
        .await
        .unwrap();
    assert_eq!(count, 3);
    assert_eq!(facade.status().road(RoadId(2)).unwrap().vehicle_count, 3);
}

#[tokio::test]
async fn detection_failure_keeps_previous_count() {
    let facade = configured(2, &[(1, 6)]);
    let err = facade
        .ingest_feed(RoadId(1), b"jpeg".to_vec(), Arc::new(FailingDetector))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SignalError::DetectionFailure(DetectionError::Model(_))
    ));
    assert_eq!(facade.status().road(RoadId(1)).unwrap().vehicle_count, 6);

    let err = facade
        .ingest_feed(RoadId(1), b"not json".to_vec(), Arc::new(DetectionsJsonDetector::new()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SignalError::DetectionFailure(DetectionError::MalformedOutput(_))
    ));
    assert_eq!(facade.status().road(RoadId(1)).unwrap().vehicle_count, 6);
}

#[tokio::test]
async fn detection_for_unknown_road_is_rejected() {
    let facade = configured(2, &[]);
    let err = facade
        .ingest_feed(RoadId(9), b"[]".to_vec(), Arc::new(DetectionsJsonDetector::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, SignalError::UnknownRoad(_)));
}
