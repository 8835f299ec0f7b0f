// signal_controller_main.rs
use signal_scheduler::control_system::config::SchedulerConfig;
use signal_scheduler::control_system::control_facade::ControlFacade;
use signal_scheduler::detection::{DetectionsJsonDetector, SimulatedDetector, VehicleDetector};
use signal_scheduler::global_variables::{DEFAULT_ROAD_COUNT, STATUS_HISTORY_CSV};
use signal_scheduler::monitoring::status_recorder::StatusRecorder;
use signal_scheduler::shared_data::{current_timestamp, RoadId};
use std::io::{stdout, Write};
use std::sync::Arc;
use tokio::io::{stdin, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time::{sleep, Duration};

type Input = Lines<BufReader<Stdin>>;

async fn prompt(input: &mut Input, message: &str) -> Option<String> {
    print!("{}", message);
    let _ = stdout().flush();
    match input.next_line().await {
        Ok(Some(line)) => Some(line.trim().to_string()),
        _ => None,
    }
}

// Records a snapshot every second while the lights are running.
async fn record_status(facade: Arc<ControlFacade>, recorder: StatusRecorder) {
    loop {
        if facade.is_running() {
            if let Err(e) = recorder.record(&facade.status()) {
                log::warn!("Error recording status: {}", e);
            }
        }
        sleep(Duration::from_secs(1)).await;
    }
}

async fn run_cli(facade: Arc<ControlFacade>, recorder: StatusRecorder) {
    let mut input = BufReader::new(stdin()).lines();
    let json_detector: Arc<dyn VehicleDetector> = Arc::new(DetectionsJsonDetector::new());
    let simulated_detector: Arc<dyn VehicleDetector> =
        Arc::new(SimulatedDetector::new(current_timestamp(), 30));

    loop {
        println!("\nTraffic Signal Controller Admin CLI");
        println!("1. Configure Roads");
        println!("2. Set Vehicle Count for a Road");
        println!("3. Detect Vehicles from a Detections File");
        println!("4. Simulate Detection for All Roads");
        println!("5. Start Lights");
        println!("6. Stop Lights");
        println!("7. Show Status");
        println!("8. Show Recorded Status History");
        println!("9. Exit");
        let Some(choice) = prompt(&mut input, "Enter your choice: ").await else {
            break;
        };
        match choice.parse::<u32>().unwrap_or(0) {
            1 => {
                let Some(n) = prompt(&mut input, "Number of roads: ").await else {
                    break;
                };
                let n = n.parse::<i64>().unwrap_or(0);
                match facade.configure(n) {
                    Ok(roads) => println!("Roads configured: {}", roads.len()),
                    Err(e) => eprintln!("Error configuring roads: {}", e),
                }
            }
            2 => {
                let Some(road) = prompt(&mut input, "Road ID: ").await else {
                    break;
                };
                let Some(count) = prompt(&mut input, "Vehicle count: ").await else {
                    break;
                };
                let Ok(count) = count.parse::<u32>() else {
                    eprintln!("Vehicle count must be a non-negative integer");
                    continue;
                };
                match road
                    .parse::<RoadId>()
                    .and_then(|road| facade.update_count(road, count))
                {
                    Ok(()) => println!("Road {} now has {} vehicles", road, count),
                    Err(e) => eprintln!("Error updating count: {}", e),
                }
            }
            3 => {
                let Some(road) = prompt(&mut input, "Road ID: ").await else {
                    break;
                };
                let Some(path) = prompt(&mut input, "Detections file: ").await else {
                    break;
                };
                let road = match road.parse::<RoadId>() {
                    Ok(road) => road,
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        continue;
                    }
                };
                let image = match tokio::fs::read(&path).await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        eprintln!("Error reading {}: {}", path, e);
                        continue;
                    }
                };
                match facade
                    .ingest_feed(road, image, json_detector.clone())
                    .await
                {
                    Ok(count) => println!("Road {}: {} vehicles detected", road, count),
                    Err(e) => eprintln!("Error detecting vehicles: {}", e),
                }
            }
            4 => {
                for road in facade.counts() {
                    match facade
                        .ingest_feed(road.id, Vec::new(), simulated_detector.clone())
                        .await
                    {
                        Ok(count) => println!("Road {}: {} vehicles", road.id, count),
                        Err(e) => eprintln!("Error simulating road {}: {}", road.id, e),
                    }
                }
            }
            5 => {
                let counts = facade.start().await;
                println!("Lights started");
                for road in counts {
                    println!("  Road {}: {} vehicles", road.id, road.vehicle_count);
                }
            }
            6 => {
                facade.stop().await;
                println!("Lights stopped");
            }
            7 => match serde_json::to_string_pretty(&facade.status().to_json()) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Error rendering status: {}", e),
            },
            8 => match recorder.read_records() {
                Ok(records) => {
                    println!("Recorded Status ({} rows):", records.len());
                    for record in records.iter().rev().take(20).rev() {
                        println!(
                            "{} | Road {} | {} ({}) | {}s | {} vehicles",
                            record.timestamp,
                            record.road,
                            record.phase,
                            record.colour,
                            record.remaining,
                            record.vehicle_count
                        );
                    }
                }
                Err(e) => eprintln!("Error reading {}: {}", recorder.path().display(), e),
            },
            9 => {
                println!("Exiting CLI.");
                break;
            }
            _ => println!("Invalid choice. Try again."),
        }
    }
    facade.stop().await;
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => match SchedulerConfig::from_json_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => SchedulerConfig::default(),
    };
    let roads = std::env::var("SIGNAL_ROADS")
        .ok()
        .and_then(|value| value.parse::<i64>().ok())
        .unwrap_or(DEFAULT_ROAD_COUNT as i64);

    let facade = Arc::new(ControlFacade::new(config));
    if let Err(e) = facade.configure(roads) {
        eprintln!("Error configuring roads: {}", e);
        std::process::exit(1);
    }

    let recorder = StatusRecorder::new(STATUS_HISTORY_CSV);
    let recorder_handle = tokio::spawn(record_status(facade.clone(), recorder.clone()));

    run_cli(facade, recorder).await;
    recorder_handle.abort();
}
