//! # Fleet Dispatch demo
//!
//! Spins up the tracking system, plans two Nairobi deliveries, drives them with
//! manual simulation ticks and prints the resulting state.

use clap::Parser;
use fleet_dispatch::config::{load_config, DispatchConfig};
use fleet_dispatch::env::{SeededRandom, SharedRandom, SystemClock, ThreadRandom};
use fleet_dispatch::events::{EventKind, TrackingEvent};
use fleet_dispatch::geo::Coordinate;
use fleet_dispatch::lifecycle::{setup_tracing, TrackingSystem};
use fleet_dispatch::model::{DeliveryStop, LocationReport, RouteOptions, VehicleClass, VehicleTelemetry};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Instrument};

#[derive(Parser)]
#[command(name = "fleet-dispatch")]
#[command(about = "Route optimization and live delivery tracking demo", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Simulation ticks to run
    #[arg(short, long, default_value_t = 10)]
    ticks: u32,

    /// Seed for reproducible traffic and waypoints
    #[arg(long)]
    seed: Option<u64>,
}

const CBD: Coordinate = Coordinate::new(-1.2864, 36.8172);
const WESTLANDS: Coordinate = Coordinate::new(-1.2676, 36.8108);
const KILIMANI: Coordinate = Coordinate::new(-1.2890, 36.7830);
const UPPER_HILL: Coordinate = Coordinate::new(-1.2990, 36.8140);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => DispatchConfig::default(),
    };
    setup_tracing(&config.observability.log_level)?;

    let random: SharedRandom = match cli.seed {
        Some(seed) => Arc::new(SeededRandom::new(seed)),
        None => Arc::new(ThreadRandom),
    };
    let system = TrackingSystem::with_env(config, Arc::new(SystemClock), random)?;

    for kind in EventKind::ALL {
        // dropping the handle leaves the callback registered
        let _ = system.subscribe(kind, |event| {
            match event {
                TrackingEvent::DeliveryUpdated(t) => info!(event = %event.kind(), delivery_id = %t.delivery_id, progress = t.progress),
                other => info!(event = %other.kind(), "Event"),
            }
            Ok(())
        });
    }

    let stops = system.optimize_stop_order(
        vec![
            DeliveryStop { delivery_id: "D2".into(), location: KILIMANI },
            DeliveryStop { delivery_id: "D1".into(), location: WESTLANDS },
            DeliveryStop { delivery_id: "D3".into(), location: UPPER_HILL },
        ],
        CBD,
    )?;
    for (position, stop) in stops.iter().enumerate() {
        info!(position, delivery_id = %stop.stop.delivery_id, leg_km = stop.distance_from_previous_km, "Planned stop");
    }

    let span = tracing::info_span!("dispatch");
    async {
        let options = RouteOptions {
            vehicle_class: VehicleClass::Van,
            ..Default::default()
        };
        for stop in &stops {
            let route = system.compute_route(CBD, stop.stop.location, &options).await?;
            info!(
                delivery_id = %stop.stop.delivery_id,
                distance_km = route.distance_km,
                duration_minutes = route.duration_minutes,
                traffic = ?route.traffic.level,
                "Route ready"
            );
            system
                .start_tracking(stop.stop.delivery_id.clone(), "drv1".into(), "veh1".into(), route)
                .await?;
        }

        system
            .report_vehicle_status(
                "veh1".into(),
                VehicleTelemetry {
                    fuel_level: Some(0.8),
                    engine_temp: Some(88.0),
                    location: Some(CBD),
                    ..Default::default()
                },
            )
            .await?;
        system
            .report_driver_location("drv1".into(), LocationReport::new(CBD.latitude, CBD.longitude), Some(5.0))
            .await?;
        Ok::<_, Box<dyn std::error::Error + Send + Sync>>(())
    }
    .instrument(span)
    .await?;

    for tick in 0..cli.ticks {
        let summary = system.tick().await?;
        info!(tick, advanced = summary.advanced, completed = summary.completed, "Tick done");
    }

    let stats = system.stats().await?;
    info!(?stats, "Final state");
    let snapshot = system.snapshot().await?;
    info!(bytes = snapshot.to_json()?.len(), "Snapshot taken");

    system.shutdown().await;
    info!("Application completed successfully");
    Ok(())
}
