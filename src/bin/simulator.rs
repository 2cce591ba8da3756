use cellplant::{FleetScheduler, InMemoryTagServer, SimConfig};
use clap::{App, Arg};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let matches = App::new("cellplant-simulator")
        .version("0.1.0")
        .author("Plant Systems Engineering Team")
        .about("🏭 Battery cell plant simulator - serialized production with live tag publishing")
        .arg(
            Arg::with_name("equipments")
                .short("n")
                .long("equipments")
                .value_name("COUNT")
                .help("Number of equipment units in the fleet")
                .takes_value(true)
                .default_value("4"),
        )
        .arg(
            Arg::with_name("prefix")
                .short("p")
                .long("prefix")
                .value_name("DIGITS")
                .help("GS1 prefix for generated serial numbers")
                .takes_value(true)
                .default_value("123"),
        )
        .arg(
            Arg::with_name("serial-count")
                .short("c")
                .long("serial-count")
                .value_name("COUNT")
                .help("Size of the serial batch generated at startup")
                .takes_value(true)
                .default_value("1000000"),
        )
        .arg(
            Arg::with_name("defect-probability")
                .short("d")
                .long("defect-probability")
                .value_name("P")
                .help("Probability in [0, 1] that a cycle produces a defective cell")
                .takes_value(true)
                .default_value("0.05"),
        )
        .arg(
            Arg::with_name("wait-mean")
                .long("wait-mean")
                .value_name("SECONDS")
                .help("Mean of the per-cycle wait distribution")
                .takes_value(true)
                .default_value("3.0"),
        )
        .arg(
            Arg::with_name("wait-stddev")
                .long("wait-stddev")
                .value_name("SECONDS")
                .help("Spread of the per-cycle wait distribution")
                .takes_value(true)
                .default_value("0.25"),
        )
        .arg(
            Arg::with_name("seed")
                .short("s")
                .long("seed")
                .value_name("SEED")
                .help("Seed for the per-equipment random streams")
                .takes_value(true)
                .default_value("12345"),
        )
        .get_matches();

    let config = SimConfig::new()
        .with_num_equipments(matches.value_of("equipments").unwrap().parse()?)
        .with_serial_prefix(matches.value_of("prefix").unwrap())
        .with_serial_count(matches.value_of("serial-count").unwrap().parse()?)
        .with_defect_probability(matches.value_of("defect-probability").unwrap().parse()?)
        .with_wait(
            matches.value_of("wait-mean").unwrap().parse()?,
            matches.value_of("wait-stddev").unwrap().parse()?,
        )
        .with_seed(matches.value_of("seed").unwrap().parse()?);

    println!("🏭 Battery Cell Plant Simulator");
    println!("===============================");

    let server = Arc::new(InMemoryTagServer::new());
    let mut fleet = FleetScheduler::new(&config, Arc::clone(&server))?;

    println!("   Equipment units: {}", fleet.num_units());
    println!("   Registered tags: {}", server.snapshot().len());
    println!(
        "   Serial batch:    {} serials (prefix {})",
        config.serial_count, config.serial_prefix
    );
    println!("   Defect rate:     {}", config.defect_probability);
    println!("📡 Publishing live tag updates (Ctrl+C to stop)");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested, finishing current round");
            let _ = shutdown_tx.send(true);
        }
    });

    if let Err(e) = fleet.run(shutdown_rx).await {
        error!("fleet error: {e}");
        return Err(e.into());
    }

    let stats = fleet.stats();
    let report = serde_json::json!({
        "rounds": stats.rounds,
        "cells_produced": stats.cells_produced,
        "defective_cells": stats.defective_cells,
        "serials_remaining": fleet.allocator().remaining(),
    });
    println!("🏁 Final stats: {report}");

    Ok(())
}
