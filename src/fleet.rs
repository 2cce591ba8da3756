use crate::allocator::SerialAllocator;
use crate::config::{ConfigError, SimConfig};
use crate::equipment::{EquipmentCycle, EquipmentUnit};
use crate::serial::{SerialBatch, SerialError};
use crate::tags::{TagServer, TagServerError};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("serial batch generation failed: {0}")]
    Serial(#[from] SerialError),
    #[error("tag registration failed: {0}")]
    TagSetup(#[from] TagServerError),
    #[error("equipment cycle task failed: {0}")]
    TaskPanicked(#[from] tokio::task::JoinError),
}

/// Outcome counts for one round of concurrent equipment cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    pub produced: usize,
    pub defective: usize,
}

/// Cumulative counters over the fleet's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FleetStats {
    pub rounds: u64,
    pub cells_produced: u64,
    pub defective_cells: u64,
}

/// Owns the equipment cycles and the shared serial allocator, and drives
/// them in rounds: each round fans one task out per unit, lets them run
/// concurrently, and completes when every unit has published once.
///
/// Shutdown is only observed between rounds, so a cycle that has been
/// granted a serial always finishes its publish; grants are never discarded.
pub struct FleetScheduler<S: TagServer + 'static> {
    cycles: Vec<EquipmentCycle>,
    allocator: Arc<SerialAllocator>,
    server: Arc<S>,
    stats: FleetStats,
}

impl<S: TagServer + 'static> FleetScheduler<S> {
    /// Validate the configuration, generate the serial batch, and register
    /// every unit's tags. Fails fast before any cycle starts.
    pub fn new(config: &SimConfig, server: Arc<S>) -> Result<Self, FleetError> {
        config.validate()?;

        let batch = SerialBatch::generate(&config.serial_prefix, config.serial_count)?;
        let allocator = Arc::new(SerialAllocator::new(batch));

        let mut cycles = Vec::with_capacity(config.num_equipments);
        for index in 0..config.num_equipments {
            let unit = EquipmentUnit::new(server.as_ref(), index)?;
            let cycle = EquipmentCycle::new(
                unit,
                config.defect_probability,
                config.wait_mean_seconds,
                config.wait_stddev_seconds,
                config.seed.wrapping_add(index as u64),
            )
            .map_err(|_| ConfigError::InvalidWaitDistribution {
                mean: config.wait_mean_seconds,
                stddev: config.wait_stddev_seconds,
            })?;
            cycles.push(cycle);
        }

        Ok(Self {
            cycles,
            allocator,
            server,
            stats: FleetStats::default(),
        })
    }

    /// Run one round: every cycle progresses through its own
    /// wait/allocate/publish sequence concurrently, with no ordering between
    /// units. Returns once all of them have finished.
    pub async fn run_round(&mut self) -> Result<RoundSummary, FleetError> {
        let mut handles = Vec::with_capacity(self.cycles.len());

        for mut cycle in self.cycles.drain(..) {
            let allocator = Arc::clone(&self.allocator);
            let server = Arc::clone(&self.server);

            handles.push(tokio::spawn(async move {
                let outcome = cycle.run_once(allocator.as_ref(), server.as_ref()).await;
                (cycle, outcome)
            }));
        }

        let mut summary = RoundSummary::default();
        for handle in handles {
            let (cycle, outcome) = handle.await?;
            if outcome.is_defective() {
                summary.defective += 1;
            } else {
                summary.produced += 1;
            }
            self.cycles.push(cycle);
        }

        self.stats.rounds += 1;
        self.stats.cells_produced += summary.produced as u64;
        self.stats.defective_cells += summary.defective as u64;

        Ok(summary)
    }

    /// Run rounds until the shutdown signal flips to `true`.
    pub async fn run(&mut self, shutdown: watch::Receiver<bool>) -> Result<(), FleetError> {
        info!(
            units = self.cycles.len(),
            serials = self.allocator.remaining(),
            "fleet starting"
        );

        while !*shutdown.borrow() {
            let summary = self.run_round().await?;
            debug!(
                produced = summary.produced,
                defective = summary.defective,
                serials_remaining = self.allocator.remaining(),
                "round complete"
            );
        }

        info!(
            rounds = self.stats.rounds,
            cells_produced = self.stats.cells_produced,
            defective_cells = self.stats.defective_cells,
            "fleet stopped"
        );

        Ok(())
    }

    pub fn num_units(&self) -> usize {
        self.cycles.len()
    }

    pub fn stats(&self) -> FleetStats {
        self.stats
    }

    /// Read-only view of the shared pool (allocation still goes through the
    /// allocator's own claim operation only).
    pub fn allocator(&self) -> &SerialAllocator {
        &self.allocator
    }
}
