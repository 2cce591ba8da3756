//! # Battery Cell Plant Simulator
//!
//! A manufacturing-line simulation library: a small fleet of equipment units
//! produces uniquely serialized battery cells on randomized intervals and
//! publishes live sensor readings for each cell through an injected
//! data-access layer.
//!
//! ## Features
//!
//! - **GS1 serial generation**: prefix + zero-padded sequence + check digit,
//!   deterministic and collision-free per batch
//! - **Exclusive serial allocation**: a lock-free shared pool that never
//!   double-allocates or skips a serial under concurrent access
//! - **Defect-rate injection**: configurable probability of defective cells
//!   that consume no serial number
//! - **Round-based fleet scheduling**: one concurrent update per unit per
//!   round, with clean shutdown between rounds
//! - **Injected boundaries**: tag access and randomness are passed in, so
//!   tests run deterministic and offline
//!
//! ## Quick Start
//!
//! ```no_run
//! use cellplant::{FleetScheduler, InMemoryTagServer, SimConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), cellplant::FleetError> {
//!     let config = SimConfig::default().with_serial_count(1000);
//!     let server = Arc::new(InMemoryTagServer::new());
//!
//!     let mut fleet = FleetScheduler::new(&config, server)?;
//!     let summary = fleet.run_round().await?;
//!     println!("produced {} cells this round", summary.produced);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`serial`] - Check-digit calculator and serial batch generator
//! - [`allocator`] - Exclusive hand-out of the shared serial pool
//! - [`readings`] - Synthetic sensor bundle generation
//! - [`equipment`] - Per-unit production cycle state machine
//! - [`fleet`] - Round-based concurrent scheduling of the whole fleet
//! - [`tags`] - The injected data-access seam and an in-memory stand-in
//! - [`config`] - Validated simulation parameters

#![deny(warnings)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod allocator;
pub mod config;
pub mod equipment;
pub mod fleet;
pub mod readings;
pub mod serial;
pub mod tags;

// Re-export main public types for convenience
pub use allocator::{Exhausted, SerialAllocator};
pub use config::{ConfigError, SimConfig};
pub use equipment::{CycleOutcome, EquipmentCycle, EquipmentUnit};
pub use fleet::{FleetError, FleetScheduler, FleetStats, RoundSummary};
pub use readings::ReadingBundle;
pub use serial::{check_digit, SerialBatch, SerialError, SerialNumber};
pub use tags::{InMemoryTagServer, TagHandle, TagName, TagServer, TagValue};
