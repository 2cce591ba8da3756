use crate::serial::MAX_BATCH_SIZE;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_NUM_EQUIPMENTS: usize = 4;
pub const DEFAULT_SERIAL_PREFIX: &str = "123";
pub const DEFAULT_SERIAL_COUNT: usize = 1_000_000;
pub const DEFAULT_DEFECT_PROBABILITY: f64 = 0.05;
// Round-based fan-out timing for the default line rate.
pub const DEFAULT_WAIT_MEAN_SECONDS: f64 = 3.0;
pub const DEFAULT_WAIT_STDDEV_SECONDS: f64 = 0.25;
pub const DEFAULT_SEED: u64 = 12345;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("fleet needs at least one equipment unit")]
    ZeroEquipments,
    #[error("serial prefix `{0}` must be non-empty and numeric")]
    InvalidPrefix(String),
    #[error("serial count {0} exceeds what a zero-padded sequence can carry")]
    SerialCountTooLarge(usize),
    #[error("defect probability {0} must lie in [0, 1]")]
    DefectProbabilityOutOfRange(f64),
    #[error("wait distribution (mean {mean}, stddev {stddev}) must be finite with stddev >= 0")]
    InvalidWaitDistribution { mean: f64, stddev: f64 },
}

/// Simulation parameters, validated before any cycle starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Number of equipment units in the fleet.
    pub num_equipments: usize,

    /// GS1 prefix leading every generated serial.
    pub serial_prefix: String,

    /// Size of the serial batch generated at startup.
    pub serial_count: usize,

    /// Probability that a cycle produces a defective cell (consuming no
    /// serial number).
    pub defect_probability: f64,

    /// Mean of the normal distribution the per-cycle wait is drawn from,
    /// in seconds.
    pub wait_mean_seconds: f64,

    /// Spread of the per-cycle wait, in seconds.
    pub wait_stddev_seconds: f64,

    /// Seed for the per-equipment random streams.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_equipments: DEFAULT_NUM_EQUIPMENTS,
            serial_prefix: DEFAULT_SERIAL_PREFIX.to_string(),
            serial_count: DEFAULT_SERIAL_COUNT,
            defect_probability: DEFAULT_DEFECT_PROBABILITY,
            wait_mean_seconds: DEFAULT_WAIT_MEAN_SECONDS,
            wait_stddev_seconds: DEFAULT_WAIT_STDDEV_SECONDS,
            seed: DEFAULT_SEED,
        }
    }
}

impl SimConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_num_equipments(mut self, num_equipments: usize) -> Self {
        self.num_equipments = num_equipments;
        self
    }

    pub fn with_serial_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.serial_prefix = prefix.into();
        self
    }

    pub fn with_serial_count(mut self, count: usize) -> Self {
        self.serial_count = count;
        self
    }

    pub fn with_defect_probability(mut self, probability: f64) -> Self {
        self.defect_probability = probability;
        self
    }

    pub fn with_wait(mut self, mean_seconds: f64, stddev_seconds: f64) -> Self {
        self.wait_mean_seconds = mean_seconds;
        self.wait_stddev_seconds = stddev_seconds;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fail fast on parameters no cycle should ever run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_equipments == 0 {
            return Err(ConfigError::ZeroEquipments);
        }

        if self.serial_prefix.is_empty()
            || !self.serial_prefix.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(ConfigError::InvalidPrefix(self.serial_prefix.clone()));
        }

        if self.serial_count > MAX_BATCH_SIZE {
            return Err(ConfigError::SerialCountTooLarge(self.serial_count));
        }

        if !self.defect_probability.is_finite()
            || !(0.0..=1.0).contains(&self.defect_probability)
        {
            return Err(ConfigError::DefectProbabilityOutOfRange(self.defect_probability));
        }

        if !self.wait_mean_seconds.is_finite()
            || !self.wait_stddev_seconds.is_finite()
            || self.wait_stddev_seconds < 0.0
        {
            return Err(ConfigError::InvalidWaitDistribution {
                mean: self.wait_mean_seconds,
                stddev: self.wait_stddev_seconds,
            });
        }

        Ok(())
    }
}
