use crate::allocator::{Exhausted, SerialAllocator};
use crate::readings::ReadingBundle;
use crate::serial::SerialNumber;
use crate::tags::{TagHandle, TagName, TagServer, TagServerError, MAX_TAGS};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal, NormalError};
use std::time::Duration;
use tracing::{error, info, warn};

/// Tag handles held by one unit, paired with their wire names.
pub type TagHandleSet = heapless::Vec<(TagName, TagHandle), MAX_TAGS>;

/// A named piece of line equipment and its tag slots in the data-access
/// layer. Handles are created once at startup and immutable afterwards.
#[derive(Debug)]
pub struct EquipmentUnit {
    name: String,
    tags: TagHandleSet,
}

impl EquipmentUnit {
    /// Register the unit's tags with the data-access layer. Units are
    /// 1-based: index 0 becomes `Equipment_1`.
    pub fn new<S>(server: &S, index: usize) -> Result<Self, TagServerError>
    where
        S: TagServer + ?Sized,
    {
        let name = format!("Equipment_{}", index + 1);
        let mut tags = TagHandleSet::new();

        for tag in TagName::ALL {
            let handle = server.create_tag(&name, tag, tag.initial_value())?;
            // Capacity equals the tag list length, checked at compile time.
            let _ = tags.push((tag, handle));
        }

        Ok(Self { name, tags })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &[(TagName, TagHandle)] {
        &self.tags
    }

    /// Write every tag in the bundle. A failed write is logged and skipped;
    /// the remaining tags are still written. Returns the failure count.
    pub fn publish<S>(&self, server: &S, bundle: &ReadingBundle) -> usize
    where
        S: TagServer + ?Sized,
    {
        let mut failures = 0;

        for &(tag, handle) in self.tags.iter() {
            if let Err(e) = server.write_tag(handle, bundle.value(tag)) {
                warn!(equipment = %self.name, %tag, error = %e, "tag write failed");
                failures += 1;
            }
        }

        failures
    }
}

/// Result of one pass through an equipment cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A serialized cell was produced and published.
    Produced(SerialNumber),
    /// The cycle was defective (by chance or pool exhaustion); SN 0 was
    /// published and no serial number was consumed.
    Defective,
}

impl CycleOutcome {
    /// Serial value as published under the `SN` tag (0 when defective).
    pub fn serial(self) -> u64 {
        match self {
            CycleOutcome::Produced(serial) => serial.value(),
            CycleOutcome::Defective => 0,
        }
    }

    pub fn is_defective(self) -> bool {
        matches!(self, CycleOutcome::Defective)
    }
}

/// One equipment unit's repeating production cycle:
/// wait → allocate → synthesize → publish.
#[derive(Debug)]
pub struct EquipmentCycle {
    unit: EquipmentUnit,
    rng: ChaCha8Rng,
    wait: Normal<f64>,
    defect_probability: f64,
}

impl EquipmentCycle {
    pub fn new(
        unit: EquipmentUnit,
        defect_probability: f64,
        wait_mean_seconds: f64,
        wait_stddev_seconds: f64,
        seed: u64,
    ) -> Result<Self, NormalError> {
        Ok(Self {
            unit,
            rng: ChaCha8Rng::seed_from_u64(seed),
            wait: Normal::new(wait_mean_seconds, wait_stddev_seconds)?,
            defect_probability,
        })
    }

    pub fn name(&self) -> &str {
        self.unit.name()
    }

    /// Negative draws fold over to positive delays, so the occasional
    /// far-tail sample shows up as a long stall rather than a panic.
    fn draw_wait(&mut self) -> Duration {
        Duration::from_secs_f64(self.wait.sample(&mut self.rng).abs())
    }

    /// Run a single pass of the cycle.
    ///
    /// The randomized wait happens before allocation; no allocator state is
    /// held across a suspension point. A defective draw consumes no serial,
    /// and an exhausted pool degrades to the defective path rather than
    /// failing the cycle.
    pub async fn run_once<S>(&mut self, allocator: &SerialAllocator, server: &S) -> CycleOutcome
    where
        S: TagServer + ?Sized,
    {
        tokio::time::sleep(self.draw_wait()).await;

        let outcome = if self.rng.gen::<f64>() > self.defect_probability {
            match allocator.allocate_one() {
                Ok(serial) => CycleOutcome::Produced(serial),
                Err(Exhausted) => CycleOutcome::Defective,
            }
        } else {
            CycleOutcome::Defective
        };

        let bundle = ReadingBundle::synthesize(&mut self.rng, outcome.serial());
        self.unit.publish(server, &bundle);

        match outcome {
            CycleOutcome::Produced(serial) => {
                info!(equipment = %self.unit.name(), %serial, "cell created");
            }
            CycleOutcome::Defective => {
                error!(equipment = %self.unit.name(), "faulty cell created");
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::{InMemoryTagServer, TagValue};

    #[test]
    fn test_unit_registers_all_tags() {
        let server = InMemoryTagServer::new();
        let unit = EquipmentUnit::new(&server, 0).unwrap();

        assert_eq!(unit.name(), "Equipment_1");
        assert_eq!(unit.tags().len(), MAX_TAGS);
        assert_eq!(server.value("Equipment_1", TagName::Sn), Some(TagValue::Int(0)));
        assert_eq!(
            server.value("Equipment_1", TagName::Pressure),
            Some(TagValue::Float(0.0))
        );
    }

    #[test]
    fn test_unit_naming_is_one_based() {
        let server = InMemoryTagServer::new();
        let unit = EquipmentUnit::new(&server, 3).unwrap();
        assert_eq!(unit.name(), "Equipment_4");
    }

    #[test]
    fn test_publish_writes_every_tag() {
        let server = InMemoryTagServer::new();
        let unit = EquipmentUnit::new(&server, 0).unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let bundle = ReadingBundle::synthesize(&mut rng, 42);

        let failures = unit.publish(&server, &bundle);
        assert_eq!(failures, 0);
        assert_eq!(server.value("Equipment_1", TagName::Sn), Some(TagValue::Int(42)));
        assert_eq!(
            server.value("Equipment_1", TagName::Temperature),
            Some(TagValue::Float(bundle.temperature))
        );
    }

    #[test]
    fn test_outcome_serial_projection() {
        assert_eq!(CycleOutcome::Defective.serial(), 0);
        assert!(CycleOutcome::Defective.is_defective());
    }

    #[test]
    fn test_negative_stddev_rejected() {
        let server = InMemoryTagServer::new();
        let unit = EquipmentUnit::new(&server, 0).unwrap();
        assert!(EquipmentCycle::new(unit, 0.05, 1.0, -1.0, 0).is_err());
    }
}
