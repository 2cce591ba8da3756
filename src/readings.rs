use crate::tags::{TagName, TagValue};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::Range;

pub const TEMPERATURE_RANGE: Range<f64> = 20.0..30.0;
pub const PRESSURE_RANGE: Range<f64> = 1000.0..1050.0;
pub const TORQUE_RANGE: Range<f64> = 5.0..30.0;
pub const HUMIDITY_RANGE: Range<f64> = 40.0..60.0;
pub const LIGHT_RANGE: Range<f64> = 500.0..1000.0;
pub const VOLTAGE_RANGE: Range<f64> = 110.0..240.0;
pub const WATTS_RANGE: Range<f64> = 50.0..500.0;

/// One cell's worth of published values: the serial number plus six
/// synthetic sensor readings.
///
/// A serial number of 0 marks a defective cell. Bundles are created fresh
/// per update and never retained by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadingBundle {
    pub serial_number: u64,
    pub temperature: f64,
    pub pressure: f64,
    pub torque: f64,
    pub humidity: f64,
    pub light: f64,
    pub voltage: f64,
    pub watts: f64,
}

impl ReadingBundle {
    /// Draw a fresh bundle for the given serial number (or 0 for a
    /// defective cell). Each sensor field is sampled independently and
    /// uniformly from its fixed range.
    pub fn synthesize(rng: &mut impl Rng, serial_number: u64) -> Self {
        Self {
            serial_number,
            temperature: rng.gen_range(TEMPERATURE_RANGE),
            pressure: rng.gen_range(PRESSURE_RANGE),
            torque: rng.gen_range(TORQUE_RANGE),
            humidity: rng.gen_range(HUMIDITY_RANGE),
            light: rng.gen_range(LIGHT_RANGE),
            voltage: rng.gen_range(VOLTAGE_RANGE),
            watts: rng.gen_range(WATTS_RANGE),
        }
    }

    pub fn is_defective(&self) -> bool {
        self.serial_number == 0
    }

    /// Project one field as the value published under `tag`.
    pub fn value(&self, tag: TagName) -> TagValue {
        match tag {
            TagName::Sn => TagValue::Int(self.serial_number),
            TagName::Temperature => TagValue::Float(self.temperature),
            TagName::Pressure => TagValue::Float(self.pressure),
            TagName::Torque => TagValue::Float(self.torque),
            TagName::Humidity => TagValue::Float(self.humidity),
            TagName::Light => TagValue::Float(self.light),
            TagName::Voltage => TagValue::Float(self.voltage),
            TagName::Watts => TagValue::Float(self.watts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_synthesize_passes_serial_through() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let bundle = ReadingBundle::synthesize(&mut rng, 1_230_000_000_006);
        assert_eq!(bundle.serial_number, 1_230_000_000_006);
        assert!(!bundle.is_defective());
    }

    #[test]
    fn test_synthesize_zero_marks_defective() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let bundle = ReadingBundle::synthesize(&mut rng, 0);
        assert_eq!(bundle.serial_number, 0);
        assert!(bundle.is_defective());
    }

    #[test]
    fn test_fields_stay_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..1000 {
            let bundle = ReadingBundle::synthesize(&mut rng, 0);
            assert!(TEMPERATURE_RANGE.contains(&bundle.temperature));
            assert!(PRESSURE_RANGE.contains(&bundle.pressure));
            assert!(TORQUE_RANGE.contains(&bundle.torque));
            assert!(HUMIDITY_RANGE.contains(&bundle.humidity));
            assert!(LIGHT_RANGE.contains(&bundle.light));
            assert!(VOLTAGE_RANGE.contains(&bundle.voltage));
            assert!(WATTS_RANGE.contains(&bundle.watts));
        }
    }

    #[test]
    fn test_seeded_synthesis_is_reproducible() {
        let mut first = ChaCha8Rng::seed_from_u64(99);
        let mut second = ChaCha8Rng::seed_from_u64(99);
        assert_eq!(
            ReadingBundle::synthesize(&mut first, 5),
            ReadingBundle::synthesize(&mut second, 5)
        );
    }

    #[test]
    fn test_value_projection_matches_fields() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let bundle = ReadingBundle::synthesize(&mut rng, 11);

        assert_eq!(bundle.value(TagName::Sn), TagValue::Int(11));
        assert_eq!(bundle.value(TagName::Temperature), TagValue::Float(bundle.temperature));
        assert_eq!(bundle.value(TagName::Watts), TagValue::Float(bundle.watts));
    }
}
