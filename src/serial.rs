use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Width of the zero-padded sequence portion of a serial number.
pub const SEQUENCE_WIDTH: usize = 9;

/// Largest batch a single prefix can serialize without widening the
/// sequence portion past [`SEQUENCE_WIDTH`] digits.
pub const MAX_BATCH_SIZE: usize = 10_usize.pow(SEQUENCE_WIDTH as u32);

/// A GS1-style serial number: `prefix ‖ zero-padded sequence ‖ check digit`,
/// stored in its composed decimal form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerialNumber(u64);

impl SerialNumber {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerialError {
    #[error("serial prefix `{0}` must be non-empty and numeric")]
    InvalidPrefix(String),
    #[error("serial prefix `{0}` is too long to compose a 64-bit serial")]
    PrefixTooLong(String),
    #[error("batch size {0} exceeds what a zero-padded sequence can carry")]
    BatchTooLarge(usize),
}

/// Compute the GS1 check digit over `prefix ‖ sequence`.
///
/// Positions are weighted left to right: 3 at even indices, 1 at odd
/// (0-based), summed as `digit * weight`; the check digit is
/// `(10 - (sum % 10)) % 10`. Both inputs must be ASCII-digit strings.
pub fn check_digit(prefix: &str, sequence: &str) -> u8 {
    let mut total: u32 = 0;

    for (i, byte) in prefix.bytes().chain(sequence.bytes()).enumerate() {
        debug_assert!(byte.is_ascii_digit(), "non-digit byte {byte:#x} in serial data");
        let digit = u32::from(byte.wrapping_sub(b'0'));
        let weight = if i % 2 == 0 { 3 } else { 1 };
        total += digit * weight;
    }

    ((10 - (total % 10)) % 10) as u8
}

/// An ordered, finite batch of serial numbers for one prefix.
///
/// Generation is a pure function of `(prefix, count)`: two calls with the
/// same arguments yield identical batches. The batch itself is immutable;
/// consumable hand-out is the allocator's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialBatch {
    serials: Vec<SerialNumber>,
}

impl SerialBatch {
    /// Generate serials for sequence indices `0..count`.
    pub fn generate(prefix: &str, count: usize) -> Result<Self, SerialError> {
        if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SerialError::InvalidPrefix(prefix.to_string()));
        }
        if count > MAX_BATCH_SIZE {
            return Err(SerialError::BatchTooLarge(count));
        }

        let prefix_value: u64 = prefix
            .parse()
            .map_err(|_| SerialError::PrefixTooLong(prefix.to_string()))?;

        // Shift the prefix left past the sequence digits and the check digit,
        // then verify the largest composed serial still fits in 64 bits.
        let span = 10u64.pow(SEQUENCE_WIDTH as u32 + 1);
        let shifted = prefix_value
            .checked_mul(span)
            .filter(|s| s.checked_add(span - 1).is_some())
            .ok_or_else(|| SerialError::PrefixTooLong(prefix.to_string()))?;

        let mut serials = Vec::with_capacity(count);
        for index in 0..count {
            let sequence = format!("{index:0width$}", width = SEQUENCE_WIDTH);
            let digit = check_digit(prefix, &sequence);
            serials.push(SerialNumber(shifted + index as u64 * 10 + u64::from(digit)));
        }

        Ok(Self { serials })
    }

    pub fn len(&self) -> usize {
        self.serials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.serials.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<SerialNumber> {
        self.serials.get(index).copied()
    }

    pub fn as_slice(&self) -> &[SerialNumber] {
        &self.serials
    }
}
