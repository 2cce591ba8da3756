use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Number of tags every equipment unit exposes.
pub const MAX_TAGS: usize = 8;

static_assertions::const_assert_eq!(TagName::ALL.len(), MAX_TAGS);

/// The fixed set of tag names an equipment unit publishes.
///
/// `SN` carries the integer serial number (0 for a defective cell); the
/// remaining tags carry floating-point sensor readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagName {
    Sn,
    Temperature,
    Pressure,
    Torque,
    Humidity,
    Light,
    Voltage,
    Watts,
}

impl TagName {
    pub const ALL: [TagName; 8] = [
        TagName::Sn,
        TagName::Temperature,
        TagName::Pressure,
        TagName::Torque,
        TagName::Humidity,
        TagName::Light,
        TagName::Voltage,
        TagName::Watts,
    ];

    /// Wire name as exposed to the data-access layer.
    pub fn as_str(self) -> &'static str {
        match self {
            TagName::Sn => "SN",
            TagName::Temperature => "Temperature",
            TagName::Pressure => "Pressure",
            TagName::Torque => "Torque",
            TagName::Humidity => "Humidity",
            TagName::Light => "Light",
            TagName::Voltage => "Voltage",
            TagName::Watts => "Watts",
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self, TagName::Sn)
    }

    /// Initial value written when the tag is created.
    pub fn initial_value(self) -> TagValue {
        if self.is_integer() {
            TagValue::Int(0)
        } else {
            TagValue::Float(0.0)
        }
    }
}

impl core::fmt::Display for TagName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value held by a tag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Int(u64),
    Float(f64),
}

/// Opaque handle to one tag slot in the data-access layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagHandle(u32);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagServerError {
    #[error("tag {tag} already registered for {equipment}")]
    DuplicateTag { equipment: String, tag: TagName },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WriteError {
    #[error("write to unknown tag handle {0:?}")]
    UnknownHandle(TagHandle),
    #[error("data-access layer rejected the write")]
    Rejected,
}

/// Capabilities the engine consumes from the external data-access layer.
///
/// Implementations are shared across concurrently running equipment cycles
/// and must synchronize internally. The core never retries a failed write;
/// retry policy belongs to the transport behind this seam.
pub trait TagServer: Send + Sync {
    /// Register one tag slot for an equipment unit. Called once per tag at
    /// startup.
    fn create_tag(
        &self,
        equipment: &str,
        tag: TagName,
        initial: TagValue,
    ) -> Result<TagHandle, TagServerError>;

    /// Overwrite a tag's live value. Called once per tag per publish step.
    fn write_tag(&self, handle: TagHandle, value: TagValue) -> Result<(), WriteError>;
}

/// One registered tag slot, as reported by [`InMemoryTagServer::snapshot`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagSnapshot {
    pub equipment: String,
    pub tag: TagName,
    pub value: TagValue,
}

#[derive(Debug, Default)]
struct TagStore {
    slots: Vec<TagSnapshot>,
}

/// Process-local [`TagServer`] backing the demo binary and the test suites.
#[derive(Debug, Default)]
pub struct InMemoryTagServer {
    store: Mutex<TagStore>,
}

impl InMemoryTagServer {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> MutexGuard<'_, TagStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current value of one tag, if registered.
    pub fn value(&self, equipment: &str, tag: TagName) -> Option<TagValue> {
        self.store()
            .slots
            .iter()
            .find(|slot| slot.equipment == equipment && slot.tag == tag)
            .map(|slot| slot.value)
    }

    /// Copy of every registered tag slot, in registration order.
    pub fn snapshot(&self) -> Vec<TagSnapshot> {
        self.store().slots.clone()
    }
}

impl TagServer for InMemoryTagServer {
    fn create_tag(
        &self,
        equipment: &str,
        tag: TagName,
        initial: TagValue,
    ) -> Result<TagHandle, TagServerError> {
        let mut store = self.store();

        if store
            .slots
            .iter()
            .any(|slot| slot.equipment == equipment && slot.tag == tag)
        {
            return Err(TagServerError::DuplicateTag {
                equipment: equipment.to_string(),
                tag,
            });
        }

        let handle = TagHandle(store.slots.len() as u32);
        store.slots.push(TagSnapshot {
            equipment: equipment.to_string(),
            tag,
            value: initial,
        });

        Ok(handle)
    }

    fn write_tag(&self, handle: TagHandle, value: TagValue) -> Result<(), WriteError> {
        let mut store = self.store();
        let slot = store
            .slots
            .get_mut(handle.0 as usize)
            .ok_or(WriteError::UnknownHandle(handle))?;

        slot.value = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_names_match_wire_format() {
        let names: Vec<&str> = TagName::ALL.iter().map(|t| t.as_str()).collect();
        assert_eq!(
            names,
            vec!["SN", "Temperature", "Pressure", "Torque", "Humidity", "Light", "Voltage", "Watts"]
        );
    }

    #[test]
    fn test_only_sn_is_integer() {
        for tag in TagName::ALL {
            assert_eq!(tag.is_integer(), tag == TagName::Sn);
        }
        assert_eq!(TagName::Sn.initial_value(), TagValue::Int(0));
        assert_eq!(TagName::Voltage.initial_value(), TagValue::Float(0.0));
    }

    #[test]
    fn test_in_memory_server_create_and_write() {
        let server = InMemoryTagServer::new();
        let handle = server
            .create_tag("Equipment_1", TagName::Temperature, TagValue::Float(0.0))
            .unwrap();

        server.write_tag(handle, TagValue::Float(25.5)).unwrap();
        assert_eq!(
            server.value("Equipment_1", TagName::Temperature),
            Some(TagValue::Float(25.5))
        );
    }

    #[test]
    fn test_duplicate_tag_rejected() {
        let server = InMemoryTagServer::new();
        server
            .create_tag("Equipment_1", TagName::Sn, TagValue::Int(0))
            .unwrap();

        let duplicate = server.create_tag("Equipment_1", TagName::Sn, TagValue::Int(0));
        assert!(matches!(duplicate, Err(TagServerError::DuplicateTag { .. })));
    }

    #[test]
    fn test_unknown_handle_rejected() {
        let server = InMemoryTagServer::new();
        let bogus = TagHandle(99);
        assert_eq!(
            server.write_tag(bogus, TagValue::Int(1)),
            Err(WriteError::UnknownHandle(bogus))
        );
    }
}
