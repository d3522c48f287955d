use crate::{expr::Slot, value::Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The values a predicate closed over at its definition site, keyed by slot.
///
/// Supplied once per compile call and read-only for its duration. The
/// compiler threads a shared reference through every recursive call, so
/// concurrent compiles never observe each other's environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedEnv {
    values: HashMap<Slot, Value>,
}

impl CapturedEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capture(&mut self, slot: Slot, value: impl Into<Value>) {
        self.values.insert(slot, value.into());
    }

    /// Builder form of [`capture`](Self::capture).
    pub fn with(mut self, slot: u32, value: impl Into<Value>) -> Self {
        self.capture(Slot(slot), value);
        self
    }

    pub fn get(&self, slot: Slot) -> Option<&Value> {
        self.values.get(&slot)
    }

    pub fn contains(&self, slot: Slot) -> bool {
        self.values.contains_key(&slot)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
