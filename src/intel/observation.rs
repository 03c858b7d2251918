//! Per-tick observation handed in by the game bridge
//!
//! An observation is a loose key/value mapping. Readers use the typed
//! accessors, which return `None` for absent keys and for values of the
//! wrong shape so callers can fall back to a default.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Raw named values for one game tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Observation {
    values: BTreeMap<String, Value>,
}

impl Observation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Any finite JSON number
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key)?.as_f64().filter(|v| v.is_finite())
    }

    /// Non-negative count; fractional values are truncated
    pub fn count(&self, key: &str) -> Option<u32> {
        let value = self.get(key)?;
        if let Some(n) = value.as_u64() {
            return u32::try_from(n).ok();
        }
        let n = value.as_f64()?;
        if n.is_finite() && n >= 0.0 && n <= f64::from(u32::MAX) {
            Some(n as u32)
        } else {
            None
        }
    }

    /// Boolean flag; numbers and strings are not coerced
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.get(key)?.as_bool()
    }
}

impl From<BTreeMap<String, Value>> for Observation {
    fn from(values: BTreeMap<String, Value>) -> Self {
        Self { values }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Observation {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut obs = Observation::new();
        for (k, v) in iter {
            obs.insert(k, v);
        }
        obs
    }
}
