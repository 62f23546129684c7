//! Single-slot key/value buffer holding the current trial's fields.

use indexmap::IndexMap;

use crate::error::{ModelError, Result};
use crate::simulation::data::Value;

/// A latest-value store overwritten wholesale on every push.
///
/// Keys absent from the most recent push are not retrievable: there is no
/// merge with earlier trials.
#[derive(Debug, Clone, Default)]
pub struct MemoryBuffer {
    slots: IndexMap<String, Value>,
}

impl MemoryBuffer {
    /// Creates a new empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the buffer's contents with the given fields.
    pub fn push<K, V, I>(&mut self, fields: I)
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.clear();
        self.slots
            .extend(fields.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    /// Empties the buffer.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Reads one value.
    ///
    /// # Errors
    /// `MissingKey` when `key` was not part of the last push.
    pub fn get(&self, key: &str) -> Result<&Value> {
        self.slots
            .get(key)
            .ok_or_else(|| ModelError::MissingKey(key.to_owned()))
    }

    /// Reads several values in the requested order.
    ///
    /// # Errors
    /// `MissingKey` on the first key that was not part of the last push.
    pub fn sample(&self, keys: &[&str]) -> Result<Vec<&Value>> {
        keys.iter().map(|k| self.get(k)).collect()
    }

    /// Reads one numeric value.
    ///
    /// # Errors
    /// `MissingKey` if absent, `NotNumeric` if it holds text.
    pub fn num(&self, key: &str) -> Result<f64> {
        self.get(key)?
            .as_f64()
            .ok_or_else(|| ModelError::NotNumeric(key.to_owned()))
    }

    /// Reads one text value; a number is rendered as text.
    ///
    /// # Errors
    /// `MissingKey` if absent.
    pub fn text(&self, key: &str) -> Result<String> {
        Ok(self.get(key)?.to_string())
    }

    /// Returns the number of keys currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if nothing has been pushed since the last clear.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
