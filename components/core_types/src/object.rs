//! Object and array storage for the native object model.

use crate::{JsFunction, Value};

/// Insertion-ordered property storage.
///
/// Objects produced by evaluated code are small, so a vector with linear
/// lookup keeps key order without a hashing dependency.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyMap {
    entries: Vec<(String, Value)>,
}

impl PropertyMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Inserts or overwrites `key`, keeping the original position of an
    /// existing key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Removes `key`, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Returns true if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map has no properties.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Value)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut map = PropertyMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// A plain object.
#[derive(Debug, Clone, Default)]
pub struct JsObject {
    /// Own properties in insertion order
    pub properties: PropertyMap,
    /// Constructor that created this object, used by `instanceof`
    pub constructor: Option<JsFunction>,
}

impl JsObject {
    /// Creates an empty object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an object from existing properties.
    pub fn from_properties(properties: PropertyMap) -> Self {
        JsObject {
            properties,
            constructor: None,
        }
    }
}

/// An array with dense elements.
///
/// `properties` holds non-index keys, such as the `raw` strings attached to
/// the array passed to a template tag.
#[derive(Debug, Clone, Default)]
pub struct JsArray {
    /// Indexed elements
    pub elements: Vec<Value>,
    /// Named (non-index) properties
    pub properties: PropertyMap,
}

impl JsArray {
    /// Creates an array from elements.
    pub fn from_elements(elements: Vec<Value>) -> Self {
        JsArray {
            elements,
            properties: PropertyMap::new(),
        }
    }
}
