//! Attribute map: (namespace URI, local name) -> (prefix hint, value).
//!
//! Reihenfolge = Einfügereihenfolge (Dokumentreihenfolge beim Parsen), damit
//! Prefix-Vergabe und Ausgabe deterministisch bleiben. Überschreiben behält
//! die ursprüngliche Position.

use std::cmp::Ordering;

use crate::qname::QName;
use crate::FastIndexMap;

/// An attribute value plus the prefix it was (or should preferably be) written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrValue {
    /// Advisory prefix for output. Not part of equality in [`AttributeMap::cmp_values`].
    pub prefix_hint: String,
    /// The attribute value.
    pub value: String,
}

impl AttrValue {
    /// Erstellt einen neuen Attributwert.
    pub fn new(prefix_hint: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            prefix_hint: prefix_hint.into(),
            value: value.into(),
        }
    }
}

/// Ordered attribute map with unique keys.
#[derive(Debug, Clone, Default)]
pub struct AttributeMap {
    entries: FastIndexMap<QName, AttrValue>,
}

impl AttributeMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites; returns the previous value.
    pub fn insert(&mut self, name: QName, value: AttrValue) -> Option<AttrValue> {
        self.entries.insert(name, value)
    }

    /// Convenience for attributes in no namespace (empty prefix hint).
    pub fn insert_local(&mut self, local_name: &str, value: impl Into<String>) -> Option<AttrValue> {
        self.insert(QName::local(local_name), AttrValue::new("", value))
    }

    /// Entfernt ein Attribut, die Reihenfolge der übrigen bleibt erhalten.
    pub fn remove(&mut self, name: &QName) -> Option<AttrValue> {
        self.entries.shift_remove(name)
    }

    pub fn get(&self, name: &QName) -> Option<&AttrValue> {
        self.entries.get(name)
    }

    /// Looks up the value by namespace and local name.
    pub fn value(&self, uri: &str, local_name: &str) -> Option<&str> {
        // Linearer Scan: kein Rc<str>-Schlüssel nötig.
        self.entries
            .iter()
            .find(|(k, _)| k.is(uri, local_name))
            .map(|(_, v)| v.value.as_str())
    }

    pub fn contains(&self, name: &QName) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&QName, &AttrValue)> {
        self.entries.iter()
    }

    /// Three-way comparison of keys and values, ignoring prefix hints.
    ///
    /// Both maps are compared as sorted key sequences, so insertion order
    /// does not matter; a map that is a strict prefix of the other is less.
    pub fn cmp_values(&self, other: &Self) -> Ordering {
        let mut ours: Vec<_> = self.entries.iter().collect();
        let mut theirs: Vec<_> = other.entries.iter().collect();
        ours.sort_unstable_by(|a, b| a.0.cmp(b.0));
        theirs.sort_unstable_by(|a, b| a.0.cmp(b.0));
        for ((ka, va), (kb, vb)) in ours.iter().zip(theirs.iter()) {
            let ord = ka.cmp(kb).then_with(|| va.value.cmp(&vb.value));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        ours.len().cmp(&theirs.len())
    }
}

impl<'a> IntoIterator for &'a AttributeMap {
    type Item = (&'a QName, &'a AttrValue);
    type IntoIter = indexmap::map::Iter<'a, QName, AttrValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<(QName, AttrValue)> for AttributeMap {
    fn from_iter<T: IntoIterator<Item = (QName, AttrValue)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}
