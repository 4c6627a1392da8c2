// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The VM heap: address-keyed objects, created by `NEW_OBJECT`, `NEW_ARRAY`,
//! constructor dispatch, or lazy materialization on field/index access.
//! Objects are never freed during a run (spec `§3`, Lifecycles).

#[cfg(test)]
mod heap_test;

use crate::value::{Address, Value};
use std::collections::HashMap;

/// A heap object: a type hint (`"list"`, `"dict"`, or a class name) plus a
/// field-or-index keyed map of values.
#[derive(Debug, Clone, Default)]
pub struct HeapObject {
    pub type_hint: String,
    pub fields: HashMap<String, Value>,
}

impl HeapObject {
    #[must_use]
    pub fn new(type_hint: impl Into<String>) -> Self {
        Self {
            type_hint: type_hint.into(),
            fields: HashMap::new(),
        }
    }
}

/// Address-indexed store of [`HeapObject`]s.
#[derive(Debug, Clone, Default)]
pub struct Heap {
    objects: HashMap<Address, HeapObject>,
}

impl Heap {
    #[must_use]
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
        }
    }

    pub fn insert(&mut self, addr: Address, object: HeapObject) {
        self.objects.insert(addr, object);
    }

    #[must_use]
    pub fn get(&self, addr: Address) -> Option<&HeapObject> {
        self.objects.get(&addr)
    }

    pub fn get_mut(&mut self, addr: Address) -> Option<&mut HeapObject> {
        self.objects.get_mut(&addr)
    }

    #[must_use]
    pub fn contains(&self, addr: Address) -> bool {
        self.objects.contains_key(&addr)
    }

    /// Materialize a synthetic heap object at `addr` if none exists yet.
    /// Returns a mutable reference to the (possibly just-created) object.
    pub fn materialize(&mut self, addr: Address, type_hint: impl Into<String>) -> &mut HeapObject {
        self.objects
            .entry(addr)
            .or_insert_with(|| HeapObject::new(type_hint))
    }

    /// All heap entries, for snapshotting (oracle interface) or diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &HeapObject)> {
        self.objects.iter()
    }
}
