// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Inventories: the transportable shape of a package.
//!
//! An [`Inventory`] is an ordered list of [`Entry`] slots. Each entry names
//! a scalar, a child package or a repeating group. Transports walk
//! [`Inventory::sequence`], which always yields attributes first and then
//! everything else by `index` (stable).

use crate::value::ValueKind;
use std::fmt;

/// Wire role of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// XML attribute; never repeats.
    Attribute,
    /// Nested element / named member.
    Element,
    /// Sequence of items under an item tag.
    Array,
}

/// Wire label of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Identity {
    /// Name on the wire.
    pub name: String,
    /// Scope for name uniqueness.
    pub group: Option<String>,
    /// Expected role, if the wire form tells.
    pub role: Option<Role>,
    /// Expected scalar kind, if known.
    pub kind: Option<ValueKind>,
}

impl Identity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_kind(mut self, kind: ValueKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Exact `(name, group)` match; role and kind are hints only.
    pub fn same_label(&self, other: &Identity) -> bool {
        self.name == other.name && self.group == other.group
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.group {
            Some(group) => write!(f, "{}:{}", group, self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl From<&str> for Identity {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// One slot of an inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub identity: Identity,
    /// Type tag of the package that declared the entry.
    pub owner: Option<&'static str>,
    /// Stable sort key within the inventory.
    pub index: i32,
    pub role: Role,
    /// Required on export (and on import with `missing_entry_failed`).
    pub required: bool,
    /// Export: instances present. Import: instances read so far, and the
    /// 0-based instance index when passed to `get_cargo_mut`.
    pub available: usize,
    /// `None` means unbounded.
    pub maximum: Option<usize>,
}

impl Entry {
    fn with_role(name: impl Into<String>, role: Role) -> Self {
        Self {
            identity: Identity::new(name).with_role(role),
            owner: None,
            index: 0,
            role,
            required: false,
            available: 1,
            maximum: Some(1),
        }
    }

    /// Single attribute.
    pub fn attribute(name: impl Into<String>) -> Self {
        Self::with_role(name, Role::Attribute)
    }

    /// Single nested element.
    pub fn element(name: impl Into<String>) -> Self {
        Self::with_role(name, Role::Element)
    }

    /// Unbounded item sequence holding `count` instances.
    pub fn array(item_tag: impl Into<String>, count: usize) -> Self {
        Self::with_role(item_tag, Role::Array)
            .with_available(count)
            .with_maximum(None)
    }

    /// Entry for an incoming name, taking its role from the identity hint.
    pub fn incoming(identity: &Identity) -> Self {
        let role = identity.role.unwrap_or(Role::Element);
        let mut entry = Self::with_role(identity.name.clone(), role).with_available(0);
        entry.identity = identity.clone();
        if role == Role::Array {
            entry.maximum = None;
        }
        entry
    }

    pub fn with_index(mut self, index: i32) -> Self {
        self.index = index;
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.identity.group = Some(group.into());
        self
    }

    pub fn with_kind(mut self, kind: ValueKind) -> Self {
        self.identity.kind = Some(kind);
        self
    }

    pub fn with_owner(mut self, owner: &'static str) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Tag the entry with the type name of `T`.
    pub fn owned_by<T: ?Sized>(self) -> Self {
        self.with_owner(std::any::type_name::<T>())
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_available(mut self, available: usize) -> Self {
        self.available = available;
        self
    }

    /// Attributes stay capped at 1 whatever is requested.
    pub fn with_maximum(mut self, maximum: Option<usize>) -> Self {
        self.maximum = if self.role == Role::Attribute {
            Some(1)
        } else {
            maximum
        };
        self
    }

    /// Unbounded element holding `count` instances, each written under the
    /// entry's own name.
    pub fn repeating(self, count: usize) -> Self {
        self.with_available(count).with_maximum(None)
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn is_attribute(&self) -> bool {
        self.role == Role::Attribute
    }

    pub fn is_repeating(&self) -> bool {
        self.maximum.map_or(true, |max| max > 1)
    }

    /// Room for another instance.
    pub fn has_room(&self) -> bool {
        self.maximum.map_or(true, |max| self.available < max)
    }

    /// Count one more instance; false when the entry is full.
    pub fn bump_available(&mut self) -> bool {
        if !self.has_room() {
            return false;
        }
        self.available += 1;
        true
    }

    /// Copy addressing instance `index` of this entry.
    pub fn instance(&self, index: usize) -> Entry {
        let mut entry = self.clone();
        entry.available = index;
        entry
    }
}

/// Ordered entries plus the permissive flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    entries: Vec<Entry>,
    every_item_accepted: bool,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inventory accepting unknown incoming names.
    pub fn permissive() -> Self {
        Self {
            entries: Vec::new(),
            every_item_accepted: true,
        }
    }

    pub fn is_every_item_accepted(&self) -> bool {
        self.every_item_accepted
    }

    pub fn set_every_item_accepted(&mut self, accepted: bool) {
        self.every_item_accepted = accepted;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entry(&self, position: usize) -> Option<&Entry> {
        self.entries.get(position)
    }

    pub fn entry_mut(&mut self, position: usize) -> Option<&mut Entry> {
        self.entries.get_mut(position)
    }

    /// Append an entry; returns its position.
    pub fn push(&mut self, entry: Entry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    /// Append every entry of `other`.
    pub fn merge(&mut self, other: Inventory) {
        self.every_item_accepted |= other.every_item_accepted;
        self.entries.extend(other.entries);
    }

    /// Positions in serialisation order: attributes first, then by index.
    pub fn sequence(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by_key(|&i| {
            let entry = &self.entries[i];
            (!entry.is_attribute(), entry.index)
        });
        order
    }

    /// Exact `(name, group)` match with an optional owner filter.
    pub fn find(&self, identity: &Identity, owner: Option<&str>) -> Option<usize> {
        self.entries.iter().position(|entry| {
            entry.identity.same_label(identity) && owner.map_or(true, |o| entry.owner == Some(o))
        })
    }

    /// First entry with the given name, whatever its group.
    pub fn find_name(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.identity.name == name)
    }

    /// Existing entry for `identity`, or a fresh one in permissive mode.
    pub fn register_incoming(&mut self, identity: &Identity) -> Option<usize> {
        if let Some(found) = self.find(identity, None) {
            return Some(found);
        }
        if !self.every_item_accepted {
            return None;
        }
        let index = self.entries.iter().map(|e| e.index).max().map_or(0, |i| i + 1);
        Some(self.push(Entry::incoming(identity).with_index(index)))
    }

    /// Zero every count before an import pass.
    pub fn reset_available(&mut self) {
        for entry in &mut self.entries {
            entry.available = 0;
        }
    }

    /// Required entries with no instance read.
    pub fn missing_required(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.required && e.available == 0)
    }
}
