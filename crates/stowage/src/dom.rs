// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generic document object model.
//!
//! A [`Node`] is undefined, a scalar [`Value`], an object (name -> node) or
//! an array (ordered nodes plus an item tag). Nodes are permissive cargos:
//! any incoming name is accepted, and a name seen twice turns its member
//! into an array. Foreign documents can therefore be read without a
//! matching object model.
//!
//! # Example
//!
//! ```rust
//! use stowage::{Node, Value};
//!
//! let doc = Node::object()
//!     .with("a", 1i64)
//!     .with("b", Node::array(vec![Node::from(true), Node::from(false)]))
//!     .with("c", Node::object().with("d", "hello"));
//!
//! assert_eq!(doc.get("c").and_then(|c| c.get("d")), Some(&Node::from("hello")));
//! assert_eq!(doc.get("b").map(Node::len), Some(2));
//! ```

use crate::cargo::{item_at_mut, AsCargo, Cargo, CargoType};
use crate::inventory::{Entry, Identity, Inventory, Role};
use crate::value::{Value, ValueKind};
use std::collections::BTreeMap;

/// Item tag used for arrays when none is given.
pub const DEFAULT_ITEM_TAG: &str = "item";

/// Self-describing tree node.
#[derive(Debug, Clone, Default)]
pub enum Node {
    #[default]
    Undefined,
    Value(Value),
    Object(BTreeMap<String, Node>),
    Array {
        items: Vec<Node>,
        item_tag: String,
    },
}

impl Node {
    /// Empty object.
    pub fn object() -> Self {
        Node::Object(BTreeMap::new())
    }

    /// Array with the default item tag.
    pub fn array(items: Vec<Node>) -> Self {
        Self::array_tagged(items, DEFAULT_ITEM_TAG)
    }

    pub fn array_tagged(items: Vec<Node>, item_tag: impl Into<String>) -> Self {
        Node::Array {
            items,
            item_tag: item_tag.into(),
        }
    }

    /// Explicit null.
    pub fn null() -> Self {
        Node::Value(Value::null())
    }

    /// Builder: set an object member (an undefined node becomes an object).
    pub fn with(mut self, name: impl Into<String>, node: impl Into<Node>) -> Self {
        self.insert(name, node);
        self
    }

    /// Set an object member; ignored unless the node is an object or undefined.
    pub fn insert(&mut self, name: impl Into<String>, node: impl Into<Node>) {
        if matches!(self, Node::Undefined) {
            *self = Node::object();
        }
        if let Node::Object(members) = self {
            members.insert(name.into(), node.into());
        }
    }

    /// Append an array item (an undefined node becomes an array).
    pub fn push(&mut self, node: impl Into<Node>) {
        if matches!(self, Node::Undefined) {
            *self = Node::array(Vec::new());
        }
        if let Node::Array { items, .. } = self {
            items.push(node.into());
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Node::Undefined)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Node::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Node::Object(members) => Some(members),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Node::Array { items, .. } => Some(items),
            _ => None,
        }
    }

    pub fn item_tag(&self) -> Option<&str> {
        match self {
            Node::Array { item_tag, .. } => Some(item_tag),
            _ => None,
        }
    }

    /// Object member by name.
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.as_object()?.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Node> {
        match self {
            Node::Object(members) => members.get_mut(name),
            _ => None,
        }
    }

    /// Array item by position.
    pub fn at(&self, index: usize) -> Option<&Node> {
        self.as_array()?.get(index)
    }

    /// Members of an object or items of an array; 0 otherwise.
    pub fn len(&self) -> usize {
        match self {
            Node::Object(members) => members.len(),
            Node::Array { items, .. } => items.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn member_entry(name: &str, node: &Node, index: usize) -> Entry {
        let entry = Entry::element(name).with_index(index as i32);
        match node {
            // An empty array has no instances to repeat; it goes out whole.
            Node::Array { items, .. } if !items.is_empty() => entry.repeating(items.len()),
            _ => entry,
        }
    }
}

impl PartialEq for Node {
    /// Item tags do not take part in equality.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Undefined, Node::Undefined) => true,
            (Node::Value(a), Node::Value(b)) => a == b,
            (Node::Object(a), Node::Object(b)) => a == b,
            (Node::Array { items: a, .. }, Node::Array { items: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Node::Value(value)
    }
}

macro_rules! impl_node_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Node {
                fn from(v: $ty) -> Self {
                    Node::Value(Value::from(v))
                }
            }
        )*
    };
}

impl_node_from!(bool, i32, i64, u32, f64, String, &str);

impl Cargo for Node {
    fn cargo_type(&self) -> CargoType {
        match self {
            Node::Value(v) if v.kind() != ValueKind::Null => CargoType::of_kind(v.kind()),
            Node::Value(_) => CargoType::Text,
            _ => CargoType::Package,
        }
    }

    fn is_null(&self) -> bool {
        match self {
            Node::Undefined => true,
            Node::Value(v) => v.is_null(),
            _ => false,
        }
    }

    fn write(&self) -> Option<String> {
        self.as_value()?.write()
    }

    fn read(&mut self, text: &str) -> bool {
        match self {
            Node::Value(v) if v.kind() != ValueKind::Null && v.is_good() => v.read(text),
            _ => {
                *self = Node::Value(Value::from(text));
                true
            }
        }
    }

    fn write_setting(&self) -> Option<Value> {
        self.as_value().filter(|v| !v.is_undefined()).cloned()
    }

    fn read_setting(&mut self, value: &Value) -> bool {
        *self = Node::Value(value.clone());
        true
    }

    fn fill_inventory(&self, inventory: &mut Inventory) -> bool {
        match self {
            Node::Value(_) => return false,
            Node::Undefined => {}
            Node::Object(members) => {
                for (index, (name, node)) in members.iter().enumerate() {
                    inventory.push(Self::member_entry(name, node, index));
                }
            }
            Node::Array { items, item_tag } => {
                inventory.push(Entry::array(item_tag.as_str(), items.len()));
            }
        }
        inventory.set_every_item_accepted(true);
        true
    }

    fn get_cargo(&self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        let node = match self {
            Node::Object(members) => match members.get(entry.name())? {
                Node::Array { items, .. } if entry.is_repeating() => items.get(entry.available)?,
                member => member,
            },
            Node::Array { items, .. } => items.get(entry.available)?,
            _ => return None,
        };
        Some(node.as_cargo())
    }

    fn get_cargo_mut(&mut self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        let node = match self {
            Node::Object(members) => match members.get_mut(entry.name())? {
                Node::Array { items, .. } => item_at_mut(items, entry.available)?,
                member => member,
            },
            Node::Array { items, .. } => item_at_mut(items, entry.available)?,
            _ => return None,
        };
        Some(node.as_cargo_mut())
    }

    fn set_default(&mut self) {
        match self {
            Node::Undefined => *self = Node::object(),
            Node::Value(v) => v.set_default(),
            Node::Object(members) => members.clear(),
            Node::Array { items, .. } => items.clear(),
        }
    }

    fn clear(&mut self) {
        *self = Node::Undefined;
    }

    fn allocate(
        &mut self,
        inventory: &mut Inventory,
        identity: &Identity,
        enclosing: &Identity,
    ) -> Option<usize> {
        if self.is_undefined() {
            *self = Node::object();
        }
        let Node::Object(members) = self else {
            log::debug!(
                "[Node::allocate] '{}' has no members, cannot allocate '{}'",
                enclosing,
                identity
            );
            return None;
        };
        let member = if identity.role == Some(Role::Array) {
            Node::array(Vec::new())
        } else {
            Node::Undefined
        };
        members.insert(identity.name.clone(), member);
        let index = inventory.len() as i32;
        Some(inventory.push(Entry::incoming(identity).with_index(index)))
    }

    fn allocate_array(&mut self, inventory: &mut Inventory, position: Option<usize>) -> bool {
        let Some(position) = position else {
            return match self {
                Node::Array { .. } => true,
                Node::Undefined => {
                    *self = Node::array(Vec::new());
                    true
                }
                Node::Object(members) if members.is_empty() => {
                    *self = Node::array(Vec::new());
                    true
                }
                _ => false,
            };
        };
        let Some(entry) = inventory.entry_mut(position) else {
            return false;
        };
        let Some(member) = self.get_mut(entry.name()) else {
            return false;
        };
        if !matches!(member, Node::Array { .. }) {
            let first = std::mem::take(member);
            *member = Node::array(vec![first]);
        }
        entry.role = Role::Element;
        entry.maximum = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_item_tag() {
        let a = Node::array_tagged(vec![Node::from(1i64)], "point");
        let b = Node::array(vec![Node::from(1i64)]);
        assert_eq!(a, b);
        assert_ne!(Node::object(), Node::array(Vec::new()));
    }

    #[test]
    fn test_object_inventory_flattens_member_arrays() {
        let doc = Node::object()
            .with("a", 1i64)
            .with("b", Node::array(vec![Node::from(true), Node::from(false)]));
        let mut inv = Inventory::new();
        assert!(doc.fill_inventory(&mut inv));
        assert!(inv.is_every_item_accepted());
        let b = inv.entries()[1].clone();
        assert!(b.is_repeating());
        assert_eq!(b.available, 2);
        let second = doc.get_cargo(&b.instance(1)).expect("item");
        assert_eq!(second.write().as_deref(), Some("false"));
        assert_eq!(second.cargo_type(), CargoType::Boolean);
    }

    #[test]
    fn test_empty_member_array_is_one_element() {
        let doc = Node::object().with("a", Node::array(Vec::new()));
        let mut inv = Inventory::new();
        doc.fill_inventory(&mut inv);
        let a = inv.entries()[0].clone();
        assert!(!a.is_repeating());
        assert_eq!(a.available, 1);
        let member = doc.get_cargo(&a.instance(0)).expect("the array itself");
        let mut items = Inventory::new();
        assert!(member.fill_inventory(&mut items));
        assert_eq!(items.entries()[0].role, Role::Array);
        assert_eq!(items.entries()[0].available, 0);
    }

    #[test]
    fn test_array_node_is_bare_sequence() {
        let list = Node::array_tagged(vec![Node::from("x")], "point");
        let mut inv = Inventory::new();
        list.fill_inventory(&mut inv);
        assert_eq!(inv.len(), 1);
        assert_eq!(inv.entries()[0].role, Role::Array);
        assert_eq!(inv.entries()[0].name(), "point");
    }

    #[test]
    fn test_allocate_then_array_conversion() {
        let mut doc = Node::Undefined;
        doc.set_default();
        let mut inv = Inventory::new();
        doc.fill_inventory(&mut inv);

        let x = Identity::new("x");
        let pos = doc.allocate(&mut inv, &x, &Identity::new("root")).expect("slot");
        assert_eq!(inv.len(), 1);
        doc.get_cargo_mut(&inv.entries()[pos].instance(0))
            .expect("x")
            .read("1");
        inv.entry_mut(pos).expect("entry").available = 1;

        assert!(!inv.entries()[pos].has_room());
        assert!(doc.allocate_array(&mut inv, Some(pos)));
        assert!(inv.entries()[pos].has_room());
        doc.get_cargo_mut(&inv.entries()[pos].instance(1))
            .expect("x[1]")
            .read("2");

        let expected = Node::object().with("x", Node::array(vec![Node::from("1"), Node::from("2")]));
        assert_eq!(doc, expected);
    }

    #[test]
    fn test_undefined_becomes_sequence() {
        let mut node = Node::Undefined;
        let mut inv = Inventory::new();
        assert!(node.allocate_array(&mut inv, None));
        assert_eq!(node, Node::array(Vec::new()));
        assert!(!Node::from(1i64).allocate_array(&mut inv, None));
    }

    #[test]
    fn test_read_keeps_typed_values() {
        let mut typed = Node::from(0i64);
        assert!(typed.read("42"));
        assert_eq!(typed, Node::from(42i64));

        let mut loose = Node::Undefined;
        assert!(loose.read("42"));
        assert_eq!(loose.as_value().map(Value::kind), Some(ValueKind::Text));
    }

    #[test]
    fn test_null_reporting() {
        assert!(Node::Undefined.is_null());
        assert!(Node::null().is_null());
        assert!(!Node::object().is_null());
    }
}
