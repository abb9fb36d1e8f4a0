// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Participant identity: an optional name and an optional id.

use crate::cargo::{AsCargo, Cargo};
use crate::guid::Guid;
use crate::inventory::{Entry, Inventory};
use std::fmt;

/// `(name?, id?)` pair labelling settings, events, publishers and subscribers.
///
/// Two idents match by id when both carry one, otherwise by name when both
/// carry one. Anonymous idents never match anything.
#[derive(Debug, Clone, Default)]
pub struct Ident {
    name: Option<String>,
    id: Option<Guid>,
}

impl Ident {
    /// Ident with neither name nor id.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Name-only ident.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            id: None,
        }
    }

    /// Id-only ident.
    pub fn with_id(id: Guid) -> Self {
        Self {
            name: None,
            id: Some(id),
        }
    }

    /// Ident carrying both.
    pub fn new(name: impl Into<String>, id: Guid) -> Self {
        Self {
            name: Some(name.into()),
            id: Some(id),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn id(&self) -> Option<Guid> {
        self.id
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn set_id(&mut self, id: Guid) {
        self.id = Some(id);
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_none() && self.id.is_none()
    }
}

impl PartialEq for Ident {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            _ => match (&self.name, &other.name) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, &self.id) {
            (Some(name), Some(id)) => write!(f, "{}#{}", name, id),
            (Some(name), None) => f.write_str(name),
            (None, Some(id)) => write!(f, "#{}", id),
            (None, None) => f.write_str("<anonymous>"),
        }
    }
}

impl From<&str> for Ident {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

/// Optional `name` / `id` attributes; absent parts are not written.
impl Cargo for Ident {
    fn fill_inventory(&self, inventory: &mut Inventory) -> bool {
        inventory.push(
            Entry::attribute("name")
                .owned_by::<Self>()
                .with_index(-3)
                .with_available(usize::from(self.name.is_some())),
        );
        inventory.push(
            Entry::attribute("id")
                .owned_by::<Self>()
                .with_index(-2)
                .with_available(usize::from(self.id.is_some())),
        );
        true
    }

    fn get_cargo(&self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        match entry.name() {
            "name" => self.name.as_ref().map(AsCargo::as_cargo),
            "id" => self.id.as_ref().map(AsCargo::as_cargo),
            _ => None,
        }
    }

    fn get_cargo_mut(&mut self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        match entry.name() {
            "name" => Some(self.name.get_or_insert_with(String::new).as_cargo_mut()),
            "id" => Some(self.id.get_or_insert_with(Guid::nil).as_cargo_mut()),
            _ => None,
        }
    }

    fn set_default(&mut self) {
        self.name = None;
        self.id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_takes_precedence() {
        let id = Guid::from_int(7);
        assert_eq!(Ident::new("a", id), Ident::new("b", id));
        assert_ne!(Ident::new("a", id), Ident::new("a", Guid::from_int(8)));
    }

    #[test]
    fn test_name_fallback() {
        assert_eq!(Ident::named("digit"), Ident::new("digit", Guid::from_int(1)));
        assert_ne!(Ident::named("digit"), Ident::named("operation"));
    }

    #[test]
    fn test_anonymous_never_matches() {
        assert_ne!(Ident::anonymous(), Ident::anonymous());
        assert_ne!(Ident::anonymous(), Ident::named("x"));
    }
}
