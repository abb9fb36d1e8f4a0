// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Polymorphic packages.
//!
//! A field typed `Option<Box<dyn Base>>` may hold any registered concrete
//! type. On export the [`Mover`] writes one extra attribute (the handler's
//! attribute tag, `type` by default) naming the concrete type; on import it
//! reads that attribute first, builds the concrete object through the
//! [`Handler`], and routes the remaining content into it.
//!
//! # Example
//!
//! ```rust,ignore
//! trait Shape: Polymorphic {}
//!
//! let mut handler: Handler<dyn Shape> = Handler::new();
//! handler.add(&["circle"], || Box::new(Circle::default()));
//! handler.add(&["square", "box"], || Box::new(Square::default()));
//!
//! // <shape type="circle" r="2"/>
//! let mut shape: Option<Box<dyn Shape>> = None;
//! transport.receive(&mut Mover::field(&handler, &mut shape), &"shape".into(), &mut input)?;
//! ```

use crate::cargo::{AsCargo, Cargo, Slot};
use crate::error::TransportError;
use crate::inventory::{Entry, Identity, Inventory};
use crate::value::Value;
use std::any::TypeId;
use std::borrow::Cow;

/// Default wire name of the discriminator attribute.
pub const DEFAULT_ATTRIBUTE_TAG: &str = "type";

/// Owner tag of the discriminator entry.
const MOVER_OWNER: &str = "stowage::Mover";

/// Package whose concrete type is recoverable at runtime.
pub trait Polymorphic: Cargo + 'static {
    /// Concrete type of the object behind a trait object.
    fn type_key(&self) -> TypeId {
        TypeId::of::<Self>()
    }
}

/// Constructor of a registered concrete type.
pub type Factory<B> = fn() -> Box<B>;

struct Registration<B: ?Sized> {
    tags: Vec<String>,
    type_key: TypeId,
    factory: Factory<B>,
}

/// Registry `tag -> (type, factory)`.
pub struct Handler<B: ?Sized> {
    registrations: Vec<Registration<B>>,
    attribute_tag: String,
}

impl<B: ?Sized + Polymorphic> Handler<B> {
    pub fn new() -> Self {
        Self::with_attribute_tag(DEFAULT_ATTRIBUTE_TAG)
    }

    pub fn with_attribute_tag(tag: impl Into<String>) -> Self {
        Self {
            registrations: Vec::new(),
            attribute_tag: tag.into(),
        }
    }

    /// Register one or more tags for the type `factory` builds. The first
    /// tag is the one written on export.
    pub fn add(&mut self, tags: &[&str], factory: Factory<B>) -> &mut Self {
        let type_key = factory().type_key();
        log::debug!("[Handler::add] tags={:?}", tags);
        self.registrations.push(Registration {
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
            type_key,
            factory,
        });
        self
    }

    /// New default instance for `tag`.
    pub fn reconstruct(&self, tag: &str) -> Option<Box<B>> {
        self.registrations
            .iter()
            .find(|r| r.tags.iter().any(|t| t == tag))
            .map(|r| (r.factory)())
    }

    /// Tag written for the concrete type of `object`.
    pub fn find_tag_for(&self, object: &B) -> Option<&str> {
        let key = object.type_key();
        self.registrations
            .iter()
            .find(|r| r.type_key == key)
            .and_then(|r| r.tags.first())
            .map(String::as_str)
    }

    /// Wire name of the discriminator attribute.
    pub fn attribute_tag(&self) -> &str {
        &self.attribute_tag
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

impl<B: ?Sized + Polymorphic> Default for Handler<B> {
    fn default() -> Self {
        Self::new()
    }
}

enum Target<'a, B: ?Sized> {
    /// Owning pointer field: read and write.
    Field(&'a mut Option<Box<B>>),
    /// Existing object: write only.
    Package(Option<&'a B>),
    /// Nothing yet: read only, result kept in the mover.
    Detached,
}

/// Cargo carrying a type discriminator in front of a polymorphic package.
pub struct Mover<'a, B: ?Sized> {
    handler: &'a Handler<B>,
    target: Target<'a, B>,
    tag: String,
    pending: Option<Box<B>>,
    importing: bool,
}

impl<'a, B: ?Sized + Polymorphic> Mover<'a, B> {
    fn with_target(handler: &'a Handler<B>, target: Target<'a, B>) -> Self {
        Self {
            handler,
            target,
            tag: String::new(),
            pending: None,
            importing: false,
        }
    }

    /// Mover over an owning pointer field.
    pub fn field(handler: &'a Handler<B>, field: &'a mut Option<Box<B>>) -> Self {
        Self::with_target(handler, Target::Field(field))
    }

    /// Write-only mover over an existing object.
    pub fn package(handler: &'a Handler<B>, package: &'a B) -> Self {
        Self::with_target(handler, Target::Package(Some(package)))
    }

    /// Write-only mover over a possibly empty field.
    pub fn view(handler: &'a Handler<B>, field: &'a Option<Box<B>>) -> Self {
        Self::with_target(handler, Target::Package(field.as_deref()))
    }

    /// Read-only mover that keeps what it builds; see [`Mover::into_inner`].
    pub fn detached(handler: &'a Handler<B>) -> Self {
        Self::with_target(handler, Target::Detached)
    }

    /// Object built by the last import.
    pub fn into_inner(self) -> Option<Box<B>> {
        self.pending
    }

    /// Discriminator read by the last import.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    fn current(&self) -> Option<&B> {
        if self.importing {
            return self.pending.as_deref();
        }
        match &self.target {
            Target::Field(field) => field.as_deref(),
            Target::Package(package) => *package,
            Target::Detached => self.pending.as_deref(),
        }
    }

    fn is_discriminator(entry: &Entry) -> bool {
        entry.owner == Some(MOVER_OWNER)
    }
}

impl<B: ?Sized + Polymorphic> Cargo for Mover<'_, B> {
    fn is_null(&self) -> bool {
        self.current().is_none() && !self.importing
    }

    fn is_attribute_first(&self) -> bool {
        true
    }

    fn fill_inventory(&self, inventory: &mut Inventory) -> bool {
        inventory.push(
            Entry::attribute(self.handler.attribute_tag())
                .with_owner(MOVER_OWNER)
                .with_index(i32::MIN)
                .required(),
        );
        if let Some(package) = self.current() {
            package.fill_inventory(inventory);
        }
        true
    }

    fn get_cargo(&self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        let package = self.current()?;
        if Self::is_discriminator(entry) {
            let tag = self.handler.find_tag_for(package)?;
            return Some(Box::new(Value::from(tag)));
        }
        package.get_cargo(entry)
    }

    fn get_cargo_mut(&mut self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        if Self::is_discriminator(entry) {
            return Some(self.tag.as_cargo_mut());
        }
        self.pending.as_deref_mut()?.get_cargo_mut(entry)
    }

    fn set_default(&mut self) {
        self.tag.clear();
        self.pending = None;
        self.importing = true;
    }

    fn clear(&mut self) {
        self.set_default();
    }

    fn finalise_attributes(&mut self) -> Result<(), TransportError> {
        let name = self.handler.attribute_tag();
        if self.tag.is_empty() {
            return Err(TransportError::discrimination(format!(
                "missing type attribute '{}'",
                name
            )));
        }
        let Some(mut package) = self.handler.reconstruct(&self.tag) else {
            return Err(TransportError::discrimination(format!(
                "unknown type '{}' in attribute '{}'",
                self.tag, name
            )));
        };
        log::debug!("[Mover::finalise_attributes] constructed '{}'", self.tag);
        package.set_default();
        self.pending = Some(package);
        Ok(())
    }

    fn validate(&mut self) -> bool {
        let Some(package) = self.pending.as_deref_mut() else {
            return false;
        };
        if !package.validate() {
            return false;
        }
        self.importing = false;
        match &mut self.target {
            Target::Field(field) => {
                **field = self.pending.take();
                true
            }
            Target::Package(_) => false,
            Target::Detached => true,
        }
    }

    fn insert(&mut self, entry: &Entry) -> bool {
        if Self::is_discriminator(entry) {
            return true;
        }
        self.pending.as_deref_mut().is_some_and(|p| p.insert(entry))
    }

    fn allocate(
        &mut self,
        inventory: &mut Inventory,
        identity: &Identity,
        enclosing: &Identity,
    ) -> Option<usize> {
        self.pending
            .as_deref_mut()?
            .allocate(inventory, identity, enclosing)
    }

    fn allocate_array(&mut self, inventory: &mut Inventory, position: Option<usize>) -> bool {
        self.pending
            .as_deref_mut()
            .is_some_and(|p| p.allocate_array(inventory, position))
    }

    fn check_export(&self) -> Result<(), TransportError> {
        let Some(package) = self.current() else {
            return Ok(());
        };
        if self.handler.find_tag_for(package).is_none() {
            return Err(TransportError::discrimination("unknown type"));
        }
        package.check_export()
    }
}

/// Ordered container of polymorphic boxes, one [`Mover`] per item.
pub struct MoverList<'a, 't, S, B: ?Sized> {
    handler: &'a Handler<B>,
    slot: S,
    item_tag: Cow<'t, str>,
    pending: Option<Box<B>>,
}

impl<'a, 't, S, B> MoverList<'a, 't, S, B>
where
    S: Slot<Target = Vec<Box<B>>>,
    B: ?Sized + Polymorphic,
{
    pub fn new(handler: &'a Handler<B>, slot: S, item_tag: impl Into<Cow<'t, str>>) -> Self {
        Self {
            handler,
            slot,
            item_tag: item_tag.into(),
            pending: None,
        }
    }
}

impl<S, B> Cargo for MoverList<'_, '_, S, B>
where
    S: Slot<Target = Vec<Box<B>>>,
    B: ?Sized + Polymorphic,
{
    fn fill_inventory(&self, inventory: &mut Inventory) -> bool {
        inventory.push(Entry::array(&*self.item_tag, self.slot.target().len()));
        true
    }

    fn get_cargo(&self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        let item = self.slot.target().get(entry.available)?;
        Some(Box::new(Mover::package(self.handler, &**item)))
    }

    fn get_cargo_mut(&mut self, _entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        self.slot.target_mut()?;
        self.pending = None;
        Some(Box::new(Mover::field(self.handler, &mut self.pending)))
    }

    fn set_default(&mut self) {
        self.clear();
    }

    fn clear(&mut self) {
        self.pending = None;
        if let Some(items) = self.slot.target_mut() {
            items.clear();
        }
    }

    fn insert(&mut self, _entry: &Entry) -> bool {
        let Some(item) = self.pending.take() else {
            return false;
        };
        match self.slot.target_mut() {
            Some(items) => {
                items.push(item);
                true
            }
            None => false,
        }
    }

    fn check_export(&self) -> Result<(), TransportError> {
        for item in self.slot.target() {
            if self.handler.find_tag_for(item).is_none() {
                return Err(TransportError::discrimination("unknown type"));
            }
        }
        Ok(())
    }
}
