// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The Cargo protocol.
//!
//! Anything a transport can walk implements [`Cargo`]. Scalars expose a
//! lexical form (`write` / `read`) and optionally a typed one
//! (`write_setting` / `read_setting`); packages describe their children in
//! an [`Inventory`] and hand out short-lived child handles through
//! `get_cargo` (export) and `get_cargo_mut` (import).
//!
//! # Import lifecycle of a package
//!
//! ```text
//! set_default -> attributes -> [finalise_attributes] -> elements -> validate
//! ```
//!
//! After a child handle from `get_cargo_mut` has been filled and dropped,
//! the transport calls `insert(entry)` on the parent. Containers keep the
//! child they handed out as "pending" and commit it there.
//!
//! # Wrappers
//!
//! | Wrapper | Wraps |
//! |---|---|
//! | [`ValueWrap`] | a native scalar (`i32`, `String`, `Guid`, ...) |
//! | [`PackageWrap`] | any other cargo, by reference |
//! | [`ContainerWrap`] | `Vec<V>` as one item sequence |
//! | [`MapWrap`] | `BTreeMap<K, V>` as a sequence of [`Pair`]s |
//! | [`OptionWrap`] | `Option<T>` (null when empty, built on first import) |
//! | [`CargoHold`] | an owned, optional cargo |
//! | [`Sentinel`] | null item, empty package, or a sink for unknown content |

use crate::error::TransportError;
use crate::inventory::{Entry, Identity, Inventory, Role};
use crate::value::{Scalar, Value, ValueKind};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Classification used by transports that keep scalar types (JSON).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CargoType {
    Text,
    Number,
    Boolean,
    /// Has an inventory of children.
    Package,
}

impl CargoType {
    /// Cargo type matching a value kind.
    pub fn of_kind(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Bool => CargoType::Boolean,
            ValueKind::Int | ValueKind::Float => CargoType::Number,
            _ => CargoType::Text,
        }
    }
}

/// Uniform surface walked by transports.
///
/// Every method has a default so scalars only implement the lexical half
/// and packages only the inventory half.
pub trait Cargo {
    fn cargo_type(&self) -> CargoType {
        CargoType::Package
    }

    fn is_item(&self) -> bool {
        self.cargo_type() != CargoType::Package
    }

    fn is_null(&self) -> bool {
        false
    }

    fn is_root(&self) -> bool {
        false
    }

    /// Attributes must be read, and `finalise_attributes` called, before
    /// any element.
    fn is_attribute_first(&self) -> bool {
        false
    }

    /// Canonical lexical form; `None` when there is nothing valid to write.
    fn write(&self) -> Option<String> {
        None
    }

    /// Parse a lexical form; false when rejected.
    fn read(&mut self, _text: &str) -> bool {
        false
    }

    /// Typed form for transports that keep scalar types.
    fn write_setting(&self) -> Option<Value> {
        self.write().map(Value::from)
    }

    fn read_setting(&mut self, value: &Value) -> bool {
        if value.is_null() {
            return self.read("");
        }
        match value.write() {
            Some(text) => self.read(&text),
            None => false,
        }
    }

    /// Append this package's entries. False means "not a package": a
    /// wrapping cargo should use its own default layout.
    fn fill_inventory(&self, _inventory: &mut Inventory) -> bool {
        false
    }

    /// Child handle for export; `entry.available` is the instance index.
    fn get_cargo(&self, _entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        None
    }

    /// Child handle for import; `entry.available` is the instance index.
    fn get_cargo_mut(&mut self, _entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        None
    }

    fn set_default(&mut self) {}

    fn clear(&mut self) {}

    fn validate(&mut self) -> bool {
        true
    }

    /// Commit the child last handed out by `get_cargo_mut` for `entry`.
    fn insert(&mut self, _entry: &Entry) -> bool {
        true
    }

    /// Permissive packages: create a slot for an unknown incoming name and
    /// return its position in `inventory`.
    fn allocate(
        &mut self,
        _inventory: &mut Inventory,
        _identity: &Identity,
        _enclosing: &Identity,
    ) -> Option<usize> {
        None
    }

    /// Permissive packages: `Some(position)` turns that slot into a
    /// repeating one; `None` turns this cargo itself into a sequence.
    fn allocate_array(&mut self, _inventory: &mut Inventory, _position: Option<usize>) -> bool {
        false
    }

    fn finalise_attributes(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    /// Veto an export before anything is written.
    fn check_export(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Shared or exclusive access to a wrapped object.
///
/// Wrappers over a shared slot serve exports only; their import hooks fail.
pub trait Slot {
    type Target: ?Sized;

    fn target(&self) -> &Self::Target;

    fn target_mut(&mut self) -> Option<&mut Self::Target>;
}

impl<T: ?Sized> Slot for &T {
    type Target = T;

    fn target(&self) -> &T {
        self
    }

    fn target_mut(&mut self) -> Option<&mut T> {
        None
    }
}

impl<T: ?Sized> Slot for &mut T {
    type Target = T;

    fn target(&self) -> &T {
        self
    }

    fn target_mut(&mut self) -> Option<&mut T> {
        Some(&mut **self)
    }
}

/// Anything that can present itself as a cargo.
pub trait AsCargo {
    fn as_cargo(&self) -> Box<dyn Cargo + '_>;

    fn as_cargo_mut(&mut self) -> Box<dyn Cargo + '_>;
}

impl<T: Cargo> AsCargo for T {
    fn as_cargo(&self) -> Box<dyn Cargo + '_> {
        Box::new(PackageWrap::new(self))
    }

    fn as_cargo_mut(&mut self) -> Box<dyn Cargo + '_> {
        Box::new(PackageWrap::new(self))
    }
}

macro_rules! impl_as_cargo_scalar {
    ($($ty:ty),*) => {
        $(
            impl AsCargo for $ty {
                fn as_cargo(&self) -> Box<dyn Cargo + '_> {
                    Box::new(ValueWrap::new(self))
                }

                fn as_cargo_mut(&mut self) -> Box<dyn Cargo + '_> {
                    Box::new(ValueWrap::new(self))
                }
            }
        )*
    };
}

impl_as_cargo_scalar!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    String,
    crate::guid::Guid,
    crate::time::Timestamp
);

impl<T: Cargo + Default + 'static> AsCargo for Option<T> {
    fn as_cargo(&self) -> Box<dyn Cargo + '_> {
        Box::new(OptionWrap::new(self))
    }

    fn as_cargo_mut(&mut self) -> Box<dyn Cargo + '_> {
        Box::new(OptionWrap::new(self))
    }
}

impl<V: AsCargo + Default> AsCargo for Vec<V> {
    fn as_cargo(&self) -> Box<dyn Cargo + '_> {
        Box::new(ContainerWrap::new(self, crate::dom::DEFAULT_ITEM_TAG))
    }

    fn as_cargo_mut(&mut self) -> Box<dyn Cargo + '_> {
        Box::new(ContainerWrap::new(self, crate::dom::DEFAULT_ITEM_TAG))
    }
}

/// A bare [`Value`] is a scalar cargo of its own kind.
impl Cargo for Value {
    fn cargo_type(&self) -> CargoType {
        CargoType::of_kind(self.kind())
    }

    fn is_null(&self) -> bool {
        Value::is_null(self)
    }

    fn write(&self) -> Option<String> {
        Value::write(self)
    }

    fn read(&mut self, text: &str) -> bool {
        Value::read(self, text)
    }

    fn write_setting(&self) -> Option<Value> {
        (!self.is_undefined()).then(|| self.clone())
    }

    fn read_setting(&mut self, value: &Value) -> bool {
        self.assign(value);
        self.is_good()
    }

    fn set_default(&mut self) {
        Value::set_default(self);
    }

    fn clear(&mut self) {
        self.invalidate();
    }
}

/// Scalar cargo over a native value.
pub struct ValueWrap<S> {
    slot: S,
}

impl<S> ValueWrap<S> {
    pub fn new(slot: S) -> Self {
        Self { slot }
    }
}

impl<S> Cargo for ValueWrap<S>
where
    S: Slot,
    S::Target: Scalar,
{
    fn cargo_type(&self) -> CargoType {
        CargoType::of_kind(<S::Target as Scalar>::KIND)
    }

    fn write(&self) -> Option<String> {
        self.slot.target().to_value().write()
    }

    fn read(&mut self, text: &str) -> bool {
        let mut value = Value::undefined(<S::Target as Scalar>::KIND);
        if !value.read(text) {
            return false;
        }
        self.read_setting(&value)
    }

    fn write_setting(&self) -> Option<Value> {
        let value = self.slot.target().to_value();
        value.is_good().then_some(value)
    }

    fn read_setting(&mut self, value: &Value) -> bool {
        let Some(native) = <S::Target as Scalar>::from_value(value) else {
            return false;
        };
        match self.slot.target_mut() {
            Some(target) => {
                *target = native;
                true
            }
            None => false,
        }
    }

    fn set_default(&mut self) {
        let mut zero = Value::undefined(<S::Target as Scalar>::KIND);
        zero.set_default();
        self.read_setting(&zero);
    }
}

/// Cargo-by-reference: forwards every call to the wrapped cargo.
pub struct PackageWrap<S> {
    slot: S,
}

impl<S> PackageWrap<S> {
    pub fn new(slot: S) -> Self {
        Self { slot }
    }
}

impl<S> Cargo for PackageWrap<S>
where
    S: Slot,
    S::Target: Cargo,
{
    fn cargo_type(&self) -> CargoType {
        self.slot.target().cargo_type()
    }

    fn is_item(&self) -> bool {
        self.slot.target().is_item()
    }

    fn is_null(&self) -> bool {
        self.slot.target().is_null()
    }

    fn is_root(&self) -> bool {
        self.slot.target().is_root()
    }

    fn is_attribute_first(&self) -> bool {
        self.slot.target().is_attribute_first()
    }

    fn write(&self) -> Option<String> {
        self.slot.target().write()
    }

    fn read(&mut self, text: &str) -> bool {
        self.slot.target_mut().is_some_and(|c| c.read(text))
    }

    fn write_setting(&self) -> Option<Value> {
        self.slot.target().write_setting()
    }

    fn read_setting(&mut self, value: &Value) -> bool {
        self.slot.target_mut().is_some_and(|c| c.read_setting(value))
    }

    fn fill_inventory(&self, inventory: &mut Inventory) -> bool {
        self.slot.target().fill_inventory(inventory)
    }

    fn get_cargo(&self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        self.slot.target().get_cargo(entry)
    }

    fn get_cargo_mut(&mut self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        self.slot.target_mut()?.get_cargo_mut(entry)
    }

    fn set_default(&mut self) {
        if let Some(c) = self.slot.target_mut() {
            c.set_default();
        }
    }

    fn clear(&mut self) {
        if let Some(c) = self.slot.target_mut() {
            c.clear();
        }
    }

    fn validate(&mut self) -> bool {
        self.slot.target_mut().is_some_and(|c| c.validate())
    }

    fn insert(&mut self, entry: &Entry) -> bool {
        self.slot.target_mut().is_some_and(|c| c.insert(entry))
    }

    fn allocate(
        &mut self,
        inventory: &mut Inventory,
        identity: &Identity,
        enclosing: &Identity,
    ) -> Option<usize> {
        self.slot.target_mut()?.allocate(inventory, identity, enclosing)
    }

    fn allocate_array(&mut self, inventory: &mut Inventory, position: Option<usize>) -> bool {
        self.slot
            .target_mut()
            .is_some_and(|c| c.allocate_array(inventory, position))
    }

    fn finalise_attributes(&mut self) -> Result<(), TransportError> {
        match self.slot.target_mut() {
            Some(c) => c.finalise_attributes(),
            None => Err(TransportError::structural("cargo is read-only")),
        }
    }

    fn check_export(&self) -> Result<(), TransportError> {
        self.slot.target().check_export()
    }
}

/// Placeholder cargos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel {
    /// Expected to be null.
    NullItem,
    /// Expected to be an empty object.
    NullPackage,
    /// Accepts and discards anything.
    Unknown,
}

impl Cargo for Sentinel {
    fn cargo_type(&self) -> CargoType {
        match self {
            Sentinel::NullItem => CargoType::Text,
            _ => CargoType::Package,
        }
    }

    fn is_null(&self) -> bool {
        *self == Sentinel::NullItem
    }

    fn write(&self) -> Option<String> {
        match self {
            Sentinel::NullItem => Some(String::new()),
            _ => None,
        }
    }

    fn read(&mut self, text: &str) -> bool {
        match self {
            Sentinel::NullItem => {
                let text = text.trim();
                text.is_empty() || text == "null"
            }
            Sentinel::NullPackage => text.trim().is_empty(),
            Sentinel::Unknown => true,
        }
    }

    fn write_setting(&self) -> Option<Value> {
        self.is_null().then(Value::null)
    }

    fn read_setting(&mut self, value: &Value) -> bool {
        match self {
            Sentinel::Unknown => true,
            _ => value.is_null() || value.write().is_some_and(|t| self.read(&t)),
        }
    }

    fn fill_inventory(&self, inventory: &mut Inventory) -> bool {
        match self {
            Sentinel::NullItem => false,
            Sentinel::NullPackage => true,
            Sentinel::Unknown => {
                inventory.set_every_item_accepted(true);
                true
            }
        }
    }

    fn get_cargo_mut(&mut self, _entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        match self {
            Sentinel::Unknown => Some(Box::new(Sentinel::Unknown)),
            _ => None,
        }
    }

    fn allocate(
        &mut self,
        inventory: &mut Inventory,
        identity: &Identity,
        _enclosing: &Identity,
    ) -> Option<usize> {
        match self {
            Sentinel::Unknown => {
                let index = inventory.len() as i32;
                Some(inventory.push(
                    Entry::incoming(identity)
                        .with_maximum(None)
                        .with_index(index),
                ))
            }
            _ => None,
        }
    }

    fn allocate_array(&mut self, inventory: &mut Inventory, position: Option<usize>) -> bool {
        if *self != Sentinel::Unknown {
            return false;
        }
        match position {
            Some(pos) => {
                if let Some(entry) = inventory.entry_mut(pos) {
                    entry.maximum = None;
                }
                true
            }
            None => {
                inventory.push(Entry::array(crate::dom::DEFAULT_ITEM_TAG, 0));
                true
            }
        }
    }
}

/// Owned, optional cargo. Empty until set or until an import starts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CargoHold<T> {
    cell: Option<T>,
}

impl<T: Cargo + Default + 'static> CargoHold<T> {
    pub fn new() -> Self {
        Self { cell: None }
    }

    pub fn with(value: T) -> Self {
        Self { cell: Some(value) }
    }

    pub fn get(&self) -> Option<&T> {
        self.cell.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.cell.as_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.cell.is_none()
    }

    pub fn take(&mut self) -> Option<T> {
        self.cell.take()
    }

    pub fn into_inner(self) -> Option<T> {
        self.cell
    }

    fn view(&self) -> OptionWrap<&Option<T>> {
        OptionWrap::new(&self.cell)
    }

    fn view_mut(&mut self) -> OptionWrap<&mut Option<T>> {
        OptionWrap::new(&mut self.cell)
    }
}

impl<T: Cargo + Default + 'static> Cargo for CargoHold<T> {
    fn cargo_type(&self) -> CargoType {
        self.view().cargo_type()
    }

    fn is_null(&self) -> bool {
        self.cell.is_none()
    }

    fn is_attribute_first(&self) -> bool {
        self.view().is_attribute_first()
    }

    fn write(&self) -> Option<String> {
        self.view().write()
    }

    fn read(&mut self, text: &str) -> bool {
        self.view_mut().read(text)
    }

    fn write_setting(&self) -> Option<Value> {
        self.view().write_setting()
    }

    fn read_setting(&mut self, value: &Value) -> bool {
        self.view_mut().read_setting(value)
    }

    fn fill_inventory(&self, inventory: &mut Inventory) -> bool {
        match &self.cell {
            Some(inner) => inner.fill_inventory(inventory),
            None => T::default().fill_inventory(inventory),
        }
    }

    fn get_cargo(&self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        self.cell.as_ref()?.get_cargo(entry)
    }

    fn get_cargo_mut(&mut self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        self.cell.get_or_insert_with(T::default).get_cargo_mut(entry)
    }

    fn set_default(&mut self) {
        self.view_mut().set_default();
    }

    fn clear(&mut self) {
        self.cell = None;
    }

    fn validate(&mut self) -> bool {
        self.view_mut().validate()
    }

    fn insert(&mut self, entry: &Entry) -> bool {
        self.view_mut().insert(entry)
    }

    fn allocate(
        &mut self,
        inventory: &mut Inventory,
        identity: &Identity,
        enclosing: &Identity,
    ) -> Option<usize> {
        self.view_mut().allocate(inventory, identity, enclosing)
    }

    fn allocate_array(&mut self, inventory: &mut Inventory, position: Option<usize>) -> bool {
        self.view_mut().allocate_array(inventory, position)
    }

    fn finalise_attributes(&mut self) -> Result<(), TransportError> {
        self.view_mut().finalise_attributes()
    }

    fn check_export(&self) -> Result<(), TransportError> {
        self.view().check_export()
    }
}

/// Nullable package field (`Option<T>`).
///
/// Exports as null when empty; constructs `T::default()` on the first
/// import access.
pub struct OptionWrap<S> {
    slot: S,
}

impl<S> OptionWrap<S> {
    pub fn new(slot: S) -> Self {
        Self { slot }
    }
}

impl<S, T> OptionWrap<S>
where
    S: Slot<Target = Option<T>>,
    T: Cargo + Default,
{
    fn inner(&self) -> Option<&T> {
        self.slot.target().as_ref()
    }

    fn inner_mut(&mut self) -> Option<&mut T> {
        Some(self.slot.target_mut()?.get_or_insert_with(T::default))
    }
}

impl<S, T> Cargo for OptionWrap<S>
where
    S: Slot<Target = Option<T>>,
    T: Cargo + Default + 'static,
{
    fn cargo_type(&self) -> CargoType {
        self.inner().map_or(CargoType::Package, Cargo::cargo_type)
    }

    fn is_null(&self) -> bool {
        self.inner().map_or(true, Cargo::is_null)
    }

    fn is_attribute_first(&self) -> bool {
        self.inner().map_or_else(|| T::default().is_attribute_first(), Cargo::is_attribute_first)
    }

    fn write(&self) -> Option<String> {
        self.inner()?.write()
    }

    fn read(&mut self, text: &str) -> bool {
        self.inner_mut().is_some_and(|c| c.read(text))
    }

    fn write_setting(&self) -> Option<Value> {
        match self.inner() {
            Some(inner) => inner.write_setting(),
            None => Some(Value::null()),
        }
    }

    fn read_setting(&mut self, value: &Value) -> bool {
        if value.is_null() {
            return match self.slot.target_mut() {
                Some(target) => {
                    *target = None;
                    true
                }
                None => false,
            };
        }
        self.inner_mut().is_some_and(|c| c.read_setting(value))
    }

    fn fill_inventory(&self, inventory: &mut Inventory) -> bool {
        match self.inner() {
            Some(inner) => inner.fill_inventory(inventory),
            None => false,
        }
    }

    fn get_cargo(&self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        self.inner()?.get_cargo(entry)
    }

    fn get_cargo_mut(&mut self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        self.inner_mut()?.get_cargo_mut(entry)
    }

    fn set_default(&mut self) {
        if let Some(inner) = self.inner_mut() {
            inner.set_default();
        }
    }

    fn clear(&mut self) {
        if let Some(target) = self.slot.target_mut() {
            *target = None;
        }
    }

    fn validate(&mut self) -> bool {
        self.inner_mut().is_some_and(|c| c.validate())
    }

    fn insert(&mut self, entry: &Entry) -> bool {
        self.inner_mut().is_some_and(|c| c.insert(entry))
    }

    fn allocate(
        &mut self,
        inventory: &mut Inventory,
        identity: &Identity,
        enclosing: &Identity,
    ) -> Option<usize> {
        self.inner_mut()?.allocate(inventory, identity, enclosing)
    }

    fn allocate_array(&mut self, inventory: &mut Inventory, position: Option<usize>) -> bool {
        self.inner_mut()
            .is_some_and(|c| c.allocate_array(inventory, position))
    }

    fn finalise_attributes(&mut self) -> Result<(), TransportError> {
        match self.inner_mut() {
            Some(inner) => inner.finalise_attributes(),
            None => Err(TransportError::structural("optional package is read-only")),
        }
    }

    fn check_export(&self) -> Result<(), TransportError> {
        match self.inner() {
            Some(inner) => inner.check_export(),
            None => Ok(()),
        }
    }
}

/// Item at `index`, appending a default one when `index == items.len()`.
///
/// Helper for packages whose repeating entries map onto a `Vec`.
pub fn item_at_mut<V: Default>(items: &mut Vec<V>, index: usize) -> Option<&mut V> {
    if index == items.len() {
        items.push(V::default());
    }
    items.get_mut(index)
}

/// Ordered container presented as one item sequence.
///
/// Exports one `Role::Array` entry named after the item tag. On import each
/// item is built as a pending `V::default()`, filled by the transport and
/// appended on `insert`.
pub struct ContainerWrap<'t, S, V> {
    slot: S,
    item_tag: Cow<'t, str>,
    pending: Option<V>,
}

impl<'t, S, V> ContainerWrap<'t, S, V>
where
    S: Slot<Target = Vec<V>>,
{
    pub fn new(slot: S, item_tag: impl Into<Cow<'t, str>>) -> Self {
        Self {
            slot,
            item_tag: item_tag.into(),
            pending: None,
        }
    }
}

impl<S, V> Cargo for ContainerWrap<'_, S, V>
where
    S: Slot<Target = Vec<V>>,
    V: AsCargo + Default,
{
    fn fill_inventory(&self, inventory: &mut Inventory) -> bool {
        inventory.push(
            Entry::array(&*self.item_tag, self.slot.target().len()).owned_by::<Vec<V>>(),
        );
        true
    }

    fn get_cargo(&self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        self.slot.target().get(entry.available).map(AsCargo::as_cargo)
    }

    fn get_cargo_mut(&mut self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        let items = self.slot.target_mut()?;
        if entry.available < items.len() {
            return items.get_mut(entry.available).map(AsCargo::as_cargo_mut);
        }
        Some(self.pending.insert(V::default()).as_cargo_mut())
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
            return true;
        };
        match self.slot.target_mut() {
            Some(items) => {
                items.push(item);
                true
            }
            None => false,
        }
    }
}

/// Owner tag of the entries a [`Pair`] declares itself.
const PAIR_OWNER: &str = "stowage::Pair";

/// Key/value package used to transport map entries.
///
/// When the value is itself a package, the pair flattens: the key becomes
/// an attribute on the value's own element. Otherwise it is a two-entry
/// package `{key, value}`.
pub struct Pair<'a> {
    key: Box<dyn Cargo + 'a>,
    value: Box<dyn Cargo + 'a>,
    key_tag: Cow<'a, str>,
    value_tag: Cow<'a, str>,
}

impl<'a> Pair<'a> {
    pub fn new(key: Box<dyn Cargo + 'a>, value: Box<dyn Cargo + 'a>) -> Self {
        Self {
            key,
            value,
            key_tag: Cow::Borrowed("key"),
            value_tag: Cow::Borrowed("value"),
        }
    }

    pub fn with_tags(mut self, key_tag: impl Into<Cow<'a, str>>, value_tag: impl Into<Cow<'a, str>>) -> Self {
        self.key_tag = key_tag.into();
        self.value_tag = value_tag.into();
        self
    }

    fn is_pair_entry(&self, entry: &Entry) -> bool {
        entry.owner == Some(PAIR_OWNER)
    }
}

impl Cargo for Pair<'_> {
    fn is_attribute_first(&self) -> bool {
        self.value.is_attribute_first()
    }

    fn fill_inventory(&self, inventory: &mut Inventory) -> bool {
        let mut inner = Inventory::new();
        if self.value.fill_inventory(&mut inner) {
            inventory.push(
                Entry::attribute(&*self.key_tag)
                    .with_owner(PAIR_OWNER)
                    .with_index(-1)
                    .required(),
            );
            inventory.merge(inner);
        } else {
            inventory.push(
                Entry::element(&*self.key_tag)
                    .with_owner(PAIR_OWNER)
                    .required(),
            );
            inventory.push(
                Entry::element(&*self.value_tag)
                    .with_owner(PAIR_OWNER)
                    .with_index(1),
            );
        }
        true
    }

    fn get_cargo(&self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        if !self.is_pair_entry(entry) {
            return self.value.get_cargo(entry);
        }
        if entry.identity.name == self.key_tag {
            Some(Box::new(PackageWrap::new(&*self.key)))
        } else {
            Some(Box::new(PackageWrap::new(&*self.value)))
        }
    }

    fn get_cargo_mut(&mut self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        if !self.is_pair_entry(entry) {
            return self.value.get_cargo_mut(entry);
        }
        if entry.identity.name == self.key_tag {
            Some(Box::new(PackageWrap::new(&mut *self.key)))
        } else {
            Some(Box::new(PackageWrap::new(&mut *self.value)))
        }
    }

    fn set_default(&mut self) {
        self.key.set_default();
        self.value.set_default();
    }

    fn clear(&mut self) {
        self.key.clear();
        self.value.clear();
    }

    fn validate(&mut self) -> bool {
        self.value.validate()
    }

    fn insert(&mut self, entry: &Entry) -> bool {
        if self.is_pair_entry(entry) {
            true
        } else {
            self.value.insert(entry)
        }
    }

    fn finalise_attributes(&mut self) -> Result<(), TransportError> {
        self.value.finalise_attributes()
    }

    fn check_export(&self) -> Result<(), TransportError> {
        self.value.check_export()
    }
}

/// Ordered map presented as a sequence of [`Pair`]s.
pub struct MapWrap<'t, S, K, V> {
    slot: S,
    item_tag: Cow<'t, str>,
    pending: Option<(K, V)>,
}

impl<'t, S, K, V> MapWrap<'t, S, K, V>
where
    S: Slot<Target = BTreeMap<K, V>>,
{
    pub fn new(slot: S, item_tag: impl Into<Cow<'t, str>>) -> Self {
        Self {
            slot,
            item_tag: item_tag.into(),
            pending: None,
        }
    }
}

impl<S, K, V> Cargo for MapWrap<'_, S, K, V>
where
    S: Slot<Target = BTreeMap<K, V>>,
    K: AsCargo + Ord + Default,
    V: AsCargo + Default,
{
    fn fill_inventory(&self, inventory: &mut Inventory) -> bool {
        inventory.push(
            Entry::array(&*self.item_tag, self.slot.target().len())
                .owned_by::<BTreeMap<K, V>>(),
        );
        true
    }

    fn get_cargo(&self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        let (key, value) = self.slot.target().iter().nth(entry.available)?;
        Some(Box::new(Pair::new(key.as_cargo(), value.as_cargo())))
    }

    fn get_cargo_mut(&mut self, _entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        self.slot.target_mut()?;
        let (key, value) = self.pending.insert((K::default(), V::default()));
        Some(Box::new(Pair::new(key.as_cargo_mut(), value.as_cargo_mut())))
    }

    fn set_default(&mut self) {
        self.clear();
    }

    fn clear(&mut self) {
        self.pending = None;
        if let Some(map) = self.slot.target_mut() {
            map.clear();
        }
    }

    fn insert(&mut self, _entry: &Entry) -> bool {
        let Some((key, value)) = self.pending.take() else {
            return true;
        };
        match self.slot.target_mut() {
            Some(map) => {
                map.insert(key, value);
                true
            }
            None => false,
        }
    }
}

/// A single `Role::Array` entry: the package presents as a bare sequence.
pub(crate) fn is_bare_sequence(inventory: &Inventory) -> bool {
    inventory.len() == 1 && inventory.entries()[0].role == Role::Array
}
