// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Settings: identified grids of values.
//!
//! A [`Setting`] lays its values out as `rows x columns` (row-major,
//! `columns >= 1`). Equality compares shape and values in order; the
//! identity only counts when both sides carry one. A [`SettingList`]
//! compares as a multiset.

use crate::cargo::{item_at_mut, AsCargo, Cargo};
use crate::error::SettingError;
use crate::ident::Ident;
use crate::inventory::{Entry, Inventory};
use crate::value::{Scalar, Value, ValueKind};

/// Identified bundle of values.
#[derive(Debug, Clone)]
pub struct Setting {
    ident: Ident,
    values: Vec<Value>,
    columns: usize,
}

impl Setting {
    /// Empty single-column setting.
    pub fn new(ident: Ident) -> Self {
        Self {
            ident,
            values: Vec::new(),
            columns: 1,
        }
    }

    /// Single-column setting holding `values`.
    pub fn from_values(ident: Ident, values: Vec<Value>) -> Self {
        Self {
            ident,
            values,
            columns: 1,
        }
    }

    /// Grid of `values.len() / columns` rows.
    pub fn grid(ident: Ident, columns: usize, values: Vec<Value>) -> Result<Self, SettingError> {
        if columns == 0 {
            return Err(SettingError::ZeroColumns);
        }
        if values.len() % columns != 0 {
            return Err(SettingError::Ragged {
                values: values.len(),
                columns,
            });
        }
        Ok(Self {
            ident,
            values,
            columns,
        })
    }

    /// Builder: append one value.
    pub fn with(mut self, value: impl Into<Value>) -> Self {
        self.values.push(value.into());
        self
    }

    pub fn ident(&self) -> &Ident {
        &self.ident
    }

    pub fn ident_mut(&mut self) -> &mut Ident {
        &mut self.ident
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.values.len() / self.columns
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// First value, the usual case for single-value settings.
    pub fn first(&self) -> Option<&Value> {
        self.values.first()
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.values.push(value.into());
    }

    fn offset(&self, row: usize, column: usize) -> Result<usize, SettingError> {
        if row >= self.rows() || column >= self.columns {
            return Err(SettingError::OutOfRange {
                row,
                column,
                rows: self.rows(),
                columns: self.columns,
            });
        }
        Ok(row * self.columns + column)
    }

    pub fn get(&self, row: usize, column: usize) -> Result<&Value, SettingError> {
        let offset = self.offset(row, column)?;
        Ok(&self.values[offset])
    }

    /// Assign into `(row, column)`, converting to the cell's kind.
    pub fn set(&mut self, row: usize, column: usize, value: &Value) -> Result<(), SettingError> {
        let offset = self.offset(row, column)?;
        self.values[offset].assign(value);
        Ok(())
    }

    /// Every value converted to `kind`.
    pub fn convert(&self, kind: ValueKind) -> Vec<Value> {
        self.values.iter().map(|v| v.convert(kind)).collect()
    }

    /// Every value as `T`; `None` if any conversion is lossy.
    pub fn to_vec<T: Scalar>(&self) -> Option<Vec<T>> {
        self.values.iter().map(T::from_value).collect()
    }
}

impl Default for Setting {
    fn default() -> Self {
        Self::new(Ident::anonymous())
    }
}

/// Same grid shape and values; identities must match only when both
/// settings carry one.
impl PartialEq for Setting {
    fn eq(&self, other: &Self) -> bool {
        let same_ident =
            self.ident.is_anonymous() || other.ident.is_anonymous() || self.ident == other.ident;
        same_ident && self.columns == other.columns && self.values == other.values
    }
}

impl Cargo for Setting {
    fn fill_inventory(&self, inventory: &mut Inventory) -> bool {
        self.ident.fill_inventory(inventory);
        inventory.push(Entry::attribute("columns").owned_by::<Self>().with_index(-1));
        inventory.push(
            Entry::element("value")
                .owned_by::<Self>()
                .repeating(self.values.len()),
        );
        true
    }

    fn get_cargo(&self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        if entry.owner == Some(std::any::type_name::<Ident>()) {
            return self.ident.get_cargo(entry);
        }
        match entry.name() {
            "columns" => Some(self.columns.as_cargo()),
            "value" => self.values.get(entry.available).map(AsCargo::as_cargo),
            _ => None,
        }
    }

    fn get_cargo_mut(&mut self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        if entry.owner == Some(std::any::type_name::<Ident>()) {
            return self.ident.get_cargo_mut(entry);
        }
        match entry.name() {
            "columns" => Some(self.columns.as_cargo_mut()),
            "value" => item_at_mut(&mut self.values, entry.available).map(AsCargo::as_cargo_mut),
            _ => None,
        }
    }

    fn set_default(&mut self) {
        self.ident.set_default();
        self.values.clear();
        self.columns = 1;
    }

    fn clear(&mut self) {
        self.values.clear();
    }

    fn validate(&mut self) -> bool {
        self.columns >= 1 && self.values.len() % self.columns == 0
    }
}

/// Unordered collection of settings.
#[derive(Debug, Clone, Default)]
pub struct SettingList {
    settings: Vec<Setting>,
}

impl SettingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: append one setting.
    pub fn with(mut self, setting: Setting) -> Self {
        self.settings.push(setting);
        self
    }

    pub fn push(&mut self, setting: Setting) {
        self.settings.push(setting);
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Setting> {
        self.settings.iter()
    }

    pub fn first(&self) -> Option<&Setting> {
        self.settings.first()
    }

    /// First setting whose identity matches.
    pub fn find(&self, ident: &Ident) -> Option<&Setting> {
        self.settings.iter().find(|s| s.ident() == ident)
    }
}

impl PartialEq for SettingList {
    fn eq(&self, other: &Self) -> bool {
        if self.settings.len() != other.settings.len() {
            return false;
        }
        let mut unmatched: Vec<&Setting> = other.settings.iter().collect();
        for setting in &self.settings {
            match unmatched.iter().position(|s| *s == setting) {
                Some(i) => {
                    unmatched.swap_remove(i);
                }
                None => return false,
            }
        }
        true
    }
}

impl<'a> IntoIterator for &'a SettingList {
    type Item = &'a Setting;
    type IntoIter = std::slice::Iter<'a, Setting>;

    fn into_iter(self) -> Self::IntoIter {
        self.settings.iter()
    }
}

impl FromIterator<Setting> for SettingList {
    fn from_iter<I: IntoIterator<Item = Setting>>(iter: I) -> Self {
        Self {
            settings: iter.into_iter().collect(),
        }
    }
}

impl From<Setting> for SettingList {
    fn from(setting: Setting) -> Self {
        Self {
            settings: vec![setting],
        }
    }
}

impl Cargo for SettingList {
    fn fill_inventory(&self, inventory: &mut Inventory) -> bool {
        inventory.push(Entry::array("setting", self.settings.len()).owned_by::<Self>());
        true
    }

    fn get_cargo(&self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        self.settings.get(entry.available).map(AsCargo::as_cargo)
    }

    fn get_cargo_mut(&mut self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        item_at_mut(&mut self.settings, entry.available).map(AsCargo::as_cargo_mut)
    }

    fn set_default(&mut self) {
        self.settings.clear();
    }

    fn clear(&mut self) {
        self.settings.clear();
    }
}
