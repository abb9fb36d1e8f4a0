// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transports: walking cargo trees to and from a byte stream.
//!
//! Every wire format goes through the same two drivers:
//!
//! ```text
//!  send:    Cargo tree --Exporter--> Parcel tree --writer--> bytes
//!  receive: bytes --parser--> Parcel tree --Importer--> Cargo tree
//! ```
//!
//! A [`Parcel`] is a positioned, format-neutral wire tree. Parsers attach
//! the row/column of every node so the import driver can report where it
//! failed. The drivers implement the package state machine, the
//! [`TransportPolicy`] knobs and the error taxonomy once for all formats.
//!
//! # Wire shapes
//!
//! | Cargo side | Parcel |
//! |---|---|
//! | scalar | `Scalar(Lexeme)` |
//! | package | `Group` (attributes and elements) |
//! | package whose only entry is an array | `Sequence` |
//! | repeating element entry | `Repeat` (one parcel per instance) |

pub mod json;
pub mod xml;

use crate::cargo::{is_bare_sequence, Cargo, CargoType};
use crate::config::{LexicalPolicy, SendOptions, TransportPolicy};
use crate::error::TransportError;
use crate::inventory::{Identity, Inventory, Role};
use crate::value::Value;
use std::io::{Read, Write};

pub use json::JsonTransport;
pub use xml::XmlTransport;

/// 1-based row/column in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Position {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Unknown position (exports).
    pub fn is_unknown(&self) -> bool {
        self.row == 0
    }
}

/// Scalar content of a parcel.
#[derive(Debug, Clone, PartialEq)]
pub enum Lexeme {
    /// No content at all (`<x/>`).
    Empty,
    /// Explicit null.
    Null,
    /// Text to hand to `Cargo::read`.
    Text(String),
    /// Typed scalar to hand to `Cargo::read_setting`.
    Typed(Value),
}

impl Lexeme {
    /// Empty or whitespace-only.
    pub fn is_blank(&self) -> bool {
        match self {
            Lexeme::Empty => true,
            Lexeme::Text(t) => t.trim().is_empty(),
            _ => false,
        }
    }
}

/// Shape of a parcel.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Scalar(Lexeme),
    Group {
        /// Attributes and elements in document order.
        members: Vec<Parcel>,
        /// Where the attribute section ends (XML `>`, JSON closing brace).
        attributes_end: Position,
    },
    /// The parcel itself is a sequence of items.
    Sequence(Vec<Parcel>),
    /// Instances of one repeating entry, written under the entry's name.
    Repeat(Vec<Parcel>),
}

/// Positioned wire node.
#[derive(Debug, Clone, PartialEq)]
pub struct Parcel {
    pub identity: Identity,
    pub position: Position,
    pub shape: Shape,
}

impl Parcel {
    pub fn new(identity: Identity, position: Position, shape: Shape) -> Self {
        Self {
            identity,
            position,
            shape,
        }
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    fn is_attribute(&self) -> bool {
        self.identity.role == Some(Role::Attribute)
    }
}

/// Reads and writes cargo trees in one wire format.
pub trait Transport {
    /// Serialise `cargo` under the root `identity`.
    fn send(
        &mut self,
        cargo: &dyn Cargo,
        identity: &Identity,
        sink: &mut dyn Write,
        options: &SendOptions,
    ) -> Result<(), TransportError>;

    /// Fill `cargo` from `source`. On failure the cargo keeps whatever had
    /// been committed and `last_row` / `last_column` point at the culprit.
    fn receive(
        &mut self,
        cargo: &mut dyn Cargo,
        identity: &Identity,
        source: &mut dyn Read,
    ) -> Result<(), TransportError>;

    /// Row of the last token looked at by `receive`.
    fn last_row(&self) -> usize;

    /// Column of the last token looked at by `receive`.
    fn last_column(&self) -> usize;

    fn policy(&self) -> &TransportPolicy;

    /// `send` into a string.
    fn send_to_string(
        &mut self,
        cargo: &dyn Cargo,
        identity: &Identity,
        options: &SendOptions,
    ) -> Result<String, TransportError> {
        let mut buffer = Vec::new();
        self.send(cargo, identity, &mut buffer, options)?;
        String::from_utf8(buffer).map_err(|e| TransportError::new(crate::error::ErrorKind::Io, e.to_string()))
    }

    /// `receive` from a string.
    fn receive_str(
        &mut self,
        cargo: &mut dyn Cargo,
        identity: &Identity,
        text: &str,
    ) -> Result<(), TransportError> {
        self.receive(cargo, identity, &mut text.as_bytes())
    }
}

/// Builds the parcel tree of an export.
pub struct Exporter<'p> {
    policy: &'p TransportPolicy,
    path: Vec<String>,
}

impl<'p> Exporter<'p> {
    pub fn new(policy: &'p TransportPolicy) -> Self {
        Self {
            policy,
            path: Vec::new(),
        }
    }

    /// Parcel for `cargo`; `None` when a null package is omitted.
    pub fn run(
        &mut self,
        cargo: &dyn Cargo,
        identity: &Identity,
    ) -> Result<Option<Parcel>, TransportError> {
        crate::trace_fn!("Exporter::run");
        self.path.clear();
        self.export(cargo, identity)
    }

    fn path(&self) -> String {
        self.path.join("/")
    }

    fn export(
        &mut self,
        cargo: &dyn Cargo,
        identity: &Identity,
    ) -> Result<Option<Parcel>, TransportError> {
        self.path.push(identity.name.clone());
        let parcel = self.export_inner(cargo, identity);
        self.path.pop();
        parcel
    }

    fn export_inner(
        &mut self,
        cargo: &dyn Cargo,
        identity: &Identity,
    ) -> Result<Option<Parcel>, TransportError> {
        cargo.check_export().map_err(|e| e.within(&self.path()))?;
        let scalar = |lexeme| {
            Some(Parcel::new(
                identity.clone(),
                Position::default(),
                Shape::Scalar(lexeme),
            ))
        };

        if cargo.is_item() {
            if cargo.is_null() {
                return Ok(scalar(Lexeme::Null));
            }
            return Ok(scalar(self.lexeme(cargo)));
        }
        if cargo.is_null() {
            if self.policy.null_written {
                return Ok(scalar(Lexeme::Null));
            }
            log::trace!("[Exporter::export] null package '{}' omitted", identity);
            return Ok(None);
        }

        let mut inventory = Inventory::new();
        if !cargo.fill_inventory(&mut inventory) {
            return Ok(scalar(self.lexeme(cargo)));
        }

        if is_bare_sequence(&inventory) {
            let entry = &inventory.entries()[0];
            let mut items = Vec::with_capacity(entry.available);
            for i in 0..entry.available {
                if let Some(item) = self.export_instance(cargo, entry, i)? {
                    items.push(item);
                }
            }
            return Ok(Some(Parcel::new(
                identity.clone(),
                Position::default(),
                Shape::Sequence(items),
            )));
        }

        let mut members = Vec::new();
        for pos in inventory.sequence() {
            let entry = &inventory.entries()[pos];
            let required =
                entry.required || (self.policy.every_entry_required && !entry.is_repeating());
            if entry.available == 0 {
                if required {
                    return Err(self.missing(entry.name()));
                }
                continue;
            }
            if entry.is_repeating() && !entry.is_attribute() {
                let mut items = Vec::with_capacity(entry.available);
                for i in 0..entry.available {
                    if let Some(item) = self.export_instance(cargo, entry, i)? {
                        items.push(item);
                    }
                }
                members.push(Parcel::new(
                    entry.identity.clone(),
                    Position::default(),
                    Shape::Repeat(items),
                ));
                continue;
            }
            match self.export_instance(cargo, entry, 0)? {
                Some(member) => members.push(member),
                None if required => return Err(self.missing(entry.name())),
                None => {}
            }
        }
        Ok(Some(Parcel::new(
            identity.clone(),
            Position::default(),
            Shape::Group {
                members,
                attributes_end: Position::default(),
            },
        )))
    }

    fn export_instance(
        &mut self,
        cargo: &dyn Cargo,
        entry: &crate::inventory::Entry,
        index: usize,
    ) -> Result<Option<Parcel>, TransportError> {
        let Some(child) = cargo.get_cargo(&entry.instance(index)) else {
            log::debug!(
                "[Exporter::export] '{}' has no cargo for '{}'[{}]",
                self.path(),
                entry.name(),
                index
            );
            return Ok(None);
        };
        self.export(&*child, &entry.identity)
    }

    fn missing(&self, name: &str) -> TransportError {
        TransportError::structural(format!("required entry '{}' has nothing to write", name))
            .within(&self.path())
    }

    fn lexeme(&self, cargo: &dyn Cargo) -> Lexeme {
        let setting = cargo.write_setting();
        match (cargo.cargo_type(), setting) {
            (_, Some(value)) if value.is_null() => Lexeme::Null,
            (CargoType::Number | CargoType::Boolean, Some(value)) => Lexeme::Typed(value),
            (_, Some(value)) => match value.write_with(self.policy.time_format) {
                Some(text) => Lexeme::Text(text),
                None => Lexeme::Null,
            },
            (_, None) => cargo.write().map_or(Lexeme::Null, Lexeme::Text),
        }
    }
}

/// Drives a cargo tree from a parsed parcel tree.
pub struct Importer<'p> {
    policy: &'p TransportPolicy,
    path: Vec<String>,
    last: Position,
}

impl<'p> Importer<'p> {
    pub fn new(policy: &'p TransportPolicy) -> Self {
        Self {
            policy,
            path: Vec::new(),
            last: Position::default(),
        }
    }

    /// Position of the last parcel looked at.
    pub fn last(&self) -> Position {
        self.last
    }

    pub fn run(&mut self, cargo: &mut dyn Cargo, parcel: &Parcel) -> Result<(), TransportError> {
        crate::trace_fn!("Importer::run");
        self.path.clear();
        self.path.push(parcel.name().to_string());
        let result = self.import(cargo, parcel);
        if let Err(e) = &result {
            if e.row > 0 {
                self.last = Position::new(e.row, e.column);
            }
        }
        result.map_err(|e| {
            if e.row == 0 {
                e.at(self.last.row, self.last.column)
            } else {
                e
            }
        })
    }

    fn path(&self) -> String {
        self.path.join("/")
    }

    fn fail(&self, error: TransportError, at: Position) -> TransportError {
        let error = error.within(&self.path());
        if error.row == 0 {
            error.at(at.row, at.column)
        } else {
            error
        }
    }

    fn import(&mut self, cargo: &mut dyn Cargo, parcel: &Parcel) -> Result<(), TransportError> {
        self.last = parcel.position;
        match &parcel.shape {
            Shape::Scalar(lexeme) if cargo.is_item() => self.import_scalar(cargo, parcel, lexeme),
            Shape::Scalar(lexeme) => self.import_scalar_into_package(cargo, parcel, lexeme),
            Shape::Group { .. } if cargo.is_item() => Err(self.fail(
                TransportError::structural(format!(
                    "'{}' is a scalar but the input has members",
                    parcel.name()
                )),
                parcel.position,
            )),
            Shape::Group {
                members,
                attributes_end,
            } => self.import_group(cargo, parcel, members, *attributes_end),
            Shape::Sequence(items) | Shape::Repeat(items) => {
                self.import_sequence(cargo, parcel, items)
            }
        }
    }

    fn import_scalar(
        &mut self,
        cargo: &mut dyn Cargo,
        parcel: &Parcel,
        lexeme: &Lexeme,
    ) -> Result<(), TransportError> {
        let accepted = match lexeme {
            Lexeme::Empty => cargo.read(""),
            Lexeme::Null => cargo.read_setting(&Value::null()),
            Lexeme::Text(text) => cargo.read(text),
            Lexeme::Typed(value) => cargo.read_setting(value),
        };
        if accepted {
            return Ok(());
        }
        let shown = match lexeme {
            Lexeme::Empty => String::new(),
            Lexeme::Null => "null".to_string(),
            Lexeme::Text(text) => text.clone(),
            Lexeme::Typed(value) => value.to_string(),
        };
        match self.policy.lexical {
            LexicalPolicy::Fail => Err(self.fail(
                TransportError::lexical(format!("'{}' rejected '{}'", parcel.name(), shown)),
                parcel.position,
            )),
            LexicalPolicy::Skip => {
                log::warn!(
                    "[Importer::import_scalar] {}: skipped '{}'",
                    self.path(),
                    shown
                );
                Ok(())
            }
            LexicalPolicy::Default => {
                log::warn!(
                    "[Importer::import_scalar] {}: '{}' replaced by default",
                    self.path(),
                    shown
                );
                cargo.set_default();
                Ok(())
            }
        }
    }

    fn import_scalar_into_package(
        &mut self,
        cargo: &mut dyn Cargo,
        parcel: &Parcel,
        lexeme: &Lexeme,
    ) -> Result<(), TransportError> {
        // Blank text is still text to a cargo that reads it.
        let accepted = match lexeme {
            Lexeme::Null => cargo.read_setting(&Value::null()),
            Lexeme::Text(text) => cargo.read(text),
            Lexeme::Typed(value) => cargo.read_setting(value),
            Lexeme::Empty => false,
        };
        if accepted {
            return Ok(());
        }
        if lexeme.is_blank() || *lexeme == Lexeme::Null {
            return self.import_group(cargo, parcel, &[], parcel.position);
        }
        Err(self.fail(
            TransportError::structural(format!(
                "'{}' expects members, found a scalar",
                parcel.name()
            )),
            parcel.position,
        ))
    }

    fn import_group(
        &mut self,
        cargo: &mut dyn Cargo,
        parcel: &Parcel,
        members: &[Parcel],
        attributes_end: Position,
    ) -> Result<(), TransportError> {
        crate::trace_fn!("Importer::import_group");
        cargo.set_default();
        let mut inventory = Inventory::new();
        cargo.fill_inventory(&mut inventory);
        inventory.reset_available();

        let mut pending: Vec<&Parcel> = members.iter().collect();
        if cargo.is_attribute_first() {
            let mut deferred = Vec::new();
            for member in pending {
                match locate(&inventory, member) {
                    Some(pos) if inventory.entries()[pos].is_attribute() => {
                        self.import_entry(cargo, &mut inventory, pos, member)?;
                    }
                    _ => deferred.push(member),
                }
            }
            cargo
                .finalise_attributes()
                .map_err(|e| self.fail(e, attributes_end))?;
            inventory = refill(cargo, &inventory);
            pending = deferred;
        }

        let (attributes, elements): (Vec<&Parcel>, Vec<&Parcel>) = pending
            .into_iter()
            .partition(|m| m.is_attribute() || is_attribute_entry(&inventory, m));
        for member in attributes.into_iter().chain(elements) {
            self.import_member(cargo, &mut inventory, member)?;
        }

        self.check_missing(&inventory, attributes_end)?;
        self.validate(cargo, parcel)
    }

    fn import_sequence(
        &mut self,
        cargo: &mut dyn Cargo,
        parcel: &Parcel,
        items: &[Parcel],
    ) -> Result<(), TransportError> {
        cargo.set_default();
        let mut inventory = Inventory::new();
        cargo.fill_inventory(&mut inventory);
        if !is_bare_sequence(&inventory) && cargo.allocate_array(&mut inventory, None) {
            inventory = Inventory::new();
            cargo.fill_inventory(&mut inventory);
        }
        if !is_bare_sequence(&inventory) {
            return Err(self.fail(
                TransportError::structural(format!("'{}' is not a sequence", parcel.name())),
                parcel.position,
            ));
        }
        inventory.reset_available();
        for item in items {
            self.import_instance(cargo, &mut inventory, 0, item)?;
        }
        self.validate(cargo, parcel)
    }

    fn import_member(
        &mut self,
        cargo: &mut dyn Cargo,
        inventory: &mut Inventory,
        member: &Parcel,
    ) -> Result<(), TransportError> {
        self.last = member.position;
        let pos = match locate(inventory, member) {
            Some(pos) => Some(pos),
            None if inventory.is_every_item_accepted() => {
                let enclosing = Identity::new(self.path.last().cloned().unwrap_or_default());
                cargo.allocate(inventory, &member.identity, &enclosing)
            }
            None => None,
        };
        let Some(pos) = pos else {
            if self.policy.unknown_name_skipped {
                log::debug!(
                    "[Importer::import_member] {}: unknown '{}' skipped",
                    self.path(),
                    member.name()
                );
                return Ok(());
            }
            return Err(self.fail(
                TransportError::structural(format!("unknown name '{}'", member.name())),
                member.position,
            ));
        };
        self.import_entry(cargo, inventory, pos, member)
    }

    fn import_entry(
        &mut self,
        cargo: &mut dyn Cargo,
        inventory: &mut Inventory,
        pos: usize,
        member: &Parcel,
    ) -> Result<(), TransportError> {
        let repeating = inventory.entries()[pos].is_repeating();
        match &member.shape {
            Shape::Sequence(items) | Shape::Repeat(items) if repeating => {
                for item in items {
                    self.import_instance(cargo, inventory, pos, item)?;
                }
                Ok(())
            }
            _ => self.import_instance(cargo, inventory, pos, member),
        }
    }

    fn import_instance(
        &mut self,
        cargo: &mut dyn Cargo,
        inventory: &mut Inventory,
        pos: usize,
        parcel: &Parcel,
    ) -> Result<(), TransportError> {
        if !inventory.entries()[pos].has_room()
            && !(inventory.is_every_item_accepted() && cargo.allocate_array(inventory, Some(pos)))
        {
            let entry = &inventory.entries()[pos];
            return Err(self.fail(
                TransportError::structural(format!(
                    "'{}' beyond its maximum of {}",
                    entry.name(),
                    entry.maximum.unwrap_or_default()
                )),
                parcel.position,
            ));
        }
        let instance = {
            let entry = &inventory.entries()[pos];
            entry.instance(entry.available)
        };

        self.path.push(instance.name().to_string());
        let result = match cargo.get_cargo_mut(&instance) {
            Some(mut child) => self.import(&mut *child, parcel),
            None => Err(self.fail(
                TransportError::structural(format!("no slot for '{}'", instance.name())),
                parcel.position,
            )),
        };
        result?;
        let committed = cargo.insert(&instance);
        self.path.pop();
        if !committed {
            return Err(self.fail(
                TransportError::structural(format!("'{}' was not accepted", instance.name())),
                parcel.position,
            ));
        }
        if let Some(entry) = inventory.entry_mut(pos) {
            entry.bump_available();
        }
        Ok(())
    }

    fn check_missing(&self, inventory: &Inventory, at: Position) -> Result<(), TransportError> {
        if !self.policy.missing_entry_failed {
            return Ok(());
        }
        let every = self.policy.every_entry_required;
        let missing = inventory
            .entries()
            .iter()
            .find(|e| e.available == 0 && (e.required || (every && !e.is_repeating())));
        match missing {
            Some(entry) => Err(self.fail(
                TransportError::structural(format!("missing required entry '{}'", entry.name())),
                at,
            )),
            None => Ok(()),
        }
    }

    fn validate(&self, cargo: &mut dyn Cargo, parcel: &Parcel) -> Result<(), TransportError> {
        if cargo.validate() {
            return Ok(());
        }
        Err(self.fail(
            TransportError::validation(format!("'{}' refused its content", parcel.name())),
            parcel.position,
        ))
    }
}

/// Entry position for an incoming member: exact label first, then name.
fn locate(inventory: &Inventory, member: &Parcel) -> Option<usize> {
    let label = Identity {
        name: member.identity.name.clone(),
        group: member.identity.group.clone(),
        ..Identity::default()
    };
    inventory
        .find(&label, None)
        .or_else(|| inventory.find_name(member.name()))
}

fn is_attribute_entry(inventory: &Inventory, member: &Parcel) -> bool {
    locate(inventory, member).is_some_and(|pos| inventory.entries()[pos].is_attribute())
}

/// Fresh inventory of `cargo`, keeping the counts already read.
fn refill(cargo: &dyn Cargo, previous: &Inventory) -> Inventory {
    let mut inventory = Inventory::new();
    cargo.fill_inventory(&mut inventory);
    inventory.reset_available();
    for pos in 0..inventory.len() {
        let Some(entry) = inventory.entry(pos) else {
            continue;
        };
        let carried = previous
            .find(&entry.identity, entry.owner)
            .map(|old| previous.entries()[old].available);
        if let (Some(available), Some(entry)) = (carried, inventory.entry_mut(pos)) {
            entry.available = available;
        }
    }
    inventory
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cargo::AsCargo;
    use crate::error::ErrorKind;
    use crate::inventory::Entry;

    #[derive(Debug, Default, PartialEq)]
    struct Tagged {
        id: i64,
        label: String,
    }

    impl Cargo for Tagged {
        fn fill_inventory(&self, inventory: &mut Inventory) -> bool {
            inventory.push(Entry::attribute("id").owned_by::<Self>().required());
            inventory.push(Entry::element("label").owned_by::<Self>().with_index(1));
            true
        }

        fn get_cargo(&self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
            match entry.name() {
                "id" => Some(self.id.as_cargo()),
                "label" => Some(self.label.as_cargo()),
                _ => None,
            }
        }

        fn get_cargo_mut(&mut self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
            match entry.name() {
                "id" => Some(self.id.as_cargo_mut()),
                "label" => Some(self.label.as_cargo_mut()),
                _ => None,
            }
        }
    }

    fn text(name: &str, value: &str, row: usize) -> Parcel {
        Parcel::new(
            Identity::new(name),
            Position::new(row, 1),
            Shape::Scalar(Lexeme::Text(value.into())),
        )
    }

    fn group(members: Vec<Parcel>) -> Parcel {
        Parcel::new(
            Identity::new("tagged"),
            Position::new(1, 1),
            Shape::Group {
                members,
                attributes_end: Position::new(1, 9),
            },
        )
    }

    #[test]
    fn test_export_orders_attributes_first() {
        let policy = TransportPolicy::default();
        let value = Tagged {
            id: 4,
            label: "x".into(),
        };
        let parcel = Exporter::new(&policy)
            .run(&value, &Identity::new("tagged"))
            .expect("export")
            .expect("not null");
        let Shape::Group { members, .. } = parcel.shape else {
            panic!("group expected");
        };
        assert_eq!(members[0].name(), "id");
        assert_eq!(members[0].shape, Shape::Scalar(Lexeme::Typed(Value::from(4i64))));
        assert_eq!(members[1].shape, Shape::Scalar(Lexeme::Text("x".into())));
    }

    #[test]
    fn test_import_fills_members() {
        let policy = TransportPolicy::default();
        let mut value = Tagged::default();
        Importer::new(&policy)
            .run(&mut value, &group(vec![text("label", "hi", 2), text("id", "9", 1)]))
            .expect("import");
        assert_eq!(
            value,
            Tagged {
                id: 9,
                label: "hi".into()
            }
        );
    }

    #[test]
    fn test_unknown_names_follow_policy() {
        let lenient = TransportPolicy::default();
        let mut value = Tagged::default();
        let input = group(vec![text("id", "1", 1), text("colour", "red", 3)]);
        assert!(Importer::new(&lenient).run(&mut value, &input).is_ok());

        let strict = TransportPolicy::default().with_unknown_name_skipped(false);
        let err = Importer::new(&strict)
            .run(&mut value, &input)
            .expect_err("unknown name");
        assert_eq!(err.kind, ErrorKind::Structural);
        assert_eq!((err.row, err.column), (3, 1));
    }

    #[test]
    fn test_lexical_policy() {
        let input = group(vec![text("id", "seven", 2)]);
        let mut value = Tagged {
            id: 5,
            label: String::new(),
        };
        let err = Importer::new(&TransportPolicy::default())
            .run(&mut value, &input)
            .expect_err("lexical");
        assert_eq!(err.kind, ErrorKind::Lexical);
        assert_eq!(err.path, "tagged/id");

        let skip = TransportPolicy::default().with_lexical(LexicalPolicy::Skip);
        assert!(Importer::new(&skip).run(&mut value, &input).is_ok());
    }

    #[test]
    fn test_missing_required_points_at_attribute_end() {
        let policy = TransportPolicy::default().with_missing_entry_failed(true);
        let mut value = Tagged::default();
        let err = Importer::new(&policy)
            .run(&mut value, &group(vec![text("label", "hi", 2)]))
            .expect_err("missing id");
        assert_eq!(err.kind, ErrorKind::Structural);
        assert!(err.message.contains("'id'"));
        assert_eq!((err.row, err.column), (1, 9));
    }

    #[test]
    fn test_second_instance_of_single_entry_fails() {
        let policy = TransportPolicy::default();
        let mut value = Tagged::default();
        let err = Importer::new(&policy)
            .run(
                &mut value,
                &group(vec![text("label", "a", 2), text("label", "b", 3)]),
            )
            .expect_err("beyond maximum");
        assert!(err.message.contains("beyond its maximum"));
        assert_eq!(err.row, 3);
    }

    #[test]
    fn test_blank_text_stays_text_in_dom() {
        let policy = TransportPolicy::default();
        let mut node = crate::dom::Node::Undefined;
        Importer::new(&policy)
            .run(&mut node, &group(vec![text("s", "", 2), text("w", "  ", 3)]))
            .expect("import");
        let expected = crate::dom::Node::object().with("s", "").with("w", "  ");
        assert_eq!(node, expected);

        // A package that cannot read text takes blank content as no members.
        let mut value = Tagged::default();
        let blank = Parcel::new(
            Identity::new("tagged"),
            Position::new(1, 1),
            Shape::Scalar(Lexeme::Text(" \n".into())),
        );
        Importer::new(&policy).run(&mut value, &blank).expect("blank package");
        assert_eq!(value, Tagged::default());
    }

    #[test]
    fn test_required_entry_enforced_on_export() {
        struct Hollow;
        impl Cargo for Hollow {
            fn fill_inventory(&self, inventory: &mut Inventory) -> bool {
                inventory.push(Entry::element("core").required().with_available(0));
                true
            }
        }
        let err = Exporter::new(&TransportPolicy::default())
            .run(&Hollow, &Identity::new("hollow"))
            .expect_err("required");
        assert_eq!(err.kind, ErrorKind::Structural);
        assert_eq!(err.path, "hollow");
    }
}
