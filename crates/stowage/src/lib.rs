// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Stowage - self-describing cargo and in-process transport
//!
//! Domain objects describe their transportable content as an [`Inventory`]
//! of named entries; a [`Transport`] walks that description to read or write
//! the object in a wire format without knowing its static type. An event
//! bus sharing the same value model wires components together in-process.
//!
//! ## Quick Start
//!
//! ```rust
//! use stowage::{Identity, JsonTransport, Node, SendOptions, Transport};
//!
//! let doc = Node::object()
//!     .with("a", 1i64)
//!     .with("b", Node::array(vec![Node::from(true), Node::from(false)]));
//!
//! let mut json = JsonTransport::new();
//! let text = json.send_to_string(&doc, &Identity::new("doc"), &SendOptions::new())?;
//! assert_eq!(text, r#"{"a":1,"b":[true,false]}"#);
//!
//! let mut back = Node::Undefined;
//! json.receive_str(&mut back, &Identity::new("doc"), &text)?;
//! assert_eq!(back, doc);
//! # Ok::<(), stowage::TransportError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |  Transports          XmlTransport | JsonTransport  (Parcel trees)   |
//! +---------------------------------------------------------------------+
//! |  Cargo protocol      Cargo | wrappers | Node (DOM) | Mover/Handler  |
//! +---------------------------------------------------------------------+
//! |  Inventory           Identity | Entry | Inventory                   |
//! +---------------------------------------------------------------------+
//! |  Values              Value | Setting | SettingList | Guid | Time    |
//! +---------------------------------------------------------------------+
//! |  Event bus           Publisher | Subscriber | Event | PostBox       |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Value`] | Tagged scalar with cross-type conversion |
//! | [`Cargo`] | Surface a transport walks |
//! | [`Node`] | Generic document tree, reads anything |
//! | [`Mover`] | Polymorphic field carrying a type discriminator |
//! | [`Publisher`] | Priority-ordered event dispatch |
//!
//! ## Features
//!
//! - `profiles` (default): YAML transport policy profiles
//! - `logging` / `trace`: function-entry trace markers in the drivers

/// Canonical 128-bit identifiers.
pub mod guid;
/// Timestamps and their lexical forms.
pub mod time;
/// Tagged scalar values.
pub mod value;
/// Participant identity (name and/or id).
pub mod ident;
/// Value grids and setting lists.
pub mod setting;
/// Inventories, entries and wire identities.
pub mod inventory;
/// The Cargo protocol and its wrappers.
pub mod cargo;
/// Generic document object model.
pub mod dom;
/// Polymorphic packages.
pub mod mover;
/// In-process event bus.
pub mod event;
/// Single active transaction register.
pub mod transaction;
/// Wire formats and the shared import/export drivers.
pub mod transport;
/// Transport policy, send options and profile loading.
pub mod config;
/// Error types.
pub mod error;
/// Compile-time configurable entry tracing.
pub mod logging;

pub use cargo::{
    AsCargo, Cargo, CargoHold, CargoType, ContainerWrap, MapWrap, OptionWrap, PackageWrap, Pair,
    Sentinel, Slot, ValueWrap,
};
pub use config::{LexicalPolicy, PolicyDocument, ProfileFormat, SendOptions, TransportPolicy};
pub use dom::Node;
pub use error::{ConfigError, Error, ErrorKind, EventError, Result, SettingError, TransportError};
pub use event::{Action, Census, Event, Message, PostBox, Publisher, Subscriber};
pub use guid::Guid;
pub use ident::Ident;
pub use inventory::{Entry, Identity, Inventory, Role};
pub use mover::{Handler, Mover, MoverList, Polymorphic};
pub use setting::{Setting, SettingList};
pub use time::{TimeFormat, Timestamp};
pub use transaction::{Transaction, TransactionRegistry};
pub use transport::{JsonTransport, Transport, XmlTransport};
pub use value::{Data, Scalar, Status, Value, ValueKind};
