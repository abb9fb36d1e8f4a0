// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Single active transaction register.
//!
//! A [`TransactionRegistry`] is an explicit context object: callers that
//! must not overlap share one (usually behind an `Arc`) and open work with
//! [`TransactionRegistry::begin`]. The returned [`Transaction`] guard ends
//! the transaction when dropped.

use crate::error::EventError;
use crate::guid::Guid;
use parking_lot::Mutex;

/// Register holding at most one active transaction id.
#[derive(Debug, Default)]
pub struct TransactionRegistry {
    active: Mutex<Option<Guid>>,
}

impl TransactionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a transaction with a fresh id.
    pub fn begin(&self) -> Result<Transaction<'_>, EventError> {
        self.begin_with(Guid::generate())
    }

    /// Open a transaction with a caller-chosen id.
    pub fn begin_with(&self, id: Guid) -> Result<Transaction<'_>, EventError> {
        let mut active = self.active.lock();
        if let Some(current) = *active {
            log::debug!("[TransactionRegistry::begin] {} still active", current);
            return Err(EventError::TransactionActive(current.to_string()));
        }
        *active = Some(id);
        log::debug!("[TransactionRegistry::begin] {}", id);
        Ok(Transaction { registry: self, id })
    }

    /// Id of the transaction in progress, if any.
    pub fn current(&self) -> Option<Guid> {
        *self.active.lock()
    }

    pub fn is_active(&self) -> bool {
        self.active.lock().is_some()
    }

    fn end(&self, id: Guid) {
        let mut active = self.active.lock();
        if *active == Some(id) {
            *active = None;
            log::debug!("[TransactionRegistry::end] {}", id);
        }
    }
}

/// Guard for the active transaction.
#[derive(Debug)]
pub struct Transaction<'r> {
    registry: &'r TransactionRegistry,
    id: Guid,
}

impl Transaction<'_> {
    pub fn id(&self) -> Guid {
        self.id
    }

    /// End now; same as dropping the guard.
    pub fn commit(self) {}
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        self.registry.end(self.id);
    }
}
