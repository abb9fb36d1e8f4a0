// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Entry tracing on top of the `log` facade.
//!
//! Diagnostics elsewhere in the crate call `log::debug!` / `log::warn!`
//! directly with a `[Type::method]` prefix. This module only adds the
//! function-entry marker used by the transport drivers.
//!
//! The library never installs a logger; binaries pick one (the
//! `stowage-convert` tool uses `env_logger`).

/// Function entry trace marker.
///
/// Logs `[ENTER:FNC] function_name` at trace level.
/// Only active when both `logging` AND `trace` features are enabled.
///
/// # Example
/// ```ignore
/// fn import_group(&mut self, parcel: &Parcel) -> Result<(), TransportError> {
///     trace_fn!("Importer::import_group");
///     // ...
/// }
/// ```
#[macro_export]
#[cfg(all(feature = "logging", feature = "trace"))]
macro_rules! trace_fn {
    ($fn_name:expr) => {
        log::trace!("[ENTER:FNC] {}", $fn_name);
    };
}

/// No-op trace macro (when trace feature disabled).
#[macro_export]
#[cfg(not(all(feature = "logging", feature = "trace")))]
macro_rules! trace_fn {
    ($fn_name:expr) => {};
}
