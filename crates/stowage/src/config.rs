// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transport policy and send options.
//!
//! Policies load from named profiles in YAML or JSON:
//!
//! ```yaml
//! # transport_profiles.yaml
//! default_profile: strict
//! profiles:
//!   strict:
//!     unknown_name_skipped: false
//!     missing_entry_failed: true
//!     lexical: fail
//!   lenient:
//!     lexical: default
//!     time_format: epoch_seconds
//! ```
//!
//! Fields left out of a profile keep their [`TransportPolicy::default`]
//! values. YAML support sits behind the `profiles` feature (on by default).

use crate::dom::DEFAULT_ITEM_TAG;
use crate::error::ConfigError;
use crate::time::TimeFormat;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// What an import does when a scalar rejects its lexical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LexicalPolicy {
    /// Abort with a lexical error.
    #[default]
    Fail,
    /// Log and keep the scalar as it was.
    Skip,
    /// Log and reset the scalar to its default.
    Default,
}

/// Knobs shared by every transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportPolicy {
    /// Ignore incoming names the target does not know.
    pub unknown_name_skipped: bool,
    /// Treat every entry as required on export.
    pub every_entry_required: bool,
    /// Fail an import when a required entry is absent.
    pub missing_entry_failed: bool,
    pub time_format: TimeFormat,
    pub lexical: LexicalPolicy,
    /// Emit empty placeholders for null packages instead of omitting them.
    pub null_written: bool,
    /// Item tag for bare sequences that do not name one.
    pub item_tag: String,
}

impl Default for TransportPolicy {
    fn default() -> Self {
        Self {
            unknown_name_skipped: true,
            every_entry_required: false,
            missing_entry_failed: false,
            time_format: TimeFormat::Iso8601,
            lexical: LexicalPolicy::Fail,
            null_written: false,
            item_tag: DEFAULT_ITEM_TAG.to_string(),
        }
    }
}

impl TransportPolicy {
    /// Unknown names and missing required entries both fail.
    pub fn strict() -> Self {
        Self {
            unknown_name_skipped: false,
            missing_entry_failed: true,
            ..Self::default()
        }
    }

    pub fn with_unknown_name_skipped(mut self, skipped: bool) -> Self {
        self.unknown_name_skipped = skipped;
        self
    }

    pub fn with_every_entry_required(mut self, required: bool) -> Self {
        self.every_entry_required = required;
        self
    }

    pub fn with_missing_entry_failed(mut self, failed: bool) -> Self {
        self.missing_entry_failed = failed;
        self
    }

    pub fn with_time_format(mut self, format: TimeFormat) -> Self {
        self.time_format = format;
        self
    }

    pub fn with_lexical(mut self, lexical: LexicalPolicy) -> Self {
        self.lexical = lexical;
        self
    }

    pub fn with_null_written(mut self, written: bool) -> Self {
        self.null_written = written;
        self
    }

    pub fn with_item_tag(mut self, tag: impl Into<String>) -> Self {
        self.item_tag = tag.into();
        self
    }
}

/// Output layout for `send`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Indent nested content with tabs.
    pub tabbed: bool,
    /// Break lines between members.
    pub line_feeds: bool,
    /// `(prefix, uri)` declarations put on the root element.
    pub namespaces: Vec<(String, String)>,
    /// Emit the document prolog (`<?xml ...?>`).
    pub prolog: bool,
}

impl SendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tabs and line feeds.
    pub fn pretty() -> Self {
        Self::default().tabbed(true).line_feeds(true)
    }

    pub fn tabbed(mut self, tabbed: bool) -> Self {
        self.tabbed = tabbed;
        self
    }

    pub fn line_feeds(mut self, line_feeds: bool) -> Self {
        self.line_feeds = line_feeds;
        self
    }

    pub fn namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.push((prefix.into(), uri.into()));
        self
    }

    pub fn prolog(mut self, prolog: bool) -> Self {
        self.prolog = prolog;
        self
    }
}

/// Supported profile document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileFormat {
    Json,
    #[cfg(feature = "profiles")]
    Yaml,
}

impl ProfileFormat {
    /// Detect format from file extension.
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(ProfileFormat::Json),
            #[cfg(feature = "profiles")]
            Some("yaml") | Some("yml") => Some(ProfileFormat::Yaml),
            _ => None,
        }
    }
}

/// Root of a profile document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyDocument {
    /// Named policies.
    #[serde(default)]
    pub profiles: HashMap<String, TransportPolicy>,

    /// Profile used when none is requested.
    #[serde(default)]
    pub default_profile: Option<String>,
}

impl PolicyDocument {
    /// Parse a document in the given format.
    pub fn parse(content: &str, format: ProfileFormat) -> Result<Self, ConfigError> {
        match format {
            ProfileFormat::Json => {
                serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            #[cfg(feature = "profiles")]
            ProfileFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
        }
    }

    /// Read and parse a file; the extension picks the format.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        crate::trace_fn!("PolicyDocument::load");
        let path = path.as_ref();
        let format = ProfileFormat::from_extension(path).ok_or_else(|| {
            ConfigError::UnsupportedFormat(
                path.extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("")
                    .to_string(),
            )
        })?;
        let content = std::fs::read_to_string(path)?;
        log::debug!("[PolicyDocument::load] {} ({:?})", path.display(), format);
        Self::parse(&content, format)
    }

    /// Named profile, or the default one when `name` is `None`.
    ///
    /// Without `default_profile`, a profile called `default` is used, and
    /// failing that the built-in defaults.
    pub fn profile(&self, name: Option<&str>) -> Result<TransportPolicy, ConfigError> {
        let name = match name {
            Some(name) => name,
            None => match self.default_profile.as_deref() {
                Some(name) => name,
                None => {
                    return Ok(self.profiles.get("default").cloned().unwrap_or_default());
                }
            },
        };
        self.profiles
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()))
    }
}

impl TransportPolicy {
    /// Load a profile from a YAML or JSON file.
    pub fn load<P: AsRef<Path>>(path: P, profile: Option<&str>) -> Result<Self, ConfigError> {
        PolicyDocument::load(path)?.profile(profile)
    }

    /// Load a profile from document text.
    pub fn from_str_with(
        content: &str,
        format: ProfileFormat,
        profile: Option<&str>,
    ) -> Result<Self, ConfigError> {
        PolicyDocument::parse(content, format)?.profile(profile)
    }
}
