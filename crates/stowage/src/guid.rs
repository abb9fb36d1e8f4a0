// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! 128-bit identifier used by the `Id` value variant.
//!
//! # Display Format
//! Lowercase hex, 8-4-4-4-12: "0f1e2d3c-4b5a-6978-8796-a5b4c3d2e1f0"

use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 128-bit identifier.
///
/// Integers embed into the low 8 bytes (big-endian) with a zero high half,
/// so `Guid::from_int(v).to_int() == Some(v)` for every `i64`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Guid(Uuid);

impl Guid {
    /// The all-zero id.
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Fresh random (v4) id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// Check if the id is all zeros.
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// Embed a signed integer.
    pub fn from_int(value: i64) -> Self {
        let mut bytes = [0u8; 16];
        bytes[8..].copy_from_slice(&value.to_be_bytes());
        Self::from_bytes(bytes)
    }

    /// Recover an integer embedded with [`Guid::from_int`].
    ///
    /// Returns `None` when the high half is not zero.
    pub fn to_int(&self) -> Option<i64> {
        let bytes = self.as_bytes();
        if bytes[..8].iter().any(|&b| b != 0) {
            return None;
        }
        let mut low = [0u8; 8];
        low.copy_from_slice(&bytes[8..]);
        Some(i64::from_be_bytes(low))
    }

    /// Parse the canonical hyphenated form (other `uuid` spellings are accepted).
    pub fn parse(text: &str) -> Option<Self> {
        Uuid::try_parse(text.trim()).ok().map(Self)
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guid({})", self.0.hyphenated())
    }
}

impl FromStr for Guid {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::try_parse(s.trim()).map(Self)
    }
}

impl Default for Guid {
    fn default() -> Self {
        Self::nil()
    }
}

impl From<Uuid> for Guid {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_round_trip() {
        let text = "0f1e2d3c-4b5a-6978-8796-a5b4c3d2e1f0";
        let guid = Guid::parse(text).expect("canonical guid");
        assert_eq!(guid.to_string(), text);
    }

    #[test]
    fn test_uppercase_input_is_canonicalised() {
        let guid = Guid::parse("0F1E2D3C-4B5A-6978-8796-A5B4C3D2E1F0").expect("guid");
        assert_eq!(guid.to_string(), "0f1e2d3c-4b5a-6978-8796-a5b4c3d2e1f0");
    }

    #[test]
    fn test_int_embedding() {
        for v in [0i64, 1, -1, 42, i64::MIN, i64::MAX] {
            assert_eq!(Guid::from_int(v).to_int(), Some(v));
        }
        assert_eq!(Guid::from_int(1).to_string(), "00000000-0000-0000-0000-000000000001");
    }

    #[test]
    fn test_random_guid_has_no_int() {
        let mut bytes = [0u8; 16];
        bytes[0] = 0xAB;
        assert_eq!(Guid::from_bytes(bytes).to_int(), None);
        assert!(!Guid::generate().is_nil());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(Guid::parse("not-a-guid").is_none());
        assert!("1234".parse::<Guid>().is_err());
    }
}
