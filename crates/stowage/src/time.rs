// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Timestamps and their two lexical forms.
//!
//! - ISO-8601: `YYYY-MM-DDThh:mm:ss[.ffffff][Z|+hh:mm]`
//! - Epoch: integer or decimal count of seconds since 1970-01-01Z

use crate::value::LexicalFault;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const MICROS_PER_SECOND: i64 = 1_000_000;

/// Lexical form used when a transport writes timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    /// `2024-05-01T12:00:00Z`
    #[default]
    Iso8601,
    /// `1714564800`
    EpochSeconds,
}

/// Point in time with the UTC offset it was expressed in.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timestamp(DateTime<FixedOffset>);

impl Timestamp {
    /// 1970-01-01T00:00:00Z
    pub fn epoch() -> Self {
        Self::from_epoch_micros(0).unwrap_or_else(Self::now)
    }

    /// Current time, UTC.
    pub fn now() -> Self {
        Self(Utc::now().with_timezone(&utc_offset()))
    }

    /// Wrap a chrono date-time.
    pub fn from_datetime(value: DateTime<FixedOffset>) -> Self {
        Self(value)
    }

    /// Underlying chrono date-time.
    pub fn datetime(&self) -> &DateTime<FixedOffset> {
        &self.0
    }

    /// Build from microseconds since the epoch (UTC).
    pub fn from_epoch_micros(micros: i64) -> Option<Self> {
        let secs = micros.div_euclid(MICROS_PER_SECOND);
        let nanos = (micros.rem_euclid(MICROS_PER_SECOND) * 1_000) as u32;
        Utc.timestamp_opt(secs, nanos)
            .single()
            .map(|dt| Self(dt.with_timezone(&utc_offset())))
    }

    /// Build from (possibly fractional) seconds since the epoch.
    pub fn from_epoch_seconds(seconds: f64) -> Option<Self> {
        if !seconds.is_finite() {
            return None;
        }
        let micros = (seconds * MICROS_PER_SECOND as f64).round();
        if micros.abs() >= i64::MAX as f64 {
            return None;
        }
        Self::from_epoch_micros(micros as i64)
    }

    /// Microseconds since the epoch.
    pub fn epoch_micros(&self) -> i64 {
        self.0.timestamp() * MICROS_PER_SECOND + i64::from(self.0.timestamp_subsec_micros())
    }

    /// Seconds since the epoch, fractional part included.
    pub fn epoch_seconds(&self) -> f64 {
        self.epoch_micros() as f64 / MICROS_PER_SECOND as f64
    }

    /// Whole seconds since the epoch when there is no sub-second part.
    pub fn whole_seconds(&self) -> Option<i64> {
        (self.0.timestamp_subsec_micros() == 0).then(|| self.0.timestamp())
    }

    /// Parse either lexical form.
    ///
    /// Text shaped like a date (`dddd-dd-dd...`) that chrono rejects is
    /// reported as out of range rather than unrecognised.
    pub fn parse(text: &str) -> Result<Self, LexicalFault> {
        let text = text.trim();
        if looks_like_date(text) {
            return parse_iso(text).ok_or(LexicalFault::OutOfRange);
        }
        parse_epoch(text)
    }

    /// ISO-8601 form.
    pub fn to_iso8601(&self) -> String {
        let mut out = self.0.format("%Y-%m-%dT%H:%M:%S").to_string();
        let micros = self.0.timestamp_subsec_micros();
        if micros != 0 {
            out.push_str(&format!(".{:06}", micros));
        }
        let offset = self.0.offset().local_minus_utc();
        if offset == 0 {
            out.push('Z');
        } else {
            let sign = if offset < 0 { '-' } else { '+' };
            let minutes = offset.abs() / 60;
            out.push_str(&format!("{}{:02}:{:02}", sign, minutes / 60, minutes % 60));
        }
        out
    }

    /// Epoch-seconds form (integer when there is no sub-second part).
    pub fn to_epoch_text(&self) -> String {
        let micros = self.epoch_micros();
        let sign = if micros < 0 { "-" } else { "" };
        let magnitude = micros.unsigned_abs();
        let whole = magnitude / MICROS_PER_SECOND as u64;
        let fraction = magnitude % MICROS_PER_SECOND as u64;
        if fraction == 0 {
            format!("{}{}", sign, whole)
        } else {
            let digits = format!("{:06}", fraction);
            format!("{}{}.{}", sign, whole, digits.trim_end_matches('0'))
        }
    }

    /// Render in the requested form.
    pub fn format(&self, format: TimeFormat) -> String {
        match format {
            TimeFormat::Iso8601 => self.to_iso8601(),
            TimeFormat::EpochSeconds => self.to_epoch_text(),
        }
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.epoch_micros().cmp(&other.epoch_micros())
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::epoch()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.to_iso8601())
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

fn looks_like_date(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() >= 10
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[5..7].iter().all(u8::is_ascii_digit)
        && bytes[7] == b'-'
        && bytes[8..10].iter().all(u8::is_ascii_digit)
}

fn parse_iso(text: &str) -> Option<Timestamp> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(Timestamp(dt));
    }
    // No offset: read as UTC. Accept 'T' or a space between date and time.
    let normalised = text.replacen(' ', "T", 1);
    if let Ok(naive) = NaiveDateTime::parse_from_str(&normalised, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Timestamp(Utc.from_utc_datetime(&naive).with_timezone(&utc_offset())));
    }
    if text.len() == 10 {
        let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
        let naive = date.and_hms_opt(0, 0, 0)?;
        return Some(Timestamp(Utc.from_utc_datetime(&naive).with_timezone(&utc_offset())));
    }
    None
}

fn parse_epoch(text: &str) -> Result<Timestamp, LexicalFault> {
    if text.is_empty() {
        return Err(LexicalFault::Unrecognised);
    }
    if let Ok(secs) = text.parse::<i64>() {
        return secs
            .checked_mul(MICROS_PER_SECOND)
            .and_then(Timestamp::from_epoch_micros)
            .ok_or(LexicalFault::OutOfRange);
    }
    if text.bytes().any(|b| b.is_ascii_digit())
        && text.bytes().all(|b| b.is_ascii_digit() || b == b'-' || b == b'+')
    {
        // Integer that overflowed i64.
        return Err(LexicalFault::OutOfRange);
    }
    match text.parse::<f64>() {
        Ok(secs) if secs.is_finite() => {
            Timestamp::from_epoch_seconds(secs).ok_or(LexicalFault::OutOfRange)
        }
        Ok(_) => Err(LexicalFault::OutOfRange),
        Err(_) => Err(LexicalFault::Unrecognised),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_round_trip_utc() {
        let ts = Timestamp::parse("2024-05-01T12:30:45Z").expect("iso");
        assert_eq!(ts.to_iso8601(), "2024-05-01T12:30:45Z");
        assert_eq!(ts.whole_seconds(), Some(1_714_566_645));
    }

    #[test]
    fn test_iso_with_offset_and_fraction() {
        let ts = Timestamp::parse("2024-05-01T12:30:45.250000+02:00").expect("iso");
        assert_eq!(ts.to_iso8601(), "2024-05-01T12:30:45.250000+02:00");
        assert_eq!(ts.epoch_micros(), 1_714_559_445_250_000);
    }

    #[test]
    fn test_naive_iso_reads_as_utc() {
        let ts = Timestamp::parse("1970-01-02T00:00:00").expect("naive");
        assert_eq!(ts.epoch_micros(), 86_400 * MICROS_PER_SECOND);
        assert_eq!(Timestamp::parse("1970-01-02").expect("date"), ts);
    }

    #[test]
    fn test_epoch_forms() {
        let ts = Timestamp::parse("86400").expect("epoch");
        assert_eq!(ts.to_iso8601(), "1970-01-02T00:00:00Z");
        assert_eq!(ts.to_epoch_text(), "86400");

        let ts = Timestamp::parse("-1.5").expect("negative epoch");
        assert_eq!(ts.epoch_micros(), -1_500_000);
        assert_eq!(ts.to_epoch_text(), "-1.5");
    }

    #[test]
    fn test_faults() {
        assert_eq!(Timestamp::parse("2024-13-45T00:00:00Z"), Err(LexicalFault::OutOfRange));
        assert_eq!(Timestamp::parse("yesterday"), Err(LexicalFault::Unrecognised));
        assert_eq!(
            Timestamp::parse("99999999999999999999999"),
            Err(LexicalFault::OutOfRange)
        );
    }

    #[test]
    fn test_ordering_ignores_offset() {
        let a = Timestamp::parse("2024-05-01T12:00:00+02:00").expect("a");
        let b = Timestamp::parse("2024-05-01T10:00:00Z").expect("b");
        assert_eq!(a.cmp(&b), std::cmp::Ordering::Equal);
    }
}
