// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tagged scalar values.
//!
//! A [`Value`] holds one of seven scalar shapes plus a [`Status`]:
//! - `Good`: the value is meaningful
//! - `Bad`: a lossy conversion or out-of-range read produced it
//! - `Undefined`: never assigned
//!
//! Every shape converts to every other. Conversions that lose information
//! (2.5 -> Int, "abc" -> Bool, ...) still produce a value of the requested
//! kind, but flag it `Bad`.
//!
//! # Example
//!
//! ```rust
//! use stowage::{Value, ValueKind};
//!
//! let mut count = Value::undefined(ValueKind::Int);
//! assert!(count.read("42"));
//! assert_eq!(count.as_int(), Some(42));
//!
//! let text = count.convert(ValueKind::Text);
//! assert_eq!(text.write().as_deref(), Some("42"));
//!
//! // "42" and 42 compare equal through their canonical forms
//! assert_eq!(text, count);
//! ```

use crate::guid::Guid;
use crate::time::{TimeFormat, Timestamp};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Why a lexical form was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexicalFault {
    /// Input is not a form of the target kind at all.
    Unrecognised,
    /// Input has the right shape but does not fit the target kind.
    OutOfRange,
}

/// Nominal kind of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    Text,
    Id,
    Time,
}

impl ValueKind {
    /// Bool, Int and Float compare numerically.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Bool | Self::Int | Self::Float)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Text => "text",
            Self::Id => "id",
            Self::Time => "time",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validity of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Undefined,
    Good,
    Bad,
}

/// Payload of a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Id(Guid),
    Time(Timestamp),
}

impl Data {
    /// Zero of the given kind.
    pub fn zero(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Null => Self::Null,
            ValueKind::Bool => Self::Bool(false),
            ValueKind::Int => Self::Int(0),
            ValueKind::Float => Self::Float(0.0),
            ValueKind::Text => Self::Text(String::new()),
            ValueKind::Id => Self::Id(Guid::nil()),
            ValueKind::Time => Self::Time(Timestamp::epoch()),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Text(_) => ValueKind::Text,
            Self::Id(_) => ValueKind::Id,
            Self::Time(_) => ValueKind::Time,
        }
    }
}

/// Tagged scalar with conversion status.
#[derive(Debug, Clone)]
pub struct Value {
    data: Data,
    status: Status,
}

impl Value {
    /// Good value wrapping `data`.
    pub fn new(data: Data) -> Self {
        Self {
            data,
            status: Status::Good,
        }
    }

    /// Unassigned value of the given kind.
    pub fn undefined(kind: ValueKind) -> Self {
        Self {
            data: Data::zero(kind),
            status: Status::Undefined,
        }
    }

    /// Explicit null.
    pub fn null() -> Self {
        Self::new(Data::Null)
    }

    fn bad(data: Data) -> Self {
        Self {
            data,
            status: Status::Bad,
        }
    }

    pub fn kind(&self) -> ValueKind {
        self.data.kind()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn data(&self) -> &Data {
        &self.data
    }

    pub fn into_data(self) -> Data {
        self.data
    }

    pub fn is_good(&self) -> bool {
        self.status == Status::Good
    }

    pub fn is_bad(&self) -> bool {
        self.status == Status::Bad
    }

    pub fn is_undefined(&self) -> bool {
        self.status == Status::Undefined
    }

    /// Good null.
    pub fn is_null(&self) -> bool {
        self.is_good() && self.data == Data::Null
    }

    /// Reset to the zero of the nominal kind (status becomes `Good`).
    pub fn set_default(&mut self) {
        self.data = Data::zero(self.kind());
        self.status = Status::Good;
    }

    /// Forget the content, keeping the nominal kind.
    pub fn invalidate(&mut self) {
        self.data = Data::zero(self.kind());
        self.status = Status::Undefined;
    }

    /// Mark the value bad without touching its content.
    pub fn mark_bad(&mut self) {
        self.status = Status::Bad;
    }

    /// Assign from another value, converting to this value's nominal kind.
    ///
    /// A null-kind value is untyped and adopts `other` as is.
    pub fn assign(&mut self, other: &Value) {
        if self.kind() == ValueKind::Null {
            *self = other.clone();
        } else {
            *self = other.convert(self.kind());
        }
    }

    /// Assign a native scalar.
    pub fn set<T: Scalar>(&mut self, value: T) {
        self.assign(&value.to_value());
    }

    /// Read back as a native scalar (`None` when the conversion is lossy).
    pub fn get<T: Scalar>(&self) -> Option<T> {
        T::from_value(self)
    }

    /// Convert to `kind`. Lossy or unsupported conversions yield a `Bad` value.
    pub fn convert(&self, kind: ValueKind) -> Value {
        if kind == ValueKind::Null {
            return self.clone();
        }
        if self.status != Status::Good {
            return Value {
                data: Data::zero(kind),
                status: self.status,
            };
        }
        if self.kind() == kind {
            return self.clone();
        }
        match kind {
            ValueKind::Null => self.clone(),
            ValueKind::Bool => self.to_bool(),
            ValueKind::Int => self.to_int(),
            ValueKind::Float => self.to_float(),
            ValueKind::Text => Value::new(Data::Text(self.canonical(TimeFormat::Iso8601))),
            ValueKind::Id => self.to_id(),
            ValueKind::Time => self.to_time(),
        }
    }

    fn to_bool(&self) -> Value {
        match &self.data {
            Data::Null => Value::undefined(ValueKind::Bool),
            Data::Int(i) => Value::new(Data::Bool(*i != 0)),
            Data::Float(f) if f.is_nan() => Value::bad(Data::Bool(false)),
            Data::Float(f) => Value::new(Data::Bool(*f != 0.0)),
            Data::Text(t) => match parse_bool(t) {
                Some(b) => Value::new(Data::Bool(b)),
                None => Value::bad(Data::Bool(false)),
            },
            Data::Id(id) => Value::new(Data::Bool(!id.is_nil())),
            Data::Bool(_) | Data::Time(_) => Value::bad(Data::Bool(false)),
        }
    }

    fn to_int(&self) -> Value {
        match &self.data {
            Data::Null => Value::undefined(ValueKind::Int),
            Data::Bool(b) => Value::new(Data::Int(i64::from(*b))),
            Data::Float(f) => float_to_int(*f),
            Data::Text(t) => match parse_int(t) {
                Ok(i) => Value::new(Data::Int(i)),
                Err(_) => Value::bad(Data::Int(0)),
            },
            Data::Id(id) => match id.to_int() {
                Some(i) => Value::new(Data::Int(i)),
                None => Value::bad(Data::Int(0)),
            },
            Data::Time(ts) => match ts.whole_seconds() {
                Some(s) => Value::new(Data::Int(s)),
                None => Value::bad(Data::Int(ts.epoch_micros().div_euclid(1_000_000))),
            },
            Data::Int(_) => self.clone(),
        }
    }

    fn to_float(&self) -> Value {
        match &self.data {
            Data::Null => Value::undefined(ValueKind::Float),
            Data::Bool(b) => Value::new(Data::Float(if *b { 1.0 } else { 0.0 })),
            Data::Int(i) => {
                let f = *i as f64;
                if f as i64 == *i && f.abs() < 9_007_199_254_740_992.0 {
                    Value::new(Data::Float(f))
                } else {
                    Value::bad(Data::Float(f))
                }
            }
            Data::Text(t) => match parse_float(t) {
                Ok(f) => Value::new(Data::Float(f)),
                Err(_) => Value::bad(Data::Float(0.0)),
            },
            Data::Id(id) => match id.to_int() {
                Some(i) => Value::new(Data::Int(i)).to_float(),
                None => Value::bad(Data::Float(0.0)),
            },
            Data::Time(ts) => Value::new(Data::Float(ts.epoch_seconds())),
            Data::Float(_) => self.clone(),
        }
    }

    fn to_id(&self) -> Value {
        match &self.data {
            Data::Null => Value::undefined(ValueKind::Id),
            Data::Int(i) => Value::new(Data::Id(Guid::from_int(*i))),
            Data::Text(t) => match Guid::parse(t) {
                Some(id) => Value::new(Data::Id(id)),
                None => Value::bad(Data::Id(Guid::nil())),
            },
            Data::Id(_) => self.clone(),
            Data::Bool(_) | Data::Float(_) | Data::Time(_) => Value::bad(Data::Id(Guid::nil())),
        }
    }

    fn to_time(&self) -> Value {
        let fallback = || Value::bad(Data::Time(Timestamp::epoch()));
        match &self.data {
            Data::Null => Value::undefined(ValueKind::Time),
            Data::Int(i) => i
                .checked_mul(1_000_000)
                .and_then(Timestamp::from_epoch_micros)
                .map_or_else(fallback, |ts| Value::new(Data::Time(ts))),
            Data::Float(f) => {
                Timestamp::from_epoch_seconds(*f).map_or_else(fallback, |ts| Value::new(Data::Time(ts)))
            }
            Data::Text(t) => Timestamp::parse(t).map_or_else(|_| fallback(), |ts| Value::new(Data::Time(ts))),
            Data::Time(_) => self.clone(),
            Data::Bool(_) | Data::Id(_) => fallback(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.convert(ValueKind::Bool) {
            Value {
                data: Data::Bool(b),
                status: Status::Good,
            } => Some(b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.convert(ValueKind::Int) {
            Value {
                data: Data::Int(i),
                status: Status::Good,
            } => Some(i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self.convert(ValueKind::Float) {
            Value {
                data: Data::Float(f),
                status: Status::Good,
            } => Some(f),
            _ => None,
        }
    }

    /// Canonical text (ISO-8601 timestamps).
    pub fn as_text(&self) -> Option<String> {
        self.write()
    }

    /// Borrow the text of a `Text` value without converting.
    pub fn text(&self) -> Option<&str> {
        match &self.data {
            Data::Text(t) if self.is_good() => Some(t),
            _ => None,
        }
    }

    pub fn as_id(&self) -> Option<Guid> {
        match self.convert(ValueKind::Id) {
            Value {
                data: Data::Id(id),
                status: Status::Good,
            } => Some(id),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<Timestamp> {
        match self.convert(ValueKind::Time) {
            Value {
                data: Data::Time(ts),
                status: Status::Good,
            } => Some(ts),
            _ => None,
        }
    }

    /// Canonical lexical form; `None` unless the value is good.
    pub fn write(&self) -> Option<String> {
        self.write_with(TimeFormat::Iso8601)
    }

    /// Canonical lexical form with the requested timestamp form.
    pub fn write_with(&self, format: TimeFormat) -> Option<String> {
        self.is_good().then(|| self.canonical(format))
    }

    /// Fixed-precision form for floats; other kinds use the canonical form.
    pub fn write_fixed(&self, precision: usize) -> Option<String> {
        match self.data {
            Data::Float(f) if self.is_good() => Some(format!("{:.*}", precision, f)),
            _ => self.write(),
        }
    }

    fn canonical(&self, format: TimeFormat) -> String {
        match &self.data {
            Data::Null => String::new(),
            Data::Bool(b) => b.to_string(),
            Data::Int(i) => i.to_string(),
            Data::Float(f) => f.to_string(),
            Data::Text(t) => t.clone(),
            Data::Id(id) => id.to_string(),
            Data::Time(ts) => ts.format(format),
        }
    }

    /// Parse `text` into the nominal kind.
    ///
    /// - recognised but out of range: status becomes `Bad`, returns false
    /// - unrecognised: prior state is kept, returns false
    pub fn read(&mut self, text: &str) -> bool {
        let parsed = match self.kind() {
            ValueKind::Null => {
                let trimmed = text.trim();
                if trimmed.is_empty() || trimmed == "null" {
                    Ok(Data::Null)
                } else {
                    Ok(Data::Text(text.to_string()))
                }
            }
            ValueKind::Bool => parse_bool(text).map(Data::Bool).ok_or(LexicalFault::Unrecognised),
            ValueKind::Int => parse_int(text).map(Data::Int),
            ValueKind::Float => parse_float(text).map(Data::Float),
            ValueKind::Text => Ok(Data::Text(text.to_string())),
            ValueKind::Id => Guid::parse(text).map(Data::Id).ok_or(LexicalFault::Unrecognised),
            ValueKind::Time => Timestamp::parse(text).map(Data::Time),
        };
        match parsed {
            Ok(data) => {
                self.data = data;
                self.status = Status::Good;
                true
            }
            Err(LexicalFault::OutOfRange) => {
                self.status = Status::Bad;
                false
            }
            Err(LexicalFault::Unrecognised) => false,
        }
    }

    fn rank(&self) -> u8 {
        match (self.status, &self.data) {
            (Status::Good, Data::Null) => 1,
            (Status::Good, _) => 2,
            _ => 0,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::undefined(ValueKind::Null)
    }
}

/// Equality is [`Value::compare`] returning `Equal`, so it is not
/// transitive across kinds either.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Value {
    /// Cross-kind comparison: undefined and bad sort first, then null, then
    /// good values. Two numeric sides (booleans included) compare as
    /// numbers, anything else by canonical text.
    ///
    /// Not an order over mixed kinds: `"10" == 10 > 9 == "9" > "10"`.
    /// Sort or key on it only within one kind.
    pub fn compare(&self, other: &Self) -> Ordering {
        let rank = self.rank().cmp(&other.rank());
        if rank != Ordering::Equal || self.rank() < 2 {
            return rank;
        }
        match (&self.data, &other.data) {
            (Data::Int(a), Data::Int(b)) => a.cmp(b),
            (Data::Time(a), Data::Time(b)) => a.cmp(b),
            (Data::Id(a), Data::Id(b)) => a.cmp(b),
            (a, b) if a.kind().is_numeric() && b.kind().is_numeric() => {
                let (x, y) = (numeric(a), numeric(b));
                x.partial_cmp(&y).unwrap_or_else(|| x.total_cmp(&y))
            }
            _ => self
                .canonical(TimeFormat::Iso8601)
                .cmp(&other.canonical(TimeFormat::Iso8601)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Status::Good => f.write_str(&self.canonical(TimeFormat::Iso8601)),
            Status::Bad => f.write_str("<bad>"),
            Status::Undefined => f.write_str("<undefined>"),
        }
    }
}

fn numeric(data: &Data) -> f64 {
    match data {
        Data::Bool(b) => f64::from(u8::from(*b)),
        Data::Int(i) => *i as f64,
        Data::Float(f) => *f,
        _ => 0.0,
    }
}

fn float_to_int(f: f64) -> Value {
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Value::new(Data::Int(f as i64))
    } else {
        Value::bad(Data::Int(f as i64))
    }
}

pub(crate) fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") || text == "1" {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") || text == "0" {
        Some(false)
    } else {
        None
    }
}

fn parse_int(text: &str) -> Result<i64, LexicalFault> {
    let text = text.trim();
    if let Ok(i) = text.parse::<i64>() {
        return Ok(i);
    }
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LexicalFault::OutOfRange);
    }
    match parse_float(text) {
        Ok(f) => match float_to_int(f) {
            Value {
                data: Data::Int(i),
                status: Status::Good,
            } => Ok(i),
            _ => Err(LexicalFault::OutOfRange),
        },
        Err(fault) => Err(fault),
    }
}

fn parse_float(text: &str) -> Result<f64, LexicalFault> {
    let text = text.trim();
    match text.parse::<f64>() {
        Ok(f) if f.is_infinite() && !text.to_ascii_lowercase().contains("inf") => {
            Err(LexicalFault::OutOfRange)
        }
        Ok(f) => Ok(f),
        Err(_) => Err(LexicalFault::Unrecognised),
    }
}

/// Native types that map onto a value kind.
pub trait Scalar: Sized {
    /// Kind used when the native value is converted to a [`Value`].
    const KIND: ValueKind;

    fn to_value(&self) -> Value;

    /// `None` when `value` cannot be represented without loss.
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_scalar_int {
    ($($ty:ty),*) => {
        $(
            impl Scalar for $ty {
                const KIND: ValueKind = ValueKind::Int;

                fn to_value(&self) -> Value {
                    match i64::try_from(*self) {
                        Ok(i) => Value::new(Data::Int(i)),
                        Err(_) => Value::bad(Data::Int(i64::MAX)),
                    }
                }

                fn from_value(value: &Value) -> Option<Self> {
                    value.as_int().and_then(|i| <$ty>::try_from(i).ok())
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    v.to_value()
                }
            }
        )*
    };
}

impl_scalar_int!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl Scalar for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn to_value(&self) -> Value {
        Value::new(Data::Bool(*self))
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl Scalar for f64 {
    const KIND: ValueKind = ValueKind::Float;

    fn to_value(&self) -> Value {
        Value::new(Data::Float(*self))
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_float()
    }
}

impl Scalar for f32 {
    const KIND: ValueKind = ValueKind::Float;

    fn to_value(&self) -> Value {
        Value::new(Data::Float(f64::from(*self)))
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_float().map(|f| f as f32)
    }
}

impl Scalar for String {
    const KIND: ValueKind = ValueKind::Text;

    fn to_value(&self) -> Value {
        Value::new(Data::Text(self.clone()))
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_text()
    }
}

impl Scalar for Guid {
    const KIND: ValueKind = ValueKind::Id;

    fn to_value(&self) -> Value {
        Value::new(Data::Id(*self))
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_id()
    }
}

impl Scalar for Timestamp {
    const KIND: ValueKind = ValueKind::Time;

    fn to_value(&self) -> Value {
        Value::new(Data::Time(*self))
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_time()
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        v.to_value()
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        v.to_value()
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        v.to_value()
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::new(Data::Text(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::new(Data::Text(v.to_string()))
    }
}

impl From<Guid> for Value {
    fn from(v: Guid) -> Self {
        v.to_value()
    }
}

impl From<Timestamp> for Value {
    fn from(v: Timestamp) -> Self {
        v.to_value()
    }
}

impl From<Data> for Value {
    fn from(data: Data) -> Self {
        Value::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_numeric_conversions() {
        assert_eq!(Value::from(0i64).as_bool(), Some(false));
        assert_eq!(Value::from(-3i64).as_bool(), Some(true));
        assert_eq!(Value::from(true).as_int(), Some(1));
        assert_eq!(Value::from(0.0).as_bool(), Some(false));
    }

    #[test]
    fn test_lossy_conversion_marks_bad() {
        let v = Value::from(2.5).convert(ValueKind::Int);
        assert!(v.is_bad());
        assert_eq!(v.data(), &Data::Int(2));

        let v = Value::from("abc").convert(ValueKind::Bool);
        assert!(v.is_bad());

        let v = Value::from(true).convert(ValueKind::Id);
        assert!(v.is_bad());
    }

    #[test]
    fn test_undefined_propagates() {
        let v = Value::undefined(ValueKind::Int);
        assert!(v.convert(ValueKind::Text).is_undefined());
        assert_eq!(v.write(), None);
        assert_eq!(v.as_int(), None);
    }

    #[test]
    fn test_read_out_of_range_sets_bad() {
        let mut v = Value::from(5i64);
        assert!(!v.read("99999999999999999999"));
        assert!(v.is_bad());

        let mut v = Value::from(5i64);
        assert!(!v.read("3.5"));
        assert!(v.is_bad());
    }

    #[test]
    fn test_read_unrecognised_keeps_state() {
        let mut v = Value::from(5i64);
        assert!(!v.read("five"));
        assert!(v.is_good());
        assert_eq!(v.as_int(), Some(5));

        let mut b = Value::from(true);
        assert!(!b.read("maybe"));
        assert_eq!(b.as_bool(), Some(true));
    }

    #[test]
    fn test_read_integral_float_text_into_int() {
        let mut v = Value::undefined(ValueKind::Int);
        assert!(v.read("3.0"));
        assert_eq!(v.as_int(), Some(3));
    }

    #[test]
    fn test_canonical_forms() {
        assert_eq!(Value::from(1.0).write().as_deref(), Some("1"));
        assert_eq!(Value::from(0.25).write().as_deref(), Some("0.25"));
        assert_eq!(Value::from(2.5).write_fixed(3).as_deref(), Some("2.500"));
        assert_eq!(Value::from(false).write().as_deref(), Some("false"));
        assert_eq!(
            Value::from(Guid::from_int(255)).write().as_deref(),
            Some("00000000-0000-0000-0000-0000000000ff")
        );
        let ts = Timestamp::from_epoch_micros(0).expect("epoch");
        assert_eq!(Value::from(ts).write().as_deref(), Some("1970-01-01T00:00:00Z"));
        assert_eq!(
            Value::from(ts).write_with(TimeFormat::EpochSeconds).as_deref(),
            Some("0")
        );
    }

    #[test]
    fn test_bool_lexical_forms() {
        let mut v = Value::undefined(ValueKind::Bool);
        for (text, expected) in [("true", true), ("0", false), ("1", true), ("FALSE", false)] {
            assert!(v.read(text));
            assert_eq!(v.as_bool(), Some(expected));
        }
    }

    #[test]
    fn test_text_time_conversion() {
        let v = Value::from("2024-05-01T00:00:00Z");
        let t = v.as_time().expect("time");
        assert_eq!(Value::from(t).as_int(), Some(1_714_521_600));
        assert_eq!(Value::from(1_714_521_600i64).convert(ValueKind::Time), Value::from(t));
    }

    #[test]
    fn test_compare() {
        use Ordering::{Greater, Less};
        let cases = [
            (Value::undefined(ValueKind::Int), Value::from(i64::MIN), Less),
            (Value::null(), Value::from(false), Less),
            (Value::from(2i64), Value::from(10.5), Less),
            (Value::from(true), Value::from(0i64), Greater),
            (Value::from(f64::NAN), Value::from(1.0), Greater),
            // lexicographic when not both numeric
            (Value::from("10"), Value::from("9"), Less),
        ];
        for (a, b, expected) in cases {
            assert_eq!(a.compare(&b), expected, "{} vs {}", a, b);
            assert_eq!(b.compare(&a), expected.reverse(), "{} vs {}", b, a);
        }
        assert_eq!(Value::from("42"), Value::from(42i64));
    }

    #[test]
    fn test_compare_is_not_transitive_across_kinds() {
        let (t10, i10, i9, t9) = (
            Value::from("10"),
            Value::from(10i64),
            Value::from(9i64),
            Value::from("9"),
        );
        assert_eq!(t10, i10);
        assert_eq!(i10.compare(&i9), Ordering::Greater);
        assert_eq!(i9, t9);
        assert_eq!(t9.compare(&t10), Ordering::Greater);

        // Within one kind it sorts.
        let mut ints = vec![Value::from(3i64), Value::from(-1i64), Value::from(2i64)];
        ints.sort_by(Value::compare);
        assert_eq!(ints, [Value::from(-1i64), Value::from(2i64), Value::from(3i64)]);
    }

    #[test]
    fn test_default_resets_to_zero() {
        let mut v = Value::from("hello");
        v.set_default();
        assert_eq!(v.text(), Some(""));
        assert!(v.is_good());
    }

    #[test]
    fn test_null_assignment_adopts() {
        let mut v = Value::null();
        v.assign(&Value::from(12i64));
        assert_eq!(v.kind(), ValueKind::Int);

        let mut typed = Value::undefined(ValueKind::Float);
        typed.set(3i32);
        assert_eq!(typed.kind(), ValueKind::Float);
        assert_eq!(typed.get::<f64>(), Some(3.0));
    }

    #[test]
    fn test_narrow_int_scalars() {
        assert_eq!(Value::from(300i64).get::<u8>(), None);
        assert_eq!(Value::from(200i64).get::<u8>(), Some(200));
        assert!(u64::MAX.to_value().is_bad());
    }
}
