// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Name-value wire form.
//!
//! Attributes and elements merge into one JSON object; repeating entries
//! and bare sequences become arrays. Number and boolean cargos keep their
//! native JSON type, everything else is written as a string. Non-finite
//! floats have no JSON form and are written as strings (`"NaN"`, `"inf"`).
//!
//! The document is the root cargo's content; the root identity does not
//! appear on the wire.

use super::{Exporter, Importer, Lexeme, Parcel, Position, Shape, Transport};
use crate::cargo::Cargo;
use crate::config::{SendOptions, TransportPolicy};
use crate::error::TransportError;
use crate::inventory::{Identity, Role};
use crate::value::{Data, Value};
use std::io::{Read, Write};

/// JSON-like transport.
#[derive(Debug, Clone, Default)]
pub struct JsonTransport {
    policy: TransportPolicy,
    last: Position,
}

impl JsonTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: TransportPolicy) -> Self {
        Self {
            policy,
            last: Position::default(),
        }
    }

    /// Parse `text` into a parcel tree named `root`.
    pub fn parse(&self, text: &str, root: &str) -> Result<Parcel, TransportError> {
        crate::trace_fn!("JsonTransport::parse");
        let mut lexer = Lexer::new(text, &self.policy.item_tag);
        lexer.skip_whitespace();
        let parcel = lexer.value(Identity::new(root))?;
        lexer.skip_whitespace();
        if let Some(ch) = lexer.peek_char() {
            return Err(lexer.error(format!("unexpected '{}' after the document", ch)));
        }
        Ok(parcel)
    }
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    row: usize,
    column: usize,
    item_tag: &'a str,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str, item_tag: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            row: 1,
            column: 1,
            item_tag,
        }
    }

    fn position(&self) -> Position {
        Position::new(self.row, self.column)
    }

    fn error(&self, message: String) -> TransportError {
        TransportError::syntax(message, self.row, self.column)
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.row += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), TransportError> {
        match self.peek_char() {
            Some(ch) if ch == expected => {
                self.next_char();
                Ok(())
            }
            Some(ch) => Err(self.error(format!("expected '{}', found '{}'", expected, ch))),
            None => Err(self.error(format!("expected '{}', found end of input", expected))),
        }
    }

    fn value(&mut self, identity: Identity) -> Result<Parcel, TransportError> {
        let position = self.position();
        let shape = match self.peek_char() {
            Some('{') => self.object()?,
            Some('[') => Shape::Sequence(self.array()?),
            Some('"') => Shape::Scalar(Lexeme::Text(self.string()?)),
            Some('t' | 'f' | 'n') => Shape::Scalar(self.keyword()?),
            Some(ch) if ch == '-' || ch.is_ascii_digit() => Shape::Scalar(self.number()?),
            Some(ch) => return Err(self.error(format!("unexpected '{}'", ch))),
            None => return Err(self.error("unexpected end of input".to_string())),
        };
        let identity = match shape {
            Shape::Sequence(_) => identity.with_role(Role::Array),
            _ => identity.with_role(Role::Element),
        };
        Ok(Parcel::new(identity, position, shape))
    }

    fn object(&mut self) -> Result<Shape, TransportError> {
        self.expect('{')?;
        let mut members = Vec::new();
        self.skip_whitespace();
        if self.peek_char() == Some('}') {
            let attributes_end = self.position();
            self.next_char();
            return Ok(Shape::Group {
                members,
                attributes_end,
            });
        }
        loop {
            self.skip_whitespace();
            if self.peek_char() != Some('"') {
                return Err(self.error("expected a member name".to_string()));
            }
            let name = self.string()?;
            self.skip_whitespace();
            self.expect(':')?;
            self.skip_whitespace();
            members.push(self.value(Identity::new(name))?);
            self.skip_whitespace();
            match self.peek_char() {
                Some(',') => {
                    self.next_char();
                }
                Some('}') => {
                    let attributes_end = self.position();
                    self.next_char();
                    return Ok(Shape::Group {
                        members,
                        attributes_end,
                    });
                }
                _ => return Err(self.error("expected ',' or '}'".to_string())),
            }
        }
    }

    fn array(&mut self) -> Result<Vec<Parcel>, TransportError> {
        self.expect('[')?;
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.peek_char() == Some(']') {
            self.next_char();
            return Ok(items);
        }
        loop {
            self.skip_whitespace();
            items.push(self.value(Identity::new(self.item_tag))?);
            self.skip_whitespace();
            match self.peek_char() {
                Some(',') => {
                    self.next_char();
                }
                Some(']') => {
                    self.next_char();
                    return Ok(items);
                }
                _ => return Err(self.error("expected ',' or ']'".to_string())),
            }
        }
    }

    /// Quoted string; escapes are resolved by `serde_json`.
    fn string(&mut self) -> Result<String, TransportError> {
        let start = self.pos;
        let position = self.position();
        self.expect('"')?;
        loop {
            match self.next_char() {
                Some('\\') => {
                    self.next_char();
                }
                Some('"') => break,
                Some(_) => {}
                None => {
                    return Err(TransportError::syntax(
                        "unterminated string",
                        position.row,
                        position.column,
                    ))
                }
            }
        }
        serde_json::from_str::<String>(&self.input[start..self.pos]).map_err(|e| {
            TransportError::syntax(
                format!("invalid string: {}", e),
                position.row,
                position.column,
            )
        })
    }

    fn keyword(&mut self) -> Result<Lexeme, TransportError> {
        let rest = &self.input[self.pos..];
        let (word, lexeme) = if rest.starts_with("true") {
            ("true", Lexeme::Typed(Value::from(true)))
        } else if rest.starts_with("false") {
            ("false", Lexeme::Typed(Value::from(false)))
        } else if rest.starts_with("null") {
            ("null", Lexeme::Null)
        } else {
            return Err(self.error("unknown keyword".to_string()));
        };
        for _ in 0..word.len() {
            self.next_char();
        }
        Ok(lexeme)
    }

    fn number(&mut self) -> Result<Lexeme, TransportError> {
        let start = self.pos;
        let position = self.position();
        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_digit() || matches!(ch, '-' | '+' | '.' | 'e' | 'E') {
                self.next_char();
            } else {
                break;
            }
        }
        let text = &self.input[start..self.pos];
        let invalid = || {
            TransportError::syntax(
                format!("invalid number '{}'", text),
                position.row,
                position.column,
            )
        };
        if !text.contains(['.', 'e', 'E']) {
            if let Ok(i) = text.parse::<i64>() {
                return Ok(Lexeme::Typed(Value::from(i)));
            }
        }
        text.parse::<f64>()
            .map(|f| Lexeme::Typed(Value::from(f)))
            .map_err(|_| invalid())
    }
}

impl Transport for JsonTransport {
    fn send(
        &mut self,
        cargo: &dyn Cargo,
        identity: &Identity,
        sink: &mut dyn Write,
        options: &SendOptions,
    ) -> Result<(), TransportError> {
        crate::trace_fn!("JsonTransport::send");
        let parcel = Exporter::new(&self.policy).run(cargo, identity)?;
        let mut writer = Writer {
            out: String::new(),
            options,
            policy: &self.policy,
        };
        match &parcel {
            Some(parcel) => writer.value(parcel, 0),
            None => writer.out.push_str("null"),
        }
        if options.line_feeds {
            writer.out.push('\n');
        }
        sink.write_all(writer.out.as_bytes())?;
        sink.flush()?;
        Ok(())
    }

    fn receive(
        &mut self,
        cargo: &mut dyn Cargo,
        identity: &Identity,
        source: &mut dyn Read,
    ) -> Result<(), TransportError> {
        crate::trace_fn!("JsonTransport::receive");
        self.last = Position::default();
        let mut text = String::new();
        source.read_to_string(&mut text)?;

        let parcel = self.parse(&text, &identity.name).inspect_err(|e| {
            self.last = Position::new(e.row, e.column);
        })?;
        self.last = parcel.position;

        let mut importer = Importer::new(&self.policy);
        let result = importer.run(cargo, &parcel);
        self.last = importer.last();
        if let Err(e) = &result {
            log::debug!("[JsonTransport::receive] {}", e);
        }
        result
    }

    fn last_row(&self) -> usize {
        self.last.row
    }

    fn last_column(&self) -> usize {
        self.last.column
    }

    fn policy(&self) -> &TransportPolicy {
        &self.policy
    }
}

struct Writer<'a> {
    out: String,
    options: &'a SendOptions,
    policy: &'a TransportPolicy,
}

impl Writer<'_> {
    fn break_line(&mut self, depth: usize) {
        if self.options.line_feeds {
            self.out.push('\n');
            if self.options.tabbed {
                for _ in 0..depth {
                    self.out.push('\t');
                }
            }
        }
    }

    fn string(&mut self, text: &str) {
        match serde_json::to_string(text) {
            Ok(quoted) => self.out.push_str(&quoted),
            Err(_) => self.out.push_str("\"\""),
        }
    }

    fn scalar(&mut self, lexeme: &Lexeme) {
        match lexeme {
            Lexeme::Null => self.out.push_str("null"),
            Lexeme::Empty => self.out.push_str("\"\""),
            Lexeme::Text(text) => self.string(text),
            Lexeme::Typed(value) if !value.is_good() => self.out.push_str("null"),
            Lexeme::Typed(value) => match value.data() {
                Data::Null => self.out.push_str("null"),
                Data::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
                Data::Int(i) => self.out.push_str(&i.to_string()),
                Data::Float(f) if f.is_finite() => self.out.push_str(&f.to_string()),
                _ => {
                    let text = value
                        .write_with(self.policy.time_format)
                        .unwrap_or_default();
                    self.string(&text);
                }
            },
        }
    }

    fn list(&mut self, items: &[Parcel], depth: usize) {
        self.out.push('[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.break_line(depth + 1);
            self.value(item, depth + 1);
        }
        if !items.is_empty() {
            self.break_line(depth);
        }
        self.out.push(']');
    }

    fn value(&mut self, parcel: &Parcel, depth: usize) {
        match &parcel.shape {
            Shape::Scalar(lexeme) => self.scalar(lexeme),
            Shape::Sequence(items) | Shape::Repeat(items) => self.list(items, depth),
            Shape::Group { members, .. } => {
                self.out.push('{');
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        self.out.push(',');
                    }
                    self.break_line(depth + 1);
                    self.string(member.name());
                    self.out.push(':');
                    if self.options.line_feeds {
                        self.out.push(' ');
                    }
                    self.value(member, depth + 1);
                }
                if !members.is_empty() {
                    self.break_line(depth);
                }
                self.out.push('}');
            }
        }
    }
}
