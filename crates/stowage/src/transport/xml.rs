// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tag-and-attribute wire form.
//!
//! - one element per package, named after its entry
//! - attribute entries become XML attributes
//! - repeating entries repeat their element; bare sequences nest their
//!   items under the item tag
//! - scalars go to the element text body
//!
//! Parsing uses `roxmltree`; an element with neither attributes nor child
//! elements reads as a scalar.

use super::{Exporter, Importer, Lexeme, Parcel, Position, Shape, Transport};
use crate::cargo::Cargo;
use crate::config::{SendOptions, TransportPolicy};
use crate::error::TransportError;
use crate::inventory::{Identity, Role};
use std::io::{Read, Write};

const PROLOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Root element name used when the identity has none.
const ANONYMOUS_ROOT: &str = "root";

/// XML-like transport.
#[derive(Debug, Clone, Default)]
pub struct XmlTransport {
    policy: TransportPolicy,
    last: Position,
}

impl XmlTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: TransportPolicy) -> Self {
        Self {
            policy,
            last: Position::default(),
        }
    }

    /// Parse `text` into a parcel tree without touching any cargo.
    pub fn parse(&self, text: &str) -> Result<Parcel, TransportError> {
        crate::trace_fn!("XmlTransport::parse");
        let doc = roxmltree::Document::parse(text).map_err(|e| {
            let pos = e.pos();
            TransportError::syntax(e.to_string(), pos.row as usize, pos.col as usize)
        })?;
        Ok(Reader { doc: &doc, text }.element(doc.root_element()))
    }
}

struct Reader<'d, 'input> {
    doc: &'d roxmltree::Document<'input>,
    text: &'input str,
}

impl<'input> Reader<'_, 'input> {
    fn position(&self, offset: usize) -> Position {
        let pos = self.doc.text_pos_at(offset);
        Position::new(pos.row as usize, pos.col as usize)
    }

    /// Position of the `>` closing the start tag that begins at `start`.
    fn start_tag_end(&self, start: usize) -> Position {
        let mut quote = None;
        for (i, c) in self.text[start..].char_indices() {
            match (quote, c) {
                (None, '"' | '\'') => quote = Some(c),
                (Some(q), c) if c == q => quote = None,
                (None, '>') => return self.position(start + i),
                _ => {}
            }
        }
        self.position(start)
    }

    fn element(&self, node: roxmltree::Node<'_, 'input>) -> Parcel {
        let start = node.range().start;
        let position = self.position(start);
        let identity = Identity::new(node.tag_name().name()).with_role(Role::Element);

        let children: Vec<_> = node.children().filter(|c| c.is_element()).collect();
        if node.attributes().next().is_none() && children.is_empty() {
            let lexeme = if node.has_children() {
                Lexeme::Text(
                    node.children()
                        .filter(|c| c.is_text())
                        .filter_map(|c| c.text())
                        .collect(),
                )
            } else {
                Lexeme::Empty
            };
            return Parcel::new(identity, position, Shape::Scalar(lexeme));
        }

        let attributes_end = self.start_tag_end(start);
        let mut members: Vec<Parcel> = node
            .attributes()
            .map(|attr| {
                Parcel::new(
                    Identity::new(attr.name()).with_role(Role::Attribute),
                    position,
                    Shape::Scalar(Lexeme::Text(attr.value().to_string())),
                )
            })
            .collect();
        members.extend(children.into_iter().map(|child| self.element(child)));
        Parcel::new(
            identity,
            position,
            Shape::Group {
                members,
                attributes_end,
            },
        )
    }
}

impl Transport for XmlTransport {
    fn send(
        &mut self,
        cargo: &dyn Cargo,
        identity: &Identity,
        sink: &mut dyn Write,
        options: &SendOptions,
    ) -> Result<(), TransportError> {
        crate::trace_fn!("XmlTransport::send");
        let root_name = if identity.name.is_empty() {
            ANONYMOUS_ROOT
        } else {
            identity.name.as_str()
        };
        let root_identity = Identity::new(root_name);
        let parcel = Exporter::new(&self.policy)
            .run(cargo, &root_identity)?
            .unwrap_or_else(|| {
                Parcel::new(root_identity.clone(), Position::default(), Shape::Scalar(Lexeme::Null))
            });

        let mut writer = Writer {
            out: String::new(),
            options,
            policy: &self.policy,
        };
        if options.prolog {
            writer.out.push_str(PROLOG);
            writer.newline();
        }
        writer.element(&parcel, 0, true);
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
        crate::trace_fn!("XmlTransport::receive");
        self.last = Position::default();
        let mut text = String::new();
        source.read_to_string(&mut text)?;

        let parcel = self.parse(&text).inspect_err(|e| {
            self.last = Position::new(e.row, e.column);
        })?;
        self.last = parcel.position;

        if !identity.name.is_empty() && parcel.name() != identity.name {
            return Err(TransportError::structural(format!(
                "expected root '{}', found '{}'",
                identity.name,
                parcel.name()
            ))
            .within(parcel.name())
            .at(parcel.position.row, parcel.position.column));
        }

        let mut importer = Importer::new(&self.policy);
        let result = importer.run(cargo, &parcel);
        self.last = importer.last();
        if let Err(e) = &result {
            log::debug!("[XmlTransport::receive] {}", e);
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
    fn newline(&mut self) {
        if self.options.line_feeds {
            self.out.push('\n');
        }
    }

    fn indent(&mut self, depth: usize) {
        if self.options.tabbed {
            for _ in 0..depth {
                self.out.push('\t');
            }
        }
    }

    fn lexeme_text(&self, lexeme: &Lexeme) -> Option<String> {
        match lexeme {
            Lexeme::Empty | Lexeme::Null => None,
            Lexeme::Text(text) => Some(text.clone()),
            Lexeme::Typed(value) => value.write_with(self.policy.time_format),
        }
    }

    fn open(&mut self, name: &str, depth: usize, root: bool) {
        self.indent(depth);
        self.out.push('<');
        self.out.push_str(name);
        if root {
            for (prefix, uri) in &self.options.namespaces {
                if prefix.is_empty() {
                    self.out.push_str(" xmlns=\"");
                } else {
                    self.out.push_str(" xmlns:");
                    self.out.push_str(prefix);
                    self.out.push_str("=\"");
                }
                escape_into(&mut self.out, uri);
                self.out.push('"');
            }
        }
    }

    fn close(&mut self, name: &str, depth: usize) {
        self.indent(depth);
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
        self.newline();
    }

    fn element(&mut self, parcel: &Parcel, depth: usize, root: bool) {
        let name = parcel.name();
        match &parcel.shape {
            Shape::Scalar(lexeme) => {
                self.open(name, depth, root);
                match self.lexeme_text(lexeme).filter(|t| !t.is_empty()) {
                    Some(text) => {
                        self.out.push('>');
                        escape_into(&mut self.out, &text);
                        self.out.push_str("</");
                        self.out.push_str(name);
                        self.out.push('>');
                    }
                    None => self.out.push_str("/>"),
                }
                self.newline();
            }
            Shape::Group { members, .. } => {
                self.open(name, depth, root);
                let mut children = Vec::new();
                for member in members {
                    match (&member.shape, member.identity.role) {
                        (Shape::Scalar(lexeme), Some(Role::Attribute)) => {
                            let text = self.lexeme_text(lexeme).unwrap_or_default();
                            self.out.push(' ');
                            self.out.push_str(member.name());
                            self.out.push_str("=\"");
                            escape_into(&mut self.out, &text);
                            self.out.push('"');
                        }
                        _ => children.push(member),
                    }
                }
                if children.is_empty() {
                    self.out.push_str("/>");
                    self.newline();
                    return;
                }
                self.out.push('>');
                self.newline();
                for child in children {
                    self.element(child, depth + 1, false);
                }
                self.close(name, depth);
            }
            Shape::Sequence(items) => {
                self.open(name, depth, root);
                if items.is_empty() {
                    self.out.push_str("/>");
                    self.newline();
                    return;
                }
                self.out.push('>');
                self.newline();
                for item in items {
                    self.element(item, depth + 1, false);
                }
                self.close(name, depth);
            }
            Shape::Repeat(items) => {
                for item in items {
                    self.element(item, depth, false);
                }
            }
        }
    }
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_scalars_and_groups() {
        let parcel = XmlTransport::new()
            .parse("<root id=\"3\">\n  <name>box</name>\n  <empty/>\n</root>")
            .expect("parse");
        let Shape::Group {
            members,
            attributes_end,
        } = &parcel.shape
        else {
            panic!("group expected");
        };
        assert_eq!(*attributes_end, Position::new(1, 13));
        assert_eq!(members.len(), 3);
        assert_eq!(members[0].identity.role, Some(Role::Attribute));
        assert_eq!(members[1].shape, Shape::Scalar(Lexeme::Text("box".into())));
        assert_eq!(members[1].position, Position::new(2, 3));
        assert_eq!(members[2].shape, Shape::Scalar(Lexeme::Empty));
    }

    #[test]
    fn test_quoted_gt_does_not_end_start_tag() {
        let parcel = XmlTransport::new()
            .parse("<r a=\"x&gt;y\" b='>'><c/></r>")
            .expect("parse");
        let Shape::Group { attributes_end, .. } = parcel.shape else {
            panic!("group expected");
        };
        assert_eq!(attributes_end, Position::new(1, 20));
    }

    #[test]
    fn test_malformed_input_reports_position() {
        let mut xml = XmlTransport::new();
        let mut node = crate::dom::Node::Undefined;
        let err = xml
            .receive_str(&mut node, &Identity::new("r"), "<r>\n<a></b></r>")
            .expect_err("mismatched tags");
        assert_eq!(err.kind, ErrorKind::Io);
        assert_eq!(xml.last_row(), 2);
    }

    #[test]
    fn test_writer_escapes_and_nests() {
        let doc = crate::dom::Node::object()
            .with("a", "x<y")
            .with("b", crate::dom::Node::array(vec![1i64.into(), 2i64.into()]));
        let text = XmlTransport::new()
            .send_to_string(&doc, &Identity::new("doc"), &SendOptions::new())
            .expect("send");
        assert_eq!(text, "<doc><a>x&lt;y</a><b>1</b><b>2</b></doc>");
    }

    #[test]
    fn test_prolog_and_namespaces() {
        let doc = crate::dom::Node::object().with("a", 1i64);
        let options = SendOptions::pretty()
            .prolog(true)
            .namespace("", "urn:stowage");
        let text = XmlTransport::new()
            .send_to_string(&doc, &Identity::new("doc"), &options)
            .expect("send");
        assert_eq!(
            text,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<doc xmlns=\"urn:stowage\">\n\t<a>1</a>\n</doc>\n"
        );
    }

    #[test]
    fn test_root_name_is_checked() {
        let mut node = crate::dom::Node::Undefined;
        let err = XmlTransport::new()
            .receive_str(&mut node, &Identity::new("expected"), "<other/>")
            .expect_err("wrong root");
        assert_eq!(err.kind, ErrorKind::Structural);
    }
}
