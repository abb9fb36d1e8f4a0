// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! End-to-end reads and writes through both wire formats.

use stowage::{
    AsCargo, Cargo, Entry, ErrorKind, Handler, Identity, Inventory, JsonTransport, MoverList,
    Node, Polymorphic, SendOptions, Transport, TransportPolicy, XmlTransport,
};

fn sample() -> Node {
    Node::object()
        .with("a", 1i64)
        .with(
            "b",
            Node::array(vec![Node::from(true), Node::from(false)]),
        )
        .with("c", Node::object().with("d", "hello"))
}

#[test]
fn test_dom_json_round_trip() {
    let mut json = JsonTransport::new();
    let doc = sample();
    let text = json
        .send_to_string(&doc, &Identity::new("doc"), &SendOptions::new())
        .expect("send");
    assert_eq!(text, r#"{"a":1,"b":[true,false],"c":{"d":"hello"}}"#);

    let mut back = Node::Undefined;
    json.receive_str(&mut back, &Identity::new("doc"), &text)
        .expect("receive");
    assert_eq!(back, doc);
}

#[test]
fn test_dom_json_pretty_round_trip() {
    let mut json = JsonTransport::new();
    let doc = sample();
    let text = json
        .send_to_string(&doc, &Identity::new("doc"), &SendOptions::pretty())
        .expect("send");
    assert!(text.contains("\n\t\"c\": {\n\t\t\"d\": \"hello\"\n\t}"));

    let mut back = Node::Undefined;
    json.receive_str(&mut back, &Identity::new("doc"), &text)
        .expect("receive");
    assert_eq!(back, doc);
}

#[test]
fn test_dom_xml_round_trip() {
    let mut xml = XmlTransport::new();
    let doc = sample();
    let text = xml
        .send_to_string(&doc, &Identity::new("doc"), &SendOptions::new())
        .expect("send");
    assert_eq!(
        text,
        "<doc><a>1</a><b>true</b><b>false</b><c><d>hello</d></c></doc>"
    );

    // XML carries no scalar types: values come back as text and compare
    // equal through their canonical forms.
    let mut back = Node::Undefined;
    xml.receive_str(&mut back, &Identity::new("doc"), &text)
        .expect("receive");
    assert_eq!(back, doc);
    assert_eq!(back.get("b").map(Node::len), Some(2));
}

trait Shape: Polymorphic {
    fn kind(&self) -> &'static str;

    fn size(&self) -> i64;
}

#[derive(Default)]
struct Circle {
    r: i64,
}

#[derive(Default)]
struct Square {
    side: i64,
}

impl Cargo for Circle {
    fn fill_inventory(&self, inventory: &mut Inventory) -> bool {
        inventory.push(Entry::attribute("r").owned_by::<Self>().required());
        true
    }

    fn get_cargo(&self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        (entry.name() == "r").then(|| self.r.as_cargo())
    }

    fn get_cargo_mut(&mut self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        (entry.name() == "r").then(|| self.r.as_cargo_mut())
    }

    fn validate(&mut self) -> bool {
        self.r >= 0
    }
}

impl Cargo for Square {
    fn fill_inventory(&self, inventory: &mut Inventory) -> bool {
        inventory.push(Entry::attribute("side").owned_by::<Self>().required());
        true
    }

    fn get_cargo(&self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        (entry.name() == "side").then(|| self.side.as_cargo())
    }

    fn get_cargo_mut(&mut self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        (entry.name() == "side").then(|| self.side.as_cargo_mut())
    }
}

impl Polymorphic for Circle {}
impl Polymorphic for Square {}

impl Shape for Circle {
    fn kind(&self) -> &'static str {
        "circle"
    }

    fn size(&self) -> i64 {
        self.r
    }
}

impl Shape for Square {
    fn kind(&self) -> &'static str {
        "square"
    }

    fn size(&self) -> i64 {
        self.side
    }
}

fn shapes() -> Handler<dyn Shape> {
    let mut handler: Handler<dyn Shape> = Handler::new();
    handler.add(&["circle"], || Box::new(Circle::default()));
    handler.add(&["square"], || Box::new(Square::default()));
    handler
}

fn drawing() -> Vec<Box<dyn Shape>> {
    vec![Box::new(Circle { r: 2 }), Box::new(Square { side: 3 })]
}

fn summary(shapes: &[Box<dyn Shape>]) -> Vec<(&'static str, i64)> {
    shapes.iter().map(|s| (s.kind(), s.size())).collect()
}

#[test]
fn test_polymorphic_container_over_xml() {
    let handler = shapes();
    let original = drawing();
    let mut xml = XmlTransport::new();
    let root = Identity::new("drawing");

    let text = xml
        .send_to_string(
            &MoverList::new(&handler, &original, "shape"),
            &root,
            &SendOptions::new(),
        )
        .expect("send");
    assert_eq!(
        text,
        r#"<drawing><shape type="circle" r="2"/><shape type="square" side="3"/></drawing>"#
    );

    let mut restored: Vec<Box<dyn Shape>> = Vec::new();
    xml.receive_str(&mut MoverList::new(&handler, &mut restored, "shape"), &root, &text)
        .expect("receive");
    assert_eq!(summary(&restored), [("circle", 2), ("square", 3)]);
}

#[test]
fn test_polymorphic_container_over_json() {
    let handler = shapes();
    let original = drawing();
    let mut json = JsonTransport::new();
    let root = Identity::new("drawing");

    let text = json
        .send_to_string(
            &MoverList::new(&handler, &original, "shape"),
            &root,
            &SendOptions::new(),
        )
        .expect("send");
    assert_eq!(text, r#"[{"type":"circle","r":2},{"type":"square","side":3}]"#);

    let mut restored: Vec<Box<dyn Shape>> = Vec::new();
    json.receive_str(&mut MoverList::new(&handler, &mut restored, "shape"), &root, &text)
        .expect("receive");
    assert_eq!(summary(&restored), [("circle", 2), ("square", 3)]);
}

#[test]
fn test_unknown_discriminator_aborts() {
    let handler = shapes();
    let mut xml = XmlTransport::new();
    let mut restored: Vec<Box<dyn Shape>> = Vec::new();
    let text = "<drawing>\n  <shape type=\"circle\" r=\"1\"/>\n  <shape type=\"hexagon\"/>\n</drawing>";
    let err = xml
        .receive_str(
            &mut MoverList::new(&handler, &mut restored, "shape"),
            &Identity::new("drawing"),
            text,
        )
        .expect_err("hexagon is not registered");
    assert_eq!(err.kind, ErrorKind::TypeDiscrimination);
    assert!(err.message.contains("hexagon"));
    assert_eq!(xml.last_row(), 3);
    // The circle was committed before the failure.
    assert_eq!(summary(&restored), [("circle", 1)]);
}

#[test]
fn test_validation_failure_names_the_cargo() {
    let handler = shapes();
    let mut json = JsonTransport::new();
    let mut restored: Vec<Box<dyn Shape>> = Vec::new();
    let err = json
        .receive_str(
            &mut MoverList::new(&handler, &mut restored, "shape"),
            &Identity::new("drawing"),
            r#"[{"type":"circle","r":-4}]"#,
        )
        .expect_err("negative radius");
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(restored.is_empty());
}

/// Entries declared out of order: `name`, `id`, `payload`.
#[derive(Debug, Default, PartialEq)]
struct Record {
    id: i64,
    name: String,
    payload: String,
}

impl Cargo for Record {
    fn fill_inventory(&self, inventory: &mut Inventory) -> bool {
        inventory.push(Entry::attribute("name").owned_by::<Self>().with_index(2));
        inventory.push(
            Entry::attribute("id")
                .owned_by::<Self>()
                .with_index(0)
                .required(),
        );
        inventory.push(Entry::element("payload").owned_by::<Self>().with_index(1));
        true
    }

    fn get_cargo(&self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        match entry.name() {
            "id" => Some(self.id.as_cargo()),
            "name" => Some(self.name.as_cargo()),
            "payload" => Some(self.payload.as_cargo()),
            _ => None,
        }
    }

    fn get_cargo_mut(&mut self, entry: &Entry) -> Option<Box<dyn Cargo + '_>> {
        match entry.name() {
            "id" => Some(self.id.as_cargo_mut()),
            "name" => Some(self.name.as_cargo_mut()),
            "payload" => Some(self.payload.as_cargo_mut()),
            _ => None,
        }
    }
}

fn record() -> Record {
    Record {
        id: 7,
        name: "seven".into(),
        payload: "data".into(),
    }
}

#[test]
fn test_attributes_serialise_first() {
    let mut inventory = Inventory::new();
    record().fill_inventory(&mut inventory);
    let order: Vec<&str> = inventory
        .sequence()
        .into_iter()
        .map(|pos| inventory.entries()[pos].name())
        .collect();
    assert_eq!(order, ["id", "name", "payload"]);

    let text = JsonTransport::new()
        .send_to_string(&record(), &Identity::new("record"), &SendOptions::new())
        .expect("json");
    assert_eq!(text, r#"{"id":7,"name":"seven","payload":"data"}"#);

    let text = XmlTransport::new()
        .send_to_string(&record(), &Identity::new("record"), &SendOptions::new())
        .expect("xml");
    assert_eq!(text, r#"<record id="7" name="seven"><payload>data</payload></record>"#);
}

#[test]
fn test_record_round_trip_both_formats() {
    let root = Identity::new("record");
    let transports: [Box<dyn Transport>; 2] =
        [Box::new(XmlTransport::new()), Box::new(JsonTransport::new())];
    for mut transport in transports {
        let text = transport
            .send_to_string(&record(), &root, &SendOptions::pretty())
            .expect("send");
        let mut back = Record::default();
        transport
            .receive_str(&mut back, &root, &text)
            .expect("receive");
        assert_eq!(back, record());
    }
}

#[test]
fn test_missing_required_attribute_xml_position() {
    let policy = TransportPolicy::default().with_missing_entry_failed(true);
    let mut xml = XmlTransport::with_policy(policy);
    let mut back = Record::default();
    let err = xml
        .receive_str(
            &mut back,
            &Identity::new("record"),
            "<record name=\"hi\">\n  <payload>p</payload>\n</record>",
        )
        .expect_err("id is required");
    assert_eq!(err.kind, ErrorKind::Structural);
    assert!(err.message.contains("'id'"));
    assert_eq!((xml.last_row(), xml.last_column()), (1, 18));
    assert_eq!((err.row, err.column), (1, 18));
    // Entries read before the failure stay committed.
    assert_eq!(back.payload, "p");
}

#[test]
fn test_missing_required_attribute_json_position() {
    let policy = TransportPolicy::default().with_missing_entry_failed(true);
    let mut json = JsonTransport::with_policy(policy);
    let mut back = Record::default();
    let err = json
        .receive_str(
            &mut back,
            &Identity::new("record"),
            "{\n  \"name\": \"hi\"\n}",
        )
        .expect_err("id is required");
    assert_eq!(err.kind, ErrorKind::Structural);
    assert_eq!((json.last_row(), json.last_column()), (3, 1));
}

#[test]
fn test_missing_required_tolerated_by_default() {
    let mut back = Record::default();
    XmlTransport::new()
        .receive_str(&mut back, &Identity::new("record"), "<record name=\"hi\"/>")
        .expect("lenient");
    assert_eq!(back.name, "hi");
    assert_eq!(back.id, 0);
}

#[test]
fn test_lexical_error_reports_path_and_position() {
    let mut json = JsonTransport::new();
    let mut back = Record::default();
    let err = json
        .receive_str(
            &mut back,
            &Identity::new("record"),
            "{\"name\": \"x\",\n \"id\": \"seven\"}",
        )
        .expect_err("id is not a number");
    assert_eq!(err.kind, ErrorKind::Lexical);
    assert_eq!(err.path, "record/id");
    assert_eq!(json.last_row(), 2);
}

#[test]
fn test_strict_policy_rejects_unknown_names() {
    let mut xml = XmlTransport::with_policy(TransportPolicy::strict());
    let mut back = Record::default();
    let err = xml
        .receive_str(
            &mut back,
            &Identity::new("record"),
            "<record id=\"1\">\n  <colour>red</colour>\n</record>",
        )
        .expect_err("colour is unknown");
    assert_eq!(err.kind, ErrorKind::Structural);
    assert_eq!((xml.last_row(), xml.last_column()), (2, 3));
}
