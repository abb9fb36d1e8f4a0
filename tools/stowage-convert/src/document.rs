// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire form detection and DOM-based conversion.

use anyhow::{bail, Context};
use std::path::Path;
use stowage::{
    Identity, JsonTransport, Node, SendOptions, Transport, TransportError, TransportPolicy,
    XmlTransport,
};

/// Name used for the output root when the input carries none.
pub const DEFAULT_ROOT: &str = "root";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Xml,
    Json,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("xml") => Some(Format::Xml),
            Some("json") => Some(Format::Json),
            _ => None,
        }
    }

    /// Sniff the first non-blank character.
    pub fn sniff(text: &str) -> Option<Self> {
        match text.trim_start().chars().next()? {
            '<' => Some(Format::Xml),
            '{' | '[' => Some(Format::Json),
            _ => None,
        }
    }

    pub fn resolve(explicit: Option<Self>, path: &Path, text: &str) -> anyhow::Result<Self> {
        if let Some(format) = explicit.or_else(|| Self::from_extension(path)) {
            return Ok(format);
        }
        match Self::sniff(text) {
            Some(format) => {
                log::info!("[Format::resolve] detected {:?} for {}", format, path.display());
                Ok(format)
            }
            None => bail!(
                "cannot tell the format of {}; use --from to specify it",
                path.display()
            ),
        }
    }

    fn transport(self, policy: TransportPolicy) -> Box<dyn Transport> {
        match self {
            Format::Xml => Box::new(XmlTransport::with_policy(policy)),
            Format::Json => Box::new(JsonTransport::with_policy(policy)),
        }
    }
}

/// Parsed document plus the root name it arrived under.
pub struct Document {
    pub root: String,
    pub node: Node,
}

/// Root element name of an XML document; JSON carries none.
fn root_name(format: Format, text: &str) -> Result<Option<String>, TransportError> {
    match format {
        Format::Xml => Ok(Some(XmlTransport::new().parse(text)?.name().to_string())),
        Format::Json => Ok(None),
    }
}

/// Error text with the position the transport stopped at.
fn located(error: &TransportError) -> String {
    if error.row == 0 {
        return error.to_string();
    }
    format!("{} (row {}, column {})", error, error.row, error.column)
}

/// Read `text` into a document tree.
pub fn read(
    format: Format,
    text: &str,
    root: Option<&str>,
    policy: &TransportPolicy,
) -> anyhow::Result<Document> {
    let found = root_name(format, text).map_err(|e| anyhow::anyhow!(located(&e)))?;
    let identity = Identity::new(root.unwrap_or_default());
    let mut transport = format.transport(policy.clone());
    let mut node = Node::Undefined;
    transport
        .receive_str(&mut node, &identity, text)
        .map_err(|e| anyhow::anyhow!(located(&e)))?;
    log::debug!(
        "[read] {:?} document, {} top-level members",
        format,
        node.len()
    );
    Ok(Document {
        root: root
            .map(str::to_string)
            .or(found)
            .unwrap_or_else(|| DEFAULT_ROOT.to_string()),
        node,
    })
}

/// Render a document tree.
pub fn write(
    format: Format,
    document: &Document,
    options: &SendOptions,
    policy: &TransportPolicy,
) -> anyhow::Result<String> {
    let mut transport = format.transport(policy.clone());
    let mut text = transport
        .send_to_string(&document.node, &Identity::new(document.root.as_str()), options)
        .with_context(|| format!("writing {:?}", format))?;
    if !text.ends_with('\n') {
        text.push('\n');
    }
    Ok(text)
}

/// Parse only; returns the root name when the format has one.
pub fn check(format: Format, text: &str) -> anyhow::Result<Option<String>> {
    let parsed = match format {
        Format::Xml => XmlTransport::new().parse(text).map(|p| Some(p.name().to_string())),
        Format::Json => JsonTransport::new().parse(text, DEFAULT_ROOT).map(|_| None),
    };
    parsed.map_err(|e| anyhow::anyhow!(located(&e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection() {
        assert_eq!(Format::from_extension(Path::new("a.xml")), Some(Format::Xml));
        assert_eq!(Format::from_extension(Path::new("a.txt")), None);
        assert_eq!(Format::sniff("  \n<doc/>"), Some(Format::Xml));
        assert_eq!(Format::sniff("[1]"), Some(Format::Json));
        assert!(Format::resolve(None, Path::new("a.txt"), "plain").is_err());
    }

    #[test]
    fn test_json_to_xml_uses_default_root() {
        let policy = TransportPolicy::default();
        let doc = read(Format::Json, r#"{"a":1,"b":[true,false]}"#, None, &policy).expect("read");
        assert_eq!(doc.root, DEFAULT_ROOT);
        let xml = write(Format::Xml, &doc, &SendOptions::new(), &policy).expect("write");
        assert_eq!(xml, "<root><a>1</a><b>true</b><b>false</b></root>\n");
    }

    #[test]
    fn test_xml_to_json_keeps_values_as_text() {
        let policy = TransportPolicy::default();
        let doc = read(Format::Xml, "<cfg><port>80</port></cfg>", None, &policy).expect("read");
        assert_eq!(doc.root, "cfg");
        let json = write(Format::Json, &doc, &SendOptions::new(), &policy).expect("write");
        assert_eq!(json, "{\"port\":\"80\"}\n");
    }

    #[test]
    fn test_check_reports_position() {
        let err = check(Format::Json, "{\n  \"a\": tru\n}").expect_err("bad keyword");
        assert!(err.to_string().contains("row 2"), "{}", err);
        assert_eq!(check(Format::Xml, "<a/>").expect("ok"), Some("a".to_string()));
    }
}
