//! XML serialization

use crate::xml::model::{Content, Document, Element};

/// Default indentation width
pub const DEFAULT_INDENT: usize = 4;

/// Output settings for [`Writer`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriterConfig {
    /// Spaces per nesting level; zero writes everything on one line
    pub indent: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
        }
    }
}

/// Pretty-printing XML writer
///
/// Elements that hold character data are written on one line, exactly as
/// parsed, so mixed content and conditions like `<Custom>` bodies are never
/// re-indented.
#[derive(Clone, Debug, Default)]
pub struct Writer {
    config: WriterConfig,
}

impl Writer {
    pub const fn new(config: WriterConfig) -> Self {
        Self { config }
    }

    /// Serialize a whole document, prolog and epilog included
    pub fn write_document(&self, doc: &Document) -> String {
        let mut out = String::new();
        for node in &doc.prolog {
            write_inline(node, &mut out);
            self.newline(&mut out);
        }
        self.write_element(&doc.root, 0, &mut out);
        for node in &doc.epilog {
            self.newline(&mut out);
            write_inline(node, &mut out);
        }
        out.push('\n');
        out
    }

    /// Serialize one element subtree starting at column zero
    pub fn write_fragment(&self, element: &Element) -> String {
        let mut out = String::new();
        self.write_element(element, 0, &mut out);
        out
    }

    fn write_element(&self, element: &Element, depth: usize, out: &mut String) {
        self.pad(depth, out);
        write_start_tag(element, out);

        if element.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');

        if self.config.indent == 0 || element.children.iter().any(Content::is_text) {
            for child in &element.children {
                write_inline(child, out);
            }
        } else {
            for child in &element.children {
                self.newline(out);
                match child {
                    Content::Element(e) => self.write_element(e, depth + 1, out),
                    other => {
                        self.pad(depth + 1, out);
                        write_inline(other, out);
                    }
                }
            }
            self.newline(out);
            self.pad(depth, out);
        }

        write_end_tag(element, out);
    }

    fn newline(&self, out: &mut String) {
        if self.config.indent > 0 {
            out.push('\n');
        }
    }

    fn pad(&self, depth: usize, out: &mut String) {
        for _ in 0..depth.saturating_mul(self.config.indent) {
            out.push(' ');
        }
    }
}

fn write_inline(node: &Content, out: &mut String) {
    match node {
        Content::Element(element) => {
            write_start_tag(element, out);
            if element.children.is_empty() {
                out.push_str("/>");
            } else {
                out.push('>');
                for child in &element.children {
                    write_inline(child, out);
                }
                write_end_tag(element, out);
            }
        }
        Content::Text(text) => out.push_str(&escape_text(text)),
        Content::CData(data) => {
            out.push_str("<![CDATA[");
            out.push_str(data);
            out.push_str("]]>");
        }
        Content::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        Content::ProcessingInstruction { target, data } => {
            out.push_str("<?");
            out.push_str(target);
            if !data.is_empty() {
                out.push(' ');
                out.push_str(data);
            }
            out.push_str("?>");
        }
    }
}

fn write_start_tag(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for (key, value) in &element.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape_attribute(value));
        out.push('"');
    }
}

fn write_end_tag(element: &Element, out: &mut String) {
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

/// Escape character data
pub fn escape_text(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape a double-quoted attribute value
pub fn escape_attribute(input: &str) -> String {
    escape_text(input)
        .replace('"', "&quot;")
        .replace('\n', "&#10;")
        .replace('\t', "&#9;")
}
