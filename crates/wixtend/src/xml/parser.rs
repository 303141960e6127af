//! XML parser implementation

use indexmap::IndexMap;

use crate::error::{Error, ErrorKind, Result, Span};
use crate::lexer::Cursor;
use crate::xml::model::{Content, Document, Element};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// XML parser
#[derive(Debug)]
pub struct Parser<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Parser<'a> {
    /// Create a new XML parser
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(input),
        }
    }

    /// Parse an XML document
    pub fn parse(&mut self) -> Result<Document> {
        if self.cursor.starts_with(UTF8_BOM) {
            self.cursor.advance_by(UTF8_BOM.len());
        }
        let prolog = self.parse_misc()?;
        if self.cursor.is_eof() {
            return Err(self.error_here(ErrorKind::MissingRoot));
        }

        let root = self.parse_element()?;
        let epilog = self.parse_misc()?;

        if !self.cursor.is_eof() {
            return Err(self.error_here(ErrorKind::TrailingContent));
        }

        Ok(Document {
            prolog,
            root,
            epilog,
        })
    }

    /// Comments, processing instructions and doctype outside the root
    fn parse_misc(&mut self) -> Result<Vec<Content>> {
        let mut nodes = Vec::new();
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.starts_with(b"<?") {
                nodes.push(self.parse_processing_instruction()?);
            } else if self.cursor.starts_with(b"<!--") {
                nodes.push(self.parse_comment()?);
            } else if self.cursor.starts_with(b"<!") {
                self.skip_doctype()?;
            } else {
                return Ok(nodes);
            }
        }
    }

    fn parse_element(&mut self) -> Result<Element> {
        self.expect_byte(b'<')?;
        if self.cursor.current() == Some(b'/') {
            return Err(self.error_here(ErrorKind::InvalidToken));
        }

        let name = self.parse_name()?;
        let attributes = self.parse_attributes()?;

        if self.cursor.consume(b'/') {
            self.expect_byte(b'>')?;
            return Ok(Element {
                name,
                attributes,
                children: Vec::new(),
            });
        }

        self.expect_byte(b'>')?;

        let mut children = Vec::new();
        loop {
            if self.cursor.starts_with(b"</") {
                self.cursor.advance_by(2);
                let close_name = self.parse_name()?;
                if close_name != name {
                    return Err(self.error_here(ErrorKind::MismatchedTag {
                        expected: name,
                        found: close_name,
                    }));
                }
                self.cursor.skip_whitespace();
                self.expect_byte(b'>')?;
                break;
            }

            if self.cursor.starts_with(b"<!--") {
                children.push(self.parse_comment()?);
            } else if self.cursor.starts_with(b"<![CDATA[") {
                self.cursor.advance_by(9);
                let raw = self.read_until(b"]]>")?;
                children.push(Content::CData(bytes_to_string(raw)?));
            } else if self.cursor.starts_with(b"<?") {
                children.push(self.parse_processing_instruction()?);
            } else if self.cursor.current() == Some(b'<') {
                children.push(Content::Element(self.parse_element()?));
            } else if self.cursor.is_eof() {
                return Err(self.error_here(ErrorKind::UnexpectedEof));
            } else {
                children.push(Content::Text(self.parse_text()?));
            }
        }

        drop_layout_whitespace(&mut children);
        Ok(Element {
            name,
            attributes,
            children,
        })
    }

    fn parse_attributes(&mut self) -> Result<IndexMap<String, String>> {
        let mut attrs = IndexMap::new();

        loop {
            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b'/' | b'>') => break,
                Some(_) => {}
                None => return Err(self.error_here(ErrorKind::UnexpectedEof)),
            }

            let name = self.parse_name()?;
            self.cursor.skip_whitespace();
            self.expect_byte(b'=')?;
            self.cursor.skip_whitespace();
            let value = self.parse_attribute_value()?;

            if attrs.contains_key(&name) {
                return Err(self.error_here(ErrorKind::DuplicateAttribute { name }));
            }
            attrs.insert(name, value);
        }

        Ok(attrs)
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        let quote = match self.cursor.current() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => return Err(self.error_here(ErrorKind::InvalidToken)),
        };
        self.cursor.advance();

        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == quote {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance();
                return self.decode(raw);
            }
            if b == b'<' {
                return Err(self.error_here(ErrorKind::InvalidToken));
            }
            self.cursor.advance();
        }

        Err(self.error_here(ErrorKind::UnexpectedEof))
    }

    fn parse_text(&mut self) -> Result<String> {
        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == b'<' {
                break;
            }
            self.cursor.advance();
        }

        self.decode(self.cursor.slice_from(start))
    }

    fn parse_name(&mut self) -> Result<String> {
        let start = self.cursor.pos();

        match self.cursor.current() {
            Some(first) if is_name_start(first) => self.cursor.advance(),
            Some(_) => return Err(self.error_here(ErrorKind::InvalidToken)),
            None => return Err(self.error_here(ErrorKind::UnexpectedEof)),
        }
        while let Some(b) = self.cursor.current() {
            if is_name_char(b) {
                self.cursor.advance();
            } else {
                break;
            }
        }

        bytes_to_string(self.cursor.slice_from(start))
    }

    fn parse_comment(&mut self) -> Result<Content> {
        self.cursor.advance_by(4);
        let raw = self.read_until(b"-->")?;
        Ok(Content::Comment(bytes_to_string(raw)?))
    }

    fn parse_processing_instruction(&mut self) -> Result<Content> {
        self.cursor.advance_by(2);
        let target = self.parse_name()?;
        self.cursor.skip_whitespace();
        let raw = self.read_until(b"?>")?;
        let data = bytes_to_string(raw)?.trim_end().to_string();
        Ok(Content::ProcessingInstruction { target, data })
    }

    fn skip_doctype(&mut self) -> Result<()> {
        // internal subsets nest one level of brackets
        let mut depth = 0usize;
        while let Some(b) = self.cursor.current() {
            self.cursor.advance();
            match b {
                b'[' => depth += 1,
                b']' => depth = depth.saturating_sub(1),
                b'>' if depth == 0 => return Ok(()),
                _ => {}
            }
        }
        Err(self.error_here(ErrorKind::UnterminatedMarkup))
    }

    /// Consume input up to and including `pattern`, returning what preceded it
    fn read_until(&mut self, pattern: &[u8]) -> Result<&'a [u8]> {
        let start = self.cursor.pos();
        while !self.cursor.is_eof() {
            if self.cursor.starts_with(pattern) {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance_by(pattern.len());
                return Ok(raw);
            }
            self.cursor.advance();
        }
        Err(self.error_here(ErrorKind::UnterminatedMarkup))
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        match self.cursor.current() {
            Some(b) if b == expected => {
                self.cursor.advance();
                Ok(())
            }
            Some(_) => Err(self.error_here(ErrorKind::InvalidToken)),
            None => Err(self.error_here(ErrorKind::UnexpectedEof)),
        }
    }

    fn decode(&self, raw: &[u8]) -> Result<String> {
        let text = bytes_to_string(raw)?;
        decode_entities(&text).map_err(|kind| self.error_here(kind))
    }

    fn error_here(&self, kind: ErrorKind) -> Error {
        Error::at(kind, self.cursor.position())
    }
}

fn is_blank(content: &Content) -> bool {
    matches!(content, Content::Text(text) if text.bytes().all(|b| b.is_ascii_whitespace()))
}

/// Remove indentation between child nodes.
///
/// Whitespace is content when it is all the element holds or when the element
/// also carries non-blank text or CDATA. Only then is it kept.
fn drop_layout_whitespace(children: &mut Vec<Content>) {
    let has_character_data = children.iter().any(|c| c.is_text() && !is_blank(c));
    let text_only = children.iter().all(is_blank);
    if !has_character_data && !text_only {
        children.retain(|c| !is_blank(c));
    }
}

fn bytes_to_string(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|_| Error::new(ErrorKind::InvalidUtf8, Span::empty()))
}

fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

fn decode_entities(input: &str) -> std::result::Result<String, ErrorKind> {
    if !input.contains('&') {
        return Ok(input.to_string());
    }

    let mut result = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        let (before, after) = rest.split_at(amp);
        result.push_str(before);

        let end = after.find(';').ok_or(ErrorKind::InvalidEntity)?;
        let entity = after.get(1..end).ok_or(ErrorKind::InvalidEntity)?;
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => decode_numeric_entity(entity),
        };
        result.push(decoded.ok_or(ErrorKind::InvalidEntity)?);
        rest = after.get(end + 1..).unwrap_or_default();
    }
    result.push_str(rest);

    Ok(result)
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Document> {
        Parser::new(input.as_bytes()).parse()
    }

    fn first_element(element: &Element) -> Option<&Element> {
        element.child_elements().next()
    }

    #[test]
    fn test_parse_simple_element() -> Result<()> {
        let doc = parse("<root></root>")?;
        assert_eq!(doc.root.name, "root");
        assert!(doc.root.children.is_empty());
        Ok(())
    }

    #[test]
    fn test_parse_with_attributes_in_order() -> Result<()> {
        let doc = parse("<root z=\"1\" a='test' m=\"&quot;x&quot;\"></root>")?;
        let keys: Vec<&str> = doc.root.attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "a", "m"]);
        assert_eq!(doc.root.attr("a"), Some("test"));
        assert_eq!(doc.root.attr("m"), Some("\"x\""));
        Ok(())
    }

    #[test]
    fn test_parse_nested_with_text() -> Result<()> {
        let doc = parse("<root><child>a &amp; b</child></root>")?;
        let child = first_element(&doc.root);
        assert_eq!(child.map(|c| c.name.as_str()), Some("child"));
        assert_eq!(child.map(Element::text), Some("a & b".to_string()));
        Ok(())
    }

    #[test]
    fn test_parse_self_closing() -> Result<()> {
        let doc = parse("<root><child /><other/></root>")?;
        assert_eq!(doc.root.child_elements().count(), 2);
        assert!(doc.root.child("child")?.children.is_empty());
        Ok(())
    }

    #[test]
    fn test_whitespace_between_elements_dropped() -> Result<()> {
        let doc = parse("<root>\n    <a/>\n    <b/>\n</root>")?;
        assert_eq!(doc.root.children.len(), 2);
        Ok(())
    }

    #[test]
    fn test_whitespace_only_content_kept() -> Result<()> {
        let doc = parse("<Product>\n    <Condition Message=\"m\"> </Condition>\n</Product>")?;
        let condition = doc.root.child("Condition")?;
        assert_eq!(condition.children, vec![Content::Text(" ".to_string())]);
        assert_eq!(doc.root.children.len(), 1);
        Ok(())
    }

    #[test]
    fn test_whitespace_between_cdata_kept() -> Result<()> {
        let doc = parse("<Custom Action=\"a\"><![CDATA[x]]> <![CDATA[y]]></Custom>")?;
        assert_eq!(
            doc.root.children,
            vec![
                Content::CData("x".to_string()),
                Content::Text(" ".to_string()),
                Content::CData("y".to_string()),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_whitespace_around_comments_dropped() -> Result<()> {
        let doc = parse("<root>\n    <!-- c -->\n</root>")?;
        assert_eq!(doc.root.children, vec![Content::Comment(" c ".to_string())]);
        Ok(())
    }

    #[test]
    fn test_leading_bom_skipped() -> Result<()> {
        let doc = parse("\u{feff}<?xml version=\"1.0\"?><Wix><Product/></Wix>")?;
        assert_eq!(doc.root.name, "Wix");
        assert_eq!(doc.prolog.len(), 1);
        assert!(doc.root.child("Product").is_ok());
        Ok(())
    }

    #[test]
    fn test_prolog_and_epilog_kept() -> Result<()> {
        let doc = parse(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!-- generated -->\n<!DOCTYPE x>\n<root/>\n<!-- end -->\n",
        )?;
        assert_eq!(
            doc.prolog,
            vec![
                Content::ProcessingInstruction {
                    target: "xml".to_string(),
                    data: "version=\"1.0\" encoding=\"utf-8\"".to_string(),
                },
                Content::Comment(" generated ".to_string()),
            ]
        );
        assert_eq!(doc.epilog, vec![Content::Comment(" end ".to_string())]);
        Ok(())
    }

    #[test]
    fn test_comments_cdata_and_pis_inside_elements() -> Result<()> {
        let doc = parse("<root><!-- c --><?define X=\"1\"?><![CDATA[<raw>]]></root>")?;
        assert_eq!(
            doc.root.children,
            vec![
                Content::Comment(" c ".to_string()),
                Content::ProcessingInstruction {
                    target: "define".to_string(),
                    data: "X=\"1\"".to_string(),
                },
                Content::CData("<raw>".to_string()),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_numeric_entities() -> Result<()> {
        let doc = parse("<root v=\"&#65;&#x42;\">&#x263A;</root>")?;
        assert_eq!(doc.root.attr("v"), Some("AB"));
        assert_eq!(doc.root.text(), "\u{263A}");
        Ok(())
    }

    #[test]
    fn test_mismatched_closing_tag() {
        let err = parse("<root><a></b></root>").unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::MismatchedTag {
                expected: "a".to_string(),
                found: "b".to_string(),
            }
        );
        assert_eq!(err.span().start.line, 1);
    }

    #[test]
    fn test_duplicate_attribute() {
        let err = parse("<root a=\"1\" a=\"2\"/>").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::DuplicateAttribute { name } if name == "a"));
    }

    #[test]
    fn test_invalid_entity() {
        let err = parse("<root>&bogus;</root>").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidEntity);
    }

    #[test]
    fn test_unterminated_inputs() {
        assert_eq!(
            parse("<root><a>").unwrap_err().kind(),
            &ErrorKind::UnexpectedEof
        );
        assert_eq!(
            parse("<root><!-- open").unwrap_err().kind(),
            &ErrorKind::UnterminatedMarkup
        );
        assert_eq!(parse("  ").unwrap_err().kind(), &ErrorKind::MissingRoot);
    }

    #[test]
    fn test_trailing_content() {
        let err = parse("<root/><second/>").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::TrailingContent);
    }

    #[test]
    fn test_error_position_tracks_lines() {
        let err = parse("<root>\n  <a x=1/>\n</root>").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidToken);
        assert_eq!(err.span().start.line, 2);
    }
}
