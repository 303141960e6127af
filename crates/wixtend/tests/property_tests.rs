//! Property-based tests for the XML layer and the marker insertion
//!
//! These tests use proptest to verify:
//! 1. Attribute and text values survive escaping and parsing unchanged
//! 2. Whitespace between text and CDATA siblings is kept
//! 3. Inserting after a marker keeps every other sibling in order

use proptest::prelude::*;
use wixtend::{Content, Document, Element, from_xml_str, to_xml_string};

fn value_strategy() -> impl Strategy<Value = String> {
    // printable text with the characters that need escaping mixed in
    "[a-zA-Z0-9 &<>\"'\\[\\]/\\\\.:;=-]{0,40}"
}

proptest! {
    #[test]
    fn attribute_values_round_trip(value in value_strategy()) {
        let doc = Document::new(Element::new("Property").with_attr("Value", value.clone()));
        let parsed = from_xml_str(&to_xml_string(&doc));
        prop_assert_eq!(parsed.ok().and_then(|d| d.root.attr("Value").map(str::to_string)), Some(value));
    }

    #[test]
    fn text_values_round_trip(value in value_strategy()) {
        let doc = Document::new(Element::new("Custom").with_text(value.clone()));
        let parsed = from_xml_str(&to_xml_string(&doc));
        prop_assert_eq!(parsed.ok().map(|d| d.root.text()), Some(value));
    }

    #[test]
    fn mixed_content_spacing_round_trips(
        segments in prop::collection::vec(("[a-z<>&]{0,6}", " {1,3}", any::<bool>()), 1..6),
    ) {
        let mut custom = Element::new("Custom").with_attr("Action", "a");
        for (data, spaces, as_cdata) in &segments {
            if *as_cdata || data.is_empty() {
                custom.children.push(Content::CData(data.clone()));
            } else {
                custom.children.push(Content::Text(data.clone()));
            }
            custom.children.push(Content::Text(spaces.clone()));
        }
        // adjacent text runs merge when parsed
        let mut expected: Vec<Content> = Vec::new();
        for child in custom.children.clone() {
            if let (Some(Content::Text(prev)), Content::Text(next)) = (expected.last_mut(), &child) {
                prev.push_str(next);
                continue;
            }
            expected.push(child);
        }

        let parsed = from_xml_str(&to_xml_string(&Document::new(custom)));
        prop_assert_eq!(parsed.ok().map(|d| d.root.children), Some(expected));
    }

    #[test]
    fn insert_after_marker_preserves_order(
        count in 1usize..12,
        marker in 0usize..12,
    ) {
        let marker = marker % count;
        let mut parent = Element::new("Product");
        for i in 0..count {
            parent.push_element(Element::new("Component").with_attr("Id", format!("c{i}")));
        }
        let marker_id = format!("c{marker}");
        let index = parent.find_position("Component", |c| c.has_attr_value("Id", &marker_id));
        prop_assert_eq!(index, Some(marker));
        if let Some(index) = index {
            parent.insert_after(index, Element::new("Component").with_attr("Id", "new"));
        }

        let ids: Vec<&str> = parent.children_named("Component").filter_map(|c| c.attr("Id")).collect();
        let mut expected: Vec<String> = (0..count).map(|i| format!("c{i}")).collect();
        expected.insert(marker + 1, "new".to_string());
        prop_assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }
}
