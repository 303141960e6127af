//! XML data model
//!
//! Every element owns an explicit, ordered list of children. A field that holds
//! one element and a field that holds many look the same, so cardinality
//! changes never reshape the tree.

use indexmap::IndexMap;

use crate::error::{Error, ErrorKind, Result};

/// XML document
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    /// Declaration, processing instructions and comments before the root
    pub prolog: Vec<Content>,
    pub root: Element,
    /// Comments and processing instructions after the root
    pub epilog: Vec<Content>,
}

/// XML element
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<Content>,
}

/// XML content node
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction { target: String, data: String },
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self {
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }

    /// Root element, checked against the expected name
    pub fn root_named_mut(&mut self, name: &str) -> Result<&mut Element> {
        if self.root.name != name {
            return Err(Error::structural(ErrorKind::UnexpectedRoot {
                expected: name.to_string(),
                found: self.root.name.clone(),
            }));
        }
        Ok(&mut self.root)
    }
}

impl Content {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Whether this node is character data
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_) | Self::CData(_))
    }
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Builder-style child element
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(Content::Element(child));
        self
    }

    /// Builder-style text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Content::Text(text.into()));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn require_attr(&self, name: &str) -> Result<&str> {
        self.attr(name).ok_or_else(|| {
            Error::structural(ErrorKind::MissingAttribute {
                element: self.name.clone(),
                name: name.to_string(),
            })
        })
    }

    /// Set an attribute, keeping its position if it already exists
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Whether the element carries `name="value"`
    pub fn has_attr_value(&self, name: &str, value: &str) -> bool {
        self.attr(name) == Some(value)
    }

    /// Concatenated direct text and CDATA content
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            if let Content::Text(text) | Content::CData(text) = child {
                out.push_str(text);
            }
        }
        out
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(Content::as_element)
    }

    pub fn children_named<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Self> {
        self.child_elements().filter(move |e| e.name == name)
    }

    pub fn children_named_mut<'a>(&'a mut self, name: &str) -> impl Iterator<Item = &'a mut Self> {
        self.children
            .iter_mut()
            .filter_map(Content::as_element_mut)
            .filter(move |e| e.name == name)
    }

    pub fn count_named(&self, name: &str) -> usize {
        self.children_named(name).count()
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Result<&Self> {
        self.children_named(name)
            .next()
            .ok_or_else(|| self.missing(name))
    }

    /// First child element with the given name (mutable)
    pub fn child_mut(&mut self, name: &str) -> Result<&mut Self> {
        let err = self.missing(name);
        self.children_named_mut(name).next().ok_or(err)
    }

    /// Index into `children` of the only child element with the given name
    pub fn sole_position(&self, name: &str) -> Result<usize> {
        match self.count_named(name) {
            1 => self
                .find_position(name, |_| true)
                .ok_or_else(|| self.missing(name)),
            0 => Err(self.missing(name)),
            count => Err(Error::structural(ErrorKind::AmbiguousElement {
                parent: self.name.clone(),
                name: name.to_string(),
                count,
            })),
        }
    }

    /// The only child element with the given name
    pub fn sole_child_mut(&mut self, name: &str) -> Result<&mut Self> {
        let index = self.sole_position(name)?;
        let err = self.missing(name);
        self.children
            .get_mut(index)
            .and_then(Content::as_element_mut)
            .ok_or(err)
    }

    /// Fails unless at least one child element has the given name
    pub fn require_children(&self, name: &str) -> Result<usize> {
        match self.count_named(name) {
            0 => Err(self.missing(name)),
            count => Ok(count),
        }
    }

    /// Index into `children` of the first element matching name and predicate
    pub fn find_position<P>(&self, name: &str, predicate: P) -> Option<usize>
    where
        P: Fn(&Self) -> bool,
    {
        self.children.iter().position(|c| match c {
            Content::Element(e) => e.name == name && predicate(e),
            _ => false,
        })
    }

    /// First child element matching name and predicate (mutable)
    pub fn find_mut<P>(&mut self, name: &str, predicate: P) -> Option<&mut Self>
    where
        P: Fn(&Self) -> bool,
    {
        self.children_named_mut(name).find(|e| predicate(e))
    }

    /// Insert an element right after `children[index]`
    pub fn insert_after(&mut self, index: usize, element: Self) {
        let at = index.saturating_add(1).min(self.children.len());
        self.children.insert(at, Content::Element(element));
    }

    pub fn push_element(&mut self, element: Self) {
        self.children.push(Content::Element(element));
    }

    /// Append after the last sibling sharing the element's name, or at the end
    pub fn push_after_last(&mut self, element: Self) {
        let last = self
            .children
            .iter()
            .rposition(|c| matches!(c, Content::Element(e) if e.name == element.name));
        match last {
            Some(index) => self.insert_after(index, element),
            None => self.push_element(element),
        }
    }

    /// Replace every child element named `name` with `elements`, placed where
    /// the first removed child was or appended when there was none
    pub fn replace_children_named(&mut self, name: &str, elements: Vec<Self>) {
        let at = self
            .find_position(name, |_| true)
            .unwrap_or(self.children.len());
        self.children
            .retain(|c| !matches!(c, Content::Element(e) if e.name == name));
        let tail = self.children.split_off(at);
        self.children.extend(elements.into_iter().map(Content::Element));
        self.children.extend(tail);
    }

    fn missing(&self, name: &str) -> Error {
        Error::structural(ErrorKind::MissingElement {
            parent: self.name.clone(),
            name: name.to_string(),
        })
    }
}
