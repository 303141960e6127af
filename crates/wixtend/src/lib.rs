//! wixtend - vendor customization of generated WiX installer definitions
//!
//! # Quick Start
//!
//! ```
//! use wixtend::{VendorProfile, extend, from_xml_str, to_xml_string};
//! # fn main() -> Result<(), wixtend::Error> {
//! let mut doc = from_xml_str(r#"<Wix><Product Name="x"/></Wix>"#)?;
//! let product = doc.root.child_mut("Product")?;
//! product.set_attr("Name", "VENDOR OpenJDK");
//! assert!(to_xml_string(&doc).contains(r#"Name="VENDOR OpenJDK""#));
//!
//! // the full transform needs a complete installer definition
//! let err = extend(&mut doc, &VendorProfile::default()).unwrap_err();
//! assert!(err.kind().is_structural());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

pub mod lexer;

pub mod xml;
pub use xml::{Content, Document, Element, Parser, Writer, WriterConfig};

pub mod vendor;
pub use vendor::{ExtendReport, VendorProfile, extend};

pub mod ext_files;
pub use ext_files::{ExtFilesOutcome, write_ext_files};

/// Parse XML from string
pub fn from_xml_str(s: &str) -> Result<Document> {
    from_xml_bytes(s.as_bytes())
}

/// Parse XML from bytes
pub fn from_xml_bytes(bytes: &[u8]) -> Result<Document> {
    let mut parser = Parser::new(bytes);
    parser.parse()
}

/// Serialize with the default 4-space indentation
pub fn to_xml_string(doc: &Document) -> String {
    Writer::default().write_document(doc)
}

/// Parse, apply the vendor transform and serialize in one step
pub fn extend_str(input: &str, profile: &VendorProfile) -> Result<(String, ExtendReport)> {
    let mut doc = from_xml_str(input)?;
    let report = extend(&mut doc, profile)?;
    Ok((to_xml_string(&doc), report))
}
