//! XML tree model, parser and writer

pub mod model;
pub mod parser;
pub mod writer;

pub use model::{Content, Document, Element};
pub use parser::Parser;
pub use writer::{Writer, WriterConfig};
