mod dispatch;
mod filter;
mod kind;
mod mutf8;
mod node;
mod reader;
mod sink;
mod source;
mod writer;
mod xml;

pub mod error;

pub use error::{Error, Result};
pub use filter::{AbsolutePath, Ancestor, Decision, NameAnywhere, NodeFilter, NoFilter};
pub use kind::Kind;
pub use node::{Compound, List, Node};
pub use reader::{Compression, Reader};
pub use writer::Writer;
pub use xml::Element;
