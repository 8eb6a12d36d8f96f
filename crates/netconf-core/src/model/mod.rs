pub mod client;
pub mod element;
pub mod qname;
pub mod value;

pub use client::{ClientInfo, DatastoreName, QueryParams};
pub use element::ConfigElement;
pub use qname::{QName, SchemaPath};
pub use value::LeafValue;
