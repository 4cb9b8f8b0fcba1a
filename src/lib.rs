//! nsdom – namespace-aware, whitespace-preserving XML element trees
//!
//! # Beispiel
//!
//! ```
//! use nsdom::{compare, parse_str, to_text};
//!
//! let xml = r#"<root xmlns="urn:a" xmlns:b="urn:b"><b:child b:attr="1"/></root>"#;
//! let root = parse_str(xml, None).unwrap();
//! let text = to_text(&root).unwrap();
//! assert_eq!(text, xml);
//!
//! let again = parse_str(&text, None).unwrap();
//! assert_eq!(compare(&root, &again, false), std::cmp::Ordering::Equal);
//! ```

pub mod attrs;
pub mod compare;
pub mod element;
pub mod error;
pub mod event;
pub mod namespace;
pub mod options;
pub mod parser;
pub mod prefixes;
pub mod provenance;
pub mod qname;
pub mod reindent;
pub mod serializer;
pub mod xml;

pub use error::{Error, Result};

/// HashMap mit ahash (schneller, nicht DoS-resistent; nur intern).
pub(crate) type FastHashMap<K, V> = hashbrown::HashMap<K, V, ahash::RandomState>;

/// HashSet mit ahash.
pub(crate) type FastHashSet<K> = hashbrown::HashSet<K, ahash::RandomState>;

/// IndexMap mit ahash (deterministische Iteration + schnelles Hashing).
pub(crate) type FastIndexMap<K, V> = indexmap::IndexMap<K, V, ahash::RandomState>;

// Public API: Tree
pub use attrs::{AttrValue, AttributeMap};
pub use element::Element;
pub use provenance::{SourceHint, describe_with_location, log_elem};
pub use qname::QName;

// Public API: Events
pub use event::{EventSink, EventSource, TextPosition, XmlEvent};

// Public API: Parse / Output
pub use options::OutputOptions;
pub use parser::{parse, parse_file, parse_reader, parse_str};
pub use prefixes::{PrefixMap, choose_prefixes};
pub use reindent::reindent;
pub use serializer::{output, to_text, to_text_with_options, to_writer};

// Public API: Comparison / Query
pub use compare::compare;
pub use namespace::{Namespace, NamespaceSpec, Query};
