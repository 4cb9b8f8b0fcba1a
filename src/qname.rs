//! Qualified names: (namespace URI, local name).
//!
//! Ein QName ist hier immer schon aufgelöst: der Prefix aus dem Quelltext ist
//! nur ein Hinweis und wird getrennt gespeichert (siehe [`crate::AttrValue`]
//! und [`crate::Element::prefix_hint`]). Gleichheit, Hash und Ordnung hängen
//! nur an URI und local-name.

use std::fmt;
use std::rc::Rc;

/// The XML namespace, bound to `xml` without any declaration.
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// The reserved namespace of `xmlns` / `xmlns:p` declaration attributes.
pub const XMLNS_NS: &str = "http://www.w3.org/2000/xmlns/";

/// A namespace-qualified name. Empty `uri` means "no namespace".
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    /// The namespace URI. Empty string means no namespace.
    pub uri: Rc<str>,
    /// The local name.
    pub local_name: Rc<str>,
}

impl QName {
    /// Erstellt einen neuen QName.
    pub fn new(uri: impl Into<Rc<str>>, local_name: impl Into<Rc<str>>) -> Self {
        Self {
            uri: uri.into(),
            local_name: local_name.into(),
        }
    }

    /// A name in no namespace.
    pub fn local(local_name: impl Into<Rc<str>>) -> Self {
        Self::new("", local_name)
    }

    /// The attribute name of a namespace declaration.
    ///
    /// An empty `prefix` gives the default-namespace form (`xmlns="..."`).
    pub fn xmlns(prefix: &str) -> Self {
        if prefix.is_empty() {
            Self::new(XMLNS_NS, "xmlns")
        } else {
            Self::new(XMLNS_NS, prefix)
        }
    }

    /// True wenn dieser Name eine Namespace-Deklaration bezeichnet.
    pub fn is_xmlns(&self) -> bool {
        &*self.uri == XMLNS_NS
    }

    /// For a declaration attribute: the declared prefix (`""` for the default form).
    pub fn declared_prefix(&self) -> Option<&str> {
        if !self.is_xmlns() {
            return None;
        }
        if &*self.local_name == "xmlns" {
            Some("")
        } else {
            Some(&self.local_name)
        }
    }

    /// True if both parts equal the given strings.
    pub fn is(&self, uri: &str, local_name: &str) -> bool {
        &*self.uri == uri && &*self.local_name == local_name
    }
}

/// Clark-Notation: `{uri}local`, oder nur `local` ohne Namespace.
impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.uri.is_empty() {
            write!(f, "{}", self.local_name)
        } else {
            write!(f, "{{{}}}{}", self.uri, self.local_name)
        }
    }
}

impl fmt::Debug for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QName({self})")
    }
}
