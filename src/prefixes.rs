//! Prefix allocation for output.
//!
//! Jeder Namespace im Baum bekommt genau einen Prefix, alle Deklarationen
//! landen später am Wurzelelement. Die Prefix-Hinweise aus dem Parser werden
//! bevorzugt; Kollisionen werden mit Zahlen-Suffixen aufgelöst (`foo`, `foo1`).

use std::rc::Rc;

use log::trace;

use crate::element::Element;
use crate::qname::XML_NS;
use crate::{FastHashSet, FastIndexMap};

/// Namespace URI -> prefix, in allocation order.
///
/// The empty prefix marks the default namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixMap {
    by_uri: FastIndexMap<Rc<str>, String>,
}

impl PrefixMap {
    /// Prefix allocated for `uri`.
    pub fn get(&self, uri: &str) -> Option<&str> {
        self.by_uri.get(uri).map(String::as_str)
    }

    /// The namespace written without a prefix, if any.
    pub fn default_namespace(&self) -> Option<&str> {
        self.by_uri.iter().find(|(_, prefix)| prefix.is_empty()).map(|(uri, _)| &**uri)
    }

    pub fn len(&self) -> usize {
        self.by_uri.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_uri.is_empty()
    }

    /// `(uri, prefix)` pairs in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_uri.iter().map(|(uri, prefix)| (&**uri, prefix.as_str()))
    }
}

/// Allocator state: vergebene Prefixe + Zuordnung.
#[derive(Default)]
struct Allocator {
    map: PrefixMap,
    taken: FastHashSet<String>,
}

impl Allocator {
    fn new() -> Self {
        let mut taken = FastHashSet::default();
        // Reserviert, auch wenn ein Hinweis so lautet.
        taken.insert("xml".to_string());
        taken.insert("xmlns".to_string());
        Self {
            map: PrefixMap::default(),
            taken,
        }
    }

    fn allocate(&mut self, uri: &Rc<str>, hint: &str) {
        if uri.is_empty() || &**uri == XML_NS || self.map.by_uri.contains_key(uri) {
            return;
        }
        let base = if hint.is_empty() { "ns" } else { hint };
        let mut candidate = base.to_string();
        let mut suffix = 0usize;
        while self.taken.contains(&candidate) {
            suffix += 1;
            candidate = format!("{base}{suffix}");
        }
        trace!("prefix '{candidate}' for namespace '{uri}' (hint '{hint}')");
        self.taken.insert(candidate.clone());
        self.map.by_uri.insert(uri.clone(), candidate);
    }
}

/// Picks one prefix per namespace used in the tree under `root`.
///
/// The root's namespace becomes the default namespace unless some attribute
/// forced it to take a real prefix.
///
/// ```
/// use nsdom::{choose_prefixes, parse_str};
///
/// let root = parse_str(r#"<r xmlns="urn:a" xmlns:b="urn:b"><b:c/></r>"#, None).unwrap();
/// let prefixes = choose_prefixes(&root);
/// assert_eq!(prefixes.get("urn:a"), Some(""));
/// assert_eq!(prefixes.get("urn:b"), Some("b"));
/// ```
pub fn choose_prefixes(root: &Element) -> PrefixMap {
    let default_ns = &root.tag().uri;
    let mut allocator = Allocator::new();

    for elem in root.descendants() {
        if elem.tag().uri != *default_ns {
            allocator.allocate(&elem.tag().uri, elem.prefix_hint());
        }
        for (name, value) in elem.attrs() {
            allocator.allocate(&name.uri, &value.prefix_hint);
        }
    }

    if !default_ns.is_empty() && &**default_ns != XML_NS && !allocator.map.by_uri.contains_key(default_ns) {
        allocator.map.by_uri.insert(default_ns.clone(), String::new());
    }
    allocator.map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_str;

    #[test]
    fn default_namespace_gets_empty_prefix() {
        let root = parse_str(r#"<r xmlns="http://x"><c/></r>"#, None).unwrap();
        let map = choose_prefixes(&root);
        assert_eq!(map.get("http://x"), Some(""));
        assert_eq!(map.default_namespace(), Some("http://x"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn attribute_in_default_namespace_forces_prefix() {
        let root = parse_str(r#"<r xmlns="http://x" xmlns:p="http://x" p:a="1"/>"#, None).unwrap();
        let map = choose_prefixes(&root);
        // xmlns:p ist die letzte Deklaration -> Hinweis "p"
        assert_eq!(map.get("http://x"), Some("p"));
        assert_eq!(map.default_namespace(), None);
    }

    /// Gleicher Hinweis für zwei Namespaces: foo, foo1 in Dokumentreihenfolge.
    #[test]
    fn colliding_hints_get_numeric_suffix() {
        let root = parse_str(
            r#"<r><foo:a xmlns:foo="http://a"/><foo:b xmlns:foo="http://b"/></r>"#,
            None,
        )
        .unwrap();
        let map = choose_prefixes(&root);
        assert_eq!(map.get("http://a"), Some("foo"));
        assert_eq!(map.get("http://b"), Some("foo1"));
    }

    #[test]
    fn empty_hint_falls_back_to_ns() {
        // Default-Namespace eines Kindes, das nicht der Wurzel-Namespace ist.
        let root = parse_str(r#"<r><a xmlns="urn:one"/><b xmlns="urn:two"/></r>"#, None).unwrap();
        let map = choose_prefixes(&root);
        assert_eq!(map.get("urn:one"), Some("ns"));
        assert_eq!(map.get("urn:two"), Some("ns1"));
        assert_eq!(map.get(""), None);
    }

    #[test]
    fn xml_namespace_is_never_allocated() {
        let root = parse_str(r#"<r xml:lang="en"/>"#, None).unwrap();
        assert!(choose_prefixes(&root).is_empty());
    }

    #[test]
    fn xml_namespace_root_is_not_the_default() {
        let root = parse_str(r#"<xml:a><b/></xml:a>"#, None).unwrap();
        let map = choose_prefixes(&root);
        assert_eq!(map.get(XML_NS), None);
        assert_eq!(map.default_namespace(), None);
        assert_eq!(crate::to_text(&root).unwrap(), "<xml:a><b/></xml:a>");
    }

    #[test]
    fn allocation_is_idempotent_and_unique() {
        let root = parse_str(
            r#"<r xmlns="urn:r" xmlns:a="urn:a"><a:x xmlns:a="urn:b" a:k="v"/><a:y xmlns:a="urn:c"/></r>"#,
            None,
        )
        .unwrap();
        let first = choose_prefixes(&root);
        assert_eq!(first, choose_prefixes(&root));
        let prefixes: FastHashSet<&str> = first.iter().map(|(_, p)| p).collect();
        assert_eq!(prefixes.len(), first.len());
    }
}
