//! Lookups scoped to one namespace.
//!
//! [`Query`] wird einmal pro Namespace instanziert, entweder mit einem
//! Laufzeit-Deskriptor ([`NamespaceSpec`]) oder einem eigenen Typ, der
//! [`Namespace`] implementiert. Kinder aus fremden Namespaces werden bei
//! allen Abfragen übersprungen, nie als Fehler gemeldet.
//!
//! ```
//! use nsdom::{NamespaceSpec, Query, parse_str};
//!
//! let feed = Query::new(NamespaceSpec::new("urn:feed", "f"));
//! let root = parse_str(
//!     r#"<f:feed xmlns:f="urn:feed" xmlns:o="urn:other"><o:x/><f:item id="1"/><f:item id="2"/></f:feed>"#,
//!     None,
//! )
//! .unwrap();
//!
//! let ids = feed.children_with_tag(&root, "item", |item| feed.get_attribute(item, "id"));
//! let ids: Vec<&str> = ids.into_iter().collect::<Result<_, _>>().unwrap();
//! assert_eq!(ids, ["1", "2"]);
//! ```

use std::rc::Rc;

use crate::attrs::AttributeMap;
use crate::element::Element;
use crate::provenance::SourceHint;
use crate::qname::QName;
use crate::{Error, Result};

/// Descriptor of a namespace: its URI and the prefix to suggest for it.
pub trait Namespace {
    fn uri(&self) -> &str;
    fn prefix_hint(&self) -> &str;
}

/// Runtime namespace descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceSpec {
    pub uri: String,
    pub prefix_hint: String,
}

impl NamespaceSpec {
    pub fn new(uri: impl Into<String>, prefix_hint: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            prefix_hint: prefix_hint.into(),
        }
    }
}

impl Namespace for NamespaceSpec {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn prefix_hint(&self) -> &str {
        &self.prefix_hint
    }
}

/// Element queries and construction for one namespace.
#[derive(Debug, Clone)]
pub struct Query<N> {
    ns: N,
}

impl<N: Namespace> Query<N> {
    pub fn new(ns: N) -> Self {
        Self { ns }
    }

    /// The descriptor this query was built for.
    pub fn namespace(&self) -> &N {
        &self.ns
    }

    fn in_namespace(&self, elem: &Element) -> bool {
        &*elem.tag().uri == self.ns.uri()
    }

    /// Direkte Kinder im Namespace, optional auf einen Tag eingeschränkt.
    fn matching_children<'e>(&self, elem: &'e Element, tag: Option<&str>) -> impl Iterator<Item = &'e Element> {
        let uri = self.ns.uri().to_string();
        let tag = tag.map(str::to_string);
        elem.child_nodes()
            .iter()
            .map(|child| child.as_ref())
            .filter(move |child| {
                &*child.tag().uri == uri && tag.as_deref().is_none_or(|t| &*child.tag().local_name == t)
            })
    }

    /// The local name of `elem` if it is in this namespace.
    pub fn local_name<'e>(&self, elem: &'e Element) -> Option<&'e str> {
        self.in_namespace(elem).then(|| &*elem.tag().local_name)
    }

    /// `f` applied to each direct child named `tag` in this namespace.
    pub fn children_with_tag<'e, T>(
        &self,
        elem: &'e Element,
        tag: &str,
        f: impl FnMut(&'e Element) -> T,
    ) -> Vec<T> {
        self.matching_children(elem, Some(tag)).map(f).collect()
    }

    /// `f` applied to each direct child in this namespace, keeping the `Some` results.
    pub fn filter_children<'e, T>(&self, elem: &'e Element, f: impl FnMut(&'e Element) -> Option<T>) -> Vec<T> {
        self.matching_children(elem, None).filter_map(f).collect()
    }

    /// Runs `f` on each direct child in this namespace (named `tag`, if given).
    pub fn for_each_child<'e>(&self, elem: &'e Element, tag: Option<&str>, f: impl FnMut(&'e Element)) {
        self.matching_children(elem, tag).for_each(f);
    }

    /// Left fold over the direct children named `tag` in this namespace.
    pub fn fold_children<'e, A>(
        &self,
        elem: &'e Element,
        tag: &str,
        init: A,
        f: impl FnMut(A, &'e Element) -> A,
    ) -> A {
        self.matching_children(elem, Some(tag)).fold(init, f)
    }

    /// Fails unless `elem` is in this namespace.
    pub fn require_namespace(&self, elem: &Element) -> Result<()> {
        if self.in_namespace(elem) {
            return Ok(());
        }
        Err(Error::element(
            elem,
            format!("element {} is not in namespace '{}'", elem.tag(), self.ns.uri()),
        ))
    }

    /// Fails unless `elem` is `expected` in this namespace.
    pub fn require_tag(&self, elem: &Element, expected: &str) -> Result<()> {
        if self.in_namespace(elem) && &*elem.tag().local_name == expected {
            return Ok(());
        }
        Err(Error::element(
            elem,
            format!("expected {}, found {}", QName::new(self.ns.uri(), expected), elem.tag()),
        ))
    }

    /// Unqualified attribute `name` of an element in this namespace.
    ///
    /// # Errors
    ///
    /// `ElementError` if `elem` is in another namespace or lacks the attribute.
    pub fn get_attribute<'e>(&self, elem: &'e Element, name: &str) -> Result<&'e str> {
        self.get_attribute_opt(elem, name)?.ok_or_else(|| {
            Error::element(
                elem,
                format!("missing attribute '{name}' on <{}>", elem.tag().local_name),
            )
        })
    }

    /// Like [`Query::get_attribute`], but `None` when the attribute is absent.
    pub fn get_attribute_opt<'e>(&self, elem: &'e Element, name: &str) -> Result<Option<&'e str>> {
        self.require_namespace(elem)?;
        Ok(elem.attribute("", name))
    }

    /// A new element `tag` in this namespace, without surrounding text.
    ///
    /// With `source` the node is [`SourceHint::Derived`] from it, so errors
    /// about the new node point at where `source` came from.
    pub fn make(
        &self,
        tag: &str,
        source: Option<&Rc<Element>>,
        attrs: AttributeMap,
        children: Vec<Rc<Element>>,
    ) -> Element {
        let source_hint = match source {
            Some(src) => SourceHint::Derived(Rc::clone(src)),
            None => SourceHint::Synthetic,
        };
        Element::new(
            QName::new(self.ns.uri(), tag),
            self.ns.prefix_hint(),
            attrs,
            children,
            source_hint,
        )
    }
}
