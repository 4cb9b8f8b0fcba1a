//! The element tree node.
//!
//! Ein `Element` ist nach dem Bau unveränderlich, mit Ausnahme der Attribute.
//! Kinder liegen hinter `Rc`, damit Kopien mit geänderten Attributen
//! (`with_attrs`, `with_attribute`) den Teilbaum teilen statt ihn zu klonen.
//! Strukturelle Änderungen heißen: neuen Knoten bauen.

use std::rc::Rc;

use crate::attrs::{AttrValue, AttributeMap};
use crate::provenance::SourceHint;
use crate::qname::QName;
use crate::{Error, Result};

/// An XML element with the text around and inside it.
#[derive(Debug, Clone)]
pub struct Element {
    prefix_hint: String,
    tag: QName,
    attrs: AttributeMap,
    child_nodes: Vec<Rc<Element>>,
    text_before: String,
    last_text_inside: String,
    source_hint: SourceHint,
}

impl Element {
    /// Builds an element with no surrounding text.
    ///
    /// Use [`Element::with_text_before`] / [`Element::with_last_text_inside`]
    /// to add text while the node is still being assembled.
    pub fn new(
        tag: QName,
        prefix_hint: impl Into<String>,
        attrs: AttributeMap,
        child_nodes: Vec<Rc<Element>>,
        source_hint: SourceHint,
    ) -> Self {
        Self {
            prefix_hint: prefix_hint.into(),
            tag,
            attrs,
            child_nodes,
            text_before: String::new(),
            last_text_inside: String::new(),
            source_hint,
        }
    }

    /// Sets the text preceding this node among its siblings.
    #[must_use]
    pub fn with_text_before(mut self, text: impl Into<String>) -> Self {
        self.text_before = text.into();
        self
    }

    /// Sets the trailing text after the last child.
    #[must_use]
    pub fn with_last_text_inside(mut self, text: impl Into<String>) -> Self {
        self.last_text_inside = text.into();
        self
    }

    /// Same node with different children (text and provenance kept).
    pub(crate) fn with_children(&self, child_nodes: Vec<Rc<Element>>) -> Self {
        Self {
            child_nodes,
            ..self.clone()
        }
    }

    pub fn tag(&self) -> &QName {
        &self.tag
    }

    /// Advisory prefix for this element's namespace.
    pub fn prefix_hint(&self) -> &str {
        &self.prefix_hint
    }

    pub fn attrs(&self) -> &AttributeMap {
        &self.attrs
    }

    /// In-place attribute edits; the only mutable part of a node.
    pub fn attrs_mut(&mut self) -> &mut AttributeMap {
        &mut self.attrs
    }

    /// Children in document order.
    pub fn child_nodes(&self) -> &[Rc<Element>] {
        &self.child_nodes
    }

    pub fn text_before(&self) -> &str {
        &self.text_before
    }

    pub fn last_text_inside(&self) -> &str {
        &self.last_text_inside
    }

    pub fn source_hint(&self) -> &SourceHint {
        &self.source_hint
    }

    /// True if the tag is `local_name` in namespace `uri`.
    pub fn is(&self, uri: &str, local_name: &str) -> bool {
        self.tag.is(uri, local_name)
    }

    /// Attribute value by namespace and local name.
    pub fn attribute(&self, uri: &str, local_name: &str) -> Option<&str> {
        self.attrs.value(uri, local_name)
    }

    /// Sets (or overwrites) an attribute in place.
    pub fn set_attribute(&mut self, name: QName, value: AttrValue) {
        self.attrs.insert(name, value);
    }

    /// Removes an attribute in place, returning the old value.
    pub fn remove_attribute(&mut self, name: &QName) -> Option<AttrValue> {
        self.attrs.remove(name)
    }

    /// Copy of this node with `attrs` replacing the attribute map.
    ///
    /// Children are shared with `self`, not cloned.
    #[must_use]
    pub fn with_attrs(&self, attrs: AttributeMap) -> Self {
        Self {
            prefix_hint: self.prefix_hint.clone(),
            tag: self.tag.clone(),
            attrs,
            child_nodes: self.child_nodes.clone(),
            text_before: self.text_before.clone(),
            last_text_inside: self.last_text_inside.clone(),
            source_hint: self.source_hint.clone(),
        }
    }

    /// Copy of this node with one attribute set.
    #[must_use]
    pub fn with_attribute(&self, name: QName, value: AttrValue) -> Self {
        let mut attrs = self.attrs.clone();
        attrs.insert(name, value);
        self.with_attrs(attrs)
    }

    /// The text content of an element that has no element children.
    ///
    /// ```
    /// use nsdom::parse_str;
    ///
    /// let root = parse_str("<version> 1.2 </version>", None).unwrap();
    /// assert_eq!(root.simple_content().unwrap(), " 1.2 ");
    /// assert!(parse_str("<a><b/></a>", None).unwrap().simple_content().is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// `ElementError` if the element has child elements.
    pub fn simple_content(&self) -> Result<&str> {
        if !self.child_nodes.is_empty() {
            return Err(Error::element(
                self,
                format!("non-text child nodes not permitted inside <{}>", self.tag.local_name),
            ));
        }
        Ok(&self.last_text_inside)
    }

    /// Depth-first iterator over this node and all its descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Pre-order (document order) walk, see [`Element::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // Rückwärts pushen, damit das erste Kind als nächstes kommt.
        self.stack.extend(current.child_nodes.iter().rev().map(|c| c.as_ref()));
        Some(current)
    }
}
