//! Element tree → events → XML text.
//!
//! Alle Namespace-Deklarationen werden am Wurzelelement gesammelt (siehe
//! [`crate::choose_prefixes`]); der Baum selbst bleibt unverändert.
//!
//! Drei APIs:
//! - `output()`: schreibt Events in eine beliebige [`EventSink`].
//! - `to_text()` / `to_text_with_options()`: gibt XML als String zurück.
//! - `to_writer()`: streamt XML direkt in `impl Write`.

use std::borrow::Cow;
use std::io::Write;

use crate::element::Element;
use crate::event::{EventSink, XmlEvent};
use crate::options::OutputOptions;
use crate::prefixes::choose_prefixes;
use crate::qname::QName;
use crate::reindent::reindent;
use crate::xml::XmlWriter;
use crate::{Error, Result};

/// Writes the whole document under `root` into `sink`.
///
/// The root's start event carries one declaration per allocated prefix, the
/// default namespace first, followed by the root's own attributes.
///
/// # Errors
///
/// Only what the sink reports.
pub fn output(sink: &mut impl EventSink, root: &Element) -> Result<()> {
    let prefixes = choose_prefixes(root);

    let mut declarations: Vec<(QName, String)> = Vec::with_capacity(prefixes.len());
    if let Some(uri) = prefixes.default_namespace() {
        declarations.push((QName::xmlns(""), uri.to_string()));
    }
    declarations.extend(
        prefixes
            .iter()
            .filter(|(_, prefix)| !prefix.is_empty())
            .map(|(uri, prefix)| (QName::xmlns(prefix), uri.to_string())),
    );

    sink.process(&XmlEvent::StartDocument)?;
    emit_element(sink, root, declarations)?;
    sink.process(&XmlEvent::EndDocument)
}

/// Serializes `root` to a string, exactly as stored.
pub fn to_text(root: &Element) -> Result<String> {
    to_text_with_options(root, &OutputOptions::default())
}

/// Serializes `root` to a string.
///
/// ```
/// use nsdom::{OutputOptions, parse_str, to_text_with_options};
///
/// let root = parse_str("<a><b><c/></b></a>", None).unwrap();
/// let opts = OutputOptions::default().with_reindent(true);
/// assert_eq!(
///     to_text_with_options(&root, &opts).unwrap(),
///     "<a>\n  <b>\n    <c/>\n  </b>\n</a>",
/// );
/// ```
pub fn to_text_with_options(root: &Element, options: &OutputOptions) -> Result<String> {
    let mut buf = Vec::new();
    to_writer(root, &mut buf, options)?;
    String::from_utf8(buf).map_err(|_| Error::invariant("XML output is not valid UTF-8"))
}

/// Streams the serialized document into `writer`.
pub fn to_writer(root: &Element, writer: impl Write, options: &OutputOptions) -> Result<()> {
    let root: Cow<'_, Element> = if options.reindent() {
        Cow::Owned(reindent(root, options.indent()))
    } else {
        Cow::Borrowed(root)
    };
    let mut sink = XmlWriter::new(writer).with_xml_declaration(options.xml_declaration());
    output(&mut sink, &root)?;
    sink.into_inner()?;
    Ok(())
}

fn emit_element(sink: &mut impl EventSink, elem: &Element, mut attributes: Vec<(QName, String)>) -> Result<()> {
    if !elem.text_before().is_empty() {
        sink.process(&XmlEvent::Text(elem.text_before().to_string()))?;
    }

    // Deklarationen zuerst; ein gleichnamiges Attribut im Baum wird überschrieben.
    for (name, value) in elem.attrs() {
        if attributes.iter().any(|(declared, _)| declared == name) {
            continue;
        }
        attributes.push((name.clone(), value.value.clone()));
    }
    sink.process(&XmlEvent::StartElement {
        name: elem.tag().clone(),
        attributes,
        position: None,
    })?;

    for child in elem.child_nodes() {
        emit_element(sink, child, Vec::new())?;
    }
    if !elem.last_text_inside().is_empty() {
        sink.process(&XmlEvent::Text(elem.last_text_inside().to_string()))?;
    }
    sink.process(&XmlEvent::EndElement)
}
