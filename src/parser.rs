//! Tree construction from an [`EventSource`].
//!
//! Text zwischen Elementen bleibt exakt erhalten: der Text vor einem Element
//! landet in dessen `text_before`, der Text nach dem letzten Kind in
//! `last_text_inside` des Elternteils. Namespace-Deklarationen verschwinden
//! aus den Attributen und überleben nur als Prefix-Hinweise.

use std::borrow::Cow;
use std::io::Read;
use std::mem;
use std::path::Path;
use std::rc::Rc;

use log::{Level, debug};

use crate::attrs::{AttrValue, AttributeMap};
use crate::element::Element;
use crate::event::{EventSource, TextPosition, XmlEvent};
use crate::provenance::{SourceHint, log_elem};
use crate::qname::{QName, XML_NS};
use crate::xml::{XmlReader, normalize_line_endings};
use crate::{Error, FastHashMap, Result};

/// Deepest element nesting [`parse`] accepts.
pub const MAX_DEPTH: usize = 512;

/// Builds the single root element from `source`.
///
/// `file_path` only ends up in the provenance of the parsed nodes.
///
/// # Errors
///
/// - `MalformedDocument` for tokenizer errors, zero or several root
///   elements, unbalanced tags, non-whitespace text outside the root, or
///   nesting deeper than [`MAX_DEPTH`].
/// - `InternalInvariantViolation` if a namespace is used before any
///   declaration for it was seen.
pub fn parse(source: impl EventSource, file_path: Option<&Path>) -> Result<Element> {
    let mut builder = TreeBuilder::new(source, file_path);
    let root = builder.run()?;
    log_elem(Level::Trace, "parsed root", &root);
    debug!(
        "parsed {} element(s) from {}",
        builder.element_count,
        file_path.map_or_else(|| "<input>".into(), |p| p.display().to_string()),
    );
    Ok(root)
}

/// Parses XML text.
///
/// ```
/// use nsdom::parse_str;
///
/// let root = parse_str("<a x='1'> <b/> </a>", None).unwrap();
/// assert_eq!(root.attribute("", "x"), Some("1"));
/// assert_eq!(root.child_nodes()[0].text_before(), " ");
/// assert_eq!(root.last_text_inside(), " ");
/// ```
pub fn parse_str(xml: &str, file_path: Option<&Path>) -> Result<Element> {
    let xml = xml.strip_prefix('\u{FEFF}').unwrap_or(xml);
    let normalized = normalize_line_endings(xml);
    parse(XmlReader::new(&normalized), file_path)
}

/// Reads all of `reader` (UTF-8) and parses it.
pub fn parse_reader(mut reader: impl Read, file_path: Option<&Path>) -> Result<Element> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse_str(&text, file_path)
}

/// Reads and parses a file; its path is recorded in the nodes' provenance.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Element> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::IoError(format!("read {}: {e}", path.display())))?;
    parse_str(&text, Some(path))
}

/// Ein offenes Element, dessen Inhalt noch gelesen wird.
struct OpenElement {
    tag: QName,
    prefix_hint: String,
    attrs: AttributeMap,
    text_before: String,
    source_hint: SourceHint,
}

/// Gelesener Inhalt einer Ebene: Geschwister + ausstehender Text.
#[derive(Default)]
struct Frame {
    open: Option<OpenElement>,
    children: Vec<Rc<Element>>,
    text: String,
}

struct TreeBuilder<S> {
    source: S,
    path: Option<Rc<Path>>,
    /// Namespace-URI -> zuletzt deklarierter Prefix.
    prefix_hints: FastHashMap<Rc<str>, String>,
    element_count: usize,
}

impl<S: EventSource> TreeBuilder<S> {
    fn new(source: S, file_path: Option<&Path>) -> Self {
        let mut prefix_hints = FastHashMap::default();
        // Platzhalter: weder "nons" noch "xml" werden je deklariert.
        prefix_hints.insert(Rc::from(""), "nons".to_string());
        prefix_hints.insert(Rc::from(XML_NS), "xml".to_string());
        Self {
            source,
            path: file_path.map(Rc::from),
            prefix_hints,
            element_count: 0,
        }
    }

    fn hint_for(&self, uri: &str) -> Result<&str> {
        self.prefix_hints.get(uri).map(String::as_str).ok_or_else(|| {
            Error::invariant(format!("namespace '{uri}' used before any declaration of it"))
        })
    }

    fn run(&mut self) -> Result<Element> {
        // stack[0] ist die Dokumentebene (ohne offenes Element).
        let mut stack = vec![Frame::default()];

        while let Some(event) = self.source.next_event()? {
            match event {
                XmlEvent::StartDocument => {}
                XmlEvent::DocType(_) => debug!("ignoring DOCTYPE declaration"),
                XmlEvent::Text(text) => {
                    if let Some(frame) = stack.last_mut() {
                        frame.text.push_str(&text);
                    }
                }
                XmlEvent::StartElement { name, attributes, position } => {
                    if stack.len() == 1 && !stack[0].children.is_empty() {
                        return Err(malformed("multiple root elements", position));
                    }
                    // stack[0] ist die Dokumentebene, also offene Elemente = len - 1.
                    if stack.len() > MAX_DEPTH {
                        return Err(malformed(format!("elements nested deeper than {MAX_DEPTH} levels"), position));
                    }
                    let text_before = stack.last_mut().map(|f| mem::take(&mut f.text)).unwrap_or_default();
                    let open = self.open_element(name, attributes, position, text_before)?;
                    stack.push(Frame {
                        open: Some(open),
                        ..Frame::default()
                    });
                }
                XmlEvent::EndElement => {
                    let frame = stack.pop().filter(|f| f.open.is_some()).ok_or_else(|| {
                        Error::malformed("end of element without matching start")
                    })?;
                    let element = self.close_element(frame)?;
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(Rc::new(element));
                    }
                }
                XmlEvent::EndDocument => break,
            }
        }

        if stack.len() != 1 {
            return Err(Error::malformed(format!(
                "unexpected end of input with {} unclosed element(s)",
                stack.len().saturating_sub(1)
            )));
        }
        let Some(Frame { mut children, text, .. }) = stack.pop() else {
            return Err(Error::invariant("document frame missing"));
        };
        if !text.trim().is_empty() {
            return Err(Error::malformed("character data after root element"));
        }
        let root = match children.len() {
            1 => children.remove(0),
            0 => return Err(Error::malformed("no root element")),
            _ => return Err(Error::malformed("multiple root elements")),
        };
        if !root.text_before().trim().is_empty() {
            return Err(Error::malformed("character data before root element"));
        }
        Ok(Rc::try_unwrap(root).unwrap_or_else(|shared| (*shared).clone()))
    }

    fn open_element(
        &mut self,
        tag: QName,
        attributes: Vec<(QName, String)>,
        position: Option<TextPosition>,
        text_before: String,
    ) -> Result<OpenElement> {
        // Erst alle Deklarationen des Tags, dann Element und Attribute auflösen.
        for (name, value) in &attributes {
            if let Some(prefix) = name.declared_prefix() {
                self.prefix_hints.insert(Rc::from(value.as_str()), prefix.to_string());
            }
        }

        let prefix_hint = self.hint_for(&tag.uri)?.to_string();
        let mut attrs = AttributeMap::new();
        for (name, value) in attributes {
            if name.is_xmlns() {
                continue;
            }
            let hint = self.hint_for(&name.uri)?.to_string();
            attrs.insert(name, AttrValue::new(hint, value));
        }

        let source_hint = match position {
            Some(TextPosition { line, column }) => SourceHint::Positional {
                line,
                column,
                path: self.path.clone(),
            },
            None => SourceHint::Synthetic,
        };

        Ok(OpenElement {
            tag,
            prefix_hint,
            attrs,
            text_before,
            source_hint,
        })
    }

    fn close_element(&mut self, frame: Frame) -> Result<Element> {
        let Frame { open, children, text } = frame;
        let open = open.ok_or_else(|| Error::invariant("closing the document frame"))?;
        self.element_count += 1;
        Ok(Element::new(open.tag, open.prefix_hint, open.attrs, children, open.source_hint)
            .with_text_before(open.text_before)
            .with_last_text_inside(text))
    }
}

fn malformed(message: impl Into<Cow<'static, str>>, position: Option<TextPosition>) -> Error {
    match position {
        Some(pos) => Error::malformed_at(message, pos),
        None => Error::malformed(message),
    }
}
