//! [`EventSink`] that writes XML text.
//!
//! Präfixe werden beim Schreiben aus den `xmlns`-Attributen im Scope
//! bestimmt. Fehlt für einen Namespace eine Bindung, wird eine `nsN`
//! Deklaration synthetisiert, damit die Ausgabe wohlgeformt bleibt.

use std::io::Write;
use std::rc::Rc;

use log::debug;

use crate::event::{EventSink, XmlEvent};
use crate::qname::{QName, XML_NS};
use crate::{Error, Result};

/// Eine Prefix-Bindung (`""` = Default-Namespace).
#[derive(Debug, Clone)]
struct NsBinding {
    prefix: String,
    uri: Rc<str>,
}

/// Streaming XML writer, schreibt direkt in `W: Write`.
pub struct XmlWriter<W: Write> {
    writer: W,
    xml_declaration: bool,
    element_stack: Vec<(String, Vec<NsBinding>)>,
    pending_start: Option<(QName, Vec<(QName, String)>)>,
    synthetic_ns_counter: usize,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            xml_declaration: false,
            element_stack: Vec::new(),
            pending_start: None,
            synthetic_ns_counter: 0,
        }
    }

    /// Write `<?xml version="1.0" encoding="utf-8"?>` at start of document.
    #[must_use]
    pub fn with_xml_declaration(mut self, enabled: bool) -> Self {
        self.xml_declaration = enabled;
        self
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }

    /// Die aktuell gültige URI für `prefix` (aktuelles Element zuerst, dann Stack).
    fn lookup_uri<'a>(&'a self, prefix: &str, current: &'a [NsBinding]) -> Option<&'a str> {
        current
            .iter()
            .chain(self.element_stack.iter().rev().flat_map(|(_, ns)| ns.iter()))
            .find(|ns| ns.prefix == prefix)
            .map(|ns| &*ns.uri)
    }

    /// Findet einen gültigen (nicht überschatteten) Prefix für `uri`.
    fn find_prefix(&self, uri: &str, current: &[NsBinding], allow_default: bool) -> Option<String> {
        current
            .iter()
            .chain(self.element_stack.iter().rev().flat_map(|(_, ns)| ns.iter()))
            .filter(|ns| &*ns.uri == uri && (allow_default || !ns.prefix.is_empty()))
            .find(|ns| self.lookup_uri(&ns.prefix, current) == Some(uri))
            .map(|ns| ns.prefix.clone())
    }

    fn synthesize_prefix(&mut self, uri: &Rc<str>, current: &mut Vec<NsBinding>) -> String {
        let prefix = loop {
            let candidate = format!("ns{}", self.synthetic_ns_counter);
            self.synthetic_ns_counter += 1;
            if self.lookup_uri(&candidate, current).is_none() {
                break candidate;
            }
        };
        debug!("no prefix in scope for namespace '{uri}', declaring '{prefix}'");
        current.push(NsBinding {
            prefix: prefix.clone(),
            uri: uri.clone(),
        });
        prefix
    }

    /// Prefix für einen Element- oder Attributnamen bestimmen (ggf. deklarieren).
    fn prefix_for(&mut self, name: &QName, is_element: bool, current: &mut Vec<NsBinding>) -> String {
        if &*name.uri == XML_NS {
            return "xml".to_string();
        }
        if name.uri.is_empty() {
            // Element ohne Namespace unter einem Default-Namespace: xmlns="" setzen
            if is_element && self.lookup_uri("", current).is_some_and(|uri| !uri.is_empty()) {
                current.push(NsBinding {
                    prefix: String::new(),
                    uri: Rc::from(""),
                });
            }
            return String::new();
        }
        if let Some(prefix) = self.find_prefix(&name.uri, current, is_element) {
            return prefix;
        }
        self.synthesize_prefix(&name.uri, current)
    }

    /// Schreibt den gepufferten Start-Tag und pusht das Element auf den Stack.
    fn flush_pending_start(&mut self, self_closing: bool) -> Result<()> {
        let Some((name, attributes)) = self.pending_start.take() else {
            return Ok(());
        };

        let mut ns_decls: Vec<NsBinding> = attributes
            .iter()
            .filter_map(|(attr, value)| {
                attr.declared_prefix().map(|prefix| NsBinding {
                    prefix: prefix.to_string(),
                    uri: Rc::from(value.as_str()),
                })
            })
            .collect();

        let elem_prefix = self.prefix_for(&name, true, &mut ns_decls);
        let elem_name = prefixed(&elem_prefix, &name.local_name);

        let mut attrs = Vec::with_capacity(attributes.len());
        for (attr, value) in &attributes {
            if attr.is_xmlns() {
                continue;
            }
            let prefix = self.prefix_for(attr, false, &mut ns_decls);
            attrs.push((prefixed(&prefix, &attr.local_name), value.as_str()));
        }

        w(&mut self.writer, "<")?;
        w(&mut self.writer, &elem_name)?;
        write_ns_decls(&mut self.writer, &ns_decls)?;
        for (attr_name, value) in attrs {
            w(&mut self.writer, " ")?;
            w(&mut self.writer, &attr_name)?;
            w(&mut self.writer, "=\"")?;
            write_escaped_attr(&mut self.writer, value)?;
            w(&mut self.writer, "\"")?;
        }

        if self_closing {
            w(&mut self.writer, "/>")?;
        } else {
            w(&mut self.writer, ">")?;
            self.element_stack.push((elem_name, ns_decls));
        }
        Ok(())
    }
}

impl<W: Write> EventSink for XmlWriter<W> {
    fn process(&mut self, event: &XmlEvent) -> Result<()> {
        match event {
            XmlEvent::StartDocument => {
                if self.xml_declaration {
                    w(&mut self.writer, "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n")?;
                }
            }
            XmlEvent::DocType(raw) => {
                self.flush_pending_start(false)?;
                w(&mut self.writer, "<!DOCTYPE")?;
                if !raw.starts_with(char::is_whitespace) {
                    w(&mut self.writer, " ")?;
                }
                w(&mut self.writer, raw)?;
                w(&mut self.writer, ">")?;
            }
            XmlEvent::StartElement { name, attributes, .. } => {
                self.flush_pending_start(false)?;
                self.pending_start = Some((name.clone(), attributes.clone()));
            }
            XmlEvent::Text(text) => {
                self.flush_pending_start(false)?;
                write_escaped_text(&mut self.writer, text)?;
            }
            XmlEvent::EndElement => {
                if self.pending_start.is_some() {
                    self.flush_pending_start(true)?;
                } else {
                    let (name, _ns) = self
                        .element_stack
                        .pop()
                        .ok_or_else(|| Error::invariant("EndElement ohne offenes Element"))?;
                    w(&mut self.writer, "</")?;
                    w(&mut self.writer, &name)?;
                    w(&mut self.writer, ">")?;
                }
            }
            XmlEvent::EndDocument => {
                self.flush_pending_start(false)?;
                self.writer.flush()?;
            }
        }
        Ok(())
    }
}

fn prefixed(prefix: &str, local_name: &str) -> String {
    if prefix.is_empty() {
        local_name.to_string()
    } else {
        format!("{prefix}:{local_name}")
    }
}

/// Schreibt einen String als Bytes in den Writer.
#[inline]
fn w(writer: &mut impl Write, s: &str) -> Result<()> {
    writer.write_all(s.as_bytes()).map_err(Error::from)
}

/// Schreibt NS-Deklarationen in den Writer.
fn write_ns_decls(writer: &mut impl Write, ns_decls: &[NsBinding]) -> Result<()> {
    for ns in ns_decls {
        if ns.prefix.is_empty() {
            w(writer, " xmlns=\"")?;
        } else {
            w(writer, " xmlns:")?;
            w(writer, &ns.prefix)?;
            w(writer, "=\"")?;
        }
        write_escaped_attr(writer, &ns.uri)?;
        w(writer, "\"")?;
    }
    Ok(())
}

/// XML-Escaping fuer Text-Inhalt: & < > sowie \r, das beim Wiedereinlesen
/// sonst zu \n normalisiert würde.
fn write_escaped_text(writer: &mut impl Write, s: &str) -> Result<()> {
    write_escaped(writer, s, |b| match b {
        b'&' => Some("&amp;"),
        b'<' => Some("&lt;"),
        b'>' => Some("&gt;"),
        b'\r' => Some("&#13;"),
        _ => None,
    })
}

/// XML-Escaping fuer Attribut-Werte: & < " sowie Whitespace, der beim
/// Wiedereinlesen sonst normalisiert würde.
fn write_escaped_attr(writer: &mut impl Write, s: &str) -> Result<()> {
    write_escaped(writer, s, |b| match b {
        b'&' => Some("&amp;"),
        b'<' => Some("&lt;"),
        b'"' => Some("&quot;"),
        b'\n' => Some("&#10;"),
        b'\r' => Some("&#13;"),
        b'\t' => Some("&#9;"),
        _ => None,
    })
}

/// Blöcke ohne Escape-Zeichen werden in einem Stück geschrieben.
fn write_escaped(
    writer: &mut impl Write,
    s: &str,
    replacement: impl Fn(u8) -> Option<&'static str>,
) -> Result<()> {
    let bytes = s.as_bytes();
    let mut start = 0;
    for (pos, &b) in bytes.iter().enumerate() {
        let Some(escaped) = replacement(b) else {
            continue;
        };
        writer.write_all(&bytes[start..pos])?;
        writer.write_all(escaped.as_bytes())?;
        start = pos + 1;
    }
    writer.write_all(&bytes[start..])?;
    Ok(())
}
