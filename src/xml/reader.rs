//! quick-xml backed [`EventSource`].

use std::borrow::Cow;
use std::collections::VecDeque;

use memchr::{memchr, memchr_iter};
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesCData, BytesStart, BytesText, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

use super::normalize_line_endings;
use crate::event::{EventSource, TextPosition, XmlEvent};
use crate::qname::QName;
use crate::{Error, Result};

/// Streams [`XmlEvent`]s out of an in-memory document.
///
/// Empty-element tags (`<a/>`) come out as a start/end pair. Comments,
/// processing instructions and the XML declaration are skipped; character
/// and predefined entity references become text; any other entity
/// reference is an error because DTDs are not processed.
pub struct XmlReader<'a> {
    reader: NsReader<&'a [u8]>,
    lines: LineIndex<'a>,
    depth: usize,
    queued: VecDeque<XmlEvent>,
    started: bool,
    finished: bool,
}

impl<'a> XmlReader<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut reader = NsReader::from_str(input);
        reader.config_mut().trim_text(false);
        Self {
            reader,
            lines: LineIndex::new(input),
            depth: 0,
            queued: VecDeque::new(),
            started: false,
            finished: false,
        }
    }

    fn start_element(&self, e: &BytesStart<'_>, position: TextPosition) -> Result<XmlEvent> {
        let (ns, local) = self.reader.resolver().resolve_element(e.name());
        let name = QName::new(
            resolve_to_uri(ns, position)?,
            decode_str(local.as_ref(), position)?,
        );
        if name.is_xmlns() {
            return Err(Error::malformed_at("element name uses the reserved 'xmlns' prefix", position));
        }

        let mut attributes = Vec::with_capacity(4);
        for attr in e.attributes().with_checks(true) {
            let attr = attr.map_err(|er| Error::malformed_at(er.to_string(), position))?;
            let key = attr.key.as_ref();
            let raw = decode_str(attr.value.as_ref(), position)?;
            let value = unescape_attr_value(raw, position)?.into_owned();

            // Namespace-Deklarationen als Attribute im xmlns-Namespace weiterreichen
            if key == b"xmlns" {
                attributes.push((QName::xmlns(""), value));
                continue;
            }
            if let Some(prefix) = key.strip_prefix(b"xmlns:") {
                attributes.push((QName::xmlns(decode_str(prefix, position)?), value));
                continue;
            }

            let (ns, local) = self.reader.resolver().resolve_attribute(attr.key);
            let attr_name = QName::new(
                resolve_to_uri(ns, position)?,
                decode_str(local.as_ref(), position)?,
            );
            attributes.push((attr_name, value));
        }

        Ok(XmlEvent::StartElement {
            name,
            attributes,
            position: Some(position),
        })
    }
}

impl EventSource for XmlReader<'_> {
    fn next_event(&mut self) -> Result<Option<XmlEvent>> {
        if !self.started {
            self.started = true;
            return Ok(Some(XmlEvent::StartDocument));
        }
        if let Some(queued) = self.queued.pop_front() {
            return Ok(Some(queued));
        }
        if self.finished {
            return Ok(None);
        }

        loop {
            // Position vor dem Lesen = Position des '<' bei Start-Tags
            let offset = self.reader.buffer_position() as usize;
            let event = self.reader.read_event().map_err(|e| {
                let at = self.lines.position(self.reader.error_position() as usize);
                Error::malformed_at(e.to_string(), at)
            })?;
            match event {
                Event::Start(e) => {
                    let start = self.start_element(&e, self.lines.position(offset))?;
                    self.depth += 1;
                    return Ok(Some(start));
                }
                Event::Empty(e) => {
                    let start = self.start_element(&e, self.lines.position(offset))?;
                    self.queued.push_back(XmlEvent::EndElement);
                    return Ok(Some(start));
                }
                Event::End(_) => {
                    self.depth = self.depth.checked_sub(1).ok_or_else(|| {
                        Error::malformed_at("end tag without open element", self.lines.position(offset))
                    })?;
                    return Ok(Some(XmlEvent::EndElement));
                }
                Event::Text(e) => {
                    if let Some(text) = decode_text(e, self.lines.position(offset))? {
                        return Ok(Some(XmlEvent::Text(text)));
                    }
                }
                Event::CData(e) => {
                    if let Some(text) = decode_cdata(e, self.lines.position(offset))? {
                        return Ok(Some(XmlEvent::Text(text)));
                    }
                }
                Event::GeneralRef(e) => {
                    let position = self.lines.position(offset);
                    let name = decode_str(&e, position)?;
                    return Ok(Some(XmlEvent::Text(resolve_reference(name, position)?.into_owned())));
                }
                Event::DocType(e) => {
                    let raw = decode_str(&e, self.lines.position(offset))?;
                    return Ok(Some(XmlEvent::DocType(raw.to_string())));
                }
                Event::Comment(_) | Event::PI(_) | Event::Decl(_) => {}
                Event::Eof => {
                    self.finished = true;
                    if self.depth > 0 {
                        return Err(Error::malformed_at(
                            format!("unexpected end of input: {} unclosed element(s)", self.depth),
                            self.lines.position(offset),
                        ));
                    }
                    return Ok(Some(XmlEvent::EndDocument));
                }
            }
        }
    }
}

/// Byte offset -> (line, column) über vorab gesammelte Zeilenanfänge.
struct LineIndex<'a> {
    input: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(input: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(memchr_iter(b'\n', input.as_bytes()).map(|i| i + 1));
        Self { input, line_starts }
    }

    fn position(&self, offset: usize) -> TextPosition {
        let mut offset = offset.min(self.input.len());
        while !self.input.is_char_boundary(offset) {
            offset -= 1;
        }
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts[line - 1];
        let column = self.input[line_start..offset].chars().count() + 1;
        TextPosition {
            line: u32::try_from(line).unwrap_or(u32::MAX),
            column: u32::try_from(column).unwrap_or(u32::MAX),
        }
    }
}

fn resolve_to_uri(ns: ResolveResult<'_>, position: TextPosition) -> Result<String> {
    match ns {
        // quick-xml bindet den unaufgelösten Attributwert; gleich auflösen wie die Deklaration.
        ResolveResult::Bound(ns) => Ok(unescape_attr_value(decode_str(ns.as_ref(), position)?, position)?.into_owned()),
        ResolveResult::Unbound => Ok(String::new()),
        ResolveResult::Unknown(prefix) => Err(Error::malformed_at(
            format!("unknown namespace prefix '{}'", String::from_utf8_lossy(&prefix)),
            position,
        )),
    }
}

fn decode_str(bytes: &[u8], position: TextPosition) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|er| Error::malformed_at(er.to_string(), position))
}

fn decode_text(e: BytesText<'_>, position: TextPosition) -> Result<Option<String>> {
    let raw = decode_str(&e, position)?;
    let text = quick_xml::escape::unescape(raw)
        .map_err(|er| Error::malformed_at(er.to_string(), position))?;
    if text.is_empty() {
        Ok(None)
    } else {
        Ok(Some(normalize_line_endings(&text).into_owned()))
    }
}

fn decode_cdata(e: BytesCData<'_>, position: TextPosition) -> Result<Option<String>> {
    let bytes = e.into_inner();
    let text = decode_str(&bytes, position)?;
    if text.is_empty() {
        Ok(None)
    } else {
        Ok(Some(normalize_line_endings(text).into_owned()))
    }
}

/// `&name;` ohne `&` und `;`: Zeichenreferenz oder vordefinierte Entity.
fn resolve_reference(name: &str, position: TextPosition) -> Result<Cow<'static, str>> {
    if name.starts_with('#') {
        return resolve_char_reference(name)
            .map(|ch| Cow::Owned(ch.to_string()))
            .ok_or_else(|| Error::malformed_at(format!("invalid character reference '&{name};'"), position));
    }
    resolve_predefined_entity(name)
        .map(Cow::Borrowed)
        .ok_or_else(|| Error::malformed_at(format!("undefined entity '&{name};'"), position))
}

/// Löst Referenzen in Attributwerten auf.
fn unescape_attr_value(value: &str, position: TextPosition) -> Result<Cow<'_, str>> {
    let bytes = value.as_bytes();
    let needs_normalizing = memchr::memchr3(b'\t', b'\n', b'\r', bytes).is_some();
    let Some(mut amp) = memchr(b'&', bytes) else {
        if !needs_normalizing {
            return Ok(Cow::Borrowed(value));
        }
        let mut out = String::with_capacity(value.len());
        push_normalized(&mut out, value);
        return Ok(Cow::Owned(out));
    };

    let mut out = String::with_capacity(value.len());
    let mut pos = 0;
    loop {
        push_normalized(&mut out, &value[pos..amp]);
        let Some(rel_semi) = memchr(b';', &bytes[amp + 1..]) else {
            return Err(Error::malformed_at("unterminated reference in attribute value", position));
        };
        let semi = amp + 1 + rel_semi;
        // Zeichenreferenzen (&#10;) bleiben unnormalisiert.
        out.push_str(&resolve_reference(&value[amp + 1..semi], position)?);
        pos = semi + 1;
        match memchr(b'&', &bytes[pos..]) {
            Some(rel) => amp = pos + rel,
            None => {
                push_normalized(&mut out, &value[pos..]);
                break;
            }
        }
    }
    Ok(Cow::Owned(out))
}

/// XML 1.0 Sec. 3.3.3: literaler Whitespace in Attributwerten wird zu Leerzeichen.
fn push_normalized(out: &mut String, literal: &str) {
    out.extend(literal.chars().map(|c| if matches!(c, '\t' | '\n' | '\r') { ' ' } else { c }));
}

/// Eingabe: `#49` (dezimal) oder `#x31` (hexadezimal), ohne `&` und `;`.
fn resolve_char_reference(ref_name: &str) -> Option<char> {
    let digits = &ref_name[1..];
    let code_point = if let Some(hex) = digits.strip_prefix('x') {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        digits.parse::<u32>().ok()?
    };
    char::from_u32(code_point).filter(|&c| is_xml_char(c))
}

/// XML 1.0 `Char`: keine Steuerzeichen außer Tab/LF/CR, kein U+FFFE/U+FFFF.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(xml: &str) -> Result<Vec<XmlEvent>> {
        let mut reader = XmlReader::new(xml);
        let mut out = Vec::new();
        while let Some(ev) = reader.next_event()? {
            out.push(ev);
        }
        Ok(out)
    }

    #[test]
    fn char_references_outside_xml_char_are_rejected() {
        for xml in ["<a>&#0;x</a>", "<a>&#x1F;</a>", "<a>&#xFFFE;</a>", r#"<a b="&#x8;"/>"#] {
            let err = events(xml).unwrap_err();
            assert!(err.is_malformed(), "{xml}: {err}");
            assert!(err.to_string().contains("invalid character reference"), "{xml}: {err}");
        }
        let text: String = events("<a>&#x9;&#xD;&#x10000;</a>")
            .unwrap()
            .into_iter()
            .filter_map(|ev| match ev {
                XmlEvent::Text(t) => Some(t),
                _ => None,
            })
            .collect();
        assert_eq!(text, "\t\r\u{10000}");
    }

    #[test]
    fn empty_element_becomes_start_end_pair() {
        let evs = events("<a/>").unwrap();
        assert_eq!(evs.len(), 4);
        assert_eq!(evs[0], XmlEvent::StartDocument);
        assert!(matches!(&evs[1], XmlEvent::StartElement { name, .. } if name.is("", "a")));
        assert_eq!(evs[2], XmlEvent::EndElement);
        assert_eq!(evs[3], XmlEvent::EndDocument);
    }

    #[test]
    fn namespace_declarations_are_attributes() {
        let evs = events(r#"<r xmlns="urn:a" xmlns:b="urn:b" b:x="1"/>"#).unwrap();
        let XmlEvent::StartElement { name, attributes, position } = &evs[1] else {
            panic!("expected start element, got {:?}", evs[1]);
        };
        assert!(name.is("urn:a", "r"));
        assert_eq!(*position, Some(TextPosition { line: 1, column: 1 }));
        assert_eq!(attributes[0], (QName::xmlns(""), "urn:a".to_string()));
        assert_eq!(attributes[1], (QName::xmlns("b"), "urn:b".to_string()));
        assert_eq!(attributes[2], (QName::new("urn:b", "x"), "1".to_string()));
    }

    #[test]
    fn references_become_text() {
        let evs = events("<a>x &amp; &#65;&#x42;</a>").unwrap();
        let text: String = evs
            .iter()
            .filter_map(|e| match e {
                XmlEvent::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(text, "x & AB");
    }

    #[test]
    fn attribute_references_resolved() {
        let evs = events(r#"<a v="&lt;&#x41;&quot;"/>"#).unwrap();
        let XmlEvent::StartElement { attributes, .. } = &evs[1] else {
            panic!("expected start element");
        };
        assert_eq!(attributes[0].1, "<A\"");
    }

    #[test]
    fn attribute_whitespace_is_normalized_but_char_refs_are_not() {
        let evs = events("<a v=\"x\ty\nz&#10;\"/>").unwrap();
        let XmlEvent::StartElement { attributes, .. } = &evs[1] else {
            panic!("expected start element");
        };
        assert_eq!(attributes[0].1, "x y z\n");
    }

    #[test]
    fn comments_and_pis_are_skipped() {
        let evs = events("<?xml version='1.0'?><!-- c --><a><?pi x?></a>").unwrap();
        assert_eq!(evs.len(), 4);
    }

    #[test]
    fn start_positions_count_lines_and_chars() {
        let evs = events("<a>\n  <ä/><b/></a>").unwrap();
        let positions: Vec<_> = evs
            .iter()
            .filter_map(|e| match e {
                XmlEvent::StartElement { position, .. } => *position,
                _ => None,
            })
            .collect();
        assert_eq!(
            positions,
            vec![
                TextPosition { line: 1, column: 1 },
                TextPosition { line: 2, column: 3 },
                TextPosition { line: 2, column: 7 },
            ]
        );
    }

    #[test]
    fn unknown_prefix_is_malformed() {
        let err = events("<p:a/>").unwrap_err();
        assert!(err.is_malformed(), "{err}");
        assert!(err.to_string().contains("1:1"), "{err}");
    }

    #[test]
    fn mismatched_end_tag_is_malformed_with_position() {
        let err = events("<a>\n</b>").unwrap_err();
        let Error::MalformedDocument { position, .. } = &err else {
            panic!("expected malformed, got {err}");
        };
        assert_eq!(position.map(|p| p.line), Some(2));
    }

    #[test]
    fn unclosed_element_is_malformed() {
        let err = events("<a><b></b>").unwrap_err();
        assert!(err.is_malformed(), "{err}");
    }

    #[test]
    fn undefined_entity_is_malformed() {
        let err = events("<a>&nbsp;</a>").unwrap_err();
        assert!(err.to_string().contains("nbsp"), "{err}");
    }
}
