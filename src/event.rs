//! Event model shared by the tokenizer side and the output side.
//!
//! Der Parser konsumiert Events aus einer [`EventSource`], der Serializer
//! schreibt dieselben Events in eine [`EventSink`]. Beide Seiten sind
//! austauschbar: quick-xml ([`crate::xml::XmlReader`]) bzw. der Text-Writer
//! ([`crate::xml::XmlWriter`]) sind nur die Standard-Implementierungen.

use std::fmt;

use crate::qname::QName;
use crate::Result;

/// 1-based line and column in the source text (columns count characters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextPosition {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number (in characters, not bytes).
    pub column: u32,
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// One low-level XML event.
///
/// Attribute lists carry resolved names; namespace declarations travel as
/// ordinary attributes in [`crate::qname::XMLNS_NS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    /// Start Document - marks the beginning of a document.
    StartDocument,
    /// A DOCTYPE declaration (raw content between `<!DOCTYPE` and `>`).
    DocType(String),
    /// Start Element - tag name, attributes in source order, and where the tag began.
    StartElement {
        /// Aufgelöster Elementname.
        name: QName,
        /// Attribute inkl. xmlns-Deklarationen, in Quelltext-Reihenfolge.
        attributes: Vec<(QName, String)>,
        /// Position des `<` (None bei synthetischen Events).
        position: Option<TextPosition>,
    },
    /// Character data (already unescaped).
    Text(String),
    /// End Element - closes the current element.
    EndElement,
    /// End Document - marks the end of a document.
    EndDocument,
}

/// Producer of [`XmlEvent`]s.
///
/// `Ok(None)` means the input is exhausted. Lexical errors must come back as
/// [`crate::Error::MalformedDocument`] with a position.
pub trait EventSource {
    /// Liefert das nächste Event oder `None` am Ende.
    fn next_event(&mut self) -> Result<Option<XmlEvent>>;
}

/// Vorgefertigte Event-Folgen (Tests, synthetische Dokumente).
impl EventSource for std::vec::IntoIter<XmlEvent> {
    fn next_event(&mut self) -> Result<Option<XmlEvent>> {
        Ok(self.next())
    }
}

impl<S: EventSource + ?Sized> EventSource for &mut S {
    fn next_event(&mut self) -> Result<Option<XmlEvent>> {
        (**self).next_event()
    }
}

/// Consumer of [`XmlEvent`]s.
pub trait EventSink {
    /// Verarbeitet ein Event.
    fn process(&mut self, event: &XmlEvent) -> Result<()>;
}

/// Sammelt Events im Speicher.
impl EventSink for Vec<XmlEvent> {
    fn process(&mut self, event: &XmlEvent) -> Result<()> {
        self.push(event.clone());
        Ok(())
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn process(&mut self, event: &XmlEvent) -> Result<()> {
        (**self).process(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_display() {
        let pos = TextPosition { line: 10, column: 5 };
        assert_eq!(pos.to_string(), "10:5");
    }

    #[test]
    fn vec_source_yields_then_ends() {
        let mut src = vec![XmlEvent::StartDocument, XmlEvent::EndDocument].into_iter();
        assert_eq!(src.next_event().unwrap(), Some(XmlEvent::StartDocument));
        assert_eq!(src.next_event().unwrap(), Some(XmlEvent::EndDocument));
        assert_eq!(src.next_event().unwrap(), None);
    }

    #[test]
    fn vec_sink_records() {
        let mut sink: Vec<XmlEvent> = Vec::new();
        sink.process(&XmlEvent::Text("hi".into())).unwrap();
        (&mut sink).process(&XmlEvent::EndElement).unwrap();
        assert_eq!(sink, vec![XmlEvent::Text("hi".into()), XmlEvent::EndElement]);
    }
}
