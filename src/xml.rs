//! Textual XML at the edges: quick-xml as event source, a writer as sink.
//!
//! Uses quick-xml to turn text into [`crate::XmlEvent`]s and writes events
//! back out as text with namespace declarations resolved per scope.

use std::borrow::Cow;

use memchr::memchr;

mod reader;
mod writer;

pub use reader::XmlReader;
pub use writer::XmlWriter;

/// XML 1.0 Sec. 2.11: \r\n -> \n, alleinstehende \r -> \n
pub(crate) fn normalize_line_endings(s: &str) -> Cow<'_, str> {
    if memchr(b'\r', s.as_bytes()).is_none() {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.replace("\r\n", "\n").replace('\r', "\n"))
}
