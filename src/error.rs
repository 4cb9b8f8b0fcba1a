//! Central error types for the document model.
//!
//! Drei Fehlerklassen: kaputte Eingabe (`MalformedDocument`), verletzte
//! Vorbedingungen einer Abfrage (`ElementError`) und Vertragsbrüche zwischen
//! Tokenizer und Parser (`InternalInvariantViolation`). Dazu IO-Fehler von
//! Dateien und Sinks.

use core::fmt;
use std::borrow::Cow;

use crate::element::Element;
use crate::event::TextPosition;
use crate::provenance::describe_with_location;

/// All error kinds surfaced by parsing, querying and output.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The input is not a well-formed single-root document.
    ///
    /// Carries the tokenizer position when one is known.
    MalformedDocument {
        /// Was schiefging.
        message: Cow<'static, str>,
        /// Zeile/Spalte des Fehlers (None wenn nicht verfügbar).
        position: Option<TextPosition>,
    },
    /// A query precondition failed on an element.
    ///
    /// The message already embeds the element's provenance.
    ElementError(String),
    /// A namespace was used before its declaration was seen.
    ///
    /// Not a user error: the event source broke its ordering contract.
    InternalInvariantViolation(String),
    /// Reading input or writing to a sink failed.
    IoError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedDocument { message, position } => match position {
                Some(pos) => write!(f, "malformed document at {pos}: {message}"),
                None => write!(f, "malformed document: {message}"),
            },
            Self::ElementError(msg) => write!(f, "{msg}"),
            Self::InternalInvariantViolation(msg) => write!(f, "BUG: {msg}"),
            Self::IoError(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e.to_string())
    }
}

impl Error {
    /// Erstellt einen `MalformedDocument` Fehler ohne Position.
    pub fn malformed(message: impl Into<Cow<'static, str>>) -> Self {
        Self::MalformedDocument {
            message: message.into(),
            position: None,
        }
    }

    /// Erstellt einen `MalformedDocument` Fehler mit Zeile/Spalte.
    pub fn malformed_at(message: impl Into<Cow<'static, str>>, position: TextPosition) -> Self {
        Self::MalformedDocument {
            message: message.into(),
            position: Some(position),
        }
    }

    /// Builds an `ElementError` whose message names `elem` and where it came from.
    ///
    /// ```
    /// use nsdom::{Error, parse_str};
    ///
    /// let root = parse_str("<a/>", Some("doc.xml".as_ref())).unwrap();
    /// let err = Error::element(&root, "bad thing");
    /// assert_eq!(err.to_string(), "bad thing (<a> at doc.xml:1:1)");
    /// ```
    pub fn element(elem: &Element, message: impl fmt::Display) -> Self {
        Self::ElementError(format!("{message} ({})", describe_with_location(elem)))
    }

    /// Erstellt einen `InternalInvariantViolation` Fehler.
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InternalInvariantViolation(message.into())
    }

    /// True für Fehler, die auf kaputte Eingabe zurückgehen (nicht auf Bugs).
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedDocument { .. })
    }
}

/// A convenience `Result` type alias using [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
