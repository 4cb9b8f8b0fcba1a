//! Output options for [`crate::to_text_with_options`] and [`crate::to_writer`].
//!
//! # Beispiel
//!
//! ```
//! use nsdom::OutputOptions;
//!
//! let opts = OutputOptions::default()
//!     .with_xml_declaration(true)
//!     .with_reindent(true)
//!     .with_indent("\t");
//!
//! assert!(opts.xml_declaration());
//! assert!(opts.reindent());
//! assert_eq!(opts.indent(), "\t");
//! ```

/// Indentation used by [`OutputOptions::default`].
pub const DEFAULT_INDENT: &str = "  ";

/// Controls how a tree is written out.
///
/// The default writes the tree exactly as stored: no XML declaration, no
/// whitespace changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputOptions {
    pub(crate) xml_declaration: bool,
    pub(crate) reindent: bool,
    pub(crate) indent: String,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            xml_declaration: false,
            reindent: false,
            indent: DEFAULT_INDENT.to_string(),
        }
    }
}

impl OutputOptions {
    // --- Getter ---

    /// Emit `<?xml version="1.0" encoding="utf-8"?>` first.
    pub fn xml_declaration(&self) -> bool { self.xml_declaration }
    /// Re-indent element-only content before writing (see [`crate::reindent`]).
    pub fn reindent(&self) -> bool { self.reindent }
    /// One level of indentation.
    pub fn indent(&self) -> &str { &self.indent }

    // --- Builder-Setter ---

    /// Setzt die XML-Deklaration.
    #[must_use]
    pub fn with_xml_declaration(mut self, enabled: bool) -> Self { self.xml_declaration = enabled; self }
    /// Aktiviert Reindent.
    #[must_use]
    pub fn with_reindent(mut self, enabled: bool) -> Self { self.reindent = enabled; self }
    /// Setzt die Einrückung pro Ebene.
    #[must_use]
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self { self.indent = indent.into(); self }
}
