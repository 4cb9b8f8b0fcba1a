//! Where an element came from, and how to say so in a message.
//!
//! Abgeleitete Knoten zeigen per `Rc` auf ihren Ursprung. Der Ursprung lebt
//! dadurch mindestens so lange wie jede Ableitung; die Kette wird nur gelesen.

use std::path::Path;
use std::rc::Rc;

use log::Level;

use crate::element::Element;

/// Provenance of an [`Element`].
#[derive(Debug, Clone)]
pub enum SourceHint {
    /// Parsed from real input.
    Positional {
        line: u32,
        column: u32,
        /// Datei, falls beim Parsen angegeben.
        path: Option<Rc<Path>>,
    },
    /// Generated from another node; messages point at that node instead.
    Derived(Rc<Element>),
    /// Freshly constructed, no further information.
    Synthetic,
}

impl SourceHint {
    /// True für geparste Knoten.
    pub fn is_positional(&self) -> bool {
        matches!(self, Self::Positional { .. })
    }
}

/// Follows `Derived` links to the node that actually carries a location.
pub fn origin(elem: &Element) -> &Element {
    let mut current = elem;
    while let SourceHint::Derived(source) = current.source_hint() {
        current = source.as_ref();
    }
    current
}

/// Renders `"<tag> at path:line:col"` or `"<tag> (generated)"` for the
/// element's origin.
///
/// ```
/// use nsdom::{describe_with_location, parse_str};
///
/// let root = parse_str("<a>\n  <b/>\n</a>", None).unwrap();
/// assert_eq!(describe_with_location(&root.child_nodes()[0]), "<b> at 2:3");
/// ```
pub fn describe_with_location(elem: &Element) -> String {
    let origin = origin(elem);
    let tag = &origin.tag().local_name;
    match origin.source_hint() {
        SourceHint::Positional { line, column, path: Some(path) } => {
            format!("<{tag}> at {}:{line}:{column}", path.display())
        }
        SourceHint::Positional { line, column, path: None } => {
            format!("<{tag}> at {line}:{column}")
        }
        SourceHint::Synthetic | SourceHint::Derived(_) => format!("<{tag}> (generated)"),
    }
}

/// Logs `message` together with the element's location.
pub fn log_elem(level: Level, message: &str, elem: &Element) {
    if log::log_enabled!(level) {
        log::log!(level, "{message}: {}", describe_with_location(elem));
    }
}
