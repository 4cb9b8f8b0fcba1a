//! Pretty-printing by rewriting whitespace-only text.
//!
//! Nur Element-Inhalt (Kinder, dazwischen ausschließlich Whitespace) wird neu
//! eingerückt. Sobald an einer Stelle echter Text steht, bleibt der ganze
//! Teilbaum unverändert.

use std::rc::Rc;

use crate::element::Element;

/// Copy of `root` with element-only content re-indented by `indent` per level.
///
/// The root's own `text_before` is kept. Subtrees with mixed content are
/// shared with the input, not copied.
pub fn reindent(root: &Element, indent: &str) -> Element {
    reindent_at(root, indent, 0)
}

fn reindent_at(elem: &Element, indent: &str, depth: usize) -> Element {
    if elem.child_nodes().is_empty() || has_mixed_content(elem) {
        return elem.clone();
    }
    let child_indent = format!("\n{}", indent.repeat(depth + 1));
    let children = elem
        .child_nodes()
        .iter()
        .map(|child| Rc::new(reindent_at(child, indent, depth + 1).with_text_before(child_indent.as_str())))
        .collect();
    elem.with_children(children)
        .with_last_text_inside(format!("\n{}", indent.repeat(depth)))
}

fn has_mixed_content(elem: &Element) -> bool {
    !is_blank(elem.last_text_inside()) || elem.child_nodes().iter().any(|c| !is_blank(c.text_before()))
}

#[inline]
fn is_blank(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compare, parse_str, to_text};

    #[test]
    fn nested_elements_are_indented() {
        let root = parse_str("<a>  <b><c/><d>x</d></b>\n</a>", None).unwrap();
        let pretty = reindent(&root, "  ");
        assert_eq!(to_text(&pretty).unwrap(), "<a>\n  <b>\n    <c/>\n    <d>x</d>\n  </b>\n</a>");
    }

    #[test]
    fn mixed_content_is_left_alone() {
        let xml = "<p>Hello <b>big</b> world<i><j/></i></p>";
        let root = parse_str(xml, None).unwrap();
        assert_eq!(to_text(&reindent(&root, "\t")).unwrap(), xml);
    }

    #[test]
    fn structure_is_unchanged_when_ignoring_whitespace() {
        let root = parse_str("<a><b k='v'><c/></b><b/></a>", None).unwrap();
        let pretty = reindent(&root, "    ");
        assert_eq!(compare(&root, &pretty, true), std::cmp::Ordering::Equal);
        assert_ne!(compare(&root, &pretty, false), std::cmp::Ordering::Equal);
    }

    #[test]
    fn leaf_root_is_untouched() {
        let root = parse_str("<a> </a>", None).unwrap();
        assert_eq!(reindent(&root, "  ").last_text_inside(), " ");
    }
}
