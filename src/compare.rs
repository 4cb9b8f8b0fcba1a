//! Structural three-way comparison of element trees.

use std::cmp::Ordering;

use crate::element::Element;

/// Compares two trees field by field, stopping at the first difference.
///
/// Order: tag, attribute values (prefix hints ignored), `text_before`,
/// `last_text_inside`, child count, then the children pairwise. With
/// `ignore_whitespace` the two text fields are compared trimmed.
///
/// ```
/// use std::cmp::Ordering;
/// use nsdom::{compare, parse_str};
///
/// let a = parse_str("<a><b/></a>", None).unwrap();
/// let b = parse_str("<a/>", None).unwrap();
/// assert_eq!(compare(&a, &b, false), Ordering::Greater);
/// ```
pub fn compare(a: &Element, b: &Element, ignore_whitespace: bool) -> Ordering {
    let ws = ignore_whitespace;
    a.tag()
        .cmp(b.tag())
        .then_with(|| a.attrs().cmp_values(b.attrs()))
        .then_with(|| normalized(a.text_before(), ws).cmp(normalized(b.text_before(), ws)))
        .then_with(|| normalized(a.last_text_inside(), ws).cmp(normalized(b.last_text_inside(), ws)))
        // Anzahl vor den Kindern: sonst würde zip die Längen-Differenz verschlucken.
        .then_with(|| a.child_nodes().len().cmp(&b.child_nodes().len()))
        .then_with(|| {
            a.child_nodes()
                .iter()
                .zip(b.child_nodes())
                .map(|(x, y)| compare(x, y, ignore_whitespace))
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
        })
}

#[inline]
fn normalized(text: &str, ignore_whitespace: bool) -> &str {
    if ignore_whitespace { text.trim() } else { text }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_str;

    fn cmp(a: &str, b: &str, ignore_whitespace: bool) -> Ordering {
        compare(
            &parse_str(a, None).unwrap(),
            &parse_str(b, None).unwrap(),
            ignore_whitespace,
        )
    }

    #[test]
    fn identical_documents_are_equal() {
        assert_eq!(cmp("<a x='1'><b>t</b></a>", "<a x='1'><b>t</b></a>", false), Ordering::Equal);
    }

    #[test]
    fn child_count_mismatch_is_a_difference() {
        assert_eq!(cmp("<a><b/></a>", "<a/>", false), Ordering::Greater);
        assert_eq!(cmp("<a/>", "<a><b/></a>", false), Ordering::Less);
    }

    #[test]
    fn prefix_hints_do_not_matter() {
        assert_eq!(
            cmp(r#"<p:a xmlns:p="urn:x" p:k="1"/>"#, r#"<q:a xmlns:q="urn:x" q:k="1"/>"#, false),
            Ordering::Equal
        );
        assert_eq!(cmp(r#"<a xmlns="urn:x"/>"#, r#"<p:a xmlns:p="urn:x"/>"#, false), Ordering::Equal);
    }

    #[test]
    fn namespace_is_part_of_the_tag() {
        assert_ne!(cmp(r#"<a xmlns="urn:x"/>"#, "<a/>", false), Ordering::Equal);
    }

    #[test]
    fn attribute_values_and_sets() {
        assert_eq!(cmp("<a x='1'/>", "<a x='2'/>", false), Ordering::Less);
        assert_ne!(cmp("<a x='1'/>", "<a x='1' y='2'/>", false), Ordering::Equal);
        assert_eq!(cmp("<a x='1' y='2'/>", "<a y='2' x='1'/>", false), Ordering::Equal);
    }

    #[test]
    fn whitespace_only_matters_when_asked() {
        let (a, b) = ("<a>\n  <b> t </b>\n</a>", "<a><b>t</b></a>");
        assert_ne!(cmp(a, b, false), Ordering::Equal);
        assert_eq!(cmp(a, b, true), Ordering::Equal);
    }

    #[test]
    fn tag_difference_wins_over_later_fields() {
        assert_eq!(cmp("<a><z/></a>", "<b/>", false), Ordering::Less);
    }
}
