//! Round-trip tests: Text → Baum → Text → Baum, plus Abgleich mit roxmltree.

use std::cmp::Ordering;

use nsdom::{Element, OutputOptions, compare, parse_str, to_text, to_text_with_options};

include!("common/canonical.rs");

/// Dokumente mit Namespaces, gemischtem Inhalt und Sonderzeichen.
const DOCUMENTS: &[&str] = &[
    "<a/>",
    "<a>text</a>",
    "<a>\n  <b x='1' y=\"2\">one</b>\n  <c/>\n</a>",
    r#"<root xmlns="urn:a" xmlns:b="urn:b"><b:child b:attr="1"/></root>"#,
    r#"<p:r xmlns:p="urn:p" xmlns:q="urn:q"><q:x q:k="v" p:k="w"/><p:y/></p:r>"#,
    r#"<r xmlns="urn:d"><plain xmlns="">inner</plain><d/></r>"#,
    r#"<r><foo:a xmlns:foo="http://a"/><foo:b xmlns:foo="http://b"/></r>"#,
    "<p>Hello <b>big</b> world, 1 &lt; 2 &amp;&amp; 3 &gt; 2</p>",
    "<a v=\"&quot;quoted&quot; &amp; &lt;tag&gt;\" w='tab&#9;nl&#10;'/>",
    "<?xml version=\"1.0\"?>\n<!-- head -->\n<a><![CDATA[<raw> & stuff]]><!-- c -->tail</a>\n",
    "<a xml:lang=\"de\" xml:space=\"preserve\">  </a>",
    "<r xmlns:x=\"urn:x\"><x:a><x:b xmlns:x=\"urn:y\"><x:c/></x:b></x:a></r>",
    "<unicodé attr=\"ß→✓\">日本語 \u{1F600}</unicodé>",
];

fn parse(xml: &str) -> Element {
    parse_str(xml, None).unwrap_or_else(|e| panic!("parse {xml:?}: {e}"))
}

#[test]
fn reparse_of_output_is_structurally_equal() {
    for xml in DOCUMENTS {
        let tree = parse(xml);
        let text = to_text(&tree).unwrap();
        let again = parse(&text);
        assert_eq!(compare(&tree, &again, false), Ordering::Equal, "{xml:?} -> {text:?}");
    }
}

#[test]
fn output_is_stable_after_one_round() {
    for xml in DOCUMENTS {
        let once = to_text(&parse(xml)).unwrap();
        let twice = to_text(&parse(&once)).unwrap();
        assert_eq!(once, twice, "{xml:?}");
    }
}

/// Parser-Baum und roxmltree sehen dasselbe Infoset.
#[test]
fn tree_matches_roxmltree() {
    for xml in DOCUMENTS {
        assert_eq!(canonical_from_tree(&parse(xml)), canonical_from_roxmltree(xml), "{xml:?}");
    }
}

/// Auch die serialisierte Form ist für roxmltree gleichwertig.
#[test]
fn output_matches_roxmltree() {
    for xml in DOCUMENTS {
        let text = to_text(&parse(xml)).unwrap();
        assert_eq!(canonical_from_roxmltree(&text), canonical_from_roxmltree(xml), "{xml:?} -> {text:?}");
    }
}

#[test]
fn end_to_end_scenario() {
    let xml = r#"<root xmlns="urn:a" xmlns:b="urn:b"><b:child b:attr="1"/></root>"#;
    let out = to_text(&parse(xml)).unwrap();
    assert_eq!(out, xml);

    let doc = roxmltree::Document::parse(&out).unwrap();
    let root = doc.root_element();
    assert_eq!(root.default_namespace(), Some("urn:a"));
    assert_eq!(root.lookup_prefix("urn:b"), Some("b"));
    let child = root.first_element_child().unwrap();
    assert_eq!(child.attributes().count(), 1);
    assert_eq!(child.attribute(("urn:b", "attr")), Some("1"));
}

#[test]
fn reindented_output_keeps_structure() {
    let opts = OutputOptions::default().with_reindent(true);
    for xml in DOCUMENTS {
        let tree = parse(xml);
        let pretty = parse(&to_text_with_options(&tree, &opts).unwrap());
        assert_eq!(compare(&tree, &pretty, true), Ordering::Equal, "{xml:?}");
    }
}

#[test]
fn copy_with_attrs_serializes_new_value() {
    let tree = parse(r#"<a xmlns:p="urn:p" p:k="old"><b/></a>"#);
    let value = nsdom::AttrValue::new("p", "new");
    let edited = tree.with_attribute(nsdom::QName::new("urn:p", "k"), value);
    assert_eq!(to_text(&edited).unwrap(), r#"<a xmlns:p="urn:p" p:k="new"><b/></a>"#);
    assert_eq!(to_text(&tree).unwrap(), r#"<a xmlns:p="urn:p" p:k="old"><b/></a>"#);
    assert!(std::rc::Rc::ptr_eq(&tree.child_nodes()[0], &edited.child_nodes()[0]));
}
