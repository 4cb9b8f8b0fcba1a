// Gemeinsame Kanonisierung für Cross-Checks gegen roxmltree.
//
// Wird per `include!` eingebunden. Benötigte Imports:
//   use nsdom::Element;

/// Kanonische Zeilenform eines Dokuments, wie roxmltree es sieht.
///
/// Normalisierungen:
/// - Prefixe entfernt, Namen in Clark-Notation
/// - Attribute lexikographisch sortiert, NS-Deklarationen übersprungen
/// - Kommentare und PIs übersprungen, angrenzender Text zusammengefasst
fn canonical_from_roxmltree(xml: &str) -> String {
    let doc = roxmltree::Document::parse(xml).expect("roxmltree parse");
    let mut lines = Vec::new();
    roxml_element(doc.root_element(), &mut lines);
    lines.join("\n")
}

fn roxml_element(node: roxmltree::Node<'_, '_>, lines: &mut Vec<String>) {
    let tag = node.tag_name();
    lines.push(format!("SE {{{}}}{}", tag.namespace().unwrap_or(""), tag.name()));
    let mut attrs: Vec<String> = node
        .attributes()
        .map(|a| format!("AT {{{}}}{}={:?}", a.namespace().unwrap_or(""), a.name(), a.value()))
        .collect();
    attrs.sort();
    lines.extend(attrs);

    let mut text = String::new();
    for child in node.children() {
        if child.is_element() {
            flush_text(&mut text, lines);
            roxml_element(child, lines);
        } else if child.is_text() {
            text.push_str(child.text().unwrap_or(""));
        }
    }
    flush_text(&mut text, lines);
    lines.push("EE".to_string());
}

/// Dieselbe Form für einen nsdom-Baum.
fn canonical_from_tree(root: &Element) -> String {
    let mut lines = Vec::new();
    tree_element(root, &mut lines);
    lines.join("\n")
}

fn tree_element(elem: &Element, lines: &mut Vec<String>) {
    let tag = elem.tag();
    lines.push(format!("SE {{{}}}{}", tag.uri, tag.local_name));
    let mut attrs: Vec<String> = elem
        .attrs()
        .iter()
        .map(|(name, value)| format!("AT {{{}}}{}={:?}", name.uri, name.local_name, value.value))
        .collect();
    attrs.sort();
    lines.extend(attrs);

    for child in elem.child_nodes() {
        if !child.text_before().is_empty() {
            lines.push(format!("CH {:?}", child.text_before()));
        }
        tree_element(child, lines);
    }
    if !elem.last_text_inside().is_empty() {
        lines.push(format!("CH {:?}", elem.last_text_inside()));
    }
    lines.push("EE".to_string());
}

fn flush_text(text: &mut String, lines: &mut Vec<String>) {
    if !text.is_empty() {
        lines.push(format!("CH {:?}", std::mem::take(text)));
    }
}
