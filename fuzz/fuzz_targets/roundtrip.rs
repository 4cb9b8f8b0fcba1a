#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(xml) = std::str::from_utf8(data) {
        if let Ok(tree) = nsdom::parse_str(xml, None) {
            let text = nsdom::to_text(&tree).expect("serialize parsed tree");
            let again = nsdom::parse_str(&text, None).expect("reparse serialized tree");
            assert_eq!(nsdom::compare(&tree, &again, false), std::cmp::Ordering::Equal);
        }
    }
});
