#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(xml) = std::str::from_utf8(data) {
        // Nur Fehler, keine Panics oder Invariant-Verletzungen.
        if let Err(e) = nsdom::parse_str(xml, None) {
            assert!(!matches!(e, nsdom::Error::InternalInvariantViolation(_)), "{e}");
        }
    }
});
