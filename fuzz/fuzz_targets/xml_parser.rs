#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(doc) = wixtend::from_xml_bytes(data) {
        let written = wixtend::to_xml_string(&doc);
        let _ = wixtend::from_xml_str(&written);
    }
});
