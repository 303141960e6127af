#![no_main]
use libfuzzer_sys::fuzz_target;
use wixtend::VendorProfile;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = wixtend::extend_str(s, &VendorProfile::default());
    }
});
