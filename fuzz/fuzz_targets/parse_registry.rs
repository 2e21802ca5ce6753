//! Registry TOML parsing and validation never panic; bad input is an error.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(file) = specvs_config::parse_registry_str(text) {
        let _ = specvs_domain::Registry::from_file(file);
    }
});
