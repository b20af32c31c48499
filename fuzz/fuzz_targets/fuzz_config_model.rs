//! Fuzz target for model configuration parsing.
//!
//! Arbitrary JSON or TOML must either be rejected with an error or build a
//! model; it must never panic, including inside the validators and
//! constructors.

#![no_main]

use bmx_config::ModelConfig;
use bmx_core::Registry;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let registry = Registry::with_builtins();
    for parsed in [ModelConfig::from_json_str(text), ModelConfig::from_toml_str(text)] {
        if let Ok(config) = parsed {
            let _ = registry.build(&config);
        }
    }
});
