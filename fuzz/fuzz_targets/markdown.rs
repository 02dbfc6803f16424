#![no_main]

use libfuzzer_sys::fuzz_target;

// First byte selects a renderer configuration from the registry, the rest is
// decoded into that configuration's payload. Unsupported-input errors are
// swallowed by the dispatcher; anything else panics and is recorded as a crash.
fuzz_target!(|data: &[u8]| {
    mdfuzz_core::run_iteration(data);
});
