#![no_main]

use libfuzzer_sys::fuzz_target;
use lintel::options::parse_options;

fuzz_target!(|data: &[u8]| {
    // Split the input into NUL-separated argv entries.
    let arguments: Vec<String> = data
        .split(|&b| b == 0)
        .take(1024)
        .map(|arg| String::from_utf8_lossy(arg).into_owned())
        .collect();
    let options = parse_options(&arguments);
    let _ = options.files.len();
    let _ = options.unrecognized.len();
});
