// cargo fuzz run parse corpus/parse -- -timeout=30

#![no_main]

use libfuzzer_sys::fuzz_target;

use gifcut::Document;

fuzz_target!(|data: &[u8]| {
    let doc = Document::from_bytes(data);
    let _ = Document::from_bytes(&doc.to_bytes());
    for slice in doc.slices() {
        let _ = slice.to_bytes();
    }
});
