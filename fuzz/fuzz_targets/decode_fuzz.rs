#![no_main]
use std::io::Cursor;

use bookcoder::codec::decoder::DecodeOptions;
use bookcoder::engine::run_decode;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Fuzz the decoder with arbitrary bytes as the code stream.
    // The decoder must never panic — only return errors.
    let mut output = Vec::new();
    let _ = run_decode(
        Cursor::new(Vec::new()),
        data,
        &mut output,
        &DecodeOptions::default(),
    );

    // Also fuzz with a non-empty book and a small chunk size.
    if data.len() >= 2 {
        let split = data.len() / 2;
        let (book, codes) = data.split_at(split);
        let mut output = Vec::new();
        let _ = run_decode(
            Cursor::new(book.to_vec()),
            codes,
            &mut output,
            &DecodeOptions {
                code_chunk_size: 8,
                output_chunk_size: 8,
            },
        );
    }
});
