#![no_main]
use std::io::Cursor;

use bookcoder::codec::decoder::DecodeOptions;
use bookcoder::codec::encoder::EncodeOptions;
use bookcoder::engine::{run_decode, run_encode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }

    // First two bytes pick the buffer sizing; the rest is the input.
    let window_size = 1 + data[0] as usize;
    let chunk_size = 1 + data[1] as usize;
    let input = &data[2..];

    // Appending the input to a full-alphabet book guarantees coverage,
    // so encoding must succeed and the roundtrip must be exact.
    let mut book: Vec<u8> = (0..=255u8).collect();
    book.extend_from_slice(input);

    let opts = EncodeOptions {
        window_size,
        input_chunk_size: chunk_size,
        allow_duplicates: data[0] & 1 != 0,
        reset_at_window_end: false,
    };

    let mut codes = Vec::new();
    run_encode(Cursor::new(book.clone()), input, &mut codes, &opts).unwrap();
    assert_eq!(codes.len(), 4 * input.len());

    let mut output = Vec::new();
    run_decode(
        Cursor::new(book),
        &codes[..],
        &mut output,
        &DecodeOptions {
            code_chunk_size: 4 * chunk_size,
            output_chunk_size: chunk_size,
        },
    )
    .unwrap();
    assert_eq!(output, input);
});
