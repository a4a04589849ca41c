// Windowing behavior: reloads, wraparound, the reset policy, and larger
// seeded workloads driven through deliberately small buffers.

use std::io::Cursor;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use bookcoder::codec::decoder::DecodeOptions;
use bookcoder::codec::encoder::{EncodeError, EncodeOptions};
use bookcoder::engine::{run_decode, run_encode};

fn encode(book: &[u8], input: &[u8], opts: &EncodeOptions) -> Result<Vec<u8>, EncodeError> {
    let mut codes = Vec::new();
    run_encode(Cursor::new(book.to_vec()), input, &mut codes, opts)?;
    Ok(codes)
}

fn decode(book: &[u8], codes: &[u8], opts: &DecodeOptions) -> Vec<u8> {
    let mut output = Vec::new();
    run_decode(Cursor::new(book.to_vec()), codes, &mut output, opts).unwrap();
    output
}

fn offsets(codes: &[u8]) -> Vec<u32> {
    codes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

#[test]
fn sole_occurrence_behind_a_window_reload_is_found() {
    // 'q' sits at offset 9, visible only after the first 4-byte window.
    let book = b"aaaaaaaaaq";
    for window_size in [1usize, 2, 3, 4, 9] {
        let opts = EncodeOptions {
            window_size,
            ..Default::default()
        };
        let codes = encode(book, b"q", &opts).unwrap();
        assert_eq!(offsets(&codes), vec![9], "window_size={window_size}");
    }
}

#[test]
fn short_final_window_is_still_scanned() {
    // Book length is not a multiple of the window size; the tail byte
    // must still be matchable.
    let book = b"bbbbbbbz"; // 8 bytes
    let opts = EncodeOptions {
        window_size: 3, // windows: 3 + 3 + 2
        ..Default::default()
    };
    let codes = encode(book, b"z", &opts).unwrap();
    assert_eq!(offsets(&codes), vec![7]);
}

#[test]
fn wraparound_revisits_earlier_windows() {
    // 'a' only occurs at offset 0. A later input byte must wrap back to
    // the book start to find it again.
    let book = b"abbb";
    let opts = EncodeOptions {
        window_size: 2,
        ..Default::default()
    };
    let codes = encode(book, b"ba", &opts).unwrap();
    let got = offsets(&codes);
    assert_eq!(got[1], 0, "wraparound should rediscover offset 0");
}

#[test]
fn reset_policy_keeps_offsets_in_the_first_window() {
    let book: Vec<u8> = (0..=255u8).chain(0..=255u8).collect();
    let input: Vec<u8> = (0..64u8).collect();
    let opts = EncodeOptions {
        window_size: 256,
        reset_at_window_end: true,
        ..Default::default()
    };
    let codes = encode(&book, &input, &opts).unwrap();
    for o in offsets(&codes) {
        assert!(o < 256, "offset {o} escaped the reset window");
    }

    let output = decode(&book, &codes, &DecodeOptions::default());
    assert_eq!(output, input);
}

#[test]
fn reset_policy_rejects_values_outside_the_first_window() {
    let book = b"abcdefgh";
    let opts = EncodeOptions {
        window_size: 4,
        reset_at_window_end: true,
        ..Default::default()
    };
    // 'h' exists in the book but never inside the first window.
    let err = encode(book, b"h", &opts).unwrap_err();
    assert!(matches!(
        err,
        EncodeError::InsufficientEntropy { value: b'h' }
    ));
}

#[test]
fn roundtrip_is_stable_across_window_and_chunk_sizes() {
    let book = b"Call me Ishmael. Some years ago, never mind how long precisely";
    let input = b"some long hollow call";

    let reference = encode(book, input, &EncodeOptions::default()).unwrap();
    let reference_out = decode(book, &reference, &DecodeOptions::default());
    assert_eq!(reference_out, input);

    for (window_size, chunk) in [(1usize, 1usize), (5, 3), (16, 64), (1024, 7)] {
        let opts = EncodeOptions {
            window_size,
            input_chunk_size: chunk,
            ..Default::default()
        };
        let codes = encode(book, input, &opts).unwrap();
        let output = decode(
            book,
            &codes,
            &DecodeOptions {
                code_chunk_size: 4 * chunk,
                output_chunk_size: chunk,
            },
        );
        assert_eq!(output, input, "window={window_size} chunk={chunk}");
    }
}

#[test]
fn seeded_binary_workload_roundtrips_through_small_windows() {
    let mut rng = StdRng::seed_from_u64(0x0b00c0de);

    // Full-coverage book: every value at least once, then noise.
    let mut book: Vec<u8> = (0..=255u8).collect();
    let mut noise = vec![0u8; 8 * 1024];
    rng.fill(&mut noise[..]);
    book.extend_from_slice(&noise);

    let mut input = vec![0u8; 4 * 1024];
    rng.fill(&mut input[..]);

    let opts = EncodeOptions {
        window_size: 512,
        input_chunk_size: 256,
        ..Default::default()
    };
    let codes = encode(&book, &input, &opts).unwrap();
    assert_eq!(codes.len(), 4 * input.len());

    let output = decode(
        &book,
        &codes,
        &DecodeOptions {
            code_chunk_size: 512,
            output_chunk_size: 128,
        },
    );
    assert_eq!(output, input);
}
