// Session drivers: one-shot encode/decode over opened handles.
//
// run_encode()/run_decode() own the memory-budget precondition and the
// chunked I/O loops; the codec structs own the per-byte algorithms. The
// handles are generic so sessions run identically over files, pipes (where
// seekability allows), and in-memory cursors in tests.

use std::io::{Read, Seek, Write};

use log::info;

use crate::codec::decoder::{DecodeError, DecodeOptions, OffsetDecoder};
use crate::codec::encoder::{EncodeError, EncodeOptions, OffsetEncoder};
use crate::codec::{OFFSET_WIDTH, read_fill};
use crate::corpus::Corpus;
use crate::mem;

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

/// Statistics returned by `run_encode()`.
#[derive(Debug, Clone)]
pub struct EncodeSummary {
    /// Input bytes consumed.
    pub input_bytes: u64,
    /// Offset codes written (one per input byte).
    pub codes_written: u64,
    /// Corpus window loads, including wraparound reloads.
    pub windows_loaded: u64,
}

/// Statistics returned by `run_decode()`.
#[derive(Debug, Clone)]
pub struct DecodeSummary {
    /// Code-stream bytes consumed (whole codes only).
    pub code_bytes: u64,
    /// Bytes reconstructed.
    pub output_bytes: u64,
}

// ---------------------------------------------------------------------------
// run_encode
// ---------------------------------------------------------------------------

/// Map every byte of `input` to a corpus offset, writing the code stream
/// to `output`.
///
/// The corpus is scanned through bounded windows; the input is consumed in
/// `input_chunk_size` chunks. Fails before allocating anything if the two
/// buffers together exceed available memory.
pub fn run_encode<C, I, W>(
    corpus: C,
    mut input: I,
    output: &mut W,
    opts: &EncodeOptions,
) -> Result<EncodeSummary, EncodeError>
where
    C: Read + Seek,
    I: Read,
    W: Write,
{
    let chunk_size = opts.input_chunk_size.max(1);
    let requested = opts.window_size as u64 + chunk_size as u64;
    if let Some(available) = mem::budget_exceeded(requested) {
        return Err(EncodeError::MemoryLimit {
            requested,
            available,
        });
    }

    let corpus = Corpus::new(corpus)?;
    let mut encoder = OffsetEncoder::new(corpus, output, opts.clone());

    let mut chunk = vec![0u8; chunk_size];
    let mut input_bytes = 0u64;
    loop {
        let n = read_fill(&mut input, &mut chunk)?;
        if n == 0 {
            break;
        }
        encoder.write_input(&chunk[..n])?;
        input_bytes += n as u64;
    }

    let windows_loaded = encoder.windows_loaded();
    let (_, codes_written) = encoder.finish()?;

    info!(
        "mapped {input_bytes} input bytes to {codes_written} codes \
         across {windows_loaded} window loads"
    );
    Ok(EncodeSummary {
        input_bytes,
        codes_written,
        windows_loaded,
    })
}

// ---------------------------------------------------------------------------
// run_decode
// ---------------------------------------------------------------------------

/// Resolve every code of `codes` against the corpus, writing the
/// reconstructed bytes to `output`.
///
/// The corpus handle must be seekable; the code stream may be any reader.
pub fn run_decode<C, R, W>(
    corpus: C,
    codes: R,
    output: &mut W,
    opts: &DecodeOptions,
) -> Result<DecodeSummary, DecodeError>
where
    C: Read + Seek,
    R: Read,
    W: Write,
{
    let requested = opts.code_chunk_size as u64 + opts.output_chunk_size as u64;
    if let Some(available) = mem::budget_exceeded(requested) {
        return Err(DecodeError::MemoryLimit {
            requested,
            available,
        });
    }

    let corpus = Corpus::new(corpus)?;
    let mut decoder = OffsetDecoder::new(corpus, codes, opts.clone());
    let output_bytes = decoder.decode_to(output)?;
    output.flush().map_err(DecodeError::Io)?;

    let code_bytes = output_bytes * OFFSET_WIDTH as u64;
    info!("extracted {output_bytes} bytes from {code_bytes} code bytes");
    Ok(DecodeSummary {
        code_bytes,
        output_bytes,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
