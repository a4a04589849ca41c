// Offset decoder: turns a code stream back into the original bytes.
//
// Codes are read in bounded chunks of whole 4-byte units; each offset is
// range-checked and resolved with a random-access corpus read; decoded
// bytes are flushed at chunk boundaries. Nothing scales with stream size.

use std::io::{Read, Seek, Write};

use log::{debug, trace};
use thiserror::Error;

use super::{DEFAULT_BUFFER_SIZE, OFFSET_WIDTH, Offset, read_fill};
use crate::corpus::Corpus;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for the streaming offset decoder.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Code-stream chunk size in bytes; rounded down to whole codes.
    pub code_chunk_size: usize,
    /// Decoded-output buffer size in bytes, used by the session drivers
    /// to size the destination writer.
    pub output_chunk_size: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            code_chunk_size: DEFAULT_BUFFER_SIZE,
            output_chunk_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The code stream length is not a whole multiple of the code width.
    /// Everything before the partial trailing unit has been decoded.
    #[error("code stream ends mid-code: {trailing} trailing bytes of a 4-byte code")]
    TruncatedCodeStream { trailing: usize },

    /// A code referenced a position past the end of the corpus.
    #[error("offset {offset} is out of range for a corpus of {corpus_len} bytes")]
    OffsetOutOfRange { offset: Offset, corpus_len: u64 },

    /// Requested session buffers exceed available system memory.
    #[error("requested buffers ({requested} bytes) exceed available memory ({available} bytes)")]
    MemoryLimit { requested: u64, available: u64 },
}

// ---------------------------------------------------------------------------
// OffsetDecoder
// ---------------------------------------------------------------------------

/// Streaming offset decoder.
///
/// Reads the code stream chunk by chunk, resolves each offset against the
/// corpus, and writes the reconstructed bytes to any `impl Write`.
pub struct OffsetDecoder<C, R> {
    corpus: Corpus<C>,
    codes: R,
    opts: DecodeOptions,
    bytes_decoded: u64,
}

impl<C: Read + Seek, R: Read> OffsetDecoder<C, R> {
    pub fn new(corpus: Corpus<C>, codes: R, mut opts: DecodeOptions) -> Self {
        opts.code_chunk_size = opts.code_chunk_size.max(OFFSET_WIDTH);
        Self {
            corpus,
            codes,
            opts,
            bytes_decoded: 0,
        }
    }

    /// Decode the entire code stream into `writer`.
    ///
    /// Returns the number of bytes reconstructed. Decoded bytes are
    /// flushed to the writer at every chunk boundary, so on error the
    /// destination holds exactly the chunks completed so far.
    pub fn decode_to<W: Write>(&mut self, writer: &mut W) -> Result<u64, DecodeError> {
        let chunk_size = self.opts.code_chunk_size / OFFSET_WIDTH * OFFSET_WIDTH;
        let mut code_buf = vec![0u8; chunk_size];
        let mut out_buf: Vec<u8> = Vec::with_capacity(chunk_size / OFFSET_WIDTH);
        let corpus_len = self.corpus.len();

        loop {
            let filled = read_fill(&mut self.codes, &mut code_buf)?;
            if filled == 0 {
                break;
            }
            let whole = filled - filled % OFFSET_WIDTH;

            out_buf.clear();
            for unit in code_buf[..whole].chunks_exact(OFFSET_WIDTH) {
                let offset = Offset::from_le_bytes([unit[0], unit[1], unit[2], unit[3]]);
                if u64::from(offset) >= corpus_len {
                    return Err(DecodeError::OffsetOutOfRange { offset, corpus_len });
                }
                let byte = self.corpus.read_byte_at(u64::from(offset))?;
                trace!("extracted byte {byte:#04x} from offset {offset}");
                out_buf.push(byte);
            }
            writer.write_all(&out_buf).map_err(DecodeError::Io)?;
            self.bytes_decoded += out_buf.len() as u64;
            debug!("decoded chunk of {} codes", whole / OFFSET_WIDTH);

            if filled % OFFSET_WIDTH != 0 {
                return Err(DecodeError::TruncatedCodeStream {
                    trailing: filled % OFFSET_WIDTH,
                });
            }
            if filled < chunk_size {
                break; // end of the code stream
            }
        }

        Ok(self.bytes_decoded)
    }

    /// Bytes reconstructed so far.
    pub fn bytes_decoded(&self) -> u64 {
        self.bytes_decoded
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
