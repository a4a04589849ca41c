// Offset encoder: maps input bytes to corpus offsets.
//
// OffsetEncoder provides a streaming push API:
//   - Input bytes are fed in chunks via write_input()
//   - Corpus windows are loaded on demand and wrap back to the start
//   - Each accepted offset is written immediately as 4 LE bytes
//   - Constant memory: one corpus window plus the caller's input chunk

use std::io::{Read, Seek, Write};

use log::{debug, trace};
use thiserror::Error;

use super::digest::OffsetDigest;
use super::{DEFAULT_BUFFER_SIZE, Offset};
use crate::corpus::{Corpus, CorpusWindow};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for the streaming offset encoder.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// Corpus window size in bytes.
    pub window_size: usize,
    /// Input chunk size in bytes, used by the session drivers.
    pub input_chunk_size: usize,
    /// Accept an offset even when it repeats the last one used for the
    /// same byte value.
    pub allow_duplicates: bool,
    /// Restart the corpus scan from offset 0 at every window end instead
    /// of advancing. Keeps emitted offsets small (and the code stream
    /// compressible) at the cost of only ever scanning the first window.
    pub reset_at_window_end: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_BUFFER_SIZE,
            input_chunk_size: DEFAULT_BUFFER_SIZE,
            allow_duplicates: false,
            reset_at_window_end: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An input byte value never occurs in the scanned corpus range.
    #[error(
        "byte value {value:#04x} not found in the corpus; \
         not enough entropy to map the input"
    )]
    InsufficientEntropy { value: u8 },

    /// Requested session buffers exceed available system memory.
    #[error("requested buffers ({requested} bytes) exceed available memory ({available} bytes)")]
    MemoryLimit { requested: u64, available: u64 },
}

// ---------------------------------------------------------------------------
// OffsetEncoder
// ---------------------------------------------------------------------------

/// Consecutive soft repeats tolerated before a repeated offset is accepted
/// anyway. Breaks livelock when the scanned range holds a single
/// occurrence of a value.
const SOFT_REPEAT_LIMIT: u8 = 2;

/// Streaming offset encoder.
///
/// For each input byte, scans the corpus window for a matching byte value
/// and emits its absolute offset as one 4-byte little-endian code. With
/// duplicates disallowed, a candidate equal to the last offset used for
/// that value is skipped as a "soft repeat" until the limit fires.
///
/// # Example
/// ```no_run
/// use std::io::Cursor;
/// use bookcoder::codec::encoder::{EncodeOptions, OffsetEncoder};
/// use bookcoder::corpus::Corpus;
///
/// let corpus = Corpus::new(Cursor::new(b"abcabc".to_vec())).unwrap();
/// let mut codes = Vec::new();
/// let mut enc = OffsetEncoder::new(corpus, &mut codes, EncodeOptions::default());
/// enc.write_input(b"aa").unwrap();
/// enc.finish().unwrap();
/// ```
pub struct OffsetEncoder<C, W> {
    corpus: Corpus<C>,
    output: W,
    opts: EncodeOptions,
    digest: OffsetDigest,
    window: CorpusWindow,
    /// Consecutive soft repeats while mapping the current byte.
    soft_repeats: u8,
    codes_written: u64,
    windows_loaded: u64,
}

impl<C: Read + Seek, W: Write> OffsetEncoder<C, W> {
    /// Create a new streaming encoder. No corpus window is loaded until
    /// the first input byte arrives.
    pub fn new(corpus: Corpus<C>, output: W, mut opts: EncodeOptions) -> Self {
        opts.window_size = opts.window_size.max(1);
        Self {
            corpus,
            output,
            opts,
            digest: OffsetDigest::new(),
            window: CorpusWindow::new(),
            soft_repeats: 0,
            codes_written: 0,
            windows_loaded: 0,
        }
    }

    /// Feed input bytes to the encoder.
    ///
    /// Every byte is mapped and its code written before the call returns;
    /// nothing is buffered between calls.
    pub fn write_input(&mut self, data: &[u8]) -> Result<(), EncodeError> {
        for &value in data {
            let offset = self.map_byte(value)?;
            self.output.write_all(&offset.to_le_bytes())?;
            self.codes_written += 1;
            trace!("mapped byte {value:#04x} to offset {offset}");
        }
        Ok(())
    }

    /// Flush the output and return it with the number of codes written.
    pub fn finish(mut self) -> Result<(W, u64), EncodeError> {
        self.output.flush()?;
        Ok((self.output, self.codes_written))
    }

    /// Codes emitted so far.
    pub fn codes_written(&self) -> u64 {
        self.codes_written
    }

    /// Corpus window loads so far (including wraparound reloads).
    pub fn windows_loaded(&self) -> u64 {
        self.windows_loaded
    }

    /// Locate an acceptable corpus offset for `value`.
    ///
    /// One control loop: scan the current window, reload on exhaustion,
    /// wrap at the addressable end. A second restart with the digest
    /// entry still unset means a complete pass found nothing, which is
    /// the insufficient-entropy condition.
    fn map_byte(&mut self, value: u8) -> Result<Offset, EncodeError> {
        self.soft_repeats = 0;
        let mut wrapped = false;
        loop {
            if let Some(offset) = self.scan_window(value) {
                self.digest.record(value, offset);
                return Ok(offset);
            }
            self.reload_window(value, &mut wrapped)?;
        }
    }

    /// Scan the current window for `value`, applying the repeat policy.
    ///
    /// Returns the accepted offset, or `None` once the window is
    /// exhausted. The cursor is left on the accepted byte so a run of
    /// identical input bytes can re-use the offset where policy allows.
    fn scan_window(&mut self, value: u8) -> Option<Offset> {
        while let Some(at) = self.window.find_next(value) {
            // Window loads are capped to the code-addressable range.
            let candidate = at as Offset;
            if self.opts.allow_duplicates
                || self.soft_repeats >= SOFT_REPEAT_LIMIT
                || self.digest.last_offset(value) != Some(candidate)
            {
                self.window.hold_position();
                return Some(candidate);
            }
            // Same offset as last time for this value: soft repeat.
            self.soft_repeats += 1;
        }
        None
    }

    /// Replace the exhausted window with the next one, wrapping to the
    /// corpus start at the addressable end or under the reset policy.
    fn reload_window(&mut self, value: u8, wrapped: &mut bool) -> Result<(), EncodeError> {
        if self.corpus.remaining() == 0 || self.opts.reset_at_window_end {
            if *wrapped && self.digest.last_offset(value).is_none() {
                return Err(EncodeError::InsufficientEntropy { value });
            }
            *wrapped = true;
            self.corpus.rewind_to_start()?;
        }
        let loaded = self
            .corpus
            .load_window(&mut self.window, self.opts.window_size)?;
        self.windows_loaded += 1;
        debug!(
            "loaded corpus window at offset {} ({loaded} bytes)",
            self.window.base()
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
