// Corpus access: sequential windowed reads for the encoder and
// random-access single-byte reads for the decoder.
//
// The corpus is never held in memory. The encoder scans it through a
// bounded window reloaded on demand; decode lookups seek directly to the
// coded offset. Any read or seek error propagates immediately.

use std::io::{self, Read, Seek, SeekFrom};

use crate::codec::{Offset, read_fill};

/// One past the last corpus position representable in an offset code.
///
/// Larger corpora are accepted, but the sequential scan stops at this
/// boundary; bytes past it can never be referenced by a 4-byte code.
const ADDRESSABLE_END: u64 = Offset::MAX as u64 + 1;

// ---------------------------------------------------------------------------
// Corpus
// ---------------------------------------------------------------------------

/// A read-only, seekable reference corpus of known length.
pub struct Corpus<F> {
    handle: F,
    len: u64,
    /// Absolute offset of the next sequential window load.
    read_pos: u64,
}

impl<F: Read + Seek> Corpus<F> {
    /// Wrap a seekable handle, measuring its total length.
    pub fn new(mut handle: F) -> io::Result<Self> {
        let len = handle.seek(SeekFrom::End(0))?;
        handle.seek(SeekFrom::Start(0))?;
        Ok(Self {
            handle,
            len,
            read_pos: 0,
        })
    }

    /// Total corpus length in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Length reachable by the sequential scan (capped at the code range).
    pub fn addressable_len(&self) -> u64 {
        self.len.min(ADDRESSABLE_END)
    }

    /// Bytes between the sequential cursor and the addressable end.
    pub fn remaining(&self) -> u64 {
        self.addressable_len().saturating_sub(self.read_pos)
    }

    /// Fill `window` with up to `size` bytes from the sequential cursor.
    ///
    /// The window records its absolute base offset and resets its scan
    /// cursor. Returns the number of bytes loaded; short only at the
    /// addressable end of the corpus.
    pub fn load_window(&mut self, window: &mut CorpusWindow, size: usize) -> io::Result<usize> {
        let want = (size as u64).min(self.remaining()) as usize;
        window.base = self.read_pos;
        window.cursor = 0;
        window.buf.resize(want, 0);
        if want == 0 {
            return Ok(0);
        }

        // Random-access lookups share the handle, so reposition explicitly.
        self.handle.seek(SeekFrom::Start(self.read_pos))?;
        let got = read_fill(&mut self.handle, &mut window.buf)?;
        window.buf.truncate(got);
        self.read_pos += got as u64;
        Ok(got)
    }

    /// Reposition the sequential cursor to absolute offset 0.
    pub fn rewind_to_start(&mut self) -> io::Result<()> {
        self.handle.seek(SeekFrom::Start(0))?;
        self.read_pos = 0;
        Ok(())
    }

    /// Read the single byte at `offset`. Decoder lookup path.
    pub fn read_byte_at(&mut self, offset: u64) -> io::Result<u8> {
        self.handle.seek(SeekFrom::Start(offset))?;
        let mut byte = [0u8; 1];
        self.handle.read_exact(&mut byte)?;
        Ok(byte[0])
    }
}

// ---------------------------------------------------------------------------
// CorpusWindow
// ---------------------------------------------------------------------------

/// A bounded in-memory slice of the corpus.
///
/// `base` is the absolute corpus offset of the first buffered byte and
/// `cursor` the next position the scan will examine. An exhausted window
/// is reloaded in place by [`Corpus::load_window`].
#[derive(Debug, Default)]
pub struct CorpusWindow {
    base: u64,
    buf: Vec<u8>,
    cursor: usize,
}

impl CorpusWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absolute corpus offset of the first byte in the window.
    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Scan forward from the cursor for `value`.
    ///
    /// On a hit, returns the absolute corpus offset and leaves the cursor
    /// one past the match. On a miss, parks the cursor at the end.
    pub fn find_next(&mut self, value: u8) -> Option<u64> {
        match self.buf[self.cursor..].iter().position(|&b| b == value) {
            Some(rel) => {
                let at = self.cursor + rel;
                self.cursor = at + 1;
                Some(self.base + at as u64)
            }
            None => {
                self.cursor = self.buf.len();
                None
            }
        }
    }

    /// Move the cursor back onto the byte it just matched.
    ///
    /// The next scan then re-examines the accepted position, so a run of
    /// identical input bytes keeps resolving to the same offset while the
    /// repeat policy permits it.
    pub fn hold_position(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
