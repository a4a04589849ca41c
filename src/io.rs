// File-level helpers for mapping and extracting.
//
// Provides `encode_file()` and `decode_file()` convenience functions that
// wrap the session drivers with proper buffered I/O. Optionally computes
// streaming SHA-256 checksums (feature-gated behind `file-io`).

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
#[cfg(feature = "file-io")]
use std::io::Read;
use std::path::Path;

use thiserror::Error;

#[cfg(feature = "file-io")]
use sha2::Digest;

use crate::codec::OFFSET_WIDTH;
use crate::codec::decoder::{DecodeError, DecodeOptions};
use crate::codec::encoder::{EncodeError, EncodeOptions};
use crate::engine;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `encode_file()`.
#[derive(Debug, Clone)]
pub struct EncodeFileStats {
    /// Book (corpus) file size in bytes.
    pub corpus_size: u64,
    /// Input file size in bytes.
    pub input_size: u64,
    /// Code output size in bytes (always 4x the input size).
    pub code_size: u64,
    /// Offset codes written.
    pub codes_written: u64,
    /// Corpus window loads, including wraparound reloads.
    pub windows_loaded: u64,
    /// SHA-256 of the input file (if the `file-io` feature is enabled).
    pub input_sha256: Option<[u8; 32]>,
    /// SHA-256 of the code stream (if the `file-io` feature is enabled).
    pub code_sha256: Option<[u8; 32]>,
}

/// Statistics returned by `decode_file()`.
#[derive(Debug, Clone)]
pub struct DecodeFileStats {
    /// Book (corpus) file size in bytes.
    pub corpus_size: u64,
    /// Code file size in bytes.
    pub code_size: u64,
    /// Reconstructed output size in bytes.
    pub output_size: u64,
    /// SHA-256 of the reconstructed output (if the `file-io` feature is
    /// enabled).
    pub output_sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file-level operations.
#[derive(Debug, Error)]
pub enum FileError {
    /// I/O error (file open, read, write).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Offset mapping error.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),
    /// Offset resolution error.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

// ---------------------------------------------------------------------------
// Default buffer size
// ---------------------------------------------------------------------------

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// encode_file
// ---------------------------------------------------------------------------

/// Map an input file against a book file, writing the code stream to
/// `code_path`.
///
/// The book is scanned through bounded windows; the input is streamed
/// through a `BufReader`; the code output uses a `BufWriter`. When the
/// `file-io` feature is enabled, SHA-256 checksums of the input and of the
/// code stream are computed incrementally as data flows through.
pub fn encode_file(
    corpus_path: &Path,
    input_path: &Path,
    code_path: &Path,
    opts: &EncodeOptions,
) -> Result<EncodeFileStats, FileError> {
    let corpus_file = File::open(corpus_path)?;
    let corpus_size = corpus_file.metadata()?.len();

    let input_file = File::open(input_path)?;
    let input_size = input_file.metadata()?.len();
    let input_reader = BufReader::with_capacity(BUF_SIZE, input_file);

    let code_file = File::create(code_path)?;
    let mut code_writer = BufWriter::with_capacity(BUF_SIZE, code_file);

    #[cfg(feature = "file-io")]
    let (summary, input_sha256, code_sha256) = {
        let mut input_hasher = sha2::Sha256::new();
        let mut code_hasher = sha2::Sha256::new();
        let summary = {
            let mut hashing_reader = HashingReader {
                inner: input_reader,
                hasher: &mut input_hasher,
            };
            let mut hashing_writer = HashingWriter {
                inner: &mut code_writer,
                hasher: &mut code_hasher,
            };
            engine::run_encode(corpus_file, &mut hashing_reader, &mut hashing_writer, opts)?
        };
        (
            summary,
            Some(input_hasher.finalize().into()),
            Some(code_hasher.finalize().into()),
        )
    };

    #[cfg(not(feature = "file-io"))]
    let (summary, input_sha256, code_sha256) = {
        let mut input_reader = input_reader;
        let summary = engine::run_encode(corpus_file, &mut input_reader, &mut code_writer, opts)?;
        (summary, None, None)
    };

    code_writer.flush()?;

    Ok(EncodeFileStats {
        corpus_size,
        input_size,
        code_size: summary.codes_written * OFFSET_WIDTH as u64,
        codes_written: summary.codes_written,
        windows_loaded: summary.windows_loaded,
        input_sha256,
        code_sha256,
    })
}

// ---------------------------------------------------------------------------
// decode_file
// ---------------------------------------------------------------------------

/// Extract the original file from a code stream using a book file,
/// writing to `output_path`.
///
/// The book must be seekable (it is opened as a plain file here, so it
/// is). The code stream is streamed via `BufReader`; the output uses a
/// `BufWriter`. When the `file-io` feature is enabled, a SHA-256 checksum
/// of the output is computed incrementally.
pub fn decode_file(
    corpus_path: &Path,
    code_path: &Path,
    output_path: &Path,
    opts: &DecodeOptions,
) -> Result<DecodeFileStats, FileError> {
    let corpus_file = File::open(corpus_path)?;
    let corpus_size = corpus_file.metadata()?.len();

    let code_file = File::open(code_path)?;
    let code_size = code_file.metadata()?.len();
    let code_reader = BufReader::with_capacity(BUF_SIZE, code_file);

    let output_file = File::create(output_path)?;
    let mut output_writer = BufWriter::with_capacity(opts.output_chunk_size.max(1), output_file);

    #[cfg(feature = "file-io")]
    let mut output_hasher = sha2::Sha256::new();

    #[cfg(feature = "file-io")]
    let summary = {
        let mut hashing_writer = HashingWriter {
            inner: &mut output_writer,
            hasher: &mut output_hasher,
        };
        engine::run_decode(corpus_file, code_reader, &mut hashing_writer, opts)?
    };

    #[cfg(not(feature = "file-io"))]
    let summary = engine::run_decode(corpus_file, code_reader, &mut output_writer, opts)?;

    output_writer.flush()?;

    #[cfg(feature = "file-io")]
    let output_sha256 = Some(output_hasher.finalize().into());
    #[cfg(not(feature = "file-io"))]
    let output_sha256: Option<[u8; 32]> = None;

    Ok(DecodeFileStats {
        corpus_size,
        code_size,
        output_size: summary.output_bytes,
        output_sha256,
    })
}

// ---------------------------------------------------------------------------
// Hashing adapters (used with file-io feature)
// ---------------------------------------------------------------------------

#[cfg(feature = "file-io")]
struct HashingReader<'a, R: Read> {
    inner: R,
    hasher: &'a mut sha2::Sha256,
}

#[cfg(feature = "file-io")]
impl<R: Read> Read for HashingReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}

#[cfg(feature = "file-io")]
struct HashingWriter<'a, W: Write> {
    inner: &'a mut W,
    hasher: &'a mut sha2::Sha256,
}

#[cfg(feature = "file-io")]
impl<W: Write> Write for HashingWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
