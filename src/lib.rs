//! Bookcoder: a digital book cipher.
//!
//! Each byte of an input stream is mapped to an offset in a reference
//! "book" file where the same byte value occurs; the offsets become the
//! book code. Extraction seeks to each coded offset in the book and copies
//! the byte back out. Book and input may both be arbitrarily large: the
//! encoder scans the book through bounded windows and the decoder resolves
//! codes chunk by chunk, so memory use is set by the configured buffer
//! sizes alone.
//!
//! The code stream is a raw sequence of 4-byte little-endian offsets, one
//! per input byte; there is no header, length prefix, or checksum. Offsets
//! address at most the first 2^32 bytes of the book.
//!
//! The crate provides:
//! - The streaming offset codec (`codec`)
//! - Windowed and random-access corpus reads (`corpus`)
//! - One-shot session drivers over open handles (`engine`)
//! - File-oriented helpers with statistics (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! use std::io::Cursor;
//! use bookcoder::codec::decoder::DecodeOptions;
//! use bookcoder::codec::encoder::EncodeOptions;
//! use bookcoder::engine;
//!
//! let book = b"the quick brown fox jumps over the lazy dog";
//!
//! let mut codes = Vec::new();
//! engine::run_encode(Cursor::new(&book[..]), &b"quartz"[..], &mut codes,
//!     &EncodeOptions::default()).unwrap();
//!
//! let mut output = Vec::new();
//! engine::run_decode(Cursor::new(&book[..]), &codes[..], &mut output,
//!     &DecodeOptions::default()).unwrap();
//! assert_eq!(output, b"quartz");
//! ```

pub mod codec;
pub mod corpus;
pub mod engine;
pub mod io;
pub mod mem;

#[cfg(feature = "cli")]
pub mod cli;
