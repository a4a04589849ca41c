// Offset codec: the mapping (encode) and extraction (decode) halves of the
// book cipher, plus the primitives shared between them.

use std::io::{self, Read};

pub mod decoder;
pub mod digest;
pub mod encoder;

/// A position within the corpus, as carried by the code stream.
pub type Offset = u32;

/// Serialized width of one offset code in bytes.
///
/// Every input byte becomes exactly one code, so the encoded stream is
/// always `OFFSET_WIDTH` times the size of the input. Codes are written
/// little-endian regardless of host byte order.
pub const OFFSET_WIDTH: usize = 4;

/// Default window and chunk size (1 MiB).
pub const DEFAULT_BUFFER_SIZE: usize = 1 << 20;

/// Read until `buf` is full or the reader reaches end of input.
///
/// Unlike `read_exact`, a short stream is not an error; the filled length
/// is returned instead.
pub(crate) fn read_fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_fill_drains_short_reader() {
        let mut reader: &[u8] = b"abc";
        let mut buf = [0u8; 8];
        assert_eq!(read_fill(&mut reader, &mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"abc");
    }

    #[test]
    fn read_fill_stops_at_buffer_capacity() {
        let mut reader: &[u8] = b"abcdef";
        let mut buf = [0u8; 4];
        assert_eq!(read_fill(&mut reader, &mut buf).unwrap(), 4);
        assert_eq!(&buf, b"abcd");
        assert_eq!(reader, b"ef");
    }
}
