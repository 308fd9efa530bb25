//! `Content-Length` JSON-RPC framing over a blocking reader/writer pair
//! (spec.md §4.10, §6 "LSP wire"). Headers are case-insensitive and any
//! header besides `Content-Length` is ignored; the header block ends at
//! the first blank line, which may be `\r\n\r\n` or a bare `\n\n`.

use std::io::{self, BufRead, Write};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("missing Content-Length header")]
    MissingContentLength,
    #[error("malformed Content-Length header: {0}")]
    BadContentLength(String),
}

/// Write one JSON-RPC frame: header block, blank line, then the raw body
/// bytes. `body` must already be a complete, valid JSON document.
pub fn write_message<W: Write>(out: &mut W, body: &[u8]) -> Result<(), TransportError> {
    write!(out, "Content-Length: {}\r\n\r\n", body.len())?;
    out.write_all(body)?;
    out.flush()?;
    Ok(())
}

/// Read one JSON-RPC frame. Returns `Ok(None)` on clean EOF before any
/// header bytes arrive (the server closed the pipe); any other truncation
/// surfaces as an `Io` error.
pub fn read_message<R: BufRead>(input: &mut R) -> Result<Option<Vec<u8>>, TransportError> {
    let mut content_length: Option<usize> = None;
    let mut saw_any_header_line = false;
    loop {
        let mut line = String::new();
        let n = input.read_line(&mut line)?;
        if n == 0 {
            if saw_any_header_line {
                return Err(TransportError::Io(io::Error::from(io::ErrorKind::UnexpectedEof)));
            }
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            break;
        }
        saw_any_header_line = true;
        if let Some((name, value)) = trimmed.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                let value = value.trim();
                content_length =
                    Some(value.parse().map_err(|_| TransportError::BadContentLength(value.to_string()))?);
            }
        }
    }
    let len = content_length.ok_or(TransportError::MissingContentLength)?;
    let mut body = vec![0u8; len];
    input.read_exact(&mut body)?;
    Ok(Some(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    #[test]
    fn round_trips_a_frame() {
        let mut buf = Vec::new();
        write_message(&mut buf, br#"{"jsonrpc":"2.0"}"#).unwrap();
        let mut reader = BufReader::new(buf.as_slice());
        let body = read_message(&mut reader).unwrap().unwrap();
        assert_eq!(body, br#"{"jsonrpc":"2.0"}"#);
    }

    #[test]
    fn accepts_bare_lf_headers_and_ignores_unknown_ones() {
        let frame = b"X-Trace-Id: abc\nContent-Length: 2\n\nhi";
        let mut reader = BufReader::new(&frame[..]);
        let body = read_message(&mut reader).unwrap().unwrap();
        assert_eq!(body, b"hi");
    }

    #[test]
    fn header_name_matching_is_case_insensitive() {
        let frame = b"content-LENGTH: 4\r\n\r\ntest";
        let mut reader = BufReader::new(&frame[..]);
        let body = read_message(&mut reader).unwrap().unwrap();
        assert_eq!(body, b"test");
    }

    #[test]
    fn clean_eof_before_any_bytes_returns_none() {
        let mut reader = BufReader::new(&b""[..]);
        assert!(read_message(&mut reader).unwrap().is_none());
    }

    #[test]
    fn missing_content_length_is_an_error() {
        let frame = b"X-Foo: bar\r\n\r\n";
        let mut reader = BufReader::new(&frame[..]);
        assert!(matches!(read_message(&mut reader), Err(TransportError::MissingContentLength)));
    }
}
