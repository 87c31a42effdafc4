/***************************************************************************************************
 * Copyright (c) 2024 Common Access Token Contributors
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy of this software
 * and associated documentation files (the "Software"), to deal in the Software without
 * restriction, including without limitation the rights to use, copy, modify, merge, publish,
 * distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all copies or
 * substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING
 * BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
 * NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
 * DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
 **************************************************************************************************/
//! An owned, heap-backed CBOR encoder.
//!
//! Unlike a zero-copy encoder over a fixed caller-supplied buffer, `Encoder` owns a growable
//! `Vec<u8>` and hands the caller fully-owned bytes from [`Encoder::finish`]. Array and map
//! lengths must be known up front and are written immediately — there is no post-hoc length
//! fixup pass.

use super::constants::*;

/// Push-style CBOR encoder over an owned byte buffer.
#[derive(Debug, Default)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    /// Construct a new, empty encoder.
    pub fn new() -> Self {
        Encoder { buf: Vec::new() }
    }

    /// Construct a new encoder with pre-reserved capacity.
    pub fn with_capacity(cap: usize) -> Self {
        Encoder {
            buf: Vec::with_capacity(cap),
        }
    }

    /// Consume the encoder, returning the finished, owned byte sequence.
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Write a major-type/length header using the minimal-width encoding for `val`.
    fn push_header(&mut self, major: u8, val: u64) {
        if val <= PAYLOAD_DIRECT as u64 {
            self.buf.push(major | val as u8);
        } else if val <= u8::MAX as u64 {
            self.buf.push(major | PAYLOAD_ONE_BYTE);
            self.buf.push(val as u8);
        } else if val <= u16::MAX as u64 {
            self.buf.push(major | PAYLOAD_TWO_BYTES);
            self.buf.extend_from_slice(&(val as u16).to_be_bytes());
        } else if val <= u32::MAX as u64 {
            self.buf.push(major | PAYLOAD_FOUR_BYTES);
            self.buf.extend_from_slice(&(val as u32).to_be_bytes());
        } else {
            self.buf.push(major | PAYLOAD_EIGHT_BYTES);
            self.buf.extend_from_slice(&val.to_be_bytes());
        }
    }

    /// Push an unsigned integer (major type 0).
    pub fn push_uint(&mut self, val: u64) -> &mut Self {
        self.push_header(MT_UINT, val);
        self
    }

    /// Push a signed integer, selecting major type 0 or 1 per RFC 8949 §3.1.
    pub fn push_int(&mut self, val: i64) -> &mut Self {
        if val >= 0 {
            self.push_uint(val as u64)
        } else {
            let n = (-1i128 - val as i128) as u64;
            self.push_header(MT_NINT, n);
            self
        }
    }

    /// Push a definite-length byte string.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.push_header(MT_BSTR, bytes.len() as u64);
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Push a definite-length UTF-8 text string.
    pub fn push_text(&mut self, text: &str) -> &mut Self {
        self.push_header(MT_TSTR, text.len() as u64);
        self.buf.extend_from_slice(text.as_bytes());
        self
    }

    /// Begin a definite-length array of `len` items. The caller must push exactly `len` items.
    pub fn push_array_header(&mut self, len: usize) -> &mut Self {
        self.push_header(MT_ARRAY, len as u64);
        self
    }

    /// Begin a definite-length map of `len` key/value pairs. The caller must push exactly
    /// `2 * len` items (key, value, key, value, ...).
    pub fn push_map_header(&mut self, len: usize) -> &mut Self {
        self.push_header(MT_MAP, len as u64);
        self
    }

    /// Push a tag header; the tagged item must follow immediately.
    pub fn push_tag(&mut self, tag: u64) -> &mut Self {
        self.push_header(MT_TAG, tag);
        self
    }

    /// Push a boolean simple value.
    pub fn push_bool(&mut self, val: bool) -> &mut Self {
        self.buf
            .push(MT_SIMPLE | if val { SIMPLE_TRUE } else { SIMPLE_FALSE });
        self
    }

    /// Push the `null` simple value.
    pub fn push_null(&mut self) -> &mut Self {
        self.buf.push(MT_SIMPLE | SIMPLE_NULL);
        self
    }

    /// Push the `undefined` simple value.
    pub fn push_undefined(&mut self) -> &mut Self {
        self.buf.push(MT_SIMPLE | SIMPLE_UNDEFINED);
        self
    }

    /// Begin an indefinite-length array; the caller must follow with exactly the array's
    /// items and then [`Encoder::push_break`].
    pub fn push_array_header_indefinite(&mut self) -> &mut Self {
        self.buf.push(MT_ARRAY | PAYLOAD_INDEFINITE);
        self
    }

    /// Begin an indefinite-length map; the caller must follow with key/value pairs and then
    /// [`Encoder::push_break`].
    pub fn push_map_header_indefinite(&mut self) -> &mut Self {
        self.buf.push(MT_MAP | PAYLOAD_INDEFINITE);
        self
    }

    /// Close an indefinite-length array, map, byte string or text string.
    pub fn push_break(&mut self) -> &mut Self {
        self.buf.push(BREAK);
        self
    }

    /// Append raw, already-encoded CBOR bytes verbatim (used when splicing a nested,
    /// previously-encoded claim value).
    pub fn push_raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }
}

impl Encoder {
    /// Push a single-precision float (major type 7, AI 26). No automatic narrowing is
    /// performed: the caller chooses the width.
    pub fn push_f32(&mut self, val: f32) -> &mut Self {
        self.buf.push(MT_SIMPLE | PAYLOAD_FOUR_BYTES);
        self.buf.extend_from_slice(&val.to_be_bytes());
        self
    }

    /// Push a double-precision float (major type 7, AI 27).
    pub fn push_f64(&mut self, val: f64) -> &mut Self {
        self.buf.push(MT_SIMPLE | PAYLOAD_EIGHT_BYTES);
        self.buf.extend_from_slice(&val.to_be_bytes());
        self
    }
}

#[cfg(feature = "float")]
impl Encoder {
    /// Push a half-precision float (major type 7, AI 25). Requires the `float` feature.
    pub fn push_f16(&mut self, val: half::f16) -> &mut Self {
        self.buf.push(MT_SIMPLE | PAYLOAD_TWO_BYTES);
        self.buf.extend_from_slice(&val.to_be_bytes());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cbor::decoder::Decoder;

    #[test]
    fn minimal_width_selection() {
        let mut e = Encoder::new();
        e.push_uint(0);
        e.push_uint(23);
        e.push_uint(24);
        e.push_uint(255);
        e.push_uint(256);
        e.push_uint(65535);
        e.push_uint(65536);
        let bytes = e.finish();
        // 0 -> 1 byte, 23 -> 1 byte, 24 -> 2 bytes, 255 -> 2 bytes,
        // 256 -> 3 bytes, 65535 -> 3 bytes, 65536 -> 5 bytes
        assert_eq!(bytes.len(), 1 + 1 + 2 + 2 + 3 + 3 + 5);
    }

    #[test]
    fn negative_int_round_trips() {
        let mut e = Encoder::new();
        e.push_int(-1);
        e.push_int(-100);
        e.push_int(-1000);
        let bytes = e.finish();
        let mut d = Decoder::new(&bytes);
        assert_eq!(d.read_int().unwrap(), -1);
        assert_eq!(d.read_int().unwrap(), -100);
        assert_eq!(d.read_int().unwrap(), -1000);
    }

    #[test]
    fn bytes_and_text_round_trip() {
        let mut e = Encoder::new();
        e.push_bytes(b"hello");
        e.push_text("world");
        let bytes = e.finish();
        let mut d = Decoder::new(&bytes);
        assert_eq!(d.read_bytes().unwrap(), b"hello");
        assert_eq!(d.read_text().unwrap(), "world");
    }
}
