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
//! An owned-output, cursor-based CBOR decoder with full indefinite-length support.
//!
//! The decoder walks a borrowed `&[u8]` with a cursor, but every value it hands back (byte
//! strings, text strings) is copied into an owned `Vec<u8>`/`String` rather than borrowed from
//! the input, so a [`crate::claims::Claims`] tree can outlive the encoded buffer it was parsed
//! from.

use super::constants::*;
use super::error::CborError;

/// Cursor-based CBOR decoder.
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

/// The length of a definite-length container, or `None` for an indefinite-length one.
pub type Length = Option<usize>;

impl<'a> Decoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Decoder { buf, pos: 0 }
    }

    /// Current cursor offset into the input buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes remaining to be consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn peek_byte(&self) -> Result<u8, CborError> {
        self.buf.get(self.pos).copied().ok_or(CborError::EndOfBuffer)
    }

    /// Major type of the next item, without consuming it.
    pub fn peek_major_type(&self) -> Result<MajorType, CborError> {
        Ok(MajorType::from_initial_byte(self.peek_byte()?))
    }

    /// Additional-information field of the next item's initial byte, without consuming it.
    pub fn peek_additional_info(&self) -> Result<u8, CborError> {
        Ok(self.peek_byte()? & AI_MASK)
    }

    /// `true` if the next byte is the indefinite-length `break` stop code.
    pub fn is_break_code(&self) -> Result<bool, CborError> {
        Ok(self.peek_byte()? == BREAK)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CborError> {
        if self.pos + n > self.buf.len() {
            return Err(CborError::EndOfBuffer);
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn take_byte(&mut self) -> Result<u8, CborError> {
        let b = self.peek_byte()?;
        self.pos += 1;
        Ok(b)
    }

    /// Read a header (major type already known by the caller), returning either a definite
    /// length/value or `None` for an indefinite-length marker. Validates minimal-width encoding.
    fn read_header(&mut self, expected_major: u8) -> Result<Option<u64>, CborError> {
        let initial = self.take_byte()?;
        if initial & MT_MASK != expected_major {
            return Err(CborError::IncompatibleType("major type mismatch"));
        }
        let ai = initial & AI_MASK;
        match ai {
            0..=PAYLOAD_DIRECT => Ok(Some(ai as u64)),
            PAYLOAD_ONE_BYTE => {
                let v = self.take_byte()? as u64;
                if v <= PAYLOAD_DIRECT as u64 {
                    return Err(CborError::NotMinimal);
                }
                Ok(Some(v))
            }
            PAYLOAD_TWO_BYTES => {
                let bytes = self.take(2)?;
                let v = u16::from_be_bytes([bytes[0], bytes[1]]) as u64;
                if v <= u8::MAX as u64 {
                    return Err(CborError::NotMinimal);
                }
                Ok(Some(v))
            }
            PAYLOAD_FOUR_BYTES => {
                let bytes = self.take(4)?;
                let v = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as u64;
                if v <= u16::MAX as u64 {
                    return Err(CborError::NotMinimal);
                }
                Ok(Some(v))
            }
            PAYLOAD_EIGHT_BYTES => {
                let bytes = self.take(8)?;
                let mut arr = [0u8; 8];
                arr.copy_from_slice(bytes);
                let v = u64::from_be_bytes(arr);
                if v <= u32::MAX as u64 {
                    return Err(CborError::NotMinimal);
                }
                Ok(Some(v))
            }
            PAYLOAD_INDEFINITE => Ok(None),
            _ => Err(CborError::MalformedEncoding),
        }
    }

    /// Read an unsigned integer (major type 0).
    pub fn read_uint(&mut self) -> Result<u64, CborError> {
        self.read_header(MT_UINT)?
            .ok_or(CborError::MalformedEncoding)
    }

    /// Read a signed integer (major type 0 or 1).
    pub fn read_int(&mut self) -> Result<i64, CborError> {
        match self.peek_major_type()? {
            MajorType::UnsignedInt => {
                let v = self.read_uint()?;
                i64::try_from(v).map_err(|_| CborError::OutOfRange(v as i128))
            }
            MajorType::NegativeInt => {
                let n = self
                    .read_header(MT_NINT)?
                    .ok_or(CborError::MalformedEncoding)?;
                let val = -1i128 - n as i128;
                i64::try_from(val).map_err(|_| CborError::OutOfRange(val))
            }
            _ => Err(CborError::IncompatibleType("expected integer")),
        }
    }

    /// Read a definite or indefinite-length byte string, returning owned bytes.
    pub fn read_bytes(&mut self) -> Result<Vec<u8>, CborError> {
        match self.read_header(MT_BSTR)? {
            Some(len) => Ok(self.take(len as usize)?.to_vec()),
            None => {
                let mut out = Vec::new();
                loop {
                    if self.is_break_code()? {
                        self.take_byte()?;
                        break;
                    }
                    if self.peek_additional_info()? == PAYLOAD_INDEFINITE {
                        return Err(CborError::NestedIndefiniteChunk);
                    }
                    out.extend_from_slice(&self.read_bytes()?);
                }
                Ok(out)
            }
        }
    }

    /// Read a definite or indefinite-length UTF-8 text string, returning an owned `String`.
    pub fn read_text(&mut self) -> Result<String, CborError> {
        match self.read_header(MT_TSTR)? {
            Some(len) => {
                let raw = self.take(len as usize)?;
                String::from_utf8(raw.to_vec()).map_err(|_| CborError::Utf8Error)
            }
            None => {
                let mut out = String::new();
                loop {
                    if self.is_break_code()? {
                        self.take_byte()?;
                        break;
                    }
                    if self.peek_additional_info()? == PAYLOAD_INDEFINITE {
                        return Err(CborError::NestedIndefiniteChunk);
                    }
                    out.push_str(&self.read_text()?);
                }
                Ok(out)
            }
        }
    }

    /// Begin an array, returning its definite length or `None` for indefinite.
    pub fn begin_array(&mut self) -> Result<Length, CborError> {
        self.read_header(MT_ARRAY)
    }

    /// Begin a map, returning its definite pair count or `None` for indefinite.
    pub fn begin_map(&mut self) -> Result<Length, CborError> {
        self.read_header(MT_MAP)
    }

    /// Consume the indefinite-length `break` stop code.
    pub fn read_break(&mut self) -> Result<(), CborError> {
        if self.take_byte()? == BREAK {
            Ok(())
        } else {
            Err(CborError::BreakExpected)
        }
    }

    /// Read a tag's numeric value; the tagged item follows immediately.
    pub fn read_tag(&mut self) -> Result<u64, CborError> {
        self.read_header(MT_TAG)?.ok_or(CborError::MalformedEncoding)
    }

    /// Read a boolean simple value.
    pub fn read_bool(&mut self) -> Result<bool, CborError> {
        let b = self.take_byte()?;
        if b & MT_MASK != MT_SIMPLE {
            return Err(CborError::IncompatibleType("expected bool"));
        }
        match b & AI_MASK {
            SIMPLE_FALSE => Ok(false),
            SIMPLE_TRUE => Ok(true),
            _ => Err(CborError::IncompatibleType("expected bool")),
        }
    }

    /// Read the `null` simple value.
    pub fn read_null(&mut self) -> Result<(), CborError> {
        let b = self.take_byte()?;
        if b & MT_MASK == MT_SIMPLE && b & AI_MASK == SIMPLE_NULL {
            Ok(())
        } else {
            Err(CborError::IncompatibleType("expected null"))
        }
    }

    /// Read the `undefined` simple value.
    pub fn read_undefined(&mut self) -> Result<(), CborError> {
        let b = self.take_byte()?;
        if b & MT_MASK == MT_SIMPLE && b & AI_MASK == SIMPLE_UNDEFINED {
            Ok(())
        } else {
            Err(CborError::IncompatibleType("expected undefined"))
        }
    }

    /// Read a single-precision float (major type 7, AI 26).
    pub fn read_f32(&mut self) -> Result<f32, CborError> {
        let initial = self.take_byte()?;
        if initial & MT_MASK != MT_SIMPLE || initial & AI_MASK != PAYLOAD_FOUR_BYTES {
            return Err(CborError::IncompatibleType("expected f32"));
        }
        let bytes = self.take(4)?;
        Ok(f32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a double-precision float (major type 7, AI 27).
    pub fn read_f64(&mut self) -> Result<f64, CborError> {
        let initial = self.take_byte()?;
        if initial & MT_MASK != MT_SIMPLE || initial & AI_MASK != PAYLOAD_EIGHT_BYTES {
            return Err(CborError::IncompatibleType("expected f64"));
        }
        let bytes = self.take(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(bytes);
        Ok(f64::from_be_bytes(arr))
    }

    /// Skip over the next well-formed item, recursing into arrays, maps and tags. Used to
    /// discard CBOR values whose claim label is not recognized.
    pub fn skip_item(&mut self) -> Result<(), CborError> {
        match self.peek_major_type()? {
            MajorType::UnsignedInt => {
                self.read_uint()?;
            }
            MajorType::NegativeInt => {
                self.read_header(MT_NINT)?;
            }
            MajorType::ByteString => {
                self.read_bytes()?;
            }
            MajorType::TextString => {
                self.read_text()?;
            }
            MajorType::Array => match self.begin_array()? {
                Some(len) => {
                    for _ in 0..len {
                        self.skip_item()?;
                    }
                }
                None => {
                    while !self.is_break_code()? {
                        self.skip_item()?;
                    }
                    self.read_break()?;
                }
            },
            MajorType::Map => match self.begin_map()? {
                Some(len) => {
                    for _ in 0..len {
                        self.skip_item()?;
                        self.skip_item()?;
                    }
                }
                None => {
                    while !self.is_break_code()? {
                        self.skip_item()?;
                        self.skip_item()?;
                    }
                    self.read_break()?;
                }
            },
            MajorType::Tag => {
                self.read_tag()?;
                self.skip_item()?;
            }
            MajorType::Simple => {
                let ai = self.peek_additional_info()?;
                match ai {
                    SIMPLE_FALSE | SIMPLE_TRUE | SIMPLE_NULL | SIMPLE_UNDEFINED => {
                        self.take_byte()?;
                    }
                    PAYLOAD_TWO_BYTES => {
                        self.take_byte()?;
                        self.take(2)?;
                    }
                    PAYLOAD_FOUR_BYTES => {
                        self.take_byte()?;
                        self.take(4)?;
                    }
                    PAYLOAD_EIGHT_BYTES => {
                        self.take_byte()?;
                        self.take(8)?;
                    }
                    PAYLOAD_ONE_BYTE => {
                        self.take_byte()?;
                        self.take(1)?;
                    }
                    BREAK_AI => return Err(CborError::UnexpectedBreak),
                    _ => {
                        self.take_byte()?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Additional-info value of the `break` byte (`0xff & AI_MASK`), used only to name the match
/// arm above.
const BREAK_AI: u8 = PAYLOAD_INDEFINITE;

#[cfg(feature = "float")]
impl<'a> Decoder<'a> {
    /// Read a half-precision float (major type 7, AI 25). Requires the `float` feature.
    pub fn read_f16(&mut self) -> Result<half::f16, CborError> {
        let initial = self.take_byte()?;
        if initial & MT_MASK != MT_SIMPLE || initial & AI_MASK != PAYLOAD_TWO_BYTES {
            return Err(CborError::IncompatibleType("expected f16"));
        }
        let bytes = self.take(2)?;
        Ok(half::f16::from_be_bytes([bytes[0], bytes[1]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cbor::encoder::Encoder;

    #[test]
    fn rejects_non_minimal_encoding() {
        // 24 (0x18) followed by 0x00 encodes 0, which must be encoded as a single 0x00 byte.
        let bytes = [0x18u8, 0x00];
        let mut d = Decoder::new(&bytes);
        assert_eq!(d.read_uint(), Err(CborError::NotMinimal));
    }

    #[test]
    fn simple_value_readers_reject_wrong_major_type() {
        // 0x14/0x15/0x16/0x17 are major type 0 (unsigned int) with values 20/21/22/23, the
        // same additional-info bits as the major-type-7 simple values false/true/null/
        // undefined. Requesting a simple value must not accept an integer that merely shares
        // those low bits.
        for byte in [0x14u8, 0x15, 0x16, 0x17] {
            let bytes = [byte];
            assert_eq!(
                Decoder::new(&bytes).read_bool(),
                Err(CborError::IncompatibleType("expected bool"))
            );
            assert_eq!(
                Decoder::new(&bytes).read_null(),
                Err(CborError::IncompatibleType("expected null"))
            );
            assert_eq!(
                Decoder::new(&bytes).read_undefined(),
                Err(CborError::IncompatibleType("expected undefined"))
            );
        }
    }

    #[test]
    fn indefinite_array_round_trips_via_skip() {
        // [_ 1, 2, 3]
        let bytes = [0x9f, 0x01, 0x02, 0x03, 0xff];
        let mut d = Decoder::new(&bytes);
        assert_eq!(d.begin_array().unwrap(), None);
        assert_eq!(d.read_uint().unwrap(), 1);
        assert_eq!(d.read_uint().unwrap(), 2);
        assert_eq!(d.read_uint().unwrap(), 3);
        assert!(d.is_break_code().unwrap());
        d.read_break().unwrap();
    }

    #[test]
    fn indefinite_text_chunks_concatenate() {
        let mut e = Encoder::new();
        // manually build `(_ "ab", "cd")` since Encoder only emits definite-length strings
        let mut bytes = e.finish();
        bytes.extend_from_slice(&[0x7f, 0x62, b'a', b'b', 0x62, b'c', b'd', 0xff]);
        let mut d = Decoder::new(&bytes);
        assert_eq!(d.read_text().unwrap(), "abcd");
    }

    #[test]
    fn nested_indefinite_chunk_rejected() {
        // (_ (_ "ab"))  -- a chunk of an indefinite text string may not itself be indefinite.
        let bytes = [0x7f, 0x7f, 0x62, b'a', b'b', 0xff, 0xff];
        let mut d = Decoder::new(&bytes);
        assert_eq!(d.read_text(), Err(CborError::NestedIndefiniteChunk));
    }

    #[test]
    fn skip_item_handles_nested_map() {
        let mut e = Encoder::new();
        e.push_map_header(1);
        e.push_uint(1);
        e.push_array_header(2);
        e.push_uint(1);
        e.push_uint(2);
        let bytes = e.finish();
        let mut d = Decoder::new(&bytes);
        d.skip_item().unwrap();
        assert!(d.is_empty());
    }
}
