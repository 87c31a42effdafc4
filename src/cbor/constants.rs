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
//! RFC 8949 major type and additional-information byte layout constants.

/// Additional Information bitmask.
pub const AI_MASK: u8 = 0b000_11111;
/// Major type bitmask.
pub const MT_MASK: u8 = 0b111_00000;

/// Major Type 0 (unsigned integers).
pub const MT_UINT: u8 = 0b000_00000;
/// Major Type 1 (negative integers).
pub const MT_NINT: u8 = 0b001_00000;
/// Major Type 2 (byte strings).
pub const MT_BSTR: u8 = 0b010_00000;
/// Major Type 3 (text strings).
pub const MT_TSTR: u8 = 0b011_00000;
/// Major Type 4 (arrays).
pub const MT_ARRAY: u8 = 0b100_00000;
/// Major Type 5 (maps).
pub const MT_MAP: u8 = 0b101_00000;
/// Major Type 6 (tags).
pub const MT_TAG: u8 = 0b110_00000;
/// Major Type 7 (floats and simple values).
pub const MT_SIMPLE: u8 = 0b111_00000;

/// Largest value directly representable in the AI bits.
pub const PAYLOAD_DIRECT: u8 = 23;
/// AI value indicating one byte of length/value follows.
pub const PAYLOAD_ONE_BYTE: u8 = 24;
/// AI value indicating two bytes of length/value follow.
pub const PAYLOAD_TWO_BYTES: u8 = 25;
/// AI value indicating four bytes of length/value follow.
pub const PAYLOAD_FOUR_BYTES: u8 = 26;
/// AI value indicating eight bytes of length/value follow.
pub const PAYLOAD_EIGHT_BYTES: u8 = 27;
/// AI value indicating an indefinite-length array, map, byte string or text string.
pub const PAYLOAD_INDEFINITE: u8 = 31;

/// Simple-value encoding for `false`.
pub const SIMPLE_FALSE: u8 = 20;
/// Simple-value encoding for `true`.
pub const SIMPLE_TRUE: u8 = 21;
/// Simple-value encoding for `null`.
pub const SIMPLE_NULL: u8 = 22;
/// Simple-value encoding for `undefined`.
pub const SIMPLE_UNDEFINED: u8 = 23;

/// The single-byte "break" stop code used to close indefinite-length containers.
pub const BREAK: u8 = 0xff;

/// CBOR major types, as decoded from the top three bits of the initial byte.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MajorType {
    UnsignedInt,
    NegativeInt,
    ByteString,
    TextString,
    Array,
    Map,
    Tag,
    Simple,
}

impl MajorType {
    pub(crate) fn from_initial_byte(b: u8) -> MajorType {
        match b & MT_MASK {
            MT_UINT => MajorType::UnsignedInt,
            MT_NINT => MajorType::NegativeInt,
            MT_BSTR => MajorType::ByteString,
            MT_TSTR => MajorType::TextString,
            MT_ARRAY => MajorType::Array,
            MT_MAP => MajorType::Map,
            MT_TAG => MajorType::Tag,
            _ => MajorType::Simple,
        }
    }
}
