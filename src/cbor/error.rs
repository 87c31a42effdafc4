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
use thiserror::Error;

/// Errors raised by the CBOR codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CborError {
    #[error("unexpected end of buffer")]
    EndOfBuffer,

    #[error("item type {0} incompatible with requested conversion")]
    IncompatibleType(&'static str),

    #[error("malformed encoding")]
    MalformedEncoding,

    #[error("integer additional-info byte(s) not minimally encoded")]
    NotMinimal,

    #[error("indefinite-length chunk may not itself be indefinite-length")]
    NestedIndefiniteChunk,

    #[error("expected a `break` stop code")]
    BreakExpected,

    #[error("unexpected `break` stop code")]
    UnexpectedBreak,

    #[error("invalid UTF-8 in text string")]
    Utf8Error,

    #[error("value {0} out of range for target type")]
    OutOfRange(i128),
}
