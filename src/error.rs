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
//! The token-level error type. `CborError` covers codec failures; `CatError` covers every
//! failure above the codec (envelope shape, claim schema, authorization, key management,
//! input encoding) and wraps `CborError` for the codec layer, mirroring the two-tier split
//! between a narrow decoder error and a wider service-level error.

use thiserror::Error;

use crate::cbor::CborError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatError {
    // --- Codec ---
    #[error("CBOR codec error: {0}")]
    Cbor(#[from] CborError),

    // --- Envelope ---
    #[error("expected CWT tag (61) wrapping a COSE_Mac0 tag (17)")]
    ExpectedCwtTag,

    #[error("COSE_Mac0 envelope must be a 4-element array")]
    MalformedEnvelope,

    #[error("HMAC tag does not match the computed tag")]
    TagMismatch,

    #[error("COSE protected header is malformed")]
    MalformedHeader,

    // --- Claim-schema ---
    #[error("required claim missing: {0}")]
    RequiredClaimMissing(&'static str),

    #[error("claim {0} has the wrong CBOR variant for its label")]
    ClaimSchemaViolation(&'static str),

    #[error("CATREPLAY value out of range: {0}")]
    InvalidCatReplayValue(i64),

    #[error("CATTPRINT claim is missing a required subfield")]
    MalformedCatTprintClaim,

    // --- Authorization ---
    #[error("token has expired")]
    TokenExpired,

    #[error("token is not yet active")]
    TokenNotYetActive,

    #[error("issuer does not match")]
    InvalidIssuer,

    #[error("audience does not match")]
    InvalidAudience,

    #[error("URI component rule failed")]
    InvalidUriClaim,

    #[error("HTTP method not present in CATM allow-list")]
    InvalidMethodClaim,

    #[error("token replay prohibited")]
    TokenReplayProhibited,

    #[error("TLS fingerprint does not match CATTPRINT claim")]
    InvalidTlsFingerprintClaim,

    #[error("restriction claim {0} is not understood by this verifier")]
    UnsupportedRestrictionClaim(&'static str),

    // --- Key management ---
    #[error("no key registered for key id {0:?}")]
    KeyNotFound(String),

    // --- Input ---
    #[error("invalid base64url input")]
    InvalidBase64,

    #[error("invalid hex input")]
    InvalidHex,

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}
