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
//! COSE_Mac0 (RFC 8152 §6.2): a 4-element `[protected, unprotected, payload, tag]` envelope
//! authenticated with HMAC-SHA-256.

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::cbor::{CborError, Decoder, Encoder};
use crate::claims::ClaimValue;
use crate::error::CatError;

type HmacSha256 = Hmac<Sha256>;

/// COSE header parameter: algorithm identifier.
pub const HEADER_ALG: i64 = 1;
/// COSE header parameter: key identifier.
pub const HEADER_KID: i64 = 4;
/// COSE algorithm identifier for HMAC-SHA-256.
pub const ALG_HS256: i64 = 5;

/// Expected length, in bytes, of an HS256 tag.
pub const HS256_TAG_LEN: usize = 32;

/// Parse a protected-header bstr's contents into a header map. Per RFC 8152, a zero-length
/// bstr IS the empty map by convention and must not be run through the CBOR map parser (an
/// empty buffer has no map header to read) — callers must special-case that before calling
/// this.
fn decode_header_map(bytes: &[u8]) -> Result<BTreeMap<i64, ClaimValue>, CborError> {
    let mut dec = Decoder::new(bytes);
    let mut out = BTreeMap::new();
    match dec.begin_map()? {
        Some(len) => {
            for _ in 0..len {
                let k = dec.read_int()?;
                let v = ClaimValue::from_cbor(&mut dec)?;
                out.insert(k, v);
            }
        }
        None => {
            while !dec.is_break_code()? {
                let k = dec.read_int()?;
                let v = ClaimValue::from_cbor(&mut dec)?;
                out.insert(k, v);
            }
            dec.read_break()?;
        }
    }
    Ok(out)
}

/// Build the `MAC0 | protected | external_aad | payload` structure that is hashed under HMAC.
/// `external_aad` is always empty in this profile.
fn mac_structure(protected: &[u8], payload: &[u8]) -> Vec<u8> {
    let mut enc = Encoder::new();
    enc.push_array_header(4);
    enc.push_text("MAC0");
    enc.push_bytes(protected);
    enc.push_bytes(&[]); // external_aad
    enc.push_bytes(payload);
    enc.finish()
}

fn compute_tag(key: &[u8], protected: &[u8], payload: &[u8]) -> Vec<u8> {
    let structure = mac_structure(protected, payload);
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(&structure);
    mac.finalize().into_bytes().to_vec()
}

/// A COSE_Mac0 structure: protected header bytes, unprotected header map, opaque payload, and
/// the HMAC tag over all three.
#[derive(Debug, Clone, PartialEq)]
pub struct CoseMac0 {
    pub protected: Vec<u8>,
    pub unprotected: BTreeMap<i64, ClaimValue>,
    pub payload: Vec<u8>,
    pub tag: Vec<u8>,
}

impl CoseMac0 {
    /// Build and authenticate a new COSE_Mac0 envelope. The protected header is always empty
    /// in this profile, encoded as the zero-length byte string RFC 8152 treats as shorthand
    /// for the empty map (NOT the CBOR encoding of an empty map, which is the one-byte string
    /// `0xA0` and would authenticate a different byte sequence than every conforming peer);
    /// `alg` and `kid` are carried in the unprotected header, matching §6's "MAY appear in the
    /// protected or unprotected header" for `alg` and the `kid` placement the wire format
    /// requires.
    pub fn create(key: &[u8], kid: &str, payload: Vec<u8>) -> Result<CoseMac0, CatError> {
        let protected = Vec::new();
        let mut unprotected = BTreeMap::new();
        unprotected.insert(HEADER_ALG, ClaimValue::Integer(ALG_HS256));
        unprotected.insert(HEADER_KID, ClaimValue::Bytes(kid.as_bytes().to_vec()));
        let tag = compute_tag(key, &protected, &payload);
        #[cfg(feature = "trace")]
        log::trace!(
            "cose_mac0: created envelope, payload_len={}, tag_len={}",
            payload.len(),
            tag.len()
        );
        Ok(CoseMac0 {
            protected,
            unprotected,
            payload,
            tag,
        })
    }

    /// Recompute the HMAC and compare it to the stored tag in constant time. A non-empty
    /// protected header is parsed (even though this profile does not interpret its contents)
    /// so that malformed CBOR in the header fails closed rather than being silently ignored.
    /// A zero-length protected header is RFC 8152's shorthand for the empty map and is valid
    /// as-is; it is never passed to the map parser, which would reject it as truncated input.
    pub fn verify(&self, key: &[u8]) -> Result<(), CatError> {
        if !self.protected.is_empty() {
            decode_header_map(&self.protected).map_err(|_| CatError::MalformedHeader)?;
        }
        let structure = mac_structure(&self.protected, &self.payload);
        let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
        mac.update(&structure);
        mac.verify_slice(&self.tag).map_err(|_| {
            log::warn!("cose_mac0: tag mismatch");
            CatError::TagMismatch
        })
    }

    /// The key id stored in the unprotected header, if present.
    pub fn kid(&self) -> Option<&[u8]> {
        self.unprotected.get(&HEADER_KID).and_then(ClaimValue::as_bytes)
    }

    /// Serialize to the bare 4-element array (no CWT/COSE_Mac0 tag wrapping).
    pub fn to_cbor(&self) -> Vec<u8> {
        let mut enc = Encoder::new();
        enc.push_array_header(4);
        enc.push_bytes(&self.protected);
        enc.push_map_header(self.unprotected.len());
        for (k, v) in &self.unprotected {
            enc.push_int(*k);
            v.to_cbor(&mut enc);
        }
        enc.push_bytes(&self.payload);
        enc.push_bytes(&self.tag);
        enc.finish()
    }

    /// Parse a bare 4-element `[protected, unprotected, payload, tag]` array. The caller is
    /// responsible for consuming any outer CWT/COSE_Mac0 tags first.
    pub fn from_cbor(dec: &mut Decoder) -> Result<CoseMac0, CatError> {
        let len = dec.begin_array()?;
        if len != Some(4) {
            return Err(CatError::MalformedEnvelope);
        }
        let protected = dec.read_bytes()?;
        let unprotected = match dec.begin_map()? {
            Some(n) => {
                let mut m = BTreeMap::new();
                for _ in 0..n {
                    let k = dec.read_int()?;
                    let v = ClaimValue::from_cbor(dec)?;
                    m.insert(k, v);
                }
                m
            }
            None => {
                let mut m = BTreeMap::new();
                while !dec.is_break_code()? {
                    let k = dec.read_int()?;
                    let v = ClaimValue::from_cbor(dec)?;
                    m.insert(k, v);
                }
                dec.read_break()?;
                m
            }
        };
        let payload = dec.read_bytes()?;
        let tag = dec.read_bytes()?;
        if tag.len() != HS256_TAG_LEN {
            return Err(CatError::MalformedEnvelope);
        }
        Ok(CoseMac0 {
            protected,
            unprotected,
            payload,
            tag,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 32] = [0x11; 32];

    #[test]
    fn create_then_verify_succeeds() {
        let envelope = CoseMac0::create(&KEY, "Symmetric256", b"payload".to_vec()).unwrap();
        assert_eq!(envelope.tag.len(), HS256_TAG_LEN);
        envelope.verify(&KEY).unwrap();
    }

    #[test]
    fn tampered_tag_fails_verification() {
        let mut envelope = CoseMac0::create(&KEY, "Symmetric256", b"payload".to_vec()).unwrap();
        let last = envelope.tag.len() - 1;
        envelope.tag[last] ^= 0xff;
        assert_eq!(envelope.verify(&KEY), Err(CatError::TagMismatch));
    }

    #[test]
    fn tampered_payload_fails_verification() {
        let mut envelope = CoseMac0::create(&KEY, "Symmetric256", b"payload".to_vec()).unwrap();
        envelope.payload = b"tampered".to_vec();
        assert_eq!(envelope.verify(&KEY), Err(CatError::TagMismatch));
    }

    #[test]
    fn wire_round_trip() {
        let envelope = CoseMac0::create(&KEY, "Symmetric256", b"payload".to_vec()).unwrap();
        let bytes = envelope.to_cbor();
        let mut dec = Decoder::new(&bytes);
        let parsed = CoseMac0::from_cbor(&mut dec).unwrap();
        assert_eq!(parsed, envelope);
        parsed.verify(&KEY).unwrap();
    }

    #[test]
    fn protected_header_is_a_zero_length_byte_string() {
        let envelope = CoseMac0::create(&KEY, "Symmetric256", b"payload".to_vec()).unwrap();
        assert!(envelope.protected.is_empty());
        // On the wire that's the bstr `0x40`, not `0x41 0xa0` (a one-byte string containing
        // the CBOR encoding of an empty map).
        let mut enc = Encoder::new();
        enc.push_bytes(&envelope.protected);
        assert_eq!(enc.finish(), vec![0x40]);
    }

    #[test]
    fn mac_structure_hashes_zero_length_protected_header() {
        // Pins the exact bytes fed to the MAC: `["MAC0", h'', h'', h'payload']` with a
        // zero-length protected-header bstr. An `0xA0` (CBOR empty-map) protected header,
        // the earlier bug, would produce a different byte sequence here.
        let envelope = CoseMac0::create(&KEY, "Symmetric256", b"payload".to_vec()).unwrap();
        let structure = mac_structure(&envelope.protected, &envelope.payload);
        assert_eq!(
            structure,
            [
                0x84, 0x64, b'M', b'A', b'C', b'0', 0x40, 0x40, 0x47, b'p', b'a', b'y', b'l',
                b'o', b'a', b'd',
            ]
        );
    }

    #[test]
    fn zero_length_protected_header_parses_as_valid_from_wire() {
        // A peer-issued envelope with the canonical empty-map shorthand must verify, not be
        // rejected as a malformed header.
        let envelope = CoseMac0::create(&KEY, "Symmetric256", b"payload".to_vec()).unwrap();
        let bytes = envelope.to_cbor();
        let mut dec = Decoder::new(&bytes);
        let parsed = CoseMac0::from_cbor(&mut dec).unwrap();
        assert!(parsed.protected.is_empty());
        parsed.verify(&KEY).unwrap();
    }
}
