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
//! The issue/verify pipeline: Claims in, a base64url token string out, and back.

use std::collections::HashMap;

use crate::cbor::Decoder;
use crate::claims::Claims;
use crate::cose::CoseMac0;
use crate::error::CatError;
use crate::restriction::{self, RequestContext};
use crate::util::{base64url_decode, base64url_encode, random_cti};

/// CBOR tag identifying a CWT (RFC 8392).
pub const CWT_TAG: u64 = 61;
/// CBOR tag identifying a COSE_Mac0 structure (RFC 8152).
pub const COSE_MAC0_TAG: u64 = 17;

/// Configuration for issuing tokens.
#[derive(Debug, Clone)]
pub struct IssuerConfig {
    /// The raw HMAC-SHA-256 key.
    pub key: Vec<u8>,
    /// The key identifier placed in the unprotected COSE header.
    pub kid: String,
    /// Wrap the envelope in `tag(61, tag(17, ...))`.
    pub wrap_cwt_tag: bool,
    /// Mint a 16-byte CTI if the caller's claims don't already carry one.
    pub generate_cwt_id: bool,
}

/// Configuration for verifying tokens.
#[derive(Debug, Clone, Default)]
pub struct VerifierConfig {
    /// Key-id to raw-key-bytes lookup. HS256 expects 32-byte keys, but length is not enforced.
    pub keys: HashMap<String, Vec<u8>>,
    /// Require the CWT/COSE_Mac0 tag wrapping on the wire.
    pub expect_cwt_tag: bool,
}

/// Encode `[protected, unprotected, payload, tag]` wrapped as `tag(61, tag(17, ...))`.
fn wrap_cwt_tags(envelope: &[u8]) -> Vec<u8> {
    let mut enc = crate::cbor::Encoder::new();
    enc.push_tag(CWT_TAG);
    enc.push_tag(COSE_MAC0_TAG);
    enc.push_raw(envelope);
    enc.finish()
}

/// Issue a token: serialize `claims`, wrap in a COSE_Mac0 envelope authenticated with
/// `config.key`, optionally CWT-tag it, and base64url-encode the result.
pub fn issue(config: &IssuerConfig, mut claims: Claims) -> Result<String, CatError> {
    if config.generate_cwt_id && claims.cti().is_none() {
        claims.set_cti(random_cti());
    }

    let payload = claims.to_cbor();
    #[cfg(feature = "trace")]
    log::trace!("token: issuing, payload_len={}", payload.len());
    let envelope = CoseMac0::create(&config.key, &config.kid, payload)?;
    let envelope_bytes = envelope.to_cbor();

    let wire_bytes = if config.wrap_cwt_tag {
        wrap_cwt_tags(&envelope_bytes)
    } else {
        envelope_bytes
    };

    Ok(base64url_encode(&wire_bytes))
}

/// Verify a token: base64url-decode, unwrap any CWT tag, recompute and check the HMAC tag,
/// then run the restriction pass against `ctx`. On any failure no `Claims` are returned.
pub fn verify(config: &VerifierConfig, token: &str, ctx: &RequestContext) -> Result<Claims, CatError> {
    let bytes = base64url_decode(token)?;
    let mut dec = Decoder::new(&bytes);

    if config.expect_cwt_tag {
        let outer = dec.read_tag().map_err(|_| CatError::ExpectedCwtTag)?;
        if outer != CWT_TAG {
            return Err(CatError::ExpectedCwtTag);
        }
        let inner = dec.read_tag().map_err(|_| CatError::ExpectedCwtTag)?;
        if inner != COSE_MAC0_TAG {
            return Err(CatError::ExpectedCwtTag);
        }
    }

    let envelope = CoseMac0::from_cbor(&mut dec)?;

    let kid_bytes = envelope
        .kid()
        .ok_or_else(|| CatError::KeyNotFound(String::new()))?;
    let kid = String::from_utf8(kid_bytes.to_vec()).map_err(|_| CatError::KeyNotFound(String::new()))?;
    let key = config
        .keys
        .get(&kid)
        .ok_or_else(|| CatError::KeyNotFound(kid.clone()))?;

    envelope.verify(key)?;
    #[cfg(feature = "trace")]
    log::trace!("token: MAC verified, kid={:?}", kid);

    let claims = Claims::from_cbor(&envelope.payload)?;
    restriction::validate(&claims, ctx)?;
    #[cfg(feature = "trace")]
    log::trace!("token: restriction pass succeeded");

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer_config() -> IssuerConfig {
        IssuerConfig {
            key: [0x40u8; 32].to_vec(),
            kid: "Symmetric256".to_string(),
            wrap_cwt_tag: true,
            generate_cwt_id: false,
        }
    }

    fn verifier_config(key: Vec<u8>) -> VerifierConfig {
        let mut keys = HashMap::new();
        keys.insert("Symmetric256".to_string(), key);
        VerifierConfig {
            keys,
            expect_cwt_tag: true,
        }
    }

    fn sample_claims() -> Claims {
        let mut c = Claims::new();
        c.set_iss("eyevinn");
        c.set_sub("jane");
        c.set_aud("svc");
        c.set_iat(1_700_000_000);
        c.set_exp(1_700_000_120);
        c
    }

    #[test]
    fn happy_path_hs256() {
        let cfg = issuer_config();
        let token = issue(&cfg, sample_claims()).unwrap();

        let vcfg = verifier_config(cfg.key.clone());
        let ctx = RequestContext {
            now: 1_700_000_050,
            issuer: "eyevinn",
            audience: Some("svc"),
            ..Default::default()
        };
        let claims = verify(&vcfg, &token, &ctx).unwrap();
        assert_eq!(claims.iss(), Some("eyevinn"));
        assert_eq!(claims.sub(), Some("jane"));
    }

    #[test]
    fn expired_token_rejected() {
        let cfg = issuer_config();
        let mut claims = sample_claims();
        claims.set_exp(1_700_000_000);
        let token = issue(&cfg, claims).unwrap();

        let vcfg = verifier_config(cfg.key.clone());
        let ctx = RequestContext {
            now: 1_700_000_100,
            issuer: "eyevinn",
            ..Default::default()
        };
        assert_eq!(verify(&vcfg, &token, &ctx), Err(CatError::TokenExpired));
    }

    #[test]
    fn tampered_tag_rejected() {
        let cfg = issuer_config();
        let token = issue(&cfg, sample_claims()).unwrap();

        // Flip the last base64url character, which flips bits in the final tag byte.
        let mut chars: Vec<char> = token.chars().collect();
        let last = chars.len() - 1;
        chars[last] = if chars[last] == 'A' { 'B' } else { 'A' };
        let tampered: String = chars.into_iter().collect();

        let vcfg = verifier_config(cfg.key);
        let ctx = RequestContext {
            now: 1_700_000_050,
            issuer: "eyevinn",
            ..Default::default()
        };
        assert!(verify(&vcfg, &tampered, &ctx).is_err());
    }

    #[test]
    fn generates_cti_when_requested() {
        let mut cfg = issuer_config();
        cfg.generate_cwt_id = true;
        let token = issue(&cfg, sample_claims()).unwrap();

        let vcfg = verifier_config(cfg.key);
        let ctx = RequestContext {
            now: 1_700_000_050,
            issuer: "eyevinn",
            ..Default::default()
        };
        let claims = verify(&vcfg, &token, &ctx).unwrap();
        assert_eq!(claims.cti().unwrap().len(), 16);
    }

    #[test]
    fn unknown_kid_rejected() {
        let cfg = issuer_config();
        let token = issue(&cfg, sample_claims()).unwrap();

        let vcfg = VerifierConfig {
            keys: HashMap::new(),
            expect_cwt_tag: true,
        };
        let ctx = RequestContext {
            now: 1_700_000_050,
            issuer: "eyevinn",
            ..Default::default()
        };
        assert!(matches!(verify(&vcfg, &token, &ctx), Err(CatError::KeyNotFound(_))));
    }

    #[test]
    fn untagged_profile_round_trips() {
        let mut cfg = issuer_config();
        cfg.wrap_cwt_tag = false;
        let token = issue(&cfg, sample_claims()).unwrap();

        let vcfg = VerifierConfig {
            keys: {
                let mut k = HashMap::new();
                k.insert("Symmetric256".to_string(), cfg.key.clone());
                k
            },
            expect_cwt_tag: false,
        };
        let ctx = RequestContext {
            now: 1_700_000_050,
            issuer: "eyevinn",
            ..Default::default()
        };
        verify(&vcfg, &token, &ctx).unwrap();
    }
}
