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
//! Issue and verify Common Access Tokens (CTA-5007).
//!
//! A Common Access Token is a [CWT](https://www.rfc-editor.org/rfc/rfc8392) whose payload is
//! authenticated inside a [COSE_Mac0](https://www.rfc-editor.org/rfc/rfc8152#section-6.2)
//! structure using HMAC-SHA-256, then serialized as URL-safe base64 without padding. This crate
//! provides:
//!
//! - [`cbor`] — a small CBOR (RFC 8949) encoder/decoder covering the subset CATs need, with
//!   full indefinite-length support.
//! - [`claims`] — the typed claim-value tree and the registered CWT/CAT claim labels.
//! - [`cose`] — the COSE_Mac0 envelope builder and verifier.
//! - [`restriction`] — CATU/CATM/CATREPLAY/CATTPRINT validation against caller-supplied
//!   request context, plus URI parsing.
//! - [`token`] — the end-to-end issue/verify pipeline.
//!
//! ```
//! use common_access_token::claims::Claims;
//! use common_access_token::restriction::RequestContext;
//! use common_access_token::token::{self, IssuerConfig, VerifierConfig};
//!
//! let mut claims = Claims::new();
//! claims.set_iss("eyevinn");
//! claims.set_sub("jane");
//! claims.set_exp(9_999_999_999);
//!
//! let issuer = IssuerConfig {
//!     key: vec![0x42; 32],
//!     kid: "Symmetric256".to_string(),
//!     wrap_cwt_tag: true,
//!     generate_cwt_id: true,
//! };
//! let wire = token::issue(&issuer, claims).unwrap();
//!
//! let mut keys = std::collections::HashMap::new();
//! keys.insert("Symmetric256".to_string(), issuer.key.clone());
//! let verifier = VerifierConfig { keys, expect_cwt_tag: true };
//! let ctx = RequestContext { now: 0, issuer: "eyevinn", ..Default::default() };
//! let verified = token::verify(&verifier, &wire, &ctx).unwrap();
//! assert_eq!(verified.sub(), Some("jane"));
//! ```

pub mod cbor;
pub mod claims;
pub mod cose;
pub mod error;
pub mod restriction;
pub mod token;
pub mod util;

pub use error::CatError;
