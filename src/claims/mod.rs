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
//! The claims tree: a typed, owned value model for CWT/CAT claims with a CBOR round trip.

pub mod labels;

use std::collections::BTreeMap;

use crate::cbor::{CborError, Decoder, Encoder, MajorType};

/// A single claim value. Maps use `i64` keys (not `u64`) because nested CATU match-maps carry
/// the reserved negative match-type codes (-1 SHA-256, -2 SHA-512/256) alongside non-negative
/// component keys.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimValue {
    Integer(i64),
    Text(String),
    Bytes(Vec<u8>),
    Array(Vec<ClaimValue>),
    Map(BTreeMap<i64, ClaimValue>),
}

impl ClaimValue {
    pub(crate) fn to_cbor(&self, enc: &mut Encoder) {
        match self {
            ClaimValue::Integer(n) => {
                enc.push_int(*n);
            }
            ClaimValue::Text(s) => {
                enc.push_text(s);
            }
            ClaimValue::Bytes(b) => {
                enc.push_bytes(b);
            }
            ClaimValue::Array(items) => {
                enc.push_array_header(items.len());
                for item in items {
                    item.to_cbor(enc);
                }
            }
            ClaimValue::Map(map) => {
                enc.push_map_header(map.len());
                for (k, v) in map {
                    enc.push_int(*k);
                    v.to_cbor(enc);
                }
            }
        }
    }

    pub(crate) fn from_cbor(dec: &mut Decoder) -> Result<ClaimValue, CborError> {
        match dec.peek_major_type()? {
            MajorType::UnsignedInt | MajorType::NegativeInt => Ok(ClaimValue::Integer(dec.read_int()?)),
            MajorType::TextString => Ok(ClaimValue::Text(dec.read_text()?)),
            MajorType::ByteString => Ok(ClaimValue::Bytes(dec.read_bytes()?)),
            MajorType::Array => {
                let mut items = Vec::new();
                match dec.begin_array()? {
                    Some(len) => {
                        for _ in 0..len {
                            items.push(ClaimValue::from_cbor(dec)?);
                        }
                    }
                    None => {
                        while !dec.is_break_code()? {
                            items.push(ClaimValue::from_cbor(dec)?);
                        }
                        dec.read_break()?;
                    }
                }
                Ok(ClaimValue::Array(items))
            }
            MajorType::Map => {
                let mut map = BTreeMap::new();
                match dec.begin_map()? {
                    Some(len) => {
                        for _ in 0..len {
                            let key = dec.read_int()?;
                            let val = ClaimValue::from_cbor(dec)?;
                            map.insert(key, val);
                        }
                    }
                    None => {
                        while !dec.is_break_code()? {
                            let key = dec.read_int()?;
                            let val = ClaimValue::from_cbor(dec)?;
                            map.insert(key, val);
                        }
                        dec.read_break()?;
                    }
                }
                Ok(ClaimValue::Map(map))
            }
            MajorType::Tag => Err(CborError::IncompatibleType("tagged claim value")),
            MajorType::Simple => Err(CborError::IncompatibleType("simple claim value")),
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ClaimValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ClaimValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ClaimValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ClaimValue]> {
        match self {
            ClaimValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<i64, ClaimValue>> {
        match self {
            ClaimValue::Map(m) => Some(m),
            _ => None,
        }
    }
}

/// A populated set of CWT/CAT claims, keyed by their 64-bit unsigned label.
///
/// Claims is immutable once handed to the token pipeline: `Token::issue` takes it by value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Claims {
    entries: BTreeMap<u64, ClaimValue>,
}

impl Claims {
    pub fn new() -> Self {
        Claims {
            entries: BTreeMap::new(),
        }
    }

    /// Set a claim value by raw label, with no type checking. Used for restriction claims that
    /// have no dedicated typed setter (catpor, catv, catnip, catalpn, cath, catgeoiso3166,
    /// catgeocoord, catgeoalt, cattpk, catifdata, catdpop, catif, catr) so every registered CAT
    /// label remains addressable even where only a subset is behaviorally validated.
    pub fn set_claim(&mut self, label: u64, value: ClaimValue) {
        self.entries.insert(label, value);
    }

    pub fn get_claim(&self, label: u64) -> Option<&ClaimValue> {
        self.entries.get(&label)
    }

    pub fn set_iss(&mut self, iss: impl Into<String>) {
        self.set_claim(labels::ISS, ClaimValue::Text(iss.into()));
    }

    pub fn iss(&self) -> Option<&str> {
        self.get_claim(labels::ISS).and_then(ClaimValue::as_text)
    }

    pub fn set_sub(&mut self, sub: impl Into<String>) {
        self.set_claim(labels::SUB, ClaimValue::Text(sub.into()));
    }

    pub fn sub(&self) -> Option<&str> {
        self.get_claim(labels::SUB).and_then(ClaimValue::as_text)
    }

    pub fn set_aud(&mut self, aud: impl Into<String>) {
        self.set_claim(labels::AUD, ClaimValue::Text(aud.into()));
    }

    pub fn aud(&self) -> Option<&str> {
        self.get_claim(labels::AUD).and_then(ClaimValue::as_text)
    }

    pub fn set_exp(&mut self, exp: i64) {
        self.set_claim(labels::EXP, ClaimValue::Integer(exp));
    }

    pub fn exp(&self) -> Option<i64> {
        self.get_claim(labels::EXP).and_then(ClaimValue::as_integer)
    }

    pub fn set_nbf(&mut self, nbf: i64) {
        self.set_claim(labels::NBF, ClaimValue::Integer(nbf));
    }

    pub fn nbf(&self) -> Option<i64> {
        self.get_claim(labels::NBF).and_then(ClaimValue::as_integer)
    }

    pub fn set_iat(&mut self, iat: i64) {
        self.set_claim(labels::IAT, ClaimValue::Integer(iat));
    }

    pub fn iat(&self) -> Option<i64> {
        self.get_claim(labels::IAT).and_then(ClaimValue::as_integer)
    }

    pub fn set_cti(&mut self, cti: Vec<u8>) {
        self.set_claim(labels::CTI, ClaimValue::Bytes(cti));
    }

    pub fn cti(&self) -> Option<&[u8]> {
        self.get_claim(labels::CTI).and_then(ClaimValue::as_bytes)
    }

    pub fn set_cnf(&mut self, cnf: BTreeMap<i64, ClaimValue>) {
        self.set_claim(labels::CNF, ClaimValue::Map(cnf));
    }

    /// Set CATREPLAY (label 308). `mode` must be 0 (Permitted), 1 (Prohibited) or
    /// 2 (ReuseDetection); out-of-range values are rejected at parse time, not here, so this
    /// accepts any `i64` and lets [`from_cbor`]-driven validation catch misuse consistently.
    pub fn set_cat_replay(&mut self, mode: i64) {
        self.set_claim(labels::CATREPLAY, ClaimValue::Integer(mode));
    }

    pub fn cat_replay(&self) -> Option<i64> {
        self.get_claim(labels::CATREPLAY).and_then(ClaimValue::as_integer)
    }

    /// Set CATM (label 313): an allow-list of HTTP methods.
    pub fn set_cat_m(&mut self, methods: &[&str]) {
        let items = methods
            .iter()
            .map(|m| ClaimValue::Text((*m).to_string()))
            .collect();
        self.set_claim(labels::CATM, ClaimValue::Array(items));
    }

    pub fn cat_m(&self) -> Option<&[ClaimValue]> {
        self.get_claim(labels::CATM).and_then(ClaimValue::as_array)
    }

    /// Set CATU (label 312): a map from URI-component key to match-map.
    pub fn set_cat_u(&mut self, components: BTreeMap<i64, ClaimValue>) {
        self.set_claim(labels::CATU, ClaimValue::Map(components));
    }

    pub fn cat_u(&self) -> Option<&BTreeMap<i64, ClaimValue>> {
        self.get_claim(labels::CATU).and_then(ClaimValue::as_map)
    }

    /// Set CATTPRINT (label 324): `{0: fingerprint_type, 1: fingerprint_value}`.
    pub fn set_cat_tprint(&mut self, fingerprint_type: i64, fingerprint_value: impl Into<String>) {
        let mut m = BTreeMap::new();
        m.insert(0, ClaimValue::Integer(fingerprint_type));
        m.insert(1, ClaimValue::Text(fingerprint_value.into()));
        self.set_claim(labels::CATTPRINT, ClaimValue::Map(m));
    }

    pub fn cat_tprint(&self) -> Option<&BTreeMap<i64, ClaimValue>> {
        self.get_claim(labels::CATTPRINT).and_then(ClaimValue::as_map)
    }

    /// Serialize to a CBOR map, one entry per claim, keys in ascending order.
    pub fn to_cbor(&self) -> Vec<u8> {
        let mut enc = Encoder::new();
        enc.push_map_header(self.entries.len());
        for (label, value) in &self.entries {
            enc.push_uint(*label);
            value.to_cbor(&mut enc);
        }
        enc.finish()
    }

    /// Parse a CBOR map of claims.
    pub fn from_cbor(bytes: &[u8]) -> Result<Claims, CborError> {
        let mut dec = Decoder::new(bytes);
        let mut entries = BTreeMap::new();
        match dec.begin_map()? {
            Some(len) => {
                for _ in 0..len {
                    let label = dec.read_uint()?;
                    let value = ClaimValue::from_cbor(&mut dec)?;
                    entries.insert(label, value);
                }
            }
            None => {
                while !dec.is_break_code()? {
                    let label = dec.read_uint()?;
                    let value = ClaimValue::from_cbor(&mut dec)?;
                    entries.insert(label, value);
                }
                dec.read_break()?;
            }
        }
        Ok(Claims { entries })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&u64, &ClaimValue)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_nested_array_and_map_values() {
        let mut claims = Claims::new();
        claims.set_iss("eyevinn");
        claims.set_exp(1_700_000_120);

        let mut inner = BTreeMap::new();
        inner.insert(0i64, ClaimValue::Text(".example.com".into()));
        let mut cat_u = BTreeMap::new();
        cat_u.insert(1i64, ClaimValue::Map(inner)); // host -> {Exact: ".example.com"}
        claims.set_cat_u(cat_u);

        claims.set_cat_m(&["GET", "POST"]);

        let bytes = claims.to_cbor();
        let decoded = Claims::from_cbor(&bytes).unwrap();
        assert_eq!(decoded.iss(), Some("eyevinn"));
        assert_eq!(decoded.exp(), Some(1_700_000_120));
        assert!(decoded.cat_u().is_some());
        assert_eq!(decoded.cat_m().unwrap().len(), 2);
        assert_eq!(decoded, claims);
    }

    #[test]
    fn generic_accessor_round_trips_unmodeled_label() {
        let mut claims = Claims::new();
        claims.set_claim(labels::CATNIP, ClaimValue::Integer(1));
        let bytes = claims.to_cbor();
        let decoded = Claims::from_cbor(&bytes).unwrap();
        assert_eq!(decoded.get_claim(labels::CATNIP), Some(&ClaimValue::Integer(1)));
    }
}
