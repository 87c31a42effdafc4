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
//! Registered CWT and CAT claim labels, and the small enumerations used by their values.

// Standard CWT claims, RFC 8392 §3.
pub const ISS: u64 = 1;
pub const SUB: u64 = 2;
pub const AUD: u64 = 3;
pub const EXP: u64 = 4;
pub const NBF: u64 = 5;
pub const IAT: u64 = 6;
pub const CTI: u64 = 7;
pub const CNF: u64 = 8;

// CAT restriction claims.
pub const CATREPLAY: u64 = 308;
pub const CATPOR: u64 = 309;
pub const CATV: u64 = 310;
pub const CATNIP: u64 = 311;
pub const CATU: u64 = 312;
pub const CATM: u64 = 313;
pub const CATALPN: u64 = 314;
pub const CATH: u64 = 315;
pub const CATGEOISO3166: u64 = 316;
pub const CATGEOCOORD: u64 = 317;
pub const CATGEOALT: u64 = 318;
pub const CATTPK: u64 = 319;
pub const CATIFDATA: u64 = 320;
pub const CATDPOP: u64 = 321;
pub const CATIF: u64 = 322;
pub const CATR: u64 = 323;
pub const CATTPRINT: u64 = 324;

/// URI components addressable inside a CATU match-map, RFC-style component keys.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[repr(i64)]
pub enum UriComponentKey {
    Scheme = 0,
    Host = 1,
    Port = 2,
    Path = 3,
    Query = 4,
    ParentPath = 5,
    Filename = 6,
    Stem = 7,
    Extension = 8,
}

impl UriComponentKey {
    pub fn from_i64(v: i64) -> Option<Self> {
        Some(match v {
            0 => UriComponentKey::Scheme,
            1 => UriComponentKey::Host,
            2 => UriComponentKey::Port,
            3 => UriComponentKey::Path,
            4 => UriComponentKey::Query,
            5 => UriComponentKey::ParentPath,
            6 => UriComponentKey::Filename,
            7 => UriComponentKey::Stem,
            8 => UriComponentKey::Extension,
            _ => return None,
        })
    }
}

/// Match-rule kinds inside a CATU component's match-map.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MatchType {
    Exact,
    Prefix,
    Suffix,
    Contains,
    /// Reserved: declared by the wire format but not evaluated. See `restriction` module docs.
    Regex,
    /// Reserved.
    Sha256,
    /// Reserved.
    Sha512_256,
}

impl MatchType {
    pub fn from_i64(v: i64) -> Option<Self> {
        Some(match v {
            0 => MatchType::Exact,
            1 => MatchType::Prefix,
            2 => MatchType::Suffix,
            3 => MatchType::Contains,
            4 => MatchType::Regex,
            -1 => MatchType::Sha256,
            -2 => MatchType::Sha512_256,
            _ => return None,
        })
    }
}

/// TLS fingerprint families a CATTPRINT claim may pin against.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FingerprintType(pub i64);

impl FingerprintType {
    pub const JA3: FingerprintType = FingerprintType(0);
    pub const JA3S: FingerprintType = FingerprintType(1);
    pub const JA4: FingerprintType = FingerprintType(2);
}

/// CATREPLAY modes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReplayMode {
    Permitted,
    Prohibited,
    ReuseDetection,
}

impl ReplayMode {
    pub fn from_i64(v: i64) -> Option<Self> {
        Some(match v {
            0 => ReplayMode::Permitted,
            1 => ReplayMode::Prohibited,
            2 => ReplayMode::ReuseDetection,
            _ => return None,
        })
    }

    pub fn to_i64(self) -> i64 {
        match self {
            ReplayMode::Permitted => 0,
            ReplayMode::Prohibited => 1,
            ReplayMode::ReuseDetection => 2,
        }
    }
}
