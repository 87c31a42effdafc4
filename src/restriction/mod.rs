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
//! Post-cryptographic-verification claim checks: issuer/time/audience, then the CAT
//! restriction claims (CATU, CATM, CATREPLAY, CATTPRINT). Runs only after the COSE_Mac0 tag
//! has already been verified.

pub mod uri;

use crate::claims::labels::{MatchType, ReplayMode, UriComponentKey};
use crate::claims::{labels, ClaimValue, Claims};
use crate::error::CatError;
use uri::UriComponents;

/// Everything the caller knows about the request a token is being checked against. Every
/// field is optional except `now` and `issuer`, mirroring which restriction checks are
/// unconditional (issuer) versus only run when the caller supplies the relevant context.
#[derive(Debug, Clone, Default)]
pub struct RequestContext<'a> {
    pub now: i64,
    pub issuer: &'a str,
    pub audience: Option<&'a str>,
    pub url: Option<&'a str>,
    pub method: Option<&'a str>,
    /// Whether the verifier's replay-state oracle has already seen this token's CTI. Only
    /// consulted when CATREPLAY is Prohibited; the oracle itself is out of scope here.
    pub seen_before: bool,
    pub tls_fingerprint: Option<(i64, &'a str)>,
}

fn match_rule(mt: MatchType, pattern: &str, value: &str) -> bool {
    match mt {
        MatchType::Exact => value == pattern,
        MatchType::Prefix => value.starts_with(pattern),
        MatchType::Suffix => value.ends_with(pattern),
        MatchType::Contains => value.contains(pattern),
        // Reserved kinds: declared by the wire format, not evaluated. Per design note, rules
        // of these kinds always report no-match rather than being silently skipped.
        MatchType::Regex | MatchType::Sha256 | MatchType::Sha512_256 => false,
    }
}

fn validate_catu(cat_u: &std::collections::BTreeMap<i64, ClaimValue>, url: &str) -> Result<(), CatError> {
    let components = UriComponents::parse(url)?;
    for (component_key, rules_value) in cat_u {
        let component = UriComponentKey::from_i64(*component_key)
            .ok_or(CatError::ClaimSchemaViolation("catu component key"))?;
        let rules = rules_value
            .as_map()
            .ok_or(CatError::ClaimSchemaViolation("catu match-map"))?;
        if rules.is_empty() {
            return Err(CatError::ClaimSchemaViolation("catu match-map must have at least one entry"));
        }
        let value = components.component_value(component);
        let mut matched = false;
        for (mt_key, pattern_value) in rules {
            let mt =
                MatchType::from_i64(*mt_key).ok_or(CatError::ClaimSchemaViolation("catu match type"))?;
            let pattern = pattern_value
                .as_text()
                .ok_or(CatError::ClaimSchemaViolation("catu pattern"))?;
            if match_rule(mt, pattern, &value) {
                matched = true;
                break;
            }
        }
        if !matched {
            #[cfg(feature = "trace")]
            log::debug!("restriction: catu component failed match");
            return Err(CatError::InvalidUriClaim);
        }
    }
    Ok(())
}

fn validate_catm(cat_m: &[ClaimValue], method: &str) -> Result<(), CatError> {
    if cat_m.is_empty() {
        return Err(CatError::ClaimSchemaViolation("catm must have at least one entry"));
    }
    let ok = cat_m.iter().any(|v| {
        v.as_text()
            .map(|allowed| allowed.eq_ignore_ascii_case(method))
            .unwrap_or(false)
    });
    if ok {
        Ok(())
    } else {
        #[cfg(feature = "trace")]
        log::debug!("restriction: catm rejected method {:?}", method);
        Err(CatError::InvalidMethodClaim)
    }
}

fn validate_catreplay(value: i64, seen_before: bool) -> Result<(), CatError> {
    let mode = ReplayMode::from_i64(value).ok_or(CatError::InvalidCatReplayValue(value))?;
    match mode {
        ReplayMode::Permitted | ReplayMode::ReuseDetection => Ok(()),
        ReplayMode::Prohibited => {
            if seen_before {
                #[cfg(feature = "trace")]
                log::debug!("restriction: catreplay prohibited and token already seen");
                Err(CatError::TokenReplayProhibited)
            } else {
                Ok(())
            }
        }
    }
}

fn validate_cattprint(
    stored: &std::collections::BTreeMap<i64, ClaimValue>,
    supplied_type: i64,
    supplied_value: &str,
) -> Result<(), CatError> {
    let stored_type = stored
        .get(&0)
        .and_then(ClaimValue::as_integer)
        .ok_or(CatError::MalformedCatTprintClaim)?;
    let stored_value = stored
        .get(&1)
        .and_then(ClaimValue::as_text)
        .ok_or(CatError::MalformedCatTprintClaim)?;
    if stored_type == supplied_type && stored_value.eq_ignore_ascii_case(supplied_value) {
        Ok(())
    } else {
        #[cfg(feature = "trace")]
        log::debug!("restriction: cattprint mismatch");
        Err(CatError::InvalidTlsFingerprintClaim)
    }
}

/// Run the restriction pass, in the order mandated by the pipeline: issuer, expiration,
/// audience, not-before, CATU, CATM, CATREPLAY, CATTPRINT. Any restriction claim present in
/// the token that this verifier has no check for causes failure (fail-closed), except the
/// claims explicitly modeled here.
pub fn validate(claims: &Claims, ctx: &RequestContext) -> Result<(), CatError> {
    #[cfg(feature = "trace")]
    log::trace!("restriction: beginning validation pass");

    // (a) issuer, required.
    match claims.iss() {
        Some(iss) if iss == ctx.issuer => {}
        Some(_) => return Err(CatError::InvalidIssuer),
        None => return Err(CatError::RequiredClaimMissing("iss")),
    }

    // (b) expiration.
    if let Some(exp) = claims.exp() {
        if ctx.now >= exp {
            return Err(CatError::TokenExpired);
        }
    }

    // (c) audience, only checked if caller supplied one.
    if let Some(audience) = ctx.audience {
        match claims.aud() {
            Some(aud) if aud == audience => {}
            _ => return Err(CatError::InvalidAudience),
        }
    }

    // (d) not-before.
    if let Some(nbf) = claims.nbf() {
        if ctx.now < nbf {
            return Err(CatError::TokenNotYetActive);
        }
    }

    // (e) CATU.
    if let Some(cat_u) = claims.cat_u() {
        if let Some(url) = ctx.url {
            validate_catu(cat_u, url)?;
        } else {
            return Err(CatError::UnsupportedRestrictionClaim("catu"));
        }
    }

    // (f) CATM.
    if let Some(cat_m) = claims.cat_m() {
        if let Some(method) = ctx.method {
            validate_catm(cat_m, method)?;
        } else {
            return Err(CatError::UnsupportedRestrictionClaim("catm"));
        }
    }

    // (g) CATREPLAY.
    if let Some(mode) = claims.cat_replay() {
        validate_catreplay(mode, ctx.seen_before)?;
    }

    // (h) CATTPRINT.
    if let Some(stored) = claims.cat_tprint() {
        match ctx.tls_fingerprint {
            Some((ty, val)) => validate_cattprint(stored, ty, val)?,
            None => return Err(CatError::UnsupportedRestrictionClaim("cattprint")),
        }
    }

    // Fail-closed on any other restriction claim this verifier does not interpret.
    for unsupported in [
        labels::CATPOR,
        labels::CATV,
        labels::CATNIP,
        labels::CATALPN,
        labels::CATH,
        labels::CATGEOISO3166,
        labels::CATGEOCOORD,
        labels::CATGEOALT,
        labels::CATTPK,
        labels::CATIFDATA,
        labels::CATDPOP,
        labels::CATIF,
        labels::CATR,
    ] {
        if claims.get_claim(unsupported).is_some() {
            return Err(CatError::UnsupportedRestrictionClaim(label_name(unsupported)));
        }
    }

    #[cfg(feature = "trace")]
    log::trace!("restriction: validation pass succeeded");
    Ok(())
}

fn label_name(label: u64) -> &'static str {
    match label {
        labels::CATPOR => "catpor",
        labels::CATV => "catv",
        labels::CATNIP => "catnip",
        labels::CATALPN => "catalpn",
        labels::CATH => "cath",
        labels::CATGEOISO3166 => "catgeoiso3166",
        labels::CATGEOCOORD => "catgeocoord",
        labels::CATGEOALT => "catgeoalt",
        labels::CATTPK => "cattpk",
        labels::CATIFDATA => "catifdata",
        labels::CATDPOP => "catdpop",
        labels::CATIF => "catif",
        labels::CATR => "catr",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn base_claims() -> Claims {
        let mut c = Claims::new();
        c.set_iss("eyevinn");
        c.set_sub("jane");
        c.set_aud("svc");
        c.set_iat(1_700_000_000);
        c.set_exp(1_700_000_120);
        c
    }

    #[test]
    fn happy_path() {
        let claims = base_claims();
        let ctx = RequestContext {
            now: 1_700_000_050,
            issuer: "eyevinn",
            audience: Some("svc"),
            ..Default::default()
        };
        validate(&claims, &ctx).unwrap();
    }

    #[test]
    fn expired_token_rejected() {
        let mut claims = base_claims();
        claims.set_exp(1_700_000_000);
        let ctx = RequestContext {
            now: 1_700_000_100,
            issuer: "eyevinn",
            ..Default::default()
        };
        assert_eq!(validate(&claims, &ctx), Err(CatError::TokenExpired));
    }

    #[test]
    fn wrong_issuer_rejected() {
        let claims = base_claims();
        let ctx = RequestContext {
            now: 1_700_000_050,
            issuer: "attacker",
            ..Default::default()
        };
        assert_eq!(validate(&claims, &ctx), Err(CatError::InvalidIssuer));
    }

    #[test]
    fn catu_suffix_host_matches() {
        let mut claims = base_claims();
        let mut host_rules = BTreeMap::new();
        host_rules.insert(2i64, ClaimValue::Text(".example.com".into())); // Suffix
        let mut scheme_rules = BTreeMap::new();
        scheme_rules.insert(0i64, ClaimValue::Text("https".into())); // Exact
        let mut cat_u = BTreeMap::new();
        cat_u.insert(1i64, ClaimValue::Map(host_rules)); // host
        cat_u.insert(0i64, ClaimValue::Map(scheme_rules)); // scheme
        claims.set_cat_u(cat_u);

        let ok_ctx = RequestContext {
            now: 1_700_000_050,
            issuer: "eyevinn",
            url: Some("https://api.example.com/x"),
            ..Default::default()
        };
        validate(&claims, &ok_ctx).unwrap();

        let wrong_scheme = RequestContext {
            url: Some("http://api.example.com/x"),
            ..ok_ctx.clone()
        };
        assert_eq!(validate(&claims, &wrong_scheme), Err(CatError::InvalidUriClaim));

        let wrong_host = RequestContext {
            url: Some("https://example.org/x"),
            ..ok_ctx
        };
        assert_eq!(validate(&claims, &wrong_host), Err(CatError::InvalidUriClaim));
    }

    #[test]
    fn catm_case_insensitive() {
        let mut claims = base_claims();
        claims.set_cat_m(&["GET", "POST"]);
        let ctx = RequestContext {
            now: 1_700_000_050,
            issuer: "eyevinn",
            method: Some("post"),
            ..Default::default()
        };
        validate(&claims, &ctx).unwrap();

        let bad_ctx = RequestContext {
            method: Some("DELETE"),
            ..ctx
        };
        assert_eq!(validate(&claims, &bad_ctx), Err(CatError::InvalidMethodClaim));
    }

    #[test]
    fn catreplay_prohibited() {
        let mut claims = base_claims();
        claims.set_cat_replay(1);
        let seen = RequestContext {
            now: 1_700_000_050,
            issuer: "eyevinn",
            seen_before: true,
            ..Default::default()
        };
        assert_eq!(validate(&claims, &seen), Err(CatError::TokenReplayProhibited));

        let unseen = RequestContext {
            seen_before: false,
            ..seen
        };
        validate(&claims, &unseen).unwrap();
    }

    #[test]
    fn cattprint_checks_type_and_value_case_insensitively() {
        let mut claims = base_claims();
        claims.set_cat_tprint(2, "t13d1516h2_8daaf6152771_b186095e22b6"); // JA4

        let ctx = RequestContext {
            now: 1_700_000_050,
            issuer: "eyevinn",
            tls_fingerprint: Some((2, "T13D1516H2_8DAAF6152771_B186095E22B6")),
            ..Default::default()
        };
        validate(&claims, &ctx).unwrap();

        let wrong_type = RequestContext {
            tls_fingerprint: Some((0, "t13d1516h2_8daaf6152771_b186095e22b6")),
            ..ctx
        };
        assert_eq!(validate(&claims, &wrong_type), Err(CatError::InvalidTlsFingerprintClaim));
    }
}
