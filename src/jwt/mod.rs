// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the cross-app-access project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Inspection-only JWT decoding
//!
//! This module decodes the header and payload segments of a compact JWT
//! without verifying its signature. The flow inspector displays what the
//! authorization servers actually issued; trust in those tokens comes from
//! the TLS channel of the exchange call that produced them, not from a local
//! signature check.
//!
//! Both decoders are total: any malformed input (wrong segment count, invalid
//! base64url, payload that is not a JSON object) yields `None`. They must
//! never panic or return an error, whatever the caller feeds them.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use log::debug;
use serde_json::Value;

/// A decoded token, header and claims side by side.
///
/// Derived data only: recomputed from the compact string on every read,
/// never stored in the session.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedToken {
    pub header: Value,
    pub claims: Value,
}

impl DecodedToken {
    /// Decode both segments of a compact JWT, `None` if either is malformed.
    pub fn from_compact(token: &str) -> Option<Self> {
        Some(Self {
            header: decode_header(token)?,
            claims: decode_claims(token)?,
        })
    }
}

/// Decode the header segment of a compact JWT without signature verification.
///
/// Returns `None` for anything that is not a three-segment token whose first
/// segment is base64url-encoded JSON object data.
pub fn decode_header(token: &str) -> Option<Value> {
    decode_segment(token, 0)
}

/// Decode the claims (payload) segment of a compact JWT without signature
/// verification. Same contract as [`decode_header`].
pub fn decode_claims(token: &str) -> Option<Value> {
    decode_segment(token, 1)
}

fn decode_segment(token: &str, index: usize) -> Option<Value> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        debug!(
            "JWT decode failed: expected 3 segments, found {}",
            segments.len()
        );
        return None;
    }

    let bytes = match URL_SAFE_NO_PAD.decode(segments[index]) {
        Ok(bytes) => bytes,
        Err(err) => {
            debug!("JWT decode failed: segment {} is not base64url: {}", index, err);
            return None;
        }
    };

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(value) if value.is_object() => Some(value),
        Ok(_) => {
            debug!("JWT decode failed: segment {} is not a JSON object", index);
            None
        }
        Err(err) => {
            debug!("JWT decode failed: segment {} is not valid JSON: {}", index, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encode_segment(value: &Value) -> String {
        URL_SAFE_NO_PAD.encode(value.to_string())
    }

    fn make_token(header: &Value, claims: &Value) -> String {
        format!(
            "{}.{}.signature-not-checked",
            encode_segment(header),
            encode_segment(claims)
        )
    }

    #[test]
    fn decodes_well_formed_token() {
        let header = json!({"alg": "RS256", "typ": "JWT", "kid": "key-1"});
        let claims = json!({"sub": "user-42", "aud": "https://resource.example.com/"});
        let token = make_token(&header, &claims);

        assert_eq!(decode_header(&token), Some(header.clone()));
        assert_eq!(decode_claims(&token), Some(claims.clone()));
        assert_eq!(
            DecodedToken::from_compact(&token),
            Some(DecodedToken { header, claims })
        );
    }

    #[test]
    fn rejects_wrong_segment_count() {
        let header = json!({"alg": "none"});
        let one = encode_segment(&header);
        for token in [
            "",
            "noseparators",
            one.as_str(),
            &format!("{}.{}", one, one),
            &format!("{}.{}.{}.{}", one, one, one, one),
        ] {
            assert_eq!(decode_header(token), None, "token: {:?}", token);
            assert_eq!(decode_claims(token), None, "token: {:?}", token);
        }
    }

    #[test]
    fn rejects_invalid_base64url() {
        // '!' and '+' are outside the base64url alphabet
        let token = "not!base64.also+bad.sig";
        assert_eq!(decode_header(token), None);
        assert_eq!(decode_claims(token), None);
    }

    #[test]
    fn rejects_non_json_and_non_object_segments() {
        let not_json = URL_SAFE_NO_PAD.encode("this is not json");
        let array = URL_SAFE_NO_PAD.encode("[1,2,3]");
        let object = encode_segment(&json!({"alg": "none"}));

        let token = format!("{}.{}.sig", not_json, object);
        assert_eq!(decode_header(&token), None);
        assert_eq!(decode_claims(&token), Some(json!({"alg": "none"})));

        let token = format!("{}.{}.sig", object, array);
        assert_eq!(decode_claims(&token), None);
        assert_eq!(decode_header(&token), Some(json!({"alg": "none"})));
    }

    #[test]
    fn round_trips_generated_claim_sets() {
        // Light property check: varied shapes and values must survive the
        // encode/decode cycle untouched.
        for i in 0..32u32 {
            let header = json!({
                "alg": if i % 2 == 0 { "RS256" } else { "HS256" },
                "typ": "JWT",
                "kid": format!("kid-{}", i),
            });
            let claims = json!({
                "sub": format!("user-{}", i),
                "iat": 1_700_000_000u64 + u64::from(i),
                "nested": { "index": i, "flag": i % 3 == 0 },
                "scopes": (0..i % 5).map(|n| format!("scope:{}", n)).collect::<Vec<_>>(),
            });
            let token = make_token(&header, &claims);
            assert_eq!(decode_header(&token), Some(header));
            assert_eq!(decode_claims(&token), Some(claims));
        }
    }

    #[test]
    fn decoding_is_pure() {
        let token = make_token(&json!({"alg": "none"}), &json!({"sub": "x"}));
        assert_eq!(decode_claims(&token), decode_claims(&token));
    }
}
