//! Request signing: canonicalization, HMAC-SHA256 and verification.
//!
//! # Canonical form
//!
//! ```text
//! <body fields> <path params> x-route:<route>
//! ```
//!
//! Body fields and path params each render as `name:value` joined by `;`.
//! The three parts are concatenated with no separator between them, so a
//! request with body `{a:1}`, param `id=X` and route `r` signs
//! `a:1id:Xx-route:r`. Clients in the field compute exactly this string; any
//! change here breaks every deployed signer.
//!
//! The route label is whatever the client put in `x-route`. It is not checked
//! against the endpoint actually invoked.

use crate::domain::credentials::CredentialStore;
use crate::domain::error::AuthError;
use crate::domain::types::SharedSecret;
use hmac::{Hmac, Mac};
use serde_json::{Number, Value};
use sha2::Sha256;
use std::sync::Arc;
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the credential key
pub const KEY_HEADER: &str = "x-key";
/// Header carrying the route label
pub const ROUTE_HEADER: &str = "x-route";
/// Header carrying the hex signature
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Build the canonical string for a request.
///
/// `body` is the parsed JSON body, if any. Only top-level fields are
/// rendered; nested values use the coercion in [`render_value`].
pub fn canonical_string(body: Option<&Value>, params: &[(String, String)], route: &str) -> String {
    let mut data = body_part(body);
    data.push_str(
        &params
            .iter()
            .map(|(name, value)| format!("{}:{}", name, value))
            .collect::<Vec<_>>()
            .join(";"),
    );
    data.push_str("x-route:");
    data.push_str(route);
    data
}

fn body_part(body: Option<&Value>) -> String {
    let fields: Vec<String> = match body {
        Some(Value::Object(map)) => {
            // Index-like keys come first in ascending order, then the rest in
            // insertion order, matching JavaScript property enumeration
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by_key(|(name, _)| array_index(name).map_or(u64::MAX, u64::from));
            entries
                .into_iter()
                .map(|(name, value)| format!("{}:{}", name, render_value(value)))
                .collect()
        }
        // Array bodies sign their indices as field names
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(idx, value)| format!("{}:{}", idx, render_value(value)))
            .collect(),
        _ => Vec::new(),
    };
    fields.join(";")
}

/// `name` as a JavaScript array index: canonical decimal below `u32::MAX`.
fn array_index(name: &str) -> Option<u32> {
    let canonical = !name.is_empty()
        && name.bytes().all(|b| b.is_ascii_digit())
        && (name == "0" || !name.starts_with('0'));
    if !canonical {
        return None;
    }
    name.parse::<u32>().ok().filter(|idx| *idx != u32::MAX)
}

/// Render a field value the way a JavaScript template literal would.
///
/// Strings are raw, numbers use the shortest round-trip form (`1.0` is `1`),
/// arrays join their elements with `,` (null elements are empty) and objects
/// become `[object Object]`.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => render_number(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => render_value(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn render_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) => render_f64(f),
        None => n.to_string(),
    }
}

fn render_f64(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    let abs = f.abs();
    if (1e-6..1e21).contains(&abs) {
        // Display for f64 is shortest round-trip without exponent, `1` for 1.0
        return format!("{}", f);
    }
    let exp = format!("{:e}", f);
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{}e+{}", mantissa, power),
        _ => exp,
    }
}

/// HMAC-SHA256 of `data` under `secret`, lowercase hex
pub fn compute_signature(secret: &SharedSecret, data: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(data.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Signature a client must send in `x-signature` for this request.
pub fn sign_request(
    secret: &SharedSecret,
    route: &str,
    body: Option<&Value>,
    params: &[(String, String)],
) -> String {
    compute_signature(secret, &canonical_string(body, params, route))
}

/// Constant-time string comparison to prevent timing attacks.
///
/// Takes the same time regardless of how many leading bytes match. Lengths
/// are compared in constant time too.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    use subtle::ConstantTimeEq;

    let max_len = std::cmp::max(a.len(), b.len());

    // Different pad bytes so unequal lengths can never compare equal
    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];

    a_padded[..a.len()].copy_from_slice(a.as_bytes());
    b_padded[..b.len()].copy_from_slice(b.as_bytes());

    let lengths_equal = a.len().ct_eq(&b.len());
    let contents_equal = a_padded.ct_eq(&b_padded);

    (lengths_equal & contents_equal).into()
}

/// Everything the verifier needs from one request.
///
/// Header values are `None` when absent. Empty header values count as absent.
#[derive(Debug, Clone, Copy)]
pub struct SignedRequest<'a> {
    pub key: Option<&'a str>,
    pub route: Option<&'a str>,
    pub signature: Option<&'a str>,
    pub body: Option<&'a Value>,
    pub params: &'a [(String, String)],
}

/// Checks request signatures against registered credentials.
#[derive(Clone)]
pub struct SignatureVerifier {
    credentials: Arc<CredentialStore>,
}

impl SignatureVerifier {
    pub fn new(credentials: Arc<CredentialStore>) -> Self {
        Self { credentials }
    }

    /// Accept or reject `request`.
    ///
    /// Order matters: headers are checked before any secret lookup, and an
    /// unknown key is an authentication failure, not a fault.
    pub fn verify(&self, request: &SignedRequest<'_>) -> Result<(), AuthError> {
        fn present(v: Option<&str>) -> Option<&str> {
            v.filter(|s| !s.is_empty())
        }

        let (key, route, signature) = match (
            present(request.key),
            present(request.route),
            present(request.signature),
        ) {
            (Some(k), Some(r), Some(s)) => (k, r, s),
            _ => return Err(AuthError::MissingHeaders),
        };

        let secret = self.credentials.lookup(key).map_err(|_| {
            warn!(key = key, "Signature check failed - unknown credential");
            AuthError::UnknownCredential(key.to_string())
        })?;

        let data = canonical_string(request.body, request.params, route);
        let expected = compute_signature(&secret, &data);

        if !constant_time_compare(&expected, signature) {
            warn!(key = key, route = route, "Signature check failed - mismatch");
            return Err(AuthError::InvalidSignature);
        }

        debug!(key = key, route = route, "Signature verified");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn verifier_with(key: &str, secret: &str) -> SignatureVerifier {
        let store = Arc::new(CredentialStore::new());
        store.register(key, SharedSecret::new(secret)).unwrap();
        SignatureVerifier::new(store)
    }

    #[test]
    fn test_canonical_body_params_route() {
        let body = json!({ "msg": "hi", "tags": ["a", "b"] });
        let data = canonical_string(Some(&body), &params(&[("id", "X")]), "create");
        assert_eq!(data, "msg:hi;tags:a,bid:Xx-route:create");
    }

    #[test]
    fn test_canonical_keeps_body_field_order() {
        let body: Value = serde_json::from_str(r#"{"z":1,"a":2}"#).unwrap();
        assert_eq!(canonical_string(Some(&body), &[], "r"), "z:1;a:2x-route:r");
    }

    #[test]
    fn test_canonical_index_keys_first() {
        let body: Value = serde_json::from_str(r#"{"b":1,"10":"y","2":"x","a":3}"#).unwrap();
        assert_eq!(
            canonical_string(Some(&body), &[], "r"),
            "2:x;10:y;b:1;a:3x-route:r"
        );

        // Not indices: leading zero, sign, out of range
        let body: Value =
            serde_json::from_str(r#"{"z":0,"01":1,"-1":2,"4294967295":3,"0":4}"#).unwrap();
        assert_eq!(
            canonical_string(Some(&body), &[], "r"),
            "0:4;z:0;01:1;-1:2;4294967295:3x-route:r"
        );
    }

    #[test]
    fn test_canonical_empty_parts() {
        assert_eq!(canonical_string(None, &[], "r"), "x-route:r");
        assert_eq!(canonical_string(Some(&json!({})), &[], "r"), "x-route:r");
        assert_eq!(
            canonical_string(None, &params(&[("tag", "b"), ("page", "2")]), "search"),
            "tag:b;page:2x-route:search"
        );
    }

    #[test]
    fn test_render_values() {
        assert_eq!(render_value(&json!(1.0)), "1");
        assert_eq!(render_value(&json!(-2.5)), "-2.5");
        assert_eq!(render_value(&json!(42)), "42");
        assert_eq!(render_value(&json!(1e21)), "1e+21");
        assert_eq!(render_value(&json!(1.5e-7)), "1.5e-7");
        assert_eq!(render_value(&json!(true)), "true");
        assert_eq!(render_value(&json!(null)), "null");
        assert_eq!(render_value(&json!([1, null, "x", [2, 3]])), "1,,x,2,3");
        assert_eq!(render_value(&json!({ "nested": 1 })), "[object Object]");
    }

    #[test]
    fn test_array_body_uses_indices() {
        let body = json!(["a", "b"]);
        assert_eq!(canonical_string(Some(&body), &[], "r"), "0:a;1:bx-route:r");
    }

    #[test]
    fn test_signature_is_lowercase_hex() {
        let sig = compute_signature(&SharedSecret::new("key"), "data");
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_known_hmac_vector() {
        // Published HMAC-SHA256 example vector
        let sig = compute_signature(
            &SharedSecret::new("key"),
            "The quick brown fox jumps over the lazy dog",
        );
        assert_eq!(
            sig,
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }

    #[test]
    fn test_verify_accepts_valid_signature() {
        let verifier = verifier_with("alice", "s3cr3t");
        let body = json!({ "msg": "hi" });
        let p = params(&[("id", "42")]);
        let sig = sign_request(&SharedSecret::new("s3cr3t"), "get", Some(&body), &p);

        let request = SignedRequest {
            key: Some("alice"),
            route: Some("get"),
            signature: Some(&sig),
            body: Some(&body),
            params: &p,
        };
        assert_eq!(verifier.verify(&request), Ok(()));
    }

    #[test]
    fn test_verify_missing_headers_before_lookup() {
        let verifier = SignatureVerifier::new(Arc::new(CredentialStore::new()));
        let request = SignedRequest {
            key: Some("ghost"),
            route: None,
            signature: Some("00"),
            body: None,
            params: &[],
        };
        assert_eq!(verifier.verify(&request), Err(AuthError::MissingHeaders));

        let empty = SignedRequest {
            key: Some(""),
            route: Some("r"),
            signature: Some("00"),
            body: None,
            params: &[],
        };
        assert_eq!(verifier.verify(&empty), Err(AuthError::MissingHeaders));
    }

    #[test]
    fn test_verify_unknown_key() {
        let verifier = verifier_with("alice", "s3cr3t");
        let request = SignedRequest {
            key: Some("mallory"),
            route: Some("r"),
            signature: Some("deadbeef"),
            body: None,
            params: &[],
        };
        assert_eq!(
            verifier.verify(&request),
            Err(AuthError::UnknownCredential("mallory".into()))
        );
    }

    #[test]
    fn test_verify_rejects_uppercase_hex() {
        let verifier = verifier_with("alice", "s3cr3t");
        let sig = sign_request(&SharedSecret::new("s3cr3t"), "r", None, &[]).to_uppercase();
        let request = SignedRequest {
            key: Some("alice"),
            route: Some("r"),
            signature: Some(&sig),
            body: None,
            params: &[],
        };
        assert_eq!(verifier.verify(&request), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("secret", "secret"));
        assert!(!constant_time_compare("secret", "Secret"));
        assert!(!constant_time_compare("secret", "secre"));
        assert!(!constant_time_compare("secret", "secrets"));
        assert!(constant_time_compare("", ""));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn signature_is_deterministic(
                secret in "[a-zA-Z0-9]{1,32}",
                route in "[a-z_]{1,16}",
                value in "[ -~]{0,32}",
            ) {
                let body = json!({ "field": value });
                let secret = SharedSecret::new(secret);
                let a = sign_request(&secret, &route, Some(&body), &[]);
                let b = sign_request(&secret, &route, Some(&body), &[]);
                prop_assert_eq!(&a, &b);
                prop_assert_eq!(a, compute_signature(&secret, &format!("field:{}x-route:{}", value, route)));
            }

            #[test]
            fn tampering_fails_verification(
                value in "[a-z]{1,16}",
                param in "[a-z0-9]{1,16}",
                route in "[a-z]{1,16}",
                which in 0usize..3,
            ) {
                let verifier = verifier_with("alice", "s3cr3t");
                let body = json!({ "msg": value });
                let p = vec![("id".to_string(), param.clone())];
                let sig = sign_request(&SharedSecret::new("s3cr3t"), &route, Some(&body), &p);

                let mut tampered_body = body.clone();
                let mut tampered_params = p.clone();
                let mut tampered_route = route.clone();
                match which {
                    0 => tampered_body = json!({ "msg": format!("{}!", value) }),
                    1 => tampered_params[0].1.push('!'),
                    _ => tampered_route.push('!'),
                }

                let request = SignedRequest {
                    key: Some("alice"),
                    route: Some(&tampered_route),
                    signature: Some(&sig),
                    body: Some(&tampered_body),
                    params: &tampered_params,
                };
                prop_assert_eq!(verifier.verify(&request), Err(AuthError::InvalidSignature));
            }
        }
    }
}
