//! # JSON Web Key (JWK)
//!
//! A JWK ([RFC7517]) is a JSON representation of a cryptographic key, and a
//! JWK Set is a collection of JWKs. These are the wire structures used for
//! key import/export and for the `jwk` header claim; the engine's internal
//! key model lives in [`crate::keys`].
//!
//! [RFC7517]: https://www.rfc-editor.org/rfc/rfc7517

use serde::{Deserialize, Serialize};

/// JSON Web Key wire structure. Carries the union of the type-specific
/// material fields; which fields are meaningful depends on `kty`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Jwk {
    /// Key identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    /// Key type.
    pub kty: KeyType,

    /// Intended use of the key.
    #[serde(rename = "use")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_: Option<KeyUse>,

    /// Permitted key operations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_ops: Option<Vec<String>>,

    /// Algorithm intended for use with the key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,

    /// Cryptographic curve (EC and OKP keys).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crv: Option<Curve>,

    /// X coordinate (EC) or public key bytes (OKP), base64url.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,

    /// Y coordinate (EC), base64url.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,

    /// Private exponent (RSA), private scalar (EC) or private seed (OKP),
    /// base64url.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,

    /// RSA modulus, base64url.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,

    /// RSA public exponent, base64url.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,

    /// RSA first prime factor, base64url.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p: Option<String>,

    /// RSA second prime factor, base64url.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,

    /// RSA first CRT exponent, base64url.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dp: Option<String>,

    /// RSA second CRT exponent, base64url.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dq: Option<String>,

    /// RSA CRT coefficient, base64url.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qi: Option<String>,

    /// Symmetric key bytes, base64url.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k: Option<String>,
}

/// Cryptographic key type.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// RSA key pair.
    #[default]
    #[serde(rename = "RSA")]
    Rsa,

    /// Elliptic-curve key pair.
    #[serde(rename = "EC")]
    Ec,

    /// Octet sequence (symmetric).
    #[serde(rename = "oct")]
    Oct,

    /// Octet key pair (Edwards/Montgomery curves).
    #[serde(rename = "OKP")]
    Okp,
}

impl std::fmt::Display for KeyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Rsa => "RSA",
            Self::Ec => "EC",
            Self::Oct => "oct",
            Self::Okp => "OKP",
        };
        write!(f, "{name}")
    }
}

/// Cryptographic curve type.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum Curve {
    /// NIST P-256.
    #[default]
    #[serde(rename = "P-256")]
    P256,

    /// NIST P-384.
    #[serde(rename = "P-384")]
    P384,

    /// NIST P-521.
    #[serde(rename = "P-521")]
    P521,

    /// secp256k1.
    #[serde(rename = "secp256k1")]
    Secp256k1,

    /// Ed25519.
    Ed25519,

    /// X25519 (key agreement only).
    X25519,
}

impl std::fmt::Display for Curve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
            Self::Secp256k1 => "secp256k1",
            Self::Ed25519 => "Ed25519",
            Self::X25519 => "X25519",
        };
        write!(f, "{name}")
    }
}

impl Curve {
    /// Field element length in bytes (coordinate or scalar width).
    #[must_use]
    pub const fn field_len(self) -> usize {
        match self {
            Self::P256 | Self::Secp256k1 | Self::Ed25519 | Self::X25519 => 32,
            Self::P384 => 48,
            Self::P521 => 66,
        }
    }
}

/// The intended usage of a key.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum KeyUse {
    /// Signing and signature verification.
    #[default]
    #[serde(rename = "sig")]
    Signature,

    /// Encryption and decryption.
    #[serde(rename = "enc")]
    Encryption,
}

/// A set of JWKs, the `{"keys": [...]}` form.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct JwkSet {
    /// The member keys, in order.
    pub keys: Vec<Jwk>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ec_jwk_round_trips_with_sparse_fields() {
        let json = r#"{"kty":"EC","crv":"P-256","x":"gI0GAILBdu7T53akrFmMyGcsF3n5dO7MmwNBHKW5SV0","y":"SLW_xSffzlPWrHEVI30DHM_4egVwt3NQqeUD7nMFpps"}"#;
        let jwk: Jwk = serde_json::from_str(json).expect("should parse");
        assert_eq!(jwk.kty, KeyType::Ec);
        assert_eq!(jwk.crv, Some(Curve::P256));
        assert!(jwk.d.is_none());

        let out = serde_json::to_string(&jwk).expect("should serialize");
        assert!(!out.contains("\"d\""));
        assert!(!out.contains("\"n\""));
    }

    #[test]
    fn jwk_set_parses() {
        let json = r#"{"keys":[{"kty":"oct","k":"c2VjcmV0","kid":"hmac"}]}"#;
        let set: JwkSet = serde_json::from_str(json).expect("should parse");
        assert_eq!(set.keys.len(), 1);
        assert_eq!(set.keys[0].kid.as_deref(), Some("hmac"));
    }
}
