//! # JSON Web Algorithms (JWA)
//!
//! JWA ([RFC7518]) defines the cryptographic algorithms used with JWS
//! ([RFC7515]), JWE ([RFC7516]), and JWK ([RFC7517]). This module is the
//! engine's algorithm registry: a pure lookup table mapping algorithm
//! identifiers to the key type, key size and curve they require. Every other
//! component validates a (key, algorithm) pair here before any cryptographic
//! primitive runs.
//!
//! [RFC7515]: https://www.rfc-editor.org/rfc/rfc7515
//! [RFC7516]: https://www.rfc-editor.org/rfc/rfc7516
//! [RFC7517]: https://www.rfc-editor.org/rfc/rfc7517
//! [RFC7518]: https://www.rfc-editor.org/rfc/rfc7518

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::jose::jwk::{Curve, KeyType};

/// JWS signing algorithm.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum JwsAlgorithm {
    /// Unsecured JWS (empty signature segment).
    #[serde(rename = "none")]
    None,

    /// HMAC using SHA-256.
    HS256,
    /// HMAC using SHA-384.
    HS384,
    /// HMAC using SHA-512.
    HS512,

    /// RSASSA-PKCS1-v1_5 using SHA-256.
    #[default]
    RS256,
    /// RSASSA-PKCS1-v1_5 using SHA-384.
    RS384,
    /// RSASSA-PKCS1-v1_5 using SHA-512.
    RS512,

    /// RSASSA-PSS using SHA-256.
    PS256,
    /// RSASSA-PSS using SHA-384.
    PS384,
    /// RSASSA-PSS using SHA-512.
    PS512,

    /// ECDSA using P-256 and SHA-256.
    ES256,
    /// ECDSA using secp256k1 and SHA-256.
    ES256K,
    /// ECDSA using P-384 and SHA-384.
    ES384,
    /// ECDSA using P-521 and SHA-512.
    ES512,

    /// EdDSA using Ed25519.
    EdDSA,
}

impl JwsAlgorithm {
    /// The IANA algorithm identifier.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::HS256 => "HS256",
            Self::HS384 => "HS384",
            Self::HS512 => "HS512",
            Self::RS256 => "RS256",
            Self::RS384 => "RS384",
            Self::RS512 => "RS512",
            Self::PS256 => "PS256",
            Self::PS384 => "PS384",
            Self::PS512 => "PS512",
            Self::ES256 => "ES256",
            Self::ES256K => "ES256K",
            Self::ES384 => "ES384",
            Self::ES512 => "ES512",
            Self::EdDSA => "EdDSA",
        }
    }

    /// True for the HMAC family.
    #[must_use]
    pub const fn is_symmetric(self) -> bool {
        matches!(self, Self::HS256 | Self::HS384 | Self::HS512)
    }
}

impl Display for JwsAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for JwsAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "HS256" => Ok(Self::HS256),
            "HS384" => Ok(Self::HS384),
            "HS512" => Ok(Self::HS512),
            "RS256" => Ok(Self::RS256),
            "RS384" => Ok(Self::RS384),
            "RS512" => Ok(Self::RS512),
            "PS256" => Ok(Self::PS256),
            "PS384" => Ok(Self::PS384),
            "PS512" => Ok(Self::PS512),
            "ES256" => Ok(Self::ES256),
            "ES256K" => Ok(Self::ES256K),
            "ES384" => Ok(Self::ES384),
            "ES512" => Ok(Self::ES512),
            "EdDSA" => Ok(Self::EdDSA),
            _ => Err(Error::UnsupportedParameters(format!(
                "unrecognised JWS algorithm `{s}`"
            ))),
        }
    }
}

/// JWE key-management algorithm, used to wrap or agree the content
/// encryption key.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum JweAlgorithm {
    /// RSAES-PKCS1-v1_5 key encryption.
    #[serde(rename = "RSA1_5")]
    Rsa1_5,

    /// RSAES-OAEP using SHA-1 (the RFC 7518 default).
    #[default]
    #[serde(rename = "RSA-OAEP")]
    RsaOaep,

    /// RSAES-OAEP using SHA-256.
    #[serde(rename = "RSA-OAEP-256")]
    RsaOaep256,

    /// AES-128 key wrap.
    #[serde(rename = "A128KW")]
    A128Kw,
    /// AES-192 key wrap.
    #[serde(rename = "A192KW")]
    A192Kw,
    /// AES-256 key wrap.
    #[serde(rename = "A256KW")]
    A256Kw,

    /// Direct use of a shared symmetric key as the CEK.
    #[serde(rename = "dir")]
    Dir,
}

impl JweAlgorithm {
    /// The IANA algorithm identifier.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rsa1_5 => "RSA1_5",
            Self::RsaOaep => "RSA-OAEP",
            Self::RsaOaep256 => "RSA-OAEP-256",
            Self::A128Kw => "A128KW",
            Self::A192Kw => "A192KW",
            Self::A256Kw => "A256KW",
            Self::Dir => "dir",
        }
    }

    /// Key-wrap key length in bytes for the AES-KW family.
    #[must_use]
    pub const fn kek_len(self) -> Option<usize> {
        match self {
            Self::A128Kw => Some(16),
            Self::A192Kw => Some(24),
            Self::A256Kw => Some(32),
            _ => None,
        }
    }
}

impl Display for JweAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for JweAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RSA1_5" => Ok(Self::Rsa1_5),
            "RSA-OAEP" => Ok(Self::RsaOaep),
            "RSA-OAEP-256" => Ok(Self::RsaOaep256),
            "A128KW" => Ok(Self::A128Kw),
            "A192KW" => Ok(Self::A192Kw),
            "A256KW" => Ok(Self::A256Kw),
            "dir" => Ok(Self::Dir),
            _ => Err(Error::UnsupportedParameters(format!(
                "unrecognised JWE key-management algorithm `{s}`"
            ))),
        }
    }
}

/// JWE content-encryption method. MUST be an AEAD algorithm.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum EncryptionMethod {
    /// AES-128-CBC with HMAC-SHA-256 composite AEAD.
    #[serde(rename = "A128CBC-HS256")]
    A128CbcHs256,
    /// AES-192-CBC with HMAC-SHA-384 composite AEAD.
    #[serde(rename = "A192CBC-HS384")]
    A192CbcHs384,
    /// AES-256-CBC with HMAC-SHA-512 composite AEAD.
    #[serde(rename = "A256CBC-HS512")]
    A256CbcHs512,

    /// AES in Galois/Counter Mode using a 128-bit key.
    #[default]
    #[serde(rename = "A128GCM")]
    A128Gcm,
    /// AES in Galois/Counter Mode using a 192-bit key.
    #[serde(rename = "A192GCM")]
    A192Gcm,
    /// AES in Galois/Counter Mode using a 256-bit key.
    #[serde(rename = "A256GCM")]
    A256Gcm,
}

impl EncryptionMethod {
    /// The IANA method identifier.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::A128CbcHs256 => "A128CBC-HS256",
            Self::A192CbcHs384 => "A192CBC-HS384",
            Self::A256CbcHs512 => "A256CBC-HS512",
            Self::A128Gcm => "A128GCM",
            Self::A192Gcm => "A192GCM",
            Self::A256Gcm => "A256GCM",
        }
    }

    /// Content-encryption key length in bytes. CBC composites consume a
    /// double-length key (MAC half + AES half).
    #[must_use]
    pub const fn cek_len(self) -> usize {
        match self {
            Self::A128Gcm => 16,
            Self::A192Gcm => 24,
            Self::A128CbcHs256 | Self::A256Gcm => 32,
            Self::A192CbcHs384 => 48,
            Self::A256CbcHs512 => 64,
        }
    }

    /// Initialization vector length in bytes.
    #[must_use]
    pub const fn iv_len(self) -> usize {
        match self {
            Self::A128Gcm | Self::A192Gcm | Self::A256Gcm => 12,
            _ => 16,
        }
    }
}

impl Display for EncryptionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for EncryptionMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A128CBC-HS256" => Ok(Self::A128CbcHs256),
            "A192CBC-HS384" => Ok(Self::A192CbcHs384),
            "A256CBC-HS512" => Ok(Self::A256CbcHs512),
            "A128GCM" => Ok(Self::A128Gcm),
            "A192GCM" => Ok(Self::A192Gcm),
            "A256GCM" => Ok(Self::A256Gcm),
            _ => Err(Error::UnsupportedParameters(format!(
                "unrecognised JWE content-encryption method `{s}`"
            ))),
        }
    }
}

/// What a signing algorithm requires of its key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyRequirement {
    /// No key at all (`none`).
    None,

    /// An octet-sequence key of at least this many bits.
    Oct {
        /// Minimum key size in bits.
        min_bits: usize,
    },

    /// An RSA key with at least this modulus size.
    Rsa {
        /// Minimum modulus size in bits.
        min_modulus_bits: usize,
    },

    /// An elliptic-curve key on exactly this curve.
    Ec {
        /// Required curve.
        curve: Curve,
    },

    /// An octet key pair on exactly this curve.
    Okp {
        /// Required curve.
        curve: Curve,
    },
}

/// Key requirements for a JWS algorithm.
#[must_use]
pub const fn requirements_of(alg: JwsAlgorithm) -> KeyRequirement {
    match alg {
        JwsAlgorithm::None => KeyRequirement::None,
        JwsAlgorithm::HS256 => KeyRequirement::Oct { min_bits: 256 },
        JwsAlgorithm::HS384 => KeyRequirement::Oct { min_bits: 384 },
        JwsAlgorithm::HS512 => KeyRequirement::Oct { min_bits: 512 },
        JwsAlgorithm::RS256
        | JwsAlgorithm::RS384
        | JwsAlgorithm::RS512
        | JwsAlgorithm::PS256
        | JwsAlgorithm::PS384
        | JwsAlgorithm::PS512 => KeyRequirement::Rsa { min_modulus_bits: 2048 },
        JwsAlgorithm::ES256 => KeyRequirement::Ec { curve: Curve::P256 },
        JwsAlgorithm::ES256K => KeyRequirement::Ec { curve: Curve::Secp256k1 },
        JwsAlgorithm::ES384 => KeyRequirement::Ec { curve: Curve::P384 },
        JwsAlgorithm::ES512 => KeyRequirement::Ec { curve: Curve::P521 },
        JwsAlgorithm::EdDSA => KeyRequirement::Okp { curve: Curve::Ed25519 },
    }
}

/// Signing algorithms valid for a key type, in preference order.
#[must_use]
pub fn signing_algorithms_for(kty: KeyType) -> &'static [JwsAlgorithm] {
    match kty {
        KeyType::Oct => &[JwsAlgorithm::HS256, JwsAlgorithm::HS384, JwsAlgorithm::HS512],
        KeyType::Rsa => &[
            JwsAlgorithm::RS256,
            JwsAlgorithm::RS384,
            JwsAlgorithm::RS512,
            JwsAlgorithm::PS256,
            JwsAlgorithm::PS384,
            JwsAlgorithm::PS512,
        ],
        KeyType::Ec => &[
            JwsAlgorithm::ES256,
            JwsAlgorithm::ES256K,
            JwsAlgorithm::ES384,
            JwsAlgorithm::ES512,
        ],
        KeyType::Okp => &[JwsAlgorithm::EdDSA],
    }
}

/// Key-management algorithms valid for a key type, in preference order.
#[must_use]
pub fn key_management_algorithms_for(kty: KeyType) -> &'static [JweAlgorithm] {
    match kty {
        KeyType::Rsa => &[JweAlgorithm::Rsa1_5, JweAlgorithm::RsaOaep, JweAlgorithm::RsaOaep256],
        KeyType::Oct => &[
            JweAlgorithm::A128Kw,
            JweAlgorithm::A192Kw,
            JweAlgorithm::A256Kw,
            JweAlgorithm::Dir,
        ],
        KeyType::Ec | KeyType::Okp => &[],
    }
}

/// All supported content-encryption methods, in registry order.
#[must_use]
pub fn content_encryption_methods() -> &'static [EncryptionMethod] {
    &[
        EncryptionMethod::A128CbcHs256,
        EncryptionMethod::A192CbcHs384,
        EncryptionMethod::A256CbcHs512,
        EncryptionMethod::A128Gcm,
        EncryptionMethod::A192Gcm,
        EncryptionMethod::A256Gcm,
    ]
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn algorithm_names_round_trip() {
        for alg in signing_algorithms_for(KeyType::Rsa) {
            assert_eq!(alg.name().parse::<JwsAlgorithm>().unwrap(), *alg);
        }
        assert_eq!("none".parse::<JwsAlgorithm>().unwrap(), JwsAlgorithm::None);
        assert!("XS256".parse::<JwsAlgorithm>().is_err());
    }

    #[test]
    fn es_algorithms_pin_curves() {
        assert_eq!(
            requirements_of(JwsAlgorithm::ES256),
            KeyRequirement::Ec { curve: Curve::P256 }
        );
        assert_eq!(
            requirements_of(JwsAlgorithm::ES512),
            KeyRequirement::Ec { curve: Curve::P521 }
        );
    }

    #[test]
    fn okp_keys_sign_with_eddsa_only() {
        assert_eq!(signing_algorithms_for(KeyType::Okp), &[JwsAlgorithm::EdDSA]);
        assert!(key_management_algorithms_for(KeyType::Okp).is_empty());
    }

    #[test]
    fn cbc_methods_use_double_length_keys() {
        assert_eq!(EncryptionMethod::A128CbcHs256.cek_len(), 32);
        assert_eq!(EncryptionMethod::A256CbcHs512.cek_len(), 64);
        assert_eq!(EncryptionMethod::A128Gcm.cek_len(), 16);
    }
}
