//! # Key Model
//!
//! Typed representation of cryptographic keys across the four JOSE key
//! types (RSA, EC, oct, OKP), with generation and JWK import/export. Key
//! material is a tagged variant so algorithm/key compatibility checks stay
//! exhaustive and centrally verifiable in the registry, rather than spread
//! across a type hierarchy.
//!
//! A key may be public-only; symmetric keys have no public/private split.
//! PEM import/export lives in [`pem`], the shared collection in [`store`].

pub mod pem;
pub mod store;

use base64ct::{Base64UrlUnpadded as Base64, Encoding};
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::pkcs1::der::Decode;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};

use crate::error::{Error, Result};
use crate::jose::jwa::{self, JwsAlgorithm, KeyRequirement};
use crate::jose::jwk::{Curve, Jwk, KeyType, KeyUse};

/// A cryptographic key with a store-unique identifier.
#[derive(Clone, Debug)]
pub struct Key {
    id: String,
    use_: Option<KeyUse>,
    alg: Option<String>,
    material: KeyMaterial,
}

/// Per-type key material.
#[derive(Clone, Debug)]
pub enum KeyMaterial {
    /// RSA key pair, private half optional.
    Rsa {
        /// Public key (always present).
        public: RsaPublicKey,
        /// Private key, if the key is not public-only.
        private: Option<RsaPrivateKey>,
    },

    /// Elliptic-curve key pair as raw field bytes; typed curve keys are
    /// built at the point of use.
    Ec {
        /// Curve the point lies on.
        curve: Curve,
        /// X coordinate, fixed field width.
        x: Vec<u8>,
        /// Y coordinate, fixed field width.
        y: Vec<u8>,
        /// Private scalar, if present.
        d: Option<Vec<u8>>,
    },

    /// Octet sequence (symmetric secret).
    Oct {
        /// The secret bytes.
        k: Vec<u8>,
    },

    /// Octet key pair (Ed25519 signing or X25519 agreement).
    Okp {
        /// Curve.
        curve: Curve,
        /// Public key bytes.
        x: Vec<u8>,
        /// Private seed, if present.
        d: Option<Vec<u8>>,
    },
}

/// Parameters for fresh key generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyGenParams {
    /// RSA with the given modulus size in bits.
    Rsa {
        /// Modulus size in bits.
        bits: usize,
    },
    /// EC on the given curve.
    Ec {
        /// Curve.
        curve: Curve,
    },
    /// Symmetric octet sequence of the given size in bits.
    Oct {
        /// Key size in bits.
        bits: usize,
    },
    /// Octet key pair on the given curve.
    Okp {
        /// Curve (Ed25519 or X25519).
        curve: Curve,
    },
}

impl KeyGenParams {
    /// The key type these parameters produce.
    #[must_use]
    pub const fn key_type(&self) -> KeyType {
        match self {
            Self::Rsa { .. } => KeyType::Rsa,
            Self::Ec { .. } => KeyType::Ec,
            Self::Oct { .. } => KeyType::Oct,
            Self::Okp { .. } => KeyType::Okp,
        }
    }
}

impl Key {
    /// Create a key from parts. Used by import paths and tests; generation
    /// and import are the usual entry points.
    #[must_use]
    pub fn new(id: impl Into<String>, material: KeyMaterial) -> Self {
        Self { id: id.into(), use_: None, alg: None, material }
    }

    /// Generate a key with fresh material.
    ///
    /// When `alg` is given the size/curve is validated against that
    /// algorithm's registry requirements and recorded as the key's
    /// algorithm hint.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedParameters` if the size or curve is not
    /// permitted for the key type or the requested algorithm.
    pub fn generate(params: &KeyGenParams, alg: Option<JwsAlgorithm>) -> Result<Self> {
        tracing::debug!("generate {:?}", params.key_type());

        if let Some(alg) = alg {
            check_generation_params(params, alg)?;
        }

        let material = match *params {
            KeyGenParams::Rsa { bits } => {
                if !(512..=4096).contains(&bits) || bits % 8 != 0 {
                    return Err(Error::UnsupportedParameters(format!(
                        "RSA key size {bits} not permitted"
                    )));
                }
                let private = RsaPrivateKey::new(&mut OsRng, bits).map_err(|e| {
                    Error::UnsupportedParameters(format!("RSA generation failed: {e}"))
                })?;
                KeyMaterial::Rsa { public: private.to_public_key(), private: Some(private) }
            }
            KeyGenParams::Ec { curve } => generate_ec(curve)?,
            KeyGenParams::Oct { bits } => {
                if bits < 64 || bits % 8 != 0 {
                    return Err(Error::UnsupportedParameters(format!(
                        "octet key size {bits} not permitted"
                    )));
                }
                let mut k = vec![0u8; bits / 8];
                OsRng.fill_bytes(&mut k);
                KeyMaterial::Oct { k }
            }
            KeyGenParams::Okp { curve } => generate_okp(curve)?,
        };

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            use_: None,
            alg: alg.map(|a| a.name().to_string()),
            material,
        })
    }

    /// The key's identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Replace the key's identifier.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// The key's intended use, if restricted.
    #[must_use]
    pub const fn key_use(&self) -> Option<KeyUse> {
        self.use_
    }

    /// Restrict the key's intended use.
    pub fn set_key_use(&mut self, use_: Option<KeyUse>) {
        self.use_ = use_;
    }

    /// The key's algorithm hint, if any.
    #[must_use]
    pub fn algorithm_hint(&self) -> Option<&str> {
        self.alg.as_deref()
    }

    /// The key's material.
    #[must_use]
    pub const fn material(&self) -> &KeyMaterial {
        &self.material
    }

    /// The JOSE key type.
    #[must_use]
    pub const fn key_type(&self) -> KeyType {
        match self.material {
            KeyMaterial::Rsa { .. } => KeyType::Rsa,
            KeyMaterial::Ec { .. } => KeyType::Ec,
            KeyMaterial::Oct { .. } => KeyType::Oct,
            KeyMaterial::Okp { .. } => KeyType::Okp,
        }
    }

    /// True if the key carries private (or symmetric) material and can sign
    /// or decrypt.
    #[must_use]
    pub const fn is_private(&self) -> bool {
        match &self.material {
            KeyMaterial::Rsa { private, .. } => private.is_some(),
            KeyMaterial::Ec { d, .. } | KeyMaterial::Okp { d, .. } => d.is_some(),
            KeyMaterial::Oct { .. } => true,
        }
    }

    /// True if the key has a public form (asymmetric types).
    #[must_use]
    pub const fn has_public(&self) -> bool {
        !matches!(self.material, KeyMaterial::Oct { .. })
    }

    /// Short human-readable description, e.g. `RSA 2048` or `P-256`.
    #[must_use]
    pub fn description(&self) -> String {
        match &self.material {
            KeyMaterial::Rsa { public, .. } => format!("RSA {}", public.size() * 8),
            KeyMaterial::Ec { curve, .. } | KeyMaterial::Okp { curve, .. } => curve.to_string(),
            KeyMaterial::Oct { k } => format!("oct {}", k.len() * 8),
        }
    }

    /// Import a key from JWK JSON text.
    ///
    /// # Errors
    ///
    /// Returns `MalformedKeyMaterial` if the text is not valid JWK JSON or
    /// the material fields are inconsistent, and `UnsupportedKeyType` if
    /// `kty` names a type the engine does not support.
    pub fn import_jwk(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| Error::MalformedKeyMaterial(format!("invalid JWK JSON: {e}")))?;

        let Some(kty) = value.get("kty").and_then(serde_json::Value::as_str) else {
            return Err(Error::MalformedKeyMaterial("JWK has no `kty` member".into()));
        };
        if !matches!(kty, "RSA" | "EC" | "oct" | "OKP") {
            return Err(Error::UnsupportedKeyType(format!("kty `{kty}`")));
        }

        let jwk: Jwk = serde_json::from_value(value)
            .map_err(|e| Error::MalformedKeyMaterial(format!("invalid JWK: {e}")))?;
        Self::from_jwk(&jwk)
    }

    /// Build a key from a parsed JWK.
    ///
    /// # Errors
    ///
    /// Returns `MalformedKeyMaterial` if required material fields are
    /// missing or inconsistent with `kty`.
    pub fn from_jwk(jwk: &Jwk) -> Result<Self> {
        let material = match jwk.kty {
            KeyType::Rsa => rsa_from_jwk(jwk)?,
            KeyType::Ec => ec_from_jwk(jwk)?,
            KeyType::Oct => {
                let k = decode_field(jwk.k.as_deref(), "k")?;
                KeyMaterial::Oct { k }
            }
            KeyType::Okp => okp_from_jwk(jwk)?,
        };

        Ok(Self {
            id: jwk.kid.clone().unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            use_: jwk.use_,
            alg: jwk.alg.clone(),
            material,
        })
    }

    /// Export the key as a JWK.
    ///
    /// With `include_private = false` the private material of an asymmetric
    /// key is stripped.
    ///
    /// # Errors
    ///
    /// Returns `NoPublicMaterial` when asked for the public form of a
    /// symmetric key, which has none.
    pub fn to_jwk(&self, include_private: bool) -> Result<Jwk> {
        let mut jwk = Jwk {
            kid: Some(self.id.clone()),
            kty: self.key_type(),
            use_: self.use_,
            alg: self.alg.clone(),
            ..Jwk::default()
        };

        match &self.material {
            KeyMaterial::Oct { k } => {
                if !include_private {
                    return Err(Error::NoPublicMaterial(
                        "a symmetric key has no public form".into(),
                    ));
                }
                jwk.k = Some(Base64::encode_string(k));
            }
            KeyMaterial::Rsa { public, private } => {
                jwk.n = Some(Base64::encode_string(&public.n().to_bytes_be()));
                jwk.e = Some(Base64::encode_string(&public.e().to_bytes_be()));
                if include_private {
                    if let Some(private) = private {
                        let parts = rsa_private_parts(private)?;
                        jwk.d = Some(Base64::encode_string(&parts.d));
                        jwk.p = Some(Base64::encode_string(&parts.p));
                        jwk.q = Some(Base64::encode_string(&parts.q));
                        jwk.dp = Some(Base64::encode_string(&parts.dp));
                        jwk.dq = Some(Base64::encode_string(&parts.dq));
                        jwk.qi = Some(Base64::encode_string(&parts.qi));
                    }
                }
            }
            KeyMaterial::Ec { curve, x, y, d } => {
                jwk.crv = Some(*curve);
                jwk.x = Some(Base64::encode_string(x));
                jwk.y = Some(Base64::encode_string(y));
                if include_private {
                    if let Some(d) = d {
                        jwk.d = Some(Base64::encode_string(d));
                    }
                }
            }
            KeyMaterial::Okp { curve, x, d } => {
                jwk.crv = Some(*curve);
                jwk.x = Some(Base64::encode_string(x));
                if include_private {
                    if let Some(d) = d {
                        jwk.d = Some(Base64::encode_string(d));
                    }
                }
            }
        }

        Ok(jwk)
    }

    /// Export as JWK JSON text.
    ///
    /// # Errors
    ///
    /// As [`Key::to_jwk`].
    pub fn export_jwk(&self, include_private: bool) -> Result<String> {
        let jwk = self.to_jwk(include_private)?;
        serde_json::to_string(&jwk)
            .map_err(|e| Error::MalformedKeyMaterial(format!("JWK serialization failed: {e}")))
    }

    /// The key with private material stripped.
    ///
    /// # Errors
    ///
    /// Returns `NoPublicMaterial` for symmetric keys.
    pub fn public_only(&self) -> Result<Self> {
        let material = match &self.material {
            KeyMaterial::Oct { .. } => {
                return Err(Error::NoPublicMaterial("a symmetric key has no public form".into()))
            }
            KeyMaterial::Rsa { public, .. } => {
                KeyMaterial::Rsa { public: public.clone(), private: None }
            }
            KeyMaterial::Ec { curve, x, y, .. } => {
                KeyMaterial::Ec { curve: *curve, x: x.clone(), y: y.clone(), d: None }
            }
            KeyMaterial::Okp { curve, x, .. } => {
                KeyMaterial::Okp { curve: *curve, x: x.clone(), d: None }
            }
        };

        Ok(Self {
            id: self.id.clone(),
            use_: self.use_,
            alg: self.alg.clone(),
            material,
        })
    }

    /// Does this key satisfy an algorithm's registry requirement?
    #[must_use]
    pub fn satisfies(&self, requirement: &KeyRequirement) -> bool {
        match (requirement, &self.material) {
            (KeyRequirement::None, _) => true,
            (KeyRequirement::Oct { .. }, KeyMaterial::Oct { .. }) => true,
            (KeyRequirement::Rsa { .. }, KeyMaterial::Rsa { .. }) => true,
            (KeyRequirement::Ec { curve }, KeyMaterial::Ec { curve: have, .. })
            | (KeyRequirement::Okp { curve }, KeyMaterial::Okp { curve: have, .. }) => {
                curve == have
            }
            _ => false,
        }
    }

    /// Signing algorithms this key can be used with, honouring the key's
    /// curve and the registry's per-type tables.
    #[must_use]
    pub fn signing_algorithms(&self) -> Vec<JwsAlgorithm> {
        jwa::signing_algorithms_for(self.key_type())
            .iter()
            .copied()
            .filter(|alg| self.satisfies(&jwa::requirements_of(*alg)))
            .collect()
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.id, self.description())
    }
}

// ---- generation helpers ----

fn check_generation_params(params: &KeyGenParams, alg: JwsAlgorithm) -> Result<()> {
    let ok = match (jwa::requirements_of(alg), params) {
        (KeyRequirement::None, _) => false,
        (KeyRequirement::Oct { min_bits }, KeyGenParams::Oct { bits }) => *bits >= min_bits,
        (KeyRequirement::Rsa { .. }, KeyGenParams::Rsa { bits }) => *bits >= 512,
        (KeyRequirement::Ec { curve }, KeyGenParams::Ec { curve: have })
        | (KeyRequirement::Okp { curve }, KeyGenParams::Okp { curve: have }) => curve == *have,
        _ => false,
    };

    if ok {
        Ok(())
    } else {
        Err(Error::UnsupportedParameters(format!(
            "parameters {params:?} not permitted for algorithm {alg}"
        )))
    }
}

fn generate_ec(curve: Curve) -> Result<KeyMaterial> {
    use p256::elliptic_curve::sec1::ToEncodedPoint;

    // Uncompressed SEC1 encoding is 0x04 || x || y.
    macro_rules! ec_material {
        ($crate_:ident) => {{
            let secret = $crate_::SecretKey::random(&mut OsRng);
            let point = secret.public_key().to_encoded_point(false);
            let (Some(x), Some(y)) = (point.x(), point.y()) else {
                return Err(Error::MalformedKeyMaterial("EC point has no coordinates".into()));
            };
            (x.to_vec(), y.to_vec(), secret.to_bytes().to_vec())
        }};
    }

    let (x, y, d) = match curve {
        Curve::P256 => ec_material!(p256),
        Curve::P384 => ec_material!(p384),
        Curve::P521 => ec_material!(p521),
        Curve::Secp256k1 => ec_material!(k256),
        Curve::Ed25519 | Curve::X25519 => {
            return Err(Error::UnsupportedParameters(format!(
                "curve {curve} is not an EC curve"
            )))
        }
    };

    Ok(KeyMaterial::Ec { curve, x, y, d: Some(d) })
}

fn generate_okp(curve: Curve) -> Result<KeyMaterial> {
    match curve {
        Curve::Ed25519 => {
            let signing = ed25519_dalek::SigningKey::generate(&mut OsRng);
            Ok(KeyMaterial::Okp {
                curve,
                x: signing.verifying_key().to_bytes().to_vec(),
                d: Some(signing.to_bytes().to_vec()),
            })
        }
        Curve::X25519 => {
            let secret = x25519_dalek::StaticSecret::random_from_rng(OsRng);
            Ok(KeyMaterial::Okp {
                curve,
                x: x25519_dalek::PublicKey::from(&secret).as_bytes().to_vec(),
                d: Some(secret.to_bytes().to_vec()),
            })
        }
        _ => Err(Error::UnsupportedParameters(format!("curve {curve} is not an OKP curve"))),
    }
}

// ---- JWK material helpers ----

fn decode_field(field: Option<&str>, name: &str) -> Result<Vec<u8>> {
    let Some(text) = field else {
        return Err(Error::MalformedKeyMaterial(format!("JWK has no `{name}` member")));
    };
    Base64::decode_vec(text)
        .map_err(|e| Error::MalformedKeyMaterial(format!("invalid base64url in `{name}`: {e}")))
}

fn rsa_from_jwk(jwk: &Jwk) -> Result<KeyMaterial> {
    let n = BigUint::from_bytes_be(&decode_field(jwk.n.as_deref(), "n")?);
    let e = BigUint::from_bytes_be(&decode_field(jwk.e.as_deref(), "e")?);

    let public = RsaPublicKey::new(n.clone(), e.clone())
        .map_err(|e| Error::MalformedKeyMaterial(format!("invalid RSA public key: {e}")))?;

    let private = if jwk.d.is_some() {
        let d = BigUint::from_bytes_be(&decode_field(jwk.d.as_deref(), "d")?);
        let primes = match (&jwk.p, &jwk.q) {
            (Some(_), Some(_)) => vec![
                BigUint::from_bytes_be(&decode_field(jwk.p.as_deref(), "p")?),
                BigUint::from_bytes_be(&decode_field(jwk.q.as_deref(), "q")?),
            ],
            // from_components recovers the primes from (n, e, d)
            _ => vec![],
        };
        let mut private = RsaPrivateKey::from_components(n, e, d, primes)
            .map_err(|e| Error::MalformedKeyMaterial(format!("invalid RSA private key: {e}")))?;
        private.precompute().map_err(|e| {
            Error::MalformedKeyMaterial(format!("RSA CRT precomputation failed: {e}"))
        })?;
        Some(private)
    } else {
        None
    };

    Ok(KeyMaterial::Rsa { public, private })
}

fn ec_from_jwk(jwk: &Jwk) -> Result<KeyMaterial> {
    let Some(curve) = jwk.crv else {
        return Err(Error::MalformedKeyMaterial("EC JWK has no `crv` member".into()));
    };
    if matches!(curve, Curve::Ed25519 | Curve::X25519) {
        return Err(Error::MalformedKeyMaterial(format!(
            "curve {curve} is inconsistent with kty `EC`"
        )));
    }

    let len = curve.field_len();
    let x = left_pad(decode_field(jwk.x.as_deref(), "x")?, len, "x")?;
    let y = left_pad(decode_field(jwk.y.as_deref(), "y")?, len, "y")?;
    let d = match jwk.d.as_deref() {
        Some(_) => Some(left_pad(decode_field(jwk.d.as_deref(), "d")?, len, "d")?),
        None => None,
    };

    Ok(KeyMaterial::Ec { curve, x, y, d })
}

fn okp_from_jwk(jwk: &Jwk) -> Result<KeyMaterial> {
    let Some(curve) = jwk.crv else {
        return Err(Error::MalformedKeyMaterial("OKP JWK has no `crv` member".into()));
    };
    if !matches!(curve, Curve::Ed25519 | Curve::X25519) {
        return Err(Error::MalformedKeyMaterial(format!(
            "curve {curve} is inconsistent with kty `OKP`"
        )));
    }

    let x = decode_field(jwk.x.as_deref(), "x")?;
    if x.len() != 32 {
        return Err(Error::MalformedKeyMaterial(format!(
            "OKP public key must be 32 bytes, got {}",
            x.len()
        )));
    }
    let d = match jwk.d.as_deref() {
        Some(_) => {
            let d = decode_field(jwk.d.as_deref(), "d")?;
            if d.len() != 32 {
                return Err(Error::MalformedKeyMaterial(format!(
                    "OKP private key must be 32 bytes, got {}",
                    d.len()
                )));
            }
            Some(d)
        }
        None => None,
    };

    Ok(KeyMaterial::Okp { curve, x, d })
}

fn left_pad(bytes: Vec<u8>, len: usize, name: &str) -> Result<Vec<u8>> {
    if bytes.len() == len {
        return Ok(bytes);
    }
    if bytes.len() > len {
        return Err(Error::MalformedKeyMaterial(format!(
            "`{name}` is longer than the curve field width"
        )));
    }
    let mut padded = vec![0u8; len - bytes.len()];
    padded.extend_from_slice(&bytes);
    Ok(padded)
}

// RSA private JWK fields, normalised through the PKCS#1 DER encoding so all
// CRT parameters are present with canonical (unpadded big-endian) bytes.
struct RsaPrivateJwkParts {
    d: Vec<u8>,
    p: Vec<u8>,
    q: Vec<u8>,
    dp: Vec<u8>,
    dq: Vec<u8>,
    qi: Vec<u8>,
}

fn rsa_private_parts(private: &RsaPrivateKey) -> Result<RsaPrivateJwkParts> {
    let doc = private
        .to_pkcs1_der()
        .map_err(|e| Error::MalformedKeyMaterial(format!("RSA encoding failed: {e}")))?;
    let der = rsa::pkcs1::RsaPrivateKey::from_der(doc.as_bytes())
        .map_err(|e| Error::MalformedKeyMaterial(format!("RSA encoding failed: {e}")))?;

    Ok(RsaPrivateJwkParts {
        d: der.private_exponent.as_bytes().to_vec(),
        p: der.prime1.as_bytes().to_vec(),
        q: der.prime2.as_bytes().to_vec(),
        dp: der.exponent1.as_bytes().to_vec(),
        dq: der.exponent2.as_bytes().to_vec(),
        qi: der.coefficient.as_bytes().to_vec(),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn oct_jwk_round_trip() {
        let key = Key::generate(&KeyGenParams::Oct { bits: 256 }, Some(JwsAlgorithm::HS256))
            .expect("should generate");
        assert_eq!(key.key_type(), KeyType::Oct);
        assert_eq!(key.algorithm_hint(), Some("HS256"));

        let jwk = key.to_jwk(true).expect("should export");
        let back = Key::from_jwk(&jwk).expect("should import");
        assert_eq!(back.id(), key.id());
        assert!(matches!(back.material(), KeyMaterial::Oct { .. }));
    }

    #[test]
    fn oct_key_has_no_public_form() {
        let key = Key::generate(&KeyGenParams::Oct { bits: 128 }, None).expect("should generate");
        assert!(matches!(key.to_jwk(false), Err(Error::NoPublicMaterial(_))));
        assert!(matches!(key.public_only(), Err(Error::NoPublicMaterial(_))));
    }

    #[test]
    fn undersized_oct_key_rejected_for_hs256() {
        let result = Key::generate(&KeyGenParams::Oct { bits: 128 }, Some(JwsAlgorithm::HS256));
        assert!(matches!(result, Err(Error::UnsupportedParameters(_))));
    }

    #[test]
    fn ec_public_export_strips_private_scalar() {
        let key = Key::generate(&KeyGenParams::Ec { curve: Curve::P256 }, None)
            .expect("should generate");
        assert!(key.is_private());

        let jwk = key.to_jwk(false).expect("should export");
        assert!(jwk.d.is_none());
        assert!(jwk.x.is_some() && jwk.y.is_some());

        let public = Key::from_jwk(&jwk).expect("should import");
        assert!(!public.is_private());
        assert!(public.has_public());
    }

    #[test]
    fn rsa_jwk_round_trip_preserves_private_material() {
        let key =
            Key::generate(&KeyGenParams::Rsa { bits: 1024 }, None).expect("should generate");
        let jwk = key.to_jwk(true).expect("should export");
        assert!(jwk.d.is_some() && jwk.p.is_some() && jwk.qi.is_some());

        let back = Key::from_jwk(&jwk).expect("should import");
        assert!(back.is_private());
        let KeyMaterial::Rsa { public, .. } = back.material() else {
            panic!("expected RSA material");
        };
        assert_eq!(public.size() * 8, 1024);
    }

    #[test]
    fn mismatched_curve_and_kty_rejected() {
        let json = r#"{"kty":"EC","crv":"Ed25519","x":"AA","y":"AA"}"#;
        assert!(matches!(Key::import_jwk(json), Err(Error::MalformedKeyMaterial(_))));
    }

    #[test]
    fn unknown_kty_is_unsupported() {
        let json = r#"{"kty":"QKD","x":"AA"}"#;
        assert!(matches!(Key::import_jwk(json), Err(Error::UnsupportedKeyType(_))));
    }

    #[test]
    fn signing_algorithms_follow_curve() {
        let key = Key::generate(&KeyGenParams::Ec { curve: Curve::P384 }, None)
            .expect("should generate");
        assert_eq!(key.signing_algorithms(), vec![JwsAlgorithm::ES384]);
    }
}
