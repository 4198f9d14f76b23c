//! # JSON Web Signature (JWS)
//!
//! Signing and verification over a token's retained encoded segments
//! ([RFC7515]). Registry compatibility is checked before any primitive
//! runs; key sizes are deliberately not enforced at signing time so that
//! deliberately weak keys can be exercised against a target.
//!
//! [RFC7515]: https://www.rfc-editor.org/rfc/rfc7515

use base64ct::{Base64UrlUnpadded as Base64, Encoding};
use hmac::{Hmac, Mac};
use p256::ecdsa::signature::{Signer, Verifier};
use rand::rngs::OsRng;
use rsa::{Pkcs1v15Sign, Pss, RsaPrivateKey, RsaPublicKey};
use serde_json::json;
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::error::{Error, Result};
use crate::jose::jwa::{self, JwsAlgorithm};
use crate::jose::jwk::Curve;
use crate::keys::pem::sec1_point;
use crate::keys::{Key, KeyMaterial};
use crate::token::Jws;

/// How signing rewrites the protected header before computing the
/// signature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HeaderUpdate {
    /// Leave the header untouched, signature included over the original
    /// bytes.
    None,

    /// Set (or insert) the `alg` claim.
    Algorithm,

    /// Set `alg`, `typ: "JWT"` and `kid` from the signing key.
    #[default]
    Jwt,
}

/// Sign a JWS with the given key and algorithm, returning a new token.
/// The payload segment is carried over byte-for-byte; the header is
/// rewritten per `update`.
///
/// `alg = none` produces an empty signature segment and ignores the key.
///
/// # Errors
///
/// Returns `IncompatibleKeyAlgorithm` if the registry rejects the (key,
/// algorithm) pair and `KeyMaterialMissing` if the key has no private
/// material.
pub fn sign(jws: &Jws, key: &Key, alg: JwsAlgorithm, update: HeaderUpdate) -> Result<Jws> {
    tracing::debug!("sign with {alg}");

    let mut header = jws.header.clone();
    match update {
        HeaderUpdate::None => {}
        HeaderUpdate::Algorithm => header.set_claim("alg", json!(alg.name())),
        HeaderUpdate::Jwt => {
            header.set_claim("alg", json!(alg.name()));
            header.set_claim("typ", json!("JWT"));
            header.set_claim("kid", json!(key.id()));
        }
    }

    let unsigned = Jws::new(header, jws.payload.clone(), String::new());
    if alg == JwsAlgorithm::None {
        return Ok(unsigned);
    }

    if !key.satisfies(&jwa::requirements_of(alg)) {
        return Err(Error::IncompatibleKeyAlgorithm(format!(
            "{} key cannot sign {alg}",
            key.key_type()
        )));
    }
    if !key.is_private() {
        return Err(Error::KeyMaterialMissing(format!(
            "key `{}` has no private material",
            key.id()
        )));
    }

    let input = unsigned.signing_input();
    let signature = compute_signature(input.as_bytes(), key, alg)?;

    Ok(Jws::new(unsigned.header, unsigned.payload, Base64::encode_string(&signature)))
}

/// Verify a JWS signature against a key, over the token's retained
/// encoded segments.
///
/// Signature mismatch is `Ok(false)`, never an error. An `alg = none`
/// token verifies true exactly when its signature segment is empty.
///
/// # Errors
///
/// Returns `UnsupportedParameters` if the header's `alg` is not in the
/// registry and `IncompatibleKeyAlgorithm` if the key type cannot carry
/// that algorithm at all.
pub fn verify(jws: &Jws, key: &Key) -> Result<bool> {
    let Some(name) = jws.header.algorithm() else {
        return Err(Error::MalformedToken("header has no alg claim".into()));
    };
    let alg: JwsAlgorithm = name.parse()?;
    tracing::debug!("verify {alg}");

    if alg == JwsAlgorithm::None {
        return Ok(jws.signature.is_empty());
    }

    if !key.satisfies(&jwa::requirements_of(alg)) {
        return Err(Error::IncompatibleKeyAlgorithm(format!(
            "{} key cannot verify {alg}",
            key.key_type()
        )));
    }

    let input = jws.signing_input();
    let signature = jws.signature_bytes()?;
    check_signature(input.as_bytes(), &signature, key, alg)
}

fn compute_signature(input: &[u8], key: &Key, alg: JwsAlgorithm) -> Result<Vec<u8>> {
    match (alg, key.material()) {
        (JwsAlgorithm::HS256 | JwsAlgorithm::HS384 | JwsAlgorithm::HS512, KeyMaterial::Oct { k }) => {
            hmac_sign(k, input, alg)
        }
        (
            JwsAlgorithm::RS256
            | JwsAlgorithm::RS384
            | JwsAlgorithm::RS512
            | JwsAlgorithm::PS256
            | JwsAlgorithm::PS384
            | JwsAlgorithm::PS512,
            KeyMaterial::Rsa { private: Some(private), .. },
        ) => rsa_sign(private, input, alg),
        (
            JwsAlgorithm::ES256
            | JwsAlgorithm::ES256K
            | JwsAlgorithm::ES384
            | JwsAlgorithm::ES512,
            KeyMaterial::Ec { d: Some(d), .. },
        ) => ecdsa_sign(d, input, alg),
        (JwsAlgorithm::EdDSA, KeyMaterial::Okp { curve: Curve::Ed25519, d: Some(d), .. }) => {
            let seed: [u8; 32] = d.as_slice().try_into().map_err(|_| {
                Error::MalformedKeyMaterial("Ed25519 private key must be 32 bytes".into())
            })?;
            let signing = ed25519_dalek::SigningKey::from_bytes(&seed);
            let signature: ed25519_dalek::Signature = signing.sign(input);
            Ok(signature.to_bytes().to_vec())
        }
        _ => Err(Error::IncompatibleKeyAlgorithm(format!(
            "{} key cannot sign {alg}",
            key.key_type()
        ))),
    }
}

fn check_signature(input: &[u8], signature: &[u8], key: &Key, alg: JwsAlgorithm) -> Result<bool> {
    match (alg, key.material()) {
        (JwsAlgorithm::HS256 | JwsAlgorithm::HS384 | JwsAlgorithm::HS512, KeyMaterial::Oct { k }) => {
            hmac_verify(k, input, signature, alg)
        }
        (
            JwsAlgorithm::RS256
            | JwsAlgorithm::RS384
            | JwsAlgorithm::RS512
            | JwsAlgorithm::PS256
            | JwsAlgorithm::PS384
            | JwsAlgorithm::PS512,
            KeyMaterial::Rsa { public, .. },
        ) => Ok(rsa_verify(public, input, signature, alg)),
        (
            JwsAlgorithm::ES256
            | JwsAlgorithm::ES256K
            | JwsAlgorithm::ES384
            | JwsAlgorithm::ES512,
            KeyMaterial::Ec { x, y, .. },
        ) => ecdsa_verify(x, y, input, signature, alg),
        (JwsAlgorithm::EdDSA, KeyMaterial::Okp { curve: Curve::Ed25519, x, .. }) => {
            let public: [u8; 32] = x.as_slice().try_into().map_err(|_| {
                Error::MalformedKeyMaterial("Ed25519 public key must be 32 bytes".into())
            })?;
            let verifying = ed25519_dalek::VerifyingKey::from_bytes(&public)
                .map_err(|e| Error::MalformedKeyMaterial(format!("invalid Ed25519 key: {e}")))?;
            let Ok(signature) = ed25519_dalek::Signature::from_slice(signature) else {
                return Ok(false);
            };
            Ok(verifying.verify(input, &signature).is_ok())
        }
        _ => Err(Error::IncompatibleKeyAlgorithm(format!(
            "{} key cannot verify {alg}",
            key.key_type()
        ))),
    }
}

fn hmac_sign(k: &[u8], input: &[u8], alg: JwsAlgorithm) -> Result<Vec<u8>> {
    macro_rules! mac {
        ($hash:ty) => {{
            let mut mac = Hmac::<$hash>::new_from_slice(k)
                .map_err(|e| Error::MalformedKeyMaterial(format!("invalid HMAC key: {e}")))?;
            mac.update(input);
            Ok(mac.finalize().into_bytes().to_vec())
        }};
    }
    match alg {
        JwsAlgorithm::HS256 => mac!(Sha256),
        JwsAlgorithm::HS384 => mac!(Sha384),
        JwsAlgorithm::HS512 => mac!(Sha512),
        _ => unreachable!("caller matched the HMAC family"),
    }
}

fn hmac_verify(k: &[u8], input: &[u8], signature: &[u8], alg: JwsAlgorithm) -> Result<bool> {
    // Mac::verify_slice compares in constant time.
    macro_rules! mac {
        ($hash:ty) => {{
            let mut mac = Hmac::<$hash>::new_from_slice(k)
                .map_err(|e| Error::MalformedKeyMaterial(format!("invalid HMAC key: {e}")))?;
            mac.update(input);
            Ok(mac.verify_slice(signature).is_ok())
        }};
    }
    match alg {
        JwsAlgorithm::HS256 => mac!(Sha256),
        JwsAlgorithm::HS384 => mac!(Sha384),
        JwsAlgorithm::HS512 => mac!(Sha512),
        _ => unreachable!("caller matched the HMAC family"),
    }
}

fn rsa_sign(private: &RsaPrivateKey, input: &[u8], alg: JwsAlgorithm) -> Result<Vec<u8>> {
    let result = match alg {
        JwsAlgorithm::RS256 => {
            private.sign(Pkcs1v15Sign::new::<Sha256>(), &Sha256::digest(input))
        }
        JwsAlgorithm::RS384 => {
            private.sign(Pkcs1v15Sign::new::<Sha384>(), &Sha384::digest(input))
        }
        JwsAlgorithm::RS512 => {
            private.sign(Pkcs1v15Sign::new::<Sha512>(), &Sha512::digest(input))
        }
        JwsAlgorithm::PS256 => {
            private.sign_with_rng(&mut OsRng, Pss::new::<Sha256>(), &Sha256::digest(input))
        }
        JwsAlgorithm::PS384 => {
            private.sign_with_rng(&mut OsRng, Pss::new::<Sha384>(), &Sha384::digest(input))
        }
        JwsAlgorithm::PS512 => {
            private.sign_with_rng(&mut OsRng, Pss::new::<Sha512>(), &Sha512::digest(input))
        }
        _ => unreachable!("caller matched the RSA family"),
    };
    result.map_err(|e| Error::UnsupportedParameters(format!("RSA signing failed: {e}")))
}

fn rsa_verify(public: &RsaPublicKey, input: &[u8], signature: &[u8], alg: JwsAlgorithm) -> bool {
    let result = match alg {
        JwsAlgorithm::RS256 => {
            public.verify(Pkcs1v15Sign::new::<Sha256>(), &Sha256::digest(input), signature)
        }
        JwsAlgorithm::RS384 => {
            public.verify(Pkcs1v15Sign::new::<Sha384>(), &Sha384::digest(input), signature)
        }
        JwsAlgorithm::RS512 => {
            public.verify(Pkcs1v15Sign::new::<Sha512>(), &Sha512::digest(input), signature)
        }
        JwsAlgorithm::PS256 => {
            public.verify(Pss::new::<Sha256>(), &Sha256::digest(input), signature)
        }
        JwsAlgorithm::PS384 => {
            public.verify(Pss::new::<Sha384>(), &Sha384::digest(input), signature)
        }
        JwsAlgorithm::PS512 => {
            public.verify(Pss::new::<Sha512>(), &Sha512::digest(input), signature)
        }
        _ => unreachable!("caller matched the RSA family"),
    };
    result.is_ok()
}

fn ecdsa_sign(d: &[u8], input: &[u8], alg: JwsAlgorithm) -> Result<Vec<u8>> {
    // Each curve's signer uses the matching JWA digest by default. The
    // signature is the fixed-width r || s concatenation, not DER.
    macro_rules! es_sign {
        ($crate_:ident) => {{
            let signing = $crate_::ecdsa::SigningKey::from_slice(d)
                .map_err(|e| Error::MalformedKeyMaterial(format!("invalid EC private key: {e}")))?;
            let signature: $crate_::ecdsa::Signature = signing.sign(input);
            Ok(signature.to_bytes().to_vec())
        }};
    }
    match alg {
        JwsAlgorithm::ES256 => es_sign!(p256),
        JwsAlgorithm::ES256K => es_sign!(k256),
        JwsAlgorithm::ES384 => es_sign!(p384),
        JwsAlgorithm::ES512 => es_sign!(p521),
        _ => unreachable!("caller matched the ECDSA family"),
    }
}

fn ecdsa_verify(x: &[u8], y: &[u8], input: &[u8], signature: &[u8], alg: JwsAlgorithm) -> Result<bool> {
    macro_rules! es_verify {
        ($crate_:ident) => {{
            let verifying =
                $crate_::ecdsa::VerifyingKey::from_sec1_bytes(&sec1_point(x, y)).map_err(|e| {
                    Error::MalformedKeyMaterial(format!("invalid EC public key: {e}"))
                })?;
            match $crate_::ecdsa::Signature::from_slice(signature) {
                Ok(signature) => Ok(verifying.verify(input, &signature).is_ok()),
                Err(_) => Ok(false),
            }
        }};
    }
    match alg {
        JwsAlgorithm::ES256 => es_verify!(p256),
        JwsAlgorithm::ES384 => es_verify!(p384),
        JwsAlgorithm::ES512 => es_verify!(p521),
        JwsAlgorithm::ES256K => {
            let verifying = k256::ecdsa::VerifyingKey::from_sec1_bytes(&sec1_point(x, y))
                .map_err(|e| Error::MalformedKeyMaterial(format!("invalid EC public key: {e}")))?;
            match k256::ecdsa::Signature::from_slice(signature) {
                // Accept high-s signatures by normalising before the check.
                Ok(signature) => {
                    let signature = signature.normalize_s().unwrap_or(signature);
                    Ok(verifying.verify(input, &signature).is_ok())
                }
                Err(_) => Ok(false),
            }
        }
        _ => unreachable!("caller matched the ECDSA family"),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::keys::KeyGenParams;
    use crate::token::{Header, Payload, Token};

    fn sample_jws() -> Jws {
        let header = Header::from_claims(
            serde_json::from_str(r#"{"alg":"HS256","typ":"JWT"}"#).expect("should parse"),
        );
        let payload = Payload::from_claims(
            serde_json::from_str(r#"{"sub":"1234567890","admin":false}"#).expect("should parse"),
        );
        Jws::new(header, payload, String::new())
    }

    #[rstest::rstest]
    #[case(JwsAlgorithm::HS256)]
    #[case(JwsAlgorithm::HS384)]
    #[case(JwsAlgorithm::HS512)]
    fn hmac_sign_verify_round_trip(#[case] alg: JwsAlgorithm) {
        let key = Key::generate(&KeyGenParams::Oct { bits: 512 }, None).expect("should generate");
        let signed =
            sign(&sample_jws(), &key, alg, HeaderUpdate::Algorithm).expect("should sign");
        assert_eq!(signed.header.algorithm(), Some(alg.name()));
        assert!(verify(&signed, &key).expect("should verify"));

        // Tampering with the payload must flip the result, not error.
        let mut tampered = signed.clone();
        tampered.payload.set_claim("admin", json!(true)).expect("should set");
        assert!(!verify(&tampered, &key).expect("should verify"));
    }

    #[test]
    fn wrong_hmac_key_fails_closed() {
        let key = Key::generate(&KeyGenParams::Oct { bits: 256 }, None).expect("should generate");
        let other = Key::generate(&KeyGenParams::Oct { bits: 256 }, None).expect("should generate");
        let signed = sign(&sample_jws(), &key, JwsAlgorithm::HS256, HeaderUpdate::Algorithm)
            .expect("should sign");
        assert!(!verify(&signed, &other).expect("should verify"));
    }

    #[test]
    fn ecdsa_sign_verify_round_trip() {
        let key = Key::generate(&KeyGenParams::Ec { curve: Curve::P256 }, None)
            .expect("should generate");
        let signed = sign(&sample_jws(), &key, JwsAlgorithm::ES256, HeaderUpdate::Jwt)
            .expect("should sign");
        assert_eq!(signed.header.algorithm(), Some("ES256"));
        assert_eq!(signed.header.claim("kid"), Some(&json!(key.id())));

        let public = key.public_only().expect("should strip");
        assert!(verify(&signed, &public).expect("should verify"));
    }

    #[test]
    fn secp256k1_sign_verify_round_trip() {
        let key = Key::generate(&KeyGenParams::Ec { curve: Curve::Secp256k1 }, None)
            .expect("should generate");
        let signed = sign(&sample_jws(), &key, JwsAlgorithm::ES256K, HeaderUpdate::Algorithm)
            .expect("should sign");
        assert!(verify(&signed, &key).expect("should verify"));
    }

    #[test]
    fn rsa_pkcs1_and_pss_round_trip() {
        let key = Key::generate(&KeyGenParams::Rsa { bits: 1024 }, None).expect("should generate");
        for alg in [JwsAlgorithm::RS256, JwsAlgorithm::PS256] {
            let signed =
                sign(&sample_jws(), &key, alg, HeaderUpdate::Algorithm).expect("should sign");
            assert!(verify(&signed, &key).expect("should verify"), "{alg}");
        }
    }

    #[test]
    fn eddsa_sign_verify_round_trip() {
        let key = Key::generate(&KeyGenParams::Okp { curve: Curve::Ed25519 }, None)
            .expect("should generate");
        let signed = sign(&sample_jws(), &key, JwsAlgorithm::EdDSA, HeaderUpdate::Algorithm)
            .expect("should sign");
        assert!(verify(&signed, &key).expect("should verify"));
    }

    #[test]
    fn header_update_none_keeps_original_bytes() {
        let key = Key::generate(&KeyGenParams::Oct { bits: 256 }, None).expect("should generate");
        let jws = sample_jws();
        let signed = sign(&jws, &key, JwsAlgorithm::HS256, HeaderUpdate::None)
            .expect("should sign");
        assert_eq!(signed.header.encoded(), jws.header.encoded());
    }

    #[test]
    fn incompatible_key_type_is_an_error() {
        let key = Key::generate(&KeyGenParams::Ec { curve: Curve::P256 }, None)
            .expect("should generate");
        assert!(matches!(
            sign(&sample_jws(), &key, JwsAlgorithm::HS256, HeaderUpdate::Algorithm),
            Err(Error::IncompatibleKeyAlgorithm(_))
        ));
    }

    #[test]
    fn public_only_key_cannot_sign() {
        let key = Key::generate(&KeyGenParams::Ec { curve: Curve::P256 }, None)
            .expect("should generate");
        let public = key.public_only().expect("should strip");
        assert!(matches!(
            sign(&sample_jws(), &public, JwsAlgorithm::ES256, HeaderUpdate::Algorithm),
            Err(Error::KeyMaterialMissing(_))
        ));
    }

    #[test]
    fn unsecured_token_verifies_iff_signature_empty() {
        let key = Key::generate(&KeyGenParams::Oct { bits: 256 }, None).expect("should generate");
        let header = Base64::encode_string(br#"{"alg":"none"}"#);
        let payload = Base64::encode_string(br#"{"sub":"joe"}"#);

        let token = Token::parse_compact(&format!("{header}.{payload}."))
            .expect("should parse");
        let Token::Jws(jws) = token else { panic!("expected a JWS") };
        assert!(verify(&jws, &key).expect("should verify"));

        let mut forged = jws;
        forged.signature = Base64::encode_string(b"junk");
        assert!(!verify(&forged, &key).expect("should verify"));
    }
}
