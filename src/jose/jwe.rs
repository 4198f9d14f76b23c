//! # JSON Web Encryption (JWE)
//!
//! Content encryption and decryption for compact JWE tokens ([RFC7516]),
//! with RSA and AES key wrapping and direct symmetric encryption. The
//! additional authenticated data is always the ASCII bytes of the encoded
//! protected header, so a mutated header fails authentication on decrypt.
//!
//! Decryption failures are deliberately indistinguishable: wrong key, bad
//! padding and tag mismatch all collapse to `DecryptionFailed`.
//!
//! [RFC7516]: https://www.rfc-editor.org/rfc/rfc7516

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes_gcm::aead::consts::U12;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::{AeadInPlace, Aes128Gcm, Aes256Gcm, AesGcm, KeyInit};
use base64ct::{Base64UrlUnpadded as Base64, Encoding};
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::{Oaep, Pkcs1v15Encrypt};
use serde_json::{json, Map};
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};

use crate::error::{Error, Result};
use crate::jose::jwa::{self, EncryptionMethod, JweAlgorithm};
use crate::keys::{Key, KeyMaterial};
use crate::token::{Header, Jwe};

type Aes192Gcm = AesGcm<aes::Aes192, U12>;

/// Encrypt a plaintext into a compact JWE.
///
/// A fresh content-encryption key and IV are drawn per call; `dir` uses
/// the oct key itself as the CEK. The protected header carries exactly
/// `alg` and `enc`.
///
/// # Errors
///
/// Returns `IncompatibleKeyAlgorithm` if the registry rejects the (key,
/// algorithm) pair or a symmetric key's size does not fit the algorithm.
pub fn encrypt(
    plaintext: &[u8], key: &Key, alg: JweAlgorithm, enc: EncryptionMethod,
) -> Result<Jwe> {
    tracing::debug!("encrypt {alg} / {enc}");

    if !jwa::key_management_algorithms_for(key.key_type()).contains(&alg) {
        return Err(Error::IncompatibleKeyAlgorithm(format!(
            "{} key cannot manage a CEK with {alg}",
            key.key_type()
        )));
    }

    let mut claims = Map::new();
    claims.insert("alg".into(), json!(alg.name()));
    claims.insert("enc".into(), json!(enc.name()));
    let header = Header::from_claims(claims);

    let cek = match alg {
        JweAlgorithm::Dir => {
            let KeyMaterial::Oct { k } = key.material() else {
                return Err(Error::IncompatibleKeyAlgorithm("dir requires an oct key".into()));
            };
            if k.len() != enc.cek_len() {
                return Err(Error::IncompatibleKeyAlgorithm(format!(
                    "dir with {enc} needs a {}-bit key, got {}",
                    enc.cek_len() * 8,
                    k.len() * 8
                )));
            }
            k.clone()
        }
        _ => {
            let mut cek = vec![0u8; enc.cek_len()];
            OsRng.fill_bytes(&mut cek);
            cek
        }
    };

    let encrypted_key = wrap_cek(&cek, key, alg)?;

    let mut iv = vec![0u8; enc.iv_len()];
    OsRng.fill_bytes(&mut iv);

    let aad = header.encoded().as_bytes().to_vec();
    let (ciphertext, tag) = encrypt_content(plaintext, &cek, &iv, &aad, enc)?;

    Ok(Jwe {
        header,
        encrypted_key: Base64::encode_string(&encrypted_key),
        iv: Base64::encode_string(&iv),
        ciphertext: Base64::encode_string(&ciphertext),
        tag: Base64::encode_string(&tag),
    })
}

/// Decrypt a compact JWE, returning the plaintext.
///
/// # Errors
///
/// Returns `UnsupportedParameters` for an unknown `alg` or `enc`,
/// `KeyMaterialMissing` when private material is needed and absent,
/// `IncompatibleKeyAlgorithm` on a key-type mismatch, and
/// `DecryptionFailed` for every cryptographic failure.
pub fn decrypt(jwe: &Jwe, key: &Key) -> Result<Vec<u8>> {
    let Some(name) = jwe.header.algorithm() else {
        return Err(Error::MalformedToken("header has no alg claim".into()));
    };
    let alg: JweAlgorithm = name.parse()?;
    let Some(name) = jwe.header.claim("enc").and_then(serde_json::Value::as_str) else {
        return Err(Error::MalformedToken("JWE header has no enc claim".into()));
    };
    let enc: EncryptionMethod = name.parse()?;
    tracing::debug!("decrypt {alg} / {enc}");

    let encrypted_key = decode_segment(&jwe.encrypted_key, "encrypted key")?;
    let iv = decode_segment(&jwe.iv, "iv")?;
    let ciphertext = decode_segment(&jwe.ciphertext, "ciphertext")?;
    let tag = decode_segment(&jwe.tag, "tag")?;

    let cek = unwrap_cek(&encrypted_key, key, alg)?;
    if cek.len() != enc.cek_len() {
        return Err(Error::DecryptionFailed);
    }

    let aad = jwe.header.encoded().as_bytes();
    decrypt_content(&ciphertext, &tag, &cek, &iv, aad, enc)
}

fn decode_segment(segment: &str, name: &str) -> Result<Vec<u8>> {
    Base64::decode_vec(segment)
        .map_err(|_| Error::MalformedToken(format!("{name} is not valid base64url")))
}

fn wrap_cek(cek: &[u8], key: &Key, alg: JweAlgorithm) -> Result<Vec<u8>> {
    match alg {
        JweAlgorithm::Dir => Ok(vec![]),
        JweAlgorithm::Rsa1_5 | JweAlgorithm::RsaOaep | JweAlgorithm::RsaOaep256 => {
            let KeyMaterial::Rsa { public, .. } = key.material() else {
                return Err(Error::IncompatibleKeyAlgorithm(format!(
                    "{alg} requires an RSA key"
                )));
            };
            let result = match alg {
                JweAlgorithm::Rsa1_5 => public.encrypt(&mut OsRng, Pkcs1v15Encrypt, cek),
                JweAlgorithm::RsaOaep => public.encrypt(&mut OsRng, Oaep::new::<Sha1>(), cek),
                _ => public.encrypt(&mut OsRng, Oaep::new::<Sha256>(), cek),
            };
            result.map_err(|e| {
                Error::UnsupportedParameters(format!("RSA key wrapping failed: {e}"))
            })
        }
        JweAlgorithm::A128Kw | JweAlgorithm::A192Kw | JweAlgorithm::A256Kw => {
            let k = kek_bytes(key, alg)?;
            let wrapped = match alg {
                JweAlgorithm::A128Kw => aes_kw::Kek::<aes::Aes128>::try_from(k)
                    .and_then(|kek| kek.wrap_vec(cek)),
                JweAlgorithm::A192Kw => aes_kw::Kek::<aes::Aes192>::try_from(k)
                    .and_then(|kek| kek.wrap_vec(cek)),
                _ => aes_kw::Kek::<aes::Aes256>::try_from(k).and_then(|kek| kek.wrap_vec(cek)),
            };
            wrapped.map_err(|e| Error::UnsupportedParameters(format!("key wrap failed: {e}")))
        }
    }
}

fn unwrap_cek(encrypted_key: &[u8], key: &Key, alg: JweAlgorithm) -> Result<Vec<u8>> {
    match alg {
        JweAlgorithm::Dir => {
            let KeyMaterial::Oct { k } = key.material() else {
                return Err(Error::IncompatibleKeyAlgorithm("dir requires an oct key".into()));
            };
            Ok(k.clone())
        }
        JweAlgorithm::Rsa1_5 | JweAlgorithm::RsaOaep | JweAlgorithm::RsaOaep256 => {
            let KeyMaterial::Rsa { private, .. } = key.material() else {
                return Err(Error::IncompatibleKeyAlgorithm(format!(
                    "{alg} requires an RSA key"
                )));
            };
            let Some(private) = private else {
                return Err(Error::KeyMaterialMissing(format!(
                    "key `{}` has no private material",
                    key.id()
                )));
            };
            let result = match alg {
                JweAlgorithm::Rsa1_5 => private.decrypt(Pkcs1v15Encrypt, encrypted_key),
                JweAlgorithm::RsaOaep => private.decrypt(Oaep::new::<Sha1>(), encrypted_key),
                _ => private.decrypt(Oaep::new::<Sha256>(), encrypted_key),
            };
            result.map_err(|_| Error::DecryptionFailed)
        }
        JweAlgorithm::A128Kw | JweAlgorithm::A192Kw | JweAlgorithm::A256Kw => {
            let k = kek_bytes(key, alg)?;
            let unwrapped = match alg {
                JweAlgorithm::A128Kw => aes_kw::Kek::<aes::Aes128>::try_from(k)
                    .and_then(|kek| kek.unwrap_vec(encrypted_key)),
                JweAlgorithm::A192Kw => aes_kw::Kek::<aes::Aes192>::try_from(k)
                    .and_then(|kek| kek.unwrap_vec(encrypted_key)),
                _ => aes_kw::Kek::<aes::Aes256>::try_from(k)
                    .and_then(|kek| kek.unwrap_vec(encrypted_key)),
            };
            unwrapped.map_err(|_| Error::DecryptionFailed)
        }
    }
}

fn kek_bytes<'a>(key: &'a Key, alg: JweAlgorithm) -> Result<&'a [u8]> {
    let KeyMaterial::Oct { k } = key.material() else {
        return Err(Error::IncompatibleKeyAlgorithm(format!("{alg} requires an oct key")));
    };
    let expected = alg.kek_len().unwrap_or_default();
    if k.len() != expected {
        return Err(Error::IncompatibleKeyAlgorithm(format!(
            "{alg} needs a {}-bit key, got {}",
            expected * 8,
            k.len() * 8
        )));
    }
    Ok(k)
}

fn encrypt_content(
    plaintext: &[u8], cek: &[u8], iv: &[u8], aad: &[u8], enc: EncryptionMethod,
) -> Result<(Vec<u8>, Vec<u8>)> {
    match enc {
        EncryptionMethod::A128Gcm => gcm_encrypt::<Aes128Gcm>(plaintext, cek, iv, aad),
        EncryptionMethod::A192Gcm => gcm_encrypt::<Aes192Gcm>(plaintext, cek, iv, aad),
        EncryptionMethod::A256Gcm => gcm_encrypt::<Aes256Gcm>(plaintext, cek, iv, aad),
        EncryptionMethod::A128CbcHs256
        | EncryptionMethod::A192CbcHs384
        | EncryptionMethod::A256CbcHs512 => cbc_hmac_encrypt(plaintext, cek, iv, aad, enc),
    }
}

fn decrypt_content(
    ciphertext: &[u8], tag: &[u8], cek: &[u8], iv: &[u8], aad: &[u8], enc: EncryptionMethod,
) -> Result<Vec<u8>> {
    if iv.len() != enc.iv_len() {
        return Err(Error::DecryptionFailed);
    }
    match enc {
        EncryptionMethod::A128Gcm => gcm_decrypt::<Aes128Gcm>(ciphertext, tag, cek, iv, aad),
        EncryptionMethod::A192Gcm => gcm_decrypt::<Aes192Gcm>(ciphertext, tag, cek, iv, aad),
        EncryptionMethod::A256Gcm => gcm_decrypt::<Aes256Gcm>(ciphertext, tag, cek, iv, aad),
        EncryptionMethod::A128CbcHs256
        | EncryptionMethod::A192CbcHs384
        | EncryptionMethod::A256CbcHs512 => cbc_hmac_decrypt(ciphertext, tag, cek, iv, aad, enc),
    }
}

fn gcm_encrypt<C>(plaintext: &[u8], cek: &[u8], iv: &[u8], aad: &[u8]) -> Result<(Vec<u8>, Vec<u8>)>
where
    C: AeadInPlace + KeyInit,
{
    let cipher = C::new_from_slice(cek).map_err(|_| Error::DecryptionFailed)?;
    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(iv), aad, &mut buffer)
        .map_err(|_| Error::DecryptionFailed)?;
    Ok((buffer, tag.to_vec()))
}

fn gcm_decrypt<C>(
    ciphertext: &[u8], tag: &[u8], cek: &[u8], iv: &[u8], aad: &[u8],
) -> Result<Vec<u8>>
where
    C: AeadInPlace + KeyInit,
{
    if tag.len() != 16 {
        return Err(Error::DecryptionFailed);
    }
    let cipher = C::new_from_slice(cek).map_err(|_| Error::DecryptionFailed)?;
    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(iv),
            aad,
            &mut buffer,
            GenericArray::from_slice(tag),
        )
        .map_err(|_| Error::DecryptionFailed)?;
    Ok(buffer)
}

// AES_CBC_HMAC_SHA2 composite (RFC 7518 §5.2): the CEK splits into a MAC
// half and an AES half; the tag is the truncated HMAC over
// AAD || IV || ciphertext || AL, where AL is the AAD bit length as a
// 64-bit big-endian integer.
fn cbc_hmac_encrypt(
    plaintext: &[u8], cek: &[u8], iv: &[u8], aad: &[u8], enc: EncryptionMethod,
) -> Result<(Vec<u8>, Vec<u8>)> {
    let half = cek.len() / 2;
    let (mac_key, enc_key) = cek.split_at(half);

    let ciphertext = match enc {
        EncryptionMethod::A128CbcHs256 => cbc::Encryptor::<aes::Aes128>::new_from_slices(enc_key, iv)
            .map_err(|_| Error::DecryptionFailed)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        EncryptionMethod::A192CbcHs384 => cbc::Encryptor::<aes::Aes192>::new_from_slices(enc_key, iv)
            .map_err(|_| Error::DecryptionFailed)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        _ => cbc::Encryptor::<aes::Aes256>::new_from_slices(enc_key, iv)
            .map_err(|_| Error::DecryptionFailed)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
    };

    let tag = composite_tag(mac_key, iv, &ciphertext, aad, enc)?;
    Ok((ciphertext, tag))
}

fn cbc_hmac_decrypt(
    ciphertext: &[u8], tag: &[u8], cek: &[u8], iv: &[u8], aad: &[u8], enc: EncryptionMethod,
) -> Result<Vec<u8>> {
    let half = cek.len() / 2;
    let (mac_key, enc_key) = cek.split_at(half);

    if tag.len() != mac_key.len() {
        return Err(Error::DecryptionFailed);
    }
    verify_composite_tag(mac_key, iv, ciphertext, aad, tag, enc)?;

    let plaintext = match enc {
        EncryptionMethod::A128CbcHs256 => cbc::Decryptor::<aes::Aes128>::new_from_slices(enc_key, iv)
            .map_err(|_| Error::DecryptionFailed)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        EncryptionMethod::A192CbcHs384 => cbc::Decryptor::<aes::Aes192>::new_from_slices(enc_key, iv)
            .map_err(|_| Error::DecryptionFailed)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        _ => cbc::Decryptor::<aes::Aes256>::new_from_slices(enc_key, iv)
            .map_err(|_| Error::DecryptionFailed)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
    };

    plaintext.map_err(|_| Error::DecryptionFailed)
}

// HMAC over AAD || IV || ciphertext || AL, keyed with the MAC half.
macro_rules! composite_mac {
    ($hash:ty, $mac_key:expr, $iv:expr, $ciphertext:expr, $aad:expr) => {{
        let al = (u64::try_from($aad.len()).map_err(|_| Error::DecryptionFailed)? * 8)
            .to_be_bytes();
        let mut mac = <Hmac<$hash> as Mac>::new_from_slice($mac_key)
            .map_err(|_| Error::DecryptionFailed)?;
        mac.update($aad);
        mac.update($iv);
        mac.update($ciphertext);
        mac.update(&al);
        mac
    }};
}

fn composite_tag(
    mac_key: &[u8], iv: &[u8], ciphertext: &[u8], aad: &[u8], enc: EncryptionMethod,
) -> Result<Vec<u8>> {
    macro_rules! tag {
        ($hash:ty) => {{
            let mut full =
                composite_mac!($hash, mac_key, iv, ciphertext, aad).finalize().into_bytes().to_vec();
            full.truncate(mac_key.len());
            Ok(full)
        }};
    }
    match enc {
        EncryptionMethod::A128CbcHs256 => tag!(Sha256),
        EncryptionMethod::A192CbcHs384 => tag!(Sha384),
        EncryptionMethod::A256CbcHs512 => tag!(Sha512),
        _ => Err(Error::DecryptionFailed),
    }
}

// Mac::verify_truncated_left compares in constant time.
fn verify_composite_tag(
    mac_key: &[u8], iv: &[u8], ciphertext: &[u8], aad: &[u8], tag: &[u8], enc: EncryptionMethod,
) -> Result<()> {
    macro_rules! check {
        ($hash:ty) => {
            composite_mac!($hash, mac_key, iv, ciphertext, aad)
                .verify_truncated_left(tag)
                .map_err(|_| Error::DecryptionFailed)
        };
    }
    match enc {
        EncryptionMethod::A128CbcHs256 => check!(Sha256),
        EncryptionMethod::A192CbcHs384 => check!(Sha384),
        EncryptionMethod::A256CbcHs512 => check!(Sha512),
        _ => Err(Error::DecryptionFailed),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jose::jwk::Curve;
    use crate::keys::KeyGenParams;
    use crate::token::Token;

    const PLAINTEXT: &[u8] = br#"{"sub":"1234567890","admin":false}"#;

    #[rstest::rstest]
    #[case(EncryptionMethod::A128Gcm)]
    #[case(EncryptionMethod::A192Gcm)]
    #[case(EncryptionMethod::A256Gcm)]
    #[case(EncryptionMethod::A128CbcHs256)]
    #[case(EncryptionMethod::A192CbcHs384)]
    #[case(EncryptionMethod::A256CbcHs512)]
    fn dir_round_trip(#[case] enc: EncryptionMethod) {
        let key = Key::generate(&KeyGenParams::Oct { bits: enc.cek_len() * 8 }, None)
            .expect("should generate");
        let jwe = encrypt(PLAINTEXT, &key, JweAlgorithm::Dir, enc).expect("should encrypt");
        assert!(jwe.encrypted_key.is_empty());
        assert_eq!(decrypt(&jwe, &key).expect("should decrypt"), PLAINTEXT);

        // The compact form parses back as a JWE.
        let token = Token::parse_compact(&jwe.serialize_compact()).expect("should parse");
        assert!(matches!(token, Token::Jwe(_)));
    }

    #[rstest::rstest]
    #[case(JweAlgorithm::Rsa1_5, EncryptionMethod::A256Gcm)]
    #[case(JweAlgorithm::RsaOaep, EncryptionMethod::A256Gcm)]
    #[case(JweAlgorithm::RsaOaep, EncryptionMethod::A192CbcHs384)]
    #[case(JweAlgorithm::RsaOaep256, EncryptionMethod::A256Gcm)]
    fn rsa_wrap_round_trip(#[case] alg: JweAlgorithm, #[case] enc: EncryptionMethod) {
        let key = Key::generate(&KeyGenParams::Rsa { bits: 1024 }, None).expect("should generate");
        let jwe = encrypt(PLAINTEXT, &key, alg, enc).expect("should encrypt");
        assert_eq!(decrypt(&jwe, &key).expect("should decrypt"), PLAINTEXT, "{alg}/{enc}");
    }

    #[rstest::rstest]
    #[case(JweAlgorithm::A128Kw, EncryptionMethod::A128CbcHs256)]
    #[case(JweAlgorithm::A128Kw, EncryptionMethod::A256Gcm)]
    #[case(JweAlgorithm::A192Kw, EncryptionMethod::A192CbcHs384)]
    #[case(JweAlgorithm::A192Kw, EncryptionMethod::A192Gcm)]
    #[case(JweAlgorithm::A256Kw, EncryptionMethod::A256CbcHs512)]
    #[case(JweAlgorithm::A256Kw, EncryptionMethod::A128Gcm)]
    fn aes_kw_round_trip(#[case] alg: JweAlgorithm, #[case] enc: EncryptionMethod) {
        let bits = alg.kek_len().unwrap_or_default() * 8;
        let key = Key::generate(&KeyGenParams::Oct { bits }, None).expect("should generate");
        let jwe = encrypt(PLAINTEXT, &key, alg, enc).expect("should encrypt");
        assert!(!jwe.encrypted_key.is_empty());
        assert_eq!(decrypt(&jwe, &key).expect("should decrypt"), PLAINTEXT, "{alg}/{enc}");
    }

    #[test]
    fn wrong_key_collapses_to_decryption_failed() {
        let key = Key::generate(&KeyGenParams::Oct { bits: 128 }, None).expect("should generate");
        let other = Key::generate(&KeyGenParams::Oct { bits: 128 }, None).expect("should generate");
        let jwe = encrypt(PLAINTEXT, &key, JweAlgorithm::A128Kw, EncryptionMethod::A128Gcm)
            .expect("should encrypt");
        assert!(matches!(decrypt(&jwe, &other), Err(Error::DecryptionFailed)));
    }

    #[test]
    fn header_tampering_fails_authentication() {
        let key = Key::generate(&KeyGenParams::Oct { bits: 128 }, None).expect("should generate");
        let mut jwe = encrypt(PLAINTEXT, &key, JweAlgorithm::Dir, EncryptionMethod::A128Gcm)
            .expect("should encrypt");
        jwe.header.set_claim("crit", serde_json::json!(["exp"]));
        assert!(matches!(decrypt(&jwe, &key), Err(Error::DecryptionFailed)));
    }

    #[test]
    fn dir_key_size_must_match_method() {
        let key = Key::generate(&KeyGenParams::Oct { bits: 128 }, None).expect("should generate");
        assert!(matches!(
            encrypt(PLAINTEXT, &key, JweAlgorithm::Dir, EncryptionMethod::A256Gcm),
            Err(Error::IncompatibleKeyAlgorithm(_))
        ));
    }

    #[test]
    fn ec_keys_cannot_manage_ceks() {
        let key = Key::generate(&KeyGenParams::Ec { curve: Curve::P256 }, None)
            .expect("should generate");
        assert!(matches!(
            encrypt(PLAINTEXT, &key, JweAlgorithm::RsaOaep, EncryptionMethod::A128Gcm),
            Err(Error::IncompatibleKeyAlgorithm(_))
        ));
    }

    #[test]
    fn public_only_rsa_key_cannot_decrypt() {
        let key = Key::generate(&KeyGenParams::Rsa { bits: 1024 }, None).expect("should generate");
        let jwe = encrypt(PLAINTEXT, &key, JweAlgorithm::RsaOaep, EncryptionMethod::A128Gcm)
            .expect("should encrypt");
        let public = key.public_only().expect("should strip");
        assert!(matches!(decrypt(&jwe, &public), Err(Error::KeyMaterialMissing(_))));
    }

    #[test]
    fn unknown_enc_is_unsupported() {
        let key = Key::generate(&KeyGenParams::Oct { bits: 128 }, None).expect("should generate");
        let mut jwe = encrypt(PLAINTEXT, &key, JweAlgorithm::Dir, EncryptionMethod::A128Gcm)
            .expect("should encrypt");
        jwe.header.set_claim("enc", serde_json::json!("A128CTR"));
        assert!(matches!(decrypt(&jwe, &key), Err(Error::UnsupportedParameters(_))));
    }
}
