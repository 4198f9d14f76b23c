//! # JOSE Forge
//!
//! A JOSE (JWT/JWS/JWE) manipulation and attack-construction engine for
//! security testing. The crate parses tokens without losing the bytes they
//! arrived with, signs, verifies, encrypts and decrypts them against a
//! typed key model, and builds the well-known header and signature attacks
//! (`alg: none`, HMAC key confusion, embedded JWK, `jku`/`x5u`/`kid`
//! injection, CVE-2019-20933, CVE-2022-21449) for replay against a target.
//!
//! Everything is per-operation and synchronous; the only shared mutable
//! state is the [`keys::store::KeyStore`], which is safe to share across
//! threads behind an `Arc`.
//!
//! This is a testing tool for systems you are authorized to assess.

pub mod attack;
pub mod detect;
pub mod error;
pub mod jose;
pub mod keys;
pub mod token;

pub use error::{Error, Result};
pub use keys::{Key, KeyGenParams, KeyMaterial};
pub use token::{Jwe, Jws, Token};
