//! Error types surfaced by the engine.
//!
//! Every failure is per-operation and recoverable: parsing and key-import
//! errors carry enough context for display, and nothing here ever leaves a
//! `KeyStore` or an existing token in a partially-updated state. Signature
//! mismatch is deliberately *not* an error — `verify` returns `Ok(false)`.

/// Engine error codes.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The token string is not a well-formed compact or JSON serialization
    /// (wrong segment count, invalid base64url, header is not a JSON object).
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// Key material could not be parsed from JWK or PEM text.
    #[error("malformed key material: {0}")]
    MalformedKeyMaterial(String),

    /// The key material parsed, but does not match any supported key type.
    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),

    /// A size, curve or algorithm combination outside the supported set.
    #[error("unsupported parameters: {0}")]
    UnsupportedParameters(String),

    /// The (key, algorithm) pair is rejected by the algorithm registry.
    #[error("key is not compatible with algorithm: {0}")]
    IncompatibleKeyAlgorithm(String),

    /// The operation needs private material the key does not carry.
    #[error("key material missing: {0}")]
    KeyMaterialMissing(String),

    /// The key has no separate public form (symmetric keys).
    #[error("no public material: {0}")]
    NoPublicMaterial(String),

    /// Decryption failed. Wrong key, bad padding and tag mismatch are
    /// indistinguishable by design to avoid oracle-style leakage.
    #[error("decryption failed")]
    DecryptionFailed,

    /// The token shape or key store contents do not satisfy an attack's
    /// precondition.
    #[error("attack not applicable: {0}")]
    AttackNotApplicable(String),
}

/// Engine result type.
pub type Result<T> = std::result::Result<T, Error>;
