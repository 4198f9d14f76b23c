//! # JSON Object Signing and Encryption (JOSE)
//!
//! Algorithm registry, JWK wire structures, and the JWS/JWE crypto engines
//! ([RFC7515]–[RFC7518]).
//!
//! [RFC7515]: https://www.rfc-editor.org/rfc/rfc7515
//! [RFC7518]: https://www.rfc-editor.org/rfc/rfc7518

pub mod jwa;
pub mod jwe;
pub mod jwk;
pub mod jws;
