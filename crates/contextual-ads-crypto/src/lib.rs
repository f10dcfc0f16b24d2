//! Cryptographic primitives for signing contextual ads bundles:
//! ECDSA P-256 (DER signatures), PKCS#8 / SPKI key handling, base64, SHA-256.

pub mod base64;
pub mod digest;
pub mod error;
pub mod signing;

pub use base64::{base64_decode, base64_encode, base64url_decode, base64url_encode};
pub use digest::{sha256, sha256_hex};
pub use error::CryptoError;
pub use signing::{
    export_public_key_jwk, export_verifying_key_spki_base64, generate_p256_keypair,
    import_signing_key_pkcs8_der, import_verifying_key_spki_base64,
    import_verifying_key_spki_der, sign_der, verify_der,
};

pub use p256::ecdsa::{SigningKey, VerifyingKey};
