//! ECDSA P-256 signing and verification primitives.
//!
//! Signatures are SHA-256 digests signed with P-256 and encoded as ASN.1 DER
//! (`SEQUENCE { r INTEGER, s INTEGER }`), the form auction servers verify.
//! Keys travel as PKCS#8 (private) and SubjectPublicKeyInfo (public) DER.

use ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePublicKey};
use serde_json::Value;

use crate::base64::{base64_decode, base64_encode, base64url_encode};
use crate::error::CryptoError;

/// Sign a message with ECDSA P-256 + SHA-256.
///
/// Nonces are derived per RFC 6979, so the same key and message always
/// produce the same signature.
///
/// # Returns
/// DER-encoded signature (at most 72 bytes)
pub fn sign_der(private_key: &SigningKey, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let signature: Signature = private_key
        .try_sign(message)
        .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
    Ok(signature.to_der().as_bytes().to_vec())
}

/// Verify a DER-encoded ECDSA P-256 + SHA-256 signature.
///
/// # Returns
/// true if valid, false otherwise (never errors on invalid signature)
pub fn verify_der(public_key: &VerifyingKey, message: &[u8], signature_der: &[u8]) -> bool {
    match Signature::from_der(signature_der) {
        Ok(signature) => public_key.verify(message, &signature).is_ok(),
        Err(_) => false,
    }
}

/// Import a P-256 private key from PKCS#8 DER.
pub fn import_signing_key_pkcs8_der(der: &[u8]) -> Result<SigningKey, CryptoError> {
    SigningKey::from_pkcs8_der(der).map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))
}

/// Import a P-256 public key from SubjectPublicKeyInfo DER.
pub fn import_verifying_key_spki_der(der: &[u8]) -> Result<VerifyingKey, CryptoError> {
    VerifyingKey::from_public_key_der(der)
        .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
}

/// Import a P-256 public key from base64 SubjectPublicKeyInfo DER.
pub fn import_verifying_key_spki_base64(spki_b64: &str) -> Result<VerifyingKey, CryptoError> {
    let der = base64_decode(spki_b64).map_err(|e| CryptoError::Base64Decode(e.to_string()))?;
    import_verifying_key_spki_der(&der)
}

/// Export a P-256 public key as base64 SubjectPublicKeyInfo DER.
pub fn export_verifying_key_spki_base64(key: &VerifyingKey) -> Result<String, CryptoError> {
    let document = key
        .to_public_key_der()
        .map_err(|e| CryptoError::KeyEncoding(e.to_string()))?;
    Ok(base64_encode(document.as_bytes()))
}

/// Export a P-256 public key to JWK format.
pub fn export_public_key_jwk(key: &VerifyingKey) -> Result<Value, CryptoError> {
    let point = key.to_encoded_point(false);
    let (x, y) = match (point.x(), point.y()) {
        (Some(x), Some(y)) => (base64url_encode(x), base64url_encode(y)),
        _ => {
            return Err(CryptoError::KeyEncoding(
                "uncompressed point without coordinates".to_string(),
            ))
        }
    };

    Ok(serde_json::json!({
        "kty": "EC",
        "crv": "P-256",
        "x": x,
        "y": y,
    }))
}

/// Generate a new P-256 signing key pair.
pub fn generate_p256_keypair() -> SigningKey {
    SigningKey::random(&mut p256::elliptic_curve::rand_core::OsRng)
}
