use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Invalid PKCS#8 private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Invalid SubjectPublicKeyInfo public key: {0}")]
    InvalidPublicKey(String),

    #[error("Base64 decode error: {0}")]
    Base64Decode(String),

    #[error("Public key encoding failed: {0}")]
    KeyEncoding(String),
}
