//! Best-effort ECDSA P-256 signing of contextual ads bundles.
//!
//! Signing never fails the caller. Any key or signing error yields the bundle
//! with an empty signature, which auction-side verification then rejects.

use std::fmt;

use tracing::{debug, info, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

use contextual_ads_crypto::{
    base64_decode, import_signing_key_pkcs8_der, import_verifying_key_spki_base64, sha256_hex,
    sign_der, verify_der, CryptoError, VerifyingKey,
};

use crate::canonical::canonical_bytes;
use crate::config::SignerConfig;
use crate::error::Result;
use crate::test_keys::TEST_PRIVATE_KEY_PKCS8_BASE64;
use crate::types::{ContextualAds, SignedContextualAds};

// ============================================================================
// SigningKeyMaterial
// ============================================================================

/// PKCS#8 DER private key bytes, parsed only when signing.
///
/// Parsing is deferred so that corrupt material degrades to unsigned output
/// instead of failing construction.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SigningKeyMaterial {
    pkcs8_der: Vec<u8>,
}

impl SigningKeyMaterial {
    pub fn from_pkcs8_der(der: impl Into<Vec<u8>>) -> Self {
        Self {
            pkcs8_der: der.into(),
        }
    }

    pub fn from_pkcs8_base64(encoded: &str) -> Result<Self> {
        let der = base64_decode(encoded).map_err(|e| CryptoError::Base64Decode(e.to_string()))?;
        Ok(Self::from_pkcs8_der(der))
    }

    /// The shared test key from [`crate::test_keys`].
    pub fn test_key() -> Self {
        // The constant is valid base64; fall back to empty (unsignable) material regardless.
        Self::from_pkcs8_base64(TEST_PRIVATE_KEY_PKCS8_BASE64)
            .unwrap_or_else(|_| Self::from_pkcs8_der(Vec::new()))
    }

    pub fn as_der(&self) -> &[u8] {
        &self.pkcs8_der
    }
}

impl fmt::Debug for SigningKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeyMaterial")
            .field("pkcs8_der", &format_args!("<{} bytes redacted>", self.pkcs8_der.len()))
            .finish()
    }
}

// ============================================================================
// SigningOutcome
// ============================================================================

/// Result of a best-effort signing attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningOutcome {
    /// DER-encoded ECDSA signature.
    Signed(Vec<u8>),
    /// Signing failed; the caller decides whether unsigned output is acceptable.
    Unsigned { reason: String },
}

impl SigningOutcome {
    pub fn is_signed(&self) -> bool {
        matches!(self, SigningOutcome::Signed(_))
    }

    /// Signature bytes, empty when unsigned.
    pub fn into_signature(self) -> Vec<u8> {
        match self {
            SigningOutcome::Signed(signature) => signature,
            SigningOutcome::Unsigned { .. } => Vec::new(),
        }
    }
}

// ============================================================================
// ContextualAdsSigner
// ============================================================================

#[derive(Debug, Clone)]
pub struct ContextualAdsSigner {
    key: SigningKeyMaterial,
}

impl ContextualAdsSigner {
    pub fn new(key: SigningKeyMaterial) -> Self {
        Self { key }
    }

    /// Signer using the shared test key.
    pub fn with_test_key() -> Self {
        Self::new(SigningKeyMaterial::test_key())
    }

    pub fn from_config(config: &SignerConfig) -> Result<Self> {
        let key = config.key_material()?;
        info!(
            use_test_key = config.use_test_key,
            key_bytes = key.as_der().len(),
            "configured contextual ads signer"
        );
        Ok(Self::new(key))
    }

    /// Public half of the configured key.
    pub fn verifying_key(&self) -> Result<VerifyingKey> {
        let signing_key = import_signing_key_pkcs8_der(self.key.as_der())?;
        Ok(signing_key.verifying_key().to_owned())
    }

    /// Sign arbitrary bytes, reporting failure as [`SigningOutcome::Unsigned`].
    pub fn try_sign_bytes(&self, message: &[u8]) -> SigningOutcome {
        let signed = import_signing_key_pkcs8_der(self.key.as_der())
            .and_then(|signing_key| sign_der(&signing_key, message));
        match signed {
            Ok(signature) => SigningOutcome::Signed(signature),
            Err(e) => SigningOutcome::Unsigned {
                reason: e.to_string(),
            },
        }
    }

    /// Canonicalize and sign `ads`, attaching the signature.
    ///
    /// On failure the bundle comes back with an empty signature.
    pub fn sign(&self, ads: ContextualAds) -> SignedContextualAds {
        let bytes = canonical_bytes(&ads);
        debug!(
            buyer = %ads.buyer(),
            canonical_len = bytes.len(),
            fingerprint = %sha256_hex(&bytes),
            "signing contextual ads"
        );

        match self.try_sign_bytes(&bytes) {
            SigningOutcome::Signed(signature) => SignedContextualAds::new(ads, signature),
            SigningOutcome::Unsigned { reason } => {
                warn!(
                    buyer = %ads.buyer(),
                    error = %reason,
                    "signing contextual ads failed, returning unsigned bundle"
                );
                SignedContextualAds::unsigned(ads)
            }
        }
    }
}

// ============================================================================
// Verification
// ============================================================================

/// Check a signed bundle against `public_key`. Unsigned bundles never verify.
pub fn verify_signed(public_key: &VerifyingKey, signed: &SignedContextualAds) -> bool {
    if !signed.is_signed() {
        return false;
    }
    verify_der(public_key, &canonical_bytes(signed.ads()), signed.signature())
}

/// [`verify_signed`] with a base64 SubjectPublicKeyInfo DER key.
pub fn verify_signed_with_spki_base64(spki_b64: &str, signed: &SignedContextualAds) -> Result<bool> {
    let public_key = import_verifying_key_spki_base64(spki_b64)?;
    Ok(verify_signed(&public_key, signed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdsError;
    use crate::test_keys::TEST_PUBLIC_KEY_SPKI_BASE64;
    use crate::types::{AdData, AdWithBid};

    fn ads(render_uri: &str) -> ContextualAds {
        ContextualAds::builder()
            .buyer("buyer.example.com")
            .decision_logic_uri("https://example.com/decision")
            .ad_with_bid(AdWithBid::new(
                AdData::builder()
                    .render_uri(render_uri)
                    .metadata("{}")
                    .build()
                    .unwrap(),
                1.5,
            ))
            .build()
            .unwrap()
    }

    #[test]
    fn test_key_signs_and_verifies() {
        let signed = ContextualAdsSigner::with_test_key().sign(ads("https://example.com/ad1"));
        assert!(signed.is_signed());
        assert!(verify_signed_with_spki_base64(TEST_PUBLIC_KEY_SPKI_BASE64, &signed).unwrap());
    }

    #[test]
    fn test_key_matches_published_public_key() {
        let key = ContextualAdsSigner::with_test_key().verifying_key().unwrap();
        let published = import_verifying_key_spki_base64(TEST_PUBLIC_KEY_SPKI_BASE64).unwrap();
        assert_eq!(key, published);
    }

    #[test]
    fn corrupt_key_fails_open() {
        let signer = ContextualAdsSigner::new(SigningKeyMaterial::from_pkcs8_der(vec![1, 2, 3]));
        let bundle = ads("https://example.com/ad1");
        let signed = signer.sign(bundle.clone());
        assert!(!signed.is_signed());
        assert_eq!(signed.ads(), &bundle);
    }

    #[test]
    fn corrupt_key_outcome_carries_reason() {
        let signer = ContextualAdsSigner::new(SigningKeyMaterial::from_pkcs8_der(Vec::new()));
        match signer.try_sign_bytes(b"payload") {
            SigningOutcome::Unsigned { reason } => assert!(!reason.is_empty()),
            SigningOutcome::Signed(_) => panic!("empty key material must not sign"),
        }
    }

    #[test]
    fn corrupt_key_has_no_verifying_key() {
        let signer = ContextualAdsSigner::new(SigningKeyMaterial::from_pkcs8_der(vec![0u8; 8]));
        assert!(matches!(
            signer.verifying_key().unwrap_err(),
            AdsError::Crypto(CryptoError::InvalidPrivateKey(_))
        ));
    }

    #[test]
    fn unsigned_bundle_never_verifies() {
        let key = ContextualAdsSigner::with_test_key().verifying_key().unwrap();
        let unsigned = SignedContextualAds::unsigned(ads("https://example.com/ad1"));
        assert!(!verify_signed(&key, &unsigned));
    }

    #[test]
    fn signature_does_not_transfer_between_bundles() {
        let signer = ContextualAdsSigner::with_test_key();
        let key = signer.verifying_key().unwrap();
        let (_, signature) = signer.sign(ads("https://example.com/ad1")).into_parts();
        let forged = SignedContextualAds::new(ads("https://example.com/ad2"), signature);
        assert!(!verify_signed(&key, &forged));
    }

    #[test]
    fn outcome_into_signature() {
        assert_eq!(SigningOutcome::Signed(vec![1]).into_signature(), vec![1]);
        let unsigned = SigningOutcome::Unsigned {
            reason: "x".to_string(),
        };
        assert!(!unsigned.is_signed());
        assert!(unsigned.into_signature().is_empty());
    }

    #[test]
    fn debug_redacts_key_material() {
        let rendered = format!("{:?}", SigningKeyMaterial::test_key());
        assert!(rendered.contains("redacted"));
        assert!(!rendered.contains("48, 129"));
    }
}
