//! Signed contextual ads.
//!
//! Contextual ads are bids a buyer hands directly to an ad auction. To be
//! accepted they carry an ECDSA P-256 signature over a canonical byte form of
//! the bundle. This crate models the bundle, produces the canonical bytes,
//! and signs them on a best-effort basis: a signing failure yields an
//! unsigned bundle instead of an error.

pub mod builder;
pub mod canonical;
pub mod config;
pub mod error;
pub mod json;
pub mod signer;
pub mod test_keys;
pub mod types;

pub use builder::{
    AdDataBuilder, AdWithBidBuilder, ContextualAdsBuilder, FrequencyCapFiltersBuilder,
    KeyedFrequencyCapBuilder,
};
pub use canonical::{canonical_bytes, canonical_fingerprint, canonical_string, format_bid};
pub use config::{SignerConfig, SIGNING_KEY_ENV};
pub use error::{AdsError, Result};
pub use signer::{
    verify_signed, verify_signed_with_spki_base64, ContextualAdsSigner, SigningKeyMaterial,
    SigningOutcome,
};
pub use types::{
    AdData, AdFilters, AdWithBid, AppInstallFilters, ContextualAds, FrequencyCapEvent,
    FrequencyCapFilters, KeyedFrequencyCap, SignedContextualAds, MAX_FREQUENCY_CAP_INTERVAL,
};

pub use contextual_ads_crypto::{SigningKey, VerifyingKey};
