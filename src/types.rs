//! Contextual ads bundle data model.
//!
//! All types are immutable once built. Construct them through the builders in
//! [`crate::builder`] or from JSON via [`crate::json`]; both paths validate
//! required fields.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Serialize, Serializer};

use contextual_ads_crypto::base64_encode;

/// Longest interval a keyed frequency cap may span (100 days).
pub const MAX_FREQUENCY_CAP_INTERVAL: Duration = Duration::from_secs(100 * 24 * 60 * 60);

// ============================================================================
// ContextualAds
// ============================================================================

/// Ads a buyer supplies directly to an auction, outside the on-device
/// custom audience flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextualAds {
    /// Ad tech identifier (domain) of the buyer.
    pub(crate) buyer: String,
    /// URI of the buyer's scoring logic.
    pub(crate) decision_logic_uri: String,
    /// Ordered ads with their bids.
    pub(crate) ads_with_bid: Vec<AdWithBid>,
}

impl ContextualAds {
    pub fn buyer(&self) -> &str {
        &self.buyer
    }

    pub fn decision_logic_uri(&self) -> &str {
        &self.decision_logic_uri
    }

    pub fn ads_with_bid(&self) -> &[AdWithBid] {
        &self.ads_with_bid
    }
}

/// One ad and the bid placed on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdWithBid {
    pub(crate) ad_data: AdData,
    pub(crate) bid: f64,
}

impl AdWithBid {
    pub fn new(ad_data: AdData, bid: f64) -> Self {
        Self { ad_data, bid }
    }

    pub fn ad_data(&self) -> &AdData {
        &self.ad_data
    }

    pub fn bid(&self) -> f64 {
        self.bid
    }
}

// ============================================================================
// AdData
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdData {
    pub(crate) render_uri: String,
    /// Opaque buyer metadata, usually a JSON object string.
    pub(crate) metadata: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) ad_render_id: Option<String>,
    /// Counter keys are a set: ordering is canonical, not insertion.
    pub(crate) ad_counter_keys: BTreeSet<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) ad_filters: Option<AdFilters>,
}

impl AdData {
    pub fn render_uri(&self) -> &str {
        &self.render_uri
    }

    pub fn metadata(&self) -> &str {
        &self.metadata
    }

    pub fn ad_render_id(&self) -> Option<&str> {
        self.ad_render_id.as_deref()
    }

    pub fn ad_counter_keys(&self) -> &BTreeSet<i32> {
        &self.ad_counter_keys
    }

    pub fn ad_filters(&self) -> Option<&AdFilters> {
        self.ad_filters.as_ref()
    }
}

// ============================================================================
// Filters
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) app_install_filters: Option<AppInstallFilters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) frequency_cap_filters: Option<FrequencyCapFilters>,
}

impl AdFilters {
    pub fn new(
        app_install_filters: Option<AppInstallFilters>,
        frequency_cap_filters: Option<FrequencyCapFilters>,
    ) -> Self {
        Self {
            app_install_filters,
            frequency_cap_filters,
        }
    }

    pub fn app_install_filters(&self) -> Option<&AppInstallFilters> {
        self.app_install_filters.as_ref()
    }

    pub fn frequency_cap_filters(&self) -> Option<&FrequencyCapFilters> {
        self.frequency_cap_filters.as_ref()
    }
}

/// Skip the ad when any of these packages is installed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInstallFilters {
    pub(crate) package_names: BTreeSet<String>,
}

impl AppInstallFilters {
    pub fn new<I, S>(package_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            package_names: package_names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn package_names(&self) -> &BTreeSet<String> {
        &self.package_names
    }
}

/// Ad event types a frequency cap can count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrequencyCapEvent {
    Click,
    Impression,
    View,
    Win,
}

impl FrequencyCapEvent {
    /// Canonical serialization order.
    pub const ALL: [FrequencyCapEvent; 4] = [
        FrequencyCapEvent::Click,
        FrequencyCapEvent::Impression,
        FrequencyCapEvent::View,
        FrequencyCapEvent::Win,
    ];
}

/// Four ordered lists of caps, one per event type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyCapFilters {
    pub(crate) keyed_frequency_caps_for_click_events: Vec<KeyedFrequencyCap>,
    pub(crate) keyed_frequency_caps_for_impression_events: Vec<KeyedFrequencyCap>,
    pub(crate) keyed_frequency_caps_for_view_events: Vec<KeyedFrequencyCap>,
    pub(crate) keyed_frequency_caps_for_win_events: Vec<KeyedFrequencyCap>,
}

impl FrequencyCapFilters {
    pub fn caps_for(&self, event: FrequencyCapEvent) -> &[KeyedFrequencyCap] {
        match event {
            FrequencyCapEvent::Click => &self.keyed_frequency_caps_for_click_events,
            FrequencyCapEvent::Impression => &self.keyed_frequency_caps_for_impression_events,
            FrequencyCapEvent::View => &self.keyed_frequency_caps_for_view_events,
            FrequencyCapEvent::Win => &self.keyed_frequency_caps_for_win_events,
        }
    }

    pub(crate) fn caps_for_mut(&mut self, event: FrequencyCapEvent) -> &mut Vec<KeyedFrequencyCap> {
        match event {
            FrequencyCapEvent::Click => &mut self.keyed_frequency_caps_for_click_events,
            FrequencyCapEvent::Impression => &mut self.keyed_frequency_caps_for_impression_events,
            FrequencyCapEvent::View => &mut self.keyed_frequency_caps_for_view_events,
            FrequencyCapEvent::Win => &mut self.keyed_frequency_caps_for_win_events,
        }
    }
}

/// At most `max_count` events for `ad_counter_key` within `interval`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyedFrequencyCap {
    pub(crate) ad_counter_key: i32,
    #[serde(rename = "intervalSeconds", serialize_with = "serialize_seconds")]
    pub(crate) interval: Duration,
    pub(crate) max_count: i32,
}

impl KeyedFrequencyCap {
    pub fn ad_counter_key(&self) -> i32 {
        self.ad_counter_key
    }

    /// Whole-second interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_count(&self) -> i32 {
        self.max_count
    }
}

fn serialize_seconds<S: Serializer>(interval: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(interval.as_secs())
}

// ============================================================================
// SignedContextualAds
// ============================================================================

/// A bundle with its signature attached.
///
/// An empty signature means signing failed and the bundle was passed through
/// unsigned; downstream verification rejects it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignedContextualAds {
    #[serde(flatten)]
    pub(crate) ads: ContextualAds,
    #[serde(serialize_with = "serialize_base64")]
    pub(crate) signature: Vec<u8>,
}

impl SignedContextualAds {
    pub fn new(ads: ContextualAds, signature: Vec<u8>) -> Self {
        Self { ads, signature }
    }

    /// The bundle with no signature attached.
    pub fn unsigned(ads: ContextualAds) -> Self {
        Self::new(ads, Vec::new())
    }

    pub fn ads(&self) -> &ContextualAds {
        &self.ads
    }

    /// DER-encoded ECDSA signature, empty when unsigned.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }

    pub fn into_parts(self) -> (ContextualAds, Vec<u8>) {
        (self.ads, self.signature)
    }
}

fn serialize_base64<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&base64_encode(bytes))
}
