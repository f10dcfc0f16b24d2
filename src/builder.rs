//! Validated construction of contextual ads bundles.
//!
//! Every builder collects fields as `Option`s and checks them in `build()`,
//! so a bundle that exists is always complete.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::error::{AdsError, Result};
use crate::types::{
    AdData, AdFilters, AdWithBid, AppInstallFilters, ContextualAds, FrequencyCapEvent,
    FrequencyCapFilters, KeyedFrequencyCap, MAX_FREQUENCY_CAP_INTERVAL,
};

fn required<T>(value: Option<T>, field: &'static str) -> Result<T> {
    value.ok_or(AdsError::MissingField(field))
}

// ============================================================================
// ContextualAdsBuilder
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ContextualAdsBuilder {
    buyer: Option<String>,
    decision_logic_uri: Option<String>,
    ads_with_bid: Option<Vec<AdWithBid>>,
}

impl ContextualAds {
    pub fn builder() -> ContextualAdsBuilder {
        ContextualAdsBuilder::default()
    }
}

impl ContextualAdsBuilder {
    pub fn buyer(mut self, buyer: impl Into<String>) -> Self {
        self.buyer = Some(buyer.into());
        self
    }

    pub fn decision_logic_uri(mut self, uri: impl Into<String>) -> Self {
        self.decision_logic_uri = Some(uri.into());
        self
    }

    /// Replace the ads list. An empty list is valid; an unset one is not.
    pub fn ads_with_bid(mut self, ads: Vec<AdWithBid>) -> Self {
        self.ads_with_bid = Some(ads);
        self
    }

    /// Append one ad, keeping insertion order.
    pub fn ad_with_bid(mut self, ad: AdWithBid) -> Self {
        self.ads_with_bid.get_or_insert_with(Vec::new).push(ad);
        self
    }

    pub fn build(self) -> Result<ContextualAds> {
        Ok(ContextualAds {
            buyer: required(self.buyer, "buyer")?,
            decision_logic_uri: required(self.decision_logic_uri, "decision_logic_uri")?,
            ads_with_bid: required(self.ads_with_bid, "ads_with_bid")?,
        })
    }
}

// ============================================================================
// AdWithBidBuilder
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct AdWithBidBuilder {
    ad_data: Option<AdData>,
    bid: Option<f64>,
}

impl AdWithBid {
    pub fn builder() -> AdWithBidBuilder {
        AdWithBidBuilder::default()
    }
}

impl AdWithBidBuilder {
    pub fn ad_data(mut self, ad_data: AdData) -> Self {
        self.ad_data = Some(ad_data);
        self
    }

    pub fn bid(mut self, bid: f64) -> Self {
        self.bid = Some(bid);
        self
    }

    pub fn build(self) -> Result<AdWithBid> {
        Ok(AdWithBid {
            ad_data: required(self.ad_data, "ad_data")?,
            bid: required(self.bid, "bid")?,
        })
    }
}

// ============================================================================
// AdDataBuilder
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct AdDataBuilder {
    render_uri: Option<String>,
    metadata: Option<String>,
    ad_render_id: Option<String>,
    ad_counter_keys: BTreeSet<i32>,
    ad_filters: Option<AdFilters>,
}

impl AdData {
    pub fn builder() -> AdDataBuilder {
        AdDataBuilder::default()
    }
}

impl AdDataBuilder {
    pub fn render_uri(mut self, uri: impl Into<String>) -> Self {
        self.render_uri = Some(uri.into());
        self
    }

    pub fn metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }

    pub fn ad_render_id(mut self, id: impl Into<String>) -> Self {
        self.ad_render_id = Some(id.into());
        self
    }

    /// Add counter keys. Duplicates collapse; order is irrelevant.
    pub fn ad_counter_keys(mut self, keys: impl IntoIterator<Item = i32>) -> Self {
        self.ad_counter_keys.extend(keys);
        self
    }

    pub fn ad_filters(mut self, filters: AdFilters) -> Self {
        self.ad_filters = Some(filters);
        self
    }

    pub fn build(self) -> Result<AdData> {
        Ok(AdData {
            render_uri: required(self.render_uri, "render_uri")?,
            metadata: required(self.metadata, "metadata")?,
            ad_render_id: self.ad_render_id,
            ad_counter_keys: self.ad_counter_keys,
            ad_filters: self.ad_filters,
        })
    }
}

// ============================================================================
// FrequencyCapFiltersBuilder
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct FrequencyCapFiltersBuilder {
    filters: FrequencyCapFilters,
}

impl FrequencyCapFilters {
    pub fn builder() -> FrequencyCapFiltersBuilder {
        FrequencyCapFiltersBuilder::default()
    }
}

impl FrequencyCapFiltersBuilder {
    /// Append a cap to the list for `event`, keeping insertion order.
    pub fn cap(mut self, event: FrequencyCapEvent, cap: KeyedFrequencyCap) -> Self {
        self.filters.caps_for_mut(event).push(cap);
        self
    }

    /// Replace the list for `event`.
    pub fn caps(mut self, event: FrequencyCapEvent, caps: Vec<KeyedFrequencyCap>) -> Self {
        *self.filters.caps_for_mut(event) = caps;
        self
    }

    pub fn build(self) -> FrequencyCapFilters {
        self.filters
    }
}

// ============================================================================
// KeyedFrequencyCapBuilder
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct KeyedFrequencyCapBuilder {
    ad_counter_key: Option<i32>,
    interval: Option<Duration>,
    max_count: Option<i32>,
}

impl KeyedFrequencyCap {
    pub fn builder() -> KeyedFrequencyCapBuilder {
        KeyedFrequencyCapBuilder::default()
    }
}

impl KeyedFrequencyCapBuilder {
    pub fn ad_counter_key(mut self, key: i32) -> Self {
        self.ad_counter_key = Some(key);
        self
    }

    /// Sub-second precision is dropped at build time.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn max_count(mut self, max_count: i32) -> Self {
        self.max_count = Some(max_count);
        self
    }

    pub fn build(self) -> Result<KeyedFrequencyCap> {
        let ad_counter_key = required(self.ad_counter_key, "ad_counter_key")?;
        let interval = Duration::from_secs(required(self.interval, "interval")?.as_secs());
        let max_count = required(self.max_count, "max_count")?;

        if max_count <= 0 {
            return Err(AdsError::InvalidField {
                field: "max_count",
                reason: format!("must be positive, got {}", max_count),
            });
        }
        if interval.is_zero() {
            return Err(AdsError::InvalidField {
                field: "interval",
                reason: "must be at least one second".to_string(),
            });
        }
        if interval > MAX_FREQUENCY_CAP_INTERVAL {
            return Err(AdsError::InvalidField {
                field: "interval",
                reason: format!(
                    "must be at most {} seconds, got {}",
                    MAX_FREQUENCY_CAP_INTERVAL.as_secs(),
                    interval.as_secs()
                ),
            });
        }

        Ok(KeyedFrequencyCap {
            ad_counter_key,
            interval,
            max_count,
        })
    }
}

impl From<AppInstallFilters> for AdFilters {
    fn from(filters: AppInstallFilters) -> Self {
        AdFilters::new(Some(filters), None)
    }
}

impl From<FrequencyCapFilters> for AdFilters {
    fn from(filters: FrequencyCapFilters) -> Self {
        AdFilters::new(None, Some(filters))
    }
}
