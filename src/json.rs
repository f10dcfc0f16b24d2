//! JSON form of contextual ads bundles.
//!
//! Input goes through permissive mirror structs so an absent field surfaces
//! as [`AdsError::MissingField`], the same error the builders report.

use std::time::Duration;

use serde::Deserialize;

use contextual_ads_crypto::base64_decode;

use crate::error::{AdsError, Result};
use crate::types::{
    AdData, AdFilters, AdWithBid, AppInstallFilters, ContextualAds, FrequencyCapEvent,
    FrequencyCapFilters, KeyedFrequencyCap, SignedContextualAds,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContextualAds {
    buyer: Option<String>,
    decision_logic_uri: Option<String>,
    ads_with_bid: Option<Vec<RawAdWithBid>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAdWithBid {
    ad_data: Option<RawAdData>,
    bid: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAdData {
    render_uri: Option<String>,
    metadata: Option<String>,
    ad_render_id: Option<String>,
    #[serde(default)]
    ad_counter_keys: Vec<i32>,
    ad_filters: Option<RawAdFilters>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAdFilters {
    app_install_filters: Option<RawAppInstallFilters>,
    frequency_cap_filters: Option<RawFrequencyCapFilters>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAppInstallFilters {
    #[serde(default)]
    package_names: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawFrequencyCapFilters {
    keyed_frequency_caps_for_click_events: Vec<RawKeyedFrequencyCap>,
    keyed_frequency_caps_for_impression_events: Vec<RawKeyedFrequencyCap>,
    keyed_frequency_caps_for_view_events: Vec<RawKeyedFrequencyCap>,
    keyed_frequency_caps_for_win_events: Vec<RawKeyedFrequencyCap>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawKeyedFrequencyCap {
    ad_counter_key: Option<i32>,
    interval_seconds: Option<u64>,
    max_count: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct RawSignedContextualAds {
    #[serde(flatten)]
    ads: RawContextualAds,
    signature: Option<String>,
}

// ============================================================================
// Conversion
// ============================================================================

impl RawContextualAds {
    fn into_model(self) -> Result<ContextualAds> {
        let mut builder = ContextualAds::builder();
        if let Some(buyer) = self.buyer {
            builder = builder.buyer(buyer);
        }
        if let Some(uri) = self.decision_logic_uri {
            builder = builder.decision_logic_uri(uri);
        }
        if let Some(ads) = self.ads_with_bid {
            let ads = ads
                .into_iter()
                .map(RawAdWithBid::into_model)
                .collect::<Result<Vec<_>>>()?;
            builder = builder.ads_with_bid(ads);
        }
        builder.build()
    }
}

impl RawAdWithBid {
    fn into_model(self) -> Result<AdWithBid> {
        let mut builder = AdWithBid::builder();
        if let Some(ad_data) = self.ad_data {
            builder = builder.ad_data(ad_data.into_model()?);
        }
        if let Some(bid) = self.bid {
            builder = builder.bid(bid);
        }
        builder.build()
    }
}

impl RawAdData {
    fn into_model(self) -> Result<AdData> {
        let mut builder = AdData::builder().ad_counter_keys(self.ad_counter_keys);
        if let Some(uri) = self.render_uri {
            builder = builder.render_uri(uri);
        }
        if let Some(metadata) = self.metadata {
            builder = builder.metadata(metadata);
        }
        if let Some(id) = self.ad_render_id {
            builder = builder.ad_render_id(id);
        }
        if let Some(filters) = self.ad_filters {
            builder = builder.ad_filters(filters.into_model()?);
        }
        builder.build()
    }
}

impl RawAdFilters {
    fn into_model(self) -> Result<AdFilters> {
        let app_install = self
            .app_install_filters
            .map(|f| AppInstallFilters::new(f.package_names));
        let frequency_caps = self
            .frequency_cap_filters
            .map(RawFrequencyCapFilters::into_model)
            .transpose()?;
        Ok(AdFilters::new(app_install, frequency_caps))
    }
}

impl RawFrequencyCapFilters {
    fn into_model(self) -> Result<FrequencyCapFilters> {
        let lists = [
            (FrequencyCapEvent::Click, self.keyed_frequency_caps_for_click_events),
            (FrequencyCapEvent::Impression, self.keyed_frequency_caps_for_impression_events),
            (FrequencyCapEvent::View, self.keyed_frequency_caps_for_view_events),
            (FrequencyCapEvent::Win, self.keyed_frequency_caps_for_win_events),
        ];

        let mut builder = FrequencyCapFilters::builder();
        for (event, caps) in lists {
            let caps = caps
                .into_iter()
                .map(RawKeyedFrequencyCap::into_model)
                .collect::<Result<Vec<_>>>()?;
            builder = builder.caps(event, caps);
        }
        Ok(builder.build())
    }
}

impl RawKeyedFrequencyCap {
    fn into_model(self) -> Result<KeyedFrequencyCap> {
        let mut builder = KeyedFrequencyCap::builder();
        if let Some(key) = self.ad_counter_key {
            builder = builder.ad_counter_key(key);
        }
        if let Some(secs) = self.interval_seconds {
            builder = builder.interval(Duration::from_secs(secs));
        }
        if let Some(max_count) = self.max_count {
            builder = builder.max_count(max_count);
        }
        builder.build()
    }
}

// ============================================================================
// Public API
// ============================================================================

impl ContextualAds {
    /// Parse a bundle from camelCase JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawContextualAds = serde_json::from_str(json)?;
        raw.into_model()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl SignedContextualAds {
    /// Parse a signed bundle. The signature is standard base64; a missing
    /// `signature` field yields an unsigned bundle.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawSignedContextualAds = serde_json::from_str(json)?;
        let ads = raw.ads.into_model()?;
        let signature = match raw.signature {
            Some(encoded) => base64_decode(&encoded).map_err(|e| AdsError::InvalidField {
                field: "signature",
                reason: e.to_string(),
            })?,
            None => Vec::new(),
        };
        Ok(SignedContextualAds::new(ads, signature))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
