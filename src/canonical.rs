//! Canonical byte form of a contextual ads bundle, the input to signing.
//!
//! Every field is written as `<token><value>|` in a fixed order. Nested
//! objects are written inline after their own token. Sets are sorted before
//! writing; lists keep their order. Values are not escaped, so a `|` or `,`
//! inside a string is indistinguishable from a separator.
//!
//! Example: `buyer=b|decision_logic_uri=d|ads_with_bid=ad_data=ad_counter_keys=|metadata={}|render_uri=r|bid=1.50|`

use std::fmt::Display;

use contextual_ads_crypto::sha256_hex;

use crate::types::{
    AdData, AdFilters, AdWithBid, ContextualAds, FrequencyCapEvent, FrequencyCapFilters,
    KeyedFrequencyCap,
};

pub const BUYER: &str = "buyer=";
pub const DECISION_LOGIC_URI: &str = "decision_logic_uri=";
pub const ADS_WITH_BID: &str = "ads_with_bid=";
pub const AD_DATA: &str = "ad_data=";
pub const BID: &str = "bid=";
pub const AD_COUNTER_KEYS: &str = "ad_counter_keys=";
pub const AD_FILTERS: &str = "ad_filters=";
pub const AD_RENDER_ID: &str = "ad_render_id=";
pub const METADATA: &str = "metadata=";
pub const RENDER_URI: &str = "render_uri=";
pub const APP_INSTALL_FILTERS: &str = "app_install_filters=";
pub const PACKAGE_NAMES: &str = "package_names=";
pub const FREQUENCY_CAP_FILTERS: &str = "frequency_cap_filters=";
pub const KEYED_FREQUENCY_CAPS_FOR_CLICK_EVENTS: &str = "keyed_frequency_caps_for_click_events=";
pub const KEYED_FREQUENCY_CAPS_FOR_IMPRESSION_EVENTS: &str =
    "keyed_frequency_caps_for_impression_events=";
pub const KEYED_FREQUENCY_CAPS_FOR_VIEW_EVENTS: &str = "keyed_frequency_caps_for_view_events=";
pub const KEYED_FREQUENCY_CAPS_FOR_WIN_EVENTS: &str = "keyed_frequency_caps_for_win_events=";
pub const AD_COUNTER_KEY: &str = "ad_counter_key=";
pub const INTERVAL: &str = "interval=";
pub const MAX_COUNT: &str = "max_count=";

pub const FIELD_SEPARATOR: &str = "|";
pub const ELEMENT_SEPARATOR: &str = ",";

// ============================================================================
// Public API
// ============================================================================

/// Serialize a bundle to its canonical bytes.
///
/// Logically equal bundles always produce identical bytes: sets are already
/// ordered by the model, and every list is written in stored order.
pub fn canonical_bytes(ads: &ContextualAds) -> Vec<u8> {
    let mut writer = CanonicalWriter::default();
    writer.contextual_ads(ads);
    writer.into_bytes()
}

/// Canonical form as a string. Lossless, since every value is UTF-8.
pub fn canonical_string(ads: &ContextualAds) -> String {
    let mut writer = CanonicalWriter::default();
    writer.contextual_ads(ads);
    writer.out
}

/// Hex SHA-256 of the canonical bytes, for logs and cache keys.
pub fn canonical_fingerprint(ads: &ContextualAds) -> String {
    sha256_hex(&canonical_bytes(ads))
}

/// Format a bid with exactly two decimals.
///
/// Rounds half-up on the shortest decimal form that round-trips the value,
/// so `1.005` becomes `1.01` even though its binary value sits just below
/// the tie. Output never depends on locale.
pub fn format_bid(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    // Display for f64 is the shortest round-trip form and never uses an exponent.
    let shortest = format!("{}", value.abs());
    let (int_part, frac_part) = shortest.split_once('.').unwrap_or((&shortest, ""));
    let frac = frac_part.as_bytes();

    let mut digits: Vec<u8> = int_part.bytes().collect();
    digits.push(frac.first().copied().unwrap_or(b'0'));
    digits.push(frac.get(1).copied().unwrap_or(b'0'));

    if frac.get(2).is_some_and(|d| *d >= b'5') {
        increment_decimal(&mut digits);
    }

    let split = digits.len() - 2;
    let mut out = String::with_capacity(digits.len() + 2);
    if value.is_sign_negative() {
        out.push('-');
    }
    out.extend(digits[..split].iter().map(|d| *d as char));
    out.push('.');
    out.extend(digits[split..].iter().map(|d| *d as char));
    out
}

fn increment_decimal(digits: &mut Vec<u8>) {
    for digit in digits.iter_mut().rev() {
        if *digit == b'9' {
            *digit = b'0';
        } else {
            *digit += 1;
            return;
        }
    }
    digits.insert(0, b'1');
}

// ============================================================================
// CanonicalWriter
// ============================================================================

#[derive(Default)]
struct CanonicalWriter {
    out: String,
}

impl CanonicalWriter {
    fn into_bytes(self) -> Vec<u8> {
        self.out.into_bytes()
    }

    fn field(&mut self, token: &str, value: impl Display) {
        self.out.push_str(token);
        self.out.push_str(&value.to_string());
        self.out.push_str(FIELD_SEPARATOR);
    }

    /// Scalars joined by `,` and terminated by `|`. Callers pass sets in
    /// sorted order.
    fn scalars<T: Display>(&mut self, token: &str, items: impl IntoIterator<Item = T>) {
        self.out.push_str(token);
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                self.out.push_str(ELEMENT_SEPARATOR);
            }
            self.out.push_str(&item.to_string());
        }
        self.out.push_str(FIELD_SEPARATOR);
    }

    /// Objects joined by `,`. Each object already ends with `|`, so only an
    /// empty list needs an explicit terminator.
    fn objects<T>(&mut self, token: &str, items: &[T], mut write: impl FnMut(&mut Self, &T)) {
        self.out.push_str(token);
        if items.is_empty() {
            self.out.push_str(FIELD_SEPARATOR);
            return;
        }
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push_str(ELEMENT_SEPARATOR);
            }
            write(self, item);
        }
    }

    fn contextual_ads(&mut self, ads: &ContextualAds) {
        self.field(BUYER, &ads.buyer);
        self.field(DECISION_LOGIC_URI, &ads.decision_logic_uri);
        self.objects(ADS_WITH_BID, &ads.ads_with_bid, Self::ad_with_bid);
    }

    fn ad_with_bid(&mut self, ad: &AdWithBid) {
        self.out.push_str(AD_DATA);
        self.ad_data(&ad.ad_data);
        self.field(BID, format_bid(ad.bid));
    }

    fn ad_data(&mut self, data: &AdData) {
        self.scalars(AD_COUNTER_KEYS, &data.ad_counter_keys);
        if let Some(filters) = &data.ad_filters {
            self.out.push_str(AD_FILTERS);
            self.ad_filters(filters);
        }
        if let Some(render_id) = &data.ad_render_id {
            self.field(AD_RENDER_ID, render_id);
        }
        self.field(METADATA, &data.metadata);
        self.field(RENDER_URI, &data.render_uri);
    }

    fn ad_filters(&mut self, filters: &AdFilters) {
        if let Some(app_install) = &filters.app_install_filters {
            self.out.push_str(APP_INSTALL_FILTERS);
            self.scalars(PACKAGE_NAMES, &app_install.package_names);
        }
        if let Some(frequency_caps) = &filters.frequency_cap_filters {
            self.out.push_str(FREQUENCY_CAP_FILTERS);
            self.frequency_cap_filters(frequency_caps);
        }
    }

    fn frequency_cap_filters(&mut self, filters: &FrequencyCapFilters) {
        for event in FrequencyCapEvent::ALL {
            self.objects(
                frequency_cap_token(event),
                filters.caps_for(event),
                Self::keyed_frequency_cap,
            );
        }
    }

    fn keyed_frequency_cap(&mut self, cap: &KeyedFrequencyCap) {
        self.field(AD_COUNTER_KEY, cap.ad_counter_key);
        self.field(INTERVAL, cap.interval.as_millis());
        self.field(MAX_COUNT, cap.max_count);
    }
}

fn frequency_cap_token(event: FrequencyCapEvent) -> &'static str {
    match event {
        FrequencyCapEvent::Click => KEYED_FREQUENCY_CAPS_FOR_CLICK_EVENTS,
        FrequencyCapEvent::Impression => KEYED_FREQUENCY_CAPS_FOR_IMPRESSION_EVENTS,
        FrequencyCapEvent::View => KEYED_FREQUENCY_CAPS_FOR_VIEW_EVENTS,
        FrequencyCapEvent::Win => KEYED_FREQUENCY_CAPS_FOR_WIN_EVENTS,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::types::AppInstallFilters;

    fn ad(render_uri: &str, bid: f64) -> AdWithBid {
        AdWithBid::new(
            AdData::builder()
                .render_uri(render_uri)
                .metadata("{}")
                .build()
                .unwrap(),
            bid,
        )
    }

    fn bundle(ads: Vec<AdWithBid>) -> ContextualAds {
        ContextualAds::builder()
            .buyer("buyer.example.com")
            .decision_logic_uri("https://example.com/decision")
            .ads_with_bid(ads)
            .build()
            .unwrap()
    }

    fn cap(key: i32, secs: u64, max_count: i32) -> KeyedFrequencyCap {
        KeyedFrequencyCap::builder()
            .ad_counter_key(key)
            .interval(Duration::from_secs(secs))
            .max_count(max_count)
            .build()
            .unwrap()
    }

    #[test]
    fn single_ad_matches_reference_string() {
        let ads = bundle(vec![ad("https://example.com/ad1", 1.5)]);
        assert_eq!(
            canonical_string(&ads),
            "buyer=buyer.example.com|decision_logic_uri=https://example.com/decision|\
             ads_with_bid=ad_data=ad_counter_keys=|metadata={}|render_uri=https://example.com/ad1|\
             bid=1.50|"
        );
    }

    #[test]
    fn bytes_and_string_agree() {
        let ads = bundle(vec![ad("https://example.com/ad1", 1.5)]);
        assert_eq!(canonical_bytes(&ads), canonical_string(&ads).into_bytes());
    }

    #[test]
    fn empty_ads_list_is_just_a_separator() {
        let ads = bundle(vec![]);
        assert_eq!(
            canonical_string(&ads),
            "buyer=buyer.example.com|decision_logic_uri=https://example.com/decision|ads_with_bid=|"
        );
    }

    #[test]
    fn multiple_ads_are_comma_joined_in_order() {
        let ads = bundle(vec![ad("a", 1.0), ad("b", 2.0)]);
        assert!(canonical_string(&ads).ends_with(
            "ads_with_bid=ad_data=ad_counter_keys=|metadata={}|render_uri=a|bid=1.00|,\
             ad_data=ad_counter_keys=|metadata={}|render_uri=b|bid=2.00|"
        ));
    }

    #[test]
    fn optional_fields_are_written_in_schema_order() {
        let filters = AdFilters::new(
            Some(AppInstallFilters::new(["com.b", "com.a"])),
            Some(
                FrequencyCapFilters::builder()
                    .cap(FrequencyCapEvent::Click, cap(1, 60, 2))
                    .cap(FrequencyCapEvent::Win, cap(5, 1, 1))
                    .cap(FrequencyCapEvent::Win, cap(3, 2, 4))
                    .build(),
            ),
        );
        let data = AdData::builder()
            .render_uri("r")
            .metadata("m")
            .ad_render_id("id-7")
            .ad_counter_keys([20, 10])
            .ad_filters(filters)
            .build()
            .unwrap();
        let ads = bundle(vec![AdWithBid::new(data, 0.5)]);

        assert_eq!(
            canonical_string(&ads),
            "buyer=buyer.example.com|decision_logic_uri=https://example.com/decision|\
             ads_with_bid=ad_data=ad_counter_keys=10,20|\
             ad_filters=app_install_filters=package_names=com.a,com.b|\
             frequency_cap_filters=\
             keyed_frequency_caps_for_click_events=ad_counter_key=1|interval=60000|max_count=2|\
             keyed_frequency_caps_for_impression_events=|\
             keyed_frequency_caps_for_view_events=|\
             keyed_frequency_caps_for_win_events=ad_counter_key=5|interval=1000|max_count=1|,\
             ad_counter_key=3|interval=2000|max_count=4|\
             ad_render_id=id-7|metadata=m|render_uri=r|bid=0.50|"
        );
    }

    #[test]
    fn counter_keys_sort_numerically() {
        let data = AdData::builder()
            .render_uri("r")
            .metadata("m")
            .ad_counter_keys([10, -3, 2])
            .build()
            .unwrap();
        let ads = bundle(vec![AdWithBid::new(data, 1.0)]);
        assert!(canonical_string(&ads).contains("ad_counter_keys=-3,2,10|"));
    }

    #[test]
    fn empty_ad_filters_write_only_the_token() {
        let data = AdData::builder()
            .render_uri("r")
            .metadata("m")
            .ad_filters(AdFilters::default())
            .build()
            .unwrap();
        let ads = ContextualAds::builder()
            .buyer("b")
            .decision_logic_uri("d")
            .ad_with_bid(AdWithBid::new(data, 1.0))
            .build()
            .unwrap();
        assert_eq!(
            canonical_string(&ads),
            "buyer=b|decision_logic_uri=d|ads_with_bid=ad_data=ad_counter_keys=|\
             ad_filters=metadata=m|render_uri=r|bid=1.00|"
        );
    }

    #[test]
    fn separators_inside_values_are_not_escaped() {
        let ads = bundle(vec![ad("https://example.com/a|b,c", 1.0)]);
        assert!(canonical_string(&ads).contains("render_uri=https://example.com/a|b,c|"));
    }

    #[test]
    fn fingerprint_is_sha256_of_bytes() {
        let ads = bundle(vec![ad("r", 1.0)]);
        let fingerprint = canonical_fingerprint(&ads);
        assert_eq!(fingerprint.len(), 64);
        assert_eq!(fingerprint, sha256_hex(&canonical_bytes(&ads)));
    }

    #[test]
    fn bid_formatting() {
        assert_eq!(format_bid(1.5), "1.50");
        assert_eq!(format_bid(2.0), "2.00");
        assert_eq!(format_bid(0.0), "0.00");
        assert_eq!(format_bid(1234567.891), "1234567.89");
        assert_eq!(format_bid(-1.234), "-1.23");
        assert_eq!(format_bid(1e-7), "0.00");
    }

    #[test]
    fn bid_formatting_rounds_half_up() {
        assert_eq!(format_bid(1.005), "1.01");
        assert_eq!(format_bid(0.125), "0.13");
        assert_eq!(format_bid(9.995), "10.00");
        assert_eq!(format_bid(0.994), "0.99");
        assert_eq!(format_bid(-2.675), "-2.68");
    }

    #[test]
    fn bid_formatting_non_finite() {
        assert_eq!(format_bid(f64::NAN), "NaN");
        assert_eq!(format_bid(f64::INFINITY), "Infinity");
        assert_eq!(format_bid(f64::NEG_INFINITY), "-Infinity");
    }
}
