//! Signer configuration.
//!
//! Key material is injected rather than compiled in. A JSON config names the
//! key, and the `CONTEXTUAL_ADS_SIGNING_KEY` environment variable overrides it.
//!
//! ```json
//! { "privateKeyPkcs8Base64": "MIGHAgEAMBMG...", "useTestKey": false }
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AdsError, Result};
use crate::signer::SigningKeyMaterial;

/// Environment variable holding a base64 PKCS#8 signing key.
pub const SIGNING_KEY_ENV: &str = "CONTEXTUAL_ADS_SIGNING_KEY";

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignerConfig {
    /// Base64 PKCS#8 DER private key. Takes precedence over `use_test_key`.
    pub private_key_pkcs8_base64: Option<String>,
    /// Sign with the shared test key when no private key is given.
    pub use_test_key: bool,
}

impl SignerConfig {
    /// Config selecting the shared test key.
    pub fn test_key() -> Self {
        Self {
            private_key_pkcs8_base64: None,
            use_test_key: true,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Apply [`SIGNING_KEY_ENV`] from the process environment.
    pub fn with_env_override(self) -> Self {
        self.with_env_lookup(|name| std::env::var(name).ok())
    }

    /// Apply [`SIGNING_KEY_ENV`] through `lookup`. Blank values are ignored.
    pub fn with_env_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup(SIGNING_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            self.private_key_pkcs8_base64 = Some(key);
        }
        self
    }

    /// Resolve the configured key.
    ///
    /// Only base64 decoding is checked here; the key itself is parsed when
    /// signing, where a bad key degrades to unsigned output.
    pub fn key_material(&self) -> Result<SigningKeyMaterial> {
        match (&self.private_key_pkcs8_base64, self.use_test_key) {
            (Some(encoded), _) => SigningKeyMaterial::from_pkcs8_base64(encoded),
            (None, true) => Ok(SigningKeyMaterial::test_key()),
            (None, false) => Err(AdsError::Config(
                "no privateKeyPkcs8Base64 and useTestKey is false".to_string(),
            )),
        }
    }
}

impl fmt::Debug for SignerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerConfig")
            .field(
                "private_key_pkcs8_base64",
                &self.private_key_pkcs8_base64.as_ref().map(|_| "<redacted>"),
            )
            .field("use_test_key", &self.use_test_key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::test_keys::TEST_PRIVATE_KEY_PKCS8_BASE64;

    #[test]
    fn empty_config_has_no_key() {
        let config = SignerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SignerConfig::default());
        assert!(matches!(config.key_material().unwrap_err(), AdsError::Config(_)));
    }

    #[test]
    fn test_key_flag_selects_test_key() {
        let config = SignerConfig::from_json_str(r#"{"useTestKey": true}"#).unwrap();
        let material = config.key_material().unwrap();
        assert_eq!(material.as_der(), SigningKeyMaterial::test_key().as_der());
    }

    #[test]
    fn explicit_key_wins_over_test_flag() {
        let config = SignerConfig {
            private_key_pkcs8_base64: Some("AQID".to_string()),
            use_test_key: true,
        };
        assert_eq!(config.key_material().unwrap().as_der(), &[1, 2, 3]);
    }

    #[test]
    fn bad_base64_is_rejected() {
        let config = SignerConfig {
            private_key_pkcs8_base64: Some("***".to_string()),
            use_test_key: false,
        };
        assert!(matches!(config.key_material().unwrap_err(), AdsError::Crypto(_)));
    }

    #[test]
    fn env_override_replaces_configured_key() {
        let config = SignerConfig::default().with_env_lookup(|name| {
            assert_eq!(name, SIGNING_KEY_ENV);
            Some(TEST_PRIVATE_KEY_PKCS8_BASE64.to_string())
        });
        assert_eq!(
            config.private_key_pkcs8_base64.as_deref(),
            Some(TEST_PRIVATE_KEY_PKCS8_BASE64)
        );
    }

    #[test]
    fn blank_env_value_is_ignored() {
        let config = SignerConfig::test_key().with_env_lookup(|_| Some("  ".to_string()));
        assert_eq!(config, SignerConfig::test_key());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"privateKeyPkcs8Base64": "{}"}}"#, TEST_PRIVATE_KEY_PKCS8_BASE64).unwrap();
        let config = SignerConfig::from_path(file.path()).unwrap();
        assert!(config.key_material().is_ok());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SignerConfig::from_path(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, AdsError::Io(_)));
    }

    #[test]
    fn debug_redacts_private_key() {
        let config = SignerConfig {
            private_key_pkcs8_base64: Some(TEST_PRIVATE_KEY_PKCS8_BASE64.to_string()),
            use_test_key: false,
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains(TEST_PRIVATE_KEY_PKCS8_BASE64));
        assert!(rendered.contains("<redacted>"));
    }
}
