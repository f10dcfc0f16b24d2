//! Shared P-256 test key pair.
//!
//! Test material only. The public half is what a test auction server is
//! configured with to verify contextual ads signed by this crate.
//!
//! This pair is local to this crate and does not match the key of any
//! existing test auction server. To sign for such a server, supply its shared
//! private key through [`crate::SignerConfig`] (`privateKeyPkcs8Base64`) or
//! the `CONTEXTUAL_ADS_SIGNING_KEY` environment variable.

/// PKCS#8 DER private key, standard base64.
pub const TEST_PRIVATE_KEY_PKCS8_BASE64: &str = "MIGHAgEAMBMGByqGSM49AgEGCCqGSM49AwEHBG0wawIBAQQgbN2aqawC+ArO2PJdtT6p7mfBHOtj7Ly5dPd2Uwz2neihRANCAATKXnQxs799OzZcasuBXm9VJYRP6p7LZ1jAp/MX1ZDmmyK75epNC7RlyyXnDAloAtB5Kp5EyHUoJEOBUZjVXeKR";

/// SubjectPublicKeyInfo DER public key matching [`TEST_PRIVATE_KEY_PKCS8_BASE64`], standard base64.
pub const TEST_PUBLIC_KEY_SPKI_BASE64: &str = "MFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAEyl50MbO/fTs2XGrLgV5vVSWET+qey2dYwKfzF9WQ5psiu+XqTQu0Zcsl5wwJaALQeSqeRMh1KCRDgVGY1V3ikQ==";
