use base64ct::{Base64, Base64UrlUnpadded, Encoding};

/// Standard (padded) base64 encode, the alphabet used for PKCS#8 and SPKI
/// key blobs and for the `signature` field of a signed bundle.
pub fn base64_encode(data: &[u8]) -> String {
    Base64::encode_string(data)
}

/// Standard (padded) base64 decode.
pub fn base64_decode(s: &str) -> Result<Vec<u8>, base64ct::Error> {
    Base64::decode_vec(s.trim())
}

/// Base64url encode bytes without padding.
pub fn base64url_encode(data: &[u8]) -> String {
    Base64UrlUnpadded::encode_string(data)
}

/// Base64url decode a string to bytes.
pub fn base64url_decode(s: &str) -> Result<Vec<u8>, base64ct::Error> {
    Base64UrlUnpadded::decode_vec(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_round_trip_keeps_padding() {
        let encoded = base64_encode(b"ab");
        assert_eq!(encoded, "YWI=");
        assert_eq!(base64_decode(&encoded).unwrap(), b"ab");
    }

    #[test]
    fn standard_decode_ignores_surrounding_whitespace() {
        assert_eq!(base64_decode(" YWI=\n").unwrap(), b"ab");
    }

    #[test]
    fn url_safe_chars() {
        // Bytes that would produce + and / in standard base64
        let data = vec![0xfb, 0xff, 0xfe];
        let encoded = base64url_encode(&data);
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert!(!encoded.contains('='));
        assert_eq!(base64url_decode(&encoded).unwrap(), data);
    }

    #[test]
    fn empty_input() {
        assert_eq!(base64_encode(b""), "");
        assert_eq!(base64_decode("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn rejects_garbage() {
        assert!(base64_decode("not base64!").is_err());
    }
}
