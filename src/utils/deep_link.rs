//! Deep-link encoding for /start payloads.
//!
//! A deep link carries a search query as a base64url payload (padding
//! stripped), so opening the link pre-fills the search.

use anyhow::Context;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Encode a query into a /start payload.
pub fn encode_deep_link(query: &str) -> String {
    URL_SAFE_NO_PAD.encode(query.as_bytes())
}

/// Decode a /start payload back into the original query.
pub fn decode_deep_link(payload: &str) -> anyhow::Result<String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .context("invalid deep link payload")?;
    String::from_utf8(bytes).context("deep link payload is not valid UTF-8")
}

/// Build the full bot deep-link URL for a query.
pub fn deep_link_url(bot_username: &str, query: &str) -> String {
    format!("https://t.me/{}?start={}", bot_username, encode_deep_link(query))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let query = "Inception 2010";
        let encoded = encode_deep_link(query);
        assert_eq!(decode_deep_link(&encoded).unwrap(), query);
    }

    #[test]
    fn test_no_padding_in_link() {
        // "ab" encodes to a padded base64 string; the link must strip it.
        let encoded = encode_deep_link("ab");
        assert!(!encoded.contains('='));
        assert_eq!(decode_deep_link(&encoded).unwrap(), "ab");
    }

    #[test]
    fn test_padded_input_still_decodes() {
        // Older deployments shipped padded payloads.
        let padded = format!("{}==", encode_deep_link("ab"));
        assert_eq!(decode_deep_link(&padded).unwrap(), "ab");
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(decode_deep_link("!!not-base64!!").is_err());
    }

    #[test]
    fn test_url_shape() {
        let url = deep_link_url("cinevault_bot", "dune");
        assert!(url.starts_with("https://t.me/cinevault_bot?start="));
    }
}
