use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

/// Pre-filled chat URL the front end opens in a new tab per brief.
const SHARE_URL_BASE: &str = "https://chat.openai.com/?q=";

/// Builds the hand-off URL for one brief. Opening the tab (and reporting
/// success to the user) is the front end's job; we only encode the text.
pub fn share_url(prompt: &str) -> String {
    format!("{SHARE_URL_BASE}{}", utf8_percent_encode(prompt, NON_ALPHANUMERIC))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_starts_with_fixed_base() {
        assert!(share_url("hello").starts_with(SHARE_URL_BASE));
    }

    #[test]
    fn reserved_characters_are_encoded() {
        let url = share_url("a b&c=d/e?f");
        let query = &url[SHARE_URL_BASE.len()..];
        assert_eq!(query, "a%20b%26c%3Dd%2Fe%3Ff");
    }

    #[test]
    fn unicode_is_percent_encoded() {
        let url = share_url("café");
        assert!(url.ends_with("caf%C3%A9"));
    }
}
