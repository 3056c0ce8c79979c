use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Default number of leading characters that identify a brief. The opening of
/// a brief is the filled blueprint, so two briefs sharing this prefix were
/// assembled from the same fragment combination.
pub const DEFAULT_PREFIX_LEN: usize = 160;

/// Rejects briefs whose opening matches one already seen in this batch.
/// Exact prefix match only; digests keep the set small regardless of brief
/// length.
pub struct PromptDeduper {
    prefix_len: usize,
    seen: HashSet<String>,
}

impl PromptDeduper {
    pub fn new(prefix_len: usize) -> Self {
        Self { prefix_len, seen: HashSet::new() }
    }

    /// Returns true if a brief with this prefix was seen before; records the
    /// prefix either way.
    pub fn check_and_insert(&mut self, text: &str) -> bool {
        let digest = self.digest(text);
        !self.seen.insert(digest)
    }

    fn digest(&self, text: &str) -> String {
        let end = text
            .char_indices()
            .nth(self.prefix_len)
            .map(|(i, _)| i)
            .unwrap_or(text.len());
        let mut h = Sha256::new();
        h.update(text[..end].as_bytes());
        format!("{:x}", h.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sighting_is_not_a_duplicate() {
        let mut d = PromptDeduper::new(DEFAULT_PREFIX_LEN);
        assert!(!d.check_and_insert("a brand new brief"));
    }

    #[test]
    fn repeat_is_a_duplicate() {
        let mut d = PromptDeduper::new(DEFAULT_PREFIX_LEN);
        d.check_and_insert("the same brief");
        assert!(d.check_and_insert("the same brief"));
    }

    #[test]
    fn only_the_prefix_counts() {
        let mut d = PromptDeduper::new(8);
        d.check_and_insert("prefixAA tail one");
        assert!(d.check_and_insert("prefixAA completely different tail"));
        assert!(!d.check_and_insert("prefixBB tail one"));
    }

    #[test]
    fn multibyte_prefix_does_not_panic() {
        let mut d = PromptDeduper::new(4);
        assert!(!d.check_and_insert("café ☕ brief"));
        assert!(d.check_and_insert("café ☕ other"));
    }
}
