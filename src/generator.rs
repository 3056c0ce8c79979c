use crate::dedupe::{PromptDeduper, DEFAULT_PREFIX_LEN};
use crate::prompts::PromptBuilder;
use crate::templates::TemplateSet;

/// Attempt ceiling is `count * ATTEMPT_FACTOR`; with only a handful of
/// blueprints a small request can exhaust the unique combinations.
pub const ATTEMPT_FACTOR: u64 = 10;

/// Outcome of one batch request. `prompts` is authoritative: it may be
/// shorter than the requested count when duplicates or faults ate attempts,
/// and that is a normal outcome, not an error. The counters exist for
/// logging.
#[derive(Debug)]
pub struct Batch {
    pub prompts: Vec<String>,
    pub requested: usize,
    pub duplicates_skipped: u64,
    pub faults: u64,
    pub attempts: u64,
}

impl Batch {
    pub fn is_partial(&self) -> bool {
        self.prompts.len() < self.requested
    }
}

/// Collects unique briefs by repeatedly invoking the prompt builder.
///
/// Policy: deduplicate on the brief's leading characters, retry on collision,
/// stop at `count` unique briefs or at the attempt ceiling. Bounded attempts
/// mean the loop never spins forever, and a failed draw only reduces the
/// yield; nothing escapes this boundary.
pub struct BatchGenerator {
    builder: PromptBuilder,
    prefix_len: usize,
    attempt_factor: u64,
}

impl BatchGenerator {
    pub fn new(templates: TemplateSet, seed: u64) -> Self {
        Self {
            builder: PromptBuilder::new(templates, seed),
            prefix_len: DEFAULT_PREFIX_LEN,
            attempt_factor: ATTEMPT_FACTOR,
        }
    }

    pub fn with_limits(mut self, prefix_len: usize, attempt_factor: u64) -> Self {
        self.prefix_len = prefix_len;
        self.attempt_factor = attempt_factor.max(1);
        self
    }

    pub fn generate_many(&mut self, topic: &str, count: usize) -> Batch {
        let mut deduper = PromptDeduper::new(self.prefix_len);
        let mut prompts: Vec<String> = Vec::with_capacity(count);
        let mut duplicates_skipped = 0u64;
        let mut faults = 0u64;
        let mut attempts = 0u64;
        let ceiling = (count as u64).saturating_mul(self.attempt_factor);

        while prompts.len() < count && attempts < ceiling {
            attempts += 1;
            let brief = match self.builder.build(topic) {
                Ok(b) => b,
                Err(e) => {
                    tracing::warn!(error = %e, "prompt draw failed, skipping attempt");
                    faults += 1;
                    continue;
                }
            };
            if deduper.check_and_insert(&brief) {
                duplicates_skipped += 1;
                continue;
            }
            prompts.push(brief);
        }

        if prompts.len() < count {
            tracing::info!(
                produced = prompts.len(),
                requested = count,
                duplicates_skipped,
                faults,
                "batch came up short of the requested count"
            );
        }

        Batch { prompts, requested: count, duplicates_skipped, faults, attempts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_set() -> TemplateSet {
        TemplateSet {
            headlines: vec!["H {topic}".into()],
            taglines: vec!["T {topic}".into()],
            hero_visuals: vec!["V {topic}".into()],
            blueprints: vec!["B: {headline} / {tagline} / {heroVisual}".into()],
        }
    }

    #[test]
    fn zero_count_returns_empty_batch() {
        let mut g = BatchGenerator::new(TemplateSet::builtin(), 1);
        let batch = g.generate_many("retail", 0);
        assert!(batch.prompts.is_empty());
        assert_eq!(batch.attempts, 0);
    }

    #[test]
    fn never_returns_more_than_requested() {
        let mut g = BatchGenerator::new(TemplateSet::builtin(), 11);
        for n in 1..=6 {
            let batch = g.generate_many("travel apps", n);
            assert!(batch.prompts.len() <= n);
        }
    }

    #[test]
    fn exhausted_combinations_yield_partial_batch() {
        // One fragment per category means exactly one unique brief exists.
        let mut g = BatchGenerator::new(tiny_set(), 2);
        let batch = g.generate_many("bakeries", 5);
        assert_eq!(batch.prompts.len(), 1);
        assert!(batch.is_partial());
        assert_eq!(batch.attempts, 5 * ATTEMPT_FACTOR);
        assert_eq!(batch.duplicates_skipped, batch.attempts - 1);
    }

    #[test]
    fn builtin_set_fills_a_normal_request() {
        // 10*10*10*6 combinations; six unique briefs within 60 attempts is
        // effectively certain for any seed.
        let mut g = BatchGenerator::new(TemplateSet::builtin(), 4242);
        let batch = g.generate_many("coffee shops", 6);
        assert_eq!(batch.prompts.len(), 6);
        assert!(!batch.is_partial());
    }

    #[test]
    fn prompts_within_a_batch_are_unique() {
        let mut g = BatchGenerator::new(TemplateSet::builtin(), 8);
        let batch = g.generate_many("solar panels", 6);
        let mut seen = std::collections::HashSet::new();
        for p in &batch.prompts {
            assert!(seen.insert(p.clone()), "duplicate brief in batch");
        }
    }

    #[test]
    fn every_prompt_resolves_all_tokens() {
        let mut g = BatchGenerator::new(TemplateSet::builtin(), 1234);
        let batch = g.generate_many("AI & Co.", 6);
        for p in &batch.prompts {
            for token in ["{topic}", "{headline}", "{tagline}", "{heroVisual}"] {
                assert!(!p.contains(token));
            }
        }
    }

    #[test]
    fn faulty_store_reduces_yield_without_escaping() {
        let mut set = tiny_set();
        set.blueprints.clear();
        // Validation would normally catch this; the generator still must not
        // panic or propagate when handed a broken store.
        let mut g = BatchGenerator::new(set, 1);
        let batch = g.generate_many("bikes", 3);
        assert!(batch.prompts.is_empty());
        assert_eq!(batch.faults, batch.attempts);
    }
}
