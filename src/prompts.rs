use anyhow::{bail, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::templates::{
    TemplateSet, HEADLINE_TOKEN, HERO_VISUAL_TOKEN, TAGLINE_TOKEN, TOPIC_TOKEN,
};

/// Assembles one design brief per call: draw a fragment from each category,
/// substitute the topic, then fold the derived strings into the blueprint.
/// The RNG is seeded so a run can be replayed exactly.
pub struct PromptBuilder {
    templates: TemplateSet,
    rng: StdRng,
}

impl PromptBuilder {
    pub fn new(templates: TemplateSet, seed: u64) -> Self {
        Self { templates, rng: StdRng::seed_from_u64(seed) }
    }

    /// Fills a randomly drawn blueprint with topic-substituted fragments.
    ///
    /// Substitution is literal: every `{topic}` occurrence becomes the topic
    /// string byte-for-byte, no escaping. A topic that itself contains a
    /// placeholder token therefore survives into the output verbatim; that is
    /// accepted behavior, not corrected here. An empty topic substitutes the
    /// empty string (callers reject blank topics before reaching this point).
    pub fn compose(&mut self, topic: &str) -> Result<String> {
        let headline = draw(&mut self.rng, &self.templates.headlines, "headlines")?
            .replace(TOPIC_TOKEN, topic);
        let tagline = draw(&mut self.rng, &self.templates.taglines, "taglines")?
            .replace(TOPIC_TOKEN, topic);
        let hero_visual = draw(&mut self.rng, &self.templates.hero_visuals, "heroVisuals")?
            .replace(TOPIC_TOKEN, topic);
        let blueprint = draw(&mut self.rng, &self.templates.blueprints, "blueprints")?;

        Ok(blueprint
            .replace(TOPIC_TOKEN, topic)
            .replace(HEADLINE_TOKEN, &headline)
            .replace(TAGLINE_TOKEN, &tagline)
            .replace(HERO_VISUAL_TOKEN, &hero_visual))
    }

    /// Full brief: the filled blueprint wrapped in the fixed brand frame.
    pub fn build(&mut self, topic: &str) -> Result<String> {
        let filled = self.compose(topic)?;
        Ok(frame(&filled, topic))
    }
}

fn draw<'a>(rng: &mut StdRng, list: &'a [String], category: &str) -> Result<&'a String> {
    if list.is_empty() {
        bail!("template category '{category}' is empty");
    }
    Ok(&list[rng.random_range(0..list.len())])
}

fn frame(filled: &str, topic: &str) -> String {
    format!(
        "**ANGRIO DESIGN BRIEF**\n\
        \n\
        {filled}\n\
        \n\
        **BRAND SPECIFICATIONS:**\n\
        - Primary Brand Color: Angrio Orange (#FF7A00)\n\
        - Secondary Brand Color: Angrio Navy (#0B2C5F)\n\
        - Background: Clean white (#FFFFFF) or light gray (#F9FAFB)\n\
        - Typography: Professional sans-serif (Inter/DM Sans)\n\
        - Logo: Angrio logo placement as specified\n\
        - Dimensions: 1080x1080px (Instagram) or 1200x628px (LinkedIn)\n\
        \n\
        **CREATIVE DIRECTION:**\n\
        Topic Focus: {topic}\n\
        Style: Professional, modern, trustworthy\n\
        Tone: Innovative, expert, solution-oriented\n\
        Target: Business professionals and decision-makers\n\
        \n\
        **DELIVERABLE:**\n\
        High-resolution social media post optimized for {topic} audience engagement."
    )
}
