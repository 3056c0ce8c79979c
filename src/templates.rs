use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Placeholder tokens replaced during prompt assembly.
pub const TOPIC_TOKEN: &str = "{topic}";
pub const HEADLINE_TOKEN: &str = "{headline}";
pub const TAGLINE_TOKEN: &str = "{tagline}";
pub const HERO_VISUAL_TOKEN: &str = "{heroVisual}";

/// The four parallel fragment lists a brief is assembled from.
/// Loaded once (YAML on disk, JSON over the API) and read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSet {
    pub headlines: Vec<String>,
    pub taglines: Vec<String>,
    pub hero_visuals: Vec<String>,
    pub blueprints: Vec<String>,
}

impl TemplateSet {
    /// Every category must have at least one non-blank fragment. The prompt
    /// builder assumes this holds, so it runs at load time and on API writes.
    pub fn validate(&self) -> Result<()> {
        for (name, list) in self.categories() {
            if list.is_empty() {
                bail!("template category '{name}' is empty");
            }
            if let Some(i) = list.iter().position(|f| f.trim().is_empty()) {
                bail!("template category '{name}' has a blank fragment at index {i}");
            }
        }
        Ok(())
    }

    pub fn categories(&self) -> [(&'static str, &[String]); 4] {
        [
            ("headlines", &self.headlines),
            ("taglines", &self.taglines),
            ("heroVisuals", &self.hero_visuals),
            ("blueprints", &self.blueprints),
        ]
    }

    /// The stock fragment table shipped with the binary.
    pub fn builtin() -> Self {
        Self {
            headlines: to_strings(&[
                "The Future of {topic} is Here",
                "Why Your {topic} Needs a Tech Upgrade",
                "Revolutionary {topic} Solutions",
                "Transform Your {topic} Today",
                "Next-Gen {topic} Innovation",
                "Breakthrough {topic} Technology",
                "The Ultimate {topic} Experience",
                "Redefining {topic} Excellence",
                "Advanced {topic} Solutions",
                "Smart {topic} for Modern Business",
            ]),
            taglines: to_strings(&[
                "Turn {topic} ideas into investor-ready products",
                "Innovative tech for modern {topic} challenges",
                "Streamline your {topic} workflow with AI",
                "Professional {topic} solutions that scale",
                "Cutting-edge {topic} for competitive advantage",
                "Transform complexity into {topic} simplicity",
                "Your {topic} success, powered by innovation",
                "Enterprise-grade {topic} made accessible",
                "Data-driven {topic} for better results",
                "Future-proof your {topic} strategy",
            ]),
            hero_visuals: to_strings(&[
                "A 3D render of a glowing '{topic}' icon floating above a modern workspace with soft blue lighting and geometric patterns",
                "Minimalist line art showing the process of '{topic}' transformation with flowing arrows and clean typography",
                "Professional photography of diverse team members collaborating on {topic} solutions in a bright, modern office",
                "Abstract gradient background featuring interconnected nodes representing {topic} innovation and connectivity",
                "Sleek dashboard interface mockup displaying {topic} analytics with clean data visualizations and modern UI elements",
                "Dynamic illustration of {topic} workflow automation with floating icons and connecting pathways",
                "High-tech laboratory setting showcasing {topic} development with glowing screens and advanced equipment",
                "Modern cityscape silhouette with {topic} technology elements integrated into the skyline at golden hour",
                "Clean product photography of {topic} tools arranged on a white surface with strategic lighting and shadows",
                "Futuristic holographic display showing {topic} data streams and interactive elements in a dark environment",
            ]),
            blueprints: to_strings(&[
                "**LAYOUT: Hero Right**\nPrimary Headline: {headline}\nSupporting Text: {tagline}\nVisual Element: {heroVisual}\nCall-to-Action: Positioned bottom-left\nBrand Colors: Angrio Orange (#FF7A00) and Navy (#0B2C5F)\nTypography: Clean sans-serif headers, readable body text\nLogo Placement: Top-right corner",
                "**LAYOUT: Centered Focus**\nMain Title: {headline}\nSubtitle: {tagline}\nHero Image: {heroVisual}\nButton Placement: Center-bottom\nColor Scheme: Primary Angrio Orange with white background\nFont Weight: Bold headlines, medium body text\nSpacing: Generous white space for clean look",
                "**LAYOUT: Split Vertical**\nLeft Section: {headline}\nRight Section: {heroVisual}\nBottom Banner: {tagline}\nCTA Position: Right-aligned\nBrand Identity: Consistent Angrio color palette\nText Hierarchy: Large title, medium subtitle, small footer\nVisual Balance: 60/40 text to image ratio",
                "**LAYOUT: Grid System**\nHeader Zone: {headline}\nContent Grid: {heroVisual}\nFooter Strip: {tagline}\nAction Button: Floating bottom-right\nColor Treatment: Gradient overlay with brand colors\nTypography Scale: Progressive size reduction\nAlignment: Left-aligned text, centered visuals",
                "**LAYOUT: Card Design**\nCard Header: {headline}\nCard Body: {heroVisual}\nCard Footer: {tagline}\nInteractive Element: Hover effect on CTA\nBackground: Subtle gradient or solid white\nText Styling: Contrasting colors for readability\nCorner Radius: Consistent 12px border radius",
                "**LAYOUT: Magazine Style**\nFeature Headline: {headline}\nEditorial Visual: {heroVisual}\nByline Text: {tagline}\nNavigation: Breadcrumb style\nColor Story: Monochromatic with orange accents\nEditorial Layout: Multi-column text flow\nImage Treatment: Full-bleed or contained",
            ]),
        }
    }

    /// Loads a template set from a YAML file, falling back to the builtin
    /// table when no path is given.
    pub async fn load(path: Option<&std::path::Path>) -> Result<Self> {
        let set = match path {
            Some(p) => {
                let txt = tokio::fs::read_to_string(p).await?;
                serde_yaml::from_str(&txt)?
            }
            None => Self::builtin(),
        };
        set.validate()?;
        Ok(set)
    }
}

fn to_strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
