use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::dedupe::DEFAULT_PREFIX_LEN;
use crate::generator::ATTEMPT_FACTOR;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorCfg {
    /// Fixed RNG seed. None draws a fresh seed per request.
    pub seed: Option<u64>,
    pub prefix_len: usize,
    pub attempt_factor: u64,
}

impl Default for GeneratorCfg {
    fn default() -> Self {
        Self { seed: None, prefix_len: DEFAULT_PREFIX_LEN, attempt_factor: ATTEMPT_FACTOR }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiCfg {
    pub bind: String,
    /// Fixed pre-generation wait so the front end's progress state is
    /// visible. Purely cosmetic; there is no cancel path.
    pub delay_ms: u64,
    /// Upper bound for a single request; mirrors the UI's count selector.
    pub max_count: usize,
}

impl Default for ApiCfg {
    fn default() -> Self {
        Self { bind: "127.0.0.1:8787".into(), delay_ms: 1500, max_count: 6 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RunCfg {
    pub generator: GeneratorCfg,
    pub api: ApiCfg,
    /// Template table override for `serve`; None falls back to
    /// `templates.yaml` next to the config.
    pub template_path: Option<PathBuf>,
}

impl RunCfg {
    /// Reads the YAML config, treating a missing file as all-defaults.
    pub async fn load(path: &Path) -> Result<Self> {
        let txt = match tokio::fs::read_to_string(path).await {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e).context(format!("failed to read config {}", path.display())),
        };
        serde_yaml::from_str(&txt).context(format!("failed to parse config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg: RunCfg = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg.api.max_count, 6);
        assert_eq!(cfg.api.delay_ms, 1500);
        assert_eq!(cfg.generator.prefix_len, DEFAULT_PREFIX_LEN);
        assert!(cfg.generator.seed.is_none());
    }

    #[test]
    fn partial_document_fills_the_rest() {
        let cfg: RunCfg = serde_yaml::from_str("api:\n  delay_ms: 0\n").unwrap();
        assert_eq!(cfg.api.delay_ms, 0);
        assert_eq!(cfg.api.bind, "127.0.0.1:8787");
        assert_eq!(cfg.generator.attempt_factor, ATTEMPT_FACTOR);
    }
}
