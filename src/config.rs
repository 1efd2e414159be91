//! Configuration file handling.
//!
//! Two configuration surfaces live here: the ANIMA installation config
//! (`~/.anima/config.txt`, the INI-like file the ANIMA scripts ship with)
//! and the TOML configuration consumed by the `csa-charts` binary.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Location of the ANIMA binaries, read from the user's ANIMA config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimaConfig {
    /// Directory containing the ANIMA binaries.
    pub binaries_dir: PathBuf,
}

impl AnimaConfig {
    /// Load from the default location, `~/.anima/config.txt`.
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir().context("Could not determine the home directory")?;
        Self::load_from(&home.join(".anima").join("config.txt"))
    }

    /// Load from an explicit config file path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read ANIMA config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse ANIMA config file: {}", path.display()))
    }

    /// Parse the INI-like config content, looking for the `anima = ` key.
    ///
    /// The file carries other keys (`anima-scripts-public-root`, ...) and a
    /// section header; only the `anima` key matters here.
    pub fn parse(content: &str) -> Result<Self> {
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('[') || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                if key.trim() == "anima" {
                    let value = value.trim();
                    if value.is_empty() {
                        return Err(anyhow!("`anima` key is present but empty"));
                    }
                    return Ok(Self {
                        binaries_dir: PathBuf::from(value),
                    });
                }
            }
        }

        Err(anyhow!("No `anima = ` entry found"))
    }
}

/// Configuration for the `csa-charts` binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartsConfig {
    /// Method (model) name prefixes, in display order.
    ///
    /// The first `benchmark_count` entries are treated as benchmark methods
    /// for coloring and legend purposes.
    pub methods: Vec<String>,

    /// All contrast names, including the reference contrast.
    pub contrasts: Vec<String>,

    /// Contrast the pairwise differences are computed against.
    #[serde(default = "default_ref_contrast")]
    pub ref_contrast: String,

    /// How many leading methods are benchmarks.
    #[serde(default = "default_benchmark_count")]
    pub benchmark_count: usize,
}

fn default_ref_contrast() -> String {
    "t2w".to_string()
}

fn default_benchmark_count() -> usize {
    2
}

impl ChartsConfig {
    /// Load the chart configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read chart config file: {}", path.display()))?;

        let config: ChartsConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse chart config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency of the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.methods.is_empty() {
            return Err(anyhow!("Chart config lists no methods"));
        }
        if self.contrasts.is_empty() {
            return Err(anyhow!("Chart config lists no contrasts"));
        }
        if !self.contrasts.contains(&self.ref_contrast) {
            return Err(anyhow!(
                "Reference contrast `{}` is not in the contrast list",
                self.ref_contrast
            ));
        }
        Ok(())
    }

    /// Contrasts with the reference contrast removed, for pairwise charts.
    pub fn non_ref_contrasts(&self) -> Vec<String> {
        self.contrasts
            .iter()
            .filter(|c| **c != self.ref_contrast)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANIMA_CONFIG: &str = "\
# Variable names and section titles should stay the same
[anima-scripts]
anima = /home/user/anima/Anima-Binaries-4.2/
anima-scripts-public-root = /home/user/anima/Anima-Scripts-Public/
extra-data-root = /home/user/anima/Anima-Scripts-Data-Public/
";

    #[test]
    fn test_parse_anima_config() {
        let config = AnimaConfig::parse(ANIMA_CONFIG).unwrap();
        assert_eq!(
            config.binaries_dir,
            PathBuf::from("/home/user/anima/Anima-Binaries-4.2/")
        );
    }

    #[test]
    fn test_parse_ignores_other_keys() {
        // `anima-scripts-public-root` starts with "anima" but is a different key.
        let content = "[anima-scripts]\nanima-scripts-public-root = /somewhere/\n";
        assert!(AnimaConfig::parse(content).is_err());
    }

    #[test]
    fn test_parse_missing_key() {
        assert!(AnimaConfig::parse("").is_err());
        assert!(AnimaConfig::parse("anima =\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.txt");
        std::fs::write(&path, ANIMA_CONFIG).unwrap();

        let config = AnimaConfig::load_from(&path).unwrap();
        assert!(config.binaries_dir.ends_with("Anima-Binaries-4.2/"));

        assert!(AnimaConfig::load_from(&dir.path().join("missing.txt")).is_err());
    }

    #[test]
    fn test_parse_charts_config() {
        let toml_content = r#"
methods = ["hard_manual", "meanGT_manual", "meanGT_soft"]
contrasts = ["t1w", "t2w", "t2star"]
ref_contrast = "t2w"
"#;

        let config: ChartsConfig = toml::from_str(toml_content).unwrap();
        config.validate().unwrap();
        assert_eq!(config.methods.len(), 3);
        assert_eq!(config.benchmark_count, 2);
        assert_eq!(config.non_ref_contrasts(), vec!["t1w", "t2star"]);
    }

    #[test]
    fn test_charts_config_rejects_unknown_reference() {
        let toml_content = r#"
methods = ["a"]
contrasts = ["t1w"]
ref_contrast = "t2w"
"#;

        let config: ChartsConfig = toml::from_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }
}
