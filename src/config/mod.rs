#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::adapters::omnipath::{DEFAULT_OMNIPATH_URL, DEFAULT_TOP_GENES};
use crate::adapters::resolwe::DEFAULT_RESOLWE_URL;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use toml_config::TomlConfig;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;
pub const DEFAULT_OUTPUT_DIR: &str = ".";

/// Resolved run settings: CLI flag, then config file, then default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub collection_name: String,
    pub write_output: bool,
    pub output_dir: String,
    pub resolwe_url: String,
    pub omnipath_url: String,
    pub top_genes: usize,
    pub timeout_seconds: u64,
    pub verbose: bool,
}

impl Settings {
    pub fn new(collection_name: &str) -> Self {
        Self {
            collection_name: collection_name.to_string(),
            write_output: false,
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            resolwe_url: DEFAULT_RESOLWE_URL.to_string(),
            omnipath_url: DEFAULT_OMNIPATH_URL.to_string(),
            top_genes: DEFAULT_TOP_GENES,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            verbose: false,
        }
    }

    /// Applies values from a config file on top of the defaults.
    pub fn with_file(mut self, file: &TomlConfig) -> Self {
        if let Some(url) = &file.repository.url {
            self.resolwe_url = url.clone();
        }
        if let Some(timeout) = file.repository.timeout_seconds {
            self.timeout_seconds = timeout;
        }
        if let Some(url) = &file.pathways.url {
            self.omnipath_url = url.clone();
        }
        if let Some(top) = file.pathways.top {
            self.top_genes = top;
        }
        if let Some(dir) = &file.output.directory {
            self.output_dir = dir.clone();
        }
        self
    }

    #[cfg(feature = "cli")]
    pub fn from_cli(cli: cli::CliConfig) -> Result<Self> {
        let mut settings = Self::new(&cli.collection_name);
        if let Some(path) = &cli.config {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            settings = settings.with_file(&TomlConfig::from_file(path)?);
        }

        settings.write_output = cli.output_file;
        settings.verbose = cli.verbose;
        if let Some(url) = cli.url {
            settings.resolwe_url = url;
        }
        if let Some(url) = cli.omnipath_url {
            settings.omnipath_url = url;
        }
        if let Some(top) = cli.top {
            settings.top_genes = top;
        }
        if let Some(dir) = cli.output_dir {
            settings.output_dir = dir;
        }
        Ok(settings)
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("collection_name", &self.collection_name)?;
        validate_url("repository.url", &self.resolwe_url)?;
        validate_url("pathways.url", &self.omnipath_url)?;
        validate_positive_number("pathways.top", self.top_genes, 1)?;
        validate_positive_number(
            "repository.timeout_seconds",
            self.timeout_seconds as usize,
            1,
        )?;
        validate_path("output.directory", &self.output_dir)?;
        Ok(())
    }
}

impl ConfigProvider for Settings {
    fn collection_name(&self) -> &str {
        &self.collection_name
    }

    fn write_output(&self) -> bool {
        self.write_output
    }

    fn top_genes(&self) -> usize {
        self.top_genes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::new("tcga-brca");
        assert!(settings.validate().is_ok());
        assert_eq!(settings.resolwe_url, "https://app.genialis.com");
        assert_eq!(settings.top_genes, 100);
        assert!(!settings.write_output);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = TomlConfig::from_toml_str(
            "[repository]\nurl = \"http://localhost:8000\"\n[pathways]\ntop = 25\n",
        )
        .unwrap();
        let settings = Settings::new("demo").with_file(&file);
        assert_eq!(settings.resolwe_url, "http://localhost:8000");
        assert_eq!(settings.top_genes, 25);
        assert_eq!(settings.omnipath_url, "https://omnipathdb.org");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut settings = Settings::new("demo");
        settings.top_genes = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::new("demo");
        settings.omnipath_url = "omnipathdb.org".to_string();
        assert!(settings.validate().is_err());

        assert!(Settings::new(" ").validate().is_err());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_flags_take_precedence() {
        use clap::Parser;
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[pathways]\ntop = 25\n[output]\ndirectory = \"reports\"\n")
            .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = cli::CliConfig::try_parse_from([
            "progeny", "demo", "-o", "--config", path.as_str(), "--top", "10",
        ])
        .unwrap();
        let settings = Settings::from_cli(cli).unwrap();
        assert_eq!(settings.top_genes, 10);
        assert_eq!(settings.output_dir, "reports");
        assert!(settings.write_output);
    }
}
