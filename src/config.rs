use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::explorer::{Chain, DEFAULT_OPTIMIZER_RUNS};

/// Key in `api_keys` that applies to every chain without its own entry.
const DEFAULT_KEY_NAME: &str = "default";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chain used when none is given on the command line.
    pub default_chain: Option<String>,
    /// Explorer API keys by chain slug.
    pub api_keys: HashMap<String, String>,
    /// Explorer API base URL overrides by chain slug.
    pub api_urls: HashMap<String, String>,
    pub compiler: CompilerConfig,
    pub license: String,
    #[serde(skip)]
    pub env_api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub solc_path: PathBuf,
    pub optimizer: bool,
    pub runs: u32,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            solc_path: PathBuf::from("solc"),
            optimizer: false,
            runs: DEFAULT_OPTIMIZER_RUNS,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_chain: None,
            api_keys: HashMap::new(),
            api_urls: HashMap::new(),
            compiler: CompilerConfig::default(),
            license: "MIT".to_string(),
            env_api_key: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {:?}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {:?}: {}", path, e))?;

        Ok(config)
    }

    /// Load configuration with fallback to default
    pub async fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Self {
        let mut config = match path {
            Some(path) => match Self::load_from_file(path).await {
                Ok(config) => {
                    tracing::info!("Loaded configuration from file");
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to load config file, using defaults: {}", e);
                    Self::default()
                }
            },
            None => Self::default(),
        };

        config.apply_env_vars();
        config
    }

    fn apply_env_vars(&mut self) {
        if let Ok(api_key) = std::env::var("ETHERSCAN_API_KEY") {
            tracing::debug!("ETHERSCAN_API_KEY found, used when no key is configured");
            self.env_api_key = Some(api_key);
        }

        if let Ok(solc_path) = std::env::var("SOLC_PATH") {
            tracing::debug!("Using solc from SOLC_PATH: {}", solc_path);
            self.compiler.solc_path = PathBuf::from(solc_path);
        }
    }

    /// API key for `chain`: its own entry, then `default`, then the environment.
    pub fn api_key_for(&self, chain: Chain) -> Option<&str> {
        self.api_keys
            .get(chain.slug())
            .or_else(|| self.api_keys.get(DEFAULT_KEY_NAME))
            .map(String::as_str)
            .or(self.env_api_key.as_deref())
    }

    pub fn api_url_for(&self, chain: Chain) -> Option<&str> {
        self.api_urls.get(chain.slug()).map(String::as_str)
    }

    /// Get default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("contract-verifier").join("config.toml"))
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let sample_config = r#"# Contract Verifier Configuration File
# Every setting is optional; command line flags take precedence.

# Chain used when --chain is not given (slug or full name, see --list-chains)
default_chain = "sepolia"

# License reported to the explorer (see --list-licenses)
license = "MIT"

# Explorer API keys by chain slug; "default" applies to all other chains
[api_keys]
default = "YOUR_ETHERSCAN_API_KEY"
bsc = "YOUR_BSCSCAN_API_KEY"

# Explorer API base URL overrides by chain slug
[api_urls]
# scroll = "https://api.scrollscan.com/api"

[compiler]
solc_path = "solc"
optimizer = false
runs = 200

# Environment variables that can be used:
# ETHERSCAN_API_KEY - fallback explorer API key
# SOLC_PATH - path to the solc binary
"#;
        sample_config.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
default_chain = "polygon"
license = "GPL-3.0"

[api_keys]
polygon = "POLY"
default = "ANY"

[compiler]
optimizer = true
runs = 999
"#
        )
        .unwrap();

        let config = Config::load_from_file(file.path()).await.unwrap();
        assert_eq!(config.default_chain.as_deref(), Some("polygon"));
        assert_eq!(config.license, "GPL-3.0");
        assert!(config.compiler.optimizer);
        assert_eq!(config.compiler.runs, 999);
        assert_eq!(config.compiler.solc_path, PathBuf::from("solc"));
        assert_eq!(config.api_key_for(Chain::Polygon), Some("POLY"));
        assert_eq!(config.api_key_for(Chain::Base), Some("ANY"));
    }

    #[tokio::test]
    async fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(Some(dir.path().join("absent.toml"))).await;
        assert!(config.default_chain.is_none());
        assert_eq!(config.compiler.runs, 200);
        assert_eq!(config.license, "MIT");
    }

    #[test]
    fn test_api_key_fallback_order() {
        let mut config = Config::default();
        assert_eq!(config.api_key_for(Chain::Ethereum), None);

        config.env_api_key = Some("ENV".to_string());
        assert_eq!(config.api_key_for(Chain::Ethereum), Some("ENV"));

        config
            .api_keys
            .insert("ethereum".to_string(), "FILE".to_string());
        assert_eq!(config.api_key_for(Chain::Ethereum), Some("FILE"));
        assert_eq!(config.api_key_for(Chain::Sepolia), Some("ENV"));
    }

    #[test]
    fn test_sample_config_parses() {
        let config: Config = toml::from_str(&Config::generate_sample()).unwrap();
        assert_eq!(config.default_chain.as_deref(), Some("sepolia"));
        assert_eq!(config.api_key_for(Chain::Bsc), Some("YOUR_BSCSCAN_API_KEY"));
        assert!(config.api_url_for(Chain::Scroll).is_none());
    }
}
