pub mod chain;
pub mod client;
pub mod license;

use serde::Deserialize;

pub use chain::Chain;
pub use client::ExplorerClient;
pub use license::License;

/// Runs value the explorer expects when the optimizer was not used.
pub const DEFAULT_OPTIMIZER_RUNS: u32 = 200;

/// Everything the explorer needs to verify one deployed contract.
#[derive(Debug, Clone)]
pub struct VerificationRequest {
    /// Chain selection, either a slug (`sepolia`) or a label (`Sepolia (Ethereum Testnet)`).
    pub chain: String,
    pub api_key: String,
    pub contract_address: String,
    pub contract_name: String,
    /// Full compiler build identifier, e.g. `v0.8.27+commit.40a35a09`.
    pub compiler_version: String,
    pub optimizer: bool,
    pub runs: u32,
    pub license: License,
    pub source_code: String,
    /// ABI-encoded constructor arguments, hex without `0x`.
    pub constructor_arguments: String,
}

impl VerificationRequest {
    /// Form fields for the `verifysourcecode` action, in submission order.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let runs = if self.optimizer {
            self.runs
        } else {
            DEFAULT_OPTIMIZER_RUNS
        };

        vec![
            ("apikey", self.api_key.clone()),
            ("module", "contract".to_string()),
            ("action", "verifysourcecode".to_string()),
            ("contractaddress", self.contract_address.clone()),
            ("sourceCode", self.source_code.clone()),
            ("contractname", self.contract_name.clone()),
            ("compilerversion", self.compiler_version.clone()),
            ("optimizationUsed", if self.optimizer { "1" } else { "0" }.to_string()),
            ("runs", runs.to_string()),
            // Etherscan's parameter name, misspelling included.
            ("constructorArguements", self.constructor_arguments.clone()),
            ("codeformat", "solidity-single-file".to_string()),
            ("licenseType", self.license.id().to_string()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub success: bool,
    pub message: String,
}

impl VerificationResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Body returned by Etherscan-compatible `api` endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    pub result: String,
}
