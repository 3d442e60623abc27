use alloy::json_abi::JsonAbi;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::versions;
use crate::error::CompileError;

/// Virtual file name the source is compiled under.
pub const SOURCE_FILE_NAME: &str = "Contract.sol";

/// Interface and creation bytecode of one compiled contract.
#[derive(Debug, Clone)]
pub struct CompiledContract {
    pub abi: JsonAbi,
    /// Creation bytecode as emitted by the compiler (hex, no `0x`).
    pub bytecode: String,
}

#[async_trait]
pub trait Compiler: Send + Sync {
    /// Compile `source` as a single file and return the contract called `contract_name`.
    async fn compile(
        &self,
        source: &str,
        contract_name: &str,
        compiler_version: &str,
    ) -> Result<CompiledContract, CompileError>;
}

#[derive(Debug, Serialize)]
struct StandardJsonInput<'a> {
    language: &'static str,
    sources: BTreeMap<&'static str, SourceFile<'a>>,
    settings: Settings,
}

#[derive(Debug, Serialize)]
struct SourceFile<'a> {
    content: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Settings {
    output_selection: BTreeMap<&'static str, BTreeMap<&'static str, Vec<&'static str>>>,
}

#[derive(Debug, Deserialize)]
struct StandardJsonOutput {
    #[serde(default)]
    errors: Vec<Diagnostic>,
    #[serde(default)]
    contracts: HashMap<String, HashMap<String, ContractOutput>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Diagnostic {
    severity: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    formatted_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContractOutput {
    #[serde(default)]
    abi: serde_json::Value,
    #[serde(default)]
    evm: Option<EvmOutput>,
}

#[derive(Debug, Deserialize)]
struct EvmOutput {
    bytecode: BytecodeOutput,
}

#[derive(Debug, Deserialize)]
struct BytecodeOutput {
    object: String,
}

/// Standard-JSON compiler input for a single source file, selecting ABI and bytecode.
pub fn standard_json_input(source: &str) -> Result<String, CompileError> {
    let input = StandardJsonInput {
        language: "Solidity",
        sources: BTreeMap::from([(SOURCE_FILE_NAME, SourceFile { content: source })]),
        settings: Settings {
            output_selection: BTreeMap::from([(
                "*",
                BTreeMap::from([("*", vec!["abi", "evm.bytecode"])]),
            )]),
        },
    };
    Ok(serde_json::to_string(&input)?)
}

/// Pick `contract_name` out of standard-JSON compiler output.
pub fn extract_contract(output: &str, contract_name: &str) -> Result<CompiledContract, CompileError> {
    let output: StandardJsonOutput = serde_json::from_str(output)?;

    let mut error_count = 0;
    for diagnostic in &output.errors {
        let text = diagnostic
            .formatted_message
            .as_deref()
            .unwrap_or(&diagnostic.message);
        if diagnostic.severity == "error" {
            error_count += 1;
            warn!("solc: {}", text.trim_end());
        } else {
            debug!("solc {}: {}", diagnostic.severity, text.trim_end());
        }
    }
    if error_count > 0 {
        return Err(CompileError::Failed(error_count));
    }

    let contract = output
        .contracts
        .get(SOURCE_FILE_NAME)
        .and_then(|contracts| contracts.get(contract_name))
        .ok_or_else(|| CompileError::ContractNotFound {
            name: contract_name.to_string(),
        })?;

    let abi: JsonAbi =
        serde_json::from_value(contract.abi.clone()).map_err(|e| CompileError::InvalidAbi {
            name: contract_name.to_string(),
            reason: e.to_string(),
        })?;
    let bytecode = contract
        .evm
        .as_ref()
        .map(|evm| evm.bytecode.object.clone())
        .unwrap_or_default();

    Ok(CompiledContract { abi, bytecode })
}

/// Extract `0.8.27+commit.40a35a09...` from `solc --version` output.
pub fn parse_version_output(stdout: &str) -> Option<&str> {
    stdout
        .lines()
        .find_map(|line| line.trim().strip_prefix("Version:"))
        .map(str::trim)
}

/// Compiler backed by a local `solc` binary in `--standard-json` mode.
#[derive(Debug, Clone)]
pub struct SolcCompiler {
    path: PathBuf,
}

impl SolcCompiler {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn spawn_error(&self, source: std::io::Error) -> CompileError {
        CompileError::Spawn {
            path: self.path.display().to_string(),
            source,
        }
    }

    /// Version reported by the binary, if it can be queried.
    pub async fn installed_version(&self) -> Result<Option<String>, CompileError> {
        let output = Command::new(&self.path)
            .arg("--version")
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_version_output(&stdout).map(str::to_string))
    }

    async fn check_version(&self, compiler_version: &str) {
        let wanted = versions::semver_of(compiler_version);
        match self.installed_version().await {
            Ok(Some(installed)) if installed.starts_with(&format!("{}+", wanted)) => {
                debug!("Using solc {}", installed);
            }
            Ok(Some(installed)) => warn!(
                "Local solc is {} but {} was requested; the ABI is taken from the local build",
                installed, compiler_version
            ),
            Ok(None) => warn!("Could not determine the version of {}", self.path.display()),
            Err(e) => debug!("Version check skipped: {}", e),
        }
    }

    async fn run_standard_json(&self, input: &str) -> Result<String, CompileError> {
        let mut child = Command::new(&self.path)
            .arg("--standard-json")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .await
                .map_err(|e| self.spawn_error(e))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(CompileError::Exited {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl Compiler for SolcCompiler {
    async fn compile(
        &self,
        source: &str,
        contract_name: &str,
        compiler_version: &str,
    ) -> Result<CompiledContract, CompileError> {
        self.check_version(compiler_version).await;

        info!("Compiling {} with {}", contract_name, self.path.display());
        let input = standard_json_input(source)?;
        let output = self.run_standard_json(&input).await?;
        extract_contract(&output, contract_name)
    }
}
