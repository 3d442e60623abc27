use alloy::primitives::Address;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Validates a contract address and returns it trimmed
pub fn validate_address(address: &str) -> Result<String> {
    let address = address.trim();

    if address.is_empty() {
        return Err(anyhow!("Contract address cannot be empty"));
    }

    if !address.starts_with("0x") && !address.starts_with("0X") {
        return Err(anyhow!(
            "Invalid address format: '{}'. Addresses must start with '0x'",
            address
        ));
    }

    if address.len() != 42 {
        return Err(anyhow!(
            "Invalid address length: '{}'. Addresses must be exactly 42 characters (0x + 40 hex characters)",
            address
        ));
    }

    if !address[2..].chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(anyhow!(
            "Invalid address format: '{}'. Contains non-hexadecimal characters",
            address
        ));
    }

    Address::from_str(address).map_err(|e| anyhow!("Invalid address: '{}'. Error: {}", address, e))?;

    Ok(address.to_string())
}

/// Validates that a contract name is a Solidity identifier
pub fn validate_contract_name(name: &str) -> Result<()> {
    let Some(first) = name.chars().next() else {
        return Err(anyhow!("Contract name cannot be empty"));
    };

    if !(first.is_ascii_alphabetic() || first == '_' || first == '$') {
        return Err(anyhow!(
            "Invalid contract name: '{}'. Names must start with a letter, '_' or '$'",
            name
        ));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    {
        return Err(anyhow!(
            "Invalid contract name: '{}'. Names can only contain letters, digits, '_' and '$'",
            name
        ));
    }

    Ok(())
}
