//! Constructor argument synthesis and ABI encoding.
//!
//! Argument values travel as JSON so they can come from any front end. When
//! none are given, one default per declared parameter is derived from the
//! parameter's type string alone.

use alloy::{
    dyn_abi::{DynSolType, DynSolValue, JsonAbiExt, Specifier},
    json_abi::{JsonAbi, Param},
    primitives::{Address, B256, I256, U256},
};
use serde_json::Value;
use std::str::FromStr;
use tracing::debug;

use crate::error::EncodeError;

pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Coarse classification of an ABI type string, used to pick a default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    String,
    Uint,
    Int,
    Address,
    Bytes,
    Bool,
    Array,
    Tuple,
    Other,
}

impl TypeTag {
    pub fn of(ty: &str) -> Self {
        let digits = |rest: &str| rest.chars().all(|c| c.is_ascii_digit());

        if ty == "string" {
            TypeTag::String
        } else if ty.ends_with("[]") {
            // before `bytes*` so that `bytes32[]` is an array
            TypeTag::Array
        } else if ty.strip_prefix("uint").is_some_and(digits) {
            TypeTag::Uint
        } else if ty.strip_prefix("int").is_some_and(digits) {
            TypeTag::Int
        } else if ty == "address" {
            TypeTag::Address
        } else if ty.starts_with("bytes") {
            TypeTag::Bytes
        } else if ty == "bool" {
            TypeTag::Bool
        } else if ty.starts_with("tuple") {
            TypeTag::Tuple
        } else {
            TypeTag::Other
        }
    }

    pub fn default_value(self) -> Value {
        match self {
            TypeTag::String | TypeTag::Other => Value::String(String::new()),
            TypeTag::Uint | TypeTag::Int => Value::String("0".to_string()),
            TypeTag::Address => Value::String(ZERO_ADDRESS.to_string()),
            TypeTag::Bytes => Value::String("0x".to_string()),
            TypeTag::Bool => Value::Bool(false),
            TypeTag::Array | TypeTag::Tuple => Value::Array(Vec::new()),
        }
    }
}

/// Default argument list for a parameter list.
pub fn default_arguments(inputs: &[Param]) -> Vec<Value> {
    inputs
        .iter()
        .map(|param| TypeTag::of(&param.ty).default_value())
        .collect()
}

/// ABI-encode constructor arguments as hex without `0x`.
///
/// Returns an empty string when the contract declares no constructor. An
/// absent or empty `args` list is replaced by [`default_arguments`].
pub fn encode_constructor_args(
    abi: &JsonAbi,
    args: Option<&[Value]>,
) -> Result<String, EncodeError> {
    let Some(constructor) = abi.constructor() else {
        debug!("No constructor declared, sending empty constructor arguments");
        return Ok(String::new());
    };

    let defaults;
    let args = match args {
        Some(args) if !args.is_empty() => args,
        _ => {
            defaults = default_arguments(&constructor.inputs);
            defaults.as_slice()
        }
    };

    if args.len() != constructor.inputs.len() {
        return Err(EncodeError::ArgumentCount {
            expected: constructor.inputs.len(),
            got: args.len(),
        });
    }

    let values = constructor
        .inputs
        .iter()
        .zip(args)
        .map(|(param, value)| coerce(value, &resolve(param)?))
        .collect::<Result<Vec<_>, _>>()?;

    let encoded = constructor.abi_encode_input(&values)?;
    debug!(
        "Encoded {} constructor argument(s) into {} bytes",
        values.len(),
        encoded.len()
    );
    Ok(hex::encode(encoded))
}

fn resolve(param: &Param) -> Result<DynSolType, EncodeError> {
    param.resolve().map_err(|e| EncodeError::InvalidType {
        ty: param.ty.clone(),
        reason: e.to_string(),
    })
}

/// Convert a JSON value into a value of the given Solidity type.
pub fn coerce(value: &Value, ty: &DynSolType) -> Result<DynSolValue, EncodeError> {
    let invalid = |reason: String| EncodeError::InvalidValue {
        ty: ty.sol_type_name().into_owned(),
        reason,
    };

    match ty {
        DynSolType::Bool => match value {
            Value::Bool(b) => Ok(DynSolValue::Bool(*b)),
            Value::String(s) if s == "true" || s == "false" => Ok(DynSolValue::Bool(s == "true")),
            _ => Err(invalid(format!("expected a boolean, got {}", value))),
        },
        DynSolType::Uint(bits) => {
            let number = parse_uint(value).map_err(invalid)?;
            if number.bit_len() > *bits {
                return Err(invalid(format!("{} does not fit in {} bits", number, bits)));
            }
            Ok(DynSolValue::Uint(number, *bits))
        }
        DynSolType::Int(bits) => {
            let number = parse_int(value).map_err(invalid)?;
            let limit = U256::from(1u8) << (*bits - 1);
            let magnitude = number.unsigned_abs();
            let fits = if number.is_negative() {
                magnitude <= limit
            } else {
                magnitude < limit
            };
            if !fits {
                return Err(invalid(format!("{} does not fit in {} bits", number, bits)));
            }
            Ok(DynSolValue::Int(number, *bits))
        }
        DynSolType::Address => {
            let text = expect_str(value).map_err(invalid)?;
            let address = Address::from_str(text.trim())
                .map_err(|e| invalid(format!("'{}' is not an address: {}", text, e)))?;
            Ok(DynSolValue::Address(address))
        }
        DynSolType::FixedBytes(size) => {
            let bytes = parse_hex(value).map_err(invalid)?;
            if bytes.len() > *size {
                return Err(invalid(format!(
                    "{} bytes given, at most {} allowed",
                    bytes.len(),
                    size
                )));
            }
            let mut word = [0u8; 32];
            word[..bytes.len()].copy_from_slice(&bytes);
            Ok(DynSolValue::FixedBytes(B256::from(word), *size))
        }
        DynSolType::Bytes => Ok(DynSolValue::Bytes(parse_hex(value).map_err(invalid)?)),
        DynSolType::String => Ok(DynSolValue::String(
            expect_str(value).map_err(invalid)?.to_string(),
        )),
        DynSolType::Array(inner) => {
            let items = expect_array(value).map_err(invalid)?;
            let values = items
                .iter()
                .map(|item| coerce(item, inner))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(DynSolValue::Array(values))
        }
        DynSolType::FixedArray(inner, len) => {
            let items = expect_array(value).map_err(invalid)?;
            if items.len() != *len {
                return Err(invalid(format!(
                    "expected {} elements, got {}",
                    len,
                    items.len()
                )));
            }
            let values = items
                .iter()
                .map(|item| coerce(item, inner))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(DynSolValue::FixedArray(values))
        }
        DynSolType::Tuple(types) => {
            let items = expect_array(value).map_err(invalid)?;
            if items.len() != types.len() {
                return Err(invalid(format!(
                    "expected {} tuple components, got {}",
                    types.len(),
                    items.len()
                )));
            }
            let values = items
                .iter()
                .zip(types)
                .map(|(item, ty)| coerce(item, ty))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(DynSolValue::Tuple(values))
        }
        _ => Err(EncodeError::InvalidType {
            ty: ty.sol_type_name().into_owned(),
            reason: "not supported as a constructor argument".to_string(),
        }),
    }
}

fn expect_str(value: &Value) -> Result<&str, String> {
    value
        .as_str()
        .ok_or_else(|| format!("expected a string, got {}", value))
}

fn expect_array(value: &Value) -> Result<&Vec<Value>, String> {
    value
        .as_array()
        .ok_or_else(|| format!("expected an array, got {}", value))
}

fn parse_hex(value: &Value) -> Result<Vec<u8>, String> {
    let text = expect_str(value)?.trim();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    hex::decode(digits).map_err(|e| format!("'{}' is not valid hex: {}", text, e))
}

fn parse_uint(value: &Value) -> Result<U256, String> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| format!("{} is not an unsigned integer", n)),
        Value::String(s) => {
            U256::from_str(s.trim()).map_err(|_| format!("'{}' is not an unsigned integer", s))
        }
        _ => Err(format!("expected a number or numeric string, got {}", value)),
    }
}

fn parse_int(value: &Value) -> Result<I256, String> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|i| I256::try_from(i).ok())
            .or_else(|| n.as_u64().map(|u| I256::from_raw(U256::from(u))))
            .ok_or_else(|| format!("{} is not an integer", n)),
        Value::String(s) => {
            let s = s.trim();
            let unsigned = s.trim_start_matches('-');
            let parsed = if unsigned.starts_with("0x") || unsigned.starts_with("0X") {
                I256::from_hex_str(s)
            } else {
                I256::from_dec_str(s)
            };
            parsed.map_err(|_| format!("'{}' is not an integer", s))
        }
        _ => Err(format!("expected a number or numeric string, got {}", value)),
    }
}
