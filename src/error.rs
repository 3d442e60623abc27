use thiserror::Error;

/// Errors that end a verification run before or instead of an explorer answer.
///
/// Explorer-reported failures and transport failures are not represented here;
/// they come back as a failed [`crate::explorer::VerificationResult`].
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("unsupported chain selection: '{0}'")]
    UnsupportedChain(String),

    #[error("compilation failed: {0}")]
    Compile(#[from] CompileError),

    #[error("constructor argument encoding failed: {0}")]
    Encode(#[from] EncodeError),
}

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("could not run solc at '{path}': {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("the compiler rejected the source ({0} error(s))")]
    Failed(usize),

    #[error("solc exited with status {status}: {stderr}")]
    Exited { status: i32, stderr: String },

    #[error("unreadable compiler output: {0}")]
    InvalidOutput(#[from] serde_json::Error),

    #[error("contract '{name}' not found in compiled output")]
    ContractNotFound { name: String },

    #[error("contract '{name}' has an invalid ABI: {reason}")]
    InvalidAbi { name: String, reason: String },
}

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("unsupported or malformed type '{ty}': {reason}")]
    InvalidType { ty: String, reason: String },

    #[error("invalid value for type '{ty}': {reason}")]
    InvalidValue { ty: String, reason: String },

    #[error("constructor expects {expected} argument(s), got {got}")]
    ArgumentCount { expected: usize, got: usize },

    #[error("ABI encoding error: {0}")]
    Abi(#[from] alloy::dyn_abi::Error),
}
