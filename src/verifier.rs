use serde_json::Value;
use tracing::info;

use crate::error::VerifyError;
use crate::explorer::{Chain, ExplorerClient, VerificationRequest, VerificationResult};
use crate::solidity::{encode_constructor_args, Compiler};

/// Compile, encode constructor arguments and submit, in that order.
///
/// Knows nothing about where the request came from; any front end that can
/// fill a [`VerificationRequest`] can drive it.
pub struct Verifier<C> {
    compiler: C,
    client: ExplorerClient,
}

impl<C: Compiler> Verifier<C> {
    pub fn new(compiler: C, client: ExplorerClient) -> Self {
        Self { compiler, client }
    }

    /// `request.constructor_arguments` is overwritten with the encoding of
    /// `constructor_args` (or of the per-type defaults when absent).
    pub async fn run(
        &self,
        mut request: VerificationRequest,
        constructor_args: Option<&[Value]>,
    ) -> Result<VerificationResult, VerifyError> {
        let chain: Chain = request.chain.parse()?;
        info!("Verifying {} on {}", request.contract_name, chain);

        let compiled = self
            .compiler
            .compile(
                &request.source_code,
                &request.contract_name,
                &request.compiler_version,
            )
            .await?;
        info!(
            "Compiled {} ({} bytes of creation code)",
            request.contract_name,
            compiled.bytecode.len() / 2
        );

        request.constructor_arguments = encode_constructor_args(&compiled.abi, constructor_args)?;

        self.client.verify(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use crate::explorer::tests::sample_request;
    use crate::solidity::compiler::CompiledContract;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FakeCompiler {
        abi: serde_json::Value,
        calls: AtomicUsize,
    }

    impl FakeCompiler {
        fn new(abi: serde_json::Value) -> Self {
            Self {
                abi,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Compiler for FakeCompiler {
        async fn compile(
            &self,
            _source: &str,
            contract_name: &str,
            _compiler_version: &str,
        ) -> Result<CompiledContract, CompileError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if contract_name != "Token" {
                return Err(CompileError::ContractNotFound {
                    name: contract_name.to_string(),
                });
            }
            Ok(CompiledContract {
                abi: serde_json::from_value(self.abi.clone()).unwrap(),
                bytecode: "6080".to_string(),
            })
        }
    }

    fn token_abi() -> serde_json::Value {
        serde_json::json!([{
            "type": "constructor",
            "inputs": [{"name": "supply", "type": "uint8", "internalType": "uint8"}],
            "stateMutability": "nonpayable"
        }])
    }

    #[tokio::test]
    async fn test_pipeline_sends_encoded_arguments() {
        let server = MockServer::start().await;
        let encoded_seven = format!("{:0>64}", "7");
        Mock::given(method("POST"))
            .and(body_string_contains(format!(
                "constructorArguements={}",
                encoded_seven
            )))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"status": "1", "result": "guid"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let verifier = Verifier::new(
            FakeCompiler::new(token_abi()),
            ExplorerClient::new().with_api_url(format!("{}/api", server.uri())),
        );
        let args = [serde_json::json!(7)];
        let result = verifier
            .run(sample_request(), Some(&args))
            .await
            .unwrap();
        assert!(result.success);
    }

    #[tokio::test]
    async fn test_unsupported_chain_skips_compilation() {
        let compiler = FakeCompiler::new(token_abi());
        let verifier = Verifier::new(compiler, ExplorerClient::new());

        let mut request = sample_request();
        request.chain = "Fantom".to_string();
        let err = verifier.run(request, None).await.unwrap_err();

        assert!(matches!(err, VerifyError::UnsupportedChain(_)));
        assert_eq!(verifier.compiler.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_compile_error_stops_pipeline() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let verifier = Verifier::new(
            FakeCompiler::new(token_abi()),
            ExplorerClient::new().with_api_url(format!("{}/api", server.uri())),
        );
        let mut request = sample_request();
        request.contract_name = "Missing".to_string();
        let err = verifier.run(request, None).await.unwrap_err();
        assert!(matches!(
            err,
            VerifyError::Compile(CompileError::ContractNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_encode_error_stops_pipeline() {
        let verifier = Verifier::new(
            FakeCompiler::new(token_abi()),
            ExplorerClient::new().with_api_url("http://127.0.0.1:1/api"),
        );
        let args = [serde_json::json!(300)];
        let err = verifier
            .run(sample_request(), Some(&args))
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::Encode(_)));
    }
}
