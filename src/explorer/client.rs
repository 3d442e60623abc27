use reqwest::Client;
use tracing::{debug, info, warn};

use super::{Chain, ExplorerResponse, VerificationRequest, VerificationResult};
use crate::error::VerifyError;

const ALREADY_VERIFIED: &str = "Contract source code already verified";

/// Stateless client for the explorer `verifysourcecode` endpoint.
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    client: Client,
    api_url: Option<String>,
}

impl Default for ExplorerClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ExplorerClient {
    pub fn new() -> Self {
        Self::with_http_client(Client::new())
    }

    pub fn with_http_client(client: Client) -> Self {
        Self {
            client,
            api_url: None,
        }
    }

    /// Send requests to `url` instead of the chain's explorer.
    ///
    /// The chain selection is still resolved first, so unknown chains keep failing.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Submit one verification request. Only an unsupported chain is an `Err`;
    /// explorer and transport failures are reported in the result.
    pub async fn verify(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationResult, VerifyError> {
        let chain: Chain = request.chain.parse()?;
        let url = self.api_url.as_deref().unwrap_or(chain.api_url());

        info!(
            "Submitting {} at {} to {} ({})",
            request.contract_name, request.contract_address, chain, url
        );

        let response = match self.submit(url, request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Explorer request failed: {}", e);
                return Ok(VerificationResult::failure(e.to_string()));
            }
        };

        debug!(
            "Explorer response: status={} message={:?} result={}",
            response.status, response.message, response.result
        );

        Ok(interpret_response(&response))
    }

    async fn submit(
        &self,
        url: &str,
        request: &VerificationRequest,
    ) -> Result<ExplorerResponse, reqwest::Error> {
        self.client
            .post(url)
            .form(&request.form_fields())
            .send()
            .await?
            .error_for_status()?
            .json::<ExplorerResponse>()
            .await
    }
}

/// Map an explorer answer to the outcome shown to the user.
pub fn interpret_response(response: &ExplorerResponse) -> VerificationResult {
    match response.status.as_str() {
        "0" if response.result == ALREADY_VERIFIED => {
            VerificationResult::success("Contract is already verified on the block explorer.")
        }
        "1" => {
            info!("Verification accepted, receipt {}", response.result);
            VerificationResult::success("Contract verified successfully.")
        }
        _ => VerificationResult::failure(response.result.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::tests::sample_request;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_client(response: ResponseTemplate) -> (MockServer, ExplorerClient) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api"))
            .respond_with(response)
            .mount(&server)
            .await;
        let client = ExplorerClient::new().with_api_url(format!("{}/api", server.uri()));
        (server, client)
    }

    async fn verify_with_body(body: serde_json::Value) -> VerificationResult {
        let (_server, client) = mock_client(ResponseTemplate::new(200).set_body_json(body)).await;
        client.verify(&sample_request()).await.unwrap()
    }

    #[tokio::test]
    async fn test_already_verified_is_success() {
        let result = verify_with_body(serde_json::json!({
            "status": "0",
            "message": "NOTOK",
            "result": "Contract source code already verified"
        }))
        .await;
        assert!(result.success);
        assert!(result.message.contains("already verified"));
    }

    #[tokio::test]
    async fn test_status_one_is_success() {
        let result = verify_with_body(serde_json::json!({
            "status": "1",
            "result": "Pass - Verified"
        }))
        .await;
        assert!(result.success);
        assert_eq!(result.message, "Contract verified successfully.");
    }

    #[tokio::test]
    async fn test_explorer_failure_passes_message_through() {
        let result = verify_with_body(serde_json::json!({
            "status": "0",
            "result": "Unable to locate ContractCode"
        }))
        .await;
        assert_eq!(
            result,
            VerificationResult::failure("Unable to locate ContractCode")
        );
    }

    #[tokio::test]
    async fn test_non_json_response_is_failure() {
        let (_server, client) =
            mock_client(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
                .await;
        let result = client.verify(&sample_request()).await.unwrap();
        assert!(!result.success);
        assert!(!result.message.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_is_failure_despite_json_body() {
        let (_server, client) = mock_client(
            ResponseTemplate::new(500)
                .set_body_json(serde_json::json!({"status": "1", "result": "guid"})),
        )
        .await;
        let result = client.verify(&sample_request()).await.unwrap();
        assert!(!result.success);
        assert!(result.message.contains("500"));
    }

    #[tokio::test]
    async fn test_connection_error_is_failure() {
        let client = ExplorerClient::new().with_api_url("http://127.0.0.1:1/api");
        let result = client.verify(&sample_request()).await.unwrap();
        assert!(!result.success);
        assert!(!result.message.is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_chain_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let client = ExplorerClient::new().with_api_url(format!("{}/api", server.uri()));

        let mut request = sample_request();
        request.chain = "Dogechain".to_string();
        let err = client.verify(&request).await.unwrap_err();
        assert!(matches!(err, VerifyError::UnsupportedChain(_)));
    }

    #[tokio::test]
    async fn test_posts_form_encoded_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("module=contract"))
            .and(body_string_contains("action=verifysourcecode"))
            .and(body_string_contains("optimizationUsed=0"))
            .and(body_string_contains("runs=200"))
            .and(body_string_contains("codeformat=solidity-single-file"))
            .and(body_string_contains("licenseType=3"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"status": "1", "result": "guid"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = ExplorerClient::new().with_api_url(format!("{}/api", server.uri()));
        let result = client.verify(&sample_request()).await.unwrap();
        assert!(result.success);
    }
}
