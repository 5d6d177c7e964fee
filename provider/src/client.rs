//! JSON-RPC view client with ordered endpoint failover.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use std::time::Duration;

use velock_types::AccountId;

use crate::endpoint::Endpoint;
use crate::error::ProviderError;

/// Read-only view access to the chain.
///
/// This is the dependency-injection seam between the readers and the
/// transport: production code uses [`RpcClient`], tests substitute an
/// in-memory chain.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Invoke a contract view method with JSON args and decode the JSON
    /// result. View calls have no side effects and need no signature.
    async fn view_call(
        &self,
        contract: &AccountId,
        method: &str,
        args: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError>;

    /// Probe whether an account exists on chain. A missing account is
    /// `Ok(false)`, not an error — the lockup may simply not be deployed.
    async fn account_exists(&self, account: &AccountId) -> Result<bool, ProviderError>;
}

/// HTTP client for NEAR's JSON-RPC `query` endpoint.
///
/// Wraps `reqwest::Client` with an ordered endpoint list. Each request walks
/// the list in order; within one endpoint it retries with exponential
/// backoff up to the endpoint's budget, then fails over to the next. The
/// request errors only once every endpoint is exhausted.
#[derive(Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    endpoints: Vec<Endpoint>,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// `query/call_function` result payload: raw bytes of the JSON-encoded
/// return value.
#[derive(Debug, Deserialize)]
struct CallFunctionResult {
    result: Vec<u8>,
}

impl RpcClient {
    /// Create a client over an explicit endpoint list.
    pub fn new(endpoints: Vec<Endpoint>) -> Result<Self, ProviderError> {
        if endpoints.is_empty() {
            return Err(ProviderError::NoEndpoints);
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ProviderError::ClientBuild(e.to_string()))?;
        Ok(Self { http, endpoints })
    }

    /// Create a client over the built-in mainnet gateway tiers.
    pub fn mainnet() -> Result<Self, ProviderError> {
        Self::new(Endpoint::mainnet_tiers())
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Send one `query` request through the failover chain.
    async fn query(&self, params: serde_json::Value) -> Result<serde_json::Value, ProviderError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": "velock",
            "method": "query",
            "params": params,
        });

        let mut last_error = String::from("no endpoints tried");
        for endpoint in &self.endpoints {
            for attempt in 0..endpoint.retries.max(1) {
                if attempt > 0 {
                    tokio::time::sleep(endpoint.retry_delay(attempt - 1)).await;
                }
                match self.query_endpoint(endpoint, &body).await {
                    Ok(value) => return Ok(value),
                    // Handler errors are definitive for the whole chain:
                    // every gateway reads the same chain state.
                    Err(QueryError::Handler(message)) => {
                        return Err(ProviderError::Rpc {
                            endpoint: endpoint.url.clone(),
                            message,
                        })
                    }
                    Err(QueryError::Transient(message)) => {
                        tracing::debug!(
                            endpoint = %endpoint.url,
                            attempt,
                            error = %message,
                            "RPC attempt failed"
                        );
                        last_error = message;
                    }
                }
            }
            tracing::warn!(endpoint = %endpoint.url, "endpoint exhausted, failing over");
        }

        Err(ProviderError::AllEndpointsFailed {
            attempted: self.endpoints.len(),
            last_error,
        })
    }

    async fn query_endpoint(
        &self,
        endpoint: &Endpoint,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, QueryError> {
        let response = self
            .http
            .post(&endpoint.url)
            .json(body)
            .send()
            .await
            .map_err(|e| QueryError::Transient(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(QueryError::Transient(format!(
                "HTTP {} from {}",
                response.status(),
                endpoint.url
            )));
        }

        let rpc: RpcResponse = response
            .json()
            .await
            .map_err(|e| QueryError::Transient(format!("invalid JSON response: {e}")))?;

        if let Some(error) = rpc.error {
            return Err(classify_rpc_error(&error));
        }

        rpc.result
            .ok_or_else(|| QueryError::Transient("response missing result".into()))
    }
}

enum QueryError {
    /// Network/server trouble — worth retrying or failing over.
    Transient(String),
    /// The chain answered and said no (e.g. unknown account, bad method).
    Handler(String),
}

/// NEAR gateways report handler-level failures (unknown account, unknown
/// method) inside the JSON-RPC error object. Those are definitive; anything
/// else (timeouts, internal errors, rate limiting) is transient.
fn classify_rpc_error(error: &serde_json::Value) -> QueryError {
    let text = error.to_string();
    if text.contains("UNKNOWN_ACCOUNT")
        || text.contains("does not exist")
        || text.contains("MethodNotFound")
        || text.contains("CONTRACT_CODE_NOT_FOUND")
    {
        QueryError::Handler(text)
    } else {
        QueryError::Transient(text)
    }
}

#[async_trait]
impl Provider for RpcClient {
    async fn view_call(
        &self,
        contract: &AccountId,
        method: &str,
        args: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        let args_base64 = BASE64.encode(args.to_string());
        let result = self
            .query(serde_json::json!({
                "request_type": "call_function",
                "finality": "final",
                "account_id": contract.as_str(),
                "method_name": method,
                "args_base64": args_base64,
            }))
            .await?;

        let call: CallFunctionResult =
            serde_json::from_value(result).map_err(|e| ProviderError::InvalidResponse {
                endpoint: String::new(),
                message: format!("call_function result: {e}"),
            })?;

        serde_json::from_slice(&call.result).map_err(|e| ProviderError::InvalidResponse {
            endpoint: String::new(),
            message: format!("{method} returned invalid JSON: {e}"),
        })
    }

    async fn account_exists(&self, account: &AccountId) -> Result<bool, ProviderError> {
        let result = self
            .query(serde_json::json!({
                "request_type": "view_account",
                "finality": "final",
                "account_id": account.as_str(),
            }))
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(ProviderError::Rpc { message, .. })
                if message.contains("UNKNOWN_ACCOUNT") || message.contains("does not exist") =>
            {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
