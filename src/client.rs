use reqwest::Client;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

use crate::error::ClientError;
use crate::types::{GenerationRequest, OrderStatus, OutputDescriptor};

/// The remote generation service contract the orchestrator drives.
///
/// Implement this to plug in a different backend or a test double. The
/// reference implementation is [`NeuralClient`].
pub trait GenerationClient: Send + Sync {
    /// Submit an order. Returns the service-assigned order id.
    fn submit_order(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = Result<String, ClientError>> + Send;

    /// Poll an order's status and (once completed) its output descriptors.
    fn fetch_outputs(
        &self,
        order_id: &str,
    ) -> impl Future<Output = Result<OrderStatus, ClientError>> + Send;

    /// Download the bytes behind an output locator.
    fn fetch_bytes(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, ClientError>> + Send;
}

fn normalize(endpoint: String) -> String {
    endpoint.trim_end_matches('/').to_string()
}

/// Async HTTP client for a generation service instance.
///
/// Provides REST methods for order submission, status polling, and artifact
/// download, with per-call timeouts and typed error mapping.
///
/// # Example
/// ```no_run
/// use neural_gallery::NeuralClient;
///
/// let client = NeuralClient::new("https://api.example.com/v1");
/// ```
#[derive(Debug, Clone)]
pub struct NeuralClient {
    http: Client,
    endpoint: String,
    client_id: String,
}

impl NeuralClient {
    /// Create a new client pointing at the given service endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: normalize(endpoint.into()),
            client_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Use a custom `reqwest::Client` (for connection pooling, timeouts, TLS).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Set the client ID sent with order submissions.
    pub fn with_client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = id.into();
        self
    }

    /// Returns the configured endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the configured client ID.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    fn parse_outputs(json: &Value) -> OrderStatus {
        let completed = json
            .get("completed")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        let mut outputs = Vec::new();
        if let Some(entries) = json.get("outputs").and_then(|o| o.as_array()) {
            for entry in entries {
                let caption = entry.get("caption").and_then(|v| v.as_str());
                let preview = entry.get("preview_url").and_then(|v| v.as_str());
                let full = entry.get("full_url").and_then(|v| v.as_str());
                if let (Some(caption), Some(preview), Some(full)) = (caption, preview, full) {
                    outputs.push(OutputDescriptor {
                        caption: caption.to_string(),
                        preview_url: preview.to_string(),
                        full_url: full.to_string(),
                    });
                }
            }
        }

        OrderStatus { completed, outputs }
    }
}

impl GenerationClient for NeuralClient {
    async fn submit_order(&self, request: &GenerationRequest) -> Result<String, ClientError> {
        let url = format!("{}/orders", self.endpoint);
        let body = serde_json::json!({
            "prompt": request.prompt,
            "style": request.style,
            "layout": request.layout,
            "amount": request.amount,
            "client_id": self.client_id,
        });

        let resp = self
            .http
            .post(&url)
            .timeout(Duration::from_secs(30))
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Network {
                context: format!(
                    "Cannot reach generation service at {} \u{2014} is it available?",
                    self.endpoint
                ),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body_text = resp.text().await.unwrap_or_default();
            return Err(ClientError::Http {
                status,
                body: body_text,
            });
        }

        let json: Value = resp.json().await.map_err(|e| ClientError::Network {
            context: "Failed to parse order submission response".into(),
            source: e,
        })?;

        json.get("order_id")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| ClientError::InvalidResponse("Response missing order_id".into()))
    }

    async fn fetch_outputs(&self, order_id: &str) -> Result<OrderStatus, ClientError> {
        let url = format!("{}/orders/{}", self.endpoint, order_id);
        let resp = self
            .http
            .get(&url)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| ClientError::Network {
                context: format!("Failed to fetch status for order {}", order_id),
                source: e,
            })?;

        if !resp.status().is_success() {
            return Err(ClientError::Http {
                status: resp.status().as_u16(),
                body: format!("Failed to fetch status for order {}", order_id),
            });
        }

        let json: Value = resp.json().await.map_err(|e| ClientError::Network {
            context: "Failed to parse order status response".into(),
            source: e,
        })?;

        Ok(Self::parse_outputs(&json))
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ClientError> {
        let resp = self
            .http
            .get(url)
            .timeout(Duration::from_secs(30))
            .send()
            .await
            .map_err(|e| ClientError::Network {
                context: format!("Failed to fetch artifact from {}", url),
                source: e,
            })?;

        if !resp.status().is_success() {
            return Err(ClientError::Http {
                status: resp.status().as_u16(),
                body: format!("Failed to fetch artifact from {}", url),
            });
        }

        let bytes = resp.bytes().await.map_err(|e| ClientError::Network {
            context: "Failed to read artifact bytes".into(),
            source: e,
        })?;
        Ok(bytes.to_vec())
    }
}
