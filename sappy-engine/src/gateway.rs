//! Client for the external inference service.
//!
//! The service takes the onboarding [`Profile`] and answers with a
//! prediction whose shape is not interpreted here. Calls are made once,
//! without retries; onboarding should go on whether or not they succeed.

use std::time::Duration;

use log::{info, warn};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, SappyError};
use crate::profile::Profile;

pub const DEFAULT_BASE_URL: &str =
    "https://az-api-iwn-hackathon-demo-b0exa5duacasdpc0.australiasoutheast-01.azurewebsites.net";

/// Meter used when the caller does not name one.
pub const DEFAULT_METER_ID: &str = "T284";

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Where and how to reach the inference service.
#[derive(Debug, PartialEq, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub meter_id: String,
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            meter_id: DEFAULT_METER_ID.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GatewayConfig {
    pub fn inference_url(&self) -> String {
        format!("{}/inference/", self.base_url.trim_end_matches('/'))
    }
}

fn http_error(e: reqwest::Error) -> SappyError {
    SappyError::HttpRequest(e.to_string())
}

/// Request body: the profile wrapped as `customer_data`.
#[derive(Debug, Serialize)]
pub struct InferenceRequest<'a> {
    pub customer_data: &'a Profile,
}

pub struct InferenceGateway {
    client: Client,
    config: GatewayConfig,
}

impl InferenceGateway {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(http_error)?;
        Ok(InferenceGateway { client, config })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Post the profile and return the service's JSON answer as-is.
    ///
    /// Network errors, non-success statuses and bodies that are not JSON
    /// are all reported as errors.
    pub async fn predict(&self, profile: &Profile) -> Result<Value> {
        let url = self.config.inference_url();
        info!(
            "Requesting prediction for meter {} from {}",
            self.config.meter_id, url
        );

        let response = self
            .client
            .post(&url)
            .query(&[("smart_meter_id", self.config.meter_id.as_str())])
            .json(&InferenceRequest {
                customer_data: profile,
            })
            .send()
            .await
            .map_err(http_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SappyError::BadStatus(status.as_u16()));
        }

        let body = response.text().await.map_err(http_error)?;
        serde_json::from_str(&body).map_err(|e| SappyError::ResponseParse(e.to_string()))
    }

    /// Like [`InferenceGateway::predict`], but failures are only logged.
    pub async fn predict_best_effort(&self, profile: &Profile) -> Option<Value> {
        match self.predict(profile).await {
            Ok(prediction) => Some(prediction),
            Err(e) => {
                warn!(
                    "Prediction for meter {} failed, continuing without it: {}",
                    self.config.meter_id, e
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{aggregate, Answers, ASSETS};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn header_end(buf: &[u8]) -> Option<usize> {
        buf.windows(4).position(|w| w == b"\r\n\r\n").map(|i| i + 4)
    }

    fn content_length(head: &str) -> usize {
        head.lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Answer a single request with `status` and `body`, returning the raw
    /// request text once it has been served.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
                if let Some(end) = header_end(&request) {
                    let head = String::from_utf8_lossy(&request[..end]).to_string();
                    if request.len() >= end + content_length(&head) {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&request).to_string()
        });
        (base_url, handle)
    }

    fn local_gateway(base_url: String) -> InferenceGateway {
        InferenceGateway::new(GatewayConfig {
            base_url,
            meter_id: "T284".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn unreachable_gateway() -> InferenceGateway {
        InferenceGateway::new(GatewayConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            meter_id: "T999".to_string(),
            timeout: Duration::from_secs(2),
        })
        .unwrap()
    }

    #[test]
    fn test_inference_url() {
        let config = GatewayConfig {
            base_url: "http://localhost:8000/".to_string(),
            ..GatewayConfig::default()
        };
        assert_eq!(config.inference_url(), "http://localhost:8000/inference/");
        assert_eq!(GatewayConfig::default().meter_id, "T284");
    }

    #[test]
    fn test_request_body_wraps_profile() {
        let profile = aggregate(&Answers::new().with(ASSETS, ["Garden"]));
        let body = serde_json::to_value(InferenceRequest {
            customer_data: &profile,
        })
        .unwrap();
        assert_eq!(body["customer_data"]["household_garden"], 1);
        assert_eq!(body.as_object().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_network_failure_is_an_error() {
        let gateway = unreachable_gateway();
        let profile = aggregate(&Answers::new());
        assert!(matches!(
            gateway.predict(&profile).await,
            Err(SappyError::HttpRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_best_effort_swallows_failure() {
        let gateway = unreachable_gateway();
        let profile = aggregate(&Answers::new());
        assert_eq!(gateway.predict_best_effort(&profile).await, None);
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let (base_url, server) = serve_once("500 Internal Server Error", "{\"detail\":\"boom\"}").await;
        let gateway = local_gateway(base_url);
        let result = gateway.predict(&aggregate(&Answers::new())).await;
        assert!(matches!(result, Err(SappyError::BadStatus(500))));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_non_json_body() {
        let (base_url, server) = serve_once("200 OK", "<html>not json</html>").await;
        let gateway = local_gateway(base_url);
        let result = gateway.predict(&aggregate(&Answers::new())).await;
        assert!(matches!(result, Err(SappyError::ResponseParse(_))));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_best_effort_swallows_bad_responses() {
        let profile = aggregate(&Answers::new());

        let (base_url, server) = serve_once("503 Service Unavailable", "").await;
        assert_eq!(local_gateway(base_url).predict_best_effort(&profile).await, None);
        server.await.unwrap();

        let (base_url, server) = serve_once("200 OK", "prediction: 42").await;
        assert_eq!(local_gateway(base_url).predict_best_effort(&profile).await, None);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_prediction_passes_through() {
        let body = r#"{"forecast":[12.5,14.0],"meter":"T284","nested":{"ok":true}}"#;
        let (base_url, server) = serve_once("200 OK", body).await;
        let gateway = local_gateway(base_url);
        let profile = aggregate(&Answers::new().with(ASSETS, ["Pool"]));

        let prediction = gateway.predict_best_effort(&profile).await.unwrap();
        assert_eq!(prediction, serde_json::from_str::<Value>(body).unwrap());

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /inference/?smart_meter_id=T284 "));
        let (_, sent) = request.split_once("\r\n\r\n").unwrap();
        let sent: Value = serde_json::from_str(sent).unwrap();
        assert_eq!(sent["customer_data"]["household_pool"], 1);
    }
}
