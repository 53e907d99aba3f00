//! SMS delivery of one-time passwords.
//!
//! Two providers are supported: `console`, which logs the code instead of
//! sending it (development and tests), and `gateway`, which posts the
//! message to an HTTP SMS gateway.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info};

use crate::config::SmsConfig;
use domain::services::{DeliveryError, OtpSender};

enum Provider {
    Console,
    Gateway {
        client: reqwest::Client,
        url: String,
    },
}

/// OTP delivery backed by the configured SMS provider.
pub struct SmsService {
    provider: Provider,
}

#[derive(Serialize)]
struct GatewayMessage<'a> {
    phone: &'a str,
    message: String,
}

impl SmsService {
    /// Builds the service from configuration.
    ///
    /// An unknown provider falls back to `console`; configuration
    /// validation has already rejected that case at startup.
    pub fn new(config: &SmsConfig) -> Self {
        let provider = match config.provider.as_str() {
            "gateway" => {
                let client = reqwest::Client::builder()
                    .timeout(Duration::from_millis(config.timeout_ms))
                    .build()
                    .unwrap_or_default();
                Provider::Gateway {
                    client,
                    url: config.gateway_url.clone(),
                }
            }
            _ => Provider::Console,
        };
        Self { provider }
    }
}

#[async_trait]
impl OtpSender for SmsService {
    async fn send_otp(&self, phone: &str, otp: i32) -> Result<(), DeliveryError> {
        match &self.provider {
            Provider::Console => {
                info!(phone, otp, "Console SMS provider: OTP not sent over the wire");
                Ok(())
            }
            Provider::Gateway { client, url } => {
                let body = GatewayMessage {
                    phone,
                    message: format!("Your verification code is {}", otp),
                };
                let response = client
                    .post(url)
                    .json(&body)
                    .send()
                    .await
                    .map_err(|e| DeliveryError::Failed(e.to_string()))?;

                if response.status().is_success() {
                    info!(phone, "OTP sent via SMS gateway");
                    Ok(())
                } else {
                    let status = response.status();
                    error!(phone, %status, "SMS gateway rejected the message");
                    Err(DeliveryError::Failed(format!(
                        "gateway returned {}",
                        status
                    )))
                }
            }
        }
    }
}
