//! SMS gateway messenger
//!
//! Sends through the provider's REST API: one form POST per message,
//! basic auth with the account credentials, no retry.

use std::time::Duration;

use healthlog_core::errors::{ExError, ExErrorKind, Result};
use healthlog_core::ops::Messenger;
use healthlog_core_types::Sensitive;

use crate::config::{ConfigError, GatewayConfig};

fn gateway_err(message: String) -> ExError {
    ExError::new(ExErrorKind::ExternalService)
        .with_op("gateway_send")
        .with_message(message)
}

#[derive(Debug)]
pub struct SmsGateway {
    client: reqwest::blocking::Client,
    url: String,
    account_sid: String,
    auth_token: Sensitive<String>,
    from_number: Sensitive<String>,
}

impl SmsGateway {
    /// Build a gateway from config; the credentials and sender are required
    pub fn from_config(config: &GatewayConfig) -> std::result::Result<Self, ConfigError> {
        if config.account_sid.trim().is_empty() {
            return Err(ConfigError::Missing("gateway.account_sid"));
        }
        if config.auth_token.expose().is_empty() {
            return Err(ConfigError::Missing("gateway.auth_token"));
        }
        if config.from_number.expose().is_empty() {
            return Err(ConfigError::Missing("gateway.from_number"));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::Invalid(format!("gateway client: {}", e)))?;

        Ok(Self {
            client,
            url: messages_url(&config.base_url, &config.account_sid),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
        })
    }
}

fn messages_url(base_url: &str, account_sid: &str) -> String {
    format!(
        "{}/2010-04-01/Accounts/{}/Messages.json",
        base_url.trim_end_matches('/'),
        account_sid
    )
}

impl Messenger for SmsGateway {
    fn send(&self, body: &str, recipient: &str) -> Result<()> {
        let form = [
            ("To", recipient),
            ("From", self.from_number.expose().as_str()),
            ("Body", body),
        ];

        let resp = self
            .client
            .post(&self.url)
            .basic_auth(&self.account_sid, Some(self.auth_token.expose()))
            .form(&form)
            .send()
            .map_err(|e| gateway_err(e.without_url().to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().unwrap_or_default();
            return Err(gateway_err(format!("HTTP {}: {}", status, body_text)));
        }

        tracing::debug!(status = status.as_u16(), body_len = body.len(), "gateway accepted message");
        Ok(())
    }
}
