//! # Hubtel SMS Provider
//!
//! Sends messages through the Hubtel `/v1/messages/send` endpoint. Credentials
//! travel as query parameters on a `GET` request.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sms_core::{OutboundMessage, ProviderAccount, ReqwestTransport, SmsSender, StaticResolver};
//! use sms_hubtel::HubtelSender;
//!
//! let resolver = StaticResolver::new()
//!     .with("Hubtel", ProviderAccount::new("client-id", "client-secret").with_sender("ACME"));
//! let sender = HubtelSender::new(Arc::new(resolver), Arc::new(ReqwestTransport::new()));
//! sender.send(&OutboundMessage::new("Hello from Hubtel!", ["233201234567"])).await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sms_core::{
    require, require_recipient, CredentialResolver, HttpRequest, HttpResponse, HttpTransport,
    OutboundMessage, ProviderAccount, SendTimeout, SmsError, SmsSender,
};
use tracing::{debug, error, info};

pub const PROVIDER: &str = "Hubtel";

pub const DEFAULT_BASE_URL: &str = "https://devp-sms03726-api.hubtel.com";

/// How a Hubtel answer is judged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseCheck {
    /// Any answer counts as delivered; only transport errors fail.
    Legacy,
    /// HTTP 201 with `status == 0` in the JSON body.
    #[default]
    Current,
}

/// Hubtel gateway client.
#[derive(Clone)]
pub struct HubtelSender {
    resolver: Arc<dyn CredentialResolver>,
    transport: Arc<dyn HttpTransport>,
    /// API base URL; the account's `base_url` takes precedence.
    base_url: String,
    timeout: Option<Duration>,
    check: ResponseCheck,
}

impl HubtelSender {
    pub fn new(resolver: Arc<dyn CredentialResolver>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            resolver,
            transport,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            check: ResponseCheck::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Default timeout when the account sets none. Hubtel calls are unbounded otherwise.
    pub fn with_timeout(mut self, timeout: SendTimeout) -> Self {
        self.timeout = Some(timeout.as_duration());
        self
    }

    pub fn with_response_check(mut self, check: ResponseCheck) -> Self {
        self.check = check;
        self
    }

    fn build_request(
        &self,
        account: &ProviderAccount,
        message: &OutboundMessage,
        to: &str,
    ) -> Result<HttpRequest, SmsError> {
        let client_id = require(account.account_id.as_deref(), PROVIDER, "client ID")?;
        let client_secret = require(account.secret.as_deref(), PROVIDER, "client secret")?;
        let to = require_recipient(to)?;
        let from = message
            .from()
            .or(account.sender.as_deref().filter(|s| !s.is_empty()))
            .ok_or(SmsError::MissingSender { provider: PROVIDER })?;

        let query = serde_urlencoded::to_string(vec![
            ("clientid", client_id),
            ("clientsecret", client_secret),
            ("from", from),
            ("to", to),
            ("content", message.body()),
        ])
        .map_err(|e| SmsError::Invalid(format!("query encode: {}", e)))?;

        let base_url = account
            .base_url()
            .unwrap_or_else(|| self.base_url.trim_end_matches('/'));
        let timeout = account
            .send_timeout
            .map(SendTimeout::as_duration)
            .or(self.timeout);

        Ok(HttpRequest::get(format!("{}/v1/messages/send?{}", base_url, query)).timeout(timeout))
    }

    fn check_response(&self, res: &HttpResponse) -> Result<(), SmsError> {
        debug!("Hubtel: {} {}", res.status, res.body);

        if self.check == ResponseCheck::Legacy {
            return Ok(());
        }

        let parsed = serde_json::from_str::<HubtelSendResponse>(res.payload()).ok();
        let status = parsed.as_ref().and_then(|p| p.status);

        if res.status == 201 && status == Some(0) {
            if let Some(id) = parsed.as_ref().and_then(|p| p.message_id.as_deref()) {
                info!("Hubtel SMS accepted with message id {}", id);
            }
            return Ok(());
        }

        let reason = parsed.and_then(|p| p.message);
        error!(
            "Hubtel SMS sending error. HTTP {}: {}",
            res.status,
            reason.as_deref().unwrap_or(&res.body)
        );
        Err(SmsError::provider(
            PROVIDER,
            Some(status.unwrap_or(i64::from(res.status))),
            reason,
        ))
    }
}

#[derive(Debug, Deserialize)]
struct HubtelSendResponse {
    #[serde(alias = "Status")]
    status: Option<i64>,
    #[serde(alias = "Message")]
    message: Option<String>,
    #[serde(rename = "messageId", alias = "MessageId")]
    message_id: Option<String>,
}

#[async_trait]
impl SmsSender for HubtelSender {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn send_to_number(&self, message: &OutboundMessage, to: &str) -> Result<(), SmsError> {
        let account = self.resolver.resolve(PROVIDER)?;
        let request = self.build_request(&account, message, to)?;

        let res = self
            .transport
            .execute(request)
            .await
            .map_err(|e| {
                error!("Hubtel transport failure: {}", e);
                e.into_sms_error(PROVIDER)
            })?;

        self.check_response(&res)
    }
}
