//! # Messagenet SMS Provider
//!
//! Posts to `/send_sms` with every parameter in the query string and asks for a
//! JSON answer. The gateway reports its own status in `http_status.value`,
//! which takes precedence over the HTTP status line.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sms_core::{
    digits_only, require, require_recipient, CredentialResolver, HttpRequest, HttpResponse,
    HttpTransport, OutboundMessage, ProviderAccount, SendTimeout, SmsError, SmsSender,
};
use tracing::{debug, error};

pub const PROVIDER: &str = "Messagenet";

pub const DEFAULT_BASE_URL: &str = "https://api.messagenet.com/api";

pub const DEFAULT_TIMEOUT: SendTimeout = SendTimeout::from_secs(10);

/// Messagenet gateway client.
#[derive(Clone)]
pub struct MessagenetSender {
    resolver: Arc<dyn CredentialResolver>,
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    timeout: Duration,
}

impl MessagenetSender {
    pub fn new(resolver: Arc<dyn CredentialResolver>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            resolver,
            transport,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT.as_duration(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: SendTimeout) -> Self {
        self.timeout = timeout.as_duration();
        self
    }

    fn build_request(
        &self,
        account: &ProviderAccount,
        message: &OutboundMessage,
        to: &str,
    ) -> Result<HttpRequest, SmsError> {
        let user_id = require(account.account_id.as_deref(), PROVIDER, "user ID")?;
        let password = require(account.secret.as_deref(), PROVIDER, "password")?;
        let destination = digits_only(require_recipient(to)?);
        let sender = message.from().map(digits_only);

        let mut params = vec![
            ("auth_userid", user_id),
            ("auth_password", password),
            ("destination", destination.as_str()),
            ("text", message.body()),
            ("format", "json"),
        ];
        if let Some(sender) = sender.as_deref() {
            params.push(("sender", sender));
        }
        let query = serde_urlencoded::to_string(params)
            .map_err(|e| SmsError::Invalid(format!("query encode: {}", e)))?;

        let base_url = account
            .base_url()
            .unwrap_or_else(|| self.base_url.trim_end_matches('/'));
        let timeout = account
            .send_timeout
            .map(SendTimeout::as_duration)
            .unwrap_or(self.timeout);

        Ok(HttpRequest::post(format!("{}/send_sms?{}", base_url, query)).timeout(Some(timeout)))
    }
}

/// Judge a Messagenet answer.
fn check_response(res: &HttpResponse) -> Result<(), SmsError> {
    let body = res.payload();
    debug!("Messagenet: {} {}", res.status, body);

    let data: Option<Value> = serde_json::from_str(body).ok();
    let code = data
        .as_ref()
        .and_then(|d| d.pointer("/http_status/value"))
        .and_then(|v| v.as_i64().or_else(|| v.as_str()?.trim().parse().ok()))
        .unwrap_or(i64::from(res.status));

    if (200..300).contains(&code) {
        return Ok(());
    }

    let description = data
        .as_ref()
        .and_then(|d| d.pointer("/status/description"))
        .and_then(Value::as_str)
        .map(str::to_string);
    if let Some(description) = description.as_deref() {
        error!("Messagenet SMS sending error. Message: {}", description);
    }

    Err(SmsError::provider(PROVIDER, Some(code), description))
}

#[async_trait]
impl SmsSender for MessagenetSender {
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
            .map_err(|e| e.into_sms_error(PROVIDER))?;

        check_response(&res)
    }
}
