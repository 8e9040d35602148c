//! # SmsBroadcast SMS Provider
//!
//! Form-encoded `POST` to the advanced API. The gateway answers with one
//! colon-delimited line per recipient: `OK:<to>:<ref>`, `BAD:<reason>` or
//! `ERROR:<reason>`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sms_core::{
    digits_only, require, require_recipient, CredentialResolver, HttpRequest, HttpResponse,
    HttpTransport, OutboundMessage, ProviderAccount, SendTimeout, SmsError, SmsSender,
};
use tracing::{debug, error};

pub const PROVIDER: &str = "SmsBroadcast";

pub const DEFAULT_BASE_URL: &str = "https://api.smsbroadcast.co.uk/api-adv.php";

pub const DEFAULT_TIMEOUT: SendTimeout = SendTimeout::from_secs(10);

/// SmsBroadcast gateway client.
#[derive(Clone)]
pub struct SmsBroadcastSender {
    resolver: Arc<dyn CredentialResolver>,
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    timeout: Duration,
}

impl SmsBroadcastSender {
    pub fn new(resolver: Arc<dyn CredentialResolver>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            resolver,
            transport,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT.as_duration(),
        }
    }

    /// Full endpoint URL, not just a host.
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
        let username = require(account.account_id.as_deref(), PROVIDER, "username")?;
        let password = require(account.secret.as_deref(), PROVIDER, "password")?;
        let to = digits_only(require_recipient(to)?);

        let mut form = vec![
            ("username", username),
            ("password", password),
            ("to", to.as_str()),
            ("message", message.body()),
        ];
        if let Some(from) = message.from() {
            form.push(("from", from));
        }
        let body = serde_urlencoded::to_string(form)
            .map_err(|e| SmsError::Invalid(format!("form encode: {}", e)))?;

        let url = account
            .base_url()
            .unwrap_or_else(|| self.base_url.trim_end_matches('/'));
        let timeout = account
            .send_timeout
            .map(SendTimeout::as_duration)
            .unwrap_or(self.timeout);

        Ok(HttpRequest::post(url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .timeout(Some(timeout)))
    }
}

/// Interpret the first line of the gateway answer.
fn check_response(res: &HttpResponse) -> Result<(), SmsError> {
    let body = res.payload();
    debug!("SmsBroadcast: {} {}", res.status, body);

    let line = body.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    let (verdict, rest) = line.split_once(':').unwrap_or((line, ""));

    match verdict.trim() {
        "OK" => {
            let reference = rest.rsplit(':').next().unwrap_or("").trim();
            debug!("SmsBroadcast SMS sending successful. Reference: {}", reference);
            Ok(())
        }
        "BAD" | "ERROR" => {
            let reason = rest.trim();
            error!("SmsBroadcast SMS sending error. Reason: {}", reason);
            Err(SmsError::provider(PROVIDER, None, Some(reason.to_string())))
        }
        _ => {
            error!("SmsBroadcast unexpected response: {} {}", res.status, body);
            Err(SmsError::provider(
                PROVIDER,
                Some(i64::from(res.status)),
                Some(format!("unexpected response: {}", line)),
            ))
        }
    }
}

#[async_trait]
impl SmsSender for SmsBroadcastSender {
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
