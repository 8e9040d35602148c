//! # SmsGlobal SMS Provider
//!
//! JSON `POST` to `/v2/sms` authenticated with SmsGlobal's MAC scheme:
//!
//! ```text
//! Authorization: MAC id="<api key>", ts="<unix ts>", nonce="<nonce>", mac="<base64 hmac>"
//! ```
//!
//! The MAC is an HMAC-SHA256, keyed by the API secret, over the newline
//! joined `ts, nonce, "POST", "/v2/sms", "api.smsglobal.com", 443, ""` with a
//! trailing newline.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use sms_core::{
    require, require_recipient, CredentialResolver, HttpRequest, HttpResponse, HttpTransport,
    OutboundMessage, ProviderAccount, SendTimeout, SmsError, SmsSender,
};
use time::OffsetDateTime;
use tracing::{debug, error};
use uuid::Uuid;

pub const PROVIDER: &str = "SmsGlobal";

pub const DEFAULT_BASE_URL: &str = "https://api.smsglobal.com";

/// Twenty-four hours, effectively unbounded.
pub const DEFAULT_TIMEOUT: SendTimeout = SendTimeout::from_secs(24 * 3600);

const SEND_PATH: &str = "/v2/sms";
const MAC_HOST: &str = "api.smsglobal.com";
const MAC_PORT: u16 = 443;

type HmacSha256 = Hmac<Sha256>;

/// Supplies the timestamp and nonce that go into each MAC.
pub trait NonceSource: Send + Sync {
    fn timestamp(&self) -> i64;
    fn nonce(&self) -> String;
}

/// Wall clock timestamp and a random 32 hex character nonce.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemNonce;

impl NonceSource for SystemNonce {
    fn timestamp(&self) -> i64 {
        OffsetDateTime::now_utc().unix_timestamp()
    }

    fn nonce(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

/// Base64 HMAC-SHA256 of the canonical request string.
pub fn sign(api_secret: &str, timestamp: i64, nonce: &str) -> Result<String, SmsError> {
    let canonical = format!(
        "{}\n{}\nPOST\n{}\n{}\n{}\n\n",
        timestamp, nonce, SEND_PATH, MAC_HOST, MAC_PORT
    );
    let mut mac = HmacSha256::new_from_slice(api_secret.as_bytes())
        .map_err(|e| SmsError::Invalid(format!("hmac key: {}", e)))?;
    mac.update(canonical.as_bytes());
    Ok(B64.encode(mac.finalize().into_bytes()))
}

/// Full `Authorization` header value.
pub fn authorization_header(
    api_key: &str,
    api_secret: &str,
    timestamp: i64,
    nonce: &str,
) -> Result<String, SmsError> {
    let mac = sign(api_secret, timestamp, nonce)?;
    Ok(format!(
        r#"MAC id="{}", ts="{}", nonce="{}", mac="{}""#,
        api_key, timestamp, nonce, mac
    ))
}

#[derive(Debug, Serialize)]
struct SmsGlobalSendRequest<'a> {
    destination: &'a str,
    message: &'a str,
    origin: &'a str,
}

#[derive(Debug, Deserialize)]
struct SmsGlobalErrorResponse {
    message: Option<String>,
}

/// SmsGlobal gateway client.
#[derive(Clone)]
pub struct SmsGlobalSender {
    resolver: Arc<dyn CredentialResolver>,
    transport: Arc<dyn HttpTransport>,
    nonce: Arc<dyn NonceSource>,
    base_url: String,
    timeout: Duration,
}

impl SmsGlobalSender {
    pub fn new(resolver: Arc<dyn CredentialResolver>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            resolver,
            transport,
            nonce: Arc::new(SystemNonce),
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

    pub fn with_nonce_source(mut self, nonce: Arc<dyn NonceSource>) -> Self {
        self.nonce = nonce;
        self
    }

    fn build_request(
        &self,
        account: &ProviderAccount,
        message: &OutboundMessage,
        to: &str,
    ) -> Result<HttpRequest, SmsError> {
        let api_key = require(account.account_id.as_deref(), PROVIDER, "API key")?;
        let api_secret = require(account.secret.as_deref(), PROVIDER, "API secret")?;
        let to = require_recipient(to)?;

        let payload = SmsGlobalSendRequest {
            destination: to,
            message: message.body(),
            origin: message
                .from()
                .or(account.sender.as_deref())
                .unwrap_or_default(),
        };
        let body = serde_json::to_string(&payload)
            .map_err(|e| SmsError::Invalid(format!("invalid payload: {}", e)))?;

        let authorization = authorization_header(
            api_key,
            api_secret,
            self.nonce.timestamp(),
            &self.nonce.nonce(),
        )?;

        let base_url = account
            .base_url()
            .unwrap_or_else(|| self.base_url.trim_end_matches('/'));
        let timeout = account
            .send_timeout
            .map(SendTimeout::as_duration)
            .unwrap_or(self.timeout);

        Ok(HttpRequest::post(format!("{}{}", base_url, SEND_PATH))
            .header("Authorization", authorization)
            .header("Content-Type", "application/json")
            .body(body)
            .timeout(Some(timeout)))
    }
}

fn check_response(res: &HttpResponse) -> Result<(), SmsError> {
    if res.is_success() {
        debug!("SmsGlobal: {} {}", res.status, res.body);
        return Ok(());
    }

    let message = serde_json::from_str::<SmsGlobalErrorResponse>(res.payload())
        .ok()
        .and_then(|r| r.message);
    if let Some(message) = message.as_deref() {
        error!("SmsGlobal SMS sending error. Message: {}", message);
    }

    Err(SmsError::provider(PROVIDER, Some(i64::from(res.status)), message))
}

#[async_trait]
impl SmsSender for SmsGlobalSender {
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

#[cfg(test)]
mod tests {
    use super::*;
    use sms_core::mock::MockTransport;
    use sms_core::{ErrorKind, StaticResolver, TransportError};

    struct FixedNonce;

    impl NonceSource for FixedNonce {
        fn timestamp(&self) -> i64 {
            1_700_000_000
        }

        fn nonce(&self) -> String {
            "0123456789abcdef0123456789abcdef".to_string()
        }
    }

    fn sender_with(account: ProviderAccount, transport: &MockTransport) -> SmsGlobalSender {
        let resolver = StaticResolver::new().with(PROVIDER, account);
        SmsGlobalSender::new(Arc::new(resolver), Arc::new(transport.clone()))
            .with_base_url("http://smsglobal.test")
            .with_nonce_source(Arc::new(FixedNonce))
    }

    #[test]
    fn mac_matches_recomputation() {
        let header = authorization_header("key-1", "secret", 1_700_000_000, "abc").unwrap();

        let mut mac = HmacSha256::new_from_slice(b"secret").unwrap();
        mac.update(b"1700000000\nabc\nPOST\n/v2/sms\napi.smsglobal.com\n443\n\n");
        let expected = B64.encode(mac.finalize().into_bytes());

        assert_eq!(
            header,
            format!(
                r#"MAC id="key-1", ts="1700000000", nonce="abc", mac="{}""#,
                expected
            )
        );
    }

    #[test]
    fn system_nonce_is_hex() {
        let nonce = SystemNonce.nonce();
        assert_eq!(nonce.len(), 32);
        assert!(nonce.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(SystemNonce.timestamp() > 1_600_000_000);
    }

    #[tokio::test]
    async fn posts_signed_json() {
        let transport = MockTransport::replying(HttpResponse::new(200, r#"{"messages":[]}"#));
        let sender = sender_with(ProviderAccount::new("key-1", "secret"), &transport);

        sender
            .send(&OutboundMessage::new("Hello", ["61400000000"]))
            .await
            .unwrap();

        let req = &transport.requests()[0];
        assert_eq!(req.url, "http://smsglobal.test/v2/sms");
        assert_eq!(
            req.body.as_deref(),
            Some(r#"{"destination":"61400000000","message":"Hello","origin":""}"#)
        );
        assert_eq!(req.header_value("content-type"), Some("application/json"));
        assert_eq!(
            req.header_value("authorization").map(str::to_string),
            Some(
                authorization_header(
                    "key-1",
                    "secret",
                    1_700_000_000,
                    "0123456789abcdef0123456789abcdef"
                )
                .unwrap()
            )
        );
        assert_eq!(req.timeout, Some(Duration::from_secs(86_400)));
    }

    #[tokio::test]
    async fn origin_comes_from_override_then_account() {
        let transport = MockTransport::replying(HttpResponse::new(202, ""));
        let account = ProviderAccount::new("key-1", "secret").with_sender("ACME");

        sender_with(account.clone(), &transport)
            .send(&OutboundMessage::new("hi", ["1"]))
            .await
            .unwrap();
        sender_with(account, &transport)
            .send(&OutboundMessage::new("hi", ["1"]).with_from("OTHER"))
            .await
            .unwrap();

        let requests = transport.requests();
        assert!(requests[0].body.as_deref().unwrap().contains(r#""origin":"ACME""#));
        assert!(requests[1].body.as_deref().unwrap().contains(r#""origin":"OTHER""#));
    }

    #[tokio::test]
    async fn non_2xx_is_a_coded_failure() {
        let transport = MockTransport::replying(HttpResponse::new(
            403,
            r#"{"message":"Invalid MAC signature"}"#,
        ));
        let sender = sender_with(ProviderAccount::new("key-1", "secret"), &transport);

        let err = sender.send(&OutboundMessage::new("hi", ["1"])).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Provider);
        assert_eq!(
            err.to_string(),
            "SmsGlobal SMS sending error. Code: 403. Reason: Invalid MAC signature."
        );
    }

    #[tokio::test]
    async fn timeout_and_connect_errors_differ() {
        let transport = MockTransport::failing(TransportError::Timeout("elapsed".into()));
        let err = sender_with(ProviderAccount::new("key-1", "secret"), &transport)
            .send(&OutboundMessage::new("hi", ["1"]))
            .await
            .unwrap_err();
        assert!(err.is_timeout());

        let transport = MockTransport::failing(TransportError::Connect("refused".into()));
        let err = sender_with(ProviderAccount::new("key-1", "secret"), &transport)
            .send(&OutboundMessage::new("hi", ["1"]))
            .await
            .unwrap_err();
        assert!(err.is_transport() && !err.is_timeout());
    }

    #[tokio::test]
    async fn missing_secret_never_reaches_network() {
        let transport = MockTransport::new();
        let mut account = ProviderAccount::new("key-1", "secret");
        account.secret = None;

        let err = sender_with(account, &transport)
            .send(&OutboundMessage::new("hi", ["1"]))
            .await
            .unwrap_err();
        assert!(matches!(err, SmsError::MissingCredential { field: "API secret", .. }));
        assert_eq!(transport.calls(), 0);
    }
}
