//! # SMS Core
//!
//! Core traits and types shared by the smskit outbound gateway adapters.
//!
//! This crate provides the fundamental building blocks:
//! - [`SmsSender`] trait implemented once per provider
//! - [`CredentialResolver`] trait for looking up provider accounts
//! - [`HttpTransport`] trait separating request building from the HTTP client
//! - [`SmsError`] with its [`ErrorKind`] classification
//!
//! ## Example
//!
//! ```rust,ignore
//! use sms_core::{OutboundMessage, SmsSender};
//!
//! // Any provider adapter implements SmsSender
//! let message = OutboundMessage::new("Hello world!", ["+233201234567"]);
//! sender.send(&message).await?;
//! ```

use async_trait::async_trait;

mod account;
mod error;
mod message;
mod transport;

#[cfg(feature = "mock")]
pub mod mock;

pub use account::{
    CredentialResolver, ProviderAccount, SendTimeout, StaticResolver, TimeoutParseError,
};
pub use error::{ErrorKind, SmsError};
pub use message::OutboundMessage;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, TransportError};

#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;

/// Lightweight header representation to avoid tying the core to any HTTP framework.
pub type Headers = Vec<(String, String)>;

/// One outbound gateway.
///
/// Implementors provide [`send_to_number`](SmsSender::send_to_number); the
/// provided [`send`](SmsSender::send) walks the destination list in order and
/// stops at the first failure. Numbers already sent stay sent.
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Stable provider name, e.g. "Hubtel".
    fn provider(&self) -> &'static str;

    /// Send `message` to a single destination.
    async fn send_to_number(&self, message: &OutboundMessage, to: &str) -> Result<(), SmsError>;

    /// Send `message` to every destination.
    async fn send(&self, message: &OutboundMessage) -> Result<(), SmsError> {
        if message.to().is_empty() {
            return Err(SmsError::MissingRecipient);
        }
        for number in message.to() {
            self.send_to_number(message, number).await?;
        }
        Ok(())
    }
}

/// Return the value of a required account field, treating empty as missing.
pub fn require<'a>(
    value: Option<&'a str>,
    provider: &'static str,
    field: &'static str,
) -> Result<&'a str, SmsError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(SmsError::MissingCredential { provider, field })
}

pub fn require_recipient(to: &str) -> Result<&str, SmsError> {
    if to.is_empty() {
        Err(SmsError::MissingRecipient)
    } else {
        Ok(to)
    }
}

/// Strip everything but ASCII digits from a phone number.
pub fn digits_only(number: &str) -> String {
    number.chars().filter(char::is_ascii_digit).collect()
}
