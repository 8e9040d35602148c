//! # SMS Kit
//!
//! Outbound SMS gateway adapters behind one uniform send contract.
//!
//! ## Features
//!
//! - **Four gateways**: Hubtel, Messagenet, SmsBroadcast and SmsGlobal
//! - **Uniform errors**: configuration, validation, transport, timeout and
//!   provider failures are told apart by [`ErrorKind`](sms_core::ErrorKind)
//! - **Pluggable credentials**: any [`CredentialResolver`](sms_core::CredentialResolver)
//!   can feed the adapters; [`ProvidersConfig`] is the built-in one
//! - **Pluggable transport**: adapters only see [`HttpTransport`](sms_core::HttpTransport)
//! - **Observability**: structured logging through `tracing`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use smskit::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let config = AppConfig::load()?;
//!     smskit::logging::init(&config.logging)?;
//!
//!     let dispatcher = Dispatcher::connect(&config)?;
//!     let message = OutboundMessage::new("Hello from SMS Kit!", ["+61400000000"]);
//!     dispatcher.send("smsglobal", &message).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! Accounts live under `providers.<name>` and can be set from the
//! environment:
//!
//! ```text
//! SMSKIT__PROVIDERS__SMSGLOBAL__ENABLED=true
//! SMSKIT__PROVIDERS__SMSGLOBAL__ACCOUNT_ID=<api key>
//! SMSKIT__PROVIDERS__SMSGLOBAL__SECRET=<api secret>
//! ```

pub mod config;
pub mod dispatch;
pub mod logging;

pub use crate::config::*;
pub use dispatch::{Dispatcher, SenderRegistry};

pub use sms_hubtel as hubtel;
pub use sms_messagenet as messagenet;
pub use sms_smsbroadcast as smsbroadcast;
pub use sms_smsglobal as smsglobal;

/// Common imports for SMS Kit usage
pub mod prelude {
    pub use crate::config::{AppConfig, HttpConfig, LoggingConfig, ProvidersConfig};
    pub use crate::dispatch::{Dispatcher, SenderRegistry};
    pub use sms_core::*;
    pub use sms_hubtel::{HubtelSender, ResponseCheck};
    pub use sms_messagenet::MessagenetSender;
    pub use sms_smsbroadcast::SmsBroadcastSender;
    pub use sms_smsglobal::SmsGlobalSender;
}
