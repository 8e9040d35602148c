use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::SmsError;

/// Per-provider account settings, owned by external configuration.
///
/// What `account_id` and `secret` hold depends on the provider: Hubtel client
/// id/secret, Messagenet user id/password, SmsBroadcast username/password,
/// SmsGlobal API key/secret.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderAccount {
    pub enabled: bool,
    pub account_id: Option<String>,
    pub secret: Option<String>,
    /// Default sender id used when the message carries no override.
    pub sender: Option<String>,
    /// Overrides the adapter's base URL.
    pub base_url: Option<String>,
    /// Overrides the adapter's send timeout.
    pub send_timeout: Option<SendTimeout>,
}

impl ProviderAccount {
    /// Enabled account with the two credential fields set.
    pub fn new(account_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            enabled: true,
            account_id: Some(account_id.into()),
            secret: Some(secret.into()),
            ..Default::default()
        }
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_send_timeout(mut self, timeout: SendTimeout) -> Self {
        self.send_timeout = Some(timeout);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Base URL override without trailing slashes, if set.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .map(|u| u.trim_end_matches('/'))
            .filter(|u| !u.is_empty())
    }
}

/// HTTP send timeout as it appears in configuration.
///
/// Accepts whole seconds (`10` or `"10"`) or an `"HH:MM"` duration, so the
/// SmsGlobal default of `"24:00"` reads as twenty-four hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TimeoutRepr", into = "String")]
pub struct SendTimeout(Duration);

impl SendTimeout {
    pub const fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    pub const fn as_duration(self) -> Duration {
        self.0
    }
}

impl From<SendTimeout> for Duration {
    fn from(t: SendTimeout) -> Self {
        t.0
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid send timeout {0:?}: expected seconds or HH:MM")]
pub struct TimeoutParseError(String);

impl FromStr for SendTimeout {
    type Err = TimeoutParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let bad = || TimeoutParseError(s.to_string());
        match raw.split_once(':') {
            Some((hours, minutes)) => {
                let hours: u64 = hours.parse().map_err(|_| bad())?;
                let minutes: u64 = minutes.parse().map_err(|_| bad())?;
                if minutes >= 60 {
                    return Err(bad());
                }
                let secs = hours
                    .checked_mul(3600)
                    .and_then(|h| h.checked_add(minutes * 60))
                    .ok_or_else(bad)?;
                Ok(Self::from_secs(secs))
            }
            None => raw.parse().map(Self::from_secs).map_err(|_| bad()),
        }
    }
}

impl fmt::Display for SendTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.as_secs();
        if secs >= 3600 && secs % 60 == 0 {
            write!(f, "{:02}:{:02}", secs / 3600, (secs % 3600) / 60)
        } else {
            write!(f, "{secs}")
        }
    }
}

impl From<SendTimeout> for String {
    fn from(t: SendTimeout) -> Self {
        t.to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TimeoutRepr {
    Seconds(u64),
    Text(String),
}

impl TryFrom<TimeoutRepr> for SendTimeout {
    type Error = TimeoutParseError;

    fn try_from(repr: TimeoutRepr) -> Result<Self, Self::Error> {
        match repr {
            TimeoutRepr::Seconds(secs) => Ok(Self::from_secs(secs)),
            TimeoutRepr::Text(text) => text.parse(),
        }
    }
}

/// Source of provider accounts, typically backed by host configuration.
pub trait CredentialResolver: Send + Sync {
    /// Raw lookup; `None` when nothing is stored for the provider.
    fn lookup(&self, provider: &str) -> Option<ProviderAccount>;

    /// Lookup that only yields enabled accounts.
    fn resolve(&self, provider: &str) -> Result<ProviderAccount, SmsError> {
        match self.lookup(provider) {
            Some(account) if account.enabled => Ok(account),
            _ => Err(SmsError::IntegrationDisabled {
                provider: provider.to_string(),
            }),
        }
    }
}

/// In-memory resolver keyed by provider name.
#[derive(Debug, Default, Clone)]
pub struct StaticResolver {
    accounts: HashMap<String, ProviderAccount>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: impl Into<String>, account: ProviderAccount) -> Self {
        self.accounts.insert(provider.into(), account);
        self
    }
}

impl CredentialResolver for StaticResolver {
    fn lookup(&self, provider: &str) -> Option<ProviderAccount> {
        self.accounts.get(provider).cloned()
    }
}
