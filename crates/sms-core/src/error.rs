use std::fmt;

/// Errors that can occur while relaying an outbound SMS.
#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    /// No enabled account exists for the provider.
    #[error("{provider} integration is not enabled")]
    IntegrationDisabled { provider: String },
    /// A required account field is empty or absent.
    #[error("no {provider} {field}")]
    MissingCredential {
        provider: &'static str,
        field: &'static str,
    },
    /// The dispatcher has no adapter registered under this name.
    #[error("unknown SMS provider: {0}")]
    UnknownProvider(String),
    #[error("no recipient phone number")]
    MissingRecipient,
    #[error("no {provider} sender phone number")]
    MissingSender { provider: &'static str },
    /// Invalid request parameters
    #[error("invalid request: {0}")]
    Invalid(String),
    /// Connection level failure other than a timeout.
    #[error("{provider} http error: {message}")]
    Http {
        provider: &'static str,
        message: String,
    },
    #[error("{provider} SMS sending timeout")]
    Timeout { provider: &'static str },
    /// The provider answered but reported a failure.
    #[error("{provider} SMS sending error{}", ProviderDetail(.code, .reason))]
    Provider {
        provider: &'static str,
        code: Option<i64>,
        reason: Option<String>,
    },
}

/// Coarse classification of [`SmsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Validation,
    Transport,
    Timeout,
    Provider,
}

impl SmsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SmsError::IntegrationDisabled { .. }
            | SmsError::MissingCredential { .. }
            | SmsError::UnknownProvider(_) => ErrorKind::Configuration,
            SmsError::MissingRecipient | SmsError::MissingSender { .. } | SmsError::Invalid(_) => {
                ErrorKind::Validation
            }
            SmsError::Http { .. } => ErrorKind::Transport,
            SmsError::Timeout { .. } => ErrorKind::Timeout,
            SmsError::Provider { .. } => ErrorKind::Provider,
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// True for every network failure, timeouts included.
    pub fn is_transport(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transport | ErrorKind::Timeout)
    }

    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }

    /// Build a provider failure from an optional code and reason text.
    pub fn provider(provider: &'static str, code: Option<i64>, reason: Option<String>) -> Self {
        SmsError::Provider {
            provider,
            code,
            reason: reason.filter(|r| !r.is_empty()),
        }
    }
}

struct ProviderDetail<'a>(&'a Option<i64>, &'a Option<String>);

impl fmt::Display for ProviderDetail<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = self.0 {
            write!(f, ". Code: {code}")?;
        }
        if let Some(reason) = self.1.as_deref() {
            write!(f, ". Reason: {reason}")?;
        }
        f.write_str(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_message_carries_code_and_reason() {
        let err = SmsError::provider("Messagenet", Some(500), Some("Internal error".into()));
        assert_eq!(
            err.to_string(),
            "Messagenet SMS sending error. Code: 500. Reason: Internal error."
        );

        let err = SmsError::provider("SmsBroadcast", None, Some(String::new()));
        assert_eq!(err.to_string(), "SmsBroadcast SMS sending error.");
    }

    #[test]
    fn timeout_counts_as_transport() {
        let err = SmsError::Timeout { provider: "SmsGlobal" };
        assert!(err.is_timeout());
        assert!(err.is_transport());

        let err = SmsError::Http {
            provider: "SmsGlobal",
            message: "connection refused".into(),
        };
        assert!(err.is_transport());
        assert!(!err.is_timeout());
    }

    #[test]
    fn classification() {
        assert!(SmsError::MissingRecipient.is_validation());
        assert!(SmsError::MissingCredential {
            provider: "Hubtel",
            field: "client ID"
        }
        .is_configuration());
        assert_eq!(
            SmsError::IntegrationDisabled {
                provider: "Hubtel".into()
            }
            .to_string(),
            "Hubtel integration is not enabled"
        );
    }
}
