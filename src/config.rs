use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use sms_core::{CredentialResolver, ProviderAccount};
use sms_hubtel::ResponseCheck;
use std::env;

/// Application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    /// SMS providers configuration
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Outbound HTTP client configuration
    #[serde(default)]
    pub http: HttpConfig,
}

/// Provider accounts, one table per gateway.
///
/// Doubles as the [`CredentialResolver`] handed to every adapter.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct ProvidersConfig {
    pub hubtel: Option<ProviderAccount>,
    /// Which Hubtel response check to apply (default: current)
    pub hubtel_response_check: ResponseCheck,
    pub messagenet: Option<ProviderAccount>,
    pub smsbroadcast: Option<ProviderAccount>,
    pub smsglobal: Option<ProviderAccount>,
}

impl CredentialResolver for ProvidersConfig {
    fn lookup(&self, provider: &str) -> Option<ProviderAccount> {
        let account = match provider.to_ascii_lowercase().as_str() {
            "hubtel" => &self.hubtel,
            "messagenet" => &self.messagenet,
            "smsbroadcast" => &self.smsbroadcast,
            "smsglobal" => &self.smsglobal,
            _ => return None,
        };
        account.clone()
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Log level or filter directive (default: info)
    pub level: String,
    /// Log format: json or pretty (default: json)
    pub format: String,
}

/// Outbound HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    /// User-Agent sent to every gateway
    pub user_agent: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("smskit/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default configuration
            .add_source(Config::try_from(&AppConfig::default())?)
            // Add configuration file based on environment
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add local configuration file (gitignored)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables, e.g. SMSKIT__PROVIDERS__HUBTEL__SECRET
            .add_source(Environment::with_prefix("SMSKIT").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use sms_core::{SendTimeout, SmsError};

    fn parse(toml: &str) -> AppConfig {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn reads_provider_tables() {
        let cfg = parse(
            r#"
            [providers]
            hubtel_response_check = "legacy"

            [providers.hubtel]
            enabled = true
            account_id = "client-1"
            secret = "s3cret"
            sender = "ACME"

            [providers.smsglobal]
            enabled = true
            account_id = "key"
            secret = "secret"
            send_timeout = "24:00"

            [providers.messagenet]
            enabled = false
            account_id = "user"
            secret = "pw"
            send_timeout = 5
            "#,
        );

        assert_eq!(cfg.providers.hubtel_response_check, ResponseCheck::Legacy);
        let hubtel = cfg.providers.resolve("Hubtel").unwrap();
        assert_eq!(hubtel.sender.as_deref(), Some("ACME"));

        let smsglobal = cfg.providers.resolve("SmsGlobal").unwrap();
        assert_eq!(
            smsglobal.send_timeout,
            Some(SendTimeout::from_secs(24 * 3600))
        );

        let messagenet = cfg.providers.lookup("messagenet").unwrap();
        assert_eq!(messagenet.send_timeout, Some(SendTimeout::from_secs(5)));
        assert!(matches!(
            cfg.providers.resolve("Messagenet"),
            Err(SmsError::IntegrationDisabled { .. })
        ));
        assert!(cfg.providers.resolve("SmsBroadcast").is_err());
        assert_eq!(cfg.logging.format, "json");
    }

    #[test]
    fn defaults_round_trip_through_config() {
        let cfg: AppConfig = Config::builder()
            .add_source(Config::try_from(&AppConfig::default()).unwrap())
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.http.user_agent.starts_with("smskit/"));
        assert!(cfg.providers.hubtel.is_none());
    }
}
