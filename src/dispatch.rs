use std::collections::HashMap;
use std::sync::Arc;

use sms_core::{HttpTransport, OutboundMessage, SmsError, SmsSender, TransportError};
use sms_hubtel::HubtelSender;
use sms_messagenet::MessagenetSender;
use sms_smsbroadcast::SmsBroadcastSender;
use sms_smsglobal::SmsGlobalSender;
use tracing::{debug, warn};

use crate::config::AppConfig;

/// Runtime registry so apps can register any combination of gateways and pick one by name.
#[derive(Default, Clone)]
pub struct SenderRegistry {
    map: Arc<HashMap<String, Arc<dyn SmsSender>>>,
}

impl SenderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sender: Arc<dyn SmsSender>) -> Self {
        let mut m = (*self.map).clone();
        m.insert(sender.provider().to_ascii_lowercase(), sender);
        self.map = Arc::new(m);
        self
    }

    /// Case-insensitive lookup by provider name.
    pub fn get(&self, provider: &str) -> Option<Arc<dyn SmsSender>> {
        self.map.get(&provider.to_ascii_lowercase()).cloned()
    }

    pub fn providers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.map.values().map(|s| s.provider())
    }
}

/// Entry point for the host's messaging pipeline.
///
/// Recipients are sent one at a time in list order; the first failure ends
/// the call and is returned as is.
#[derive(Clone)]
pub struct Dispatcher {
    registry: SenderRegistry,
}

impl Dispatcher {
    pub fn new(registry: SenderRegistry) -> Self {
        Self { registry }
    }

    /// All four gateways, resolving accounts from `config.providers`.
    pub fn from_config(config: &AppConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let resolver = Arc::new(config.providers.clone());

        let registry = SenderRegistry::new()
            .with(Arc::new(
                HubtelSender::new(resolver.clone(), transport.clone())
                    .with_response_check(config.providers.hubtel_response_check),
            ))
            .with(Arc::new(MessagenetSender::new(
                resolver.clone(),
                transport.clone(),
            )))
            .with(Arc::new(SmsBroadcastSender::new(
                resolver.clone(),
                transport.clone(),
            )))
            .with(Arc::new(SmsGlobalSender::new(resolver, transport)));

        Self::new(registry)
    }

    /// Like [`from_config`](Self::from_config) over a `reqwest` client.
    pub fn connect(config: &AppConfig) -> Result<Self, TransportError> {
        let transport = sms_core::ReqwestTransport::with_user_agent(&config.http.user_agent)?;
        Ok(Self::from_config(config, Arc::new(transport)))
    }

    pub fn registry(&self) -> &SenderRegistry {
        &self.registry
    }

    pub async fn send(&self, provider: &str, message: &OutboundMessage) -> Result<(), SmsError> {
        let sender = self
            .registry
            .get(provider)
            .ok_or_else(|| SmsError::UnknownProvider(provider.to_string()))?;

        debug!(
            "Dispatching {} SMS to {} recipient(s)",
            sender.provider(),
            message.to().len()
        );
        sender.send(message).await.map_err(|e| {
            warn!("{} SMS dispatch failed: {}", sender.provider(), e);
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sms_core::mock::MockTransport;
    use sms_core::{HttpResponse, ProviderAccount};
    use std::sync::Mutex;

    /// Sends the whole list in one batch instead of per number.
    #[derive(Default)]
    struct Batching {
        batches: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl SmsSender for Batching {
        fn provider(&self) -> &'static str {
            "Batching"
        }

        async fn send_to_number(&self, _: &OutboundMessage, _: &str) -> Result<(), SmsError> {
            Err(SmsError::Invalid("per-number path used".into()))
        }

        async fn send(&self, message: &OutboundMessage) -> Result<(), SmsError> {
            self.batches.lock().unwrap().push(message.to().to_vec());
            Ok(())
        }
    }

    fn config() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.providers.smsbroadcast = Some(ProviderAccount::new("acme", "pw"));
        cfg
    }

    #[tokio::test]
    async fn routes_by_provider_name() {
        let transport = MockTransport::replying(HttpResponse::new(200, "OK:1:1"));
        let dispatcher = Dispatcher::from_config(&config(), Arc::new(transport.clone()));

        dispatcher
            .send("SMSBroadcast", &OutboundMessage::new("hi", ["1", "2"]))
            .await
            .unwrap();
        assert_eq!(transport.calls(), 2);
        assert_eq!(dispatcher.registry().providers().count(), 4);
    }

    #[tokio::test]
    async fn unknown_provider_is_a_configuration_error() {
        let transport = MockTransport::new();
        let dispatcher = Dispatcher::from_config(&config(), Arc::new(transport.clone()));

        let err = dispatcher
            .send("carrier-pigeon", &OutboundMessage::new("hi", ["1"]))
            .await
            .unwrap_err();
        assert!(matches!(err, SmsError::UnknownProvider(_)));
        assert!(err.is_configuration());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn unconfigured_provider_is_disabled() {
        let transport = MockTransport::new();
        let dispatcher = Dispatcher::from_config(&config(), Arc::new(transport.clone()));

        let err = dispatcher
            .send("smsglobal", &OutboundMessage::new("hi", ["1"]))
            .await
            .unwrap_err();
        assert!(matches!(err, SmsError::IntegrationDisabled { .. }));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn delegates_to_the_sender_send() {
        let batching = Arc::new(Batching::default());
        let dispatcher = Dispatcher::new(SenderRegistry::new().with(batching.clone()));

        dispatcher
            .send("batching", &OutboundMessage::new("hi", ["1", "2"]))
            .await
            .unwrap();
        assert_eq!(*batching.batches.lock().unwrap(), vec![vec!["1", "2"]]);
    }

    #[tokio::test]
    async fn empty_list_is_rejected_before_any_call() {
        let transport = MockTransport::new();
        let dispatcher = Dispatcher::from_config(&config(), Arc::new(transport.clone()));

        let err = dispatcher
            .send("smsbroadcast", &OutboundMessage::new("hi", Vec::<String>::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, SmsError::MissingRecipient));
        assert_eq!(transport.calls(), 0);
    }
}
