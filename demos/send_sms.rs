//! Send an SMS through one of the configured gateways.
//!
//! Accounts come from `config/*.toml` or `SMSKIT__PROVIDERS__...` variables.
use smskit::prelude::*;

use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = AppConfig::load()?;
    smskit::logging::init(&config.logging)?;

    let provider = arg_or_env("--provider", "SMS_PROVIDER");
    let to = arg_or_env("--to", "SMS_TO");
    let text = arg_or_env("--text", "SMS_TEXT");

    let mut message = OutboundMessage::new(text, to.split(','));
    if let Some(from) = optional_arg_or_env("--from", "SMS_FROM") {
        message = message.with_from(from);
    }

    let dispatcher = Dispatcher::connect(&config)?;
    dispatcher.send(&provider, &message).await?;
    println!("Sent via {} to {}", provider, message.to().join(", "));
    Ok(())
}

fn optional_arg_or_env(flag: &str, env_key: &str) -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    if let Some(idx) = args.iter().position(|a| a == flag) {
        if idx + 1 < args.len() {
            return Some(args[idx + 1].clone());
        }
    }
    env::var(env_key).ok()
}

fn arg_or_env(flag: &str, env_key: &str) -> String {
    optional_arg_or_env(flag, env_key)
        .unwrap_or_else(|| panic!("missing {} (arg {} or env {})", flag, flag, env_key))
}
