use serde::{Deserialize, Serialize};

/// Normalized outbound message handed to every adapter.
///
/// The destination list may be empty at construction time; adapters reject
/// it with [`SmsError::MissingRecipient`](crate::SmsError::MissingRecipient)
/// before touching the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    body: String,
    to: Vec<String>,
    from: Option<String>,
}

impl OutboundMessage {
    pub fn new<B, I, S>(body: B, to: I) -> Self
    where
        B: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            body: body.into(),
            to: to.into_iter().map(Into::into).collect(),
            from: None,
        }
    }

    /// Override the account's default sender for this message.
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Destination numbers in send order.
    pub fn to(&self) -> &[String] {
        &self.to
    }

    /// Sender override, if one was given and is non-empty.
    pub fn from(&self) -> Option<&str> {
        self.from.as_deref().filter(|f| !f.is_empty())
    }
}
