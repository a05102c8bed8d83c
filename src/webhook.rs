use serde::Serialize;

use crate::error::{Error, Result};

/// Body of a Discord-style webhook execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookMessage {
    pub content: String,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub thumbnail: EmbedImage,
    pub image: EmbedImage,
    pub timestamp: String,
    pub footer: EmbedFooter,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedImage {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Resolves to `Ok` only once the receiving end acknowledged the message.
    async fn deliver(&self, message: &WebhookMessage) -> Result<()>;
}

pub struct Client {
    pub req_client: reqwest::Client,
    url: String,
}

impl Client {
    pub fn new(req_client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            req_client,
            url: url.into(),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for Client {
    #[tracing::instrument(skip(self, message))]
    async fn deliver(&self, message: &WebhookMessage) -> Result<()> {
        let resp = self.req_client.post(&self.url).json(message).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::debug!("Webhook rejected message {:?}: {}", status, body);
            return Err(Error::Protocol {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}
