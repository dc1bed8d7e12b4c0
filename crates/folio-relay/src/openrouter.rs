//! [`OpenRouterClient`]: the `reqwest` implementation of [`ChatUpstream`].
//!
//! Speaks the OpenAI-compatible chat completions protocol. The API key is
//! wrapped in [`SecretString`] and only exposed when building the
//! `Authorization` header.

use std::time::Duration;

use folio_core::chat::ChatMessage;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  upstream::{ChatUpstream, Completion},
};

pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Value shipped in sample `.env` files; treated the same as no key at all.
pub const PLACEHOLDER_API_KEY: &str = "your_openrouter_api_key_here";

/// Returns the key only if it is present, non-blank and not the placeholder.
pub fn usable_api_key(key: Option<&SecretString>) -> Option<SecretString> {
  let raw = key?.expose_secret().trim();
  (!raw.is_empty() && raw != PLACEHOLDER_API_KEY).then(|| SecretString::from(raw.to_owned()))
}

// ─── Configuration ───────────────────────────────────────────────────────────

/// Connection settings for the upstream service.
#[derive(Debug)]
pub struct OpenRouterConfig {
  pub api_key:     SecretString,
  pub endpoint:    String,
  pub max_tokens:  u32,
  pub temperature: f32,
  /// Sent as `HTTP-Referer` for OpenRouter's app attribution.
  pub referer:     String,
  /// Sent as `X-Title`.
  pub title:       String,
  pub timeout:     Duration,
}

impl OpenRouterConfig {
  pub fn new(api_key: SecretString) -> Self {
    Self {
      api_key,
      endpoint:    DEFAULT_ENDPOINT.to_owned(),
      max_tokens:  500,
      temperature: 0.7,
      referer:     "http://localhost:5173".to_owned(),
      title:       "Portfolio Chat".to_owned(),
      timeout:     Duration::from_secs(60),
    }
  }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
  model:       &'a str,
  messages:    &'a [ChatMessage],
  max_tokens:  u32,
  temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
  #[serde(default)]
  choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
  message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
  content: Option<String>,
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async HTTP client for an OpenAI-compatible chat completions endpoint.
pub struct OpenRouterClient {
  client: Client,
  config: OpenRouterConfig,
}

impl std::fmt::Debug for OpenRouterClient {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("OpenRouterClient")
      .field("endpoint", &self.config.endpoint)
      .field("timeout", &self.config.timeout)
      .finish()
  }
}

impl OpenRouterClient {
  pub fn new(config: OpenRouterConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(Error::Transport)?;
    Ok(Self { client, config })
  }

  fn map_send_error(&self, e: reqwest::Error) -> Error {
    if e.is_timeout() {
      Error::UpstreamTimeout(self.config.timeout)
    } else {
      Error::Transport(e)
    }
  }
}

impl ChatUpstream for OpenRouterClient {
  async fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<Completion> {
    let body = CompletionRequest {
      model,
      messages,
      max_tokens: self.config.max_tokens,
      temperature: self.config.temperature,
    };

    let resp = self
      .client
      .post(&self.config.endpoint)
      .bearer_auth(self.config.api_key.expose_secret())
      .header("HTTP-Referer", &self.config.referer)
      .header("X-Title", &self.config.title)
      .json(&body)
      .send()
      .await
      .map_err(|e| self.map_send_error(e))?;

    let status = resp.status();

    if status == StatusCode::OK {
      let parsed: CompletionResponse = resp.json().await.map_err(|e| {
        if e.is_timeout() {
          Error::UpstreamTimeout(self.config.timeout)
        } else {
          Error::MalformedResponse(e.to_string())
        }
      })?;
      return parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(Completion::Reply)
        .ok_or_else(|| Error::MalformedResponse("response has no message content".to_owned()));
    }

    let detail = resp.text().await.map_err(|e| self.map_send_error(e))?;
    if status == StatusCode::TOO_MANY_REQUESTS {
      Ok(Completion::RateLimited { detail })
    } else {
      Ok(Completion::Failed { status: status.as_u16(), detail })
    }
  }
}
