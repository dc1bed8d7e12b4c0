//! Runtime configuration, deserialised from `config.toml` and the environment.

use std::{
  fs, io,
  path::{Path, PathBuf},
  time::Duration,
};

use folio_core::chat::DEFAULT_HISTORY_LIMIT;
use folio_relay::{
  Dispatcher, ModelCandidates, OpenRouterClient, OpenRouterConfig, RetryPolicy,
  openrouter::{DEFAULT_ENDPOINT, usable_api_key},
};
use secrecy::SecretString;
use serde::Deserialize;

/// Top-level server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:          String,
  pub port:          u16,
  pub store_path:    PathBuf,
  pub history_limit: usize,
  /// JSON file replacing the built-in resume dataset.
  pub resume_path:   Option<PathBuf>,
  pub upstream:      UpstreamSettings,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:          "127.0.0.1".to_owned(),
      port:          8000,
      store_path:    PathBuf::from("chat_history.db"),
      history_limit: DEFAULT_HISTORY_LIMIT,
      resume_path:   None,
      upstream:      UpstreamSettings::default(),
    }
  }
}

impl ServerConfig {
  /// Layer an optional TOML file and `FOLIO_*` environment variables over the
  /// defaults. Nested keys use `__`, e.g. `FOLIO_UPSTREAM__DEFAULT_MODEL`.
  pub fn load(file: &Path) -> Result<Self, config::ConfigError> {
    Self::load_with_env(file, environment())
  }

  fn load_with_env(file: &Path, env: config::Environment) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(file).required(false))
      .add_source(env)
      .build()?
      .try_deserialize()
  }

  /// `store_path` with a leading `~` expanded and its parent directory
  /// created.
  pub fn prepare_store_path(&self) -> io::Result<PathBuf> {
    let path = expand_tilde(&self.store_path);
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      fs::create_dir_all(parent)?;
    }
    Ok(path)
  }
}

fn environment() -> config::Environment {
  config::Environment::with_prefix("FOLIO")
    .prefix_separator("_")
    .separator("__")
    .list_separator(",")
    .with_list_parse_key("upstream.fallback_models")
    .try_parsing(true)
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

/// Settings for the upstream chat-completion service.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UpstreamSettings {
  pub api_key:           Option<SecretString>,
  pub endpoint:          String,
  pub default_model:     String,
  pub fallback_models:   Vec<String>,
  pub max_tokens:        u32,
  pub temperature:       f32,
  pub max_retries:       u32,
  pub backoff_step_secs: u64,
  pub timeout_secs:      u64,
  pub referer:           String,
  pub title:             String,
}

impl Default for UpstreamSettings {
  fn default() -> Self {
    Self {
      api_key:           None,
      endpoint:          DEFAULT_ENDPOINT.to_owned(),
      default_model:     "meta-llama/llama-3.2-3b-instruct:free".to_owned(),
      fallback_models:   vec![
        "nvidia/nemotron-nano-9b-v2:free".to_owned(),
        "qwen/qwen3-4b:free".to_owned(),
        "meta-llama/llama-3.3-70b-instruct:free".to_owned(),
        "meta-llama/llama-3.2-3b-instruct:free".to_owned(),
      ],
      max_tokens:        500,
      temperature:       0.7,
      max_retries:       3,
      backoff_step_secs: 3,
      timeout_secs:      60,
      referer:           "http://localhost:5173".to_owned(),
      title:             "Portfolio Chat".to_owned(),
    }
  }
}

impl UpstreamSettings {
  pub fn retry_policy(&self) -> RetryPolicy {
    RetryPolicy {
      max_retries:  self.max_retries,
      backoff_step: Duration::from_secs(self.backoff_step_secs),
      call_timeout: Duration::from_secs(self.timeout_secs),
    }
  }

  pub fn candidates(&self) -> folio_relay::Result<ModelCandidates> {
    ModelCandidates::new(&self.default_model, &self.fallback_models)
  }

  /// Build the production dispatcher, or `None` when no usable API key is
  /// configured.
  pub fn build_relay(&self) -> folio_relay::Result<Option<Dispatcher<OpenRouterClient>>> {
    let Some(api_key) = usable_api_key(self.api_key.as_ref()) else {
      return Ok(None);
    };

    let client = OpenRouterClient::new(OpenRouterConfig {
      api_key,
      endpoint:    self.endpoint.clone(),
      max_tokens:  self.max_tokens,
      temperature: self.temperature,
      referer:     self.referer.clone(),
      title:       self.title.clone(),
      timeout:     Duration::from_secs(self.timeout_secs),
    })?;

    Ok(Some(Dispatcher::new(client, self.candidates()?, self.retry_policy())))
  }
}
