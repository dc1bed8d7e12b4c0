//! Prompt assembly: system instructions + trailing history + the new message.

use crate::{
  Result,
  chat::{ChatMessage, ChatTurn},
  resume::Resume,
  store::HistoryStore,
};

const FALLBACK_OWNER: &str = "the owner";

/// Builds the ordered message list sent to the upstream model.
///
/// The system prompt depends only on the resume, so it is rendered once at
/// construction and reused for every request.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
  system_prompt: String,
}

impl PromptAssembler {
  pub fn new(resume: &Resume) -> Result<Self> {
    let owner = resume.owner_name().unwrap_or(FALLBACK_OWNER);
    let data  = resume.to_compact_json()?;
    let system_prompt = format!(
      "You are an AI assistant on {owner}'s portfolio. Answer only from this \
       resume data. Be concise (2-3 sentences). Use markdown for lists.\n\n\
       DATA:{data}\n"
    );
    Ok(Self { system_prompt })
  }

  pub fn system_prompt(&self) -> &str {
    &self.system_prompt
  }

  /// `[system] + history + [user]`. `history` must already be oldest-first.
  pub fn assemble(&self, history: Vec<ChatTurn>, user_message: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(self.system_prompt.clone()));
    messages.extend(history.into_iter().map(ChatMessage::from));
    messages.push(ChatMessage::user(user_message));
    messages
  }

  /// Read the last `limit` turns of `session_id` from `store` and assemble
  /// the prompt around `user_message`.
  pub async fn for_session<S: HistoryStore>(
    &self,
    store: &S,
    session_id: &str,
    user_message: &str,
    limit: usize,
  ) -> Result<Vec<ChatMessage>, S::Error> {
    let history = store.read_recent_turns(session_id, limit).await?;
    Ok(self.assemble(history, user_message))
  }
}
