//! The priority-ordered list of models a dispatch may try.

use crate::{Error, Result};

/// Candidate model identifiers, primary first, without duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCandidates(Vec<String>);

impl ModelCandidates {
  /// Build the list from a primary model and its fallbacks.
  ///
  /// Later duplicates and blank identifiers are dropped; the first occurrence
  /// of each model keeps its position.
  pub fn new<I, S>(primary: impl Into<String>, fallbacks: I) -> Result<Self>
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let mut models: Vec<String> = Vec::new();
    let all = std::iter::once(primary.into()).chain(fallbacks.into_iter().map(Into::into));
    for model in all {
      let model = model.trim().to_owned();
      if !model.is_empty() && !models.contains(&model) {
        models.push(model);
      }
    }

    if models.is_empty() {
      return Err(Error::NoCandidates);
    }
    Ok(Self(models))
  }

  pub fn primary(&self) -> &str {
    &self.0[0]
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.0.iter().map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}
