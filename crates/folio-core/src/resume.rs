//! The static resume dataset served by `/api/resume` and fed to the model.
//!
//! The dataset is schemaless JSON: it is returned verbatim and only the owner's
//! name is ever looked at. Key order is preserved so the serialised form is
//! stable across runs.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

const EMBEDDED: &str = include_str!("../data/resume.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resume(Value);

impl Resume {
  /// The dataset compiled into the binary.
  pub fn embedded() -> Result<Self> {
    Self::from_json_str(EMBEDDED)
  }

  pub fn from_json_str(raw: &str) -> Result<Self> {
    Ok(Self(serde_json::from_str(raw)?))
  }

  /// Load a dataset from a JSON file on disk.
  pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| Error::ResumeIo {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json_str(&raw)
  }

  /// `personal.name`, if the dataset carries one.
  pub fn owner_name(&self) -> Option<&str> {
    self.0.pointer("/personal/name").and_then(Value::as_str)
  }

  /// Compact single-line JSON, in authored key order.
  pub fn to_compact_json(&self) -> Result<String> {
    Ok(serde_json::to_string(&self.0)?)
  }

  pub fn as_value(&self) -> &Value {
    &self.0
  }
}
