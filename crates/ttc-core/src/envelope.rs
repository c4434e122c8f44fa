//! Decoding of the backend's response envelope.
//!
//! The backend wraps results as `{ success, data, message }`. Some list
//! endpoints return a bare array instead; that is accepted here and nowhere
//! else.

use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{Error, Result};

fn default_success() -> bool { true }

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
  #[serde(default = "default_success")]
  pub success: bool,
  pub data:    Option<T>,
  #[serde(default)]
  pub message: Option<String>,
}

impl<T: DeserializeOwned> Envelope<T> {
  fn parse(value: Value) -> Result<Self> {
    let envelope: Envelope<T> =
      serde_json::from_value(value).map_err(Error::malformed)?;
    if !envelope.success {
      return Err(Error::Rejected {
        status:  None,
        message: envelope.message.unwrap_or_default(),
      });
    }
    Ok(envelope)
  }
}

/// Decode a list response: an envelope around an array, or a bare array.
pub fn decode_list<T: DeserializeOwned>(value: Value) -> Result<Vec<T>> {
  if value.is_array() {
    return serde_json::from_value(value).map_err(Error::malformed);
  }
  Envelope::<Vec<T>>::parse(value)?
    .data
    .ok_or_else(|| Error::MalformedResponse("list response carried no data".into()))
}

/// Decode a single-item response. `Ok(None)` when the envelope has no data.
pub fn decode_item<T: DeserializeOwned>(value: Value) -> Result<Option<T>> {
  Ok(Envelope::<T>::parse(value)?.data)
}

/// Decode an acknowledgement (`{ success }`); an empty body counts as one.
pub fn decode_ack(value: Value) -> Result<()> {
  if value.is_null() {
    return Ok(());
  }
  Envelope::<Value>::parse(value).map(|_| ())
}
