//! Error types for `ttc-core`.
//!
//! Every failure a controller operation can produce is one of these
//! variants. They all collapse to the same user-facing shape: a
//! [`FailureKind`] plus a message.

use serde::Serialize;
use thiserror::Error;

use crate::{entity::EntityId, resource::ResourceKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// The backend could not be reached, or the request timed out.
  #[error("network failure: {0}")]
  Network(String),

  /// The backend answered with a non-2xx status or `success: false`.
  /// `status` is `None` when the rejection was reported in-band.
  #[error("{message}")]
  Rejected {
    status:  Option<u16>,
    message: String,
  },

  /// The identifier is not part of the controller's current collection.
  #[error("{kind} {id} is not in the current collection")]
  NotFound { kind: ResourceKind, id: EntityId },

  /// The backend answered 2xx with a body outside the envelope contract.
  #[error("unexpected response: {0}")]
  MalformedResponse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The three failure categories surfaced to the presentation layer.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
  NetworkFailure,
  RejectedByServer,
  LocalValidation,
}

impl Error {
  pub fn kind(&self) -> FailureKind {
    match self {
      Error::Network(_) => FailureKind::NetworkFailure,
      Error::Rejected { .. } | Error::MalformedResponse(_) => {
        FailureKind::RejectedByServer
      }
      Error::NotFound { .. } => FailureKind::LocalValidation,
    }
  }

  /// User-facing message.
  pub fn message(&self) -> String { self.to_string() }

  /// `true` when the backend refused the bearer token.
  pub fn is_auth_failure(&self) -> bool {
    matches!(self, Error::Rejected { status: Some(401), .. })
  }

  /// Substitute `fallback` for a rejection that carried no message.
  pub fn or_fallback(self, fallback: impl FnOnce() -> String) -> Self {
    match self {
      Error::Rejected { status, message } if message.trim().is_empty() => {
        Error::Rejected {
          status,
          message: fallback(),
        }
      }
      other => other,
    }
  }

  pub(crate) fn malformed(err: impl std::fmt::Display) -> Self {
    Error::MalformedResponse(err.to_string())
  }
}
