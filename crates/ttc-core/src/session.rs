//! Process-wide session state: the bearer token.
//!
//! Set at login, cleared at logout or when the backend rejects the token.
//! Clones share the same slot, so the transport and the code that persists
//! the token always agree.

use std::{fmt, sync::Arc};

use parking_lot::RwLock;

#[derive(Clone, Default)]
pub struct Session {
  token: Arc<RwLock<Option<String>>>,
}

impl Session {
  pub fn new() -> Self { Self::default() }

  pub fn with_token(token: impl Into<String>) -> Self {
    let session = Self::new();
    session.set_token(token);
    session
  }

  pub fn token(&self) -> Option<String> { self.token.read().clone() }

  pub fn set_token(&self, token: impl Into<String>) {
    *self.token.write() = Some(token.into());
  }

  /// Drop the token. Returns `true` if one was present.
  pub fn clear(&self) -> bool { self.token.write().take().is_some() }

  pub fn is_authenticated(&self) -> bool { self.token.read().is_some() }
}

impl fmt::Debug for Session {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Session")
      .field("authenticated", &self.is_authenticated())
      .finish()
  }
}
