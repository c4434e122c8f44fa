//! The `Transport` trait and the request type it carries.
//!
//! The trait is implemented by `ttc-client` over HTTP and by in-memory fakes
//! in tests. Controllers depend on this abstraction, never on a concrete
//! client.

use std::future::Future;

use serde_json::Value;

use crate::{Result, payload::Attachment};

// ─── Request ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
  Get,
  Post,
  Put,
  Delete,
}

/// Request body. `Multipart` is chosen whenever a file is attached.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
  Empty,
  Json(Value),
  Multipart {
    fields:     Vec<(String, String)>,
    file_field: String,
    attachment: Attachment,
  },
}

/// A single call against the backend, relative to the transport's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
  pub method: Method,
  pub path:   String,
  pub body:   Body,
}

impl Request {
  pub fn get(path: impl Into<String>) -> Self {
    Self {
      method: Method::Get,
      path:   path.into(),
      body:   Body::Empty,
    }
  }

  pub fn post(path: impl Into<String>, body: Body) -> Self {
    Self {
      method: Method::Post,
      path: path.into(),
      body,
    }
  }

  pub fn put(path: impl Into<String>, body: Body) -> Self {
    Self {
      method: Method::Put,
      path: path.into(),
      body,
    }
  }

  pub fn delete(path: impl Into<String>) -> Self {
    Self {
      method: Method::Delete,
      path:   path.into(),
      body:   Body::Empty,
    }
  }

  pub fn is_multipart(&self) -> bool {
    matches!(self.body, Body::Multipart { .. })
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the backend connection.
///
/// Implementations attach the session's bearer token, resolve to the decoded
/// JSON body of a 2xx response (`Value::Null` for an empty body), and map
/// everything else onto [`crate::Error::Network`] or
/// [`crate::Error::Rejected`].
///
/// The returned future is `Send` so controllers can be driven from
/// multi-threaded runtimes.
pub trait Transport: Send + Sync {
  fn send(
    &self,
    request: Request,
  ) -> impl Future<Output = Result<Value>> + Send + '_;
}
