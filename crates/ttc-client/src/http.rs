//! `reqwest`-backed implementation of [`Transport`].

use std::future::Future;

use anyhow::Context;
use reqwest::{
  Client, RequestBuilder, StatusCode,
  multipart::{Form, Part},
};
use serde_json::Value;
use ttc_core::{Body, Error, Method, Request, Result, Session, Transport};

use crate::{auth::LOGIN_PATH, config::ApiConfig};

/// HTTP transport for the backend's JSON / multipart API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based and the
/// [`Session`] is shared, so every clone sees the same token.
#[derive(Clone)]
pub struct HttpTransport {
  client:  Client,
  config:  ApiConfig,
  session: Session,
}

impl HttpTransport {
  pub fn new(config: ApiConfig, session: Session) -> anyhow::Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout())
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self {
      client,
      config,
      session,
    })
  }

  pub fn session(&self) -> &Session { &self.session }

  pub fn config(&self) -> &ApiConfig { &self.config }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    match self.session.token() {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  async fn execute(&self, request: Request) -> Result<Value> {
    let method = match request.method {
      Method::Get => reqwest::Method::GET,
      Method::Post => reqwest::Method::POST,
      Method::Put => reqwest::Method::PUT,
      Method::Delete => reqwest::Method::DELETE,
    };
    let url = self.url(&request.path);
    tracing::debug!(%method, %url, "request");

    let builder = self.auth(self.client.request(method, &url));
    let builder = match request.body {
      Body::Empty => builder,
      Body::Json(value) => builder.json(&value),
      Body::Multipart {
        fields,
        file_field,
        attachment,
      } => {
        let part = Part::bytes(attachment.data.to_vec())
          .file_name(attachment.file_name)
          .mime_str(&attachment.content_type)
          .map_err(|e| Error::Network(format!("invalid attachment type: {e}")))?;
        let form = fields
          .into_iter()
          .fold(Form::new(), |form, (name, value)| form.text(name, value))
          .part(file_field, part);
        builder.multipart(form)
      }
    };

    let response = builder.send().await.map_err(network)?;
    let status = response.status();
    let bytes = response.bytes().await.map_err(network)?;
    let body = parse_body(&bytes);

    if status.is_success() {
      return match body {
        Value::String(_) => Err(Error::MalformedResponse(format!(
          "{} {} answered with a non-JSON body",
          request.method, request.path
        ))),
        body => Ok(body),
      };
    }

    // A failed sign-in says nothing about the token already held.
    if status == StatusCode::UNAUTHORIZED
      && request.path != LOGIN_PATH
      && self.session.clear()
    {
      tracing::warn!(path = %request.path, "backend rejected the token; session cleared");
    }
    Err(Error::Rejected {
      status:  Some(status.as_u16()),
      message: rejection_message(&body, status),
    })
  }
}

impl Transport for HttpTransport {
  fn send(&self, request: Request) -> impl Future<Output = Result<Value>> + Send + '_ {
    self.execute(request)
  }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn network(e: reqwest::Error) -> Error {
  if e.is_timeout() {
    Error::Network("request timed out".into())
  } else {
    Error::Network(e.to_string())
  }
}

/// JSON if it parses, the raw text otherwise, `Null` when empty.
fn parse_body(bytes: &[u8]) -> Value {
  if bytes.iter().all(u8::is_ascii_whitespace) {
    return Value::Null;
  }
  serde_json::from_slice(bytes)
    .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

/// The backend's own wording when it gave one, a status line otherwise.
fn rejection_message(body: &Value, status: StatusCode) -> String {
  let from_body = match body {
    Value::Object(object) => ["message", "error"]
      .iter()
      .find_map(|key| object.get(*key).and_then(Value::as_str)),
    Value::String(text) => Some(text.as_str()),
    _ => None,
  };
  match from_body.map(str::trim) {
    Some(message) if !message.is_empty() => message.to_owned(),
    _ => format!("request failed with status {status}"),
  }
}
