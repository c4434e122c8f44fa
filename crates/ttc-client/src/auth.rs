//! Login, logout and the signed-in profile.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/login` | Body: `{"email", "password"}`, returns `{"token"}` |
//! | `GET`  | `/auth/getme` | Bearer token required, returns `{"data": user}` |

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use ttc_core::{Body, EntityId, Error, Request, Result, Transport, envelope::decode_item};

use crate::http::HttpTransport;

pub(crate) const LOGIN_PATH: &str = "/auth/login";

/// The signed-in account as reported by `/auth/getme`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
  #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
  pub id:         Option<EntityId>,
  #[serde(default)]
  pub first_name: String,
  #[serde(default)]
  pub last_name:  String,
  #[serde(default)]
  pub email:      String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub role:       Option<String>,
}

impl Profile {
  pub fn display_name(&self) -> String {
    let full = format!("{} {}", self.first_name, self.last_name);
    match full.trim() {
      "" => self.email.clone(),
      name => name.to_owned(),
    }
  }
}

impl HttpTransport {
  /// Exchange credentials for a bearer token and store it in the session.
  pub async fn login(&self, email: &str, password: &str) -> Result<String> {
    let body = Body::Json(json!({ "email": email, "password": password }));
    let value = self
      .send(Request::post(LOGIN_PATH, body))
      .await
      .map_err(|e| e.or_fallback(|| "Invalid credentials".into()))?;

    let token = extract_token(&value).ok_or_else(|| {
      Error::MalformedResponse("login response carried no token".into())
    })?;
    self.session().set_token(token.clone());
    tracing::debug!("signed in");
    Ok(token)
  }

  /// Fetch the profile of the signed-in account.
  pub async fn me(&self) -> Result<Profile> {
    let value = self.send(Request::get("/auth/getme")).await?;
    decode_item::<Profile>(value)?
      .ok_or_else(|| Error::MalformedResponse("profile response carried no data".into()))
  }

  /// Drop the token. Returns `true` if one was present.
  pub fn logout(&self) -> bool { self.session().clear() }
}

/// `{"token"}` at the top level, or nested under `data`.
fn extract_token(value: &Value) -> Option<String> {
  value
    .get("token")
    .or_else(|| value.get("data").and_then(|d| d.get("token")))
    .and_then(Value::as_str)
    .filter(|t| !t.is_empty())
    .map(str::to_owned)
}
