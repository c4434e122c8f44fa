//! Entity types, one record of a managed resource each.
//!
//! Every kind shares an identifier, a display title, a creation timestamp and
//! at most one attachment URL. The [`Record`] trait exposes exactly that
//! common shape so the controller can stay generic.

use std::{borrow::Borrow, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{Error, Result, resource::ResourceKind};

// ─── Identifier ──────────────────────────────────────────────────────────────

/// Opaque, backend-assigned identifier (`_id` on the wire).
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for EntityId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<String> for EntityId {
  fn from(s: String) -> Self { Self(s) }
}

impl From<&str> for EntityId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl Borrow<str> for EntityId {
  fn borrow(&self) -> &str { &self.0 }
}

impl AsRef<str> for EntityId {
  fn as_ref(&self) -> &str { &self.0 }
}

// ─── Record trait ────────────────────────────────────────────────────────────

/// The shape every managed entity shares.
pub trait Record:
  Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
  const KIND: ResourceKind;

  fn id(&self) -> &EntityId;
  fn title(&self) -> &str;
  fn created_at(&self) -> Option<DateTime<Utc>>;

  /// URL of the entity's image or PDF, if it has one.
  fn attachment_url(&self) -> Option<&str> { None }
}

/// Overlay `fields` onto `entity`, as if the backend had echoed them back.
pub fn merge_fields<E: Record>(
  entity: &E,
  fields: &Map<String, Value>,
) -> Result<E> {
  let mut value = serde_json::to_value(entity).map_err(Error::malformed)?;
  if let Value::Object(object) = &mut value {
    for (name, field) in fields {
      object.insert(name.clone(), field.clone());
    }
  }
  serde_json::from_value(value).map_err(Error::malformed)
}

// ─── Shared sub-types ────────────────────────────────────────────────────────

/// A stored media reference. Older records hold a bare URL, newer ones an
/// object with a `url` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MediaRef {
  Url(String),
  Stored { url: String },
}

impl MediaRef {
  pub fn url(&self) -> &str {
    match self {
      MediaRef::Url(url) | MediaRef::Stored { url } => url,
    }
  }
}

/// A notice's category: either a bare id or the populated sub-entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
  Populated {
    #[serde(rename = "_id")]
    id:   EntityId,
    name: String,
  },
  Id(EntityId),
}

impl CategoryRef {
  pub fn id(&self) -> &EntityId {
    match self {
      CategoryRef::Populated { id, .. } | CategoryRef::Id(id) => id,
    }
  }

  pub fn name(&self) -> Option<&str> {
    match self {
      CategoryRef::Populated { name, .. } => Some(name),
      CategoryRef::Id(_) => None,
    }
  }
}

/// The account that posted a notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
  #[serde(default)]
  pub first_name: String,
  #[serde(default)]
  pub last_name:  String,
}

impl fmt::Display for Author {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.first_name, self.last_name)
  }
}

// ─── Album ───────────────────────────────────────────────────────────────────

/// A photo album with a single cover image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
  #[serde(rename = "_id")]
  pub id:          EntityId,
  pub title:       String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cover_image: Option<MediaRef>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at:  Option<DateTime<Utc>>,
}

impl Album {
  /// Multipart field carrying the cover on create.
  pub const COVER_FIELD: &'static str = "coverImage";
  /// Multipart field carrying a replacement cover on update.
  pub const REPLACEMENT_COVER_FIELD: &'static str = "image";
}

impl Record for Album {
  const KIND: ResourceKind = ResourceKind::Album;

  fn id(&self) -> &EntityId { &self.id }

  fn title(&self) -> &str { &self.title }

  fn created_at(&self) -> Option<DateTime<Utc>> { self.created_at }

  fn attachment_url(&self) -> Option<&str> {
    self.cover_image.as_ref().map(MediaRef::url)
  }
}

// ─── Management member ───────────────────────────────────────────────────────

/// A staff / management profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
  #[serde(rename = "_id")]
  pub id:           EntityId,
  pub name:         String,
  #[serde(default)]
  pub email:        String,
  #[serde(default)]
  pub phone_number: String,
  #[serde(default)]
  pub designation:  String,
  #[serde(default)]
  pub office_name:  String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image:        Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at:   Option<DateTime<Utc>>,
}

impl Member {
  pub const PHOTO_FIELD: &'static str = "image";
}

impl Record for Member {
  const KIND: ResourceKind = ResourceKind::Management;

  fn id(&self) -> &EntityId { &self.id }

  fn title(&self) -> &str { &self.name }

  fn created_at(&self) -> Option<DateTime<Utc>> { self.created_at }

  fn attachment_url(&self) -> Option<&str> { self.image.as_deref() }
}

// ─── Notice ──────────────────────────────────────────────────────────────────

/// An announcement, optionally with a PDF attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
  #[serde(rename = "_id")]
  pub id:               EntityId,
  pub title:            String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description:      Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub category:         Option<CategoryRef>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub pdf_url:          Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub pdf_download_url: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub posted_by:        Option<Author>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at:       Option<DateTime<Utc>>,
}

impl Notice {
  pub const PDF_FIELD: &'static str = "pdfUrl";

  /// Link for downloading the PDF; falls back to the viewing URL.
  pub fn download_url(&self) -> Option<&str> {
    self.pdf_download_url.as_deref().or(self.pdf_url.as_deref())
  }
}

impl Record for Notice {
  const KIND: ResourceKind = ResourceKind::Notice;

  fn id(&self) -> &EntityId { &self.id }

  fn title(&self) -> &str { &self.title }

  fn created_at(&self) -> Option<DateTime<Utc>> { self.created_at }

  fn attachment_url(&self) -> Option<&str> { self.pdf_url.as_deref() }
}

// ─── Notice category ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
  #[serde(rename = "_id")]
  pub id:         EntityId,
  pub name:       String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at: Option<DateTime<Utc>>,
}

impl Record for Category {
  const KIND: ResourceKind = ResourceKind::NoticeCategory;

  fn id(&self) -> &EntityId { &self.id }

  fn title(&self) -> &str { &self.name }

  fn created_at(&self) -> Option<DateTime<Utc>> { self.created_at }
}
