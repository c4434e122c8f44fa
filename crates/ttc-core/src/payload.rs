//! Request payloads for create and update calls.
//!
//! A [`Payload`] is a flat set of named fields plus at most one file. The
//! typed drafts at the bottom of this module are the forms the console
//! submits; each converts into a `Payload`.

use std::path::Path;

use bytes::Bytes;
use serde_json::{Map, Value};

use crate::{
  entity::{Album, EntityId, Member, Notice},
  transport::Body,
};

// ─── Attachment ──────────────────────────────────────────────────────────────

/// A file to upload alongside the payload fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
  pub file_name:    String,
  pub content_type: String,
  pub data:         Bytes,
}

impl Attachment {
  /// Build an attachment, inferring the content type from `file_name`.
  pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
    let file_name = file_name.into();
    let content_type = content_type_for(&file_name).to_owned();
    Self {
      file_name,
      content_type,
      data: data.into(),
    }
  }

  pub fn len(&self) -> usize { self.data.len() }

  pub fn is_empty(&self) -> bool { self.data.is_empty() }
}

/// Content type for the image and document formats the backend accepts.
pub fn content_type_for(file_name: &str) -> &'static str {
  let extension = Path::new(file_name)
    .extension()
    .and_then(|e| e.to_str())
    .map(str::to_ascii_lowercase);
  match extension.as_deref() {
    Some("jpg" | "jpeg") => "image/jpeg",
    Some("png") => "image/png",
    Some("gif") => "image/gif",
    Some("webp") => "image/webp",
    Some("pdf") => "application/pdf",
    _ => "application/octet-stream",
  }
}

// ─── Payload ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
  fields:     Map<String, Value>,
  attachment: Option<(String, Attachment)>,
}

impl Payload {
  pub fn new() -> Self { Self::default() }

  pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
    self.set(name, value);
    self
  }

  pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
    self.fields.insert(name.into(), value.into());
  }

  /// Set `name` only when `value` is present.
  pub fn maybe(self, name: impl Into<String>, value: Option<impl Into<Value>>) -> Self {
    match value {
      Some(value) => self.field(name, value),
      None => self,
    }
  }

  /// Attach a file under the multipart field `field`. Replaces any earlier
  /// attachment.
  pub fn attach(mut self, field: impl Into<String>, attachment: Attachment) -> Self {
    self.attachment = Some((field.into(), attachment));
    self
  }

  pub fn fields(&self) -> &Map<String, Value> { &self.fields }

  pub fn attachment(&self) -> Option<(&str, &Attachment)> {
    self.attachment.as_ref().map(|(f, a)| (f.as_str(), a))
  }

  pub fn is_multipart(&self) -> bool { self.attachment.is_some() }

  /// Encode as a request body: multipart when a file is attached, JSON
  /// otherwise.
  pub fn into_body(self) -> Body {
    match self.attachment {
      Some((file_field, attachment)) => Body::Multipart {
        fields: self
          .fields
          .into_iter()
          .map(|(name, value)| (name, form_text(value)))
          .collect(),
        file_field,
        attachment,
      },
      None => Body::Json(Value::Object(self.fields)),
    }
  }
}

/// Multipart text parts carry strings verbatim and everything else as JSON.
fn form_text(value: Value) -> String {
  match value {
    Value::String(s) => s,
    Value::Null => String::new(),
    other => other.to_string(),
  }
}

// ─── Drafts ──────────────────────────────────────────────────────────────────

/// Fields of the "create album" form.
#[derive(Debug, Clone)]
pub struct AlbumDraft {
  pub title:       String,
  pub description: String,
  pub cover:       Attachment,
}

impl From<AlbumDraft> for Payload {
  fn from(draft: AlbumDraft) -> Self {
    Payload::new()
      .field("title", draft.title)
      .field("description", draft.description)
      .attach(Album::COVER_FIELD, draft.cover)
  }
}

/// Fields of the "edit album" form; unchanged fields stay `None`.
#[derive(Debug, Clone, Default)]
pub struct AlbumPatch {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub cover:       Option<Attachment>,
}

impl From<AlbumPatch> for Payload {
  fn from(patch: AlbumPatch) -> Self {
    let payload = Payload::new()
      .maybe("title", patch.title)
      .maybe("description", patch.description);
    match patch.cover {
      Some(cover) => payload.attach(Album::REPLACEMENT_COVER_FIELD, cover),
      None => payload,
    }
  }
}

/// Fields of the management member form. The photo is optional on both
/// create and update.
#[derive(Debug, Clone)]
pub struct MemberDraft {
  pub name:         String,
  pub email:        String,
  pub phone_number: String,
  pub designation:  String,
  pub office_name:  String,
  pub photo:        Option<Attachment>,
}

impl From<MemberDraft> for Payload {
  fn from(draft: MemberDraft) -> Self {
    let payload = Payload::new()
      .field("name", draft.name)
      .field("email", draft.email)
      .field("phoneNumber", draft.phone_number)
      .field("designation", draft.designation)
      .field("officeName", draft.office_name);
    match draft.photo {
      Some(photo) => payload.attach(Member::PHOTO_FIELD, photo),
      None => payload,
    }
  }
}

/// Fields of the notice form.
#[derive(Debug, Clone)]
pub struct NoticeDraft {
  pub title:       String,
  pub category:    EntityId,
  pub description: String,
  pub pdf:         Option<Attachment>,
}

impl From<NoticeDraft> for Payload {
  fn from(draft: NoticeDraft) -> Self {
    let payload = Payload::new()
      .field("title", draft.title)
      .field("category", draft.category.to_string())
      .field("description", draft.description);
    match draft.pdf {
      Some(pdf) => payload.attach(Notice::PDF_FIELD, pdf),
      None => payload,
    }
  }
}
