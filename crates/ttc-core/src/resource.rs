//! Resource kinds and the backend routes that serve them.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// One kind of managed content on the backend.
///
/// The kebab-case form (`album`, `management`, ...) is the path segment the
/// backend mounts the resource under.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ResourceKind {
  Album,
  Management,
  Notice,
  NoticeCategory,
}

impl ResourceKind {
  pub fn segment(self) -> &'static str { self.into() }

  /// Human-readable singular noun, used in fallback messages.
  pub fn noun(self) -> &'static str {
    match self {
      ResourceKind::Album => "album",
      ResourceKind::Management => "management member",
      ResourceKind::Notice => "notice",
      ResourceKind::NoticeCategory => "notice category",
    }
  }

  // ── Routes ────────────────────────────────────────────────────────────────

  /// `GET`, the whole collection. The backend is not consistent here.
  pub fn list_path(self) -> String {
    match self {
      ResourceKind::Album => "/album/get-allalbums".into(),
      ResourceKind::Management => "/management/all-management".into(),
      other => format!("/{}/all", other.segment()),
    }
  }

  /// `GET /{r}/get-single-{r}/{id}`
  pub fn get_one_path(self, id: &EntityId) -> String {
    let r = self.segment();
    format!("/{r}/get-single-{r}/{id}")
  }

  /// `POST /{r}/create`
  pub fn create_path(self) -> String { format!("/{}/create", self.segment()) }

  /// `PUT /{r}/update/{id}`
  pub fn update_path(self, id: &EntityId) -> String {
    format!("/{}/update/{id}", self.segment())
  }

  /// `DELETE /{r}/delete/{id}`
  pub fn delete_path(self, id: &EntityId) -> String {
    format!("/{}/delete/{id}", self.segment())
  }
}
