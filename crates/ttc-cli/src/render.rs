//! Plain-text rendering of entities for the terminal.

use chrono::{DateTime, Utc};
use ttc_core::{
  Page, Record,
  entity::{Album, Category, Member, Notice},
};

/// How one kind of entity is printed.
pub trait Render: Record {
  /// Short secondary text shown after the title in list rows.
  fn summary(&self) -> String;

  /// Labelled fields for the detail view, title excluded.
  fn details(&self) -> Vec<(&'static str, String)>;
}

impl Render for Album {
  fn summary(&self) -> String {
    self.description.clone().unwrap_or_default()
  }

  fn details(&self) -> Vec<(&'static str, String)> {
    vec![
      ("Description", self.description.clone().unwrap_or_default()),
      ("Cover", self.attachment_url().unwrap_or("-").to_owned()),
      ("Created", format_date(self.created_at)),
    ]
  }
}

impl Render for Member {
  fn summary(&self) -> String {
    format!("{} · {}", self.designation, self.office_name)
  }

  fn details(&self) -> Vec<(&'static str, String)> {
    vec![
      ("Designation", self.designation.clone()),
      ("Email", self.email.clone()),
      ("Phone", self.phone_number.clone()),
      ("Office", self.office_name.clone()),
      ("Photo", self.image.clone().unwrap_or_else(|| "-".into())),
    ]
  }
}

impl Render for Notice {
  fn summary(&self) -> String {
    self
      .category
      .as_ref()
      .and_then(|c| c.name())
      .unwrap_or_default()
      .to_owned()
  }

  fn details(&self) -> Vec<(&'static str, String)> {
    vec![
      (
        "Category",
        self
          .category
          .as_ref()
          .map(|c| c.name().unwrap_or(c.id().as_str()).to_owned())
          .unwrap_or_default(),
      ),
      ("Description", self.description.clone().unwrap_or_default()),
      (
        "Posted by",
        self
          .posted_by
          .as_ref()
          .map(ToString::to_string)
          .unwrap_or_else(|| "-".into()),
      ),
      ("Posted", format_date(self.created_at)),
      ("PDF", self.pdf_url.clone().unwrap_or_else(|| "-".into())),
      ("Download", self.download_url().unwrap_or("-").to_owned()),
    ]
  }
}

impl Render for Category {
  fn summary(&self) -> String { String::new() }

  fn details(&self) -> Vec<(&'static str, String)> {
    vec![("Created", format_date(self.created_at))]
  }
}

/// `Mar 1, 2024`, or `N/A` without a timestamp.
pub fn format_date(ts: Option<DateTime<Utc>>) -> String {
  ts.map(|t| t.format("%b %-d, %Y").to_string())
    .unwrap_or_else(|| "N/A".into())
}

pub fn row<E: Render>(entity: &E) -> String {
  let summary = entity.summary();
  let mut line = format!(
    "{:<26} {:<12} {}",
    entity.id().as_str(),
    format_date(entity.created_at()),
    entity.title()
  );
  if !summary.trim().is_empty() {
    line.push_str(&format!("  ({summary})"));
  }
  line
}

pub fn detail<E: Render>(entity: &E) -> String {
  let mut out = format!("{}\n  Id: {}\n", entity.title(), entity.id());
  for (label, value) in entity.details() {
    out.push_str(&format!("  {label}: {value}\n"));
  }
  out
}

pub fn page_footer<E>(page: &Page<'_, E>, total: usize) -> String {
  format!(
    "page {}/{} · {} total",
    page.number,
    page.total_pages.max(1),
    total
  )
}
