//! Core types for the training-center admin client.
//!
//! Holds the entity model, request payloads, the [`Transport`] seam and the
//! generic [`ResourceController`] that keeps one fetched collection in sync
//! with the backend. There is no HTTP code here; `ttc-client` provides the
//! real transport.

pub mod collection;
pub mod controller;
pub mod entity;
pub mod envelope;
pub mod error;
pub mod payload;
pub mod resource;
pub mod session;
pub mod transport;

#[cfg(test)]
mod tests;

pub use collection::{Collection, Page};
pub use controller::{
  AlbumController, CategoryController, LoadOutcome, ManagementController,
  NoticeController, PendingRemoval, Reply, ResourceController, Status,
};
pub use entity::{EntityId, Record};
pub use error::{Error, FailureKind, Result};
pub use payload::{Attachment, Payload};
pub use resource::ResourceKind;
pub use session::Session;
pub use transport::{Body, Method, Request, Transport};
