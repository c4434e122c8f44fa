//! The generic resource collection controller.
//!
//! One controller owns one [`Collection`] for one resource kind and applies
//! fetches and mutations to it through an injected [`Transport`]. Albums,
//! management members and notices are all served by this one type; see the
//! aliases at the bottom of the module.
//!
//! Ordering rules:
//!
//! - Loads may overlap. Each load is numbered when issued; a response is
//!   applied only if no newer load has already settled, so a slow early
//!   request cannot clobber a fast later one.
//! - Mutations are not serialised. A mutation that resolves after a later
//!   load has already replaced the collection leaves it alone. A later load
//!   that failed, or is still in flight, does not stop the local patch.

use parking_lot::Mutex;
use serde::Serialize;

use crate::{
  collection::Collection,
  entity::{Album, Category, EntityId, Member, Notice, Record, merge_fields},
  envelope::{decode_ack, decode_item, decode_list},
  error::{Error, FailureKind, Result},
  payload::Payload,
  transport::{Request, Transport},
};

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Status {
  /// Constructed, nothing fetched yet.
  Idle,
  Loading,
  Ready,
  /// The most recent load failed; the previous collection is still held.
  Error,
}

/// What happened to a load that completed without a transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
  /// The response replaced the collection.
  Applied { count: usize },
  /// A newer load settled first; this response was discarded.
  Superseded,
}

// ─── Pending removal ─────────────────────────────────────────────────────────

/// The first half of the delete protocol.
///
/// Produced by [`ResourceController::request_remove`] without touching the
/// collection; nothing is deleted until it is handed to
/// [`ResourceController::confirm_remove`].
#[derive(Debug, Clone)]
#[must_use = "nothing is deleted until the removal is confirmed"]
pub struct PendingRemoval<E> {
  entity: E,
}

impl<E: Record> PendingRemoval<E> {
  pub fn id(&self) -> &EntityId { self.entity.id() }

  /// Title to show in the confirmation prompt.
  pub fn title(&self) -> &str { self.entity.title() }

  pub fn entity(&self) -> &E { &self.entity }
}

// ─── Reply ───────────────────────────────────────────────────────────────────

/// Serialisable `{ success, data, message }` rendering of an operation
/// result, for callers that print or forward results as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct Reply<T> {
  pub success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data:    Option<T>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub kind:    Option<FailureKind>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

impl<T> From<Result<T>> for Reply<T> {
  fn from(result: Result<T>) -> Self {
    match result {
      Ok(data) => Self {
        success: true,
        data:    Some(data),
        kind:    None,
        message: None,
      },
      Err(e) => Self {
        success: false,
        data:    None,
        kind:    Some(e.kind()),
        message: Some(e.message()),
      },
    }
  }
}

// ─── Controller ──────────────────────────────────────────────────────────────

struct State<E> {
  collection: Collection<E>,
  status:     Status,
  last_error: Option<Error>,
  /// Number of loads issued so far; also the sequence number of the newest.
  issued:     u64,
  /// Sequence number of the newest load whose result was applied.
  settled:    u64,
  /// Sequence number of the newest load that replaced the collection.
  replaced:   u64,
}

pub struct ResourceController<E, T> {
  transport: T,
  state:     Mutex<State<E>>,
}

impl<E: Record, T: Transport> ResourceController<E, T> {
  pub fn new(transport: T) -> Self {
    Self {
      transport,
      state: Mutex::new(State {
        collection: Collection::new(),
        status:     Status::Idle,
        last_error: None,
        issued:     0,
        settled:    0,
        replaced:   0,
      }),
    }
  }

  pub fn transport(&self) -> &T { &self.transport }

  // ── Observation ───────────────────────────────────────────────────────────

  pub fn status(&self) -> Status { self.state.lock().status }

  /// Error of the most recent failed load, cleared by the next success.
  pub fn last_error(&self) -> Option<Error> {
    self.state.lock().last_error.clone()
  }

  /// Snapshot of the collection in backend order.
  pub fn entities(&self) -> Vec<E> { self.state.lock().collection.as_slice().to_vec() }

  pub fn get(&self, id: &str) -> Option<E> {
    self.state.lock().collection.get(id).cloned()
  }

  /// Run `f` against the collection without cloning it.
  pub fn read<R>(&self, f: impl FnOnce(&Collection<E>) -> R) -> R {
    f(&self.state.lock().collection)
  }

  /// Append a created entity returned by [`Self::create`].
  pub fn insert_created(&self, entity: E) {
    self.state.lock().collection.insert_created(entity);
  }

  // ── Load ──────────────────────────────────────────────────────────────────

  /// Fetch the whole collection and replace local state with it.
  ///
  /// On failure the previous collection is kept and the status becomes
  /// [`Status::Error`].
  pub async fn load(&self) -> Result<LoadOutcome> {
    let seq = {
      let mut state = self.state.lock();
      state.issued += 1;
      state.status = Status::Loading;
      state.issued
    };

    let result = self
      .call(Request::get(E::KIND.list_path()), "load")
      .await
      .and_then(decode_list::<E>)
      .map_err(|e| self.fallback(e, "load"));

    let mut state = self.state.lock();
    if seq <= state.settled {
      tracing::warn!(kind = %E::KIND, seq, settled = state.settled, "discarding stale load");
      return result.map(|_| LoadOutcome::Superseded);
    }
    state.settled = seq;
    let newest = seq == state.issued;

    match result {
      Ok(items) => {
        state.collection.replace_all(items);
        state.replaced = seq;
        state.last_error = None;
        state.status = if newest { Status::Ready } else { Status::Loading };
        let count = state.collection.len();
        tracing::info!(kind = %E::KIND, count, "collection loaded");
        Ok(LoadOutcome::Applied { count })
      }
      Err(e) => {
        state.last_error = Some(e.clone());
        state.status = if newest { Status::Error } else { Status::Loading };
        Err(e)
      }
    }
  }

  /// Fetch one entity by id, e.g. to prefill an edit form. The collection is
  /// not touched and need not contain `id`.
  pub async fn fetch_one(&self, id: &str) -> Result<E> {
    let id = EntityId::from(id);
    let value = self
      .call(Request::get(E::KIND.get_one_path(&id)), "fetch")
      .await?;
    decode_item::<E>(value)
      .map_err(|e| self.fallback(e, "fetch"))?
      .ok_or_else(|| Error::MalformedResponse(format!("no {} in response", E::KIND.noun())))
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  /// Create an entity. The collection is left as is; the caller decides
  /// whether to [`Self::insert_created`] the result or reload.
  pub async fn create(&self, payload: Payload) -> Result<E> {
    let request = Request::post(E::KIND.create_path(), payload.into_body());
    let value = self.call(request, "create").await?;
    let created = decode_item::<E>(value)
      .map_err(|e| self.fallback(e, "create"))?
      .ok_or_else(|| {
        Error::MalformedResponse(format!("no created {} in response", E::KIND.noun()))
      })?;
    tracing::info!(kind = %E::KIND, id = %created.id(), "created");
    Ok(created)
  }

  /// Update the entity `id`, replacing it in place on success.
  ///
  /// Fails with [`Error::NotFound`] without any network call if `id` is not
  /// in the current collection.
  pub async fn update(&self, id: &str, payload: Payload) -> Result<E> {
    let (existing, marker) = {
      let state = self.state.lock();
      let existing = state
        .collection
        .get(id)
        .cloned()
        .ok_or_else(|| self.not_found(id))?;
      (existing, state.issued)
    };

    let fields = payload.fields().clone();
    let request =
      Request::put(E::KIND.update_path(existing.id()), payload.into_body());
    let value = self.call(request, "update").await?;
    let updated = match decode_item::<E>(value).map_err(|e| self.fallback(e, "update"))? {
      Some(entity) => entity,
      None => merge_fields(&existing, &fields)?,
    };

    let mut state = self.state.lock();
    if state.replaced <= marker {
      state.collection.replace(id, updated.clone());
    } else {
      tracing::debug!(kind = %E::KIND, id, "reload applied meanwhile, skipping local patch");
    }
    tracing::info!(kind = %E::KIND, id, "updated");
    Ok(updated)
  }

  /// Start a delete: validate `id` and return a handle for confirmation.
  /// Nothing is mutated and no request is sent.
  pub fn request_remove(&self, id: &str) -> Result<PendingRemoval<E>> {
    let state = self.state.lock();
    let entity = state
      .collection
      .get(id)
      .cloned()
      .ok_or_else(|| self.not_found(id))?;
    Ok(PendingRemoval { entity })
  }

  /// Finish a delete started with [`Self::request_remove`]. On success the
  /// entity is removed from the collection and returned.
  pub async fn confirm_remove(&self, pending: PendingRemoval<E>) -> Result<E> {
    let id = pending.id().clone();
    let marker = {
      let state = self.state.lock();
      if !state.collection.contains(id.as_str()) {
        return Err(self.not_found(id.as_str()));
      }
      state.issued
    };

    let value = self.call(Request::delete(E::KIND.delete_path(&id)), "delete").await?;
    decode_ack(value).map_err(|e| self.fallback(e, "delete"))?;

    let mut state = self.state.lock();
    if state.replaced <= marker {
      state.collection.remove(id.as_str());
    } else {
      tracing::debug!(kind = %E::KIND, %id, "reload applied meanwhile, skipping local patch");
    }
    tracing::info!(kind = %E::KIND, %id, "deleted");
    Ok(pending.entity)
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  async fn call(&self, request: Request, op: &str) -> Result<serde_json::Value> {
    tracing::debug!(
      kind = %E::KIND,
      method = %request.method,
      path = %request.path,
      multipart = request.is_multipart(),
      "sending"
    );
    self
      .transport
      .send(request)
      .await
      .map_err(|e| self.fallback(e, op))
  }

  fn fallback(&self, error: Error, op: &str) -> Error {
    error.or_fallback(|| format!("failed to {op} {}", E::KIND.noun()))
  }

  fn not_found(&self, id: &str) -> Error {
    Error::NotFound {
      kind: E::KIND,
      id:   id.into(),
    }
  }
}

// ─── Per-resource configurations ─────────────────────────────────────────────

pub type AlbumController<T> = ResourceController<Album, T>;
pub type ManagementController<T> = ResourceController<Member, T>;
pub type NoticeController<T> = ResourceController<Notice, T>;
pub type CategoryController<T> = ResourceController<Category, T>;
