//! Controller tests against a scripted in-memory transport.
//!
//! Each `send` takes the next scripted response slot. A slot is either filled
//! immediately (`respond`) or held open by the test (`hold`) so that the
//! order in which responses resolve can be chosen explicitly.

use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::oneshot;

use crate::{
  AlbumController, Error, FailureKind, LoadOutcome, NoticeController, Payload,
  Reply, Request, ResourceController, Status, Transport,
  entity::{Album, Record},
  payload::{AlbumDraft, Attachment, NoticeDraft},
  transport::Method,
};

// ─── Scripted transport ──────────────────────────────────────────────────────

#[derive(Default)]
struct ScriptedTransport {
  requests: Mutex<Vec<Request>>,
  slots:    Mutex<VecDeque<oneshot::Receiver<crate::Result<Value>>>>,
}

impl ScriptedTransport {
  /// Reserve the next response slot and return its sender.
  fn hold(&self) -> oneshot::Sender<crate::Result<Value>> {
    let (tx, rx) = oneshot::channel();
    self.slots.lock().push_back(rx);
    tx
  }

  fn respond(&self, response: crate::Result<Value>) {
    let _ = self.hold().send(response);
  }

  fn requests(&self) -> Vec<Request> { self.requests.lock().clone() }

  fn request_count(&self) -> usize { self.requests.lock().len() }
}

impl Transport for ScriptedTransport {
  fn send(
    &self,
    request: Request,
  ) -> impl Future<Output = crate::Result<Value>> + Send + '_ {
    self.requests.lock().push(request);
    let slot = self.slots.lock().pop_front();
    async move {
      match slot {
        Some(rx) => rx
          .await
          .unwrap_or_else(|_| Err(Error::Network("slot dropped".into()))),
        None => Err(Error::Network("no scripted response".into())),
      }
    }
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn albums_json(rows: &[(&str, &str)]) -> Value {
  let data: Vec<Value> = rows
    .iter()
    .map(|(id, title)| json!({ "_id": id, "title": title }))
    .collect();
  json!({ "success": true, "data": data })
}

fn item(id: &str, title: &str) -> Value {
  json!({ "success": true, "data": { "_id": id, "title": title } })
}

fn titles(c: &AlbumController<ScriptedTransport>) -> Vec<(String, String)> {
  c.entities()
    .into_iter()
    .map(|a| (a.id.to_string(), a.title))
    .collect()
}

fn pair(id: &str, title: &str) -> (String, String) { (id.into(), title.into()) }

async fn loaded(rows: &[(&str, &str)]) -> AlbumController<ScriptedTransport> {
  let controller = AlbumController::new(ScriptedTransport::default());
  controller.transport().respond(Ok(albums_json(rows)));
  controller.load().await.unwrap();
  controller
}

/// Yield until the transport has seen `n` requests.
async fn wait_for_requests(t: &ScriptedTransport, n: usize) {
  while t.request_count() < n {
    tokio::task::yield_now().await;
  }
}

fn cover() -> Attachment { Attachment::new("cover.jpg", vec![0xffu8, 0xd8, 0xff]) }

// ─── Load ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn load_replaces_collection_and_sets_ready() {
  let controller = AlbumController::new(ScriptedTransport::default());
  assert_eq!(controller.status(), Status::Idle);

  controller
    .transport()
    .respond(Ok(albums_json(&[("1", "A"), ("2", "B")])));
  let outcome = controller.load().await.unwrap();

  assert_eq!(outcome, LoadOutcome::Applied { count: 2 });
  assert_eq!(controller.status(), Status::Ready);
  assert_eq!(titles(&controller), [pair("1", "A"), pair("2", "B")]);

  let requests = controller.transport().requests();
  assert_eq!(requests[0].method, Method::Get);
  assert_eq!(requests[0].path, "/album/get-allalbums");
}

#[tokio::test]
async fn failed_load_keeps_stale_collection() {
  let controller = loaded(&[("1", "A")]).await;

  controller
    .transport()
    .respond(Err(Error::Network("connection refused".into())));
  let err = controller.load().await.unwrap_err();

  assert_eq!(err.kind(), FailureKind::NetworkFailure);
  assert_eq!(controller.status(), Status::Error);
  assert_eq!(controller.last_error(), Some(err));
  assert_eq!(titles(&controller), [pair("1", "A")]);

  // The controller stays usable.
  controller.transport().respond(Ok(albums_json(&[("2", "B")])));
  controller.load().await.unwrap();
  assert_eq!(controller.status(), Status::Ready);
  assert_eq!(controller.last_error(), None);
}

#[tokio::test]
async fn slow_first_load_cannot_clobber_fast_second_load() {
  let controller =
    Arc::new(AlbumController::new(ScriptedTransport::default()));
  let slow = controller.transport().hold();
  let fast = controller.transport().hold();

  let first = tokio::spawn({
    let c = controller.clone();
    async move { c.load().await }
  });
  wait_for_requests(controller.transport(), 1).await;
  let second = tokio::spawn({
    let c = controller.clone();
    async move { c.load().await }
  });
  wait_for_requests(controller.transport(), 2).await;

  fast.send(Ok(albums_json(&[("b", "B")]))).unwrap();
  assert_eq!(
    second.await.unwrap().unwrap(),
    LoadOutcome::Applied { count: 1 }
  );
  assert_eq!(controller.status(), Status::Ready);

  slow.send(Ok(albums_json(&[("a", "A")]))).unwrap();
  assert_eq!(first.await.unwrap().unwrap(), LoadOutcome::Superseded);

  assert_eq!(titles(&controller), [pair("b", "B")]);
  assert_eq!(controller.status(), Status::Ready);
}

#[tokio::test]
async fn older_load_applies_while_newer_is_still_pending() {
  let controller =
    Arc::new(AlbumController::new(ScriptedTransport::default()));
  let first_slot = controller.transport().hold();
  let second_slot = controller.transport().hold();

  let first = tokio::spawn({
    let c = controller.clone();
    async move { c.load().await }
  });
  wait_for_requests(controller.transport(), 1).await;
  let second = tokio::spawn({
    let c = controller.clone();
    async move { c.load().await }
  });
  wait_for_requests(controller.transport(), 2).await;

  first_slot.send(Ok(albums_json(&[("a", "A")]))).unwrap();
  first.await.unwrap().unwrap();
  assert_eq!(titles(&controller), [pair("a", "A")]);
  assert_eq!(controller.status(), Status::Loading);

  second_slot.send(Ok(albums_json(&[("b", "B")]))).unwrap();
  second.await.unwrap().unwrap();
  assert_eq!(titles(&controller), [pair("b", "B")]);
  assert_eq!(controller.status(), Status::Ready);
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_without_attachment_sends_json() {
  let controller = NoticeController::new(ScriptedTransport::default());
  controller.transport().respond(Ok(json!({
    "success": true,
    "data": { "_id": "n1", "title": "Holiday", "category": "c1" }
  })));

  let draft = NoticeDraft {
    title:       "Holiday".into(),
    category:    "c1".into(),
    description: "Closed on Friday".into(),
    pdf:         None,
  };
  let created = controller.create(draft.into()).await.unwrap();

  assert_eq!(created.id.as_str(), "n1");
  let request = &controller.transport().requests()[0];
  assert_eq!(request.method, Method::Post);
  assert_eq!(request.path, "/notice/create");
  assert!(!request.is_multipart());
}

#[tokio::test]
async fn create_with_attachment_always_sends_multipart() {
  let controller = AlbumController::new(ScriptedTransport::default());
  controller.transport().respond(Ok(item("a9", "Sports day")));

  let draft = AlbumDraft {
    title:       "Sports day".into(),
    description: "2024".into(),
    cover:       cover(),
  };
  controller.create(draft.into()).await.unwrap();

  assert!(controller.transport().requests()[0].is_multipart());
}

#[tokio::test]
async fn create_does_not_touch_collection() {
  let controller = loaded(&[("1", "A")]).await;
  controller.transport().respond(Ok(item("2", "B")));

  let created = controller
    .create(Payload::new().field("title", "B"))
    .await
    .unwrap();
  assert_eq!(titles(&controller), [pair("1", "A")]);

  controller.insert_created(created);
  assert_eq!(titles(&controller), [pair("1", "A"), pair("2", "B")]);
}

#[tokio::test]
async fn create_failure_passes_backend_message_through() {
  let controller = loaded(&[("1", "A")]).await;
  controller.transport().respond(Err(Error::Rejected {
    status:  Some(400),
    message: "Cover image is required".into(),
  }));

  let err = controller
    .create(Payload::new().field("title", "B"))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), FailureKind::RejectedByServer);
  assert_eq!(err.message(), "Cover image is required");
  assert_eq!(titles(&controller), [pair("1", "A")]);
}

#[tokio::test]
async fn create_failure_without_message_uses_fallback() {
  let controller = AlbumController::new(ScriptedTransport::default());
  controller
    .transport()
    .respond(Ok(json!({ "success": false })));

  let err = controller
    .create(Payload::new().field("title", "B"))
    .await
    .unwrap_err();
  assert_eq!(err.message(), "failed to create album");
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_unknown_id_fails_locally_without_network() {
  let controller = loaded(&[("1", "A")]).await;
  let before = controller.transport().request_count();

  let err = controller
    .update("id-404", Payload::new().field("title", "x"))
    .await
    .unwrap_err();

  assert_eq!(err.kind(), FailureKind::LocalValidation);
  assert!(matches!(err, Error::NotFound { .. }));
  assert_eq!(controller.transport().request_count(), before);
}

#[tokio::test]
async fn update_replaces_in_place() {
  let controller = loaded(&[("1", "A"), ("2", "B"), ("3", "C")]).await;
  controller.transport().respond(Ok(item("2", "B2")));

  let updated = controller
    .update("2", Payload::new().field("title", "B2"))
    .await
    .unwrap();

  assert_eq!(updated.title, "B2");
  assert_eq!(
    titles(&controller),
    [pair("1", "A"), pair("2", "B2"), pair("3", "C")]
  );
  let request = controller.transport().requests().pop().unwrap();
  assert_eq!(request.method, Method::Put);
  assert_eq!(request.path, "/album/update/2");
}

#[tokio::test]
async fn update_without_echo_merges_payload() {
  let controller = loaded(&[("1", "A")]).await;
  controller
    .transport()
    .respond(Ok(json!({ "success": true, "message": "Album updated" })));

  let updated = controller
    .update("1", Payload::new().field("description", "new text"))
    .await
    .unwrap();

  assert_eq!(updated.title, "A");
  assert_eq!(updated.description.as_deref(), Some("new text"));
  assert_eq!(controller.get("1"), Some(updated));
}

#[tokio::test]
async fn update_failure_leaves_collection_unchanged() {
  let controller = loaded(&[("1", "A")]).await;
  controller.transport().respond(Err(Error::Rejected {
    status:  Some(500),
    message: String::new(),
  }));

  let err = controller
    .update("1", Payload::new().field("title", "x"))
    .await
    .unwrap_err();

  assert_eq!(err.message(), "failed to update album");
  assert_eq!(titles(&controller), [pair("1", "A")]);
  assert_eq!(controller.status(), Status::Ready);
}

// ─── Remove ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn request_remove_mutates_nothing() {
  let controller = loaded(&[("1", "A"), ("2", "B")]).await;
  let before = controller.transport().request_count();

  let pending = controller.request_remove("1").unwrap();
  assert_eq!(pending.title(), "A");
  assert_eq!(controller.transport().request_count(), before);
  assert_eq!(controller.entities().len(), 2);
  drop(pending);
}

#[tokio::test]
async fn remove_twice_second_fails_locally() {
  let controller = loaded(&[("1", "A"), ("2", "B")]).await;
  controller.transport().respond(Ok(json!({ "success": true })));

  let pending = controller.request_remove("1").unwrap();
  let removed = controller.confirm_remove(pending).await.unwrap();
  assert_eq!(removed.title, "A");
  assert_eq!(titles(&controller), [pair("2", "B")]);
  assert_eq!(
    controller.transport().requests().last().unwrap().path,
    "/album/delete/1"
  );

  let err = controller.request_remove("1").unwrap_err();
  assert_eq!(err.kind(), FailureKind::LocalValidation);
  assert_eq!(titles(&controller), [pair("2", "B")]);
}

#[tokio::test]
async fn confirm_after_reload_dropped_the_entity_fails_locally() {
  let controller = loaded(&[("1", "A")]).await;
  let pending = controller.request_remove("1").unwrap();

  controller.transport().respond(Ok(albums_json(&[("2", "B")])));
  controller.load().await.unwrap();
  let before = controller.transport().request_count();

  let err = controller.confirm_remove(pending).await.unwrap_err();
  assert!(matches!(err, Error::NotFound { .. }));
  assert_eq!(controller.transport().request_count(), before);
}

#[tokio::test]
async fn remove_failure_leaves_collection_unchanged() {
  let controller = loaded(&[("1", "A")]).await;
  controller.transport().respond(Err(Error::Rejected {
    status:  Some(403),
    message: "Not allowed".into(),
  }));

  let pending = controller.request_remove("1").unwrap();
  let err = controller.confirm_remove(pending).await.unwrap_err();

  assert_eq!(err.message(), "Not allowed");
  assert_eq!(titles(&controller), [pair("1", "A")]);
}

#[tokio::test]
async fn reload_issued_during_slow_delete_wins() {
  let controller = Arc::new(loaded(&[("1", "A"), ("2", "B")]).await);
  let delete_slot = controller.transport().hold();
  let load_slot = controller.transport().hold();
  let base = controller.transport().request_count();

  let pending = controller.request_remove("1").unwrap();
  let remove = tokio::spawn({
    let c = controller.clone();
    async move { c.confirm_remove(pending).await }
  });
  wait_for_requests(controller.transport(), base + 1).await;
  let reload = tokio::spawn({
    let c = controller.clone();
    async move { c.load().await }
  });
  wait_for_requests(controller.transport(), base + 2).await;

  // The reload was served before the delete committed server-side.
  load_slot
    .send(Ok(albums_json(&[("1", "A"), ("2", "B"), ("3", "C")])))
    .unwrap();
  reload.await.unwrap().unwrap();

  delete_slot.send(Ok(json!({ "success": true }))).unwrap();
  remove.await.unwrap().unwrap();

  assert_eq!(
    titles(&controller),
    [pair("1", "A"), pair("2", "B"), pair("3", "C")]
  );
}

#[tokio::test]
async fn failed_reload_during_slow_delete_keeps_the_delete() {
  let controller = Arc::new(loaded(&[("1", "A"), ("2", "B")]).await);
  let delete_slot = controller.transport().hold();
  let load_slot = controller.transport().hold();
  let base = controller.transport().request_count();

  let pending = controller.request_remove("1").unwrap();
  let remove = tokio::spawn({
    let c = controller.clone();
    async move { c.confirm_remove(pending).await }
  });
  wait_for_requests(controller.transport(), base + 1).await;
  let reload = tokio::spawn({
    let c = controller.clone();
    async move { c.load().await }
  });
  wait_for_requests(controller.transport(), base + 2).await;

  load_slot
    .send(Err(Error::Network("connection reset".into())))
    .unwrap();
  assert!(reload.await.unwrap().is_err());

  delete_slot.send(Ok(json!({ "success": true }))).unwrap();
  remove.await.unwrap().unwrap();

  assert_eq!(titles(&controller), [pair("2", "B")]);
  assert_eq!(controller.status(), Status::Error);
}

#[tokio::test]
async fn update_lands_while_reload_is_in_flight_then_reload_wins() {
  let controller = Arc::new(loaded(&[("1", "A")]).await);
  let update_slot = controller.transport().hold();
  let load_slot = controller.transport().hold();
  let base = controller.transport().request_count();

  let update = tokio::spawn({
    let c = controller.clone();
    async move { c.update("1", Payload::new().field("title", "A2")).await }
  });
  wait_for_requests(controller.transport(), base + 1).await;
  let reload = tokio::spawn({
    let c = controller.clone();
    async move { c.load().await }
  });
  wait_for_requests(controller.transport(), base + 2).await;

  update_slot.send(Ok(item("1", "A2"))).unwrap();
  update.await.unwrap().unwrap();
  assert_eq!(titles(&controller), [pair("1", "A2")]);

  load_slot
    .send(Ok(albums_json(&[("1", "A3"), ("2", "B")])))
    .unwrap();
  reload.await.unwrap().unwrap();
  assert_eq!(titles(&controller), [pair("1", "A3"), pair("2", "B")]);
}

#[tokio::test]
async fn failed_mutation_does_not_block_the_next_one() {
  let controller = loaded(&[("1", "A"), ("2", "B")]).await;
  controller
    .transport()
    .respond(Err(Error::Network("timed out".into())));
  controller.transport().respond(Ok(Value::Null));

  let first = controller.request_remove("1").unwrap();
  assert!(controller.confirm_remove(first).await.is_err());

  let second = controller.request_remove("1").unwrap();
  controller.confirm_remove(second).await.unwrap();
  assert_eq!(titles(&controller), [pair("2", "B")]);
}

// ─── Round trip ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_update_reload_round_trip() {
  let controller = loaded(&[("1", "A")]).await;

  controller.transport().respond(Ok(item("e1", "Draft")));
  let created = controller
    .create(Payload::new().field("title", "Draft"))
    .await
    .unwrap();
  controller.insert_created(created.clone());

  controller.transport().respond(Ok(item("e1", "x")));
  controller
    .update(created.id().as_str(), Payload::new().field("title", "x"))
    .await
    .unwrap();

  controller
    .transport()
    .respond(Ok(albums_json(&[("1", "A"), ("e1", "x")])));
  controller.load().await.unwrap();

  let matching: Vec<Album> = controller
    .entities()
    .into_iter()
    .filter(|a| a.id == created.id)
    .collect();
  assert_eq!(matching.len(), 1);
  assert_eq!(matching[0].title, "x");
}

// ─── Fetch one / reply ───────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_one_uses_single_item_route() {
  let controller: ResourceController<Album, _> =
    ResourceController::new(ScriptedTransport::default());
  controller.transport().respond(Ok(item("a1", "Prefill")));

  let album = controller.fetch_one("a1").await.unwrap();
  assert_eq!(album.title, "Prefill");
  assert_eq!(
    controller.transport().requests()[0].path,
    "/album/get-single-album/a1"
  );
  assert!(controller.entities().is_empty());
}

#[test]
fn reply_carries_kind_and_message() {
  let failure: Reply<()> = Reply::from(Err(Error::NotFound {
    kind: crate::ResourceKind::Album,
    id:   "9".into(),
  }));
  let rendered = serde_json::to_value(&failure).unwrap();
  assert_eq!(
    rendered,
    json!({
      "success": false,
      "kind": "local_validation",
      "message": "album 9 is not in the current collection"
    })
  );

  let success: Reply<u8> = Reply::from(Ok(3));
  assert_eq!(
    serde_json::to_value(&success).unwrap(),
    json!({ "success": true, "data": 3 })
  );
}
