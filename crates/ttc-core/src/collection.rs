//! The in-memory collection for one resource kind.
//!
//! A collection is either replaced wholesale (after a fetch) or patched by
//! exactly one entity at a time (after a create, update or delete).
//! Identifiers are unique at all times.

use std::{cmp::Reverse, collections::HashSet};

use crate::entity::{EntityId, Record};

#[derive(Debug, Clone)]
pub struct Collection<E> {
  items: Vec<E>,
}

impl<E> Default for Collection<E> {
  fn default() -> Self { Self { items: Vec::new() } }
}

/// One page of a collection, numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page<'a, E> {
  pub items:       &'a [E],
  pub number:      usize,
  pub total_pages: usize,
}

impl<E: Record> Collection<E> {
  pub fn new() -> Self { Self::default() }

  pub fn from_vec(items: Vec<E>) -> Self {
    let mut collection = Self::new();
    collection.replace_all(items);
    collection
  }

  // ── Whole-collection replacement ──────────────────────────────────────────

  /// Replace every entity with `items`, in backend order. Later duplicates of
  /// an identifier are dropped.
  pub fn replace_all(&mut self, items: Vec<E>) {
    let mut seen = HashSet::with_capacity(items.len());
    let before = items.len();
    self.items = items
      .into_iter()
      .filter(|e| seen.insert(e.id().clone()))
      .collect();
    if self.items.len() != before {
      tracing::warn!(
        kind = %E::KIND,
        dropped = before - self.items.len(),
        "list response contained duplicate ids"
      );
    }
  }

  // ── Single-entity patches ─────────────────────────────────────────────────

  /// Swap the entity with identifier `id` for `entity`, keeping its position.
  /// Returns `false` if `id` is absent.
  pub fn replace(&mut self, id: &str, entity: E) -> bool {
    match self.position(id) {
      Some(index) => {
        self.items[index] = entity;
        true
      }
      None => false,
    }
  }

  pub fn remove(&mut self, id: &str) -> Option<E> {
    self.position(id).map(|index| self.items.remove(index))
  }

  /// Append a freshly created entity, or replace the entity that already
  /// carries its identifier.
  pub fn insert_created(&mut self, entity: E) {
    match self.position(entity.id().as_str()) {
      Some(index) => self.items[index] = entity,
      None => self.items.push(entity),
    }
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  pub fn get(&self, id: &str) -> Option<&E> {
    self.items.iter().find(|e| e.id().as_str() == id)
  }

  pub fn contains(&self, id: &str) -> bool { self.position(id).is_some() }

  pub fn position(&self, id: &str) -> Option<usize> {
    self.items.iter().position(|e| e.id().as_str() == id)
  }

  pub fn ids(&self) -> Vec<EntityId> {
    self.items.iter().map(|e| e.id().clone()).collect()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, E> { self.items.iter() }

  pub fn as_slice(&self) -> &[E] { &self.items }

  pub fn len(&self) -> usize { self.items.len() }

  pub fn is_empty(&self) -> bool { self.items.is_empty() }

  // ── Views ─────────────────────────────────────────────────────────────────

  /// The `n` newest entities by creation time. Entities without a timestamp
  /// sort last; ties keep backend order.
  pub fn most_recent(&self, n: usize) -> Vec<&E> {
    let mut sorted: Vec<&E> = self.items.iter().collect();
    sorted.sort_by_key(|e| Reverse(e.created_at()));
    sorted.truncate(n);
    sorted
  }

  /// Page `number` (1-based) of `per_page` entities. Out-of-range pages are
  /// empty.
  pub fn page(&self, number: usize, per_page: usize) -> Page<'_, E> {
    let per_page = per_page.max(1);
    let number = number.max(1);
    let total_pages = self.items.len().div_ceil(per_page);
    let len = self.items.len();
    let start = (number - 1).saturating_mul(per_page).min(len);
    let end = start.saturating_add(per_page).min(len);
    Page {
      items: &self.items[start..end],
      number,
      total_pages,
    }
  }
}

impl<'a, E> IntoIterator for &'a Collection<E> {
  type Item = &'a E;
  type IntoIter = std::slice::Iter<'a, E>;

  fn into_iter(self) -> Self::IntoIter { self.items.iter() }
}
