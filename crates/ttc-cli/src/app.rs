//! Command handlers. Each handler drives one controller operation and prints
//! the outcome, either as text or as a `{ success, data, message }` reply.

use std::{
  io::{self, BufRead, Write},
  path::Path,
};

use anyhow::{Context as _, anyhow, bail};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use serde::Serialize;
use ttc_client::HttpTransport;
use ttc_core::{
  Attachment, Collection, Payload, Record, Reply, ResourceController,
  entity::{Album, Member, Notice},
};

use crate::render::{self, Render};

// ─── List options ─────────────────────────────────────────────────────────────

#[derive(clap::Args, Debug, Clone, Default)]
pub struct ListArgs {
  /// Fuzzy filter on title and id.
  #[arg(short, long)]
  pub filter:   Option<String>,
  /// Page to show, starting at 1.
  #[arg(long, default_value_t = 1)]
  pub page:     usize,
  /// Entries per page.
  #[arg(long)]
  pub per_page: Option<usize>,
}

// ─── App ──────────────────────────────────────────────────────────────────────

pub struct App {
  transport: HttpTransport,
  json:      bool,
}

impl App {
  pub fn new(transport: HttpTransport, json: bool) -> Self { Self { transport, json } }

  pub fn transport(&self) -> &HttpTransport { &self.transport }

  fn controller<E: Record>(&self) -> ResourceController<E, HttpTransport> {
    ResourceController::new(self.transport.clone())
  }

  // ── Session ─────────────────────────────────────────────────────────────────

  pub async fn login(&self, email: &str, password: &str) -> anyhow::Result<()> {
    let result = self.transport.login(email, password).await.map(|_| ());
    self.finish(result, |()| println!("Signed in as {email}"))
  }

  pub fn logout(&self) -> anyhow::Result<()> {
    let dropped = self.transport.logout();
    self.finish(Ok(dropped), |&dropped| {
      println!("{}", if dropped { "Signed out" } else { "Not signed in" })
    })
  }

  pub async fn whoami(&self) -> anyhow::Result<()> {
    let result = self.transport.me().await;
    self.finish(result, |profile| {
      println!("{}", profile.display_name());
      println!("  Email: {}", profile.email);
      if let Some(role) = &profile.role {
        println!("  Role: {role}");
      }
    })
  }

  // ── Dashboard ───────────────────────────────────────────────────────────────

  pub async fn dashboard(&self) -> anyhow::Result<()> {
    let albums = self.controller::<Album>();
    let members = self.controller::<Member>();
    let notices = self.controller::<Notice>();

    let (a, m, n) = tokio::join!(albums.load(), members.load(), notices.load());
    let summary = Dashboard {
      albums:        count(&a, albums.read(Collection::len)),
      members:       count(&m, members.read(Collection::len)),
      notices:       count(&n, notices.read(Collection::len)),
      recent_albums: albums.read(|c| c.most_recent(3).into_iter().cloned().collect()),
    };
    let failures: Vec<String> = [a.err(), m.err(), n.err()]
      .into_iter()
      .flatten()
      .map(|e| e.message())
      .collect();

    if self.json {
      print_json(&Reply {
        success: failures.is_empty(),
        data:    Some(&summary),
        kind:    None,
        message: (!failures.is_empty()).then(|| failures.join("; ")),
      })?;
    } else {
      println!("Albums:   {}", show_count(summary.albums));
      println!("Members:  {}", show_count(summary.members));
      println!("Notices:  {}", show_count(summary.notices));
      println!();
      println!("Recent albums");
      if summary.recent_albums.is_empty() {
        println!("  (none)");
      }
      for album in &summary.recent_albums {
        println!("  {}", render::row(album));
      }
    }

    match failures.is_empty() {
      true => Ok(()),
      false => Err(anyhow!(failures.join("; "))),
    }
  }

  // ── Generic resource commands ───────────────────────────────────────────────

  pub async fn list<E: Render>(
    &self,
    args: &ListArgs,
    default_per_page: usize,
  ) -> anyhow::Result<()> {
    let controller = self.controller::<E>();
    let result = controller.load().await.map(|_| {
      controller.read(|collection| {
        let matches = filter(collection.as_slice(), args.filter.as_deref());
        let filtered = Collection::from_vec(matches.into_iter().cloned().collect());
        let page = filtered.page(args.page, args.per_page.unwrap_or(default_per_page));
        (page.items.to_vec(), render::page_footer(&page, filtered.len()))
      })
    });

    if self.json {
      return self.finish(result.map(|(items, _)| items), |_| ());
    }
    let (items, footer) = result?;
    if items.is_empty() {
      println!("No {}s found.", E::KIND.noun());
    }
    for entity in &items {
      println!("{}", render::row(entity));
    }
    println!("{footer}");
    Ok(())
  }

  pub async fn show<E: Render>(&self, id: &str) -> anyhow::Result<()> {
    let result = self.controller::<E>().fetch_one(id).await;
    self.finish(result, |entity| print!("{}", render::detail(entity)))
  }

  pub async fn create<E: Render>(&self, payload: Payload) -> anyhow::Result<()> {
    let result = self.controller::<E>().create(payload).await;
    self.finish(result, |entity| {
      println!(
        "Created {} \"{}\" ({})",
        E::KIND.noun(),
        entity.title(),
        entity.id()
      )
    })
  }

  /// Update `id`. The collection is loaded first so an unknown id is
  /// rejected before anything is sent.
  pub async fn update<E: Render>(&self, id: &str, payload: Payload) -> anyhow::Result<()> {
    if payload.fields().is_empty() && !payload.is_multipart() {
      bail!("nothing to update; pass at least one field");
    }
    let controller = self.controller::<E>();
    let result = match controller.load().await {
      Ok(_) => controller.update(id, payload).await,
      Err(e) => Err(e),
    };
    self.finish(result, |entity| {
      println!("Updated {} \"{}\"", E::KIND.noun(), entity.title())
    })
  }

  /// Delete `id` after confirmation, unless `yes` is set.
  pub async fn delete<E: Render>(&self, id: &str, yes: bool) -> anyhow::Result<()> {
    let controller = self.controller::<E>();
    let pending = match controller.load().await {
      Ok(_) => controller.request_remove(id),
      Err(e) => Err(e),
    };
    let pending = match pending {
      Ok(pending) => pending,
      Err(e) => return self.finish::<E>(Err(e), |_| ()),
    };

    let prompt = format!("Delete {} \"{}\"? [y/N] ", E::KIND.noun(), pending.title());
    if !yes && !confirm(&prompt)? {
      eprintln!("Cancelled.");
      return Ok(());
    }

    let result = controller.confirm_remove(pending).await;
    self.finish(result, |entity| {
      println!("Deleted {} \"{}\"", E::KIND.noun(), entity.title())
    })
  }

  // ── Output ──────────────────────────────────────────────────────────────────

  /// Print `result` and turn a failure into the process error.
  fn finish<T: Serialize>(
    &self,
    result: ttc_core::Result<T>,
    human: impl FnOnce(&T),
  ) -> anyhow::Result<()> {
    if self.json {
      let failure = result.as_ref().err().map(|e| e.message());
      print_json(&Reply::from(result))?;
      return match failure {
        Some(message) => Err(anyhow!(message)),
        None => Ok(()),
      };
    }
    let value = result?;
    human(&value);
    Ok(())
  }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Dashboard {
  albums:        Option<usize>,
  members:       Option<usize>,
  notices:       Option<usize>,
  recent_albums: Vec<Album>,
}

/// The collection size, or `None` if its load failed.
fn count<T>(result: &ttc_core::Result<T>, len: usize) -> Option<usize> {
  result.is_ok().then_some(len)
}

fn show_count(count: Option<usize>) -> String {
  count.map_or_else(|| "unavailable".into(), |n| n.to_string())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
  let text = serde_json::to_string_pretty(value).context("serialising output")?;
  println!("{text}");
  Ok(())
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Entities whose title or id fuzzy-match `query`, in collection order. An
/// empty query matches everything.
pub fn filter<'a, E: Record>(items: &'a [E], query: Option<&str>) -> Vec<&'a E> {
  let query = query.map(str::trim).unwrap_or_default();
  if query.is_empty() {
    return items.iter().collect();
  }
  let matcher = SkimMatcherV2::default();
  items
    .iter()
    .filter(|e| {
      matcher.fuzzy_match(e.title(), query).is_some()
        || matcher.fuzzy_match(e.id().as_str(), query).is_some()
    })
    .collect()
}

/// Read a file from disk as an upload, naming it after the path.
pub async fn read_attachment(path: &Path) -> anyhow::Result<Attachment> {
  let data = tokio::fs::read(path)
    .await
    .with_context(|| format!("reading {}", path.display()))?;
  let file_name = path
    .file_name()
    .and_then(|n| n.to_str())
    .ok_or_else(|| anyhow!("{} has no usable file name", path.display()))?;
  Ok(Attachment::new(file_name, data))
}

/// Ask a yes/no question on stderr; only `y`/`yes` confirms.
fn confirm(prompt: &str) -> anyhow::Result<bool> {
  tokio::task::block_in_place(|| {
    let mut stderr = io::stderr();
    write!(stderr, "{prompt}")?;
    stderr.flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
  })
}

fn is_yes(answer: &str) -> bool {
  matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Prompt for a line on stderr, e.g. a password not given on the command line.
pub fn prompt_line(prompt: &str) -> anyhow::Result<String> {
  tokio::task::block_in_place(|| {
    let mut stderr = io::stderr();
    write!(stderr, "{prompt}")?;
    stderr.flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
  })
}
