//! `ttc`: command-line admin console for the training-center backend.
//!
//! # Usage
//!
//! ```
//! ttc login --email admin@example.com
//! ttc albums list --filter grad
//! ttc notices create --title "Exam routine" --category 65f0c1 --pdf routine.pdf
//! ttc members delete 65f0d2
//! ```

mod app;
mod render;
mod settings;
mod token_store;

use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use app::{App, ListArgs, prompt_line, read_attachment};
use clap::{Parser, Subcommand};
use settings::Settings;
use token_store::TokenStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use ttc_client::HttpTransport;
use ttc_core::{
  EntityId, Payload, Session,
  entity::{Album, Category, Member, Notice},
  payload::{AlbumDraft, AlbumPatch, MemberDraft, NoticeDraft},
};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "ttc", about = "Admin console for the training-center backend")]
struct Args {
  /// Path to a TOML config file (base_url, timeout_secs, token_path).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the API, e.g. http://localhost:5000/api/v1.
  #[arg(long, env = "TTC_URL")]
  url: Option<String>,

  /// Print results as `{ success, data, message }` JSON.
  #[arg(long, global = true)]
  json: bool,

  /// Log requests to stderr.
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Sign in and remember the token.
  Login {
    #[arg(long)]
    email:    String,
    /// Read from stdin when omitted.
    #[arg(long, env = "TTC_PASSWORD", hide_env_values = true)]
    password: Option<String>,
  },
  /// Forget the stored token.
  Logout,
  /// Show the signed-in account.
  Whoami,
  /// Counts per collection and the latest albums.
  Dashboard,
  Albums {
    #[command(subcommand)]
    action: AlbumAction,
  },
  Members {
    #[command(subcommand)]
    action: MemberAction,
  },
  Notices {
    #[command(subcommand)]
    action: NoticeAction,
  },
  Categories {
    #[command(subcommand)]
    action: CategoryAction,
  },
}

#[derive(Subcommand, Debug)]
enum AlbumAction {
  List(ListArgs),
  Show {
    id: String,
  },
  Create {
    #[arg(long)]
    title:       String,
    #[arg(long)]
    description: String,
    /// Cover image file.
    #[arg(long)]
    cover:       PathBuf,
  },
  Update {
    id:          String,
    #[arg(long)]
    title:       Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Replacement cover image file.
    #[arg(long)]
    cover:       Option<PathBuf>,
  },
  Delete {
    id:  String,
    /// Skip the confirmation prompt.
    #[arg(short, long)]
    yes: bool,
  },
}

#[derive(Subcommand, Debug)]
enum MemberAction {
  List(ListArgs),
  Show {
    id: String,
  },
  Create {
    #[arg(long)]
    name:        String,
    #[arg(long)]
    email:       String,
    #[arg(long)]
    phone:       String,
    #[arg(long)]
    designation: String,
    #[arg(long)]
    office:      String,
    /// Profile photo file.
    #[arg(long)]
    photo:       Option<PathBuf>,
  },
  Update {
    id:          String,
    #[arg(long)]
    name:        Option<String>,
    #[arg(long)]
    email:       Option<String>,
    #[arg(long)]
    phone:       Option<String>,
    #[arg(long)]
    designation: Option<String>,
    #[arg(long)]
    office:      Option<String>,
    #[arg(long)]
    photo:       Option<PathBuf>,
  },
  Delete {
    id:  String,
    #[arg(short, long)]
    yes: bool,
  },
}

#[derive(Subcommand, Debug)]
enum NoticeAction {
  List(ListArgs),
  Show {
    id: String,
  },
  Create {
    #[arg(long)]
    title:       String,
    /// Category id, see `ttc categories list`.
    #[arg(long)]
    category:    String,
    #[arg(long)]
    description: String,
    /// PDF file.
    #[arg(long)]
    pdf:         Option<PathBuf>,
  },
  Update {
    id:          String,
    #[arg(long)]
    title:       Option<String>,
    #[arg(long)]
    category:    Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    pdf:         Option<PathBuf>,
  },
  Delete {
    id:  String,
    #[arg(short, long)]
    yes: bool,
  },
}

#[derive(Subcommand, Debug)]
enum CategoryAction {
  List(ListArgs),
}

/// Page sizes used when `--per-page` is not given.
const PER_PAGE: usize = 10;
const NOTICES_PER_PAGE: usize = 5;

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
  let args = Args::parse();

  let default_level = if args.verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy(),
    )
    .init();

  match run(args).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("error: {e:#}");
      ExitCode::FAILURE
    }
  }
}

async fn run(args: Args) -> Result<()> {
  let config_path = args.config.clone().unwrap_or_else(settings::default_config_path);
  let mut settings = Settings::load(&config_path)?;
  if let Some(url) = args.url.clone() {
    settings.base_url = url;
  }

  let store = TokenStore::new(settings.token_path());
  let stored = store.load()?;
  let session = match &stored {
    Some(token) => Session::with_token(token.clone()),
    None => Session::new(),
  };
  tracing::debug!(base_url = %settings.base_url, signed_in = stored.is_some(), "starting");

  let transport = HttpTransport::new(settings.api(), session)?;
  let app = App::new(transport, args.json);
  let result = dispatch(&app, args.command).await;

  // Login stores a token; logout and rejected tokens clear it.
  let current = app.transport().session().token();
  if current != stored {
    store
      .sync(current.as_deref())
      .with_context(|| format!("updating token file {}", store.path().display()))?;
  }
  result
}

async fn dispatch(app: &App, command: Command) -> Result<()> {
  match command {
    Command::Login { email, password } => {
      let password = match password {
        Some(password) => password,
        None => prompt_line("Password: ")?,
      };
      app.login(&email, &password).await
    }
    Command::Logout => app.logout(),
    Command::Whoami => app.whoami().await,
    Command::Dashboard => app.dashboard().await,
    Command::Albums { action } => albums(app, action).await,
    Command::Members { action } => members(app, action).await,
    Command::Notices { action } => notices(app, action).await,
    Command::Categories {
      action: CategoryAction::List(list),
    } => app.list::<Category>(&list, PER_PAGE).await,
  }
}

async fn albums(app: &App, action: AlbumAction) -> Result<()> {
  match action {
    AlbumAction::List(list) => app.list::<Album>(&list, PER_PAGE).await,
    AlbumAction::Show { id } => app.show::<Album>(&id).await,
    AlbumAction::Create {
      title,
      description,
      cover,
    } => {
      let draft = AlbumDraft {
        title,
        description,
        cover: read_attachment(&cover).await?,
      };
      app.create::<Album>(draft.into()).await
    }
    AlbumAction::Update {
      id,
      title,
      description,
      cover,
    } => {
      let patch = AlbumPatch {
        title,
        description,
        cover: attachment(cover).await?,
      };
      app.update::<Album>(&id, patch.into()).await
    }
    AlbumAction::Delete { id, yes } => app.delete::<Album>(&id, yes).await,
  }
}

async fn members(app: &App, action: MemberAction) -> Result<()> {
  match action {
    MemberAction::List(list) => app.list::<Member>(&list, PER_PAGE).await,
    MemberAction::Show { id } => app.show::<Member>(&id).await,
    MemberAction::Create {
      name,
      email,
      phone,
      designation,
      office,
      photo,
    } => {
      let draft = MemberDraft {
        name,
        email,
        phone_number: phone,
        designation,
        office_name: office,
        photo: attachment(photo).await?,
      };
      app.create::<Member>(draft.into()).await
    }
    MemberAction::Update {
      id,
      name,
      email,
      phone,
      designation,
      office,
      photo,
    } => {
      let payload = Payload::new()
        .maybe("name", name)
        .maybe("email", email)
        .maybe("phoneNumber", phone)
        .maybe("designation", designation)
        .maybe("officeName", office);
      let payload = match attachment(photo).await? {
        Some(photo) => payload.attach(Member::PHOTO_FIELD, photo),
        None => payload,
      };
      app.update::<Member>(&id, payload).await
    }
    MemberAction::Delete { id, yes } => app.delete::<Member>(&id, yes).await,
  }
}

async fn notices(app: &App, action: NoticeAction) -> Result<()> {
  match action {
    NoticeAction::List(list) => app.list::<Notice>(&list, NOTICES_PER_PAGE).await,
    NoticeAction::Show { id } => app.show::<Notice>(&id).await,
    NoticeAction::Create {
      title,
      category,
      description,
      pdf,
    } => {
      let draft = NoticeDraft {
        title,
        category: EntityId::from(category),
        description,
        pdf: attachment(pdf).await?,
      };
      app.create::<Notice>(draft.into()).await
    }
    NoticeAction::Update {
      id,
      title,
      category,
      description,
      pdf,
    } => {
      let payload = Payload::new()
        .maybe("title", title)
        .maybe("category", category)
        .maybe("description", description);
      let payload = match attachment(pdf).await? {
        Some(pdf) => payload.attach(Notice::PDF_FIELD, pdf),
        None => payload,
      };
      app.update::<Notice>(&id, payload).await
    }
    NoticeAction::Delete { id, yes } => app.delete::<Notice>(&id, yes).await,
  }
}

async fn attachment(path: Option<PathBuf>) -> Result<Option<ttc_core::Attachment>> {
  match path {
    Some(path) => read_attachment(&path).await.map(Some),
    None => Ok(None),
  }
}
