//! Persists the session token between invocations.

use std::{
  fs, io,
  path::{Path, PathBuf},
};

use anyhow::Context as _;

#[derive(Debug, Clone)]
pub struct TokenStore {
  path: PathBuf,
}

impl TokenStore {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  pub fn path(&self) -> &Path { &self.path }

  /// The stored token, if any. A missing file is not an error.
  pub fn load(&self) -> anyhow::Result<Option<String>> {
    match fs::read_to_string(&self.path) {
      Ok(raw) => {
        let token = raw.trim();
        Ok((!token.is_empty()).then(|| token.to_owned()))
      }
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e).with_context(|| format!("reading {}", self.path.display())),
    }
  }

  pub fn save(&self, token: &str) -> anyhow::Result<()> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      fs::create_dir_all(parent)
        .with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(&self.path, token)
      .with_context(|| format!("writing {}", self.path.display()))?;
    restrict_permissions(&self.path)
  }

  pub fn remove(&self) -> anyhow::Result<()> {
    match fs::remove_file(&self.path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e).with_context(|| format!("removing {}", self.path.display())),
    }
  }

  /// Bring the file in line with `token`: write it, or delete it when the
  /// session no longer holds one.
  pub fn sync(&self, token: Option<&str>) -> anyhow::Result<()> {
    match token {
      Some(token) => self.save(token),
      None => self.remove(),
    }
  }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> anyhow::Result<()> {
  use std::os::unix::fs::PermissionsExt;
  fs::set_permissions(path, fs::Permissions::from_mode(0o600))
    .with_context(|| format!("restricting {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> anyhow::Result<()> { Ok(()) }
