//! Persistence for the access token.
//!
//! The token is the only piece of client state that survives the process:
//! one file under `~/.jointscope`, written on entry and removed on
//! disconnect or explicit exit.

use std::path::{Path, PathBuf};

use fs_err as fs;

use crate::error::{ConsoleError, Result};

const TOKEN_FILE: &str = "token";

#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// The well-known store location, or `None` when no home directory can
    /// be resolved.
    pub fn default_location() -> Option<Self> {
        dirs::home_dir().map(|home| Self::at(home.join(".jointscope").join(TOKEN_FILE)))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored token. Missing or empty files read as `None`;
    /// a stale store never blocks entry.
    pub fn load(&self) -> Option<String> {
        let content = fs::read_to_string(&self.path).ok()?;
        let token = content.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    pub fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| ConsoleError::Io {
                context: format!("creating {}", parent.display()),
                source: err,
            })?;
        }
        fs::write(&self.path, token).map_err(|err| ConsoleError::Io {
            context: format!("writing {}", self.path.display()),
            source: err,
        })
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|err| ConsoleError::Io {
                context: format!("removing {}", self.path.display()),
                source: err,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_token() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = TokenStore::at(dir.path().join("nested").join("token"));

        assert_eq!(store.load(), None);
        store.save("secret-token").expect("save");
        assert_eq!(store.load(), Some("secret-token".to_string()));
    }

    #[test]
    fn clear_removes_the_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = TokenStore::at(dir.path().join("token"));

        store.save("secret").expect("save");
        store.clear().expect("clear");
        assert_eq!(store.load(), None);
        // Clearing an already-empty store is not an error.
        store.clear().expect("clear again");
    }

    #[test]
    fn whitespace_only_store_reads_as_missing() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = TokenStore::at(dir.path().join("token"));
        store.save("  \n").expect("save");
        assert_eq!(store.load(), None);
    }
}
