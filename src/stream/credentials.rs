//! File-backed API token storage.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// File name of the market-data token inside the secrets directory.
pub const TOKEN_FILE_NAME: &str = "PIO.apitoken";

/// Prompt shown when no token is stored.
pub const TOKEN_PROMPT: &str = "Polygon.IO (PIO) personal API token: ";

/// Reads and writes the token file.
#[derive(Debug, Clone)]
pub struct TokenStore {
    dir: PathBuf,
}

impl TokenStore {
    /// Store rooted at `secrets_dir`.
    pub fn new(secrets_dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: secrets_dir.into(),
        }
    }

    /// Path of the token file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE_NAME)
    }

    /// The stored token, if present and non-empty.
    pub fn load(&self) -> Result<Option<String>> {
        let path = self.path();
        match fs::read_to_string(&path) {
            Ok(text) => {
                let token = text.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io("reading API token", path, e)),
        }
    }

    /// Persist `token`, readable by the owner only.
    pub fn save(&self, token: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| Error::DirectoryCreation {
            path: self.dir.clone(),
            source: e,
        })?;
        let path = self.path();
        fs::write(&path, format!("{}\n", token.trim()))
            .map_err(|e| Error::io("writing API token", &path, e))?;
        restrict_permissions(&path)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .map_err(|e| Error::io("restricting API token permissions", path, e))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
