use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SERVER: &str = "http://localhost:3000";

/// Persisted CLI session: which server to talk to and the bearer token
/// from the last login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub server: String,
    pub token: Option<String>,
    pub email: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            token: None,
            email: None,
        }
    }
}

impl Session {
    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }
}

/// Session file location: `$WORKBENCH_CONFIG_DIR/session.json`, falling
/// back to `~/.config/workbench/session.json`.
pub fn session_path() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("WORKBENCH_CONFIG_DIR") {
        return Ok(PathBuf::from(dir).join("session.json"));
    }

    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".config").join("workbench").join("session.json"))
}

pub fn load() -> Result<Session> {
    load_from(&session_path()?)
}

pub fn save(session: &Session) -> Result<()> {
    save_to(&session_path()?, session)
}

pub fn clear() -> Result<()> {
    let path = session_path()?;
    if path.exists() {
        fs::remove_file(&path).with_context(|| format!("failed to remove {}", path.display()))?;
    }
    Ok(())
}

fn load_from(path: &Path) -> Result<Session> {
    if !path.exists() {
        return Ok(Session::default());
    }

    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("invalid session file {}", path.display()))
}

fn save_to(path: &Path, session: &Session) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let contents = serde_json::to_string_pretty(session)?;
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
