//! File-backed key-value session storage
//!
//! Mirrors the browser storage the web client relied on: string values
//! under string keys, with the serialized identity under `user` and the API
//! token under `jwt`. Handlers receive the identity explicitly instead of
//! reading ambient state.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::models::SessionIdentity;

const USER_KEY: &str = "user";
const JWT_KEY: &str = "jwt";

/// Key-value persistence for the login session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_map(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read session file: {}", self.path.display()))?;
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        let map = serde_json::from_str(&raw)
            .with_context(|| format!("Malformed session file: {}", self.path.display()))?;
        Ok(map)
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<()> {
        let raw = serde_json::to_string_pretty(map)?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("Cannot write session file: {}", self.path.display()))
    }

    /// Read a raw string value.
    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let map = self.read_map()?;
        Ok(map.get(key).and_then(Value::as_str).map(str::to_string))
    }

    /// Store a raw string value.
    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.read_map()?;
        map.insert(key.to_string(), Value::String(value.to_string()));
        self.write_map(&map)
    }

    pub fn remove_item(&self, key: &str) -> Result<()> {
        let mut map = self.read_map()?;
        map.remove(key);
        self.write_map(&map)
    }

    /// The logged-in identity, if a login has been recorded.
    pub fn current_identity(&self) -> Result<Option<SessionIdentity>> {
        match self.get_item(USER_KEY)? {
            Some(raw) => {
                let identity = serde_json::from_str(&raw)
                    .with_context(|| "Malformed identity in session store")?;
                Ok(Some(identity))
            }
            None => Ok(None),
        }
    }

    /// Persist the identity under the `user` key.
    pub fn set_identity(&self, identity: &SessionIdentity) -> Result<()> {
        self.set_item(USER_KEY, &serde_json::to_string(identity)?)
    }

    /// The API token handed out at login, if any.
    pub fn jwt(&self) -> Result<Option<String>> {
        self.get_item(JWT_KEY)
    }

    pub fn set_jwt(&self, jwt: &str) -> Result<()> {
        self.set_item(JWT_KEY, jwt)
    }
}
