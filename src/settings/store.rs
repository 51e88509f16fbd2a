use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

use super::codec;
use crate::engine::EngineState;

/// SQLite-backed store for converter settings, keyed by profile name.
/// Database lives at `~/.caseconvert/caseconvert.db`.
///
/// Rules are kept in their flat bracketed encoding, so a profile's `rules`
/// column can be copied to or from a settings file verbatim.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the store at the default location.
    pub fn open_default() -> Result<Self> {
        let db_path = default_db_path()?;
        Self::open(&db_path)
    }

    /// Open (or create) the store at a specific path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS profiles (
                name        TEXT PRIMARY KEY,
                capitalize  INTEGER NOT NULL DEFAULT 0,
                rules       TEXT NOT NULL DEFAULT '',
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )
        .context("Failed to initialize database schema")?;

        tracing::debug!("Opened settings store at {}", path.display());
        Ok(Self { conn })
    }

    /// Load a profile's settings. Returns `None` if the profile was never saved.
    pub fn load(&self, profile: &str) -> Result<Option<EngineState>> {
        let mut stmt = self
            .conn
            .prepare("SELECT capitalize, rules FROM profiles WHERE name = ?1")?;

        let result = stmt.query_row([profile], |row| {
            let capitalize: bool = row.get(0)?;
            let rules: String = row.get(1)?;
            Ok((capitalize, rules))
        });

        match result {
            Ok((capitalize, rules)) => Ok(Some(EngineState::new(
                capitalize,
                codec::decode_rules(&rules),
            ))),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e).context("Failed to query profile"),
        }
    }

    /// Load a profile, falling back to default settings.
    pub fn load_or_default(&self, profile: &str) -> Result<EngineState> {
        Ok(self.load(profile)?.unwrap_or_default())
    }

    /// Save (upsert) a profile's settings.
    pub fn save(&self, profile: &str, state: &EngineState) -> Result<()> {
        let rules = codec::encode_rules(state.rules.get_rules());

        self.conn
            .execute(
                "INSERT INTO profiles (name, capitalize, rules, created_at, updated_at)
                 VALUES (?1, ?2, ?3, datetime('now'), datetime('now'))
                 ON CONFLICT(name) DO UPDATE SET
                     capitalize = excluded.capitalize,
                     rules      = excluded.rules,
                     updated_at = datetime('now')",
                rusqlite::params![profile, state.capitalize, rules],
            )
            .context("Failed to save profile")?;

        tracing::info!("Saved profile '{}' ({} rules)", profile, state.rules.len());
        Ok(())
    }

    /// List all stored profiles, most recently updated first.
    pub fn list(&self) -> Result<Vec<ProfileInfo>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, capitalize, rules, updated_at FROM profiles ORDER BY updated_at DESC, name",
        )?;

        let rows = stmt
            .query_map([], |row| {
                let rules: String = row.get(2)?;
                Ok(ProfileInfo {
                    name: row.get(0)?,
                    capitalize: row.get(1)?,
                    rule_count: codec::decode_rules(&rules).len(),
                    updated_at: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Replace a profile's rules with those encoded in a file.
    /// Invalid records are skipped; the profile's capitalize flag is kept.
    pub fn import_from_file(&self, profile: &str, file_path: &str) -> Result<EngineState> {
        let content = std::fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read rules from {file_path}"))?;
        let mut state = self.load_or_default(profile)?;
        state.rules = codec::decode_rules(&content);
        self.save(profile, &state)?;
        Ok(state)
    }

    /// Write a profile's rules to a file in the bracketed encoding.
    pub fn export_to_file(&self, profile: &str, file_path: &str) -> Result<()> {
        let state = self
            .load(profile)?
            .with_context(|| format!("No settings found for profile: {profile}"))?;
        std::fs::write(file_path, codec::encode_rules(state.rules.get_rules()))
            .with_context(|| format!("Failed to write file: {file_path}"))?;
        Ok(())
    }
}

/// Metadata about a stored profile.
#[derive(Debug, Clone)]
pub struct ProfileInfo {
    pub name: String,
    pub capitalize: bool,
    pub rule_count: usize,
    pub updated_at: String,
}

/// Returns the default database path: `~/.caseconvert/caseconvert.db`
fn default_db_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".caseconvert").join("caseconvert.db"))
}
