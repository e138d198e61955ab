//! Victory ranking.
//!
//! Players reach the ranking through [`PlayerIdentity`], which carries only the
//! two fields the game reads from an account: a stable id and a display name.

use crate::normalize::normalize_word;
use crate::store::{app_data_dir, read_json, write_json_atomic};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

const RANKING_FILE: &str = "ranking.json";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub id: String,
    pub display_name: String,
}

impl PlayerIdentity {
    /// Identity for a locally typed player name. `None` for a blank name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let display_name = name.trim();
        if display_name.is_empty() {
            return None;
        }
        Some(Self {
            id: normalize_word(display_name),
            display_name: display_name.to_string(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub player_id: String,
    pub display_name: String,
    pub victories: u32,
    pub last_victory: Option<DateTime<Utc>>,
}

pub trait RankingStore {
    /// Adds one victory for `player` and returns the new total.
    fn record_victory(&mut self, player: &PlayerIdentity) -> io::Result<u32>;
    /// Up to `limit` entries, most victories first.
    fn top(&self, limit: usize) -> io::Result<Vec<RankingEntry>>;
}

type Entries = BTreeMap<String, RankingEntry>;

fn bump(entries: &mut Entries, player: &PlayerIdentity) -> u32 {
    let entry = entries
        .entry(player.id.clone())
        .or_insert_with(|| RankingEntry {
            player_id: player.id.clone(),
            display_name: player.display_name.clone(),
            victories: 0,
            last_victory: None,
        });
    entry.display_name.clone_from(&player.display_name);
    entry.victories += 1;
    entry.last_victory = Some(Utc::now());
    entry.victories
}

fn sorted_top(entries: &Entries, limit: usize) -> Vec<RankingEntry> {
    let mut ranked: Vec<RankingEntry> = entries.values().cloned().collect();
    ranked.sort_by(|a, b| {
        b.victories
            .cmp(&a.victories)
            .then_with(|| a.display_name.cmp(&b.display_name))
    });
    ranked.truncate(limit);
    ranked
}

#[must_use]
pub fn default_ranking_path() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join(RANKING_FILE))
}

/// Ranking persisted as a JSON file, rewritten on every victory.
#[derive(Debug, Clone)]
pub struct JsonRankingStore {
    path: PathBuf,
}

impl JsonRankingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> io::Result<Entries> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }
}

impl RankingStore for JsonRankingStore {
    fn record_victory(&mut self, player: &PlayerIdentity) -> io::Result<u32> {
        let mut entries = self.load()?;
        let total = bump(&mut entries, player);
        write_json_atomic(&self.path, &entries)?;
        Ok(total)
    }

    fn top(&self, limit: usize) -> io::Result<Vec<RankingEntry>> {
        Ok(sorted_top(&self.load()?, limit))
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryRanking {
    entries: Entries,
}

impl MemoryRanking {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RankingStore for MemoryRanking {
    fn record_victory(&mut self, player: &PlayerIdentity) -> io::Result<u32> {
        Ok(bump(&mut self.entries, player))
    }

    fn top(&self, limit: usize) -> io::Result<Vec<RankingEntry>> {
        Ok(sorted_top(&self.entries, limit))
    }
}
