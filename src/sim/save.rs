/// Progression record persistence.
///
/// One record, one schema, one file. The record is the durable state
/// of a campaign run: level index, branching-ending decisions, boss
/// flags, and permanent upgrades.
///
/// ## File format:
///   Pretty-printed JSON at the configured save path.
///
/// Corruption is non-fatal: a missing or unreadable record loads as
/// defaults. Write failures are logged and the in-memory record stays
/// authoritative for the rest of the session.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::PlayerTuning;
use crate::domain::rules::{Decision, BOSS_ROSTER};

// ══════════════════════════════════════════════════════════════
// Record
// ══════════════════════════════════════════════════════════════

/// Durable campaign state. Mutated only by the progression state
/// machine; everything else sees value snapshots.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionRecord {
    /// 1-based index of the next normal level to play. Never below 1.
    pub current_level: u32,
    /// True between clearing a boss checkpoint and defeating its boss.
    pub pending_boss: bool,
    pub completed_levels: Vec<u32>,

    pub decisions_path: Vec<Decision>,
    pub good_endings: u32,
    pub bad_endings: u32,

    /// Keys fixed to the boss roster at creation; values only ever
    /// flip false -> true.
    pub defeated_bosses: BTreeMap<String, bool>,

    pub health_upgrades: u32,
    pub weapon_upgrades: u32,
    pub special_abilities: BTreeSet<String>,
    pub current_health: i32,

    /// Accumulated by the host engine; carried through saves untouched.
    pub play_time_secs: f64,
    /// Unix timestamp (seconds) stamped on new game.
    pub last_played: String,
}

impl Default for ProgressionRecord {
    fn default() -> Self {
        ProgressionRecord {
            current_level: 1,
            pending_boss: false,
            completed_levels: vec![],
            decisions_path: vec![],
            good_endings: 0,
            bad_endings: 0,
            defeated_bosses: BOSS_ROSTER
                .iter()
                .map(|id| (id.to_string(), false))
                .collect(),
            health_upgrades: 0,
            weapon_upgrades: 0,
            special_abilities: BTreeSet::new(),
            current_health: 3,
            play_time_secs: 0.0,
            last_played: String::new(),
        }
    }
}

impl ProgressionRecord {
    /// Derived stat: base health plus `health_step` per upgrade.
    pub fn max_health(&self, tuning: &PlayerTuning) -> i32 {
        tuning.base_health + self.health_upgrades as i32 * tuning.health_step
    }

    /// Derived stat: base damage plus one per weapon upgrade.
    pub fn weapon_damage(&self, tuning: &PlayerTuning) -> i32 {
        tuning.base_weapon_damage + self.weapon_upgrades as i32
    }

    pub fn is_boss_defeated(&self, boss_id: &str) -> bool {
        self.defeated_bosses.get(boss_id).copied().unwrap_or(false)
    }

    /// Repair invariants after deserializing foreign or older data:
    /// the level index stays 1-based, health never goes negative, and
    /// the roster keys stay pinned.
    fn normalize(&mut self) {
        if self.current_level < 1 {
            self.current_level = 1;
        }
        if self.current_health < 0 {
            self.current_health = 0;
        }
        for id in BOSS_ROSTER {
            self.defeated_bosses.entry(id.to_string()).or_insert(false);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Store
// ══════════════════════════════════════════════════════════════

/// Owns the save path and mediates all reads/writes of the record.
/// Constructed once at process start; `reset()` is the explicit
/// "new game" action.
pub struct ProgressionStore {
    path: PathBuf,
}

impl ProgressionStore {
    pub fn new(path: PathBuf) -> Self {
        ProgressionStore { path }
    }

    /// Load the record, falling back to defaults when the file is
    /// missing or fails to deserialize. Never fails.
    pub fn load(&self) -> ProgressionRecord {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(_) => return ProgressionRecord::default(),
        };
        match serde_json::from_str::<ProgressionRecord>(&text) {
            Ok(mut record) => {
                record.normalize();
                record
            }
            Err(e) => {
                eprintln!(
                    "Warning: corrupt progression record {}: {e}",
                    self.path.display()
                );
                eprintln!("Starting from defaults.");
                ProgressionRecord::default()
            }
        }
    }

    /// Best-effort synchronous write. Failure is logged, not fatal;
    /// the in-memory record remains the source of truth.
    pub fn persist(&self, record: &ProgressionRecord) {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                let _ = std::fs::create_dir_all(dir);
            }
        }
        let json = match serde_json::to_string_pretty(record) {
            Ok(j) => j,
            Err(e) => {
                eprintln!("Warning: could not serialize progression record: {e}");
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, json) {
            eprintln!("Warning: could not write {}: {e}", self.path.display());
        }
    }

    /// New game: defaults with a fresh timestamp, persisted immediately.
    pub fn reset(&self) -> ProgressionRecord {
        let mut record = ProgressionRecord::default();
        record.last_played = unix_timestamp();
        self.persist(&record);
        record
    }

    /// Remove the durable record. A missing file is fine; any other
    /// IO failure is logged and the file may linger.
    pub fn delete(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                eprintln!("Warning: could not delete {}: {e}", self.path.display());
            }
        }
    }

    pub fn has_save(&self) -> bool {
        self.path.exists()
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

fn unix_timestamp() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs().to_string(),
        Err(_) => String::new(),
    }
}
