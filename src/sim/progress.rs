/// Progression state machine.
///
/// Owns the in-memory `ProgressionRecord` and the store; every
/// transition mutates the record and immediately persists it, so a
/// crash loses at most the latest transition.
///
/// ## States
///   Normal      — playing the regular level rotation
///   BossPending — a checkpoint (level % 3 == 0) was just cleared;
///                 the next load must build the boss arena
///   BossActive  — the boss arena is loaded; resolves only through
///                 `defeat_boss`, never through `complete_level`
///
/// No terminal state: the campaign loops until externally stopped.

use crate::config::PlayerTuning;
use crate::domain::rules::{self, Decision};
use crate::sim::event::GameEvent;
use crate::sim::save::{ProgressionRecord, ProgressionStore};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ProgressState {
    Normal,
    BossPending,
    BossActive,
}

/// What the next level load should build.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LoadDecision {
    /// Build the normal level at this 1-based campaign index.
    Normal { index: u32 },
    /// Build the boss arena and spawn this boss. `return_index` is the
    /// normal level that loads once the boss is defeated.
    BossArena {
        boss_id: &'static str,
        return_index: u32,
    },
}

pub struct ProgressionMachine {
    state: ProgressState,
    record: ProgressionRecord,
    store: ProgressionStore,
}

impl ProgressionMachine {
    /// Load the record and resume: a persisted pending-boss flag puts
    /// the machine straight back into BossPending, so quitting between
    /// checkpoint and arena cannot skip the boss.
    pub fn new(store: ProgressionStore) -> Self {
        let record = store.load();
        let state = if record.pending_boss {
            ProgressState::BossPending
        } else {
            ProgressState::Normal
        };
        ProgressionMachine { state, record, store }
    }

    pub fn state(&self) -> ProgressState {
        self.state
    }

    /// Read-only view; mutations go through the transitions below.
    pub fn record(&self) -> &ProgressionRecord {
        &self.record
    }

    /// Explicit "new game": defaults, persisted, back to Normal.
    pub fn new_game(&mut self) {
        self.record = self.store.reset();
        self.state = ProgressState::Normal;
    }

    /// Wipe the durable record entirely. In-memory state returns to
    /// defaults but nothing is persisted until the next transition.
    pub fn delete_save(&mut self) {
        self.store.delete();
        self.record = ProgressionRecord::default();
        self.state = ProgressState::Normal;
    }

    // ── Transitions ──

    /// The player reached the end of normal level `index`.
    ///
    /// Boss arenas are not "completed" this way; while BossActive this
    /// is rejected (duplicate or misrouted trigger).
    pub fn complete_level(&mut self, index: u32) -> Vec<GameEvent> {
        if self.state == ProgressState::BossActive {
            eprintln!("Warning: complete_level({index}) ignored while a boss is active");
            return vec![];
        }

        let mut events = vec![GameEvent::LevelFinished { index }];

        if !self.record.completed_levels.contains(&index) {
            self.record.completed_levels.push(index);
        }

        if rules::is_boss_checkpoint(index) {
            self.record.pending_boss = true;
            self.state = ProgressState::BossPending;
            events.push(GameEvent::BossPending { checkpoint: index });
        }

        self.record.current_level = index + 1;
        self.persist();
        events
    }

    /// Record a good/bad ending choice. Valid in any state; does not
    /// touch the level index.
    pub fn record_decision(&mut self, path: Decision) -> Vec<GameEvent> {
        self.record.decisions_path.push(path);
        match path {
            Decision::Good => self.record.good_endings += 1,
            Decision::Bad => self.record.bad_endings += 1,
        }
        let level = self.record.current_level;
        self.persist();
        vec![GameEvent::DecisionMade { path, level }]
    }

    /// Decide what the next level load builds. Moves BossPending to
    /// BossActive; a duplicate request while BossActive re-selects the
    /// same boss from the same snapshot.
    pub fn request_next_level_load(&mut self) -> LoadDecision {
        match self.state {
            ProgressState::Normal => LoadDecision::Normal {
                index: self.record.current_level,
            },
            ProgressState::BossPending | ProgressState::BossActive => {
                self.state = ProgressState::BossActive;
                // The checkpoint that triggered this arena is the level
                // just below the already-incremented current index.
                let just_completed = self.record.current_level.saturating_sub(1);
                // Policy gets a value snapshot, never the live map.
                let snapshot = self.record.defeated_bosses.clone();
                let boss_id = rules::select_boss(just_completed, &snapshot);
                LoadDecision::BossArena {
                    boss_id,
                    return_index: self.record.current_level,
                }
            }
        }
    }

    /// The active boss went down. Clears the pending flag and returns
    /// to Normal WITHOUT incrementing the level index: the normal
    /// level for that checkpoint loads next.
    pub fn defeat_boss(&mut self, boss_id: &str) -> Vec<GameEvent> {
        if self.state != ProgressState::BossActive {
            eprintln!("Warning: defeat_boss({boss_id}) ignored outside the boss arena");
            return vec![];
        }

        match self.record.defeated_bosses.get_mut(boss_id) {
            // Monotonic: a defeated boss never becomes undefeated.
            Some(flag) => *flag = true,
            None => eprintln!("Error: unknown boss id '{boss_id}', flag not recorded"),
        }

        self.record.pending_boss = false;
        self.state = ProgressState::Normal;
        let level = self.record.current_level;
        self.persist();
        vec![GameEvent::BossDefeated {
            boss_id: boss_id.to_string(),
            level,
        }]
    }

    // ── Permanent upgrades ──

    pub fn add_health_upgrade(&mut self, tuning: &PlayerTuning) -> Vec<GameEvent> {
        self.record.health_upgrades += 1;
        // A bigger pool also heals up to the new cap.
        self.record.current_health = self.record.max_health(tuning);
        self.persist();
        vec![GameEvent::UpgradeApplied { what: "health" }]
    }

    pub fn add_weapon_upgrade(&mut self) -> Vec<GameEvent> {
        self.record.weapon_upgrades += 1;
        self.persist();
        vec![GameEvent::UpgradeApplied { what: "weapon" }]
    }

    pub fn add_special_ability(&mut self, ability_id: &str) -> Vec<GameEvent> {
        if self.record.special_abilities.insert(ability_id.to_string()) {
            self.persist();
            return vec![GameEvent::UpgradeApplied { what: "ability" }];
        }
        vec![]
    }

    pub fn set_current_health(&mut self, health: i32, tuning: &PlayerTuning) {
        let max = self.record.max_health(tuning);
        self.record.current_health = health.clamp(0, max);
        self.persist();
    }

    fn persist(&self) {
        self.store.persist(&self.record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rules::{BOSS_1, BOSS_2};
    use std::path::PathBuf;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "gridspire_progress_{}_{}.json",
            tag,
            std::process::id()
        ))
    }

    fn machine(tag: &str) -> ProgressionMachine {
        let path = temp_path(tag);
        let _ = std::fs::remove_file(&path);
        ProgressionMachine::new(ProgressionStore::new(path))
    }

    #[test]
    fn checkpoint_completion_arms_the_boss_without_skipping_the_level() {
        let mut m = machine("checkpoint");
        m.complete_level(1);
        m.complete_level(2);
        assert_eq!(m.state(), ProgressState::Normal);

        let events = m.complete_level(3);
        assert_eq!(m.state(), ProgressState::BossPending);
        assert!(m.record().pending_boss);
        assert_eq!(m.record().current_level, 4);
        assert!(events.contains(&GameEvent::BossPending { checkpoint: 3 }));

        assert_eq!(
            m.request_next_level_load(),
            LoadDecision::BossArena {
                boss_id: BOSS_1,
                return_index: 4
            }
        );
        assert_eq!(m.state(), ProgressState::BossActive);

        m.defeat_boss(BOSS_1);
        assert_eq!(m.state(), ProgressState::Normal);
        assert!(!m.record().pending_boss);
        assert!(m.record().is_boss_defeated(BOSS_1));
        // Defeating the boss does NOT advance the campaign; level 4
        // loads with the same index that triggered the arena.
        assert_eq!(m.record().current_level, 4);
        assert_eq!(
            m.request_next_level_load(),
            LoadDecision::Normal { index: 4 }
        );
    }

    #[test]
    fn second_checkpoint_selects_boss2_once_boss1_is_down() {
        let mut m = machine("boss2");
        m.complete_level(3);
        m.request_next_level_load();
        m.defeat_boss(BOSS_1);
        m.complete_level(4);
        m.complete_level(5);
        m.complete_level(6);
        assert_eq!(
            m.request_next_level_load(),
            LoadDecision::BossArena {
                boss_id: BOSS_2,
                return_index: 7
            }
        );
    }

    #[test]
    fn duplicate_load_request_keeps_the_same_arena() {
        let mut m = machine("dup_request");
        m.complete_level(3);
        let first = m.request_next_level_load();
        let second = m.request_next_level_load();
        assert_eq!(first, second);
        assert_eq!(m.state(), ProgressState::BossActive);
    }

    #[test]
    fn defeat_boss_outside_arena_is_a_noop() {
        let mut m = machine("noop_defeat");
        m.complete_level(1);
        let before = m.record().clone();
        let events = m.defeat_boss(BOSS_1);
        assert!(events.is_empty());
        assert_eq!(m.record(), &before);
        assert_eq!(m.state(), ProgressState::Normal);
    }

    #[test]
    fn complete_level_is_rejected_while_boss_active() {
        let mut m = machine("reject_complete");
        m.complete_level(3);
        m.request_next_level_load();
        let events = m.complete_level(4);
        assert!(events.is_empty());
        assert_eq!(m.record().current_level, 4);
        assert_eq!(m.state(), ProgressState::BossActive);
    }

    #[test]
    fn unknown_boss_id_still_resolves_the_arena_without_flags() {
        let mut m = machine("unknown_boss");
        m.complete_level(3);
        m.request_next_level_load();
        m.defeat_boss("boss99");
        assert_eq!(m.state(), ProgressState::Normal);
        assert!(!m.record().pending_boss);
        assert!(m.record().defeated_bosses.values().all(|&v| !v));
        // Roster keys are never added or removed.
        assert_eq!(m.record().defeated_bosses.len(), 4);
    }

    #[test]
    fn decisions_accumulate_in_any_state() {
        let mut m = machine("decisions");
        m.record_decision(Decision::Good);
        m.complete_level(3);
        m.request_next_level_load();
        m.record_decision(Decision::Bad);
        m.record_decision(Decision::Good);

        assert_eq!(m.record().good_endings, 2);
        assert_eq!(m.record().bad_endings, 1);
        assert_eq!(
            m.record().decisions_path,
            vec![Decision::Good, Decision::Bad, Decision::Good]
        );
        // Recording a decision never moves the level index.
        assert_eq!(m.record().current_level, 4);
    }

    #[test]
    fn transitions_persist_and_survive_reload() {
        let path = temp_path("persist");
        let _ = std::fs::remove_file(&path);

        let mut m = ProgressionMachine::new(ProgressionStore::new(path.clone()));
        m.complete_level(1);
        m.complete_level(2);
        m.complete_level(3);
        m.record_decision(Decision::Good);
        drop(m);

        // Fresh process: the pending boss resumes as BossPending.
        let m2 = ProgressionMachine::new(ProgressionStore::new(path.clone()));
        assert_eq!(m2.state(), ProgressState::BossPending);
        assert_eq!(m2.record().current_level, 4);
        assert_eq!(m2.record().good_endings, 1);
        assert_eq!(m2.record().completed_levels, vec![1, 2, 3]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn new_game_resets_everything() {
        let mut m = machine("new_game");
        m.complete_level(3);
        m.request_next_level_load();
        m.new_game();
        assert_eq!(m.state(), ProgressState::Normal);
        assert_eq!(m.record().current_level, 1);
        assert!(!m.record().pending_boss);
        assert!(m.record().completed_levels.is_empty());
        // A fresh run gets a fresh timestamp.
        assert!(!m.record().last_played.is_empty());
    }

    #[test]
    fn delete_save_removes_the_file_and_resets_memory() {
        let path = temp_path("delete_save");
        let _ = std::fs::remove_file(&path);
        let mut m = ProgressionMachine::new(ProgressionStore::new(path.clone()));
        m.complete_level(3);
        assert!(path.exists());

        m.delete_save();
        assert!(!path.exists());
        assert_eq!(m.state(), ProgressState::Normal);
        assert_eq!(m.record(), &ProgressionRecord::default());
    }

    #[test]
    fn upgrades_raise_derived_stats_and_heal_to_cap() {
        let tuning = PlayerTuning {
            base_health: 3,
            health_step: 2,
            base_weapon_damage: 1,
        };
        let mut m = machine("upgrades");
        m.add_health_upgrade(&tuning);
        assert_eq!(m.record().max_health(&tuning), 5);
        assert_eq!(m.record().current_health, 5);

        m.set_current_health(99, &tuning);
        assert_eq!(m.record().current_health, 5);
        m.set_current_health(-4, &tuning);
        assert_eq!(m.record().current_health, 0);

        m.add_weapon_upgrade();
        assert_eq!(m.record().weapon_damage(&tuning), 2);

        assert_eq!(m.add_special_ability("dash").len(), 1);
        assert!(m.add_special_ability("dash").is_empty());
    }
}
